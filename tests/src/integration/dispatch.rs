//! # Sensor Data Fan-out
//!
//! Unsolicited `SensorData` pushed by the sidecar reaches every subscriber
//! through the session's dispatcher.

#[cfg(test)]
mod tests {
    use crate::harness::{connected_client, test_config};
    use parking_lot::Mutex;
    use serde_json::json;
    use spacefx_types::{host_services, MessageKind, SensorData, TaskingRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn sample(sensor_id: &str) -> SensorData {
        SensorData {
            sensor_id: sensor_id.to_string(),
            data: Some(json!({"celsius": 21.5})),
            ..SensorData::default()
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_starve_the_others() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        let sensor = client.sensor();

        let first = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));
        let instances: Arc<Mutex<Vec<Arc<SensorData>>>> = Arc::new(Mutex::new(Vec::new()));

        {
            let first = Arc::clone(&first);
            let instances = Arc::clone(&instances);
            sensor.subscribe_to_sensor_data(move |data| {
                first.fetch_add(1, Ordering::SeqCst);
                instances.lock().push(data);
            });
        }
        sensor.subscribe_to_sensor_data(|_| panic!("subscriber bug"));
        {
            let third = Arc::clone(&third);
            let instances = Arc::clone(&instances);
            sensor.subscribe_to_sensor_data(move |data| {
                third.fetch_add(1, Ordering::SeqCst);
                instances.lock().push(data);
            });
        }

        sidecar.push(host_services::SENSOR, &sample("DemoTemperatureSensor")).await;
        settle().await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 1);

        let instances = instances.lock();
        assert_eq!(instances.len(), 2);
        assert!(Arc::ptr_eq(&instances[0], &instances[1]));
        assert_eq!(instances[0].sensor_id, "DemoTemperatureSensor");

        let stats = client.session().sensor_data().stats();
        assert_eq!(stats.callback_panics.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_slow_subscriber_does_not_delay_responses() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;

        client.subscribe_to_sensor_data(|_| std::thread::sleep(Duration::from_millis(500)));
        sidecar.push(host_services::SENSOR, &sample("DemoTemperatureSensor")).await;

        let response = tokio::time::timeout(
            Duration::from_millis(250),
            client
                .sensor()
                .sensor_tasking("DemoTemperatureSensor", None, None, None),
        )
        .await
        .expect("receive loop blocked by a subscriber")
        .unwrap();
        assert!(response.response_header.status.is_successful());
        assert_eq!(sidecar.requests_of(MessageKind::TaskingRequest).len(), 1);
        let _: TaskingRequest = sidecar.requests_of(MessageKind::TaskingRequest)[0]
            .decode()
            .unwrap();
    }

    #[tokio::test]
    async fn test_unsubscribed_callback_sees_nothing_more() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handle = client.subscribe_to_sensor_data(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sidecar.push(host_services::SENSOR, &sample("a")).await;
        settle().await;
        assert!(client.unsubscribe_from_sensor_data(handle));

        sidecar.push(host_services::SENSOR, &sample("b")).await;
        settle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_events_without_subscribers_are_fine() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.push(host_services::SENSOR, &sample("nobody-listening")).await;
        settle().await;

        let stats = client.session().sensor_data().stats();
        assert_eq!(stats.events_dropped.load(Ordering::SeqCst), 0);
    }
}
