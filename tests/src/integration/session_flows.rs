//! # Session Lifecycle
//!
//! Heartbeat-driven state, service discovery, health checks and shutdown as
//! seen through a [`SpacefxClient`](spacefx_sdk::SpacefxClient).

#[cfg(test)]
mod tests {
    use crate::harness::{connected_client, test_config, MockSidecar};
    use spacefx_sdk::{ClientConfig, SdkError, SessionState, SpacefxClient};
    use spacefx_types::{
        host_services, HealthCheck, HealthCheckResponse, MessageKind, RequestHeader, StatusCode,
    };
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_online_times_out_without_heartbeat() {
        let (client, _sidecar) = connected_client(test_config("payload-app"));

        let started = Instant::now();
        let err = client
            .wait_for_online(Some(Duration::from_secs(5)))
            .await
            .unwrap_err();

        assert!(matches!(err, SdkError::Timeout { .. }));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(5));
        assert!(waited < Duration::from_secs(5) + Duration::from_millis(100));
        assert_eq!(client.state(), SessionState::Connecting);
    }

    #[tokio::test]
    async fn test_heartbeats_populate_services_online() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;

        client
            .wait_for_online(Some(Duration::from_secs(1)))
            .await
            .unwrap();
        client
            .wait_for_service(host_services::LINK, Some(Duration::from_secs(1)))
            .await
            .unwrap();

        let ids: Vec<_> = client
            .services_online()
            .into_iter()
            .map(|s| s.app_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                host_services::LINK,
                host_services::LOGGING,
                host_services::POSITION,
                host_services::SENSOR,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_to_silent_service_fails_fast_on_its_deadline() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.heartbeat(host_services::LOGGING).await;

        let err = client
            .position()
            .request_position(Some(Duration::from_secs(3)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SdkError::ServiceUnavailable { ref app_id, .. } if app_id == host_services::POSITION
        ));
        assert!(sidecar.requests_of(MessageKind::PositionRequest).is_empty());
    }

    #[tokio::test]
    async fn test_health_check_answered_with_probe_result() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        let check = HealthCheck {
            request_header: RequestHeader::new(),
        };

        sidecar.push("sidecar", &check).await;
        let replies = sidecar
            .wait_for_requests(MessageKind::HealthCheckResponse, 1)
            .await;
        let healthy: HealthCheckResponse = replies[0].decode().unwrap();
        assert_eq!(healthy.response_header.status, StatusCode::Successful);
        assert_eq!(healthy.response_header.tracking_id, check.request_header.tracking_id);

        client.set_health_check(|| false);
        sidecar.push("sidecar", &check).await;
        let replies = sidecar
            .wait_for_requests(MessageKind::HealthCheckResponse, 2)
            .await;
        let unhealthy: HealthCheckResponse = replies[1].decode().unwrap();
        assert_eq!(unhealthy.response_header.status, StatusCode::Failed);
    }

    #[tokio::test]
    async fn test_channel_loss_marks_session_offline() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;
        client
            .wait_for_online(Some(Duration::from_secs(1)))
            .await
            .unwrap();

        drop(sidecar);
        let mut state = client.session().subscribe_state();
        tokio::time::timeout(
            Duration::from_secs(1),
            state.wait_for(|s| *s == SessionState::Offline),
        )
        .await
        .unwrap()
        .unwrap();

        // Known services outlive the connection.
        assert_eq!(client.services_online().len(), 4);
        let err = client.position().request_position(None).await.unwrap_err();
        assert!(matches!(err, SdkError::SessionClosed));
    }

    #[tokio::test]
    async fn test_shutdown_stops_background_work() {
        let (client, _sidecar) = connected_client(ClientConfig {
            heartbeat_pulse_interval: Some(Duration::from_millis(10)),
            ..test_config("payload-app")
        });

        let clone: SpacefxClient = client.clone();
        let parked = tokio::spawn(async move { clone.keep_app_open().await });

        client.shutdown();
        tokio::time::timeout(Duration::from_secs(1), parked)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(client.state(), SessionState::Offline);
    }

    #[tokio::test]
    async fn test_own_heartbeat_reaches_sidecar() {
        let (_client, sidecar): (SpacefxClient, MockSidecar) = connected_client(ClientConfig {
            heartbeat_pulse_interval: Some(Duration::from_millis(20)),
            ..test_config("payload-app")
        });

        let pulses = sidecar
            .wait_for_requests(MessageKind::HeartBeatPulse, 2)
            .await;
        assert!(pulses.iter().all(|f| f.source_app_id == "payload-app"));
    }
}
