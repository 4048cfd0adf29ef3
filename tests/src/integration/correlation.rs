//! # Correlation Flows
//!
//! Requests and responses travelling through the full client: facade →
//! gateway → in-memory link → mock sidecar → receive loop → registry.

#[cfg(test)]
mod tests {
    use crate::harness::{connected_client, test_config, Script};
    use futures::future::join_all;
    use spacefx_sdk::{ClientConfig, SdkError};
    use spacefx_types::{
        LinkRequest, LogLevel, LogMessage, MessageKind, PositionRequest,
        RequestHeader, StatusCode,
    };
    use std::collections::HashSet;
    use std::time::Duration;

    // =============================================================================
    // ENVELOPE STAMPING
    // =============================================================================

    #[tokio::test]
    async fn test_unset_tracking_id_is_stamped_on_the_wire() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;

        let response = client.position().request_position(None).await.unwrap();

        let frames = sidecar.requests_of(MessageKind::PositionRequest);
        assert_eq!(frames.len(), 1);
        let sent: PositionRequest = frames[0].decode().unwrap();
        let header = &sent.request_header;

        assert!(uuid::Uuid::parse_str(&header.tracking_id).is_ok());
        assert_eq!(header.correlation_id, header.tracking_id);
        assert_eq!(header.app_id, "payload-app");
        assert_eq!(response.response_header.tracking_id, header.tracking_id);
        assert_eq!(response.response_header.correlation_id, header.tracking_id);
    }

    #[tokio::test]
    async fn test_chained_correlation_id_is_preserved() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;

        let mut message = LogMessage::new("step two", LogLevel::Info);
        message.request_header = RequestHeader::chained("mission-123");

        let response = client
            .logging()
            .send_complex_log_message(message, None, true)
            .await
            .unwrap();

        assert_eq!(response.response_header.correlation_id, "mission-123");
        assert_ne!(response.response_header.tracking_id, "mission-123");
    }

    // =============================================================================
    // CONCURRENCY ISOLATION
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sends_never_cross_resolve() {
        const REQUESTS: usize = 128;

        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;
        sidecar.script(
            MessageKind::LogMessage,
            Script::Jittered {
                max_delay: Duration::from_millis(40),
            },
        );

        let calls = (0..REQUESTS).map(|i| {
            let logging = client.logging();
            async move {
                let message = LogMessage::new(format!("message {i}"), LogLevel::Info);
                let tracking_id = message.request_header.tracking_id.clone();
                let response = logging
                    .send_complex_log_message(message, None, true)
                    .await
                    .unwrap();
                (tracking_id, response)
            }
        });
        let results = join_all(calls).await;

        let mut seen = HashSet::new();
        for (tracking_id, response) in &results {
            assert_eq!(&response.response_header.tracking_id, tracking_id);
            assert_eq!(response.response_header.status, StatusCode::Successful);
            assert!(seen.insert(tracking_id.clone()));
        }
        assert_eq!(seen.len(), REQUESTS);

        let stats = client.registry_snapshot();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.registered, REQUESTS as u64);
        assert_eq!(stats.fulfilled, REQUESTS as u64);
    }

    // =============================================================================
    // REGISTRY DRAINING
    // =============================================================================

    #[tokio::test]
    async fn test_registry_drains_after_mixed_outcomes() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;
        sidecar.script(MessageKind::PositionRequest, Script::Silent);
        sidecar.script(MessageKind::LogMessage, Script::Reply(StatusCode::Failed));

        let timed_out = client
            .position()
            .request_position(Some(Duration::from_millis(100)))
            .await;
        assert!(matches!(timed_out, Err(SdkError::Timeout { .. })));

        let failed = client
            .logging()
            .send_log_message("disk full", LogLevel::Error, None, true)
            .await
            .unwrap();
        assert_eq!(failed.response_header.status, StatusCode::Failed);

        // A cancelled send leaves nothing behind either.
        sidecar.script(MessageKind::LogMessage, Script::Silent);
        let logging = client.logging();
        let abandoned = tokio::spawn(async move {
            logging
                .send_log_message("never answered", LogLevel::Info, None, true)
                .await
        });
        sidecar.wait_for_requests(MessageKind::LogMessage, 2).await;
        abandoned.abort();
        let _ = abandoned.await;

        assert_eq!(client.registry_snapshot().pending, 0);
    }

    #[tokio::test]
    async fn test_duplicate_response_is_ignored() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;
        sidecar.script(
            MessageKind::PositionRequest,
            Script::Sequence(vec![StatusCode::Successful, StatusCode::Failed]),
        );

        let response = client.position().request_position(None).await.unwrap();
        assert_eq!(response.response_header.status, StatusCode::Successful);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let stats = client.registry_snapshot();
        assert_eq!(stats.fulfilled, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.pending, 0);
    }

    // =============================================================================
    // INTERIM STATUSES
    // =============================================================================

    #[tokio::test]
    async fn test_pending_then_successful_settles_on_successful() {
        let xfer = tempfile::TempDir::new().unwrap();
        let file = xfer.path().join("capture.bin");
        std::fs::write(&file, [1u8, 2, 3]).unwrap();

        let (client, sidecar) = connected_client(ClientConfig {
            xfer_dir: xfer.path().to_path_buf(),
            ..test_config("payload-app")
        });
        sidecar.announce_host_services().await;
        sidecar.script(
            MessageKind::LinkRequest,
            Script::Sequence(vec![StatusCode::Pending, StatusCode::Successful]),
        );

        let response = client
            .link()
            .send_file_to_app("other-app", &file, false, None)
            .await
            .unwrap();
        assert_eq!(response.response_header.status, StatusCode::Successful);

        let sent: LinkRequest = sidecar.requests_of(MessageKind::LinkRequest)[0]
            .decode()
            .unwrap();
        assert_eq!(sent.file_name, "capture.bin");
    }

    #[tokio::test]
    async fn test_timeout_returns_last_interim_response() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;
        sidecar.script(
            MessageKind::PositionRequest,
            Script::Sequence(vec![StatusCode::Unknown, StatusCode::Pending]),
        );

        let response = client
            .position()
            .request_position(Some(Duration::from_millis(200)))
            .await
            .unwrap();
        assert_eq!(response.response_header.status, StatusCode::Pending);
        assert_eq!(client.registry_snapshot().pending, 0);
    }

    #[tokio::test]
    async fn test_fire_and_forget_log_returns_unknown() {
        let (client, sidecar) = connected_client(test_config("payload-app"));
        sidecar.announce_host_services().await;

        let response = client
            .logging()
            .send_log_message("boot complete", LogLevel::Info, None, false)
            .await
            .unwrap();
        assert_eq!(response.response_header.status, StatusCode::Unknown);

        let frames = sidecar.wait_for_requests(MessageKind::LogMessage, 1).await;
        let sent: LogMessage = frames[0].decode().unwrap();
        assert_eq!(sent.request_header.tracking_id, response.response_header.tracking_id);
        assert_eq!(client.registry_snapshot().registered, 0);
    }
}
