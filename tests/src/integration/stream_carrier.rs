//! # Socket Carrier
//!
//! `SpacefxClient::build` against a sidecar listening on a Unix domain socket
//! and on TCP, using the length-prefixed frame codec on both ends.

#[cfg(all(test, unix))]
mod tests {
    use spacefx_bus::{
        FrameReceiver, FrameSender, StreamFrameReceiver, StreamFrameSender, WireFrame, BROADCAST,
        DEFAULT_MAX_FRAME_SIZE,
    };
    use spacefx_sdk::{ClientConfig, SdkError, SessionState, SpacefxClient};
    use spacefx_types::{
        host_services, HeartBeatPulse, MessageKind, Position, PositionRequest, PositionResponse,
        ResponseHeader, StatusCode,
    };
    use std::time::Duration;
    use tokio::io::{AsyncRead, AsyncWrite};
    use tokio::net::{TcpListener, UnixListener};

    /// Announce the position service, then answer one position request.
    async fn serve_position<R, W>(read: R, write: W)
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let receiver = StreamFrameReceiver::new(read, DEFAULT_MAX_FRAME_SIZE);
        let sender = StreamFrameSender::new(write, DEFAULT_MAX_FRAME_SIZE);

        let pulse = HeartBeatPulse::new(host_services::POSITION, 1000);
        sender
            .send(WireFrame::encode(host_services::POSITION, BROADCAST, &pulse).unwrap())
            .await
            .unwrap();

        loop {
            let frame = receiver.receive().await.unwrap();
            if frame.kind != MessageKind::PositionRequest {
                continue;
            }
            let request: PositionRequest = frame.decode().unwrap();
            let response = PositionResponse {
                response_header: ResponseHeader::with_status(
                    &request.request_header,
                    StatusCode::Successful,
                ),
                position: Some(Position::default()),
            };
            sender
                .send(
                    WireFrame::encode(host_services::POSITION, &frame.source_app_id, &response)
                        .unwrap(),
                )
                .await
                .unwrap();
            return;
        }
    }

    async fn exercise(endpoint: String) {
        let client = SpacefxClient::build(ClientConfig {
            app_id: "payload-app".into(),
            sidecar_endpoint: endpoint,
            heartbeat_pulse_interval: None,
            ..ClientConfig::default()
        })
        .await
        .unwrap();

        let state = client
            .wait_for_online(Some(Duration::from_secs(2)))
            .await
            .unwrap();
        assert_eq!(state, SessionState::Online);

        let response = client
            .position()
            .request_position(Some(Duration::from_secs(2)))
            .await
            .unwrap();
        assert_eq!(response.response_header.status, StatusCode::Successful);
        assert!(response.position.is_some());
        client.shutdown();
    }

    #[tokio::test]
    async fn test_round_trip_over_unix_socket() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sidecar.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, write) = stream.into_split();
            serve_position(read, write).await;
        });

        exercise(format!("unix://{}", path.display())).await;
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, write) = stream.into_split();
            serve_position(read, write).await;
        });

        exercise(format!("tcp://{addr}")).await;
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_socket_is_a_connection_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = SpacefxClient::build(ClientConfig {
            sidecar_endpoint: format!("unix://{}", dir.path().join("absent.sock").display()),
            ..ClientConfig::default()
        })
        .await;

        match result {
            Err(SdkError::Connection { endpoint, .. }) => assert!(endpoint.contains("absent.sock")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connected to a socket that does not exist"),
        }
    }
}
