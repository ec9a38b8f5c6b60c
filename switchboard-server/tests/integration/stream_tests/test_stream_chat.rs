use serde_json::json;
use switchboard_core::{MessageKind, Role, StreamId};
use switchboard_server::AttachTarget;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{SILENCE_MS, TestClient};

#[tokio::test]
async fn test_stream_chat() {
    init_tracing();

    let service = create_test_service();
    let target = AttachTarget::Stream(StreamId::from("talk"));

    let mut viewer = TestClient::watch_stream(&service, "talk")
        .await
        .expect("Viewer failed to attach");
    let mut host = TestClient::connect(&service, target.clone(), Role::Chat)
        .await
        .expect("Host failed to join chat");
    let mut guest = TestClient::connect(&service, target, Role::Chat)
        .await
        .expect("Guest failed to join chat");
    assert_eq!(host.room_id, viewer.room_id);

    host.send_signal("chat", None, json!("welcome"))
        .expect("Send failed");

    let received = guest.recv().await.expect("Chat never arrived");
    assert_eq!(received.kind, MessageKind::Chat);
    assert_eq!(received.payload_str(), Some(r#""welcome""#));

    viewer
        .expect_silence(SILENCE_MS)
        .await
        .expect("Chat stays with chat members");
    host.expect_silence(SILENCE_MS)
        .await
        .expect("Sender does not get its own chat");
}
