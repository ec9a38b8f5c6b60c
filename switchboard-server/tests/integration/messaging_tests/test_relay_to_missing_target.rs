use serde_json::json;
use switchboard_core::{ConnectionId, MessageKind};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{SILENCE_MS, TestClient};

#[tokio::test]
async fn test_relay_to_missing_target() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestClient::join_room(&service, "ghost")
        .await
        .expect("Alice failed to join");
    let mut bob = TestClient::join_room(&service, "ghost")
        .await
        .expect("Bob failed to join");

    alice.recv_control().await.expect("No join notice");

    bob.send_signal("offer", Some(ConnectionId::new()), json!({"sdp": "lost"}))
        .expect("Send failed");

    alice
        .expect_silence(SILENCE_MS)
        .await
        .expect("Offer to an unknown target is dropped");
    bob.expect_silence(SILENCE_MS)
        .await
        .expect("Sender gets no error for an unknown target");

    bob.send_signal("offer", Some(alice.connection_id), json!({"sdp": "found"}))
        .expect("Bob's session should still be alive");
    let received = alice.recv().await.expect("Offer never arrived");
    assert_eq!(received.kind, MessageKind::Offer);
}
