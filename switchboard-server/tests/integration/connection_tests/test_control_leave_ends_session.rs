use switchboard_core::ControlEvent;
use switchboard_server::SessionOutcome;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test]
async fn test_control_leave_ends_session() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestClient::join_room(&service, "leave")
        .await
        .expect("Alice failed to join");
    let mut bob = TestClient::join_room(&service, "leave")
        .await
        .expect("Bob failed to join");
    let bob_id = bob.connection_id;

    alice.recv_control().await.expect("No join notice");

    bob.send_leave().expect("Send failed");
    bob.wait_closed()
        .await
        .expect("Hub should close the connection after leave");
    assert_eq!(
        bob.finish().await.expect("Bob's session failed"),
        SessionOutcome::ClientLeft
    );

    assert_eq!(
        alice.recv_control().await.expect("No leave notice"),
        ControlEvent::PeerLeft {
            connection_id: bob_id
        }
    );
}

#[tokio::test]
async fn test_unknown_control_command_is_ignored() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestClient::join_room(&service, "mute")
        .await
        .expect("Alice failed to join");
    let bob = TestClient::join_room(&service, "mute")
        .await
        .expect("Bob failed to join");

    alice.recv_control().await.expect("No join notice");

    bob.send_signal("control", None, serde_json::json!("mute"))
        .expect("Send failed");
    bob.send_signal("offer", Some(alice.connection_id), serde_json::json!("still here"))
        .expect("Send failed");

    let delivered = alice.recv().await.expect("Offer never arrived");
    assert_eq!(delivered.from, Some(bob.connection_id));
    assert_eq!(delivered.payload_str(), Some(r#""still here""#));
}
