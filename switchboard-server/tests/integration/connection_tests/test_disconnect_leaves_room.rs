use switchboard_core::{ControlEvent, RoomId};
use switchboard_server::SessionOutcome;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{RECV_TIMEOUT_MS, TestClient, wait_for_registry};

#[tokio::test]
async fn test_disconnect_leaves_room() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestClient::join_room(&service, "abc")
        .await
        .expect("Alice failed to join");
    let bob = TestClient::join_room(&service, "abc")
        .await
        .expect("Bob failed to join");
    let bob_id = bob.connection_id;

    assert_eq!(
        alice.recv_control().await.expect("No join notice"),
        ControlEvent::PeerJoined {
            connection_id: bob_id
        }
    );

    let outcome = bob.disconnect().await.expect("Bob's session failed");
    assert_eq!(outcome, SessionOutcome::ClientClosed);

    assert_eq!(
        alice.recv_control().await.expect("No leave notice"),
        ControlEvent::PeerLeft {
            connection_id: bob_id
        }
    );

    let room = service
        .registry()
        .get(&RoomId::from("abc"))
        .expect("Room still has Alice");
    assert!(!room.leave(bob_id).await, "Second leave is a no-op");

    alice.disconnect().await.expect("Alice's session failed");

    wait_for_registry(service.registry(), RECV_TIMEOUT_MS, |registry| {
        registry.is_empty()
    })
    .await
    .expect("Empty room should be reclaimed");
    assert!(room.is_retired());
}
