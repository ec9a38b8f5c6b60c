use switchboard_core::{ControlEvent, RoomId};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{RECV_TIMEOUT_MS, TestClient, wait_for_members};

#[tokio::test]
async fn test_three_peers_join() {
    init_tracing();

    let service = create_test_service();
    let mut peer1 = TestClient::join_room(&service, "trio")
        .await
        .expect("Failed to join peer 1");
    let mut peer2 = TestClient::join_room(&service, "trio")
        .await
        .expect("Failed to join peer 2");
    let peer3 = TestClient::join_room(&service, "trio")
        .await
        .expect("Failed to join peer 3");

    assert!(peer1.peers.is_empty());
    assert_eq!(peer2.peers, vec![peer1.connection_id]);

    let mut expected = vec![peer1.connection_id, peer2.connection_id];
    expected.sort();
    assert_eq!(peer3.peers, expected, "Peer 3 sees both earlier peers");

    assert_eq!(
        peer1.recv_control().await.expect("No notice for peer 2"),
        ControlEvent::PeerJoined {
            connection_id: peer2.connection_id
        }
    );
    assert_eq!(
        peer1.recv_control().await.expect("No notice for peer 3"),
        ControlEvent::PeerJoined {
            connection_id: peer3.connection_id
        }
    );
    assert_eq!(
        peer2.recv_control().await.expect("No notice for peer 3"),
        ControlEvent::PeerJoined {
            connection_id: peer3.connection_id
        }
    );

    let room = service
        .registry()
        .get(&RoomId::from("trio"))
        .expect("Room should exist");
    let snapshot = wait_for_members(&room, RECV_TIMEOUT_MS, |snapshot| snapshot.peers.len() == 3)
        .await
        .expect("All three peers should be members");
    assert!(snapshot.chat.is_empty());
    assert_eq!(service.registry().len(), 1);
}
