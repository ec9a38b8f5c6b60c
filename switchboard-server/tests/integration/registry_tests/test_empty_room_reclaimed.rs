use switchboard_core::{ConnectionId, Role, RoomId};
use switchboard_server::{RoomRegistry, outbox};

use crate::integration::init_tracing;

#[tokio::test]
async fn test_empty_room_reclaimed() {
    init_tracing();

    let registry = RoomRegistry::default();
    let room_id = RoomId::from("abc");
    let room = registry.get_or_create(&room_id);
    let stream_id = room.stream_id().clone();

    let (member_outbox, _member_rx) = outbox(8);
    let membership = room
        .join(ConnectionId::new(), Role::Peer, member_outbox)
        .await
        .expect("Join failed");

    assert!(
        !registry.release(&room).await,
        "A room with members is not reclaimed"
    );
    assert!(registry.contains(&room_id));

    assert!(membership.leave().await);
    assert!(registry.release(&room).await);
    assert!(room.is_retired());
    assert!(!registry.contains(&room_id));
    assert!(registry.get_stream(&stream_id).is_none());
    assert!(registry.is_empty());

    assert!(registry.release(&room).await, "Releasing twice is harmless");

    let fresh = registry.get_or_create(&room_id);
    assert!(!fresh.ptr_eq(&room));
    assert_ne!(fresh.stream_id(), &stream_id);
}
