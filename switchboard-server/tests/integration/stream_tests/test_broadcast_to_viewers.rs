use serde_json::json;
use switchboard_core::{ControlEvent, MessageKind, StreamId};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{SILENCE_MS, TestClient};

#[tokio::test]
async fn test_broadcast_to_viewers() {
    init_tracing();

    let service = create_test_service();
    let mut broadcaster = TestClient::start_stream(&service, "xyz")
        .await
        .expect("Broadcaster failed to attach");
    assert_eq!(broadcaster.stream_id, StreamId::from("xyz"));
    assert_eq!(
        broadcaster.recv_control().await.expect("No viewer count"),
        ControlEvent::ViewerCount { count: 0 }
    );

    let mut v1 = TestClient::watch_stream(&service, "xyz")
        .await
        .expect("Viewer 1 failed to attach");
    assert_eq!(
        broadcaster.recv_control().await.expect("No viewer count"),
        ControlEvent::ViewerCount { count: 1 }
    );

    let mut v2 = TestClient::watch_stream(&service, "xyz")
        .await
        .expect("Viewer 2 failed to attach");
    assert_eq!(
        broadcaster.recv_control().await.expect("No viewer count"),
        ControlEvent::ViewerCount { count: 2 }
    );
    assert_eq!(v1.room_id, broadcaster.room_id);
    assert_eq!(v2.room_id, broadcaster.room_id);

    broadcaster
        .send_signal("offer", None, json!({"sdp": "stream"}))
        .expect("Send failed");
    for viewer in [&mut v1, &mut v2] {
        let received = viewer.recv().await.expect("Offer never reached viewer");
        assert_eq!(received.kind, MessageKind::Offer);
        assert_eq!(received.from, Some(broadcaster.connection_id));
    }

    v1.send_signal("answer", None, json!({"sdp": "watching"}))
        .expect("Send failed");
    let received = broadcaster.recv().await.expect("Answer never arrived");
    assert_eq!(received.kind, MessageKind::Answer);
    assert_eq!(received.from, Some(v1.connection_id));

    v2.expect_silence(SILENCE_MS)
        .await
        .expect("Viewers never see each other's messages");

    v2.disconnect().await.expect("Viewer 2's session failed");
    assert_eq!(
        broadcaster.recv_control().await.expect("No viewer count"),
        ControlEvent::ViewerCount { count: 1 }
    );

    broadcaster
        .send_signal("candidate", Some(v1.connection_id), json!("direct"))
        .expect("Send failed");
    let received = v1.recv().await.expect("Candidate never arrived");
    assert_eq!(received.kind, MessageKind::Candidate);
    assert_eq!(received.from, Some(broadcaster.connection_id));
}
