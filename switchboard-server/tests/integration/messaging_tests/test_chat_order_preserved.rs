use serde_json::json;
use switchboard_core::{ConnectionId, MessageKind};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

const MESSAGE_COUNT: u64 = 20;

#[tokio::test]
async fn test_chat_order_preserved() {
    init_tracing();

    let service = create_test_service();
    let first = TestClient::join_chat(&service, "lobby")
        .await
        .expect("First sender failed to join");
    let second = TestClient::join_chat(&service, "lobby")
        .await
        .expect("Second sender failed to join");
    let mut listeners = Vec::new();
    for _ in 0..3 {
        listeners.push(
            TestClient::join_chat(&service, "lobby")
                .await
                .expect("Listener failed to join"),
        );
    }

    for i in 0..MESSAGE_COUNT {
        first.send_signal("chat", None, json!(i)).expect("Send failed");
        second.send_signal("chat", None, json!(i)).expect("Send failed");
    }

    let mut sequences: Vec<Vec<(ConnectionId, String)>> = Vec::new();
    for listener in listeners.iter_mut() {
        let mut sequence = Vec::new();
        for _ in 0..MESSAGE_COUNT * 2 {
            let received = listener.recv().await.expect("Chat lost");
            assert_eq!(received.kind, MessageKind::Chat);
            let from = received.from.expect("Chat without sender");
            let payload = received.payload_str().expect("Chat without payload").to_string();
            sequence.push((from, payload));
        }
        sequences.push(sequence);
    }

    for sender in [first.connection_id, second.connection_id] {
        let sent: Vec<String> = sequences[0]
            .iter()
            .filter(|(from, _)| *from == sender)
            .map(|(_, payload)| payload.clone())
            .collect();
        let expected: Vec<String> = (0..MESSAGE_COUNT).map(|i| i.to_string()).collect();
        assert_eq!(sent, expected, "Each sender's chat arrives in issue order");
    }

    assert!(
        sequences.iter().all(|sequence| sequence == &sequences[0]),
        "Every listener sees the same order"
    );
}
