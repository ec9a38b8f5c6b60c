use serde_json::json;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

const MESSAGE_COUNT: u64 = 50;

#[tokio::test]
async fn test_rapid_message_sending() {
    init_tracing();

    let service = create_test_service();
    let mut alice = TestClient::join_room(&service, "rapid")
        .await
        .expect("Alice failed to join");
    let mut bob = TestClient::join_room(&service, "rapid")
        .await
        .expect("Bob failed to join");

    alice.recv_control().await.expect("No join notice");

    for i in 0..MESSAGE_COUNT {
        alice
            .send_signal("candidate", Some(bob.connection_id), json!(i))
            .expect("Send failed");
    }

    for i in 0..MESSAGE_COUNT {
        let received = bob.recv().await.expect("Message lost");
        assert_eq!(received.from, Some(alice.connection_id));
        assert_eq!(
            received.payload_str(),
            Some(i.to_string().as_str()),
            "Messages must arrive in send order"
        );
    }
}
