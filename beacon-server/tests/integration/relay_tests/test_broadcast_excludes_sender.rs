use beacon_core::{PeerId, RoomId, ServerMessage};

use crate::integration::{create_relay, init_tracing};

#[tokio::test]
async fn test_broadcast_excludes_sender() {
    init_tracing();

    let (registry, output, relay) = create_relay();
    let room = RoomId::new("r1").unwrap();
    let (a, b, c) = (PeerId::new(), PeerId::new(), PeerId::new());
    for p in [a, b, c] {
        registry.register(p).unwrap();
        relay.join(p, room.clone(), None).await;
    }
    output.take().await;

    // Room of three: exactly N-1 recipients.
    let msg = ServerMessage::Offer {
        from: a,
        sdp: "v=0".into(),
    };
    relay.broadcast(a, &room, msg).await;
    assert_eq!(output.count_for(&a).await, 0);
    assert_eq!(output.count_for(&b).await, 1);
    assert_eq!(output.count_for(&c).await, 1);
    output.take().await;

    // Room of one: zero recipients, no error.
    let solo = PeerId::new();
    registry.register(solo).unwrap();
    relay.join(solo, RoomId::new("lonely").unwrap(), None).await;
    output.take().await;

    relay
        .broadcast(
            solo,
            &RoomId::new("lonely").unwrap(),
            ServerMessage::Offer {
                from: solo,
                sdp: "v=0".into(),
            },
        )
        .await;
    assert_eq!(output.total().await, 0);
}
