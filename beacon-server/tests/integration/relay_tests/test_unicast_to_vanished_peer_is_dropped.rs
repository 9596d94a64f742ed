use beacon_core::{PeerId, RoomId, ServerMessage};

use crate::integration::{create_relay, init_tracing};

#[tokio::test]
async fn test_unicast_to_vanished_peer_is_dropped() {
    init_tracing();

    let (registry, output, relay) = create_relay();
    let (a, b) = (PeerId::new(), PeerId::new());
    registry.register(a).unwrap();
    registry.register(b).unwrap();
    let room = RoomId::new("r1").unwrap();
    relay.join(a, room.clone(), None).await;
    relay.join(b, room.clone(), None).await;
    output.take().await;

    // B disconnects; a negotiation message already in flight toward it
    // must vanish without error.
    relay.disconnect(b).await;
    output.take().await;

    relay
        .unicast(
            a,
            b,
            ServerMessage::Answer {
                from: a,
                sdp: "v=0".into(),
            },
        )
        .await;

    assert_eq!(output.total().await, 0);
    // The sender is untouched by the drop.
    assert!(registry.contains(&a));
}
