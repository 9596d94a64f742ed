use beacon_core::{PeerId, RoomId, ServerMessage};

use crate::integration::{create_relay, init_tracing};

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    init_tracing();

    let (registry, output, relay) = create_relay();
    let room = RoomId::new("r1").unwrap();
    let (a, b) = (PeerId::new(), PeerId::new());
    for p in [a, b] {
        registry.register(p).unwrap();
        relay.join(p, room.clone(), None).await;
    }
    output.take().await;

    relay.disconnect(a).await;

    let b_msgs = output.messages_for(&b).await;
    assert!(matches!(
        b_msgs.as_slice(),
        [ServerMessage::PeerLeft { peer_id }] if *peer_id == a
    ));
    assert!(!registry.contains(&a));
    assert_eq!(registry.members(&room), vec![b]);
    output.take().await;

    // Second cleanup for the same connection: same state, no traffic.
    relay.disconnect(a).await;
    assert_eq!(output.total().await, 0);
    assert_eq!(registry.members(&room), vec![b]);

    // Last member out prunes the room entirely.
    relay.disconnect(b).await;
    assert!(registry.members(&room).is_empty());
    assert_eq!(output.total().await, 0);
}
