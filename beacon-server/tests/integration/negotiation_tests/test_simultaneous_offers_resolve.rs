use beacon_client::NegotiationState;
use beacon_core::{ClientMessage, RoomId, ServerMessage};
use beacon_server::dispatch;

use crate::integration::init_tracing;
use crate::utils::TestHarness;

/// Both peers fire an initial offer at the same instant. The
/// identifier-order tie-break must leave exactly one offer standing
/// and converge both sides.
#[tokio::test]
async fn test_simultaneous_offers_resolve() {
    init_tracing();

    let harness = TestHarness::new();
    let mut a = harness.connect("a", "r1");
    let mut b = harness.connect("b", "r1");

    // Put both into the room at the relay, discarding the join events
    // so neither session initiates through the normal path.
    let room = RoomId::new("r1").unwrap();
    dispatch(
        &harness.relay,
        a.id,
        ClientMessage::Join {
            room: room.clone(),
            user: None,
        },
    )
    .await;
    dispatch(
        &harness.relay,
        b.id,
        ClientMessage::Join { room, user: None },
    )
    .await;
    while a.inbox.try_recv().is_ok() {}
    while b.inbox.try_recv().is_ok() {}

    // Now both believe the other just joined, and both offer at once.
    a.session
        .handle_server_message(ServerMessage::PeerJoined {
            peer_id: b.id,
            user: None,
        })
        .await
        .unwrap();
    b.session
        .handle_server_message(ServerMessage::PeerJoined {
            peer_id: a.id,
            user: None,
        })
        .await
        .unwrap();
    assert_eq!(
        a.session.peer_state(&b.id),
        Some(NegotiationState::HaveLocalOffer)
    );
    assert_eq!(
        b.session.peer_state(&a.id),
        Some(NegotiationState::HaveLocalOffer)
    );

    harness.pump(&mut [&mut a, &mut b]).await;

    assert_eq!(
        a.session.peer_state(&b.id),
        Some(NegotiationState::Connected)
    );
    assert_eq!(
        b.session.peer_state(&a.id),
        Some(NegotiationState::Connected)
    );

    // Exactly one description applied per side: the yielding peer took
    // the winner's offer, the winner took the answer.
    let probe_a = a.factory.probe_for(&b.id).unwrap();
    let probe_b = b.factory.probe_for(&a.id).unwrap();
    assert_eq!(probe_a.remote_descriptions.lock().unwrap().len(), 1);
    assert_eq!(probe_b.remote_descriptions.lock().unwrap().len(), 1);
}
