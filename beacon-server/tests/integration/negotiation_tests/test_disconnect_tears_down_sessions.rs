use std::sync::atomic::Ordering;

use beacon_client::NegotiationState;

use crate::integration::init_tracing;
use crate::utils::TestHarness;

#[tokio::test]
async fn test_disconnect_tears_down_sessions() {
    init_tracing();

    let harness = TestHarness::new();
    let mut a = harness.connect("a", "r1");
    let mut b = harness.connect("b", "r1");

    a.session.join().await;
    harness.pump(&mut [&mut a]).await;
    b.session.join().await;
    harness.pump(&mut [&mut a, &mut b]).await;
    assert_eq!(
        a.session.peer_state(&b.id),
        Some(NegotiationState::Connected)
    );

    let probe = a.factory.probe_for(&b.id).unwrap();

    // B's transport drops; A learns through peer-left and closes the
    // pairwise machine.
    harness.disconnect(&b).await;
    harness.pump(&mut [&mut a]).await;

    assert!(a.session.peer_ids().is_empty());
    assert!(probe.closed.load(Ordering::SeqCst));
    assert!(!harness.registry.contains(&b.id));
}
