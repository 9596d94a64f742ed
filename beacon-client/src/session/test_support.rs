use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use beacon_core::{ClientMessage, IceCandidate, PeerId};

use crate::session::SignalSink;
use crate::transport::{PeerTransport, SdpKind, TransportError, TransportFactory};

/// Scripted transport: descriptions are canned strings, every call is
/// observable through the shared probe.
#[derive(Default)]
pub(crate) struct TransportProbe {
    pub local_descriptions: Mutex<Vec<(SdpKind, String)>>,
    pub remote_descriptions: Mutex<Vec<(SdpKind, String)>>,
    pub applied_candidates: Mutex<Vec<IceCandidate>>,
    pub tracks: Mutex<Vec<String>>,
    pub closed: AtomicBool,
}

pub(crate) struct MockTransport {
    name: String,
    probe: Arc<TransportProbe>,
}

impl MockTransport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            probe: Arc::new(TransportProbe::default()),
        }
    }

    pub fn probe(&self) -> Arc<TransportProbe> {
        self.probe.clone()
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<String, TransportError> {
        Ok(format!("offer-sdp:{}", self.name))
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        Ok(format!("answer-sdp:{}", self.name))
    }

    async fn set_local_description(&self, kind: SdpKind, sdp: &str) -> Result<(), TransportError> {
        self.probe
            .local_descriptions
            .lock()
            .unwrap()
            .push((kind, sdp.to_string()));
        Ok(())
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: &str) -> Result<(), TransportError> {
        self.probe
            .remote_descriptions
            .lock()
            .unwrap()
            .push((kind, sdp.to_string()));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), TransportError> {
        self.probe
            .applied_candidates
            .lock()
            .unwrap()
            .push(candidate.clone());
        Ok(())
    }

    async fn add_track(&self, track_id: &str) -> Result<(), TransportError> {
        self.probe.tracks.lock().unwrap().push(track_id.to_string());
        Ok(())
    }

    async fn close(&self) {
        self.probe.closed.store(true, Ordering::SeqCst);
    }
}

/// Captures everything the machine pushes toward the coordinator.
#[derive(Default)]
pub(crate) struct RecordingSink {
    sent: Mutex<Vec<ClientMessage>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.sent.lock().unwrap())
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn send(&self, msg: ClientMessage) {
        self.sent.lock().unwrap().push(msg);
    }
}

/// Factory handing out mock transports and remembering their probes.
#[derive(Default)]
pub(crate) struct MockFactory {
    pub probes: Mutex<Vec<(PeerId, Arc<TransportProbe>)>>,
}

impl MockFactory {
    pub fn probe_for(&self, remote: &PeerId) -> Option<Arc<TransportProbe>> {
        self.probes
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == remote)
            .map(|(_, probe)| probe.clone())
    }
}

#[async_trait]
impl TransportFactory for MockFactory {
    type Transport = MockTransport;

    async fn create(&self, remote: PeerId) -> Result<MockTransport, TransportError> {
        let transport = MockTransport::new(&remote.to_string());
        self.probes
            .lock()
            .unwrap()
            .push((remote, transport.probe()));
        Ok(transport)
    }
}

/// A pair of identifiers with a known order, so glare tests can pick
/// the polite and impolite side deterministically.
pub(crate) fn ordered_ids() -> (PeerId, PeerId) {
    let (a, b) = (PeerId::new(), PeerId::new());
    if a < b { (a, b) } else { (b, a) }
}
