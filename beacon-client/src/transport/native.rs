use std::sync::Arc;

use async_trait::async_trait;
use beacon_core::{IceCandidate, IceServerConfig, PeerId};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MediaEngine};
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::transport::{
    PeerTransport, SdpKind, TransportError, TransportEvent, TransportFactory,
};

#[derive(Clone)]
pub struct NativeTransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for NativeTransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
        }
    }
}

/// [`PeerTransport`] over a native `webrtc` peer connection, for
/// non-browser embeddings and end-to-end tests. Trickle-ICE and
/// negotiation-needed callbacks are forwarded into `event_tx` for the
/// owner to feed back into the negotiation machine.
pub struct NativePeerTransport {
    remote_id: PeerId,
    pc: Arc<RTCPeerConnection>,
    data_channel: Mutex<Option<Arc<RTCDataChannel>>>,
}

impl NativePeerTransport {
    pub async fn new(
        remote_id: PeerId,
        config: NativeTransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|s| RTCIceServer {
                    urls: s.urls,
                    username: s.username.unwrap_or_default(),
                    credential: s.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| TransportError::Setup(e.to_string()))?,
        );

        let state_tx = event_tx.clone();
        let state_remote = remote_id;
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                debug!(remote = %state_remote, ?state, "peer connection state changed");
                match state {
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(TransportEvent::Disconnected).await;
                    }
                    _ => {}
                }
            })
        }));

        let ice_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::LocalCandidate(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    }))
                    .await;
            })
        }));

        let nego_tx = event_tx.clone();
        pc.on_negotiation_needed(Box::new(move || {
            let tx = nego_tx.clone();
            Box::pin(async move {
                let _ = tx.send(TransportEvent::NegotiationNeeded).await;
            })
        }));

        // The answerer side receives the channel the offerer created.
        let dc_remote = remote_id;
        pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            Box::pin(async move {
                info!(remote = %dc_remote, label = dc.label(), "remote data channel received");
            })
        }));

        Ok(Self {
            remote_id,
            pc,
            data_channel: Mutex::new(None),
        })
    }

    fn description(kind: SdpKind, sdp: &str) -> Result<RTCSessionDescription, TransportError> {
        let desc = match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp.to_string()),
            SdpKind::Answer => RTCSessionDescription::answer(sdp.to_string()),
        };
        desc.map_err(|e| TransportError::Description(e.to_string()))
    }
}

#[async_trait]
impl PeerTransport for NativePeerTransport {
    async fn create_offer(&self) -> Result<String, TransportError> {
        // The offerer owns the data channel; creating it before the
        // offer puts it into the initial description.
        let mut dc_slot = self.data_channel.lock().await;
        if dc_slot.is_none() {
            let dc = self
                .pc
                .create_data_channel("data", None)
                .await
                .map_err(|e| TransportError::Setup(e.to_string()))?;
            let label = dc.label().to_string();
            dc.on_open(Box::new(move || {
                let label = label.clone();
                Box::pin(async move {
                    debug!(label, "data channel open");
                })
            }));
            *dc_slot = Some(dc);
        }
        drop(dc_slot);

        let offer = self
            .pc
            .create_offer(None)
            .await
            .map_err(|e| TransportError::Description(e.to_string()))?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        let answer = self
            .pc
            .create_answer(None)
            .await
            .map_err(|e| TransportError::Description(e.to_string()))?;
        Ok(answer.sdp)
    }

    async fn set_local_description(&self, kind: SdpKind, sdp: &str) -> Result<(), TransportError> {
        self.pc
            .set_local_description(Self::description(kind, sdp)?)
            .await
            .map_err(|e| TransportError::Description(e.to_string()))
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: &str) -> Result<(), TransportError> {
        self.pc
            .set_remote_description(Self::description(kind, sdp)?)
            .await
            .map_err(|e| TransportError::Description(e.to_string()))
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), TransportError> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate.clone(),
                sdp_mid: candidate.sdp_mid.clone(),
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: None,
            })
            .await
            .map_err(|e| TransportError::Candidate(e.to_string()))
    }

    async fn add_track(&self, track_id: &str) -> Result<(), TransportError> {
        let track: Arc<dyn TrackLocal + Send + Sync> = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            track_id.to_owned(),
            "beacon".to_owned(),
        ));
        self.pc
            .add_track(track)
            .await
            .map_err(|e| TransportError::Track(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) {
        if let Err(e) = self.pc.close().await {
            warn!(remote = %self.remote_id, "error closing peer connection: {e}");
        }
    }
}

/// Builds one [`NativePeerTransport`] per remote peer, tagging every
/// transport event with the peer it belongs to.
pub struct NativeTransportFactory {
    config: NativeTransportConfig,
    events: mpsc::Sender<(PeerId, TransportEvent)>,
}

impl NativeTransportFactory {
    pub fn new(
        config: NativeTransportConfig,
        events: mpsc::Sender<(PeerId, TransportEvent)>,
    ) -> Self {
        Self { config, events }
    }
}

#[async_trait]
impl TransportFactory for NativeTransportFactory {
    type Transport = NativePeerTransport;

    async fn create(&self, remote: PeerId) -> Result<NativePeerTransport, TransportError> {
        let (tx, mut rx) = mpsc::channel(64);
        let transport = NativePeerTransport::new(remote, self.config.clone(), tx).await?;

        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if events.send((remote, event)).await.is_err() {
                    break;
                }
            }
        });

        Ok(transport)
    }
}
