use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use beacon_core::{ClientMessage, PeerId, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::relay::RoomRelay;
use crate::signaling::SignalingState;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SignalingState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SignalingState) {
    // The coordinator mints the identifier; clients learn theirs from
    // the welcome message.
    let peer_id = PeerId::new();

    if let Err(e) = state.relay.registry().register(peer_id) {
        error!(%peer_id, "cannot register connection: {e}");
        return;
    }
    info!(%peer_id, "new signaling connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.service.add_peer(peer_id, tx);
    state.service.send(
        peer_id,
        &ServerMessage::Welcome {
            peer_id,
            ice_servers: state.service.ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = state.relay.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => dispatch(&relay, peer_id, client_msg).await,
                        Err(e) => warn!(%peer_id, "invalid frame, skipping: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.relay.disconnect(peer_id).await;
    state.service.remove_peer(&peer_id);
    info!(%peer_id, "signaling connection closed");
}

/// Pure pass-through: each negotiation op is rewrapped with the sender
/// identifier and handed to the relay, payload untouched.
pub async fn dispatch(relay: &RoomRelay, from: PeerId, msg: ClientMessage) {
    match msg {
        ClientMessage::Join { room, user } => relay.join(from, room, user).await,
        ClientMessage::Offer { sdp, target } => {
            relay
                .relay(from, target, ServerMessage::Offer { from, sdp })
                .await
        }
        ClientMessage::Answer { sdp, target } => {
            relay
                .unicast(from, target, ServerMessage::Answer { from, sdp })
                .await
        }
        ClientMessage::IceCandidate { candidate, target } => {
            relay
                .relay(from, target, ServerMessage::IceCandidate { from, candidate })
                .await
        }
        ClientMessage::NegoNeeded { sdp, target } => {
            relay
                .unicast(from, target, ServerMessage::NegoNeeded { from, sdp })
                .await
        }
        ClientMessage::NegoDone { sdp, target } => {
            relay
                .unicast(from, target, ServerMessage::NegoDone { from, sdp })
                .await
        }
    }
}
