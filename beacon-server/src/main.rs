use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

use beacon_core::IceServerConfig;
use beacon_server::{ConnectionRegistry, RoomRelay, SignalingService, SignalingState, ws_handler};

#[derive(Parser)]
#[command(name = "beacon-server")]
#[command(about = "Room-scoped WebRTC signaling coordinator")]
struct Args {
    /// Address the signaling endpoint binds to.
    #[arg(long, default_value = "0.0.0.0:5000")]
    bind: SocketAddr,

    /// STUN/TURN urls advertised to clients in the welcome message.
    /// Repeat the flag for multiple servers.
    #[arg(long = "ice-server", default_value = "stun:stun.l.google.com:19302")]
    ice_servers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();

    let registry = Arc::new(ConnectionRegistry::new());
    let service = SignalingService::new(
        args.ice_servers
            .into_iter()
            .map(IceServerConfig::stun)
            .collect(),
    );
    let relay = Arc::new(RoomRelay::new(registry, Arc::new(service.clone())));

    let app = Router::new()
        .route("/", get(|| async { "beacon signaling server" }))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(SignalingState { service, relay });

    info!("listening on {}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
