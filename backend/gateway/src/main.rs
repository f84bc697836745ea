//! BlockRaise Gateway — entry point.
//!
//! Reads the campaign factory and per-campaign crowdfunding contracts over
//! Ethereum JSON-RPC and serves display-ready views plus unsigned
//! transaction requests through a small Axum REST API. Signing and
//! submission stay with the user's wallet.

mod abi;
mod api;
mod config;
mod errors;
mod models;
mod requests;
mod rpc;
mod status;
mod units;
mod views;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use rpc::RpcClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.rpc_timeout_secs))
        .build()?;
    let rpc = RpcClient::new(client, config.rpc_url.clone(), config.rpc_max_attempts);

    match rpc.chain_id().await {
        Ok(id) => info!("Connected to chain {id} via {}", config.rpc_url),
        Err(e) => warn!("RPC not reachable at startup ({}): {e}", config.rpc_url),
    }
    info!(
        "Factory {}, price feed {}",
        config.factory_address, config.price_feed_address
    );

    let api_state = Arc::new(api::ApiState {
        rpc,
        config: config.clone(),
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/campaigns", get(api::get_all_campaigns))
        .route("/campaigns/:address", get(api::get_campaign))
        .route("/dashboard/:wallet", get(api::get_dashboard))
        .route("/tx/create-campaign", post(api::tx_create_campaign))
        .route("/campaigns/:address/tx/add-tier", post(api::tx_add_tier))
        .route("/campaigns/:address/tx/remove-tier", post(api::tx_remove_tier))
        .route("/campaigns/:address/tx/fund", post(api::tx_fund))
        .route(
            "/campaigns/:address/tx/extend-deadline",
            post(api::tx_extend_deadline),
        )
        .route(
            "/campaigns/:address/tx/toggle-pause",
            post(api::tx_toggle_pause),
        )
        .route("/campaigns/:address/tx/withdraw", post(api::tx_withdraw))
        .route("/campaigns/:address/tx/refund", post(api::tx_refund))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(api_state);

    // ─── Shutdown on Ctrl-C ───────────────────────────────
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
            }
            shutdown.cancel();
        }
    });

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
