//! Axum REST API handlers.
//!
//! Read endpoints fetch fresh chain values on every call and return views;
//! `tx/*` endpoints return one unsigned [`TransactionRequest`] per call.

use std::future::Future;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::{GatewayError, Result};
use crate::models::{CampaignDetail, CampaignSummary};
use crate::requests::{
    self, AddTierForm, CreateCampaignForm, ExtendDeadlineForm, TierIndexForm, TransactionRequest,
};
use crate::rpc::RpcClient;
use crate::views::{self, CampaignCardView, ListedCampaign};

/// Campaigns read at once when building a listing; each costs three RPC calls.
const MAX_CONCURRENT_CAMPAIGN_READS: usize = 4;

#[derive(Clone)]
pub struct ApiState {
    pub rpc: RpcClient,
    pub config: Config,
}

// ─────────────────────────────────────────────────────────
// Request / response shapes
// ─────────────────────────────────────────────────────────

/// `?account=0x…`: the connected wallet, if any.
#[derive(Debug, Default, Deserialize)]
pub struct ViewerQuery {
    pub account: Option<String>,
}

impl ViewerQuery {
    fn viewer(&self) -> Result<Option<Address>> {
        self.account
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_address(s, "account"))
            .transpose()
    }
}

#[derive(Serialize)]
pub struct CampaignsResponse {
    pub count: usize,
    pub campaigns: Vec<ListedCampaign>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub chain_id: Option<u64>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ─────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────

fn parse_address(raw: &str, what: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|_| GatewayError::BadRequest(format!("invalid {what} address: {raw}")))
}

fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
        GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GatewayError::Http(_)
        | GatewayError::Rpc { .. }
        | GatewayError::Decode(_)
        | GatewayError::Json(_)
        | GatewayError::UnknownState(_) => StatusCode::BAD_GATEWAY,
    }
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("Request failed: {e}");
            } else {
                warn!("Request rejected: {e}");
            }
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn built(req: TransactionRequest) -> Result<TransactionRequest> {
    info!(
        method = req.method,
        to = %req.to,
        value = %req.value,
        warnings = req.warnings.len(),
        "Built transaction request"
    );
    Ok(req)
}

async fn card_for(
    rpc: &RpcClient,
    campaign: Address,
    now: u64,
    explorer_url: &str,
) -> Result<CampaignCardView> {
    let (detail, quote) =
        tokio::try_join!(rpc.campaign_detail(campaign), rpc.price_quote(campaign))?;
    Ok(views::campaign_card(&detail, &quote, now, explorer_url))
}

/// Run `read` for every item with at most `limit` reads in flight. Results
/// keep input order; a task that panicked leaves `None` in its slot.
async fn bounded_reads<I, T, F, Fut>(items: Vec<I>, limit: usize, read: F) -> Vec<Option<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let mut set = JoinSet::new();
    let len = items.len();
    for (i, item) in items.into_iter().enumerate() {
        let permits = permits.clone();
        let pending = read(item);
        set.spawn(async move {
            let _permit = permits.acquire_owned().await;
            (i, pending.await)
        });
    }

    let mut results: Vec<Option<T>> = (0..len).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((i, value)) => results[i] = Some(value),
            Err(e) => error!("Campaign read task failed: {e}"),
        }
    }
    results
}

/// Build one listing row per summary. Order follows the factory's listing.
async fn list_rows(state: &ApiState, summaries: Vec<CampaignSummary>) -> Vec<ListedCampaign> {
    let now = now_unix();
    let addresses: Vec<Address> = summaries.iter().map(|s| s.address).collect();
    let cards = bounded_reads(addresses, MAX_CONCURRENT_CAMPAIGN_READS, |address| {
        let rpc = state.rpc.clone();
        let explorer = state.config.explorer_url.clone();
        async move {
            card_for(&rpc, address, now, &explorer)
                .await
                .map_err(|e| e.to_string())
        }
    })
    .await;

    summaries
        .iter()
        .zip(cards)
        .map(|(summary, card)| {
            views::listed_campaign(
                summary,
                card.unwrap_or_else(|| Err("campaign read task failed".to_string())),
            )
        })
        .collect()
}

async fn load_detail(state: &ApiState, raw_address: &str) -> Result<CampaignDetail> {
    let campaign = parse_address(raw_address, "campaign")?;
    state.rpc.campaign_detail(campaign).await
}

// ─────────────────────────────────────────────────────────
// Read handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let chain_id = match state.rpc.chain_id().await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Health check could not reach RPC: {e}");
            None
        }
    };
    Json(HealthResponse {
        status: if chain_id.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        chain_id,
    })
}

/// `GET /campaigns`
///
/// Card views for every campaign the factory lists.
pub async fn get_all_campaigns(State(state): State<Arc<ApiState>>) -> Response {
    let result = async {
        let summaries = state.rpc.all_campaigns(state.config.factory_address).await?;
        let campaigns = list_rows(&state, summaries).await;
        Ok::<_, GatewayError>(CampaignsResponse {
            count: campaigns.len(),
            campaigns,
        })
    }
    .await;
    respond(result)
}

/// `GET /campaigns/:address`
///
/// Full campaign page: details, tiers, balance, eligibility and viewer role.
pub async fn get_campaign(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Response {
    let result = async {
        let campaign = parse_address(&address, "campaign")?;
        let viewer = query.viewer()?;
        let rpc = &state.rpc;
        let (detail, tiers, quote, balance) = tokio::try_join!(
            rpc.campaign_detail(campaign),
            rpc.tiers(campaign),
            rpc.price_quote(campaign),
            rpc.contract_balance(campaign),
        )?;
        Ok::<_, GatewayError>(views::campaign_page(
            &detail,
            &tiers,
            &quote,
            balance,
            now_unix(),
            &state.config.explorer_url,
            &viewer,
        ))
    }
    .await;
    respond(result)
}

/// `GET /dashboard/:wallet`
///
/// Card views for the campaigns created by `wallet`.
pub async fn get_dashboard(
    State(state): State<Arc<ApiState>>,
    Path(wallet): Path<String>,
) -> Response {
    let result = async {
        let wallet = parse_address(&wallet, "wallet")?;
        let summaries = state
            .rpc
            .user_campaigns(state.config.factory_address, wallet)
            .await?;
        let rows = list_rows(&state, summaries).await;
        Ok::<_, GatewayError>(views::dashboard(wallet, rows))
    }
    .await;
    respond(result)
}

// ─────────────────────────────────────────────────────────
// Transaction-request handlers
// ─────────────────────────────────────────────────────────

/// `POST /tx/create-campaign`
pub async fn tx_create_campaign(
    State(state): State<Arc<ApiState>>,
    Json(form): Json<CreateCampaignForm>,
) -> Response {
    let result = async {
        // Read the price as late as possible; see `requests::create_campaign`.
        let quote = state.rpc.feed_quote(state.config.price_feed_address).await?;
        built(requests::create_campaign(
            state.config.factory_address,
            &form,
            &quote,
        )?)
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/add-tier`
pub async fn tx_add_tier(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
    Json(form): Json<AddTierForm>,
) -> Response {
    let result = async {
        let viewer = query.viewer()?;
        let detail = load_detail(&state, &address).await?;
        built(requests::add_tier(&detail, &form, &viewer)?)
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/remove-tier`
pub async fn tx_remove_tier(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
    Json(form): Json<TierIndexForm>,
) -> Response {
    let result = async {
        let viewer = query.viewer()?;
        let campaign = parse_address(&address, "campaign")?;
        let (detail, tiers) =
            tokio::try_join!(state.rpc.campaign_detail(campaign), state.rpc.tiers(campaign))?;
        built(requests::remove_tier(&detail, &tiers, &form, &viewer)?)
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/fund`
pub async fn tx_fund(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Json(form): Json<TierIndexForm>,
) -> Response {
    let result = async {
        let campaign = parse_address(&address, "campaign")?;
        let (detail, tiers) =
            tokio::try_join!(state.rpc.campaign_detail(campaign), state.rpc.tiers(campaign))?;
        // Only ask for a price the contract can answer; the builder reports
        // the out-of-range index otherwise.
        let price_wei = if form.tier_index < tiers.len() {
            state.rpc.tier_price_wei(campaign, form.tier_index).await?
        } else {
            U256::ZERO
        };
        built(requests::fund(&detail, &tiers, &form, price_wei)?)
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/extend-deadline`
pub async fn tx_extend_deadline(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
    Json(form): Json<ExtendDeadlineForm>,
) -> Response {
    let result = async {
        let viewer = query.viewer()?;
        let detail = load_detail(&state, &address).await?;
        built(requests::extend_deadline(&detail, &form, &viewer)?)
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/toggle-pause`
pub async fn tx_toggle_pause(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Response {
    let result = async {
        let viewer = query.viewer()?;
        let detail = load_detail(&state, &address).await?;
        built(requests::toggle_pause(&detail, &viewer))
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/withdraw`
pub async fn tx_withdraw(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Response {
    let result = async {
        let viewer = query.viewer()?;
        let detail = load_detail(&state, &address).await?;
        built(requests::withdraw(&detail, &viewer))
    }
    .await;
    respond(result)
}

/// `POST /campaigns/:address/tx/refund`
pub async fn tx_refund(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> Response {
    let result = async {
        let viewer = query.viewer()?;
        let detail = load_detail(&state, &address).await?;
        built(requests::refund(&detail, &viewer))
    }
    .await;
    respond(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn bounded_reads_caps_in_flight_and_keeps_order() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = bounded_reads((0..10u64).collect(), 3, |n| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                // Later items finish first.
                tokio::time::sleep(Duration::from_millis(20 - n)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n * 2
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(results, (0..10u64).map(|n| Some(n * 2)).collect::<Vec<_>>());
    }

    #[test]
    fn viewer_query_parsing() {
        let q = ViewerQuery { account: None };
        assert_eq!(q.viewer().unwrap(), None);

        let q = ViewerQuery {
            account: Some(format!("0x{}", "11".repeat(20))),
        };
        assert_eq!(q.viewer().unwrap(), Some(Address::repeat_byte(0x11)));

        let q = ViewerQuery {
            account: Some("not-an-address".to_string()),
        };
        assert!(matches!(q.viewer(), Err(GatewayError::BadRequest(_))));
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            status_for(&GatewayError::Validation(ValidationError::NameRequired)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&GatewayError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&GatewayError::Rpc {
                code: 3,
                message: "execution reverted".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn validation_errors_become_422() {
        let resp = respond::<()>(Err(ValidationError::GoalNotPositive.into()));
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
