//! Ethereum JSON-RPC client: `eth_call` reads against the factory and
//! campaign contracts, decoded straight into [`crate::models`] records.
//!
//! ## Resilience
//!
//! * Reads are idempotent, so a transport failure or a rate-limit response is
//!   retried with exponential back-off, at most `max_attempts` times in total.
//! * JSON-RPC error objects (reverts included) are never retried; they are
//!   returned unchanged as [`GatewayError::Rpc`].
//! * Nothing in this module sends a transaction.

use std::time::Duration;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::abi::{AggregatorV3Interface, ICrowdfunding, ICrowdfundingFactory};
use crate::errors::{GatewayError, Result};
use crate::models::{self, CampaignDetail, CampaignSummary, FundingTier, PriceQuote};

const MAX_BACKOFF_SECS: u64 = 8;
const INITIAL_BACKOFF_SECS: u64 = 1;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    rpc_url: String,
    max_attempts: u32,
}

impl RpcClient {
    pub fn new(client: Client, rpc_url: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Send one JSON-RPC request and return its `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let mut backoff = INITIAL_BACKOFF_SECS;
        let mut attempt = 1;

        loop {
            let response = self
                .client
                .post(&self.rpc_url)
                .json(&json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": method,
                    "params": params,
                }))
                .send()
                .await;

            match response {
                Err(e) if attempt < self.max_attempts && (e.is_connect() || e.is_timeout()) => {
                    warn!("{method} failed (attempt {attempt}, retrying in {backoff}s): {e}");
                }
                Err(e) => return Err(e.into()),
                Ok(resp)
                    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
                        && attempt < self.max_attempts =>
                {
                    warn!("{method} rate-limited (attempt {attempt}, retrying in {backoff}s)");
                }
                Ok(resp) => {
                    let body: RpcResponse = resp.error_for_status()?.json().await?;
                    if let Some(err) = body.error {
                        return Err(GatewayError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    return body.result.ok_or_else(|| {
                        GatewayError::Decode(format!("Empty result from {method}"))
                    });
                }
            }

            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = (backoff * 2).min(MAX_BACKOFF_SECS);
            attempt += 1;
        }
    }

    /// `eth_chainId`, used by the health endpoint.
    pub async fn chain_id(&self) -> Result<u64> {
        let value = self.request("eth_chainId", json!([])).await?;
        let hex_str = value
            .as_str()
            .ok_or_else(|| GatewayError::Decode("eth_chainId result is not a string".to_string()))?;
        u64::from_str_radix(hex_str.trim_start_matches("0x"), 16)
            .map_err(|e| GatewayError::Decode(format!("eth_chainId: {e}")))
    }

    /// Raw `eth_call` at the latest block.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>> {
        let params = build_call_params(to, data);
        let value = self.request("eth_call", params).await?;
        decode_hex_result(&value)
    }

    /// Encode `call`, run it against `to`, and decode the typed return.
    async fn call<C: SolCall>(&self, to: Address, call: &C) -> Result<C::Return> {
        let raw = self.eth_call(to, &call.abi_encode()).await?;
        debug!("{} on {to} returned {} bytes", C::SIGNATURE, raw.len());
        C::abi_decode_returns(&raw, true)
            .map_err(|e| GatewayError::Decode(format!("{}: {e}", C::SIGNATURE)))
    }

    // ─────────────────────────────────────────────────────
    // Factory reads
    // ─────────────────────────────────────────────────────

    pub async fn all_campaigns(&self, factory: Address) -> Result<Vec<CampaignSummary>> {
        let ret = self
            .call(factory, &ICrowdfundingFactory::getAllCampaignsCall {})
            .await?;
        ret._0.into_iter().map(CampaignSummary::try_from).collect()
    }

    pub async fn user_campaigns(
        &self,
        factory: Address,
        user: Address,
    ) -> Result<Vec<CampaignSummary>> {
        let ret = self
            .call(factory, &ICrowdfundingFactory::getUserCampaignsCall { _user: user })
            .await?;
        ret._0.into_iter().map(CampaignSummary::try_from).collect()
    }

    // ─────────────────────────────────────────────────────
    // Campaign reads
    // ─────────────────────────────────────────────────────

    /// `getCampaignDetails()` and `getTotalRaisedUSD()`, read concurrently.
    /// The two may reflect different blocks.
    pub async fn campaign_detail(&self, campaign: Address) -> Result<CampaignDetail> {
        let (details, raised) = tokio::try_join!(
            self.call(campaign, &ICrowdfunding::getCampaignDetailsCall {}),
            self.call(campaign, &ICrowdfunding::getTotalRaisedUSDCall {}),
        )?;
        CampaignDetail::from_parts(campaign, details, raised._0)
    }

    pub async fn tiers(&self, campaign: Address) -> Result<Vec<FundingTier>> {
        let ret = self.call(campaign, &ICrowdfunding::getTiersCall {}).await?;
        models::tiers_from_raw(ret._0)
    }

    pub async fn price_quote(&self, campaign: Address) -> Result<PriceQuote> {
        let ret = self
            .call(campaign, &ICrowdfunding::getLatestETHPriceCall {})
            .await?;
        Ok(PriceQuote::from_oracle(ret._0))
    }

    /// Quote straight from the ETH/USD feed, for requests made before any
    /// campaign exists (campaign creation).
    pub async fn feed_quote(&self, feed: Address) -> Result<PriceQuote> {
        let ret = self
            .call(feed, &AggregatorV3Interface::latestRoundDataCall {})
            .await?;
        Ok(PriceQuote::from_oracle(ret.answer))
    }

    pub async fn contract_balance(&self, campaign: Address) -> Result<U256> {
        let ret = self
            .call(campaign, &ICrowdfunding::getContractBalanceCall {})
            .await?;
        Ok(ret._0)
    }

    pub async fn tier_price_wei(&self, campaign: Address, index: usize) -> Result<U256> {
        let ret = self
            .call(
                campaign,
                &ICrowdfunding::getTierPriceInWeiCall {
                    _index: U256::from(index),
                },
            )
            .await?;
        Ok(ret._0)
    }
}

fn build_call_params(to: Address, data: &[u8]) -> Value {
    json!([
        {
            "to": to.to_string(),
            "data": format!("0x{}", hex::encode(data)),
        },
        "latest"
    ])
}

fn decode_hex_result(value: &Value) -> Result<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| GatewayError::Decode("eth_call result is not a string".to_string()))?;
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| GatewayError::Decode(format!("eth_call result is not hex: {e}")))
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
