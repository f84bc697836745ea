//! Typed records of the values read from the factory and campaign contracts.
//!
//! Each record is a read-only projection of contract state. Raw ABI return
//! tuples are converted here, at the boundary, and nothing downstream sees
//! them. USD amounts are 8-decimal fixed point (`*_usd8`), ETH amounts are
//! wei (`*_wei`); the suffix is part of every field name that carries one.

use alloy_primitives::{Address, I256, U256};
use serde::Serialize;

use crate::abi::{CampaignInfo, ICrowdfunding, Tier};
use crate::errors::{GatewayError, Result};

/// One campaign as listed by the factory. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub address: Address,
    pub owner: Address,
    pub name: String,
    pub creation_time: u64,
}

/// Snapshot of a single campaign, fetched per request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignDetail {
    pub address: Address,
    pub name: String,
    pub description: String,
    pub goal_usd8: U256,
    pub deadline: u64,
    pub owner: Address,
    pub paused: bool,
    /// Raw `uint8` state as returned; see [`crate::status::classify`].
    pub state: u8,
    pub raised_wei: U256,
    /// Contract-side USD valuation of everything raised so far.
    pub raised_usd8: U256,
    pub backer_count: u64,
}

/// A funding tier. `index` is its on-chain identity for `fund` and `removeTier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingTier {
    pub index: usize,
    pub name: String,
    pub amount_usd8: U256,
    pub backer_count: u64,
}

/// ETH/USD oracle reading, 8-decimal USD per ETH.
///
/// Only valid for the request that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub eth_usd_rate8: U256,
}

impl PriceQuote {
    /// Oracle answers are signed by convention; the sign carries no meaning here.
    pub fn from_oracle(answer: I256) -> Self {
        Self {
            eth_usd_rate8: answer.unsigned_abs(),
        }
    }

    pub fn is_available(&self) -> bool {
        !self.eth_usd_rate8.is_zero()
    }

    /// USD per ETH as a display decimal.
    pub fn rate(&self) -> f64 {
        crate::units::usd8_to_decimal(self.eth_usd_rate8)
    }
}

impl TryFrom<CampaignInfo> for CampaignSummary {
    type Error = GatewayError;

    fn try_from(raw: CampaignInfo) -> Result<Self> {
        Ok(Self {
            address: raw.campaignAddress,
            owner: raw.owner,
            name: raw.name,
            creation_time: to_u64(raw.creationTime, "creationTime")?,
        })
    }
}

impl CampaignDetail {
    /// Build the snapshot from `getCampaignDetails()` plus the separately
    /// read `getTotalRaisedUSD()`.
    pub fn from_parts(
        address: Address,
        raw: ICrowdfunding::getCampaignDetailsReturn,
        raised_usd8: U256,
    ) -> Result<Self> {
        Ok(Self {
            address,
            name: raw.name,
            description: raw.description,
            goal_usd8: raw.goal,
            deadline: to_u64(raw.deadline, "deadline")?,
            owner: raw.owner,
            paused: raw.paused,
            state: raw.state,
            raised_wei: raw.raised,
            raised_usd8,
            backer_count: to_u64(raw.backers, "backers")?,
        })
    }
}

/// Convert the contract's tier array, keeping insertion order as index.
pub fn tiers_from_raw(raw: Vec<Tier>) -> Result<Vec<FundingTier>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, t)| {
            Ok(FundingTier {
                index,
                name: t.name,
                amount_usd8: t.amount,
                backer_count: to_u64(t.backers, "backers")?,
            })
        })
        .collect()
}

fn to_u64(value: U256, field: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| GatewayError::Decode(format!("{field} does not fit in u64: {value}")))
}
