//! Construction of unsigned contract-call requests from form input.
//!
//! Every builder is pure and returns exactly one [`TransactionRequest`]; the
//! wallet signs and submits it. Nothing here retries, queues or deduplicates.
//! Validation only rejects input that is certainly wrong, the contract stays
//! the authority. Owner/backer checks are reported as `warnings`, never as
//! errors.
//!
//! Goal convention: campaign goals are typed in ETH and stored on-chain as
//! USD-8, converted with the price quote read just before building.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use crate::abi::{ICrowdfunding, ICrowdfundingFactory};
use crate::errors::ValidationError;
use crate::models::{CampaignDetail, FundingTier, PriceQuote};
use crate::status::{self, CurrentAccountProvider, ViewerRole};
use crate::units::{self, ETH_DECIMALS, USD_DECIMALS};

type Result<T> = std::result::Result<T, ValidationError>;

/// A contract call ready for a wallet to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub to: Address,
    /// Solidity signature, e.g. `fund(uint256)`.
    pub method: &'static str,
    /// Human-readable parameters, in call order.
    pub args: Vec<String>,
    /// ABI calldata, 0x-prefixed.
    pub data: String,
    /// Wei attached to the call.
    pub value: U256,
    pub warnings: Vec<String>,
}

impl TransactionRequest {
    fn new<C: SolCall>(to: Address, call: &C, args: Vec<String>) -> Self {
        Self {
            to,
            method: C::SIGNATURE,
            args,
            data: format!("0x{}", hex::encode(call.abi_encode())),
            value: U256::ZERO,
            warnings: Vec::new(),
        }
    }

    fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    fn warn_if(mut self, condition: bool, message: &str) -> Self {
        if condition {
            self.warnings.push(message.to_string());
        }
        self
    }
}

// ─────────────────────────────────────────────────────────
// Form shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub goal_eth: String,
    pub duration_days: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTierForm {
    pub name: String,
    pub amount_usd: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TierIndexForm {
    pub tier_index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendDeadlineForm {
    pub additional_days: String,
}

// ─────────────────────────────────────────────────────────
// Validation helpers
// ─────────────────────────────────────────────────────────

fn require_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(trimmed)
}

fn positive_scaled(
    input: &str,
    decimals: usize,
    not_positive: ValidationError,
) -> Result<U256> {
    let scaled = units::parse_scaled(input, decimals)
        .ok_or_else(|| ValidationError::InvalidNumber(input.trim().to_string()))?;
    if !scaled.is_positive() {
        return Err(not_positive);
    }
    Ok(scaled.magnitude)
}

fn positive_whole(input: &str, invalid: ValidationError) -> Result<u64> {
    match input.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid),
    }
}

fn require_tier(tiers: &[FundingTier], index: usize) -> Result<&FundingTier> {
    tiers.get(index).ok_or(ValidationError::TierIndexOutOfRange)
}

/// Check a new tier against the campaign goal. Returns the USD-8 amount.
pub fn validate_add_tier(name: &str, amount_usd: &str, goal_usd8: U256) -> Result<U256> {
    require_name(name)?;
    let amount_usd8 = positive_scaled(
        amount_usd,
        USD_DECIMALS,
        ValidationError::TierAmountNotPositive,
    )?;
    if amount_usd8 > goal_usd8 {
        return Err(ValidationError::TierAmountExceedsGoal);
    }
    Ok(amount_usd8)
}

// ─────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────

/// `createCampaign(string,string,uint256,uint256)` on the factory.
///
/// The ETH goal is valued with `quote`; if the oracle moves before the
/// transaction is mined the stored USD goal reflects the older price.
pub fn create_campaign(
    factory: Address,
    form: &CreateCampaignForm,
    quote: &PriceQuote,
) -> Result<TransactionRequest> {
    let name = require_name(&form.name)?;
    let goal_wei = positive_scaled(&form.goal_eth, ETH_DECIMALS, ValidationError::GoalNotPositive)?;
    let duration_days = positive_whole(&form.duration_days, ValidationError::InvalidDuration)?;
    if !quote.is_available() {
        return Err(ValidationError::PriceUnavailable);
    }

    let goal_usd8 = units::wei_to_usd8(goal_wei, quote.eth_usd_rate8)
        .ok_or(ValidationError::GoalTooLarge)?;
    if goal_usd8.is_zero() {
        return Err(ValidationError::GoalNotPositive);
    }

    let call = ICrowdfundingFactory::createCampaignCall {
        _name: name.to_string(),
        _description: form.description.trim().to_string(),
        _goal: goal_usd8,
        _durationInDays: U256::from(duration_days),
    };
    let args = vec![
        name.to_string(),
        form.description.trim().to_string(),
        goal_usd8.to_string(),
        duration_days.to_string(),
    ];
    Ok(TransactionRequest::new(factory, &call, args))
}

/// `addTier(string,uint256)`, amount scaled to USD-8.
pub fn add_tier(
    campaign: &CampaignDetail,
    form: &AddTierForm,
    viewer: &impl CurrentAccountProvider,
) -> Result<TransactionRequest> {
    let amount_usd8 = validate_add_tier(&form.name, &form.amount_usd, campaign.goal_usd8)?;
    let name = form.name.trim().to_string();

    let call = ICrowdfunding::addTierCall {
        _name: name.clone(),
        _amount: amount_usd8,
    };
    Ok(
        TransactionRequest::new(campaign.address, &call, vec![name, amount_usd8.to_string()])
            .warn_if(
                !is_owner(campaign, viewer),
                "only the campaign owner can add tiers",
            ),
    )
}

/// `removeTier(uint256)`. `tiers` must be the list read for this request.
pub fn remove_tier(
    campaign: &CampaignDetail,
    tiers: &[FundingTier],
    form: &TierIndexForm,
    viewer: &impl CurrentAccountProvider,
) -> Result<TransactionRequest> {
    let tier = require_tier(tiers, form.tier_index)?;

    let call = ICrowdfunding::removeTierCall {
        _index: U256::from(tier.index),
    };
    Ok(
        TransactionRequest::new(campaign.address, &call, vec![tier.index.to_string()]).warn_if(
            !is_owner(campaign, viewer),
            "only the campaign owner can remove tiers",
        ),
    )
}

/// `fund(uint256) payable`, sending `tier_price_wei`.
///
/// `tier_price_wei` comes from `getTierPriceInWei` and is only as fresh as
/// that read; the contract may reject the payment if the price moved.
pub fn fund(
    campaign: &CampaignDetail,
    tiers: &[FundingTier],
    form: &TierIndexForm,
    tier_price_wei: U256,
) -> Result<TransactionRequest> {
    let tier = require_tier(tiers, form.tier_index)?;
    if !status::can_fund(campaign.state, campaign.paused) {
        return Err(ValidationError::NotAcceptingFunds);
    }
    if tier_price_wei.is_zero() {
        return Err(ValidationError::PriceUnavailable);
    }

    let call = ICrowdfunding::fundCall {
        _tierIndex: U256::from(tier.index),
    };
    Ok(
        TransactionRequest::new(campaign.address, &call, vec![tier.index.to_string()])
            .with_value(tier_price_wei),
    )
}

/// `extendDeadline(uint256)`.
pub fn extend_deadline(
    campaign: &CampaignDetail,
    form: &ExtendDeadlineForm,
    viewer: &impl CurrentAccountProvider,
) -> Result<TransactionRequest> {
    let days = positive_whole(&form.additional_days, ValidationError::InvalidExtension)?;

    let call = ICrowdfunding::extendDeadlineCall {
        _daysToAdd: U256::from(days),
    };
    Ok(
        TransactionRequest::new(campaign.address, &call, vec![days.to_string()]).warn_if(
            !is_owner(campaign, viewer),
            "only the campaign owner can extend the deadline",
        ),
    )
}

/// `togglePause()`.
pub fn toggle_pause(
    campaign: &CampaignDetail,
    viewer: &impl CurrentAccountProvider,
) -> TransactionRequest {
    TransactionRequest::new(campaign.address, &ICrowdfunding::togglePauseCall {}, Vec::new())
        .warn_if(
            !is_owner(campaign, viewer),
            "only the campaign owner can pause or resume",
        )
}

/// `withdraw()`.
pub fn withdraw(
    campaign: &CampaignDetail,
    viewer: &impl CurrentAccountProvider,
) -> TransactionRequest {
    TransactionRequest::new(campaign.address, &ICrowdfunding::withdrawCall {}, Vec::new())
        .warn_if(
            !is_owner(campaign, viewer),
            "only the campaign owner can withdraw",
        )
        .warn_if(
            !status::can_withdraw(campaign.state),
            "withdrawal is only possible after the campaign succeeds",
        )
}

/// `refund()`. Whether the caller actually backed the campaign is only
/// known to the contract.
pub fn refund(
    campaign: &CampaignDetail,
    viewer: &impl CurrentAccountProvider,
) -> TransactionRequest {
    TransactionRequest::new(campaign.address, &ICrowdfunding::refundCall {}, Vec::new())
        .warn_if(
            viewer.current_account().is_none(),
            "connect the wallet that backed this campaign",
        )
        .warn_if(
            !status::can_refund(campaign.state),
            "refunds are only possible after the campaign fails",
        )
}

fn is_owner(campaign: &CampaignDetail, viewer: &impl CurrentAccountProvider) -> bool {
    status::viewer_role(campaign.owner, viewer) == ViewerRole::Owner
}
