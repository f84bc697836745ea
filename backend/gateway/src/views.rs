//! Display-ready projections for the campaign card, campaign page and
//! dashboard.
//!
//! Builders take already-fetched records and an explicit `now`; they never
//! touch the network or the clock. USD figures come from the contract's own
//! USD-8 values, ETH figures from wei or from the quote, and the two are
//! never mixed without a conversion from [`crate::units`].

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::models::{CampaignDetail, CampaignSummary, FundingTier, PriceQuote};
use crate::status::{self, CurrentAccountProvider, Eligibility, StatusBadge, ViewerRole};
use crate::units;

#[derive(Debug, Clone, Serialize)]
pub struct AmountView {
    pub usd: f64,
    pub usd_display: String,
    pub eth: f64,
    pub eth_display: String,
}

impl AmountView {
    fn new(usd: f64, eth: f64) -> Self {
        Self {
            usd,
            usd_display: units::format_usd(usd),
            eth,
            eth_display: units::format_eth(eth),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignCardView {
    pub address: Address,
    pub name: String,
    pub description: String,
    pub status: StatusBadge,
    pub owner: Address,
    pub owner_short: String,
    pub owner_url: String,
    pub goal: AmountView,
    pub raised: AmountView,
    pub remaining: AmountView,
    pub progress_percent: f64,
    pub progress_display: String,
    pub backer_count: u64,
    pub countdown: String,
    pub days_left: u64,
    pub deadline_date: String,
    /// Nothing has been raised yet.
    pub awaiting_first_backer: bool,
    pub eth_usd_rate: f64,
    pub eth_usd_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierView {
    pub index: usize,
    pub name: String,
    pub amount: AmountView,
    pub backer_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignPageView {
    #[serde(flatten)]
    pub card: CampaignCardView,
    pub balance_wei: U256,
    pub balance: AmountView,
    pub tiers: Vec<TierView>,
    pub eligibility: Eligibility,
    pub viewer_role: ViewerRole,
}

/// One row of a campaign listing. A campaign whose reads failed keeps its
/// row with `error` set instead of hiding the rest of the listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListedCampaign {
    pub address: Address,
    pub name: String,
    pub created_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CampaignCardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub wallet: Address,
    pub count: usize,
    pub campaigns: Vec<ListedCampaign>,
}

// ─────────────────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────────────────

pub fn campaign_card(
    detail: &CampaignDetail,
    quote: &PriceQuote,
    now: u64,
    explorer_url: &str,
) -> CampaignCardView {
    let rate = quote.rate();

    let goal_usd = units::usd8_to_decimal(detail.goal_usd8);
    let raised_usd = units::usd8_to_decimal(detail.raised_usd8);
    let remaining_usd = units::remaining(goal_usd, raised_usd);

    let goal_eth = units::usd_to_eth(goal_usd, rate);
    let raised_eth = units::wei_to_eth(detail.raised_wei);
    let remaining_eth = units::remaining(goal_eth, raised_eth);

    let progress = units::progress_percent(raised_usd, goal_usd);

    CampaignCardView {
        address: detail.address,
        name: detail.name.clone(),
        description: detail.description.clone(),
        status: status::classify(detail.state, detail.paused),
        owner: detail.owner,
        owner_short: units::shorten_address(&detail.owner),
        owner_url: units::explorer_address_url(explorer_url, &detail.owner),
        goal: AmountView::new(goal_usd, goal_eth),
        raised: AmountView::new(raised_usd, raised_eth),
        remaining: AmountView::new(remaining_usd, remaining_eth),
        progress_percent: progress,
        progress_display: units::format_percent(progress),
        backer_count: detail.backer_count,
        countdown: units::format_countdown(detail.deadline, now),
        days_left: units::days_left(detail.deadline, now),
        deadline_date: units::format_date(detail.deadline),
        awaiting_first_backer: detail.raised_wei.is_zero(),
        eth_usd_rate: rate,
        eth_usd_display: units::format_usd(rate),
    }
}

pub fn tier_view(tier: &FundingTier, quote: &PriceQuote) -> TierView {
    let usd = units::usd8_to_decimal(tier.amount_usd8);
    TierView {
        index: tier.index,
        name: tier.name.clone(),
        amount: AmountView::new(usd, units::usd_to_eth(usd, quote.rate())),
        backer_count: tier.backer_count,
    }
}

pub fn campaign_page(
    detail: &CampaignDetail,
    tiers: &[FundingTier],
    quote: &PriceQuote,
    balance_wei: U256,
    now: u64,
    explorer_url: &str,
    viewer: &impl CurrentAccountProvider,
) -> CampaignPageView {
    CampaignPageView {
        card: campaign_card(detail, quote, now, explorer_url),
        balance_wei,
        balance: {
            let eth = units::wei_to_eth(balance_wei);
            AmountView::new(units::eth_to_usd(eth, quote.rate()), eth)
        },
        tiers: tiers.iter().map(|t| tier_view(t, quote)).collect(),
        eligibility: Eligibility::of(detail),
        viewer_role: status::viewer_role(detail.owner, viewer),
    }
}

pub fn listed_campaign(
    summary: &CampaignSummary,
    card: std::result::Result<CampaignCardView, String>,
) -> ListedCampaign {
    let (card, error) = match card {
        Ok(card) => (Some(card), None),
        Err(e) => (None, Some(e)),
    };
    ListedCampaign {
        address: summary.address,
        name: summary.name.clone(),
        created_date: units::format_date(summary.creation_time),
        card,
        error,
    }
}

pub fn dashboard(wallet: Address, campaigns: Vec<ListedCampaign>) -> DashboardView {
    DashboardView {
        wallet,
        count: campaigns.len(),
        campaigns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusLabel;

    const EXPLORER: &str = "https://sepolia.etherscan.io";
    const NOW: u64 = 1_700_000_000;

    fn usd8(usd: u64) -> U256 {
        U256::from(usd) * U256::from(100_000_000u64)
    }

    fn detail() -> CampaignDetail {
        CampaignDetail {
            address: Address::repeat_byte(0x22),
            name: "Solar".to_string(),
            description: "Panels".to_string(),
            goal_usd8: usd8(1000),
            deadline: NOW + 3600,
            owner: Address::repeat_byte(0x11),
            paused: false,
            state: 0,
            // 0.25 ETH
            raised_wei: U256::from(250_000_000_000_000_000u64),
            raised_usd8: usd8(500),
            backer_count: 3,
        }
    }

    fn quote() -> PriceQuote {
        PriceQuote {
            eth_usd_rate8: usd8(2000),
        }
    }

    #[test]
    fn card_for_half_funded_campaign() {
        let card = campaign_card(&detail(), &quote(), NOW, EXPLORER);
        assert!((card.progress_percent - 50.0).abs() < 1e-9);
        assert_eq!(card.progress_display, "50.0%");
        assert_eq!(card.raised.usd_display, "$500");
        assert_eq!(card.goal.usd_display, "$1,000");
        assert_eq!(card.remaining.usd_display, "$500");
        assert!((card.goal.eth - 0.5).abs() < 1e-12);
        assert!((card.raised.eth - 0.25).abs() < 1e-12);
        assert!((card.remaining.eth - 0.25).abs() < 1e-12);
        assert_eq!(card.countdown, "1h 0m");
        assert_eq!(card.days_left, 1);
        assert_eq!(card.status.label, StatusLabel::Active);
        assert_eq!(card.eth_usd_display, "$2,000");
        assert!(!card.awaiting_first_backer);
        assert!(card.owner_url.starts_with("https://sepolia.etherscan.io/address/0x"));
    }

    #[test]
    fn overfunded_campaign_caps_progress() {
        let mut d = detail();
        d.raised_usd8 = usd8(1500);
        d.raised_wei = U256::from(10u64).pow(U256::from(18u64));
        let card = campaign_card(&d, &quote(), NOW, EXPLORER);
        assert_eq!(card.progress_percent, 100.0);
        assert_eq!(card.remaining.usd, 0.0);
        assert_eq!(card.remaining.eth, 0.0);
    }

    #[test]
    fn missing_price_does_not_divide_by_zero() {
        let card = campaign_card(
            &detail(),
            &PriceQuote {
                eth_usd_rate8: U256::ZERO,
            },
            NOW,
            EXPLORER,
        );
        assert_eq!(card.goal.eth, 0.0);
        assert_eq!(card.raised.usd_display, "$500");
    }

    #[test]
    fn paused_and_ended_card() {
        let mut d = detail();
        d.paused = true;
        d.deadline = NOW;
        d.raised_wei = U256::ZERO;
        let card = campaign_card(&d, &quote(), NOW, EXPLORER);
        assert_eq!(card.status.label, StatusLabel::Paused);
        assert_eq!(card.countdown, "Ended");
        assert_eq!(card.days_left, 0);
        assert!(card.awaiting_first_backer);
    }

    #[test]
    fn page_keeps_tier_order_and_roles() {
        let tiers = vec![
            FundingTier {
                index: 0,
                name: "Bronze".to_string(),
                amount_usd8: usd8(10),
                backer_count: 1,
            },
            FundingTier {
                index: 1,
                name: "Gold".to_string(),
                amount_usd8: usd8(100),
                backer_count: 0,
            },
        ];
        let d = detail();
        let page = campaign_page(
            &d,
            &tiers,
            &quote(),
            U256::from(250_000_000_000_000_000u64),
            NOW,
            EXPLORER,
            &Some(d.owner),
        );
        assert_eq!(page.viewer_role, ViewerRole::Owner);
        assert_eq!(page.tiers[0].name, "Bronze");
        assert_eq!(page.tiers[1].index, 1);
        assert_eq!(page.tiers[1].amount.usd_display, "$100");
        assert!((page.tiers[1].amount.eth - 0.05).abs() < 1e-12);
        assert_eq!(page.balance.eth_display, "0.25 ETH");
        assert_eq!(page.balance.usd_display, "$500");
        assert!(page.eligibility.fund);
        assert!(!page.eligibility.withdraw);

        let anon = campaign_page(&d, &[], &quote(), U256::ZERO, NOW, EXPLORER, &None::<Address>);
        assert_eq!(anon.viewer_role, ViewerRole::Anonymous);
    }

    #[test]
    fn listing_row_keeps_failures() {
        let summary = CampaignSummary {
            address: Address::repeat_byte(0x22),
            owner: Address::repeat_byte(0x11),
            name: "Solar".to_string(),
            creation_time: 1_704_067_200,
        };
        let row = listed_campaign(&summary, Err("RPC error 3: execution reverted".to_string()));
        assert!(row.card.is_none());
        assert_eq!(row.created_date, "Jan 1, 2024");
        assert!(row.error.unwrap().contains("reverted"));

        let ok = listed_campaign(&summary, Ok(campaign_card(&detail(), &quote(), NOW, EXPLORER)));
        let dash = dashboard(summary.owner, vec![ok]);
        assert_eq!(dash.count, 1);
        assert!(dash.campaigns[0].error.is_none());
    }
}
