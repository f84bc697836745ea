//! Campaign-state classification.
//!
//! The contract owns the `Active -> Successful | Failed` transitions; this
//! module only reads the raw `(state, paused)` pair. Pause overlays the
//! display label but never changes the state used for eligibility.

use alloy_primitives::Address;
use serde::Serialize;
use tracing::warn;

use crate::errors::GatewayError;
use crate::models::CampaignDetail;

/// The contract's `uint8` campaign state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignState {
    Active,
    Successful,
    Failed,
}

impl TryFrom<u8> for CampaignState {
    type Error = GatewayError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Active),
            1 => Ok(Self::Successful),
            2 => Ok(Self::Failed),
            other => Err(GatewayError::UnknownState(other)),
        }
    }
}

impl CampaignState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Label shown on badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    Paused,
    Active,
    Successful,
    Failed,
    Unknown,
}

/// Colour family of a badge; the frontend maps these to its theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Primary,
    Secondary,
    Destructive,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: StatusLabel,
    pub tone: BadgeTone,
}

/// Map the raw contract pair to a badge.
///
/// `paused` wins over every state, including unknown ones. An out-of-range
/// state is logged and shown as `Unknown`, never as `Active`.
pub fn classify(raw_state: u8, paused: bool) -> StatusBadge {
    if paused {
        return StatusBadge {
            label: StatusLabel::Paused,
            tone: BadgeTone::Muted,
        };
    }
    match CampaignState::try_from(raw_state) {
        Ok(CampaignState::Active) => StatusBadge {
            label: StatusLabel::Active,
            tone: BadgeTone::Secondary,
        },
        Ok(CampaignState::Successful) => StatusBadge {
            label: StatusLabel::Successful,
            tone: BadgeTone::Primary,
        },
        Ok(CampaignState::Failed) => StatusBadge {
            label: StatusLabel::Failed,
            tone: BadgeTone::Destructive,
        },
        Err(e) => {
            warn!("{e}");
            StatusBadge {
                label: StatusLabel::Unknown,
                tone: BadgeTone::Muted,
            }
        }
    }
}

// ─────────────────────────────────────────────────────────
// Eligibility (raw state, not the label)
// ─────────────────────────────────────────────────────────

/// Client-side guard for `fund`; the contract re-checks.
pub fn can_fund(raw_state: u8, paused: bool) -> bool {
    !paused && CampaignState::try_from(raw_state).ok() == Some(CampaignState::Active)
}

pub fn can_withdraw(raw_state: u8) -> bool {
    CampaignState::try_from(raw_state).ok() == Some(CampaignState::Successful)
}

pub fn can_refund(raw_state: u8) -> bool {
    CampaignState::try_from(raw_state).ok() == Some(CampaignState::Failed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// The contract reports a terminal state.
    pub closed: bool,
    pub fund: bool,
    pub withdraw: bool,
    pub refund: bool,
}

impl Eligibility {
    pub fn of(detail: &CampaignDetail) -> Self {
        Self {
            closed: CampaignState::try_from(detail.state).is_ok_and(|s| s.is_terminal()),
            fund: can_fund(detail.state, detail.paused),
            withdraw: can_withdraw(detail.state),
            refund: can_refund(detail.state),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Viewer
// ─────────────────────────────────────────────────────────

/// Source of the connected wallet address, passed in explicitly wherever
/// the caller's identity matters.
pub trait CurrentAccountProvider {
    fn current_account(&self) -> Option<Address>;
}

impl CurrentAccountProvider for Option<Address> {
    fn current_account(&self) -> Option<Address> {
        *self
    }
}

impl CurrentAccountProvider for Address {
    fn current_account(&self) -> Option<Address> {
        Some(*self)
    }
}

/// Relationship of the connected account to a campaign. A UX hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerRole {
    Owner,
    Visitor,
    Anonymous,
}

pub fn viewer_role(owner: Address, viewer: &impl CurrentAccountProvider) -> ViewerRole {
    match viewer.current_account() {
        Some(account) if account == owner => ViewerRole::Owner,
        Some(_) => ViewerRole::Visitor,
        None => ViewerRole::Anonymous,
    }
}
