//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON-RPC error object returned by the node, reverts included.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered but the payload does not have the expected ABI shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unknown campaign state: {0}")]
    UnknownState(u8),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Local, pre-submission rejection of form input.
///
/// The contract remains the final authority; these only stop submissions
/// that are certain to be wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name required")]
    NameRequired,

    #[error("goal must be > 0")]
    GoalNotPositive,

    #[error("goal too large")]
    GoalTooLarge,

    #[error("duration must be a positive whole number of days")]
    InvalidDuration,

    #[error("tier amount must be > 0")]
    TierAmountNotPositive,

    #[error("tier amount exceeds campaign goal")]
    TierAmountExceedsGoal,

    #[error("tier index out of range")]
    TierIndexOutOfRange,

    #[error("campaign is not accepting funds")]
    NotAcceptingFunds,

    #[error("additional days must be a positive whole number")]
    InvalidExtension,

    #[error("price unavailable")]
    PriceUnavailable,

    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
