//! Application configuration loaded from environment variables.

use alloy_primitives::Address;

use crate::errors::{GatewayError, Result};

/// Chainlink ETH/USD aggregator on Sepolia.
const SEPOLIA_ETH_USD_FEED: &str = "0x694AA1769357215DE4FAC081bf1f309aDC325306";

#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint (e.g. a Sepolia node)
    pub rpc_url: String,
    /// Address of the deployed campaign factory contract
    pub factory_address: Address,
    /// Chainlink ETH/USD feed used to value new campaign goals
    pub price_feed_address: Address,
    /// Port for the REST API server
    pub api_port: u16,
    /// Per-request timeout for the RPC client
    pub rpc_timeout_secs: u64,
    /// Attempts made for a read call before the failure is returned
    pub rpc_max_attempts: u32,
    /// Block explorer base URL used for owner links
    pub explorer_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            rpc_url: env_var("RPC_URL")
                .unwrap_or_else(|_| "https://ethereum-sepolia-rpc.publicnode.com".to_string()),
            factory_address: env_var("FACTORY_ADDRESS")
                .map_err(|_| {
                    GatewayError::Config(
                        "FACTORY_ADDRESS environment variable is required".to_string(),
                    )
                })?
                .parse()
                .map_err(|_| GatewayError::Config("Invalid FACTORY_ADDRESS".to_string()))?,
            price_feed_address: env_var("PRICE_FEED_ADDRESS")
                .unwrap_or_else(|_| SEPOLIA_ETH_USD_FEED.to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid PRICE_FEED_ADDRESS".to_string()))?,
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid API_PORT".to_string()))?,
            rpc_timeout_secs: env_var("RPC_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid RPC_TIMEOUT_SECS".to_string()))?,
            rpc_max_attempts: env_var("RPC_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or_else(|| GatewayError::Config("Invalid RPC_MAX_ATTEMPTS".to_string()))?,
            explorer_url: env_var("EXPLORER_URL")
                .unwrap_or_else(|_| "https://sepolia.etherscan.io".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| GatewayError::Config(format!("Missing env var: {key}")))
}
