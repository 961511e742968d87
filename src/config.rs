//! Configuration loading.
//!
//! All run parameters come from a TOML file, with environment overrides for
//! the secrets (RPC endpoint, signer key). Missing optional fields fall back
//! to the defaults of the original deployment.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Wallet configuration
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Target pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// Trading parameters
    #[serde(default)]
    pub trading: TradingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC endpoint URL; the RPC_URL environment variable overrides it
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to a keypair file, used when MAIN_KP is not set
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// AMM V4 pool state account
    #[serde(default = "default_pool_id")]
    pub pool_id: String,

    /// Mint of the non-WSOL side of the pool
    #[serde(default = "default_token_mint")]
    pub token_mint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// SOL committed to the buy leg
    #[serde(default = "default_buy_amount_sol")]
    pub buy_amount_sol: f64,

    /// Slippage tolerance as a fraction (numerator over denominator)
    #[serde(default = "default_slippage_numerator")]
    pub slippage_numerator: u64,
    #[serde(default = "default_slippage_denominator")]
    pub slippage_denominator: u64,

    /// Priority fee in micro-lamports per compute unit
    #[serde(default = "default_compute_unit_price")]
    pub compute_unit_price_micro_lamports: u64,

    /// Compute unit limit for the whole transaction
    #[serde(default = "default_compute_unit_limit")]
    pub compute_unit_limit: u32,

    /// Whole tokens withheld from the sell leg as a safety margin
    #[serde(default = "default_sell_margin_units")]
    pub sell_margin_units: u64,

    /// Simulate before sending (diagnostic only)
    #[serde(default = "default_true")]
    pub simulate: bool,
}

// Default value functions
fn default_endpoint() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}
fn default_keypair_path() -> String {
    "~/.config/solana/id.json".to_string()
}
fn default_pool_id() -> String {
    "HRUsdnW2B49DQS64UoPJjcciRHSi3sBSBfnDmdEEzCRN".to_string()
}
fn default_token_mint() -> String {
    "6LRHCKvqCX9JuQj8Fkx8yEM3c1PpyrV9NuPujc9Qpump".to_string()
}
fn default_buy_amount_sol() -> f64 {
    0.0001
}
fn default_slippage_numerator() -> u64 {
    100
}
fn default_slippage_denominator() -> u64 {
    100
}
fn default_compute_unit_price() -> u64 {
    744_452
}
fn default_compute_unit_limit() -> u32 {
    183_504
}
fn default_sell_margin_units() -> u64 {
    1
}
fn default_true() -> bool {
    true
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { endpoint: default_endpoint() }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self { keypair_path: default_keypair_path() }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { pool_id: default_pool_id(), token_mint: default_token_mint() }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            buy_amount_sol: default_buy_amount_sol(),
            slippage_numerator: default_slippage_numerator(),
            slippage_denominator: default_slippage_denominator(),
            compute_unit_price_micro_lamports: default_compute_unit_price(),
            compute_unit_limit: default_compute_unit_limit(),
            sell_margin_units: default_sell_margin_units(),
            simulate: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            wallet: WalletConfig::default(),
            pool: PoolConfig::default(),
            trading: TradingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides applied.
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        if let Ok(endpoint) = std::env::var("RPC_URL") {
            config.rpc.endpoint = endpoint;
        }
        Ok(config)
    }
}
