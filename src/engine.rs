//! Single-run orchestration.
//!
//! One call to [`run_once`] performs the whole round trip: look up the pool,
//! quote both legs, compose the atomic transaction, submit, and report the
//! outcome. Nothing is retried; the process exists for exactly one attempt.

use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use tracing::{debug, info, warn};

use crate::composer::{compose, ComposeParams};
use crate::config::Config;
use crate::context::RunContext;
use crate::error::{CompositionError, RunError};
use crate::quote::{compute_amount_in, compute_amount_out, Slippage};
use crate::rpc::ChainClient;
use crate::submitter::{submit, SubmitOptions};
use crate::wallet::Wallet;

/// Validated run parameters, parsed once from the raw [`Config`].
#[derive(Debug, Clone)]
pub struct RunParams {
    pub pool_id: Pubkey,
    pub token_mint: Pubkey,
    pub buy_amount_lamports: u64,
    pub slippage: Slippage,
    pub sell_margin_units: u64,
    pub compute_unit_price_micro_lamports: u64,
    pub compute_unit_limit: u32,
    pub simulate: bool,
}

impl RunParams {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool_id = config
            .pool
            .pool_id
            .parse::<Pubkey>()
            .map_err(|e| anyhow::anyhow!("invalid pool id {:?}: {e}", config.pool.pool_id))?;
        let token_mint = config
            .pool
            .token_mint
            .parse::<Pubkey>()
            .map_err(|e| anyhow::anyhow!("invalid token mint {:?}: {e}", config.pool.token_mint))?;

        if !config.trading.buy_amount_sol.is_finite() || config.trading.buy_amount_sol <= 0.0 {
            anyhow::bail!("buy_amount_sol must be positive, got {}", config.trading.buy_amount_sol);
        }
        let buy_amount_lamports =
            (config.trading.buy_amount_sol * LAMPORTS_PER_SOL as f64) as u64;

        Ok(Self {
            pool_id,
            token_mint,
            buy_amount_lamports,
            slippage: Slippage::new(
                config.trading.slippage_numerator,
                config.trading.slippage_denominator,
            ),
            sell_margin_units: config.trading.sell_margin_units,
            compute_unit_price_micro_lamports: config.trading.compute_unit_price_micro_lamports,
            compute_unit_limit: config.trading.compute_unit_limit,
            simulate: config.trading.simulate,
        })
    }
}

/// What one run produced: the landed signature, and the program error if the
/// transaction executed but failed on chain.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub signature: solana_sdk::signature::Signature,
    pub program_error: Option<String>,
}

/// Execute one buy-then-sell round trip.
pub async fn run_once(
    client: &dyn ChainClient,
    wallet: &Wallet,
    params: &RunParams,
) -> Result<RunOutcome, RunError> {
    let payer = wallet.pubkey();
    let balance = client.get_balance(&payer).await?;
    info!(%payer, balance_lamports = balance, "starting round trip");

    let mut ctx = RunContext::new(client);

    let rent = ctx.rent_exemption().await?;
    debug!(rent_exemption_lamports = rent, "token account rent floor");

    let decimals = ctx.decimals(&params.token_mint).await?;
    let keys = ctx.pool_keys(&params.pool_id).await?;
    let info = ctx.pool_info(&keys).await?;
    info!(
        base_reserve = info.base_reserve,
        quote_reserve = info.quote_reserve,
        decimals,
        "pool snapshot taken"
    );

    let forward = compute_amount_out(&info, params.buy_amount_lamports, params.slippage)?;
    info!(
        amount_in = params.buy_amount_lamports,
        amount_out = forward.amount_out,
        min_amount_out = forward.min_amount_out,
        "forward quote"
    );

    let reverse = compute_amount_in(&info, forward.amount_out, params.slippage)?;
    info!(
        amount_out = forward.amount_out,
        amount_in = reverse.amount_in,
        max_amount_in = reverse.max_amount_in,
        "reverse quote"
    );

    let sell_margin = 10u64
        .checked_pow(decimals as u32)
        .and_then(|scale| params.sell_margin_units.checked_mul(scale))
        .ok_or(CompositionError::MarginOverflow { decimals })?;

    let composed = compose(
        &keys,
        &ComposeParams {
            payer,
            token_mint: params.token_mint,
            max_amount_in: reverse.max_amount_in,
            amount_out: forward.amount_out,
            sell_margin,
            compute_unit_price_micro_lamports: params.compute_unit_price_micro_lamports,
            compute_unit_limit: params.compute_unit_limit,
        },
    )?;

    let options = SubmitOptions { simulate: params.simulate, ..SubmitOptions::default() };
    let result = submit(client, wallet.keypair(), &composed, &options).await?;

    match &result.program_error {
        Some(err) => warn!(signature = %result.signature, error = %err, "round trip landed with a program error"),
        None => info!(signature = %result.signature, "round trip confirmed"),
    }

    Ok(RunOutcome { signature: result.signature, program_error: result.program_error })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_default_config() {
        let params = RunParams::from_config(&Config::default()).unwrap();
        assert_eq!(params.buy_amount_lamports, 100_000);
        assert_eq!(params.slippage, Slippage::new(100, 100));
        assert_eq!(params.sell_margin_units, 1);
    }

    #[test]
    fn test_params_reject_bad_pubkeys() {
        let mut config = Config::default();
        config.pool.pool_id = "not-a-pubkey".to_string();
        assert!(RunParams::from_config(&config).is_err());
    }

    #[test]
    fn test_params_reject_non_positive_amount() {
        let mut config = Config::default();
        config.trading.buy_amount_sol = 0.0;
        assert!(RunParams::from_config(&config).is_err());

        config.trading.buy_amount_sol = f64::NAN;
        assert!(RunParams::from_config(&config).is_err());
    }
}
