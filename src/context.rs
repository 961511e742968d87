//! Per-run lookup cache.
//!
//! Every chain lookup the pipeline needs is memoized here for the lifetime of
//! one run: rent exemption, token decimals, the decoded pool account, and the
//! reserve snapshot. Each is fetched at most once; the snapshot is allowed to
//! be stale by the time the transaction lands.

use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;

use crate::error::{LookupError, RunError};
use crate::pool::{decode_amm_state, AmmState, PoolInfo, PoolKeys, RAYDIUM_AMM_V4};
use crate::rpc::ChainClient;

/// Lazily-populated lookup state for one run.
pub struct RunContext<'a> {
    client: &'a dyn ChainClient,
    rent_exemption: Option<u64>,
    decimals: Option<u8>,
    pool_keys: Option<PoolKeys>,
    amm_state: Option<AmmState>,
    pool_info: Option<PoolInfo>,
}

impl<'a> RunContext<'a> {
    pub fn new(client: &'a dyn ChainClient) -> Self {
        Self {
            client,
            rent_exemption: None,
            decimals: None,
            pool_keys: None,
            amm_state: None,
            pool_info: None,
        }
    }

    /// Rent-exempt minimum for a token account.
    pub async fn rent_exemption(&mut self) -> Result<u64, RunError> {
        if let Some(rent) = self.rent_exemption {
            return Ok(rent);
        }
        let rent = self
            .client
            .minimum_rent_exemption(spl_token::state::Account::LEN)
            .await?;
        self.rent_exemption = Some(rent);
        Ok(rent)
    }

    /// Decimal precision of the target token's mint.
    pub async fn decimals(&mut self, mint: &Pubkey) -> Result<u8, RunError> {
        if let Some(decimals) = self.decimals {
            return Ok(decimals);
        }
        let decimals = self.client.get_token_decimals(mint).await?;
        self.decimals = Some(decimals);
        Ok(decimals)
    }

    async fn amm_state(&mut self, pool_id: &Pubkey) -> Result<AmmState, RunError> {
        if let Some(state) = &self.amm_state {
            return Ok(state.clone());
        }
        let account = self.client.get_account(pool_id).await?;
        if account.owner != RAYDIUM_AMM_V4 {
            return Err(LookupError::WrongOwner {
                account: *pool_id,
                owner: account.owner,
            }
            .into());
        }
        let state = decode_amm_state(&account.data).ok_or(LookupError::Decode {
            what: "AMM state account",
            len: account.data.len(),
        })?;
        self.amm_state = Some(state.clone());
        Ok(state)
    }

    /// Account record for the pool, fetching and decoding its state account
    /// on first use.
    pub async fn pool_keys(&mut self, pool_id: &Pubkey) -> Result<PoolKeys, RunError> {
        if let Some(keys) = &self.pool_keys {
            return Ok(keys.clone());
        }
        let state = self.amm_state(pool_id).await?;
        let keys = PoolKeys::from_state(*pool_id, &state);
        self.pool_keys = Some(keys.clone());
        Ok(keys)
    }

    /// Reserve and fee snapshot, taken from the vault balances on first use.
    pub async fn pool_info(&mut self, keys: &PoolKeys) -> Result<PoolInfo, RunError> {
        if let Some(info) = self.pool_info {
            return Ok(info);
        }
        let coin_balance = self.client.get_token_balance(&keys.coin_vault).await?;
        let pc_balance = self.client.get_token_balance(&keys.pc_vault).await?;
        let state = self.amm_state(&keys.amm).await?;
        let info = PoolInfo::from_state(keys.amm, &state, coin_balance, pc_balance)?;
        self.pool_info = Some(info);
        Ok(info)
    }
}
