//! Raydium AMM V4 pool account layout and per-run pool state.
//!
//! The AMM state account is a fixed 752-byte prefix decoded with borsh.
//! [`PoolKeys`] is the immutable record of accounts belonging to one pool;
//! [`PoolInfo`] is the reserve/fee snapshot taken once per run.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::{pubkey, pubkey::Pubkey};

use crate::error::LookupError;

/// Raydium Liquidity Pool V4 program.
pub const RAYDIUM_AMM_V4: Pubkey = pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");

/// Fixed pool authority PDA shared by all V4 pools.
pub const AMM_AUTHORITY: Pubkey = pubkey!("5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1");

pub const AMM_STATE_SIZE: usize = 752;

/// Fee configuration embedded in the AMM state account.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct AmmFees {
    pub min_separate_numerator: u64,
    pub min_separate_denominator: u64,
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub pnl_numerator: u64,
    pub pnl_denominator: u64,
    pub swap_fee_numerator: u64,
    pub swap_fee_denominator: u64,
}

/// Running totals the pool keeps alongside its vaults. The pending PnL
/// amounts are owed to the protocol and must be excluded from the reserves.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct AmmOutput {
    pub need_take_pnl_coin: u64,
    pub need_take_pnl_pc: u64,
    pub total_pnl_pc: u64,
    pub total_pnl_coin: u64,
    pub pool_open_time: u64,
    pub punish_pc_amount: u64,
    pub punish_coin_amount: u64,
    pub orderbook_to_init_time: u64,
    pub swap_coin_in_amount: u128,
    pub swap_pc_out_amount: u128,
    pub swap_take_pc_fee: u64,
    pub swap_pc_in_amount: u128,
    pub swap_coin_out_amount: u128,
    pub swap_take_coin_fee: u64,
}

/// On-chain state of one AMM V4 pool (752-byte account prefix).
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct AmmState {
    pub status: u64,
    pub nonce: u64,
    pub order_num: u64,
    pub depth: u64,
    pub coin_decimals: u64,
    pub pc_decimals: u64,
    pub state: u64,
    pub reset_flag: u64,
    pub min_size: u64,
    pub vol_max_cut_ratio: u64,
    pub amount_wave: u64,
    pub coin_lot_size: u64,
    pub pc_lot_size: u64,
    pub min_price_multiplier: u64,
    pub max_price_multiplier: u64,
    pub sys_decimal_value: u64,
    pub fees: AmmFees,
    pub out_put: AmmOutput,
    pub token_coin: Pubkey,
    pub token_pc: Pubkey,
    pub coin_mint: Pubkey,
    pub pc_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub open_orders: Pubkey,
    pub market: Pubkey,
    pub serum_dex: Pubkey,
    pub target_orders: Pubkey,
    pub withdraw_queue: Pubkey,
    pub token_temp_lp: Pubkey,
    pub amm_owner: Pubkey,
    pub lp_amount: u64,
    pub client_order_id: u64,
    pub padding: [u64; 2],
}

pub fn decode_amm_state(data: &[u8]) -> Option<AmmState> {
    if data.len() < AMM_STATE_SIZE {
        return None;
    }
    borsh::from_slice::<AmmState>(&data[..AMM_STATE_SIZE]).ok()
}

/// Immutable account record for one pool, valid for the run's lifetime.
#[derive(Debug, Clone)]
pub struct PoolKeys {
    pub amm: Pubkey,
    pub authority: Pubkey,
    pub open_orders: Pubkey,
    pub target_orders: Pubkey,
    pub coin_vault: Pubkey,
    pub pc_vault: Pubkey,
    pub coin_mint: Pubkey,
    pub pc_mint: Pubkey,
    pub market_program: Pubkey,
    pub market: Pubkey,
    pub version: u8,
}

impl PoolKeys {
    pub fn from_state(pool_id: Pubkey, state: &AmmState) -> Self {
        Self {
            amm: pool_id,
            authority: AMM_AUTHORITY,
            open_orders: state.open_orders,
            target_orders: state.target_orders,
            coin_vault: state.token_coin,
            pc_vault: state.token_pc,
            coin_mint: state.coin_mint,
            pc_mint: state.pc_mint,
            market_program: state.serum_dex,
            market: state.market,
            version: 4,
        }
    }
}

/// Reserve and fee snapshot for one pool as of the last fetch.
///
/// `base` is the target-token side, `quote` the WSOL side. Refreshed at most
/// once per run; quotes computed from it can be stale by design.
#[derive(Debug, Clone, Copy)]
pub struct PoolInfo {
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub fee_numerator: u64,
    pub fee_denominator: u64,
}

impl PoolInfo {
    /// Orient vault balances into base/quote reserves, excluding pending PnL.
    pub fn from_state(
        pool_id: Pubkey,
        state: &AmmState,
        coin_vault_balance: u64,
        pc_vault_balance: u64,
    ) -> Result<Self, LookupError> {
        let native = spl_token::native_mint::id();
        let coin_reserve = coin_vault_balance.saturating_sub(state.out_put.need_take_pnl_coin);
        let pc_reserve = pc_vault_balance.saturating_sub(state.out_put.need_take_pnl_pc);

        let (base_reserve, quote_reserve) = if state.coin_mint == native {
            (pc_reserve, coin_reserve)
        } else if state.pc_mint == native {
            (coin_reserve, pc_reserve)
        } else {
            return Err(LookupError::NotAWsolPool(pool_id));
        };

        Ok(Self {
            base_reserve,
            quote_reserve,
            fee_numerator: state.fees.swap_fee_numerator,
            fee_denominator: state.fees.swap_fee_denominator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> AmmState {
        AmmState {
            status: 6,
            coin_decimals: 6,
            pc_decimals: 9,
            fees: AmmFees {
                swap_fee_numerator: 25,
                swap_fee_denominator: 10_000,
                ..AmmFees::default()
            },
            out_put: AmmOutput {
                need_take_pnl_coin: 100,
                need_take_pnl_pc: 200,
                ..AmmOutput::default()
            },
            token_coin: Pubkey::new_unique(),
            token_pc: Pubkey::new_unique(),
            coin_mint: Pubkey::new_unique(),
            pc_mint: spl_token::native_mint::id(),
            open_orders: Pubkey::new_unique(),
            market: Pubkey::new_unique(),
            serum_dex: Pubkey::new_unique(),
            ..AmmState::default()
        }
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        assert!(decode_amm_state(&[0u8; AMM_STATE_SIZE - 1]).is_none());
        assert!(decode_amm_state(&[]).is_none());
    }

    #[test]
    fn test_decode_round_trip() {
        let state = sample_state();
        let bytes = borsh::to_vec(&state).unwrap();
        assert_eq!(bytes.len(), AMM_STATE_SIZE);

        let decoded = decode_amm_state(&bytes).unwrap();
        assert_eq!(decoded, state);

        // Trailing bytes past the fixed prefix are ignored
        let mut padded = bytes;
        padded.extend_from_slice(&[0xAA; 16]);
        assert!(decode_amm_state(&padded).is_some());
    }

    #[test]
    fn test_pool_keys_from_state() {
        let state = sample_state();
        let pool_id = Pubkey::new_unique();
        let keys = PoolKeys::from_state(pool_id, &state);

        assert_eq!(keys.amm, pool_id);
        assert_eq!(keys.authority, AMM_AUTHORITY);
        assert_eq!(keys.coin_vault, state.token_coin);
        assert_eq!(keys.pc_vault, state.token_pc);
        assert_eq!(keys.market_program, state.serum_dex);
        assert_eq!(keys.version, 4);
    }

    #[test]
    fn test_pool_info_orientation_pc_native() {
        // pc side is WSOL: quote = pc vault, base = coin vault
        let state = sample_state();
        let info = PoolInfo::from_state(Pubkey::new_unique(), &state, 1_000_100, 2_000_200).unwrap();
        assert_eq!(info.base_reserve, 1_000_000);
        assert_eq!(info.quote_reserve, 2_000_000);
        assert_eq!(info.fee_numerator, 25);
        assert_eq!(info.fee_denominator, 10_000);
    }

    #[test]
    fn test_pool_info_orientation_coin_native() {
        let mut state = sample_state();
        state.coin_mint = spl_token::native_mint::id();
        state.pc_mint = Pubkey::new_unique();
        let info = PoolInfo::from_state(Pubkey::new_unique(), &state, 500_100, 700_200).unwrap();
        assert_eq!(info.quote_reserve, 500_000);
        assert_eq!(info.base_reserve, 700_000);
    }

    #[test]
    fn test_pool_info_rejects_non_wsol_pool() {
        let mut state = sample_state();
        state.pc_mint = Pubkey::new_unique();
        assert!(matches!(
            PoolInfo::from_state(Pubkey::new_unique(), &state, 1, 1),
            Err(LookupError::NotAWsolPool(_))
        ));
    }
}
