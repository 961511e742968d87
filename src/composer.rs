//! Instruction composer for the round-trip transaction.
//!
//! Produces the fixed operation order the atomic unit depends on:
//! compute-budget directives first, idempotent ATA bootstraps next, then the
//! fixed-output buy leg and the fixed-input sell leg. The sell amount is the
//! buy's quoted output minus a configured safety margin, with a zero minimum
//! output — the run accepts any non-negative proceeds on the way out.

use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};

use crate::error::CompositionError;
use crate::pool::{PoolKeys, RAYDIUM_AMM_V4};

/// V4 swap instruction tags.
const SWAP_BASE_IN_DISCRIMINATOR: u8 = 9;
const SWAP_BASE_OUT_DISCRIMINATOR: u8 = 11;

/// One exchange direction within the round trip.
#[derive(Debug, Clone, Copy)]
pub struct SwapLeg {
    pub source: Pubkey,
    pub destination: Pubkey,
    pub owner: Pubkey,
    pub amount: SwapAmount,
}

#[derive(Debug, Clone, Copy)]
pub enum SwapAmount {
    /// Fixed-output: demand the exact output, bound the input.
    FixedOut { max_amount_in: u64, amount_out: u64 },
    /// Fixed-input: spend the exact input, accept at least the minimum.
    FixedIn { amount_in: u64, min_amount_out: u64 },
}

/// Everything `compose` needs besides the pool keys.
#[derive(Debug, Clone, Copy)]
pub struct ComposeParams {
    pub payer: Pubkey,
    pub token_mint: Pubkey,
    /// Slippage-bounded input for the buy leg, in lamports
    pub max_amount_in: u64,
    /// Quoted token output the buy leg demands
    pub amount_out: u64,
    /// Safety margin subtracted from the sell input, already scaled to the
    /// token's decimal precision
    pub sell_margin: u64,
    pub compute_unit_price_micro_lamports: u64,
    pub compute_unit_limit: u32,
}

/// The composed atomic unit: ordered operations plus the signer identity.
/// The freshness token is attached at submit time, where it is fetched.
#[derive(Debug, Clone)]
pub struct ComposedSwap {
    pub payer: Pubkey,
    pub instructions: Vec<Instruction>,
}

/// Assemble the full operation list. Deterministic given its inputs.
pub fn compose(keys: &PoolKeys, params: &ComposeParams) -> Result<ComposedSwap, CompositionError> {
    let native = spl_token::native_mint::id();
    let wsol_ata = get_associated_token_address(&params.payer, &native);
    let token_ata = get_associated_token_address(&params.payer, &params.token_mint);

    let sell_amount_in = params.amount_out.checked_sub(params.sell_margin).ok_or(
        CompositionError::SellAmountUnderflow {
            amount_out: params.amount_out,
            margin: params.sell_margin,
        },
    )?;

    let buy = SwapLeg {
        source: wsol_ata,
        destination: token_ata,
        owner: params.payer,
        amount: SwapAmount::FixedOut {
            max_amount_in: params.max_amount_in,
            amount_out: params.amount_out,
        },
    };
    let sell = SwapLeg {
        source: token_ata,
        destination: wsol_ata,
        owner: params.payer,
        amount: SwapAmount::FixedIn { amount_in: sell_amount_in, min_amount_out: 0 },
    };

    let instructions = vec![
        ComputeBudgetInstruction::set_compute_unit_price(params.compute_unit_price_micro_lamports),
        ComputeBudgetInstruction::set_compute_unit_limit(params.compute_unit_limit),
        create_associated_token_account_idempotent(
            &params.payer,
            &params.payer,
            &native,
            &spl_token::id(),
        ),
        create_associated_token_account_idempotent(
            &params.payer,
            &params.payer,
            &params.token_mint,
            &spl_token::id(),
        ),
        swap_instruction(keys, &buy),
        swap_instruction(keys, &sell),
    ];

    check_operation_order(&instructions)?;

    Ok(ComposedSwap { payer: params.payer, instructions })
}

/// Build one V4 swap instruction for a leg.
fn swap_instruction(keys: &PoolKeys, leg: &SwapLeg) -> Instruction {
    let mut data = [0u8; 17];
    match leg.amount {
        SwapAmount::FixedOut { max_amount_in, amount_out } => {
            data[0] = SWAP_BASE_OUT_DISCRIMINATOR;
            data[1..9].copy_from_slice(&max_amount_in.to_le_bytes());
            data[9..17].copy_from_slice(&amount_out.to_le_bytes());
        }
        SwapAmount::FixedIn { amount_in, min_amount_out } => {
            data[0] = SWAP_BASE_IN_DISCRIMINATOR;
            data[1..9].copy_from_slice(&amount_in.to_le_bytes());
            data[9..17].copy_from_slice(&min_amount_out.to_le_bytes());
        }
    }

    let accounts = vec![
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new(keys.amm, false),
        AccountMeta::new_readonly(keys.authority, false),
        AccountMeta::new(keys.open_orders, false),
        AccountMeta::new(keys.coin_vault, false),
        AccountMeta::new(keys.pc_vault, false),
        AccountMeta::new_readonly(keys.market_program, false),
        AccountMeta::new(keys.market, false),
        // The AMM-only execution path never reads the order-book accounts;
        // the pool id fills those slots, as the program's account count
        // still requires them.
        AccountMeta::new(keys.amm, false),
        AccountMeta::new(keys.amm, false),
        AccountMeta::new(keys.amm, false),
        AccountMeta::new(keys.amm, false),
        AccountMeta::new(keys.amm, false),
        AccountMeta::new(keys.amm, false),
        AccountMeta::new(leg.source, false),
        AccountMeta::new(leg.destination, false),
        AccountMeta::new(leg.owner, true),
    ];

    Instruction::new_with_bytes(RAYDIUM_AMM_V4, &data, accounts)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum OperationPhase {
    Budget,
    Bootstrap,
    Swap,
}

fn classify(ix: &Instruction) -> Option<OperationPhase> {
    if ix.program_id == solana_sdk::compute_budget::id() {
        Some(OperationPhase::Budget)
    } else if ix.program_id == spl_associated_token_account::id() {
        Some(OperationPhase::Bootstrap)
    } else if ix.program_id == RAYDIUM_AMM_V4 {
        Some(OperationPhase::Swap)
    } else {
        None
    }
}

/// Validate the fixed operation order: budget directives, then account
/// bootstraps, then swap legs. Downstream execution is order-dependent
/// within the atomic unit.
pub fn check_operation_order(instructions: &[Instruction]) -> Result<(), CompositionError> {
    if instructions.is_empty() {
        return Err(CompositionError::OperationOrder("operation list is empty".to_string()));
    }

    let mut current = OperationPhase::Budget;
    for (idx, ix) in instructions.iter().enumerate() {
        let phase = classify(ix).ok_or_else(|| {
            CompositionError::OperationOrder(format!(
                "unexpected program {} at position {idx}",
                ix.program_id
            ))
        })?;
        if phase < current {
            return Err(CompositionError::OperationOrder(format!(
                "{phase:?} operation at position {idx} after {current:?} phase began"
            )));
        }
        current = phase;
    }
    Ok(())
}
