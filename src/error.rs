//! Error taxonomy for a round-trip run.
//!
//! Every stage fails fast: there is no retry, backoff, or partial-completion
//! recovery anywhere in the pipeline. The run boundary in `main` catches the
//! final [`RunError`], logs it, and exits non-zero.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// RPC/connection failure. Always fatal for the current run, and kept
/// separate from a failed-but-answered simulation, which is diagnostic only.
#[derive(Error, Debug, Clone)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

/// Pool or account data unavailable or undecodable.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The pool account is not owned by the expected AMM program
    #[error("account {account} is not owned by the AMM program (owner: {owner})")]
    WrongOwner { account: Pubkey, owner: Pubkey },

    /// The fetched account data could not be decoded
    #[error("failed to decode {what} ({len} bytes)")]
    Decode { what: &'static str, len: usize },

    /// Neither side of the pool is wrapped SOL
    #[error("pool {0} does not pair against WSOL")]
    NotAWsolPool(Pubkey),
}

/// Degenerate or invalid pricing inputs. The quote engine never divides by
/// zero and never silently returns a zero quote.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    #[error("swap amount is zero")]
    ZeroAmount,

    #[error("pool has an empty reserve")]
    EmptyReserves,

    /// Fixed-output request covers the entire output reserve
    #[error("requested output {requested} exceeds available reserve {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    #[error("slippage tolerance has a zero denominator")]
    BadSlippage,

    #[error("pool fee parameters are degenerate (numerator {numerator}, denominator {denominator})")]
    BadFee { numerator: u64, denominator: u64 },

    #[error("quote arithmetic overflowed u64")]
    Overflow,
}

/// Invalid derived leg amounts or broken operation ordering. Raised before
/// anything is signed, so a malformed leg can never reach the chain.
#[derive(Error, Debug)]
pub enum CompositionError {
    /// Sell amount went negative after the safety-margin subtraction
    #[error("sell amount underflow: buy output {amount_out} minus margin {margin}")]
    SellAmountUnderflow { amount_out: u64, margin: u64 },

    /// Safety margin cannot be scaled to the token's decimal precision
    #[error("sell margin overflows at {decimals} decimals")]
    MarginOverflow { decimals: u8 },

    #[error("invalid operation order: {0}")]
    OperationOrder(String),
}

/// Terminal submission failures. A program-level execution error surfaced
/// during confirmation is NOT one of these — it is reported in the
/// submission result and treated as a normal outcome (e.g. slippage
/// exceeded on chain).
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The RPC node refused the transaction at send time
    #[error("transaction rejected at send: {0}")]
    Rejected(String),

    /// The freshness token was already invalid at send time
    #[error("blockhash expired before send")]
    Expired,

    /// The confirmation window elapsed without a definitive status
    #[error("confirmation window elapsed (last valid block height {last_valid_block_height})")]
    Timeout { last_valid_block_height: u64 },
}

/// Top-level error for one run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("quote failed: {0}")]
    Quote(#[from] QuoteError),

    #[error("composition failed: {0}")]
    Composition(#[from] CompositionError),

    #[error("submission failed: {0}")]
    Submission(#[from] SubmissionError),

    #[error("{0}")]
    Transport(#[from] TransportError),
}

impl RunError {
    /// Stable category label for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Lookup(_) => "lookup",
            Self::Quote(_) => "quote",
            Self::Composition(_) => "composition",
            Self::Submission(_) => "submission",
            Self::Transport(_) => "transport",
        }
    }
}
