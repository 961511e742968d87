//! Single-run round-trip swap bot for Raydium AMM V4 pools.
//!
//! One invocation buys a fixed SOL amount of a token and sells the bought
//! amount back (minus a small safety margin) within a single atomic
//! transaction, then exits. The library exposes each pipeline stage so the
//! integration tests can drive the run against a mock chain.

pub mod composer;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod pool;
pub mod quote;
pub mod rpc;
pub mod submitter;
pub mod wallet;

pub use error::RunError;
