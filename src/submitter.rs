//! Versioned-transaction assembly, signing, and confirmation.
//!
//! The composed operations become a v0 transaction with a fresh blockhash,
//! get optionally simulated (diagnostic only), and are sent with preflight
//! disabled. Confirmation polls the signature status until the blockhash's
//! validity window lapses. One attempt, no retries.

use std::time::Duration;

use solana_sdk::{
    message::{v0, VersionedMessage},
    signature::Keypair,
    signer::Signer,
    transaction::VersionedTransaction,
};
use tracing::{debug, info, warn};

use crate::composer::ComposedSwap;
use crate::error::{RunError, SubmissionError};
use crate::rpc::ChainClient;

#[derive(Debug, Clone, Copy)]
pub struct SubmitOptions {
    /// Simulate before sending; failures are logged, never fatal
    pub simulate: bool,
    pub poll_interval: Duration,
    /// Hard cap on status polls, bounding the run even if the node stops
    /// reporting block heights sensibly
    pub max_polls: u32,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            simulate: true,
            poll_interval: Duration::from_millis(500),
            max_polls: 120,
        }
    }
}

/// Outcome of a submission that reached a definitive status. A program-level
/// execution failure is a normal outcome here, not an error.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub signature: solana_sdk::signature::Signature,
    pub program_error: Option<String>,
}

/// Compile, sign, optionally simulate, send, and await confirmation.
pub async fn submit(
    client: &dyn ChainClient,
    payer: &Keypair,
    composed: &ComposedSwap,
    options: &SubmitOptions,
) -> Result<SubmissionResult, RunError> {
    let (blockhash, last_valid_block_height) = client.latest_blockhash().await?;

    let message = v0::Message::try_compile(&composed.payer, &composed.instructions, &[], blockhash)
        .map_err(|e| SubmissionError::Rejected(format!("message compilation failed: {e}")))?;
    let tx = VersionedTransaction::try_new(VersionedMessage::V0(message), &[payer])
        .map_err(|e| SubmissionError::Rejected(format!("signing failed: {e}")))?;

    if options.simulate {
        match client.simulate(&tx).await {
            Ok(summary) => {
                if let Some(err) = &summary.err {
                    warn!(error = %err, "simulation reported a program error, sending anyway");
                } else {
                    debug!(units = ?summary.units_consumed, "simulation passed");
                }
            }
            Err(e) => warn!(error = %e, "simulation unavailable, sending anyway"),
        }
    }

    let signature = client.send(&tx).await.map_err(|e| {
        if e.0.to_lowercase().contains("blockhash not found") {
            RunError::from(SubmissionError::Expired)
        } else {
            RunError::from(SubmissionError::Rejected(e.0))
        }
    })?;
    info!(%signature, last_valid_block_height, "transaction sent");

    for _ in 0..options.max_polls {
        if let Some(status) = client.signature_status(&signature).await? {
            if let Some(err) = status.err {
                return Ok(SubmissionResult { signature, program_error: Some(err) });
            }
            if status.confirmed {
                return Ok(SubmissionResult { signature, program_error: None });
            }
        }

        if client.block_height().await? > last_valid_block_height {
            return Err(SubmissionError::Timeout { last_valid_block_height }.into());
        }

        tokio::time::sleep(options.poll_interval).await;
    }

    Err(SubmissionError::Timeout { last_valid_block_height }.into())
}
