//! Async RPC surface consumed by the run.
//!
//! The pipeline talks to the chain exclusively through [`ChainClient`], so
//! tests can substitute a mock and the production client stays a thin wrapper
//! around the nonblocking Solana RPC client. The trait methods are exactly
//! the run's suspension points; any transport error is fatal for the run.

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::VersionedTransaction,
};
use solana_transaction_status::TransactionConfirmationStatus;

use crate::error::TransportError;

/// Diagnostic summary of a transaction simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationSummary {
    /// Program error reported by the simulated execution, if any
    pub err: Option<String>,
    /// Compute units the simulated execution consumed
    pub units_consumed: Option<u64>,
}

/// Confirmation state reported for a submitted signature.
#[derive(Debug, Clone)]
pub struct SignatureStatus {
    /// Reached at least `confirmed` commitment
    pub confirmed: bool,
    /// Program error recorded for the transaction, if it executed and failed
    pub err: Option<String>,
}

/// The network operations the run needs, one method per suspension point.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_account(&self, address: &Pubkey) -> Result<Account, TransportError>;

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, TransportError>;

    /// Token-account balance in minor units.
    async fn get_token_balance(&self, token_account: &Pubkey) -> Result<u64, TransportError>;

    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8, TransportError>;

    async fn minimum_rent_exemption(&self, data_len: usize) -> Result<u64, TransportError>;

    /// Freshness token: a recent blockhash plus its last valid block height.
    async fn latest_blockhash(&self) -> Result<(Hash, u64), TransportError>;

    async fn simulate(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationSummary, TransportError>;

    /// Submit with preflight checks disabled.
    async fn send(&self, tx: &VersionedTransaction) -> Result<Signature, TransportError>;

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, TransportError>;

    async fn block_height(&self) -> Result<u64, TransportError>;
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        TransportError(err.to_string())
    }
}

/// Production [`ChainClient`] over a single RPC endpoint at `processed`
/// commitment.
pub struct RpcChainClient {
    inner: RpcClient,
}

impl RpcChainClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            inner: RpcClient::new_with_commitment(
                endpoint.to_string(),
                CommitmentConfig::processed(),
            ),
        }
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_account(&self, address: &Pubkey) -> Result<Account, TransportError> {
        Ok(self.inner.get_account(address).await?)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, TransportError> {
        Ok(self.inner.get_balance(address).await?)
    }

    async fn get_token_balance(&self, token_account: &Pubkey) -> Result<u64, TransportError> {
        let balance = self.inner.get_token_account_balance(token_account).await?;
        balance
            .amount
            .parse::<u64>()
            .map_err(|e| TransportError(format!("malformed token balance: {e}")))
    }

    async fn get_token_decimals(&self, mint: &Pubkey) -> Result<u8, TransportError> {
        Ok(self.inner.get_token_supply(mint).await?.decimals)
    }

    async fn minimum_rent_exemption(&self, data_len: usize) -> Result<u64, TransportError> {
        Ok(self
            .inner
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn latest_blockhash(&self) -> Result<(Hash, u64), TransportError> {
        Ok(self
            .inner
            .get_latest_blockhash_with_commitment(self.inner.commitment())
            .await?)
    }

    async fn simulate(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationSummary, TransportError> {
        let response = self.inner.simulate_transaction(tx).await?;
        Ok(SimulationSummary {
            err: response.value.err.map(|e| e.to_string()),
            units_consumed: response.value.units_consumed,
        })
    }

    async fn send(&self, tx: &VersionedTransaction) -> Result<Signature, TransportError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            ..RpcSendTransactionConfig::default()
        };
        Ok(self.inner.send_transaction_with_config(tx, config).await?)
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, TransportError> {
        let response = self.inner.get_signature_statuses(&[*signature]).await?;
        Ok(response.value.into_iter().next().flatten().map(|status| SignatureStatus {
            confirmed: matches!(
                status.confirmation_status,
                Some(TransactionConfirmationStatus::Confirmed)
                    | Some(TransactionConfirmationStatus::Finalized)
            ),
            err: status.err.map(|e| e.to_string()),
        }))
    }

    async fn block_height(&self) -> Result<u64, TransportError> {
        Ok(self.inner.get_block_height().await?)
    }
}
