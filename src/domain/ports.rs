use super::amount::BaseUnits;
use super::transaction::{Destination, OutcomeRecord, TxId, TxStatus};
use super::wallet::SenderWallet;
use crate::config::Network;
use crate::error::{LedgerError, Result, SubmissionError};
use async_trait::async_trait;
use std::sync::Arc;

/// The narrow surface the payout core needs from a ledger client.
#[async_trait]
pub trait LedgerSession: Send + Sync {
    /// Current balance of the connected sender, in base units.
    async fn balance(&self) -> std::result::Result<BaseUnits, LedgerError>;

    /// Submits one payment. Called at most once per recipient.
    async fn submit(
        &self,
        amount: BaseUnits,
        destination: &Destination,
        wallet: &SenderWallet,
    ) -> std::result::Result<TxId, LedgerError>;

    /// Side-effect free status lookup.
    async fn query_status(&self, tx_id: &TxId) -> std::result::Result<TxStatus, LedgerError>;
}

#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Opens a session for `sender_address`. Fails with `ConnectionError` when
    /// the endpoint is unreachable or the address is invalid.
    async fn connect(
        &self,
        endpoint: &str,
        network: Network,
        sender_address: &str,
    ) -> Result<LedgerSessionRef>;
}

/// Turns a raw address and tag into the ledger's addressing format.
pub trait AddressCodec: Send + Sync {
    fn encode(
        &self,
        address: &str,
        tag: Option<u64>,
    ) -> std::result::Result<Destination, SubmissionError>;
}

/// Durable, append-only audit trail of per-recipient outcomes.
#[async_trait]
pub trait ResultSink: Send {
    async fn append(&mut self, record: &OutcomeRecord) -> Result<()>;
}

pub type LedgerSessionRef = Arc<dyn LedgerSession>;
pub type LedgerConnectorBox = Box<dyn LedgerConnector>;
pub type AddressCodecRef = Arc<dyn AddressCodec>;
pub type ResultSinkBox = Box<dyn ResultSink>;
