use super::recipient::RecipientInput;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque transaction identifier assigned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId(pub String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A destination address in the ledger's addressing format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: String,
    pub tag: Option<u32>,
}

/// Status of a submitted transaction as reported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Succeeded,
    Pending,
    Failed,
    Unknown,
}

/// A transaction the ledger has accepted for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedTransaction {
    pub tx_id: TxId,
    pub recipient: RecipientInput,
}

/// The terminal result of paying one recipient.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    Confirmed {
        tx_id: TxId,
    },
    Failed {
        reason: String,
    },
    /// The transaction was still pending when polling stopped. It may yet
    /// validate, so it must be re-checked before paying again.
    TimedOut {
        tx_id: TxId,
        retries_exhausted: bool,
    },
}

impl TransactionOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "confirmed",
            Self::Failed { .. } => "failed",
            Self::TimedOut { .. } => "timed_out",
        }
    }

    /// The transaction id for confirmed and timed out payments, the failure
    /// reason otherwise.
    pub fn detail(&self) -> String {
        match self {
            Self::Confirmed { tx_id } => tx_id.to_string(),
            Self::Failed { reason } => reason.clone(),
            Self::TimedOut {
                tx_id,
                retries_exhausted: true,
            } => tx_id.to_string(),
            Self::TimedOut {
                tx_id,
                retries_exhausted: false,
            } => format!("{tx_id} (polling interrupted)"),
        }
    }
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeRecord {
    /// 1-based position of the recipient in the input.
    pub row: usize,
    pub display_name: String,
    pub destination_address: String,
    pub outcome: TransactionOutcome,
}

impl OutcomeRecord {
    pub fn new(row: usize, recipient: &RecipientInput, outcome: TransactionOutcome) -> Self {
        Self {
            row,
            display_name: recipient.display_name.clone(),
            destination_address: recipient.destination_address.clone(),
            outcome,
        }
    }
}
