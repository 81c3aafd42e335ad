use crate::domain::ports::LedgerSessionRef;
use crate::domain::transaction::{SubmittedTransaction, TransactionOutcome, TxStatus};
use crate::error::LedgerError;
use serde::Deserialize;
use std::time::Duration;

/// How long and how often to poll a pending transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Pending polls tolerated before giving up. Zero still polls once.
    pub retry_limit: u32,
    /// Delay before the first re-poll.
    pub backoff_ms: u64,
    /// Multiplier applied to the delay after each pending poll.
    pub backoff_factor: u64,
    /// Upper bound on a single delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: 3,
            backoff_ms: 1000,
            backoff_factor: 2,
            max_backoff_ms: 10000,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `attempt`-th pending poll (1-based).
    ///
    /// Non-decreasing in `attempt` as long as `backoff_factor >= 1`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let delay = self
            .backoff_factor
            .checked_pow(exponent)
            .and_then(|multiplier| self.backoff_ms.checked_mul(multiplier))
            .unwrap_or(u64::MAX)
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }
}

/// Drives a submitted transaction to a terminal outcome by polling its status.
///
/// `Ok` always carries a terminal outcome. `Err` means the ledger could not
/// be reached at all; the transaction's fate is then unknown to the caller.
pub struct ConfirmationWatcher {
    session: LedgerSessionRef,
    policy: RetryPolicy,
}

impl ConfirmationWatcher {
    pub fn new(session: LedgerSessionRef, policy: RetryPolicy) -> Self {
        Self { session, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[tracing::instrument(name = "confirm", skip_all, fields(tx_id = %submitted.tx_id))]
    pub async fn watch(
        &self,
        submitted: &SubmittedTransaction,
    ) -> Result<TransactionOutcome, LedgerError> {
        let tx_id = &submitted.tx_id;
        let mut attempts: u32 = 0;

        loop {
            let status = self.session.query_status(tx_id).await?;
            tracing::debug!(attempt = attempts + 1, status = ?status, "polled transaction status");

            match status {
                TxStatus::Succeeded => {
                    tracing::info!("transaction confirmed");
                    return Ok(TransactionOutcome::Confirmed {
                        tx_id: tx_id.clone(),
                    });
                }
                TxStatus::Failed | TxStatus::Unknown => {
                    tracing::warn!(status = ?status, "transaction rejected by ledger");
                    return Ok(TransactionOutcome::Failed {
                        reason: format!("ledger reported transaction {tx_id} as {status:?}"),
                    });
                }
                TxStatus::Pending => {
                    attempts += 1;
                    if attempts >= self.policy.retry_limit {
                        tracing::warn!(attempts, "transaction still pending, giving up");
                        return Ok(TransactionOutcome::TimedOut {
                            tx_id: tx_id.clone(),
                            retries_exhausted: true,
                        });
                    }
                    tokio::time::sleep(self.policy.delay_for(attempts)).await;
                }
            }
        }
    }
}
