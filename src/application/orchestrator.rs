use super::submitter::TransactionSubmitter;
use super::watcher::ConfirmationWatcher;
use crate::domain::amount::{BaseUnits, ExchangeRate};
use crate::domain::ports::{LedgerSessionRef, ResultSinkBox};
use crate::domain::recipient::RecipientInput;
use crate::domain::transaction::{OutcomeRecord, TransactionOutcome};
use crate::domain::wallet::SenderWallet;
use crate::error::{LedgerError, PayoutError, Result};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

/// Funding snapshot taken before the first submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preflight {
    pub balance: BaseUnits,
    pub required: BaseUnits,
    /// Sum of every requested USD amount, payable or not.
    pub total_usd: Decimal,
}

/// Summary of a batch run. The per-recipient records live in the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub confirmed: usize,
    pub failed: usize,
    pub timed_out: usize,
    /// Rows whose payment may still land and need a manual check.
    pub timed_out_rows: Vec<usize>,
    /// Set when the run was cancelled: the first row that was not attempted.
    pub resume_row: Option<usize>,
}

impl BatchReport {
    fn record(&mut self, record: &OutcomeRecord) {
        self.processed += 1;
        match record.outcome {
            TransactionOutcome::Confirmed { .. } => self.confirmed += 1,
            TransactionOutcome::Failed { .. } => self.failed += 1,
            TransactionOutcome::TimedOut { .. } => {
                self.timed_out += 1;
                self.timed_out_rows.push(record.row);
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.resume_row.is_some()
    }
}

/// Pays a batch of recipients one after another.
///
/// Every attempted recipient produces exactly one record in the sink, in
/// input order, written as soon as its outcome is known. A failure on one
/// recipient never stops the next one; only an unreachable ledger or a
/// broken sink ends the run early.
pub struct BatchOrchestrator {
    session: LedgerSessionRef,
    submitter: TransactionSubmitter,
    watcher: ConfirmationWatcher,
    sink: ResultSinkBox,
}

impl BatchOrchestrator {
    pub fn new(
        session: LedgerSessionRef,
        submitter: TransactionSubmitter,
        watcher: ConfirmationWatcher,
        sink: ResultSinkBox,
    ) -> Self {
        Self {
            session,
            submitter,
            watcher,
            sink,
        }
    }

    /// Checks that the sender can cover every payable recipient in the batch.
    ///
    /// Recipients whose destination or amount is rejected locally are left out
    /// of the total; they fail on their own during the run without reaching
    /// the ledger.
    pub async fn preflight<'a, I>(&self, recipients: I, rate: ExchangeRate) -> Result<Preflight>
    where
        I: IntoIterator<Item = &'a RecipientInput>,
    {
        let mut total_usd = Decimal::ZERO;
        let mut required = 0u64;
        for recipient in recipients {
            total_usd = total_usd
                .checked_add(recipient.requested_usd.value())
                .ok_or_else(|| overflow("USD"))?;
            if self.submitter.encode_destination(recipient).is_err() {
                continue;
            }
            if let Ok(amount) = self.submitter.quote(recipient, rate) {
                required = required
                    .checked_add(amount.value())
                    .ok_or_else(|| overflow("base unit"))?;
            }
        }
        let balance = self
            .session
            .balance()
            .await
            .map_err(|e| PayoutError::ConnectionError(e.to_string()))?;

        tracing::info!(balance = balance.value(), required, "pre-flight funding check");
        if balance.value() < required {
            return Err(PayoutError::InsufficientFunds {
                required,
                available: balance.value(),
            });
        }
        Ok(Preflight {
            balance,
            required: BaseUnits(required),
            total_usd,
        })
    }

    /// Runs the batch. `recipients` yields `(row, recipient)` pairs with
    /// 1-based row numbers in input order.
    ///
    /// Cancellation is only observed between recipients, so a submitted
    /// transaction is always followed to a recorded outcome.
    #[tracing::instrument(name = "batch", skip_all, fields(sender = %wallet.address, rate = %rate))]
    pub async fn run<I>(
        &mut self,
        wallet: &SenderWallet,
        rate: ExchangeRate,
        recipients: I,
        cancel: &CancellationToken,
    ) -> Result<BatchReport>
    where
        I: IntoIterator<Item = (usize, RecipientInput)>,
    {
        let mut report = BatchReport::default();
        tracing::info!("batch started");

        for (row, recipient) in recipients {
            if cancel.is_cancelled() {
                tracing::warn!(resume_row = row, "batch cancelled before submission");
                report.resume_row = Some(row);
                break;
            }

            let (outcome, fatal) = self.pay(row, wallet, &recipient, rate).await;
            let record = OutcomeRecord::new(row, &recipient, outcome);
            if let Err(e) = self.sink.append(&record).await {
                let outcome = format!("{} {}", record.outcome.kind(), record.outcome.detail());
                tracing::error!(row, %outcome, error = %e, "failed to record outcome");
                return Err(PayoutError::RecordError {
                    row,
                    outcome,
                    source: Box::new(e),
                });
            }
            report.record(&record);
            tracing::info!(
                row,
                outcome = record.outcome.kind(),
                detail = %record.outcome.detail(),
                "recipient settled"
            );

            if let Some(e) = fatal {
                tracing::error!(row, error = %e, "ledger unreachable, aborting batch");
                return Err(e.into());
            }
        }

        tracing::info!(
            processed = report.processed,
            confirmed = report.confirmed,
            failed = report.failed,
            timed_out = report.timed_out,
            "batch finished"
        );
        Ok(report)
    }

    /// Pays one recipient. The second element carries a transport failure that
    /// must end the batch once the outcome has been recorded.
    async fn pay(
        &self,
        row: usize,
        wallet: &SenderWallet,
        recipient: &RecipientInput,
        rate: ExchangeRate,
    ) -> (TransactionOutcome, Option<LedgerError>) {
        let submitted = match self.submitter.submit(wallet, recipient, rate).await {
            Ok(submitted) => submitted,
            Err(e) => {
                tracing::debug!(row, "skipping confirmation for unsubmitted payment");
                return (
                    TransactionOutcome::Failed {
                        reason: e.to_string(),
                    },
                    None,
                );
            }
        };

        match self.watcher.watch(&submitted).await {
            Ok(outcome) => (outcome, None),
            Err(e) => (
                TransactionOutcome::TimedOut {
                    tx_id: submitted.tx_id,
                    retries_exhausted: false,
                },
                Some(e),
            ),
        }
    }
}

fn overflow(unit: &str) -> PayoutError {
    PayoutError::ValidationError(format!("batch {unit} total overflows"))
}
