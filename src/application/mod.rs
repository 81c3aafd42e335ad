//! Application layer: the payout core.
//!
//! `TransactionSubmitter` turns one recipient into one ledger submission,
//! `ConfirmationWatcher` polls that submission to a terminal outcome, and
//! `BatchOrchestrator` sequences both over a whole batch. Only the
//! orchestrator holds state across recipients.

pub mod orchestrator;
pub mod submitter;
pub mod watcher;
