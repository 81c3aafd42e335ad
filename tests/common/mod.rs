#![allow(dead_code)]

use disburse::application::orchestrator::BatchOrchestrator;
use disburse::application::submitter::TransactionSubmitter;
use disburse::application::watcher::{ConfirmationWatcher, RetryPolicy};
use disburse::domain::amount::{LedgerPrecision, UsdAmount};
use disburse::domain::ports::LedgerSessionRef;
use disburse::domain::recipient::RecipientInput;
use disburse::infrastructure::address::ClassicAddressCodec;
use disburse::infrastructure::in_memory::InMemoryResultSink;
use disburse::infrastructure::simulated::SimulatedLedger;
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const SENDER: &str = "rLNaPoKeeBjZe2qs6x52yVPZpZ8td4dc6w";
pub const ALICE: &str = "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe";
pub const BOB: &str = "rf1BiGeXwwQoi8Z2ueFYTEXSwuJYfV2Jpn";
pub const CAROL: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

pub fn generate_csv(path: &Path, rows: &[[&str; 4]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["name", "address", "tag", "usd_amount"])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn recipient(name: &str, address: &str, usd: Decimal) -> RecipientInput {
    RecipientInput::new(name, address, None, UsdAmount::new(usd).unwrap())
}

pub fn numbered(recipients: Vec<RecipientInput>) -> Vec<(usize, RecipientInput)> {
    recipients
        .into_iter()
        .enumerate()
        .map(|(i, r)| (i + 1, r))
        .collect()
}

pub fn no_backoff(retry_limit: u32) -> RetryPolicy {
    RetryPolicy {
        retry_limit,
        backoff_ms: 0,
        backoff_factor: 1,
        max_backoff_ms: 0,
    }
}

pub fn orchestrator(
    ledger: &SimulatedLedger,
    sink: &InMemoryResultSink,
    policy: RetryPolicy,
) -> BatchOrchestrator {
    let session: LedgerSessionRef = Arc::new(ledger.clone());
    BatchOrchestrator::new(
        session.clone(),
        TransactionSubmitter::new(
            session.clone(),
            Arc::new(ClassicAddressCodec),
            LedgerPrecision::default(),
        ),
        ConfirmationWatcher::new(session, policy),
        Box::new(sink.clone()),
    )
}
