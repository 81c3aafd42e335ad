use miette::Diagnostic;
use thiserror::Error;

/// Fatal errors. Anything surfacing as a `PayoutError` stops the run.
#[derive(Error, Diagnostic, Debug)]
pub enum PayoutError {
    #[error("CSV error: {0}")]
    #[diagnostic(code(disburse::csv))]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    #[diagnostic(code(disburse::io))]
    IoError(#[from] std::io::Error),
    #[error("Config file error: {0}")]
    #[diagnostic(code(disburse::config))]
    ConfigFileError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(disburse::config))]
    ConfigError(String),
    #[error("Validation error: {0}")]
    #[diagnostic(
        code(disburse::validation),
        help("fix the input file; no payments were submitted")
    )]
    ValidationError(String),
    #[error("Could not connect to ledger: {0}")]
    #[diagnostic(
        code(disburse::connection),
        help("check the endpoint and sender address; no payments were submitted")
    )]
    ConnectionError(String),
    #[error("Insufficient funds: batch needs {required} base units, sender holds {available}")]
    #[diagnostic(code(disburse::funds), help("fund the sender or split the batch"))]
    InsufficientFunds { required: u64, available: u64 },
    #[error("Could not record row {row} ({outcome}): {source}")]
    #[diagnostic(
        code(disburse::audit),
        help("this outcome is missing from the audit file; note it by hand before resuming")
    )]
    RecordError {
        row: usize,
        outcome: String,
        #[source]
        source: Box<PayoutError>,
    },
    #[error("Ledger unreachable mid-batch: {0}")]
    #[diagnostic(
        code(disburse::ledger),
        help("outcomes written so far are final; re-check the last timed out row before resuming")
    )]
    LedgerError(#[from] LedgerError),
}

/// Errors raised by a ledger session adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// The endpoint could not be reached or answered garbage.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The ledger refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
    /// The request could not be built from the given inputs.
    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Per-recipient submission failure. Always recorded as a `Failed` outcome,
/// never propagated out of the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("invalid destination {address}: {reason}")]
    InvalidDestination { address: String, reason: String },
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("submission failed: {0}")]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, PayoutError>;
