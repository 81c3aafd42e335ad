use clap::Parser;
use disburse::application::orchestrator::{BatchOrchestrator, BatchReport};
use disburse::application::submitter::TransactionSubmitter;
use disburse::application::watcher::ConfirmationWatcher;
use disburse::config::{Config, Network};
use disburse::domain::amount::ExchangeRate;
use disburse::domain::ports::{LedgerConnectorBox, ResultSinkBox};
use disburse::domain::wallet::SenderWallet;
use disburse::error::PayoutError;
use disburse::infrastructure::address::ClassicAddressCodec;
use disburse::infrastructure::json_rpc::JsonRpcConnector;
use disburse::infrastructure::simulated::SimulatedConnector;
use disburse::interfaces::csv::outcome_writer::CsvOutcomeWriter;
use disburse::interfaces::csv::recipient_reader::RecipientReader;
use disburse::interfaces::prompt::{self, BatchSummary};
use miette::{IntoDiagnostic, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recipients CSV file (name,address,tag,usd_amount)
    input: PathBuf,

    /// Exchange rate in USD per native unit
    #[arg(long, value_parser = parse_rate)]
    rate: ExchangeRate,

    /// Sender account address
    #[arg(long)]
    sender: String,

    /// Sender signing seed
    #[arg(long, env = "DISBURSE_SEED", hide_env_values = true)]
    seed: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ledger network (overrides the config file)
    #[arg(long, value_enum)]
    network: Option<Network>,

    /// Trusted JSON-RPC node that signs and submits payments (required for live runs)
    #[arg(long)]
    endpoint: Option<String>,

    /// Pending polls tolerated per transaction
    #[arg(long)]
    retry_limit: Option<u32>,

    /// Initial delay between polls, in milliseconds
    #[arg(long)]
    backoff_ms: Option<u64>,

    /// Write outcomes to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Replace an existing --output file instead of refusing to start
    #[arg(long)]
    overwrite: bool,

    /// First input row to pay (1-based), for resuming an interrupted batch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    start_row: u64,

    /// Skip the confirmation prompt
    #[arg(long)]
    yes: bool,

    /// Pay against an in-process simulated ledger
    #[arg(long)]
    dry_run: bool,
}

fn parse_rate(s: &str) -> std::result::Result<ExchangeRate, String> {
    s.parse().map_err(|e: PayoutError| e.to_string())
}

fn load_config(cli: &Cli) -> disburse::error::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(network) = cli.network {
        config.ledger.network = network;
    }
    if let Some(endpoint) = &cli.endpoint {
        config.ledger.endpoint = Some(endpoint.clone());
    }
    if let Some(retry_limit) = cli.retry_limit {
        config.retry.retry_limit = retry_limit;
    }
    if let Some(backoff_ms) = cli.backoff_ms {
        config.retry.backoff_ms = backoff_ms;
        config.retry.max_backoff_ms = config.retry.max_backoff_ms.max(backoff_ms);
    }
    config.validate()?;
    Ok(config)
}

fn open_sink(cli: &Cli) -> disburse::error::Result<ResultSinkBox> {
    let Some(path) = &cli.output else {
        return Ok(Box::new(CsvOutcomeWriter::new(io::stdout())));
    };
    // A resumed run continues the existing audit file.
    if cli.start_row > 1 && path.exists() {
        let file = OpenOptions::new().append(true).open(path)?;
        return Ok(Box::new(CsvOutcomeWriter::without_header(file)));
    }
    if cli.overwrite {
        return Ok(Box::new(CsvOutcomeWriter::new(File::create(path)?)));
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(Box::new(CsvOutcomeWriter::new(file))),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(PayoutError::ConfigError(
            format!(
                "{} already holds an audit trail; resume with --start-row or pass --overwrite",
                path.display()
            ),
        )),
        Err(e) => Err(e.into()),
    }
}

fn print_report(report: &BatchReport) {
    eprintln!(
        "Processed {}: {} confirmed, {} failed, {} timed out",
        report.processed, report.confirmed, report.failed, report.timed_out
    );
    if !report.timed_out_rows.is_empty() {
        eprintln!(
            "Rows {:?} timed out: check these transactions on the ledger before paying again",
            report.timed_out_rows
        );
    }
    if let Some(row) = report.resume_row {
        eprintln!("Batch cancelled. Resume with --start-row {row}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let file = File::open(&cli.input).into_diagnostic()?;
    let batch = RecipientReader::new(file).read_batch()?;
    let start_row = usize::try_from(cli.start_row).into_diagnostic()?;
    let batch: Vec<_> = batch
        .into_iter()
        .filter(|(row, _)| *row >= start_row)
        .collect();

    if !cli.dry_run && cli.seed.is_none() {
        return Err(PayoutError::ConfigError(
            "a signing seed is required (--seed or DISBURSE_SEED)".to_string(),
        )
        .into());
    }
    let wallet = SenderWallet::new(cli.sender.clone(), cli.seed.clone());

    let connector: LedgerConnectorBox = if cli.dry_run {
        Box::new(SimulatedConnector::default())
    } else {
        Box::new(JsonRpcConnector)
    };
    let endpoint = if cli.dry_run {
        "simulated"
    } else {
        config.ledger.signing_endpoint()?
    };
    let session = connector
        .connect(endpoint, config.ledger.network, &wallet.address)
        .await?;

    let submitter = TransactionSubmitter::new(
        session.clone(),
        Arc::new(ClassicAddressCodec),
        config.ledger.precision(),
    );
    let watcher = ConfirmationWatcher::new(session.clone(), config.retry.clone());
    let sink = open_sink(&cli)?;
    let mut orchestrator = BatchOrchestrator::new(session, submitter, watcher, sink);

    let preflight = orchestrator
        .preflight(batch.iter().map(|(_, recipient)| recipient), cli.rate)
        .await?;

    if !cli.yes {
        let summary = BatchSummary {
            network: config.ledger.network,
            sender: wallet.address.clone(),
            recipients: batch.len(),
            total_usd: preflight.total_usd,
            total: preflight.required,
            precision: config.ledger.precision(),
        };
        let proceed =
            prompt::confirm(&summary, io::stdin().lock(), io::stderr()).into_diagnostic()?;
        if !proceed {
            eprintln!("Aborted: no payments were submitted");
            return Ok(());
        }
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing current recipient");
            on_signal.cancel();
        }
    });

    let report = orchestrator.run(&wallet, cli.rate, batch, &cancel).await?;
    print_report(&report);

    Ok(())
}
