use crate::config::Network;
use crate::domain::amount::{BaseUnits, LedgerPrecision};
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};

/// What the operator is asked to approve.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub network: Network,
    pub sender: String,
    pub recipients: usize,
    pub total_usd: Decimal,
    pub total: BaseUnits,
    pub precision: LedgerPrecision,
}

impl BatchSummary {
    /// Total payout expressed in native units.
    pub fn total_native(&self) -> Decimal {
        Decimal::from(self.total.value()) / Decimal::from(10u64.pow(self.precision.decimals))
    }
}

/// Shows the summary and asks for a go-ahead. Anything but `y`/`yes` declines.
pub fn confirm<R: BufRead, W: Write>(
    summary: &BatchSummary,
    input: R,
    mut output: W,
) -> io::Result<bool> {
    writeln!(output, "Network:    {}", summary.network)?;
    writeln!(output, "Sender:     {}", summary.sender)?;
    writeln!(output, "Recipients: {}", summary.recipients)?;
    writeln!(output, "Total USD:  {}", summary.total_usd.normalize())?;
    writeln!(
        output,
        "Total paid: {} ({} base units)",
        summary.total_native().normalize(),
        summary.total
    )?;
    write!(output, "Proceed? [y/N] ")?;
    output.flush()?;

    let answer = match input.lines().next() {
        Some(line) => line?,
        None => return Ok(false),
    };
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
