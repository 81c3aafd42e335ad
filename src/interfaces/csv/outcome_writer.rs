use crate::domain::ports::ResultSink;
use crate::domain::transaction::OutcomeRecord;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OutcomeRow<'a> {
    row: usize,
    name: &'a str,
    address: &'a str,
    outcome: &'static str,
    detail: String,
}

impl<'a> From<&'a OutcomeRecord> for OutcomeRow<'a> {
    fn from(record: &'a OutcomeRecord) -> Self {
        Self {
            row: record.row,
            name: &record.display_name,
            address: &record.destination_address,
            outcome: record.outcome.kind(),
            detail: record.outcome.detail(),
        }
    }
}

/// Writes the audit trail as CSV, one line per recipient.
///
/// Every record is flushed as soon as it is written, so an interrupted run
/// still leaves every settled outcome on disk.
pub struct CsvOutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvOutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().from_writer(sink);
        Self { writer }
    }

    /// Continues an existing audit file without repeating the header.
    pub fn without_header(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_record(&mut self, record: &OutcomeRecord) -> Result<()> {
        self.writer.serialize(OutcomeRow::from(record))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()).into())
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for CsvOutcomeWriter<W> {
    async fn append(&mut self, record: &OutcomeRecord) -> Result<()> {
        self.write_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{TransactionOutcome, TxId};

    fn record(row: usize, outcome: TransactionOutcome) -> OutcomeRecord {
        OutcomeRecord {
            row,
            display_name: format!("Recipient {row}"),
            destination_address: "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_writes_header_and_one_line_per_record() {
        let mut writer = CsvOutcomeWriter::new(Vec::new());
        writer
            .write_record(&record(
                1,
                TransactionOutcome::Confirmed {
                    tx_id: TxId::new("AAA"),
                },
            ))
            .unwrap();
        writer
            .write_record(&record(
                2,
                TransactionOutcome::Failed {
                    reason: "invalid destination, bad tag".to_string(),
                },
            ))
            .unwrap();
        writer
            .write_record(&record(
                3,
                TransactionOutcome::TimedOut {
                    tx_id: TxId::new("CCC"),
                    retries_exhausted: true,
                },
            ))
            .unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "row,name,address,outcome,detail");
        assert_eq!(lines[1], "1,Recipient 1,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,confirmed,AAA");
        assert_eq!(
            lines[2],
            "2,Recipient 2,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,failed,\"invalid destination, bad tag\""
        );
        assert_eq!(lines[3], "3,Recipient 3,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,timed_out,CCC");
    }

    #[test]
    fn test_without_header_skips_header_line() {
        let mut writer = CsvOutcomeWriter::without_header(Vec::new());
        writer
            .write_record(&record(
                4,
                TransactionOutcome::Confirmed {
                    tx_id: TxId::new("DDD"),
                },
            ))
            .unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(output, "4,Recipient 4,rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe,confirmed,DDD\n");
    }

    #[tokio::test]
    async fn test_sink_appends_incrementally() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut sink = CsvOutcomeWriter::new(file.reopen().unwrap());

        sink.append(&record(
            1,
            TransactionOutcome::Confirmed {
                tx_id: TxId::new("AAA"),
            },
        ))
        .await
        .unwrap();

        // visible on disk before the writer is dropped
        let on_disk = std::fs::read_to_string(file.path()).unwrap();
        assert!(on_disk.contains("1,Recipient 1"));
    }
}
