use crate::domain::recipient::RecipientInput;
use crate::error::{PayoutError, Result};
use std::io::Read;

/// Reads recipients from a CSV source with the header
/// `name,address,tag,usd_amount`.
///
/// Cells are trimmed and a row may omit the trailing `tag` column. Rows are
/// parsed lazily, so a bad row surfaces only when the iterator reaches it.
pub struct RecipientReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RecipientReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Row-by-row view of the file, one parse result per data row.
    pub fn recipients(self) -> impl Iterator<Item = Result<RecipientInput>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PayoutError::from))
    }

    /// Reads the whole batch, numbering rows from 1.
    ///
    /// Fails on the first malformed row so that a batch is never started
    /// from a partially understood file.
    pub fn read_batch(self) -> Result<Vec<(usize, RecipientInput)>> {
        self.recipients()
            .enumerate()
            .map(|(i, row)| {
                let row_number = i + 1;
                row.map(|recipient| (row_number, recipient)).map_err(|e| {
                    PayoutError::ValidationError(format!("row {row_number}: {e}"))
                })
            })
            .collect()
    }
}
