use crate::domain::ports::ResultSink;
use crate::domain::transaction::OutcomeRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps outcome records in memory instead of an audit file.
///
/// Clones share one record list, so the copy boxed into the orchestrator
/// and the copy kept by the caller see the same rows.
#[derive(Default, Clone)]
pub struct InMemoryResultSink {
    records: Arc<RwLock<Vec<OutcomeRecord>>>,
}

impl InMemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in append order.
    pub async fn records(&self) -> Vec<OutcomeRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ResultSink for InMemoryResultSink {
    async fn append(&mut self, record: &OutcomeRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(())
    }
}
