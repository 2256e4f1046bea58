use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::schema::{CanonicalRecord, CANONICAL_COLUMNS};
use crate::union::UnifiedDataset;

/// Port for handing the final dataset off to a storage collaborator.
#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn write(&self, dataset: &UnifiedDataset) -> Result<()>;
}

/// Writes the unified dataset as a single headered CSV file.
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl OutputSink for CsvFileSink {
    async fn write(&self, dataset: &UnifiedDataset) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CANONICAL_COLUMNS)?;
        for record in dataset.records() {
            writer.write_record(record.csv_row())?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, bytes).await?;
        info!(rows = dataset.len(), path = %self.path.display(), "Wrote unified dataset");
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct InMemorySink {
    records: Arc<Mutex<Vec<CanonicalRecord>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CanonicalRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutputSink for InMemorySink {
    async fn write(&self, dataset: &UnifiedDataset) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        records.clear();
        records.extend_from_slice(dataset.records());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> UnifiedDataset {
        UnifiedDataset::union(vec![vec![CanonicalRecord {
            external_id: Some("A1".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: None,
            dob: chrono::NaiveDate::from_ymd_opt(1980, 1, 15),
            email: None,
            phone: Some("415-555-1234".to_string()),
            partner_code: "ACME".to_string(),
        }]])
    }

    #[tokio::test]
    async fn in_memory_sink_captures_records() {
        let sink = InMemorySink::new();
        sink.write(&sample_dataset()).await.unwrap();
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].partner_code, "ACME");
    }

    #[tokio::test]
    async fn csv_sink_writes_nulls_as_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        CsvFileSink::new(&path).write(&sample_dataset()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("external_id,first_name,last_name,dob,email,phone,partner_code")
        );
        assert_eq!(lines.next(), Some("A1,Jane,,1980-01-15,,415-555-1234,ACME"));
    }
}
