use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::config::PartnerConfig;
use crate::error::Result;

/// Raw partner records as read from a source: the header row verbatim plus
/// one string row per record. Values arrive with surrounding whitespace
/// already stripped; header names are left untouched so the rename step can
/// apply its own trim-tolerant matching.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<StringRecord>,
}

/// Port for fetching a partner's raw records. The pipeline receives an
/// implementation at construction time; core logic never touches I/O.
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn read(&self, cfg: &PartnerConfig) -> Result<RawBatch>;
}

/// Reads delimited files from the local filesystem.
pub struct LocalFileReader;

#[async_trait]
impl SourceReader for LocalFileReader {
    async fn read(&self, cfg: &PartnerConfig) -> Result<RawBatch> {
        let raw = tokio::fs::read_to_string(&cfg.source_location).await?;
        parse_delimited(&raw, cfg.delimiter)
    }
}

/// Parse delimited text with a header row. Rows may be ragged; a short row
/// simply contributes nothing for the missing columns.
pub fn parse_delimited(raw: &str, delimiter: u8) -> Result<RawBatch> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::Fields)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row?);
    }
    Ok(RawBatch { headers, rows })
}
