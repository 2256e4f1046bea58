use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::{PartnerConfig, PartnerConfigStore};
use crate::error::{PipelineError, Result};
use crate::mapper::RenamePlan;
use crate::normalize;
use crate::reader::SourceReader;
use crate::schema::CanonicalRecord;
use crate::union::UnifiedDataset;

/// Row counts from a completed pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub partner_counts: Vec<PartnerCount>,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

/// Rows contributed by one partner, before the final filter.
#[derive(Debug, Serialize)]
pub struct PartnerCount {
    pub partner: String,
    pub partner_code: String,
    pub rows: usize,
}

/// Drives rename -> normalize per partner, unions the fragments, then
/// applies the external-id presence filter.
///
/// The reader is injected so the orchestration is testable without touching
/// a filesystem; a failed source read is fatal to the whole run and names
/// the offending partner.
pub struct EligibilityPipeline {
    configs: PartnerConfigStore,
    reader: Arc<dyn SourceReader>,
}

impl EligibilityPipeline {
    pub fn new(configs: PartnerConfigStore, reader: Arc<dyn SourceReader>) -> Self {
        Self { configs, reader }
    }

    #[instrument(skip_all, fields(partner = %partner_name))]
    async fn process_partner(
        &self,
        partner_name: &str,
        cfg: &PartnerConfig,
    ) -> Result<Vec<CanonicalRecord>> {
        debug!(location = %cfg.source_location, "Reading partner source");
        let batch = self
            .reader
            .read(cfg)
            .await
            .map_err(|e| PipelineError::SourceRead {
                partner: partner_name.to_string(),
                location: cfg.source_location.clone(),
                source: Box::new(e),
            })?;

        let plan = RenamePlan::build(&batch.headers, &cfg.mappings);
        let records: Vec<CanonicalRecord> = batch
            .rows
            .iter()
            .map(|row| normalize::normalize(&plan.project(row), cfg))
            .collect();

        info!(rows = records.len(), "Normalized partner batch");
        Ok(records)
    }

    pub async fn run(&self) -> Result<(UnifiedDataset, PipelineResult)> {
        info!(partners = self.configs.len(), "Starting eligibility pipeline");

        let mut fragments = Vec::with_capacity(self.configs.len());
        let mut partner_counts = Vec::with_capacity(self.configs.len());
        for (name, cfg) in self.configs.partners() {
            let records = self.process_partner(name, cfg).await?;
            partner_counts.push(PartnerCount {
                partner: name.to_string(),
                partner_code: cfg.partner_code.clone(),
                rows: records.len(),
            });
            fragments.push(records);
        }

        let unioned = UnifiedDataset::union(fragments);
        let before_filter = unioned.len();
        let dataset = unioned.filter_missing_external_id();
        let dropped_rows = before_filter - dataset.len();
        if dropped_rows > 0 {
            warn!(dropped_rows, "Dropped rows with no external id");
        }

        info!(rows = dataset.len(), "Pipeline finished");
        let result = PipelineResult {
            partner_counts,
            total_rows: dataset.len(),
            dropped_rows,
        };
        Ok((dataset, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{parse_delimited, RawBatch};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Reader that serves canned file contents keyed by source location.
    struct FixtureReader {
        files: HashMap<String, String>,
    }

    #[async_trait]
    impl SourceReader for FixtureReader {
        async fn read(&self, cfg: &PartnerConfig) -> Result<RawBatch> {
            let raw = self.files.get(&cfg.source_location).ok_or_else(|| {
                PipelineError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    cfg.source_location.clone(),
                ))
            })?;
            parse_delimited(raw, cfg.delimiter)
        }
    }

    const CONFIG_DOC: &str = r#"{
        "acme_health": {
            "partner_code": "ACME",
            "delimiter": "|",
            "source_location": "acme.csv",
            "date_format": "yyyy-MM-dd",
            "mappings": {
                " MBI ": "external_id",
                "First": "first_name",
                "Last": "last_name",
                "BirthDate": "dob",
                "Email Address": "email",
                "Phone#": "phone"
            }
        },
        "beta_care": {
            "partner_code": "BETA",
            "delimiter": ",",
            "source_location": "beta.csv",
            "date_format": "MM/dd/yyyy",
            "mappings": {
                "MemberNo": "external_id",
                "FName": "first_name",
                "LName": "last_name",
                "DOB": "dob"
            }
        }
    }"#;

    fn fixture_pipeline() -> EligibilityPipeline {
        let configs = PartnerConfigStore::from_json(CONFIG_DOC).unwrap();
        let mut files = HashMap::new();
        files.insert(
            "acme.csv".to_string(),
            "MBI|First|Last|BirthDate|Email Address|Phone#\n\
             A100|jANE|dOE|1980-01-15|Jane@Example.COM|(415) 555-1234\n\
             A101|bob|smith|not-a-date|bob@x.com|555-1234\n\
             |carol|jones|1990-06-01|carol@x.com|4155559999\n"
                .to_string(),
        );
        files.insert(
            "beta.csv".to_string(),
            "MemberNo,FName,LName,DOB\nB200,alice,wong,03/09/1984\n".to_string(),
        );
        EligibilityPipeline::new(configs, Arc::new(FixtureReader { files }))
    }

    #[tokio::test]
    async fn unions_partners_in_config_order_with_codes() {
        let (dataset, result) = fixture_pipeline().run().await.unwrap();

        // acme sorts before beta; all four rows have an external id present
        // (the blank one trims to empty string, which still counts).
        assert_eq!(result.total_rows, 4);
        let codes: Vec<&str> = dataset
            .records()
            .iter()
            .map(|r| r.partner_code.as_str())
            .collect();
        assert_eq!(codes, vec!["ACME", "ACME", "ACME", "BETA"]);
    }

    #[tokio::test]
    async fn normalizes_fields_per_partner_rules() {
        let (dataset, _) = fixture_pipeline().run().await.unwrap();
        let jane = &dataset.records()[0];
        assert_eq!(jane.external_id.as_deref(), Some("A100"));
        assert_eq!(jane.first_name.as_deref(), Some("Jane"));
        assert_eq!(jane.last_name.as_deref(), Some("Doe"));
        assert_eq!(jane.email.as_deref(), Some("jane@example.com"));
        assert_eq!(jane.phone.as_deref(), Some("415-555-1234"));
        assert_eq!(
            jane.dob,
            chrono::NaiveDate::from_ymd_opt(1980, 1, 15)
        );
    }

    #[tokio::test]
    async fn bad_date_and_short_phone_degrade_not_drop() {
        let (dataset, _) = fixture_pipeline().run().await.unwrap();
        let bob = &dataset.records()[1];
        assert_eq!(bob.external_id.as_deref(), Some("A101"));
        assert_eq!(bob.dob, None);
        assert_eq!(bob.phone, None);
    }

    #[tokio::test]
    async fn missing_source_is_fatal_and_names_partner() {
        let configs = PartnerConfigStore::from_json(CONFIG_DOC).unwrap();
        let pipeline = EligibilityPipeline::new(
            configs,
            Arc::new(FixtureReader {
                files: HashMap::new(),
            }),
        );
        match pipeline.run().await.unwrap_err() {
            PipelineError::SourceRead { partner, .. } => assert_eq!(partner, "acme_health"),
            other => panic!("expected SourceRead, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn partner_missing_a_column_contributes_null() {
        let (dataset, _) = fixture_pipeline().run().await.unwrap();
        let alice = &dataset.records()[3];
        assert_eq!(alice.external_id.as_deref(), Some("B200"));
        assert_eq!(alice.email, None);
        assert_eq!(alice.phone, None);
        assert_eq!(
            alice.dob,
            chrono::NaiveDate::from_ymd_opt(1984, 3, 9)
        );
    }
}
