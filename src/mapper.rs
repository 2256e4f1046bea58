use std::collections::HashMap;

/// A record keyed by canonical column name, produced by projecting a raw row
/// through a [`RenamePlan`]. A column the partner did not supply is simply
/// absent from the map.
#[derive(Debug, Default, Clone)]
pub struct MappedRecord {
    fields: HashMap<String, String>,
}

impl MappedRecord {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, canonical: &str) -> Option<&str> {
        self.fields.get(canonical).map(String::as_str)
    }
}

/// Resolves a partner's column mapping against an actual header row, yielding
/// canonical column name -> raw column index.
///
/// Both sides of every mapping entry are trimmed before matching, so
/// incidental whitespace in either the configuration document or the file
/// header is tolerated. Matching is case-sensitive after trimming. A mapping
/// key with no matching header is partner drift and is silently skipped.
#[derive(Debug, Default)]
pub struct RenamePlan {
    columns: HashMap<String, usize>,
}

impl RenamePlan {
    pub fn build(headers: &[String], mappings: &HashMap<String, String>) -> Self {
        let mut columns = HashMap::with_capacity(mappings.len());
        for (raw_key, canonical_key) in mappings {
            let raw_key = raw_key.trim();
            if let Some(idx) = headers.iter().position(|h| h.trim() == raw_key) {
                columns.insert(canonical_key.trim().to_string(), idx);
            }
        }
        Self { columns }
    }

    /// Project a raw row into a canonical-keyed record. Header columns the
    /// plan does not name are dropped here; only canonical columns flow
    /// downstream.
    pub fn project(&self, row: &csv::StringRecord) -> MappedRecord {
        let mut fields = HashMap::with_capacity(self.columns.len());
        for (canonical, &idx) in &self.columns {
            if let Some(value) = row.get(idx) {
                fields.insert(canonical.clone(), value.to_string());
            }
        }
        MappedRecord { fields }
    }
}
