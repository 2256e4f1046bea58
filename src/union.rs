use serde::Serialize;

use crate::schema::CanonicalRecord;

/// One logical dataset spanning all partners, in partner-iteration order.
///
/// Every per-partner fragment already carries the identical seven-column
/// canonical schema, so union is plain concatenation; there is no column
/// reconciliation to do.
#[derive(Debug, Default, Clone, Serialize)]
pub struct UnifiedDataset {
    records: Vec<CanonicalRecord>,
}

impl UnifiedDataset {
    pub fn union(fragments: Vec<Vec<CanonicalRecord>>) -> Self {
        let mut records = Vec::with_capacity(fragments.iter().map(Vec::len).sum());
        for fragment in fragments {
            records.extend(fragment);
        }
        Self { records }
    }

    /// Drop records with no external id. Presence only: an id that trimmed
    /// to the empty string still counts as present.
    pub fn filter_missing_external_id(self) -> Self {
        Self {
            records: self
                .records
                .into_iter()
                .filter(|r| r.external_id.is_some())
                .collect(),
        }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
