use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const EXTERNAL_ID: &str = "external_id";
pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const DOB: &str = "dob";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const PARTNER_CODE: &str = "partner_code";

/// The fixed seven-column target shape, in output order.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    EXTERNAL_ID,
    FIRST_NAME,
    LAST_NAME,
    DOB,
    EMAIL,
    PHONE,
    PARTNER_CODE,
];

/// One eligibility record in the canonical schema. A `None` field means the
/// partner either supplied no value or supplied one that failed cleaning;
/// `partner_code` is always the configured literal for the originating
/// partner and is never null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub external_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub partner_code: String,
}

impl CanonicalRecord {
    /// Render as a CSV row in canonical column order. Null fields become
    /// empty strings; dates are ISO formatted.
    pub fn csv_row(&self) -> Vec<String> {
        vec![
            self.external_id.clone().unwrap_or_default(),
            self.first_name.clone().unwrap_or_default(),
            self.last_name.clone().unwrap_or_default(),
            self.dob
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            self.phone.clone().unwrap_or_default(),
            self.partner_code.clone(),
        ]
    }
}
