use chrono::NaiveDate;

use crate::config::PartnerConfig;
use crate::mapper::MappedRecord;
use crate::schema::{self, CanonicalRecord};

/// Apply the canonical per-field cleaning rules to a renamed record.
///
/// Pure and per-record; data-quality problems never raise. An unparsable
/// date or a phone with too few digits nulls the field and lets the final
/// filter decide survival. `partner_code` is always the configured literal,
/// even if the partner shipped a column of the same name.
pub fn normalize(record: &MappedRecord, cfg: &PartnerConfig) -> CanonicalRecord {
    CanonicalRecord {
        external_id: record.get(schema::EXTERNAL_ID).map(|v| v.trim().to_string()),
        first_name: record.get(schema::FIRST_NAME).map(title_case),
        last_name: record.get(schema::LAST_NAME).map(title_case),
        dob: record
            .get(schema::DOB)
            .and_then(|v| parse_dob(v, &cfg.chrono_format)),
        email: record
            .get(schema::EMAIL)
            .map(|v| v.trim().to_lowercase()),
        phone: record.get(schema::PHONE).and_then(format_phone),
        partner_code: cfg.partner_code.clone(),
    }
}

/// First letter of each whitespace-delimited word uppercased, rest lowercased.
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn parse_dob(value: &str, chrono_format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), chrono_format).ok()
}

/// Strip every non-digit, then group the first ten digits as AAA-BBB-CCCC.
/// Fewer than ten digits nulls the field; we never emit a truncated grouping.
fn format_phone(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return None;
    }
    Some(format!(
        "{}-{}-{}",
        &digits[..3],
        &digits[3..6],
        &digits[6..10]
    ))
}
