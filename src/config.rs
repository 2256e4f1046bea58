use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Immutable per-partner configuration, validated once at load time.
#[derive(Debug, Clone)]
pub struct PartnerConfig {
    pub partner_code: String,
    pub delimiter: u8,
    pub source_location: String,
    /// The pattern as written in the configuration document (Java-style,
    /// e.g. `yyyy-MM-dd`). Kept for diagnostics.
    pub date_format: String,
    /// The same pattern translated to chrono strftime syntax.
    pub chrono_format: String,
    pub mappings: HashMap<String, String>,
}

/// Loads and exposes one configuration entry per partner name.
///
/// Partners iterate in lexicographic name order so the unioned output is
/// deterministic regardless of JSON key order.
#[derive(Debug)]
pub struct PartnerConfigStore {
    partners: Vec<(String, PartnerConfig)>,
}

impl PartnerConfigStore {
    /// Parse a JSON configuration document keyed by partner name. Any
    /// missing required field, multi-character delimiter, or untranslatable
    /// date pattern rejects the whole document.
    pub fn from_json(document: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(document)?;
        let entries = root.as_object().ok_or_else(|| {
            PipelineError::Config(
                "configuration document must be a JSON object keyed by partner name".to_string(),
            )
        })?;

        let mut partners = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let cfg = parse_partner(name, entry)?;
            debug!(partner = %name, code = %cfg.partner_code, "Loaded partner config");
            partners.push((name.clone(), cfg));
        }
        partners.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self { partners })
    }

    pub fn partners(&self) -> impl Iterator<Item = (&str, &PartnerConfig)> {
        self.partners.iter().map(|(name, cfg)| (name.as_str(), cfg))
    }

    pub fn get(&self, name: &str) -> Option<&PartnerConfig> {
        self.partners
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cfg)| cfg)
    }

    /// Keep only the named partners. Names not present in the store are
    /// ignored; callers decide whether to warn about them.
    pub fn retain(&mut self, names: &[String]) {
        self.partners.retain(|(n, _)| names.iter().any(|m| m == n));
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

fn required_str<'a>(partner: &str, entry: &'a Value, field: &str) -> Result<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PipelineError::MissingField {
            partner: partner.to_string(),
            field: field.to_string(),
        })
}

fn parse_partner(name: &str, entry: &Value) -> Result<PartnerConfig> {
    let delimiter_raw = required_str(name, entry, "delimiter")?;
    let mut chars = delimiter_raw.chars();
    let delimiter = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => c as u8,
        _ => {
            return Err(PipelineError::Config(format!(
                "partner '{name}': delimiter must be a single ASCII character, got '{delimiter_raw}'"
            )))
        }
    };

    // Older partner documents used "file_path" for the same field.
    let source_location = entry
        .get("source_location")
        .or_else(|| entry.get("file_path"))
        .and_then(Value::as_str)
        .ok_or_else(|| PipelineError::MissingField {
            partner: name.to_string(),
            field: "source_location".to_string(),
        })?
        .to_string();

    let date_format = required_str(name, entry, "date_format")?.to_string();
    let chrono_format = translate_date_format(name, &date_format)?;
    let partner_code = required_str(name, entry, "partner_code")?.to_string();

    let raw_mappings = entry
        .get("mappings")
        .and_then(Value::as_object)
        .ok_or_else(|| PipelineError::MissingField {
            partner: name.to_string(),
            field: "mappings".to_string(),
        })?;
    let mut mappings = HashMap::with_capacity(raw_mappings.len());
    for (raw_col, canonical_col) in raw_mappings {
        let canonical_col = canonical_col.as_str().ok_or_else(|| {
            PipelineError::Config(format!(
                "partner '{name}': mapping for column '{raw_col}' must be a string"
            ))
        })?;
        mappings.insert(raw_col.clone(), canonical_col.to_string());
    }

    Ok(PartnerConfig {
        partner_code,
        delimiter,
        source_location,
        date_format,
        chrono_format,
        mappings,
    })
}

/// Translate a Java-style date pattern (`yyyy-MM-dd`, `MM/dd/yyyy`) into
/// chrono strftime syntax. A pattern token we cannot translate is a
/// configuration error for the partner, caught here at load time rather than
/// mid-pipeline.
fn translate_date_format(partner: &str, pattern: &str) -> Result<String> {
    let unsupported = || PipelineError::DateFormat {
        partner: partner.to_string(),
        pattern: pattern.to_string(),
    };

    let mut out = String::with_capacity(pattern.len());
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i] == c {
                i += 1;
            }
            out.push_str(match (c, i - start) {
                ('y', 4) => "%Y",
                ('y', 2) => "%y",
                ('M', 1 | 2) => "%m",
                ('d', 1 | 2) => "%d",
                _ => return Err(unsupported()),
            });
        } else {
            if c == '%' {
                out.push('%');
            }
            out.push(c);
            i += 1;
        }
    }
    if out.is_empty() {
        return Err(unsupported());
    }
    Ok(out)
}
