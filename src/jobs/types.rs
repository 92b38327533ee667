use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::diff::FieldMap;
use super::safe_ref::SafeRefCodec;

/// Persisted field names, as the syncwatch CLI knows them.
pub mod fields {
    pub const NAME: &str = "name";
    pub const SAFESYNC: &str = "safesync";
    pub const ENABLED: &str = "enabled";
    pub const SOURCE: &str = "source";
    pub const DESTINATION: &str = "destination";
    pub const DELAY: &str = "delay";
    pub const RESETTIMER: &str = "resettimer";
    pub const INITSYNC: &str = "initsync";
    pub const REVERSESYNC: &str = "reversesync";
    pub const RETRY: &str = "retry";
    pub const DELETE: &str = "delete";
    pub const EXCLUDE: &str = "exclude";
    pub const INCLUDE: &str = "include";
    pub const COMPRESS: &str = "compress";
    pub const UPDATE: &str = "update";
    pub const OPTIONS: &str = "options";

    /// Comma-joined token fields.
    pub const TOKEN_FIELDS: [&str; 3] = [EXCLUDE, INCLUDE, OPTIONS];

    /// Identity and display-mode fields that never take part in a change set.
    pub const IDENTITY_FIELDS: [&str; 2] = [NAME, SAFESYNC];
}

pub const DELAY_MIN: u32 = 0;
pub const DELAY_MAX: u32 = 500;
pub const DEFAULT_DELAY: u32 = 10;

/// Full configuration of one sync job (`shw <name>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    #[serde(deserialize_with = "loose::boolean")]
    pub enabled: bool,
    #[serde(deserialize_with = "loose::text")]
    pub source: String,
    #[serde(deserialize_with = "loose::text")]
    pub destination: String,
    #[serde(deserialize_with = "loose::delay")]
    pub delay: u32,
    #[serde(deserialize_with = "loose::boolean")]
    pub resettimer: bool,
    #[serde(deserialize_with = "loose::boolean")]
    pub initsync: bool,
    #[serde(deserialize_with = "loose::boolean")]
    pub reversesync: bool,
    #[serde(deserialize_with = "loose::boolean")]
    pub retry: bool,
    #[serde(deserialize_with = "loose::boolean")]
    pub delete: bool,
    #[serde(with = "tokens")]
    pub exclude: Vec<String>,
    #[serde(with = "tokens")]
    pub include: Vec<String>,
    #[serde(deserialize_with = "loose::boolean")]
    pub compress: bool,
    #[serde(deserialize_with = "loose::boolean")]
    pub update: bool,
    #[serde(with = "tokens")]
    pub options: Vec<String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: String::new(),
            destination: String::new(),
            delay: DEFAULT_DELAY,
            resettimer: true,
            initsync: false,
            reversesync: false,
            retry: false,
            delete: true,
            exclude: Vec::new(),
            include: Vec::new(),
            compress: true,
            update: true,
            options: Vec::new(),
        }
    }
}

impl JobConfig {
    /// Wire representation: token fields comma-joined, as the CLI stores them.
    pub fn to_fields(&self) -> FieldMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => FieldMap::new(),
        }
    }
}

pub fn clamp_delay(delay: i64) -> u32 {
    delay.clamp(DELAY_MIN as i64, DELAY_MAX as i64) as u32
}

/// One row of the job list (CLI invoked without arguments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job: String,
    #[serde(default = "default_true", deserialize_with = "loose::boolean")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "loose::text")]
    pub source: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub destination: String,
    #[serde(default, deserialize_with = "loose::boolean")]
    pub reversesync: bool,
    #[serde(default = "default_true", deserialize_with = "loose::boolean")]
    pub delete: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowAction {
    Enable,
    Disable,
    Delete,
}

/// Table row as displayed: safe-eligible pairs show their share names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRow {
    pub job: String,
    pub enabled: bool,
    pub source: String,
    pub destination: String,
    pub reversesync: bool,
    pub delete: bool,
    pub safe: bool,
}

impl JobRow {
    pub fn from_summary(summary: &JobSummary, codec: &SafeRefCodec, storage_installed: bool) -> Self {
        let safe = codec.is_safe_eligible(&summary.source, &summary.destination, storage_installed);
        Self {
            job: summary.job.clone(),
            enabled: summary.enabled,
            source: codec.display_path(&summary.source, safe),
            destination: codec.display_path(&summary.destination, safe),
            reversesync: summary.reversesync,
            delete: summary.delete,
            safe,
        }
    }

    /// Actions offered in the row menu.
    pub fn actions(&self) -> Vec<RowAction> {
        let toggle = if self.enabled { RowAction::Disable } else { RowAction::Enable };
        vec![toggle, RowAction::Delete]
    }
}

/// The daemon's store re-parses its XML text, so scalars come back loosely typed.
mod loose {
    use super::*;

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f > 0.0),
            Value::String(s) => {
                let s = s.trim().to_ascii_lowercase();
                matches!(s.as_str(), "true" | "yes" | "1")
                    || s.parse::<f64>().is_ok_and(|f| f > 0.0)
            }
            _ => false,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn delay<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let raw = match Value::deserialize(d)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        Ok(raw.map(clamp_delay).unwrap_or(DEFAULT_DELAY))
    }
}

/// Token collections, comma-joined on the wire.
mod tokens {
    use super::*;
    use crate::jobs::diff::{join_tokens, normalize_value, split_tokens};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(tokens: &[String], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&join_tokens(tokens))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(split_tokens(&normalize_value(&value)))
    }
}
