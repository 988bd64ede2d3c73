use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const RESULT_SUCCESS: &str = "success";
pub const RESULT_APPOINTMENT_BOOKED: &str = "appointment_booked";

/// One row of the `transcriptions` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallRecord {
    pub call_id: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub assistant_name: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub script_id: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Remaining columns of the row (transcript, summary, ...), kept for search.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CallRecord {
    pub fn new(call_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            call_id: call_id.into(),
            duration: None,
            cost: None,
            assistant_name: None,
            script_id: None,
            result: None,
            created_at,
            extra: BTreeMap::new(),
        }
    }

    pub fn duration_or_zero(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    pub fn cost_or_zero(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }

    pub fn has_result(&self, expected: &str) -> bool {
        self.result.as_deref() == Some(expected)
    }

    /// A call counts as successful when it ended in `success` or a booked appointment.
    pub fn is_success(&self) -> bool {
        self.has_result(RESULT_SUCCESS) || self.has_result(RESULT_APPOINTMENT_BOOKED)
    }

    /// Calendar date (UTC) used as the bucket key for date series.
    pub fn created_date(&self) -> chrono::NaiveDate {
        self.created_at.date_naive()
    }

    /// String forms of every present field, in column order. Absent and null
    /// values are left out.
    pub fn searchable_values(&self) -> Vec<String> {
        let mut values = Vec::with_capacity(7 + self.extra.len());
        values.push(self.call_id.clone());
        if let Some(duration) = self.duration {
            values.push(duration.to_string());
        }
        if let Some(cost) = self.cost {
            values.push(cost.to_string());
        }
        if let Some(name) = &self.assistant_name {
            values.push(name.clone());
        }
        if let Some(script) = &self.script_id {
            values.push(script.clone());
        }
        if let Some(result) = &self.result {
            values.push(result.clone());
        }
        values.push(self.created_at.to_rfc3339());
        for value in self.extra.values() {
            match value {
                Value::Null => {}
                Value::String(s) => values.push(s.clone()),
                other => values.push(other.to_string()),
            }
        }
        values
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parses `timestamptz` output (RFC 3339) as well as offset-less `timestamp`
/// values, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    // Postgres renders "+00" offsets without minutes.
    if let Ok(ts) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(format!("invalid created_at timestamp: {}", raw))
}
