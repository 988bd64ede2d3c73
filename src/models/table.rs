use serde::{Deserialize, Serialize};

/// Columns of the calls table that can be sorted on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SortKey {
    CallId,
    Duration,
    Cost,
    AssistantName,
    ScriptId,
    Result,
    CreatedAt,
}

impl SortKey {
    pub fn column_name(&self) -> &'static str {
        match self {
            SortKey::CallId => "call_id",
            SortKey::Duration => "duration",
            SortKey::Cost => "cost",
            SortKey::AssistantName => "assistant_name",
            SortKey::ScriptId => "script_id",
            SortKey::Result => "result",
            SortKey::CreatedAt => "created_at",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            SortKey::CallId => "Call ID",
            SortKey::Duration => "Duration (min)",
            SortKey::Cost => "Cost",
            SortKey::AssistantName => "Assistant",
            SortKey::ScriptId => "Script ID",
            SortKey::Result => "Result",
            SortKey::CreatedAt => "Date",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Descending,
        }
    }
}

impl SortConfig {
    /// Clicking the active ascending column flips it; anything else starts ascending.
    pub fn request_sort(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self { key, direction }
    }

    pub fn indicator(&self, key: SortKey) -> &'static str {
        if self.key != key {
            return "";
        }
        match self.direction {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_newest_first() {
        let config = SortConfig::default();
        assert_eq!(config.key, SortKey::CreatedAt);
        assert_eq!(config.direction, SortDirection::Descending);
    }

    #[test]
    fn request_sort_toggles_and_resets() {
        let config = SortConfig::default().request_sort(SortKey::Cost);
        assert_eq!(config.direction, SortDirection::Ascending);

        let config = config.request_sort(SortKey::Cost);
        assert_eq!(config.direction, SortDirection::Descending);

        // Descending goes back to ascending on the same key.
        let config = config.request_sort(SortKey::Cost);
        assert_eq!(config.direction, SortDirection::Ascending);

        let config = config.request_sort(SortKey::Duration);
        assert_eq!(config.key, SortKey::Duration);
        assert_eq!(config.direction, SortDirection::Ascending);
    }

    #[test]
    fn created_at_descending_reselect_goes_ascending() {
        let config = SortConfig::default().request_sort(SortKey::CreatedAt);
        assert_eq!(config.direction, SortDirection::Ascending);
    }

    #[test]
    fn indicator_only_marks_active_column() {
        let config = SortConfig::default();
        assert_eq!(config.indicator(SortKey::CreatedAt), " ▼");
        assert_eq!(config.indicator(SortKey::Cost), "");
        assert_eq!(config.request_sort(SortKey::Cost).indicator(SortKey::Cost), " ▲");
    }
}
