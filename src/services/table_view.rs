use std::cmp::Ordering;

use crate::models::{CallRecord, SortConfig, SortDirection, SortKey};

fn compare_text(a: &Option<String>, b: &Option<String>) -> Ordering {
    a.as_deref().cmp(&b.as_deref())
}

fn compare_number(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Natural ordering of the column behind `key`, ascending. Absent values sort first.
pub fn compare_by(key: SortKey, a: &CallRecord, b: &CallRecord) -> Ordering {
    match key {
        SortKey::CallId => a.call_id.cmp(&b.call_id),
        SortKey::Duration => compare_number(a.duration, b.duration),
        SortKey::Cost => compare_number(a.cost, b.cost),
        SortKey::AssistantName => compare_text(&a.assistant_name, &b.assistant_name),
        SortKey::ScriptId => compare_text(&a.script_id, &b.script_id),
        SortKey::Result => compare_text(&a.result, &b.result),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Stable sort; rows with equal keys keep their fetch order in both directions.
pub fn sort_records(records: &[CallRecord], config: &SortConfig) -> Vec<CallRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_by(config.key, a, b);
        match config.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

pub fn matches_search(record: &CallRecord, needle_lower: &str) -> bool {
    record
        .searchable_values()
        .iter()
        .any(|value| value.to_lowercase().contains(needle_lower))
}

pub fn filter_records(records: Vec<CallRecord>, search: &str) -> Vec<CallRecord> {
    if search.is_empty() {
        return records;
    }
    let needle = search.to_lowercase();
    records
        .into_iter()
        .filter(|record| matches_search(record, &needle))
        .collect()
}

/// Rows as displayed: sorted first, then filtered.
pub fn visible_rows(records: &[CallRecord], config: &SortConfig, search: &str) -> Vec<CallRecord> {
    filter_records(sort_records(records, config), search)
}
