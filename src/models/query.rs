use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-date window. Either bound may be open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// First day after the window; the end date covers its whole day.
    pub fn exclusive_end(&self) -> Option<NaiveDate> {
        self.end.map(|end| end + Duration::days(1))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RecordQuery {
    pub range: DateRange,
    pub order: FetchOrder,
}

impl RecordQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn dashboard(range: DateRange) -> Self {
        Self {
            range,
            order: FetchOrder::Ascending,
        }
    }

    pub fn newest_first() -> Self {
        Self {
            range: DateRange::default(),
            order: FetchOrder::Descending,
        }
    }
}
