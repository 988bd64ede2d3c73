use crate::error::FetchResult;
use crate::models::{CallRecord, DashboardMetrics, DateRange, RecordQuery, SortConfig, SortKey};
use crate::services::{aggregation, table_view};

/// State a screen keeps about the fetched collection.
pub trait RecordView {
    fn query(&self) -> RecordQuery;
    fn set_loading(&mut self, loading: bool);
    fn replace_records(&mut self, records: Vec<CallRecord>);

    /// Failed fetches are logged and leave the current rows untouched.
    fn apply_fetch(&mut self, result: FetchResult<Vec<CallRecord>>) {
        match result {
            Ok(records) => {
                log::debug!("Fetched {} transcriptions", records.len());
                self.replace_records(records);
            }
            Err(e) => log::error!("Error fetching transcriptions: {}", e),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    records: Vec<CallRecord>,
    loading: bool,
    range: DateRange,
}

impl DashboardView {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            ..Default::default()
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Returns true when the window changed and a refetch is due.
    pub fn set_range(&mut self, range: DateRange) -> bool {
        let changed = self.range != range;
        self.range = range;
        changed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn metrics(&self) -> DashboardMetrics {
        if self.range.is_unbounded() {
            return aggregation::summarize(&self.records);
        }
        aggregation::summarize(&aggregation::filter_by_date_range(&self.records, &self.range))
    }
}

impl RecordView for DashboardView {
    fn query(&self) -> RecordQuery {
        RecordQuery::dashboard(self.range)
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn replace_records(&mut self, records: Vec<CallRecord>) {
        self.records = records;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallsView {
    records: Vec<CallRecord>,
    loading: bool,
    sort: SortConfig,
    search: String,
}

impl CallsView {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn request_sort(&mut self, key: SortKey) {
        self.sort = self.sort.request_sort(key);
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn rows(&self) -> Vec<CallRecord> {
        table_view::visible_rows(&self.records, &self.sort, &self.search)
    }
}

impl RecordView for CallsView {
    fn query(&self) -> RecordQuery {
        RecordQuery::newest_first()
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn replace_records(&mut self, records: Vec<CallRecord>) {
        self.records = records;
    }
}
