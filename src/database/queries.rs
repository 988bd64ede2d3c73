use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};

use crate::error::{FetchError, FetchResult};
use crate::models::{parse_timestamp, CallRecord, FetchOrder, RecordQuery};
use crate::services::record_store::RecordSource;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn get_transcriptions(conn: &Connection, query: &RecordQuery) -> FetchResult<Vec<CallRecord>> {
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(start) = query.range.start {
        params.push(start.format("%Y-%m-%d").to_string());
        conditions.push(format!("created_at >= ?{}", params.len()));
    }
    if let Some(end) = query.range.exclusive_end() {
        params.push(end.format("%Y-%m-%d").to_string());
        conditions.push(format!("created_at < ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let direction = match query.order {
        FetchOrder::Ascending => "ASC",
        FetchOrder::Descending => "DESC",
    };

    let sql = format!(
        "SELECT call_id, duration, cost, assistant_name, script_id, result, created_at, extra
         FROM transcriptions
         {}
         ORDER BY created_at {}",
        where_clause, direction
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<f64>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, Option<String>>(7)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for (call_id, duration, cost, assistant_name, script_id, result, created_at, extra) in rows {
        let created_at = parse_timestamp(&created_at).map_err(FetchError::Decode)?;
        let extra = match extra {
            Some(json) if !json.trim().is_empty() => serde_json::from_str(&json)?,
            _ => Default::default(),
        };
        records.push(CallRecord {
            call_id,
            duration,
            cost,
            assistant_name,
            script_id,
            result,
            created_at,
            extra,
        });
    }

    Ok(records)
}

/// Upserts by `call_id`, so re-importing a snapshot refreshes changed rows.
pub fn upsert_transcription(conn: &Connection, record: &CallRecord) -> FetchResult<()> {
    let extra = if record.extra.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&record.extra)?)
    };

    conn.execute(
        "INSERT INTO transcriptions
         (call_id, duration, cost, assistant_name, script_id, result, created_at, extra)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(call_id) DO UPDATE SET
             duration = excluded.duration,
             cost = excluded.cost,
             assistant_name = excluded.assistant_name,
             script_id = excluded.script_id,
             result = excluded.result,
             created_at = excluded.created_at,
             extra = excluded.extra",
        rusqlite::params![
            &record.call_id,
            record.duration,
            record.cost,
            &record.assistant_name,
            &record.script_id,
            &record.result,
            record.created_at.format(TIMESTAMP_FORMAT).to_string(),
            extra,
        ],
    )?;

    Ok(())
}

/// Reads transcriptions from a local SQLite file, e.g. a snapshot of the hosted table.
/// The file is opened read-only and never created.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn fetch(&self, query: &RecordQuery) -> FetchResult<Vec<CallRecord>> {
        let path = self.path.clone();
        let query = *query;
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            get_transcriptions(&conn, &query)
        })
        .await
        .map_err(|e| FetchError::Database(format!("fetch task failed: {}", e)))?
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateRange;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn seeded() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.db");
        let conn = crate::database::init_database(&path).unwrap();

        let days = [(1, 9), (2, 23), (3, 0), (4, 12)];
        for (i, (day, hour)) in days.iter().enumerate() {
            let mut record = CallRecord::new(
                format!("call-{}", i),
                Utc.with_ymd_and_hms(2024, 5, *day, *hour, 30, 0).unwrap(),
            );
            record.cost = Some(i as f64);
            record.script_id = Some("s1".to_string());
            if i == 0 {
                record.extra.insert("transcript".into(), serde_json::json!("allo"));
            }
            upsert_transcription(&conn, &record).unwrap();
        }
        (dir, path)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn reads_rows_in_requested_order() {
        let (_dir, path) = seeded();
        let conn = Connection::open(&path).unwrap();

        let asc = get_transcriptions(&conn, &RecordQuery::all()).unwrap();
        let ids: Vec<&str> = asc.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["call-0", "call-1", "call-2", "call-3"]);
        assert_eq!(asc[0].extra.get("transcript"), Some(&serde_json::json!("allo")));

        let desc = get_transcriptions(&conn, &RecordQuery::newest_first()).unwrap();
        assert_eq!(desc[0].call_id, "call-3");
    }

    #[test]
    fn range_includes_the_whole_end_day() {
        let (_dir, path) = seeded();
        let conn = Connection::open(&path).unwrap();
        let query = RecordQuery::dashboard(DateRange::new(Some(day(2)), Some(day(3))));
        let rows = get_transcriptions(&conn, &query).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["call-1", "call-2"]);
    }

    #[test]
    fn upsert_replaces_existing_row() {
        let (_dir, path) = seeded();
        let conn = Connection::open(&path).unwrap();
        let mut rows = get_transcriptions(&conn, &RecordQuery::all()).unwrap();
        let mut first = rows.remove(0);
        first.result = Some("success".to_string());
        upsert_transcription(&conn, &first).unwrap();

        let rows = get_transcriptions(&conn, &RecordQuery::all()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].result.as_deref(), Some("success"));
    }

    #[tokio::test]
    async fn source_fetches_off_the_async_runtime() {
        let (_dir, path) = seeded();
        let source = SqliteSource::new(&path);
        let rows = source.fetch(&RecordQuery::all()).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert!(source.describe().starts_with("sqlite:"));
    }

    #[tokio::test]
    async fn missing_table_is_a_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path).unwrap();
        let err = SqliteSource::new(&path).fetch(&RecordQuery::all()).await.unwrap_err();
        assert!(matches!(err, FetchError::Database(_)));
    }

    #[tokio::test]
    async fn missing_file_is_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");
        let err = SqliteSource::new(&path).fetch(&RecordQuery::all()).await.unwrap_err();
        assert!(matches!(err, FetchError::Database(_)));
        assert!(!path.exists());
    }
}
