use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::models::{
    CallRecord, CostPoint, DashboardMetrics, DateRange, DateSuccessRate, ScriptSuccessRate,
    RESULT_APPOINTMENT_BOOKED, RESULT_SUCCESS,
};

pub const UNKNOWN_SCRIPT: &str = "N/A";

/// Keeps records whose creation date falls inside the inclusive range.
pub fn filter_by_date_range(records: &[CallRecord], range: &DateRange) -> Vec<CallRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.created_date()))
        .cloned()
        .collect()
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

pub fn summarize(records: &[CallRecord]) -> DashboardMetrics {
    let total_calls = records.len() as u32;
    let total_duration: f64 = records.iter().map(CallRecord::duration_or_zero).sum();
    let total_cost: f64 = records.iter().map(CallRecord::cost_or_zero).sum();
    let successful_calls = records.iter().filter(|r| r.has_result(RESULT_SUCCESS)).count() as u32;
    let appointments_taken = records
        .iter()
        .filter(|r| r.has_result(RESULT_APPOINTMENT_BOOKED))
        .count() as u32;

    DashboardMetrics {
        total_calls,
        total_duration,
        total_cost,
        successful_calls,
        appointments_taken,
        average_cost_per_call: ratio(total_cost, total_calls as f64),
        average_cost_per_minute: ratio(total_cost, total_duration),
        average_duration_per_call: ratio(total_duration, total_calls as f64),
        cost_per_appointment: ratio(total_cost, appointments_taken as f64),
        success_rate: ratio(successful_calls as f64, total_calls as f64) * 100.0,
        cost_by_date: cost_by_date(records),
        success_rate_by_date: success_rate_by_date(records),
        success_rate_by_script: success_rate_by_script(records),
    }
}

pub fn cost_by_date(records: &[CallRecord]) -> Vec<CostPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *buckets.entry(record.created_date()).or_insert(0.0) += record.cost_or_zero();
    }
    buckets
        .into_iter()
        .map(|(date, cost)| CostPoint { date, cost })
        .collect()
}

pub fn success_rate_by_date(records: &[CallRecord]) -> Vec<DateSuccessRate> {
    let mut buckets: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for record in records {
        let bucket = buckets.entry(record.created_date()).or_insert((0, 0));
        bucket.0 += 1;
        if record.is_success() {
            bucket.1 += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(date, (total, successful))| DateSuccessRate {
            date,
            total,
            successful,
            success_rate: ratio(successful as f64, total as f64) * 100.0,
        })
        .collect()
}

/// Buckets keep the order in which each script first appears. Missing and
/// empty script ids share the `N/A` bucket.
pub fn success_rate_by_script(records: &[CallRecord]) -> Vec<ScriptSuccessRate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<ScriptSuccessRate> = Vec::new();

    for record in records {
        let script = record
            .script_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SCRIPT);
        let slot = *index.entry(script).or_insert_with(|| {
            series.push(ScriptSuccessRate {
                script: script.to_string(),
                ..Default::default()
            });
            series.len() - 1
        });
        let bucket = &mut series[slot];
        bucket.total += 1;
        if record.is_success() {
            bucket.successful += 1;
        }
    }

    for bucket in &mut series {
        bucket.success_rate = ratio(bucket.successful as f64, bucket.total as f64) * 100.0;
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::format::two_decimals;
    use chrono::{TimeZone, Utc};

    fn call(id: &str, ts: &str, cost: Option<f64>, duration: Option<f64>, result: Option<&str>) -> CallRecord {
        let created_at = chrono::DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc);
        let mut record = CallRecord::new(id, created_at);
        record.cost = cost;
        record.duration = duration;
        record.result = result.map(str::to_string);
        record
    }

    fn scripted(id: &str, script: Option<&str>, result: Option<&str>) -> CallRecord {
        let mut record = CallRecord::new(id, Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        record.script_id = script.map(str::to_string);
        record.result = result.map(str::to_string);
        record
    }

    fn sample() -> Vec<CallRecord> {
        vec![
            call("a", "2024-05-02T09:00:00Z", Some(1.5), Some(3.0), Some("success")),
            call("b", "2024-05-01T23:30:00Z", Some(0.5), Some(1.0), Some("appointment_booked")),
            call("c", "2024-05-02T18:45:00Z", None, None, Some("voicemail")),
            call("d", "2024-05-01T08:00:00Z", Some(2.0), Some(4.0), None),
        ]
    }

    #[test]
    fn empty_collection_yields_zeroes() {
        let metrics = summarize(&[]);
        assert_eq!(metrics, DashboardMetrics::default());
        assert_eq!(metrics.average_cost_per_minute, 0.0);
        assert!(!metrics.success_rate.is_nan());
    }

    #[test]
    fn scalar_metrics_match_definitions() {
        let records = sample();
        let m = summarize(&records);
        assert_eq!(m.total_calls, 4);
        assert_eq!(m.total_duration, 8.0);
        assert_eq!(m.total_cost, 4.0);
        assert_eq!(m.successful_calls, 1);
        assert_eq!(m.appointments_taken, 1);
        assert_eq!(m.average_cost_per_call, m.total_cost / m.total_calls as f64);
        assert_eq!(m.average_cost_per_minute, 0.5);
        assert_eq!(m.average_duration_per_call, 2.0);
        assert_eq!(m.cost_per_appointment, 4.0);
        assert_eq!(m.success_rate, 25.0);
    }

    #[test]
    fn zero_duration_and_no_appointments_do_not_divide() {
        let records = vec![call("x", "2024-05-01T10:00:00Z", Some(3.0), None, Some("success"))];
        let m = summarize(&records);
        assert_eq!(m.average_cost_per_minute, 0.0);
        assert_eq!(m.cost_per_appointment, 0.0);
        assert_eq!(m.success_rate, 100.0);
    }

    #[test]
    fn cost_by_date_sums_each_day_in_order() {
        let series = cost_by_date(&sample());
        let dates: Vec<String> = series.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-05-01", "2024-05-02"]);
        assert_eq!(series[0].cost, 2.5);
        assert_eq!(series[1].cost, 1.5);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn success_rate_by_date_counts_bookings_as_success() {
        let series = success_rate_by_date(&sample());
        assert_eq!(series.len(), 2);
        assert_eq!((series[0].total, series[0].successful), (2, 1));
        assert_eq!(series[0].success_rate, 50.0);
        assert_eq!((series[1].total, series[1].successful), (2, 1));
    }

    #[test]
    fn success_rate_by_script_groups_in_first_seen_order() {
        let records = vec![
            scripted("1", Some("intro-v2"), Some("success")),
            scripted("2", None, Some("no_answer")),
            scripted("3", Some("intro-v2"), Some("appointment_booked")),
            scripted("4", Some("intro-v2"), Some("busy")),
        ];
        let series = success_rate_by_script(&records);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].script, "intro-v2");
        assert_eq!(series[0].total, 3);
        assert_eq!(two_decimals(series[0].success_rate), "66.67");
        assert_eq!(series[1].script, UNKNOWN_SCRIPT);
        assert_eq!(series[1].success_rate, 0.0);
    }

    #[test]
    fn date_range_filter_includes_whole_end_day() {
        let records = sample();
        let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let only_first = filter_by_date_range(&records, &DateRange::new(None, Some(day("2024-05-01"))));
        let ids: Vec<&str> = only_first.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d"]);

        let from_second = filter_by_date_range(&records, &DateRange::new(Some(day("2024-05-02")), None));
        assert_eq!(from_second.len(), 2);
    }

    #[test]
    fn empty_script_id_joins_the_unknown_bucket() {
        let records: Vec<CallRecord> = serde_json::from_str(
            r#"[
                {"call_id": "1", "script_id": "", "result": "success", "created_at": "2024-05-01T09:00:00Z"},
                {"call_id": "2", "script_id": null, "result": "busy", "created_at": "2024-05-01T10:00:00Z"}
            ]"#,
        )
        .unwrap();
        let series = success_rate_by_script(&records);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].script, UNKNOWN_SCRIPT);
        assert_eq!((series[0].total, series[0].successful), (2, 1));
        assert_eq!(series[0].success_rate, 50.0);
    }
}
