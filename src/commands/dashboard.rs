use anyhow::Result;
use chrono::Utc;

use crate::cli::{DashboardArgs, OutputFormat};
use crate::commands::{shutdown_signal, AppContext};
use crate::models::{DashboardMetrics, DateRange, DisplaySettings};
use crate::services::record_store::{refresh, LiveCollection};
use crate::services::views::DashboardView;
use crate::utils::format::{fit, money, percent, two_decimals};

pub async fn run(ctx: &AppContext, args: DashboardArgs) -> Result<()> {
    let range = DateRange::new(args.from, args.to);
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            log::warn!("--from {} is after --to {}; nothing will match", start, end);
        }
    }

    let mut view = DashboardView::new(range);
    if !args.watch {
        refresh(ctx.source.as_ref(), &mut view).await;
        println!("{}", render(&view, &ctx.settings.display, args.format)?);
        return Ok(());
    }

    let mut feed = ctx.change_feed();
    let live = LiveCollection::new(ctx.source.clone());
    let display = &ctx.settings.display;
    live.run(&mut view, &mut feed, shutdown_signal(), |view| {
        match render(view, display, args.format) {
            Ok(out) => {
                if args.format == OutputFormat::Text {
                    println!("── {} ──", Utc::now().with_timezone(&ctx.timezone).format("%H:%M:%S"));
                }
                println!("{}", out);
            }
            Err(e) => log::error!("Could not render dashboard: {}", e),
        }
    })
    .await;
    Ok(())
}

pub fn render(view: &DashboardView, display: &DisplaySettings, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            if view.is_loading() {
                return Ok(serde_json::json!({ "loading": true }).to_string());
            }
            Ok(serde_json::to_string_pretty(&view.metrics())?)
        }
        OutputFormat::Text => {
            if view.is_loading() {
                return Ok("Loading dashboard...".to_string());
            }
            Ok(render_text(&view.metrics(), &view.range(), display))
        }
    }
}

fn range_label(range: &DateRange) -> String {
    let bound = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "…".to_string());
    if range.is_unbounded() {
        "all dates".to_string()
    } else {
        format!("{} → {}", bound(range.start), bound(range.end))
    }
}

pub fn render_text(metrics: &DashboardMetrics, range: &DateRange, display: &DisplaySettings) -> String {
    let currency = display.currency_symbol.as_str();
    let metric = |label: &str, value: String| format!("  {}{:>16}", fit(label, 28), value);

    let mut lines = vec![format!("Dashboard ({})", range_label(range)), String::new()];
    lines.push(metric("Total cost", money(metrics.total_cost, currency)));
    lines.push(metric("Average cost per call", money(metrics.average_cost_per_call, currency)));
    lines.push(metric(
        "Average cost per minute",
        money(metrics.average_cost_per_minute, currency),
    ));
    lines.push(metric(
        "Reference tariff per minute",
        money(display.reference_cost_per_minute, currency),
    ));
    lines.push(metric(
        "Average duration per call",
        format!("{} min", two_decimals(metrics.average_duration_per_call)),
    ));
    lines.push(metric(
        "Total call duration",
        format!("{} min", two_decimals(metrics.total_duration)),
    ));
    lines.push(metric("Number of calls", metrics.total_calls.to_string()));
    lines.push(metric("Appointments booked", metrics.appointments_taken.to_string()));
    lines.push(metric("Cost per appointment", money(metrics.cost_per_appointment, currency)));
    lines.push(metric("Overall success rate", percent(metrics.success_rate)));

    lines.push(String::new());
    lines.push("Cost by date".to_string());
    if metrics.cost_by_date.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for point in &metrics.cost_by_date {
        lines.push(format!("  {}{:>16}", fit(&point.date.to_string(), 28), money(point.cost, currency)));
    }

    lines.push(String::new());
    lines.push("Success rate by date".to_string());
    if metrics.success_rate_by_date.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for point in &metrics.success_rate_by_date {
        lines.push(format!(
            "  {}{:>16}  ({}/{})",
            fit(&point.date.to_string(), 28),
            percent(point.success_rate),
            point.successful,
            point.total
        ));
    }

    lines.push(String::new());
    lines.push("Success rate by script".to_string());
    if metrics.success_rate_by_script.is_empty() {
        lines.push("  (no data)".to_string());
    }
    for point in &metrics.success_rate_by_script {
        lines.push(format!(
            "  {}{:>16}  ({}/{})",
            fit(&point.script, 28),
            percent(point.success_rate),
            point.successful,
            point.total
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallRecord;
    use crate::services::views::RecordView;
    use chrono::{NaiveDate, TimeZone};

    fn view_with_calls() -> DashboardView {
        let mut view = DashboardView::default();
        let mut records = Vec::new();
        for (i, result) in ["success", "appointment_booked", "no_answer"].iter().enumerate() {
            let mut r = CallRecord::new(format!("c{}", i), Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
            r.script_id = Some("intro".into());
            r.result = Some(result.to_string());
            r.cost = Some(1.0);
            r.duration = Some(2.0);
            records.push(r);
        }
        view.replace_records(records);
        view
    }

    #[test]
    fn text_dashboard_shows_metrics_and_series() {
        let view = view_with_calls();
        let out = render(&view, &DisplaySettings::default(), OutputFormat::Text).unwrap();
        assert!(out.starts_with("Dashboard (all dates)"));
        assert!(out.contains("3.00 €"));
        assert!(out.contains("33.33%"));
        assert!(out.contains("66.67%  (2/3)"));
        assert!(out.contains("2024-05-01"));
    }

    #[test]
    fn loading_state_hides_metrics() {
        let mut view = view_with_calls();
        view.set_loading(true);
        let out = render(&view, &DisplaySettings::default(), OutputFormat::Text).unwrap();
        assert_eq!(out, "Loading dashboard...");
    }

    #[test]
    fn json_dashboard_is_machine_readable() {
        let view = view_with_calls();
        let out = render(&view, &DisplaySettings::default(), OutputFormat::Json).unwrap();
        let parsed: DashboardMetrics = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.total_calls, 3);
        assert_eq!(parsed.success_rate_by_script[0].script, "intro");
    }

    #[test]
    fn empty_dashboard_renders_zeroes() {
        let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 1), None);
        let out = render_text(&DashboardMetrics::default(), &range, &DisplaySettings::default());
        assert!(out.starts_with("Dashboard (2024-01-01 → …)"));
        assert!(out.contains("0.00%"));
        assert!(out.contains("(no data)"));
    }
}
