use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;

use crate::cli::{CallsArgs, OutputFormat};
use crate::commands::{shutdown_signal, AppContext};
use crate::models::{CallRecord, DisplaySettings, SortKey};
use crate::services::record_store::{refresh, LiveCollection};
use crate::services::views::CallsView;
use crate::utils::format::{call_link, fit, local_timestamp, optional_number, optional_text};

const COLUMN_WIDTHS: [(SortKey, usize); 7] = [
    (SortKey::CallId, 38),
    (SortKey::Duration, 16),
    (SortKey::Cost, 10),
    (SortKey::AssistantName, 18),
    (SortKey::ScriptId, 14),
    (SortKey::Result, 20),
    (SortKey::CreatedAt, 21),
];

/// Replays each `--sort` from the initial state and takes the search text as typed.
fn initial_view(args: &CallsArgs) -> CallsView {
    let mut view = CallsView::default();
    for key in &args.sort {
        view.request_sort(*key);
    }
    view.set_search(args.search.as_str());
    view
}

pub async fn run(ctx: &AppContext, args: CallsArgs) -> Result<()> {
    let mut view = initial_view(&args);
    log::info!(
        "Sorting calls by {} ({:?})",
        view.sort().key.column_name(),
        view.sort().direction
    );

    if !args.watch {
        refresh(ctx.source.as_ref(), &mut view).await;
        println!("{}", render(&view, &ctx.settings.display, &ctx.timezone, args.format)?);
        return Ok(());
    }

    let mut feed = ctx.change_feed();
    let live = LiveCollection::new(ctx.source.clone());
    let display = &ctx.settings.display;
    live.run(&mut view, &mut feed, shutdown_signal(), |view| {
        match render(view, display, &ctx.timezone, args.format) {
            Ok(out) => {
                if args.format == OutputFormat::Text {
                    println!("── {} ──", Utc::now().with_timezone(&ctx.timezone).format("%H:%M:%S"));
                }
                println!("{}", out);
            }
            Err(e) => log::error!("Could not render calls: {}", e),
        }
    })
    .await;
    Ok(())
}

pub fn render(view: &CallsView, display: &DisplaySettings, tz: &Tz, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            if view.is_loading() {
                return Ok(serde_json::json!({ "loading": true }).to_string());
            }
            Ok(serde_json::to_string_pretty(&view.rows())?)
        }
        OutputFormat::Text => {
            if view.is_loading() {
                return Ok("Loading calls...".to_string());
            }
            Ok(render_table(view, display, tz))
        }
    }
}

fn cell(record: &CallRecord, key: SortKey, tz: &Tz) -> String {
    match key {
        SortKey::CallId => record.call_id.clone(),
        SortKey::Duration => optional_number(record.duration),
        SortKey::Cost => optional_number(record.cost),
        SortKey::AssistantName => optional_text(record.assistant_name.as_deref()),
        SortKey::ScriptId => optional_text(record.script_id.as_deref()),
        SortKey::Result => optional_text(record.result.as_deref()),
        SortKey::CreatedAt => local_timestamp(&record.created_at, tz),
    }
}

fn header_label(key: SortKey, display: &DisplaySettings) -> String {
    match key {
        SortKey::Cost => format!("Cost ({})", display.currency_symbol),
        other => other.header().to_string(),
    }
}

pub fn render_table(view: &CallsView, display: &DisplaySettings, tz: &Tz) -> String {
    let rows = view.rows();
    let sort = view.sort();

    let mut title = format!("Calls ({} of {})", rows.len(), view.records().len());
    if !view.search().is_empty() {
        title.push_str(&format!("  search: \"{}\"", view.search()));
    }

    let header: String = COLUMN_WIDTHS
        .iter()
        .map(|(key, width)| fit(&format!("{}{}", header_label(*key, display), sort.indicator(*key)), *width))
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = vec![title, String::new(), format!("{} Link", header)];

    if rows.is_empty() {
        lines.push("No calls found.".to_string());
        return lines.join("\n");
    }

    for record in &rows {
        let cells: String = COLUMN_WIDTHS
            .iter()
            .map(|(key, width)| fit(&cell(record, *key, tz), *width))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("{} {}", cells, call_link(&display.call_link_base, &record.call_id)));
    }

    lines.join("\n")
}
