use anyhow::{Context, Result};

use crate::cli::SnapshotArgs;
use crate::commands::AppContext;
use crate::database::{self, queries};
use crate::models::RecordQuery;

pub async fn run(ctx: &AppContext, args: SnapshotArgs) -> Result<()> {
    let records = ctx
        .source
        .fetch(&RecordQuery::all())
        .await
        .with_context(|| format!("fetching transcriptions from {}", ctx.source.describe()))?;

    let output = args.output.clone();
    let count = tokio::task::spawn_blocking(move || -> Result<usize> {
        let mut conn = database::init_database(&output)?;
        let tx = conn.transaction()?;
        for record in &records {
            queries::upsert_transcription(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    })
    .await
    .context("snapshot writer task failed")??;

    log::info!("Wrote {} transcriptions to {}", count, args.output.display());
    println!("{} calls saved to {}", count, args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteSource;
    use crate::models::{CallRecord, Settings};
    use crate::services::record_store::RecordSource;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn copies_every_row_into_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source.db");
        {
            let conn = database::init_database(&source_path).unwrap();
            for i in 0..3 {
                let mut r = CallRecord::new(format!("c{}", i), Utc.with_ymd_and_hms(2024, 5, 1, i, 0, 0).unwrap());
                r.cost = Some(0.25);
                queries::upsert_transcription(&conn, &r).unwrap();
            }
        }

        let ctx = AppContext::from_settings(Settings::default(), Some(&source_path)).unwrap();
        let target = dir.path().join("copy.db");
        run(&ctx, SnapshotArgs { output: target.clone() }).await.unwrap();

        let copied = SqliteSource::new(&target).fetch(&RecordQuery::all()).await.unwrap();
        assert_eq!(copied.len(), 3);
        assert_eq!(copied[2].call_id, "c2");
    }
}
