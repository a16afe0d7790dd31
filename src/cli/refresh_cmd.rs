//! `beacon refresh` — re-audit rows and update their scores.
//!
//! Rows refresh concurrently with bounded parallelism; each row is an
//! independent operation, so one failure never blocks the others.

use crate::cli::output;
use crate::config::Config;
use crate::registry::types::Strategy;
use crate::roster::PageRoster;
use anyhow::Result;
use futures::stream::{self, StreamExt};

pub async fn run(ids: &[i64], all: bool, strategy: Strategy, concurrency: usize) -> Result<()> {
    let roster = PageRoster::new(&Config::from_env());
    roster.load_all().await?;

    let targets: Vec<i64> = if all {
        roster.snapshot().await.iter().map(|p| p.id).collect()
    } else {
        ids.to_vec()
    };
    if targets.is_empty() {
        anyhow::bail!("nothing to refresh: pass ids or --all");
    }

    let total = targets.len();
    let results: Vec<_> = stream::iter(targets)
        .map(|id| {
            let roster = &roster;
            async move { (id, roster.refresh(id, strategy).await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut rows = Vec::new();
    let mut failed = 0usize;
    for (id, outcome) in results {
        match outcome {
            Ok(record) => {
                if !output::is_quiet() && !output::is_json() {
                    println!("  #{id} {} → score {}", record.url, record.score);
                }
                rows.push(serde_json::json!({
                    "id": id,
                    "ok": true,
                    "score": record.score,
                    "date": record.date,
                }));
            }
            Err(e) => {
                failed += 1;
                if !output::is_quiet() && !output::is_json() {
                    eprintln!("  Error: #{id}: {e}");
                }
                rows.push(serde_json::json!({
                    "id": id,
                    "ok": false,
                    "error": e.to_string(),
                }));
            }
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "refreshed": rows,
            "failed": failed,
        }));
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {total} refreshes failed");
    }
    Ok(())
}
