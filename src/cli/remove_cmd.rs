//! `beacon remove <id>...` — delete pages from the registry and roster.

use crate::cli::output;
use crate::config::Config;
use crate::roster::PageRoster;
use anyhow::Result;

pub async fn run(ids: &[i64]) -> Result<()> {
    let roster = PageRoster::new(&Config::from_env());
    roster.load_all().await?;

    let mut removed = Vec::new();
    let mut failed = 0usize;

    for &id in ids {
        match roster.remove(id).await {
            Ok(()) => {
                if !output::is_quiet() && !output::is_json() {
                    println!("  Removed #{id}");
                }
                removed.push(id);
            }
            Err(e) => {
                failed += 1;
                if !output::is_quiet() && !output::is_json() {
                    eprintln!("  Error: #{id}: {e}");
                }
            }
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "removed": removed,
            "failed": failed,
        }));
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} removals failed", ids.len());
    }
    Ok(())
}
