//! `beacon register <url>...` — audit pages and add them to the registry.

use crate::cli::output;
use crate::config::Config;
use crate::registry::types::Strategy;
use crate::roster::PageRoster;
use anyhow::Result;

/// Register each URL in turn. One failure does not abort the rest; the
/// command exits nonzero if any registration failed.
pub async fn run(urls: &[String], name: Option<&str>, strategy: Strategy) -> Result<()> {
    let roster = PageRoster::new(&Config::from_env());

    let mut registered = Vec::new();
    let mut failed = 0usize;

    for raw in urls {
        match roster
            .register(name.map(str::to_string), raw, strategy)
            .await
        {
            Ok(record) => {
                if !output::is_quiet() && !output::is_json() {
                    println!(
                        "  Registered #{} {} (score {})",
                        record.id, record.url, record.score
                    );
                }
                registered.push(record);
            }
            Err(e) => {
                failed += 1;
                if !output::is_quiet() && !output::is_json() {
                    eprintln!("  Error: {raw}: {e}");
                }
            }
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "registered": registered,
            "failed": failed,
        }));
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} registrations failed", urls.len());
    }
    Ok(())
}
