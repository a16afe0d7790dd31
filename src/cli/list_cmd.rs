//! `beacon list` — show every registered page with its latest score.

use crate::cli::output;
use crate::config::Config;
use crate::roster::PageRoster;
use anyhow::Result;

pub async fn run() -> Result<()> {
    let roster = PageRoster::new(&Config::from_env());
    roster.load_all().await?;
    let pages = roster.snapshot().await;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "pages": pages }));
        return Ok(());
    }

    if pages.is_empty() {
        if !output::is_quiet() {
            println!("  No pages registered yet. Add one with `beacon register <url>`.");
        }
        return Ok(());
    }

    println!(
        "  {:<6} {:<20} {:<40} {:>5}  {:<25} {:<8}",
        "ID", "NAME", "URL", "SCORE", "DATE", "DEVICE"
    );
    for page in &pages {
        println!(
            "  {:<6} {:<20} {:<40} {:>5}  {:<25} {:<8}",
            page.id,
            page.name.as_deref().unwrap_or("-"),
            page.url,
            page.score,
            page.date.as_deref().unwrap_or("-"),
            page.strategy.as_str(),
        );
    }
    Ok(())
}
