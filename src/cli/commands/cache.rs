//! Cache maintenance commands.

use anyhow::Result;
use serde::Serialize;
use stockscope_config::AppConfig;
use stockscope_data::{FileSeriesStore, SeriesStore};
use tracing::info;

use crate::cli::output::{print_json, OutputFormat};
use crate::cli::CacheCommand;

#[derive(Serialize)]
struct CachedSymbol {
    symbol: String,
    first: Option<String>,
    last: Option<String>,
    points: usize,
    fetched_at: Option<String>,
    source: Option<String>,
}

pub async fn run(command: CacheCommand, config: &AppConfig) -> Result<()> {
    let store = FileSeriesStore::new(&config.data.cache_dir);

    match command {
        CacheCommand::List { output } => {
            let mut rows = Vec::new();
            for symbol in store.symbols().await? {
                let entry = store.get(&symbol).await;
                rows.push(CachedSymbol {
                    symbol: symbol.to_string(),
                    first: entry.as_ref().and_then(|e| e.series.first_date()).map(|d| d.to_string()),
                    last: entry.as_ref().and_then(|e| e.series.last_date()).map(|d| d.to_string()),
                    points: entry.as_ref().map_or(0, |e| e.series.len()),
                    fetched_at: entry.as_ref().map(|e| e.fetched_at.to_rfc3339()),
                    source: entry
                        .as_ref()
                        .map(|e| format!("{} ({})", e.source_used.provider, e.source_used.role)),
                });
            }

            match output {
                OutputFormat::Json => print_json(&rows)?,
                OutputFormat::Text => {
                    println!("Cache: {}", store.dir().display());
                    println!();
                    for r in &rows {
                        println!(
                            "{:<10} {:>6} points  {} .. {}  fetched {}  from {}",
                            r.symbol,
                            r.points,
                            r.first.as_deref().unwrap_or("-"),
                            r.last.as_deref().unwrap_or("-"),
                            r.fetched_at.as_deref().unwrap_or("unreadable"),
                            r.source.as_deref().unwrap_or("-"),
                        );
                    }
                    if rows.is_empty() {
                        println!("(empty)");
                    }
                }
            }
        }
        CacheCommand::Clear { symbols } => {
            let removed = if symbols.is_empty() {
                store.clear().await?
            } else {
                let mut removed = 0;
                for symbol in &symbols {
                    if store.remove(symbol).await? {
                        removed += 1;
                    }
                }
                removed
            };
            store.flush().await?;
            info!(removed, "Cleared cache entries");
            println!("Removed {} cache entries", removed);
        }
    }

    Ok(())
}
