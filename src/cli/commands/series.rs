//! Price series command.

use anyhow::Result;
use stockscope_config::AppConfig;
use tracing::info;

use crate::cli::output::{print_json, OutputFormat};
use crate::cli::SeriesArgs;

pub async fn run(args: SeriesArgs, config: &AppConfig) -> Result<()> {
    let range = args.range.resolve()?;
    info!(symbol = %args.symbol, %range, "Fetching price series");

    let engine = super::engine(config).await?;
    let series = engine.get_series(&args.symbol, &range).await;
    engine.close().await?;
    let series = series?;

    match args.output {
        OutputFormat::Json => print_json(&series)?,
        OutputFormat::Text => {
            println!("{} ({} points, {})", series.symbol(), series.len(), range);
            println!();
            println!(
                "{:<12} {:>10} {:>10} {:>10} {:>10} {:>14}",
                "Date", "Open", "High", "Low", "Close", "Volume"
            );
            for p in series.iter() {
                println!(
                    "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14.0}",
                    p.date.to_string(),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                    p.volume
                );
            }
        }
    }

    Ok(())
}
