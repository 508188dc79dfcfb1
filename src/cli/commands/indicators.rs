//! Indicator computation command.

use anyhow::Result;
use stockscope_config::AppConfig;
use tracing::info;

use crate::cli::output::{fmt_value, print_json, OutputFormat};
use crate::cli::IndicatorsArgs;

pub async fn run(args: IndicatorsArgs, config: &AppConfig) -> Result<()> {
    let range = args.range.resolve()?;
    info!(symbol = %args.symbol, %range, "Computing indicators");

    let engine = super::engine(config).await?;
    let set = engine
        .get_indicators(&args.symbol, &range, &args.indicators)
        .await;
    engine.close().await?;
    let set = set?;

    let skip = args.tail.map_or(0, |n| set.len().saturating_sub(n));

    match args.output {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = (skip..set.len())
                .map(|i| {
                    let mut row = serde_json::Map::new();
                    row.insert("date".into(), serde_json::json!(set.dates()[i]));
                    for (name, values) in set.columns() {
                        row.insert(name.clone(), serde_json::json!(values[i]));
                    }
                    serde_json::Value::Object(row)
                })
                .collect();
            print_json(&rows)?;
        }
        OutputFormat::Text => {
            let names: Vec<&str> = set.names().collect();
            print!("{:<12}", "Date");
            for name in &names {
                print!(" {:>16}", name);
            }
            println!();

            for i in skip..set.len() {
                print!("{:<12}", set.dates()[i].to_string());
                for name in &names {
                    print!(" {:>16}", fmt_value(set.value(name, i)));
                }
                println!();
            }
        }
    }

    Ok(())
}
