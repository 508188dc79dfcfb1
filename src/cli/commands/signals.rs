//! Strategy signals command.

use anyhow::{Context, Result};
use stockscope_config::AppConfig;
use stockscope_core::types::SignalAction;
use tracing::info;

use crate::cli::output::{fmt_value, print_json, OutputFormat};
use crate::cli::SignalsArgs;

fn load_params(args: &SignalsArgs) -> Result<serde_json::Value> {
    let raw = match (&args.params, &args.params_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => return Ok(serde_json::Value::Null),
    };
    serde_json::from_str(&raw).context("Strategy parameters are not valid JSON")
}

pub async fn run(args: SignalsArgs, config: &AppConfig) -> Result<()> {
    let range = args.range.resolve()?;
    let params = load_params(&args)?;
    info!(symbol = %args.symbol, strategy = %args.strategy, %range, "Evaluating strategy");

    let engine = super::engine(config).await?;
    let signals = engine
        .get_signals(&args.symbol, &range, &args.strategy, params)
        .await;
    engine.close().await?;
    let signals = signals?;

    let shown: Vec<_> = signals
        .iter()
        .filter(|s| args.all || s.is_actionable())
        .collect();

    match args.output {
        OutputFormat::Json => print_json(&shown)?,
        OutputFormat::Text => {
            let count = |action: SignalAction| signals.iter().filter(|s| s.action == action).count();
            println!(
                "{} / {}: {} BUY, {} SELL over {} days",
                args.symbol,
                args.strategy,
                count(SignalAction::Buy),
                count(SignalAction::Sell),
                signals.len()
            );
            println!();
            for s in shown {
                println!(
                    "{:<12} {:<5} {:>6}",
                    s.date.to_string(),
                    s.action.to_string(),
                    fmt_value(s.strength)
                );
            }
        }
    }

    Ok(())
}
