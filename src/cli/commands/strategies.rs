//! List strategies command.

use anyhow::Result;
use stockscope_strategies::StrategyRegistry;

use crate::cli::output::{print_json, OutputFormat};
use crate::cli::StrategiesArgs;

pub fn run(args: StrategiesArgs) -> Result<()> {
    let registry = StrategyRegistry::new();

    if args.output == OutputFormat::Json {
        return print_json(&registry.list());
    }

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ", info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!("  defaults: {}", info.default_config);
        println!();
    }

    println!("Use `signals <SYMBOL> --strategy <name> [--params '<json>']` to evaluate one.");

    Ok(())
}
