//! Output helpers shared by the commands.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format an optional value, `-` when undefined.
pub fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_value() {
        assert_eq!(fmt_value(Some(12.346)), "12.35");
        assert_eq!(fmt_value(Some(7.0)), "7.00");
        assert_eq!(fmt_value(None), "-");
    }
}
