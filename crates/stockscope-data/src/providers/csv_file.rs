//! Local CSV price files.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use stockscope_core::error::ProviderError;
use stockscope_core::traits::DataProvider;
use stockscope_core::types::{DateRange, PriceSeries, Symbol};

use super::{finish_series, read_csv_points};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvFileConfig {
    /// Directory holding `<SYMBOL>.csv` files.
    pub dir: PathBuf,
    /// Name reported in logs and cache provenance.
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    "csv_file".to_string()
}

/// Reads daily history from `<dir>/<SYMBOL>.csv`.
///
/// Accepts `date,open,high,low,close,volume` headers in either case, rows in
/// any order.
#[derive(Debug)]
pub struct CsvFileProvider {
    dir: PathBuf,
    name: String,
}

impl CsvFileProvider {
    pub fn new(config: &CsvFileConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            name: config.name.clone(),
        }
    }
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    async fn fetch(&self, symbol: &Symbol, range: &DateRange) -> Result<PriceSeries, ProviderError> {
        let path = self.dir.join(format!("{}.csv", symbol));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProviderError::SymbolNotFound(format!(
                    "{} has no file at {}",
                    symbol,
                    path.display()
                )))
            }
            Err(e) => return Err(ProviderError::NetworkError(e.to_string())),
        };

        let points = read_csv_points(bytes.as_slice())?;
        finish_series(symbol, points, range)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
