//! Remote and local sources of daily price history.

mod alpha_vantage;
mod csv_file;
mod yahoo;

pub use alpha_vantage::{AlphaVantageConfig, AlphaVantageProvider};
pub use csv_file::{CsvFileConfig, CsvFileProvider};
pub use yahoo::{YahooConfig, YahooProvider};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use stockscope_core::error::{DataError, ProviderError};
use stockscope_core::traits::DataProvider;
use stockscope_core::types::{DateRange, PricePoint, PriceSeries, Symbol};

use crate::clock::Clock;

/// Provider selection as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    AlphaVantage(AlphaVantageConfig),
    Yahoo(YahooConfig),
    CsvFile(CsvFileConfig),
}

impl ProviderConfig {
    /// Alpha Vantage first, Yahoo as fallback.
    pub fn default_chain() -> Vec<ProviderConfig> {
        vec![
            ProviderConfig::AlphaVantage(AlphaVantageConfig::default()),
            ProviderConfig::Yahoo(YahooConfig::default()),
        ]
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProviderConfig::AlphaVantage(_) => "alpha_vantage",
            ProviderConfig::Yahoo(_) => "yahoo",
            ProviderConfig::CsvFile(_) => "csv_file",
        }
    }
}

/// The built-in providers.
#[derive(Debug)]
pub enum Provider {
    AlphaVantage(AlphaVantageProvider),
    Yahoo(YahooProvider),
    CsvFile(CsvFileProvider),
}

impl Provider {
    /// Build a provider. `timeout` bounds each HTTP request.
    pub fn from_config(
        config: &ProviderConfig,
        timeout: Duration,
        clock: &Arc<dyn Clock>,
    ) -> Result<Self, DataError> {
        Ok(match config {
            ProviderConfig::AlphaVantage(c) => {
                Provider::AlphaVantage(AlphaVantageProvider::new(c, timeout, Arc::clone(clock))?)
            }
            ProviderConfig::Yahoo(c) => Provider::Yahoo(YahooProvider::new(c, timeout)?),
            ProviderConfig::CsvFile(c) => Provider::CsvFile(CsvFileProvider::new(c)),
        })
    }
}

#[async_trait]
impl DataProvider for Provider {
    async fn fetch(&self, symbol: &Symbol, range: &DateRange) -> Result<PriceSeries, ProviderError> {
        match self {
            Provider::AlphaVantage(p) => p.fetch(symbol, range).await,
            Provider::Yahoo(p) => p.fetch(symbol, range).await,
            Provider::CsvFile(p) => p.fetch(symbol, range).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Provider::AlphaVantage(p) => p.name(),
            Provider::Yahoo(p) => p.name(),
            Provider::CsvFile(p) => p.name(),
        }
    }
}

/// One row of a daily OHLCV CSV file.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceRecord {
    #[serde(alias = "Date", alias = "Timestamp", alias = "timestamp")]
    pub date: String,
    #[serde(alias = "Open")]
    pub open: f64,
    #[serde(alias = "High")]
    pub high: f64,
    #[serde(alias = "Low")]
    pub low: f64,
    #[serde(alias = "Close")]
    pub close: f64,
    #[serde(alias = "Volume", default)]
    pub volume: f64,
}

impl PriceRecord {
    pub fn into_point(self) -> Result<PricePoint, ProviderError> {
        let date = parse_date(&self.date).ok_or_else(|| {
            ProviderError::MalformedResponse(format!("could not parse date: {}", self.date))
        })?;
        Ok(PricePoint::new(
            date, self.open, self.high, self.low, self.close, self.volume,
        ))
    }
}

/// Read CSV rows into points, in file order.
pub(crate) fn read_csv_points<R: std::io::Read>(reader: R) -> Result<Vec<PricePoint>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for result in reader.deserialize() {
        let record: PriceRecord =
            result.map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        points.push(record.into_point()?);
    }
    Ok(points)
}

/// Parse the date formats seen in daily price files.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for format in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, format) {
            return Some(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    None
}

/// Keep the points inside `range` and build a validated series.
pub(crate) fn finish_series(
    symbol: &Symbol,
    points: Vec<PricePoint>,
    range: &DateRange,
) -> Result<PriceSeries, ProviderError> {
    let points: Vec<PricePoint> = points
        .into_iter()
        .filter(|p| range.contains(p.date))
        .collect();
    if points.is_empty() {
        return Err(ProviderError::MalformedResponse(format!(
            "no data for {} in {}",
            symbol, range
        )));
    }
    PriceSeries::from_unordered(symbol.clone(), points)
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

/// Shared HTTP client setup.
pub(crate) fn http_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, DataError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| DataError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// Classify a transport failure.
pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::NetworkError(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("2024/01/15"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("01/15/2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("15-01-2024"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 16:00:00"), Some(date(2024, 1, 15)));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_read_csv_points_with_header_aliases() {
        let csv = "Date,Open,High,Low,Close,Volume\n2024-01-03,10,11,9,10.5,100\n2024-01-02,9,10,8,9.5,200\n";
        let points = read_csv_points(csv.as_bytes()).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date(2024, 1, 3));
        assert_eq!(points[1].close, 9.5);
        assert_eq!(points[1].volume, 200.0);
    }

    #[test]
    fn test_read_csv_points_rejects_bad_rows() {
        let csv = "date,open,high,low,close,volume\n2024-01-03,ten,11,9,10.5,100\n";
        assert!(matches!(
            read_csv_points(csv.as_bytes()),
            Err(ProviderError::MalformedResponse(_))
        ));

        let csv = "date,open,high,low,close,volume\nsoon,10,11,9,10.5,100\n";
        assert!(matches!(
            read_csv_points(csv.as_bytes()),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_finish_series_filters_and_sorts() {
        let symbol = Symbol::parse("ACME").unwrap();
        let points = vec![
            PricePoint::new(date(2024, 1, 5), 1.0, 1.0, 1.0, 1.0, 0.0),
            PricePoint::new(date(2024, 1, 3), 1.0, 1.0, 1.0, 1.0, 0.0),
            PricePoint::new(date(2023, 12, 29), 1.0, 1.0, 1.0, 1.0, 0.0),
        ];
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        let series = finish_series(&symbol, points, &range).unwrap();
        assert_eq!(series.dates(), vec![date(2024, 1, 3), date(2024, 1, 5)]);

        let empty = DateRange::new(date(2025, 1, 1), date(2025, 1, 2)).unwrap();
        let points = vec![PricePoint::new(date(2024, 1, 5), 1.0, 1.0, 1.0, 1.0, 0.0)];
        assert!(matches!(
            finish_series(&symbol, points, &empty),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_provider_config_serde() {
        let toml_like = serde_json::json!([
            { "kind": "alpha_vantage", "api_key_env": "AV_KEY" },
            { "kind": "yahoo" },
            { "kind": "csv_file", "dir": "data/prices" }
        ]);
        let configs: Vec<ProviderConfig> = serde_json::from_value(toml_like).unwrap();

        assert_eq!(configs.len(), 3);
        assert_eq!(configs[0].kind(), "alpha_vantage");
        match &configs[0] {
            ProviderConfig::AlphaVantage(c) => {
                assert_eq!(c.api_key_env, "AV_KEY");
                assert_eq!(c.base_url, AlphaVantageConfig::default().base_url);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(configs[1], ProviderConfig::Yahoo(YahooConfig::default()));
        assert_eq!(configs[2].kind(), "csv_file");
    }
}
