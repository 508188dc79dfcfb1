//! Alpha Vantage daily time series.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stockscope_core::error::{DataError, ProviderError};
use stockscope_core::traits::DataProvider;
use stockscope_core::types::{DateRange, PriceSeries, Symbol};
use tracing::debug;

use crate::clock::Clock;

use super::{finish_series, http_client, read_csv_points, transport_error};

/// `outputsize=compact` returns the latest 100 sessions, roughly this many
/// calendar days.
const COMPACT_CALENDAR_DAYS: i64 = 130;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaVantageConfig {
    pub base_url: String,
    /// Inline key. Prefer the key file or environment variable.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// File holding the key on its first line. Checked before the environment.
    pub api_key_file: Option<PathBuf>,
    /// Environment variable holding the key.
    pub api_key_env: String,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co".to_string(),
            api_key: None,
            api_key_file: Some(PathBuf::from(".ALPHA_VANTAGE_KEY.txt")),
            api_key_env: "ALPHA_VANTAGE_API_KEY".to_string(),
        }
    }
}

impl AlphaVantageConfig {
    /// Resolve the API key from the inline value, the key file, then the environment.
    pub fn resolve_api_key(&self) -> Result<String, DataError> {
        if let Some(key) = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        if let Some(key) = self.api_key_file.as_deref().and_then(read_key_file) {
            return Ok(key);
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(DataError::Configuration(format!(
                "no Alpha Vantage API key: set {} or create {}",
                self.api_key_env,
                self.api_key_file
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "a key file".to_string())
            ))),
        }
    }
}

fn read_key_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let key = contents.lines().next()?.trim();
    (!key.is_empty()).then(|| key.to_string())
}

/// Alpha Vantage `TIME_SERIES_DAILY` client.
#[derive(Debug)]
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    clock: Arc<dyn Clock>,
}

impl AlphaVantageProvider {
    /// `clock` dates the request; compact output only reaches back from today.
    pub fn new(
        config: &AlphaVantageConfig,
        timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DataError> {
        let api_key = config.resolve_api_key()?;
        Ok(Self {
            client: http_client(timeout, concat!("stockscope/", env!("CARGO_PKG_VERSION")))?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            clock,
        })
    }

    fn output_size_for(&self, range: &DateRange) -> &'static str {
        output_size(range, self.clock.now().date_naive())
    }
}

/// `compact` when the whole range lies within the last 100 sessions.
fn output_size(range: &DateRange, today: NaiveDate) -> &'static str {
    if (today - range.start).num_days() <= COMPACT_CALENDAR_DAYS {
        "compact"
    } else {
        "full"
    }
}

/// Classify a response body. Errors come back as JSON with HTTP 200.
fn parse_body(symbol: &Symbol, body: &str, range: &DateRange) -> Result<PriceSeries, ProviderError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        let json: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        let message = |key: &str| json.get(key).and_then(|v| v.as_str()).map(str::to_string);

        if let Some(msg) = message("Error Message") {
            return Err(ProviderError::SymbolNotFound(format!("{}: {}", symbol, msg)));
        }
        if let Some(msg) = message("Note").or_else(|| message("Information")) {
            return Err(ProviderError::RateLimited(msg));
        }
        return Err(ProviderError::MalformedResponse(format!(
            "unexpected JSON body for {}",
            symbol
        )));
    }

    let points = read_csv_points(trimmed.as_bytes())?;
    finish_series(symbol, points, range)
}

#[async_trait]
impl DataProvider for AlphaVantageProvider {
    async fn fetch(&self, symbol: &Symbol, range: &DateRange) -> Result<PriceSeries, ProviderError> {
        let size = self.output_size_for(range);
        debug!(symbol = %symbol, outputsize = size, "Requesting Alpha Vantage daily series");

        let resp = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol.as_str()),
                ("outputsize", size),
                ("datatype", "csv"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::NetworkError(format!("HTTP {}", status)));
        }

        let body = resp.text().await.map_err(transport_error)?;
        parse_body(symbol, &body, range)
    }

    fn name(&self) -> &str {
        "alpha_vantage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn acme() -> Symbol {
        Symbol::parse("ACME").unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    #[test]
    fn test_parse_csv_body_newest_first() {
        let body = "timestamp,open,high,low,close,volume\r\n\
                    2024-01-04,11.0,12.0,10.5,11.5,3000\r\n\
                    2024-01-03,10.0,11.0,9.5,10.8,2000\r\n\
                    2024-01-02,10.2,10.4,9.8,10.0,1000\r\n";

        let series = parse_body(&acme(), body, &january()).unwrap();
        assert_eq!(
            series.dates(),
            vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)]
        );
        assert_eq!(series.closes(), vec![10.0, 10.8, 11.5]);
        assert_eq!(series.volumes(), vec![1000.0, 2000.0, 3000.0]);
    }

    #[test]
    fn test_parse_error_message_is_not_found() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        assert!(matches!(
            parse_body(&acme(), body, &january()),
            Err(ProviderError::SymbolNotFound(_))
        ));
    }

    #[test]
    fn test_parse_notice_is_rate_limited() {
        let note = r#"{"Note": "Our standard API call frequency is 5 calls per minute."}"#;
        assert!(matches!(
            parse_body(&acme(), note, &january()),
            Err(ProviderError::RateLimited(_))
        ));

        let info = r#"{"Information": "You have reached the daily rate limit."}"#;
        assert!(matches!(
            parse_body(&acme(), info, &january()),
            Err(ProviderError::RateLimited(_))
        ));
    }

    #[test]
    fn test_parse_malformed_bodies() {
        for body in [r#"{"Meta Data": {}}"#, "{ truncated", "timestamp,open\n2024-01-02,abc\n"] {
            assert!(
                matches!(
                    parse_body(&acme(), body, &january()),
                    Err(ProviderError::MalformedResponse(_))
                ),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_output_size() {
        let today = date(2024, 6, 28);
        let recent = DateRange::new(date(2024, 3, 1), today).unwrap();
        let old = DateRange::new(date(2023, 6, 1), today).unwrap();

        assert_eq!(output_size(&recent, today), "compact");
        assert_eq!(output_size(&old, today), "full");
    }

    #[test]
    fn test_output_size_follows_injected_clock() {
        let config = AlphaVantageConfig {
            api_key: Some("demo".into()),
            ..AlphaVantageConfig::default()
        };
        let clock = Arc::new(crate::clock::FixedClock::new(
            chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2024, 6, 28, 22, 0, 0).unwrap(),
        ));
        let provider = AlphaVantageProvider::new(&config, Duration::from_secs(5), clock.clone()).unwrap();
        let recent = DateRange::new(date(2024, 3, 1), date(2024, 6, 28)).unwrap();

        assert_eq!(provider.output_size_for(&recent), "compact");
        clock.advance(chrono::Duration::days(365));
        assert_eq!(provider.output_size_for(&recent), "full");
    }

    #[test]
    fn test_api_key_resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let key_file = dir.path().join("key.txt");
        std::fs::write(&key_file, "from-file\n").unwrap();

        let config = AlphaVantageConfig {
            api_key: Some("inline".into()),
            api_key_file: Some(key_file.clone()),
            api_key_env: "STOCKSCOPE_TEST_UNSET_AV_KEY".into(),
            ..AlphaVantageConfig::default()
        };
        assert_eq!(config.resolve_api_key().unwrap(), "inline");

        let config = AlphaVantageConfig {
            api_key: None,
            ..config
        };
        assert_eq!(config.resolve_api_key().unwrap(), "from-file");

        let config = AlphaVantageConfig {
            api_key_file: Some(dir.path().join("missing.txt")),
            ..config
        };
        assert!(matches!(
            config.resolve_api_key(),
            Err(DataError::Configuration(_))
        ));
    }
}
