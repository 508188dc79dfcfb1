//! Yahoo Finance chart API.

use async_trait::async_trait;
use chrono::{DateTime, Days};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockscope_core::error::{DataError, ProviderError};
use stockscope_core::traits::DataProvider;
use stockscope_core::types::{DateRange, PricePoint, PriceSeries, Symbol};
use tracing::debug;

use super::{finish_series, http_client, transport_error};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// Yahoo daily bars. Used as the fallback source by default.
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &YahooConfig, timeout: Duration) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client(timeout, &config.user_agent)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn chart_error(symbol: &Symbol, error: ChartError) -> ProviderError {
    let detail = format!(
        "{}: {} {}",
        symbol,
        error.code,
        error.description.unwrap_or_default()
    );
    if error.code.eq_ignore_ascii_case("Not Found") {
        ProviderError::SymbolNotFound(detail)
    } else {
        ProviderError::MalformedResponse(detail)
    }
}

/// Turn a chart response into a series.
///
/// Rows missing any of open/high/low/close are skipped; missing volume is 0.
/// Timestamps are shifted by the exchange's UTC offset before taking the date.
fn parse_chart(symbol: &Symbol, body: &str, range: &DateRange) -> Result<PriceSeries, ProviderError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(chart_error(symbol, error));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::MalformedResponse(format!("empty chart for {}", symbol)))?;
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = data.meta.gmtoffset;

    fn at(column: &[Option<f64>], i: usize) -> Option<f64> {
        column.get(i).copied().flatten()
    }

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close)) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        ) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| ProviderError::MalformedResponse(format!("bad timestamp {}", ts)))?
            .date_naive();
        let volume = at(&quote.volume, i).unwrap_or(0.0);
        points.push(PricePoint::new(date, open, high, low, close, volume));
    }

    finish_series(symbol, points, range)
}

#[async_trait]
impl DataProvider for YahooProvider {
    async fn fetch(&self, symbol: &Symbol, range: &DateRange) -> Result<PriceSeries, ProviderError> {
        // period2 is exclusive.
        let period1 = range.start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let period2 = (range.end + Days::new(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        debug!(symbol = %symbol, period1, period2, "Requesting Yahoo chart");

        let resp = self
            .client
            .get(format!("{}/v8/finance/chart/{}", self.base_url, symbol))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::SymbolNotFound(symbol.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(ProviderError::NetworkError(format!("HTTP {}", status)));
        }

        let body = resp.text().await.map_err(transport_error)?;
        parse_chart(symbol, &body, range)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
