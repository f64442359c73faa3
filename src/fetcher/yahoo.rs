use crate::fetcher::traits::PriceFetcher;
use crate::model::{FetchError, PriceObservation};

use chrono::Local;
use reqwest::{Client, StatusCode, Url};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

/// Five calendar days always cover the two most recent sessions, weekends included.
const HISTORY_RANGE: &str = "5d";

pub struct YahooFetcher {
    client: Client,
}

impl YahooFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) StockNotifier/0.1")
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client })
    }

    fn build_url(&self, ticker: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(CHART_URL).map_err(|e| FetchError::Http(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Http(format!("cannot build url for {}", ticker)))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", HISTORY_RANGE)
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait::async_trait]
impl PriceFetcher for YahooFetcher {
    async fn latest_close(&self, ticker: &str) -> Result<PriceObservation, FetchError> {
        let url = self.build_url(ticker)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(ticker, status, &body));
        }

        let price = parse_latest_close(ticker, &body)?;
        Ok(PriceObservation {
            ticker: ticker.to_string(),
            price,
            fetched_at: Local::now(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl ChartError {
    fn message(&self) -> String {
        match &self.description {
            Some(desc) if !desc.is_empty() => desc.clone(),
            _ => self.code.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Extracts the last non-null close from a chart payload.
fn parse_latest_close(ticker: &str, body: &str) -> Result<Decimal, FetchError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    if let Some(error) = &response.chart.error {
        return Err(FetchError::DataUnavailable(format!(
            "{} ({})",
            ticker,
            error.message()
        )));
    }

    let close = response
        .chart
        .result
        .as_deref()
        .and_then(|results| results.first())
        .and_then(|result| result.indicators.quote.first())
        .and_then(|quote| quote.close.iter().rev().find_map(|c| *c))
        .ok_or_else(|| FetchError::DataUnavailable(ticker.to_string()))?;

    Decimal::from_f64(close)
        .map(|d| d.round_dp(4))
        .ok_or_else(|| FetchError::DataUnavailable(format!("{} (non-finite close)", ticker)))
}

/// Yahoo answers unknown symbols with 404 plus a chart error body.
fn status_error(ticker: &str, status: StatusCode, body: &str) -> FetchError {
    if status == StatusCode::NOT_FOUND {
        if let Ok(response) = serde_json::from_str::<ChartResponse>(body) {
            if let Some(error) = response.chart.error {
                return FetchError::DataUnavailable(format!("{} ({})", ticker, error.message()));
            }
        }
    }
    FetchError::Status(status.as_u16())
}
