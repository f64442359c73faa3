// Core structs: PriceObservation, Verdict, error types
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use thiserror::Error;

/// Latest close fetched for one ticker. Lives only for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub ticker: String,
    pub price: Decimal,
    pub fetched_at: DateTime<Local>,
}

/// Where a price sits relative to its configured band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// price < low
    DeeplyUndervalued,
    /// low <= price <= high
    FairToLow,
    /// price > high
    MidToHigh,
}

impl Verdict {
    pub fn text(&self) -> &'static str {
        match self {
            Verdict::DeeplyUndervalued => "deeply undervalued, accumulate in tranches ✅",
            Verdict::FairToLow => "fair-to-low, consider buying ✔️",
            Verdict::MidToHigh => "mid-to-high valuation, hold off ⚠️",
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data for {0}")]
    DataUnavailable(String),
    #[error("request failed: {0}")]
    Http(String),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid mail address '{address}': {reason}")]
    Address { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
