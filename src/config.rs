use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use thiserror::Error;

/// One watchlist row: a ticker and its fair-value band.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    pub low: Decimal,
    pub high: Decimal,
}

#[derive(Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; falls back to `username`.
    #[serde(default)]
    pub from: Option<String>,
    pub recipient: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl SmtpConfig {
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

// Keep the password out of logs.
impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("from", &self.from)
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Local wall-clock time, `HH:MM`.
    #[serde(default = "default_trigger_time")]
    pub trigger_time: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_skip_weekends")]
    pub skip_weekends: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            trigger_time: default_trigger_time(),
            poll_interval_seconds: default_poll_interval(),
            skip_weekends: default_skip_weekends(),
        }
    }
}

impl ScheduleConfig {
    pub fn trigger_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.trigger_time.trim(), "%H:%M").map_err(|e| {
            ConfigError::Invalid(format!(
                "trigger_time '{}' is not HH:MM: {}",
                self.trigger_time, e
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub watchlist: Vec<WatchConfig>,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Run the whole chain once right after startup, before the first trigger.
    #[serde(default)]
    pub run_on_startup: bool,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watchlist.is_empty() {
            return Err(ConfigError::Invalid("watchlist is empty".into()));
        }

        let mut seen = HashSet::new();
        for entry in &self.watchlist {
            let ticker = entry.ticker.as_str();
            if ticker.trim().is_empty() {
                return Err(ConfigError::Invalid("watchlist entry with empty ticker".into()));
            }
            if ticker.trim() != ticker {
                return Err(ConfigError::Invalid(format!(
                    "ticker '{}' has surrounding whitespace",
                    ticker
                )));
            }
            if !seen.insert(ticker) {
                return Err(ConfigError::Invalid(format!("duplicate ticker '{}'", ticker)));
            }
            if entry.low > entry.high {
                return Err(ConfigError::Invalid(format!(
                    "{}: low bound {} exceeds high bound {}",
                    ticker, entry.low, entry.high
                )));
            }
        }

        if self.schedule.poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_seconds must be greater than zero".into(),
            ));
        }
        self.schedule.trigger_time()?;

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

fn default_smtp_port() -> u16 {
    587
}

fn default_subject() -> String {
    "Daily valuation alert".to_string()
}

fn default_trigger_time() -> String {
    "16:00".to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_skip_weekends() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "watchlist": [
            { "ticker": "002352.SZ", "name": "SF Holding", "low": 38.0, "high": 42.0 },
            { "ticker": "600600.SS", "low": "88.0", "high": "95.0" }
        ],
        "smtp": {
            "host": "smtp.example.com",
            "username": "alerts@example.com",
            "password": "secret",
            "recipient": "dest@example.com"
        }
    }"#;

    fn sample() -> AppConfig {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn applies_defaults() {
        let cfg = sample();
        assert_eq!(cfg.smtp.port, 587);
        assert_eq!(cfg.smtp.sender(), "alerts@example.com");
        assert_eq!(cfg.schedule.poll_interval_seconds, 30);
        assert!(cfg.schedule.skip_weekends);
        assert!(!cfg.run_on_startup);
        assert_eq!(
            cfg.schedule.trigger_time().unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
        cfg.validate().unwrap();
    }

    #[test]
    fn keeps_watchlist_order_and_bands() {
        let cfg = sample();
        let tickers: Vec<_> = cfg.watchlist.iter().map(|w| w.ticker.as_str()).collect();
        assert_eq!(tickers, ["002352.SZ", "600600.SS"]);
        assert_eq!(cfg.watchlist[0].low, Decimal::new(38, 0));
        assert_eq!(cfg.watchlist[1].high, Decimal::new(950, 1));
    }

    #[test]
    fn rejects_inverted_band() {
        let mut cfg = sample();
        cfg.watchlist[0].low = Decimal::new(50, 0);
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_duplicate_ticker() {
        let mut cfg = sample();
        cfg.watchlist[1].ticker = "002352.SZ".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_ticker_with_whitespace() {
        let mut cfg = sample();
        cfg.watchlist[0].ticker = " 002352.SZ".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_bad_trigger_time() {
        let mut cfg = sample();
        cfg.schedule.trigger_time = "4pm".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_empty_watchlist() {
        let mut cfg = sample();
        cfg.watchlist.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_hides_password() {
        let cfg = sample();
        let dbg = format!("{:?}", cfg.smtp);
        assert!(!dbg.contains("secret"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.watchlist.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/nonexistent/stock-notifier.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
