use crate::analyzer::evaluator::{classify, render_error, render_line};
use crate::config::WatchConfig;
use crate::fetcher::PriceFetcher;
use crate::model::{FetchError, PriceObservation, Verdict};
use chrono::NaiveDateTime;
use tracing::{info, warn};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one watchlist entry within a run.
#[derive(Debug)]
pub struct ReportEntry {
    pub watch: WatchConfig,
    pub outcome: Result<PriceObservation, FetchError>,
}

impl ReportEntry {
    pub fn verdict(&self) -> Option<Verdict> {
        self.outcome
            .as_ref()
            .ok()
            .map(|obs| classify(obs.price, self.watch.low, self.watch.high))
    }

    pub fn line(&self) -> String {
        match &self.outcome {
            Ok(obs) => render_line(&self.watch, obs.price),
            Err(e) => render_error(&self.watch, e),
        }
    }
}

#[derive(Debug)]
pub struct Report {
    pub generated_at: NaiveDateTime,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Fetches every watchlist entry in order. A failed fetch becomes an error
    /// entry and never stops the remaining tickers.
    pub async fn build(
        watchlist: &[WatchConfig],
        fetcher: &dyn PriceFetcher,
        generated_at: NaiveDateTime,
    ) -> Self {
        let mut entries = Vec::with_capacity(watchlist.len());
        for watch in watchlist {
            info!("Fetching {}...", watch.ticker);
            let outcome = fetcher.latest_close(&watch.ticker).await;
            match &outcome {
                Ok(obs) => info!(
                    "{}: latest close {} (fetched {})",
                    obs.ticker,
                    obs.price,
                    obs.fetched_at.format("%H:%M:%S")
                ),
                Err(e) => warn!("{}: fetch failed: {}", watch.ticker, e),
            }
            entries.push(ReportEntry {
                watch: watch.clone(),
                outcome,
            });
        }
        Self {
            generated_at,
            entries,
        }
    }

    pub fn header(&self) -> String {
        format!("Checked at: {}", self.generated_at.format(TIMESTAMP_FORMAT))
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(ReportEntry::line)
    }

    /// Header, a blank line, then one line per entry.
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        for line in self.lines() {
            out.push('\n');
            out.push_str(&line);
        }
        out
    }

    /// (priced, failed)
    pub fn summary(&self) -> (usize, usize) {
        let failed = self.entries.iter().filter(|e| e.outcome.is_err()).count();
        (self.entries.len() - failed, failed)
    }
}
