use crate::analyzer::Report;
use crate::config::AppConfig;
use crate::fetcher::PriceFetcher;
use crate::model::{NotifyError, Verdict};
use crate::notifier::Notifier;
use chrono::NaiveDateTime;
use tracing::info;

/// One fetch -> evaluate -> notify run.
///
/// Per-ticker fetch failures end up inside the report. Only a failed send is
/// returned as an error; the report is printed to stdout before sending.
pub async fn run_job(
    config: &AppConfig,
    fetcher: &dyn PriceFetcher,
    notifier: &dyn Notifier,
    now: NaiveDateTime,
) -> Result<Report, NotifyError> {
    info!("Running valuation check for {} tickers", config.watchlist.len());
    let report = Report::build(&config.watchlist, fetcher, now).await;
    let (priced, failed) = report.summary();
    let buy_zone = report
        .entries
        .iter()
        .filter(|e| matches!(e.verdict(), Some(Verdict::DeeplyUndervalued | Verdict::FairToLow)))
        .count();
    info!(
        "Report ready: {} priced, {} failed, {} in buy zone",
        priced, failed, buy_zone
    );

    let body = report.render();
    println!("{}", body);

    notifier.send_report(&body).await?;
    info!("Report sent");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::report::tests::{watch, FakeFetcher};
    use crate::config::{ScheduleConfig, SmtpConfig};
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_report(&self, body: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Address {
                    address: "dest@example.com".into(),
                    reason: "rejected".into(),
                });
            }
            self.sent.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            watchlist: vec![
                watch("002352.SZ", "38.0", "42.0"),
                watch("600600.SS", "88.0", "95.0"),
                watch("GONE.SZ", "10.0", "20.0"),
            ],
            smtp: SmtpConfig {
                host: "smtp.example.com".into(),
                port: 587,
                username: "alerts@example.com".into(),
                password: "secret".into(),
                from: None,
                recipient: "dest@example.com".into(),
                subject: "Daily valuation alert".into(),
            },
            schedule: ScheduleConfig::default(),
            run_on_startup: false,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(16, 0, 5)
            .unwrap()
    }

    #[tokio::test]
    async fn sends_one_message_with_every_line() {
        let fetcher = FakeFetcher::new(&[("002352.SZ", "40.00"), ("600600.SS", "80.00")]);
        let notifier = RecordingNotifier::default();

        let report = run_job(&config(), &fetcher, &notifier, now()).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], report.render());
        assert!(sent[0].starts_with("Checked at: 2026-10-16 16:00:05"));
        assert!(sent[0].contains(Verdict::FairToLow.text()));
        assert!(sent[0].contains(Verdict::DeeplyUndervalued.text()));
        assert!(sent[0].contains("GONE.SZ: fetch failed -> no data for GONE.SZ"));
    }

    #[tokio::test]
    async fn send_failure_propagates() {
        let fetcher = FakeFetcher::new(&[("002352.SZ", "40.00")]);
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };

        let result = run_job(&config(), &fetcher, &notifier, now()).await;

        assert!(matches!(result, Err(NotifyError::Address { .. })));
        assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
    }
}
