use crate::config::WatchConfig;
use crate::model::{FetchError, Verdict};
use rust_decimal::{Decimal, RoundingStrategy};

/// Classifies a price against an inclusive `[low, high]` band.
pub fn classify(price: Decimal, low: Decimal, high: Decimal) -> Verdict {
    if price < low {
        Verdict::DeeplyUndervalued
    } else if price <= high {
        Verdict::FairToLow
    } else {
        Verdict::MidToHigh
    }
}

/// Report line for a successfully priced ticker.
pub fn render_line(entry: &WatchConfig, price: Decimal) -> String {
    let verdict = classify(price, entry.low, entry.high);
    format!(
        "{}: price {:.2} | band [{}-{}] -> {}",
        label(entry),
        price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        format_bound(entry.low),
        format_bound(entry.high),
        verdict.text()
    )
}

/// Report line substituted when the fetch for `entry` failed. Always keyed by
/// the bare ticker, without the display name.
pub fn render_error(entry: &WatchConfig, err: &FetchError) -> String {
    format!("{}: fetch failed -> {}", entry.ticker, err)
}

fn label(entry: &WatchConfig) -> String {
    match &entry.name {
        Some(name) if !name.trim().is_empty() => format!("{} ({})", entry.ticker, name.trim()),
        _ => entry.ticker.clone(),
    }
}

/// Bounds always show at least one decimal place: `38` prints as `38.0`.
fn format_bound(value: Decimal) -> String {
    let value = value.normalize();
    if value.scale() == 0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
