//! # models::stock
//!
//! [`TrackedSymbol`] is the live, mutable quote for one ticker; the price feed
//! rewrites it in place every tick and appends a [`HistoryBar`] to its rolling
//! window.  Bars are never edited after they are pushed; eviction from the
//! front of the window is the only way one disappears.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── HistoryBar ───────────────────────────────────────────────────────────────

/// One OHLCV bar.  `high >= max(open, close)` and `low <= min(open, close)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryBar {
    /// Calendar day of the bar, `YYYY-MM-DD` on the wire.
    pub date: NaiveDate,
    /// Epoch milliseconds on the wire (what the charting frontend expects).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl HistoryBar {
    /// Build a bar, widening `high` / `low` if needed so the OHLC invariant
    /// always holds.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date: timestamp.date_naive(),
            timestamp,
            open,
            high: high.max(open).max(close),
            low: low.min(open).min(close),
            close,
            volume,
        }
    }
}

// ─── TrackedSymbol ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSymbol {
    pub symbol: String,
    pub current_price: f64,
    /// Absolute change produced by the last tick.
    pub change: f64,
    /// Percentage change produced by the last tick.
    pub change_percent: f64,
    /// Volume of the most recent bar.
    pub volume: u64,
    pub week_high: f64,
    pub week_low: f64,
    /// Oldest bar at the front, newest at the back.
    pub price_history: VecDeque<HistoryBar>,
}

impl TrackedSymbol {
    /// Append `bar`, evicting from the front until at most `window` bars remain.
    pub fn push_bar(&mut self, bar: HistoryBar, window: usize) {
        self.price_history.push_back(bar);
        while self.price_history.len() > window {
            self.price_history.pop_front();
        }
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.price_history.iter().map(|bar| bar.close).collect()
    }

    /// Bars at or after `cutoff`, oldest first.
    pub fn history_since(&self, cutoff: DateTime<Utc>) -> Vec<HistoryBar> {
        self.price_history
            .iter()
            .filter(|bar| bar.timestamp >= cutoff)
            .cloned()
            .collect()
    }
}

// ─── StockRow ─────────────────────────────────────────────────────────────────

/// Compact per-symbol row used by list endpoints and mover tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
}

// ─── HistoryPeriod ────────────────────────────────────────────────────────────

/// Look-back window accepted by `GET /api/stocks/:symbol/history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPeriod {
    OneDay,
    SevenDays,
    #[default]
    ThirtyDays,
    NinetyDays,
    OneYear,
}

impl HistoryPeriod {
    /// Unknown strings fall back to 30 days.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "1d" => Self::OneDay,
            "7d" => Self::SevenDays,
            "30d" => Self::ThirtyDays,
            "90d" => Self::NinetyDays,
            "1y" => Self::OneYear,
            _ => Self::default(),
        }
    }

    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::OneDay => now - Duration::days(1),
            Self::SevenDays => now - Duration::days(7),
            Self::ThirtyDays => now - Duration::days(30),
            Self::NinetyDays => now - Duration::days(90),
            Self::OneYear => now
                .checked_sub_months(Months::new(12))
                .unwrap_or(now - Duration::days(365)),
        }
    }
}
