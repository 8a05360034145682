//! # market::seed
//!
//! Mock data the server boots with: five large-cap companies, a 30-day
//! random-walk price history for each, canned predictions, plus the
//! index / news fixtures used by the overview endpoints.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;

use crate::market::analytics::round_cents;
use crate::market::MarketTable;
use crate::models::{Company, HistoryBar, Outlook, Prediction, TrackedSymbol};

/// Days of synthetic history generated per symbol at boot.
pub const SEED_HISTORY_DAYS: usize = 30;

struct SeedListing {
    symbol:         &'static str,
    name:           &'static str,
    sector:         &'static str,
    market_cap:     u64,
    description:    &'static str,
    price:          f64,
    change:         f64,
    change_percent: f64,
    volume:         u64,
    week_high:      f64,
    week_low:       f64,
}

const LISTINGS: [SeedListing; 5] = [
    SeedListing {
        symbol: "AAPL", name: "Apple Inc.", sector: "Technology",
        market_cap: 3_000_000_000_000,
        description: "Technology company that designs and manufactures consumer electronics",
        price: 185.50, change: 2.30, change_percent: 1.26, volume: 45_230_000,
        week_high: 199.62, week_low: 164.08,
    },
    SeedListing {
        symbol: "GOOGL", name: "Alphabet Inc.", sector: "Technology",
        market_cap: 1_800_000_000_000,
        description: "Multinational technology company specializing in Internet services",
        price: 142.80, change: -1.20, change_percent: -0.83, volume: 28_450_000,
        week_high: 153.78, week_low: 129.40,
    },
    SeedListing {
        symbol: "MSFT", name: "Microsoft Corporation", sector: "Technology",
        market_cap: 2_800_000_000_000,
        description: "Technology company that develops computer software and services",
        price: 378.90, change: 4.50, change_percent: 1.20, volume: 32_100_000,
        week_high: 384.30, week_low: 309.45,
    },
    SeedListing {
        symbol: "TSLA", name: "Tesla Inc.", sector: "Automotive",
        market_cap: 800_000_000_000,
        description: "Electric vehicle and clean energy company",
        price: 245.60, change: -8.40, change_percent: -3.31, volume: 89_450_000,
        week_high: 299.29, week_low: 138.80,
    },
    SeedListing {
        symbol: "NVDA", name: "NVIDIA Corporation", sector: "Technology",
        market_cap: 1_200_000_000_000,
        description: "Technology company that designs graphics processing units",
        price: 875.30, change: 12.80, change_percent: 1.48, volume: 56_780_000,
        week_high: 974.00, week_low: 394.75,
    },
];

/// Daily random walk ending just before `now`: ±3% per day, open within ±1%
/// of close, wicks up to 3% beyond the body.
pub fn generate_price_history<R: Rng + ?Sized>(
    rng: &mut R,
    base_price: f64,
    days: usize,
    now: DateTime<Utc>,
) -> Vec<HistoryBar> {
    let start = now - Duration::days(days as i64);
    let mut price = base_price;

    (0..days)
        .map(|i| {
            let ts = start + Duration::days(i as i64);
            price *= 1.0 + rng.gen_range(-0.03..0.03);

            let open = price * (1.0 + rng.gen_range(-0.01..0.01));
            let high = open.max(price) * (1.0 + rng.gen_range(0.0..0.03));
            let low = open.min(price) * (1.0 - rng.gen_range(0.0..0.03));
            let volume = rng.gen_range(10_000_000..60_000_000);

            HistoryBar::new(
                ts,
                round_cents(open),
                round_cents(high),
                round_cents(low),
                round_cents(price),
                volume,
            )
        })
        .collect()
}

/// Build the boot-time table.  History is trimmed to `window`.
pub fn seed_market<R: Rng + ?Sized>(rng: &mut R, window: usize, now: DateTime<Utc>) -> MarketTable {
    let mut table = MarketTable::new();

    for l in &LISTINGS {
        let mut tracked = TrackedSymbol {
            symbol:         l.symbol.to_string(),
            current_price:  l.price,
            change:         l.change,
            change_percent: l.change_percent,
            volume:         l.volume,
            week_high:      l.week_high,
            week_low:       l.week_low,
            price_history:  VecDeque::with_capacity(window + 1),
        };
        for bar in generate_price_history(rng, l.price, SEED_HISTORY_DAYS, now) {
            tracked.push_bar(bar, window);
        }

        let company = Company {
            symbol:      l.symbol.to_string(),
            name:        l.name.to_string(),
            sector:      l.sector.to_string(),
            market_cap:  l.market_cap,
            description: l.description.to_string(),
        };
        table.insert(company, tracked);
    }

    table
}

pub fn seed_predictions() -> HashMap<String, Prediction> {
    let canned = [
        ("AAPL", Outlook::Bullish, 0.78, 195.00,
         ["Strong earnings", "New product launches", "Market sentiment"],
         "Technical indicators suggest upward momentum with strong support levels."),
        ("GOOGL", Outlook::Neutral, 0.65, 148.50,
         ["Market volatility", "Regulatory concerns", "Ad revenue growth"],
         "Mixed signals from technical and fundamental analysis."),
        ("MSFT", Outlook::Bullish, 0.82, 395.00,
         ["Cloud growth", "AI integration", "Strong fundamentals"],
         "Strong fundamentals and cloud business growth support bullish outlook."),
        ("TSLA", Outlook::Bearish, 0.71, 220.00,
         ["Production concerns", "Competition", "Market correction"],
         "Recent volatility and increased competition pose risks."),
        ("NVDA", Outlook::Bullish, 0.85, 920.00,
         ["AI demand", "Data center growth", "Technical breakout"],
         "AI boom and strong technical patterns indicate continued growth."),
    ];

    canned
        .into_iter()
        .map(|(symbol, outlook, confidence, target, factors, analysis)| {
            (
                symbol.to_string(),
                Prediction {
                    prediction:   outlook,
                    confidence,
                    target_price: target,
                    timeframe:    crate::market::forecast::DEFAULT_TIMEFRAME.to_string(),
                    factors:      factors.iter().map(|f| f.to_string()).collect(),
                    analysis:     analysis.to_string(),
                    generated:    false,
                    generated_at: None,
                },
            )
        })
        .collect()
}

// ─── Indices ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub name: String,
    pub value: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// S&P 500, NASDAQ and Dow jittered around fixed levels.
pub fn mock_indices<R: Rng + ?Sized>(rng: &mut R) -> BTreeMap<String, MarketIndex> {
    let specs = [
        ("SP500", "S&P 500", 4150.48, 20.0, 30.0),
        ("NASDAQ", "NASDAQ", 12850.22, 50.0, 40.0),
        ("DOW", "Dow Jones", 33875.40, 100.0, 200.0),
    ];

    specs
        .into_iter()
        .map(|(key, name, level, value_spread, change_spread)| {
            let value = level + rng.gen_range(-0.5..0.5) * value_spread;
            let change = rng.gen_range(-0.5..0.5) * change_spread;
            let index = MarketIndex {
                name:           name.to_string(),
                value:          round_cents(value),
                change:         round_cents(change),
                change_percent: round_cents(change / (value - change) * 100.0),
            };
            (key.to_string(), index)
        })
        .collect()
}

// ─── News ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: u32,
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub related_symbols: Vec<String>,
}

/// Canned headlines, newest first, timestamped relative to `now`.
pub fn news_feed(now: DateTime<Utc>) -> Vec<NewsItem> {
    let items: [(&str, &str, &str, i64, &str, &[&str]); 5] = [
        ("Tech Stocks Rally on AI Optimism",
         "Major technology companies see significant gains as investors bet on artificial intelligence growth.",
         "Market Watch", 30, "Technology", &["AAPL", "GOOGL", "MSFT", "NVDA"]),
        ("Federal Reserve Signals Potential Rate Changes",
         "Fed officials hint at monetary policy adjustments in upcoming meetings amid economic data.",
         "Financial Times", 120, "Economy", &[]),
        ("Electric Vehicle Sales Surge in Q4",
         "EV manufacturers report strong quarterly sales, boosting investor confidence in the sector.",
         "Auto News", 240, "Automotive", &["TSLA"]),
        ("Cloud Computing Revenue Growth Accelerates",
         "Major cloud providers report accelerating growth in enterprise adoption and revenue.",
         "Tech Daily", 360, "Technology", &["MSFT", "GOOGL"]),
        ("Market Volatility Expected Amid Earnings Season",
         "Analysts predict increased market volatility as major companies report quarterly earnings.",
         "Investment Weekly", 480, "Markets", &["AAPL", "GOOGL", "MSFT", "TSLA", "NVDA"]),
    ];

    items
        .into_iter()
        .zip(1u32..)
        .map(|((headline, summary, source, minutes_ago, category, related), id)| NewsItem {
            id,
            headline:        headline.to_string(),
            summary:         summary.to_string(),
            source:          source.to_string(),
            published_at:    now - Duration::minutes(minutes_ago),
            category:        category.to_string(),
            related_symbols: related.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}
