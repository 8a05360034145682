//! # market::analytics
//!
//! Small statistics over the in-memory table: rounding, trend, volatility,
//! sector aggregation and the mover lists shown on the overview page.

use serde::Serialize;

use crate::market::MarketTable;
use crate::models::StockRow;

/// Round to two decimal places (cents for prices, hundredths for percents).
#[inline]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `(new - old) / old * 100`, or `0.0` when `old` is zero.
pub fn percentage_change(old: f64, new: f64) -> f64 {
    if old == 0.0 {
        return 0.0;
    }
    (new - old) / old * 100.0
}

/// Relative move from first to last price.  `0.0` with fewer than two points.
pub fn trend(prices: &[f64]) -> f64 {
    match (prices.first(), prices.last()) {
        (Some(&first), Some(&last)) if prices.len() >= 2 && first != 0.0 => (last - first) / first,
        _ => 0.0,
    }
}

/// Population standard deviation of simple returns.  `0.0` with fewer than
/// two points.
pub fn volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

// ─── Sector Performance ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorPerformance {
    pub sector: String,
    pub stock_count: usize,
    pub average_price: f64,
    pub average_change: f64,
    pub average_change_percent: f64,
    pub top_stock: StockRow,
    pub total_market_cap: u64,
}

/// One entry per sector, best average % change first.
pub fn sector_performance(table: &MarketTable) -> Vec<SectorPerformance> {
    let mut groups: Vec<(String, Vec<StockRow>, u64)> = Vec::new();

    for (company, _) in table.listings() {
        let Some(row) = table.row(&company.symbol) else { continue };
        match groups.iter_mut().find(|(s, _, _)| *s == company.sector) {
            Some((_, rows, cap)) => {
                rows.push(row);
                *cap += company.market_cap;
            }
            None => groups.push((company.sector.clone(), vec![row], company.market_cap)),
        }
    }

    let mut sectors: Vec<SectorPerformance> = groups
        .into_iter()
        .filter_map(|(sector, rows, total_market_cap)| {
            let n = rows.len() as f64;
            let average_price = rows.iter().map(|r| r.current_price).sum::<f64>() / n;
            let average_change = rows.iter().map(|r| r.change).sum::<f64>() / n;
            let average_change_percent = rows.iter().map(|r| r.change_percent).sum::<f64>() / n;
            let top_stock = rows
                .iter()
                .max_by(|a, b| a.change_percent.total_cmp(&b.change_percent))?
                .clone();

            Some(SectorPerformance {
                sector,
                stock_count: rows.len(),
                average_price: round_cents(average_price),
                average_change: round_cents(average_change),
                average_change_percent: round_cents(average_change_percent),
                top_stock,
                total_market_cap,
            })
        })
        .collect();

    sectors.sort_by(|a, b| b.average_change_percent.total_cmp(&a.average_change_percent));
    sectors
}

// ─── Market Summary & Movers ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub total_stocks: usize,
    pub gainers: usize,
    pub losers: usize,
    pub unchanged: usize,
    /// Mean of every symbol's last % change.
    pub average_change: f64,
}

pub fn market_summary(table: &MarketTable) -> MarketSummary {
    let rows = table.rows();
    let average_change = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.change_percent).sum::<f64>() / rows.len() as f64
    };

    MarketSummary {
        total_stocks: rows.len(),
        gainers:      rows.iter().filter(|r| r.change > 0.0).count(),
        losers:       rows.iter().filter(|r| r.change < 0.0).count(),
        unchanged:    rows.iter().filter(|r| r.change == 0.0).count(),
        average_change: round_cents(average_change),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movers {
    pub top_gainers: Vec<StockRow>,
    pub top_losers: Vec<StockRow>,
    pub most_active: Vec<StockRow>,
}

/// Up to `limit` rows per list.  Symbols with zero change are neither gainers
/// nor losers.
pub fn movers(table: &MarketTable, limit: usize) -> Movers {
    let rows = table.rows();

    let mut top_gainers: Vec<StockRow> = rows.iter().filter(|r| r.change > 0.0).cloned().collect();
    top_gainers.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
    top_gainers.truncate(limit);

    let mut top_losers: Vec<StockRow> = rows.iter().filter(|r| r.change < 0.0).cloned().collect();
    top_losers.sort_by(|a, b| a.change_percent.total_cmp(&b.change_percent));
    top_losers.truncate(limit);

    let mut most_active = rows;
    most_active.sort_by(|a, b| b.volume.cmp(&a.volume));
    most_active.truncate(limit);

    Movers { top_gainers, top_losers, most_active }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::fixtures::listing;

    fn table_with(entries: &[(&str, &str, f64, f64, u64)]) -> MarketTable {
        let mut table = MarketTable::new();
        for &(sym, sector, price, pct, volume) in entries {
            let (c, mut s) = listing(sym, sector, price);
            s.change = round_cents(price * pct / 100.0);
            s.change_percent = pct;
            s.volume = volume;
            table.insert(c, s);
        }
        table
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(185.456), 185.46);
        assert_eq!(round_cents(-1.234), -1.23);
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(100.0, 110.0), 10.0);
        assert_eq!(percentage_change(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_trend() {
        assert_eq!(trend(&[]), 0.0);
        assert_eq!(trend(&[10.0]), 0.0);
        assert!((trend(&[100.0, 90.0, 120.0]) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_volatility() {
        assert_eq!(volatility(&[5.0]), 0.0);
        // constant returns → zero deviation
        assert!(volatility(&[100.0, 110.0, 121.0]).abs() < 1e-12);
        // returns +10% and -10% → std-dev 0.1
        assert!((volatility(&[100.0, 110.0, 99.0]) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_sector_performance_groups_and_sorts() {
        let table = table_with(&[
            ("AAPL", "Technology", 100.0, 1.0, 10),
            ("MSFT", "Technology", 300.0, 3.0, 20),
            ("TSLA", "Automotive", 200.0, 5.0, 30),
        ]);
        let sectors = sector_performance(&table);

        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].sector, "Automotive");
        assert_eq!(sectors[1].sector, "Technology");
        assert_eq!(sectors[1].stock_count, 2);
        assert_eq!(sectors[1].average_price, 200.0);
        assert_eq!(sectors[1].average_change_percent, 2.0);
        assert_eq!(sectors[1].top_stock.symbol, "MSFT");
        assert_eq!(sectors[1].total_market_cap, 2_000);
    }

    #[test]
    fn test_summary_counts() {
        let table = table_with(&[
            ("AAPL", "Technology", 100.0, 1.0, 10),
            ("MSFT", "Technology", 100.0, -2.0, 20),
            ("TSLA", "Automotive", 100.0, 0.0, 30),
        ]);
        let summary = market_summary(&table);
        assert_eq!(summary.total_stocks, 3);
        assert_eq!((summary.gainers, summary.losers, summary.unchanged), (1, 1, 1));
        assert_eq!(summary.average_change, -0.33);
    }

    #[test]
    fn test_movers() {
        let table = table_with(&[
            ("AAPL", "Technology", 100.0, 1.0, 10),
            ("MSFT", "Technology", 100.0, 4.0, 5),
            ("TSLA", "Automotive", 100.0, -3.0, 30),
            ("NVDA", "Technology", 100.0, -1.0, 20),
        ]);
        let m = movers(&table, 5);
        let syms = |rows: &[StockRow]| rows.iter().map(|r| r.symbol.clone()).collect::<Vec<_>>();

        assert_eq!(syms(&m.top_gainers), vec!["MSFT", "AAPL"]);
        assert_eq!(syms(&m.top_losers), vec!["TSLA", "NVDA"]);
        assert_eq!(syms(&m.most_active), vec!["TSLA", "NVDA", "AAPL", "MSFT"]);

        assert_eq!(movers(&table, 1).most_active.len(), 1);
    }
}
