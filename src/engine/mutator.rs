//! # engine::mutator
//!
//! **Price Mutator**: one call to [`PriceMutator::tick`] is one step of the
//! random walk for every symbol in the table:
//!
//! 1. draw δ uniformly from `[-band, +band]`
//! 2. `new = round_cents(old × (1 + δ))`, floored at one cent
//! 3. record absolute and percentage change against `old`
//! 4. append a flat bar (wicks at ±1%) and evict down to the window
//!
//! The RNG and clock are parameters so tests can pin both.

use std::ops::Range;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::events::{PricePayload, PriceUpdate};
use crate::market::analytics::{percentage_change, round_cents};
use crate::market::MarketTable;
use crate::models::HistoryBar;

/// Prices never round below one cent.
pub const MIN_PRICE: f64 = 0.01;

/// High / low of a tick bar sit this far from the close.
const WICK: f64 = 0.01;

const TICK_VOLUME: Range<u64> = 5_000_000..15_000_000;

#[derive(Debug, Clone)]
pub struct PriceMutator {
    /// Fractional band, `0.01` = ±1%.
    band: f64,
    window: usize,
}

impl PriceMutator {
    /// `band_pct` is in percent (`1.0` = ±1%); `window` is the max bars kept.
    pub fn new(band_pct: f64, window: usize) -> Self {
        Self {
            band:   band_pct.abs() / 100.0,
            window: window.max(1),
        }
    }

    /// Advance every symbol one step.  Returns one update per symbol; an empty
    /// table yields an empty vec.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        table: &mut MarketTable,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Vec<PriceUpdate> {
        table
            .symbols_mut()
            .map(|stock| {
                let old = stock.current_price;
                let delta = rng.gen_range(-self.band..=self.band);
                let new = round_cents(old * (1.0 + delta)).max(MIN_PRICE);

                stock.current_price = new;
                stock.change = round_cents(new - old);
                stock.change_percent = round_cents(percentage_change(old, new));

                let volume = rng.gen_range(TICK_VOLUME);
                stock.volume = volume;
                stock.week_high = stock.week_high.max(new);
                stock.week_low = stock.week_low.min(new);

                let bar = HistoryBar::new(
                    now,
                    new,
                    round_cents(new * (1.0 + WICK)),
                    round_cents(new * (1.0 - WICK)),
                    new,
                    volume,
                );
                stock.push_bar(bar, self.window);

                PriceUpdate {
                    symbol: stock.symbol.clone(),
                    data: PricePayload {
                        current_price:  stock.current_price,
                        change:         stock.change,
                        change_percent: stock.change_percent,
                        volume,
                        timestamp:      now,
                    },
                }
            })
            .collect()
    }
}
