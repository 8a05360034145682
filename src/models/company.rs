//! # models::company
//!
//! Static company metadata. Never mutated after seeding.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// Ticker, always upper-case, e.g. `"AAPL"`.
    pub symbol: String,
    pub name: String,
    pub sector: String,
    /// Market capitalisation in USD.
    pub market_cap: u64,
    pub description: String,
}

impl Company {
    /// Case-insensitive substring match on name or symbol.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.symbol.to_lowercase().contains(&term)
    }

    pub fn in_sector(&self, sector: &str) -> bool {
        self.sector.eq_ignore_ascii_case(sector)
    }
}
