//! # market::table
//!
//! [`MarketTable`] owns every company and its live [`TrackedSymbol`].  It is
//! the single piece of shared market state: the price feed writes it, the
//! REST handlers read it, both through the `RwLock` in
//! [`crate::state::AppState`].

use std::collections::HashMap;

use crate::models::{Company, StockRow, TrackedSymbol};

#[derive(Debug, Clone, Default)]
pub struct MarketTable {
    /// Seed order; list endpoints follow it.
    companies: Vec<Company>,
    symbols: HashMap<String, TrackedSymbol>,
}

impl MarketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company with its live quote.  Re-inserting a symbol
    /// replaces both.
    pub fn insert(&mut self, company: Company, tracked: TrackedSymbol) {
        self.companies.retain(|c| c.symbol != company.symbol);
        self.symbols.insert(company.symbol.clone(), tracked);
        self.companies.push(company);
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn company(&self, symbol: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.symbol == symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&TrackedSymbol> {
        self.symbols.get(symbol)
    }

    /// Every live quote, in no particular order.
    pub fn symbols_mut(&mut self) -> impl Iterator<Item = &mut TrackedSymbol> {
        self.symbols.values_mut()
    }

    /// `(company, quote)` pairs in seed order.
    pub fn listings(&self) -> impl Iterator<Item = (&Company, &TrackedSymbol)> {
        self.companies
            .iter()
            .filter_map(|c| self.symbols.get(&c.symbol).map(|s| (c, s)))
    }

    pub fn row(&self, symbol: &str) -> Option<StockRow> {
        let company = self.company(symbol)?;
        let stock = self.get(symbol)?;
        Some(to_row(company, stock))
    }

    pub fn rows(&self) -> Vec<StockRow> {
        self.listings().map(|(c, s)| to_row(c, s)).collect()
    }
}

fn to_row(company: &Company, stock: &TrackedSymbol) -> StockRow {
    StockRow {
        symbol:         stock.symbol.clone(),
        name:           company.name.clone(),
        current_price:  stock.current_price,
        change:         stock.change,
        change_percent: stock.change_percent,
        volume:         stock.volume,
    }
}
