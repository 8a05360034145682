//! Mock market: the shared symbol table, its seed data and the read-side
//! analytics served over REST.

pub mod analytics;
pub mod forecast;
pub mod seed;
pub mod session;
pub mod table;

pub use table::MarketTable;
