//! Domain models shared across the dashboard backend.

pub mod company;
pub mod prediction;
pub mod stock;

pub use company::Company;
pub use prediction::{AccuracyReport, Outlook, Prediction};
pub use stock::{HistoryBar, HistoryPeriod, StockRow, TrackedSymbol};
