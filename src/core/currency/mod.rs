pub mod converter;
pub mod table;

pub use converter::{AggregateConverter, CurrencyConverter, CurrencyError, Stats as CurrencyStats};
