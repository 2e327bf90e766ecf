// Re-export model modules
mod countries;
mod exchange_rates;

pub use countries::*;
pub use exchange_rates::*;
