pub mod countries_client;
pub mod rates_client;

pub use countries_client::{CountrySource, RestCountriesClient};
pub use rates_client::{ExchangeRateClient, RateSource};
