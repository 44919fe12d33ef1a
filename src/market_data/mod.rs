pub mod price_series;
pub mod provider;
pub mod yahoo;

pub use price_series::{round2, PricePoint, PriceSeries};
pub use provider::{fetch_with_fallback, MarketDataProvider};
pub use yahoo::YahooChartClient;
