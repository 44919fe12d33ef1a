// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator functions over a slice of closes. Anything
// that can lack history returns `Option` (or an aligned `Vec<Option<_>>`) so
// callers must handle the undefined case.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::latest_ema;
pub use macd::{latest_macd, MacdValue};
pub use rsi::{latest_rsi, rsi_series};
