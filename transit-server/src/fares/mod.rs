//! Bus fare calculation.
//!
//! Sri Lankan bus fares are regulated by the National Transport Commission
//! (NTC) as a table of fare stages. A stage is a distance bracket; the
//! published fare for a stage applies to normal (non-AC) buses, and the
//! semi-luxury and AC classes are priced as fixed multiples of it.
//! Expressway services instead charge a flat fare per named route.

mod calculator;
mod error;
mod quote;
mod source;
mod table;

pub use calculator::{BusClass, FareDetails, MAX_STAGE, estimate_stage_from_distance};
pub use error::FareError;
pub use quote::{ExpresswayFare, FareQuote, QuoteError, quote};
pub use source::{FareSource, FareSourceConfig};
pub use table::{FareTable, StageFare};
