//! Individual value generators for the two producer streams.
//!
//! Every generator renders its value as text; consumers embed that text
//! verbatim into the record body.

pub mod alpha;
pub mod decimal;

pub use alpha::AlphaString;
pub use decimal::FixedDecimal;

use rand::Rng;

/// Trait for generating values.
pub trait ValueGenerator {
    /// Generate one value using the given RNG.
    fn generate<R: Rng>(&self, rng: &mut R) -> String;
}
