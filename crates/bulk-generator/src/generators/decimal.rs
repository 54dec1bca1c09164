//! Fixed-point decimal generator.

use super::ValueGenerator;
use rand::Rng;

/// Decimals in `[0, max)` rendered with exactly two fractional digits.
///
/// Values are drawn as whole hundredths so rounding can never produce `max`
/// itself. `max` must not exceed [`MAX_NUMBER_MAX`](bulk_core::MAX_NUMBER_MAX); beyond that the
/// hundredth count no longer fits the draw exactly.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecimal {
    hundredths: u64,
}

impl FixedDecimal {
    pub fn new(max: f64) -> Self {
        let hundredths = (max * 100.0).floor().max(1.0) as u64;
        Self { hundredths }
    }
}

impl ValueGenerator for FixedDecimal {
    fn generate<R: Rng>(&self, rng: &mut R) -> String {
        let value = rng.random_range(0..self.hundredths);
        format!("{}.{:02}", value / 100, value % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_fixed_decimal() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = FixedDecimal::new(100.0);

        for _ in 0..1000 {
            let value = generator.generate(&mut rng);
            let (whole, fraction) = value.split_once('.').unwrap();
            assert_eq!(fraction.len(), 2);
            assert!(!whole.is_empty());

            let parsed: f64 = value.parse().unwrap();
            assert!((0.0..100.0).contains(&parsed));
        }
    }

    #[test]
    fn test_largest_max_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let generator = FixedDecimal::new(bulk_core::MAX_NUMBER_MAX);
        assert_eq!(generator.hundredths, 100_000_000_000_000_000);

        for _ in 0..100 {
            let value = generator.generate(&mut rng);
            let (whole, fraction) = value.split_once('.').unwrap();
            assert_eq!(fraction.len(), 2);
            assert!(whole.parse::<u64>().unwrap() < 1_000_000_000_000_000);
        }
    }

    #[test]
    fn test_tiny_max_still_generates() {
        let mut rng = StdRng::seed_from_u64(42);
        let generator = FixedDecimal::new(0.001);
        assert_eq!(generator.generate(&mut rng), "0.00");
    }
}
