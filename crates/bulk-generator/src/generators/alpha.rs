//! Random alphabetic string generator.

use super::ValueGenerator;
use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Fixed-length strings drawn uniformly from `[a-zA-Z]`.
#[derive(Debug, Clone, Copy)]
pub struct AlphaString {
    length: usize,
}

impl AlphaString {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl ValueGenerator for AlphaString {
    fn generate<R: Rng>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
            .collect()
    }
}
