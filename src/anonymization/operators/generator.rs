//! Synthetic value generators

use rand::seq::index::sample;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;

/// Produces a replacement value for one occurrence of an entity
///
/// The caller supplies the request RNG, so seeding it makes generation
/// reproducible.
pub trait ValueGenerator: Send + Sync + fmt::Debug {
    /// Generate a replacement for `original`
    fn generate(&self, original: &str, rng: &mut dyn RngCore) -> String;
}

/// Dummy IBAN: two distinct random letters followed by 32 zeros
#[derive(Debug, Clone, Copy, Default)]
pub struct IbanGenerator;

impl ValueGenerator for IbanGenerator {
    fn generate(&self, _original: &str, rng: &mut dyn RngCore) -> String {
        const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut value = String::with_capacity(34);
        for i in sample(rng, LETTERS.len(), 2) {
            value.push(LETTERS[i] as char);
        }
        value.push_str(&"0".repeat(32));
        value
    }
}

/// Picks a value from a fixed list
///
/// The choice depends only on the original text, so one input always maps to
/// the same replacement across requests.
#[derive(Debug, Clone)]
pub struct ListGenerator {
    values: Vec<String>,
}

impl ListGenerator {
    /// Create a generator over `values`; returns `None` for an empty list
    pub fn new(values: Vec<String>) -> Option<Self> {
        (!values.is_empty()).then_some(Self { values })
    }
}

impl ValueGenerator for ListGenerator {
    fn generate(&self, original: &str, _rng: &mut dyn RngCore) -> String {
        let digest = Sha256::digest(original.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let index = (u64::from_be_bytes(prefix) % self.values.len() as u64) as usize;
        self.values[index].clone()
    }
}

/// Random digits with the same character count as the original
///
/// Separators (anything that is not an ASCII digit) are kept in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitsGenerator;

impl ValueGenerator for DigitsGenerator {
    fn generate(&self, original: &str, rng: &mut dyn RngCore) -> String {
        original
            .chars()
            .map(|c| {
                if c.is_ascii_digit() {
                    char::from(b'0' + rng.gen_range(0..10u8))
                } else {
                    c
                }
            })
            .collect()
    }
}
