use std::{fmt::Write as _, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece seed: expected 32 hex characters")]
pub struct ParsePieceSeedError;

/// Seed for deterministic piece generation.
///
/// A 128-bit (16-byte) seed initializing the random number generator for
/// piece selection. The same seed produces the same piece sequence, enabling
/// reproducible gameplay for debugging and deterministic testing.
#[derive(Debug, Clone, Copy)]
pub struct PieceSeed([u8; 16]);

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParsePieceSeedError);
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParsePieceSeedError)?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("{e}: '{hex_str}'")))
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Supplies the session with random pieces.
///
/// Every draw is an independent uniform choice among the seven kinds; there
/// is no bag and no fairness guarantee, so droughts and repeats can occur.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    ///
    /// For a deterministic piece sequence, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but seeded for a deterministic sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Draws the next piece kind.
    pub fn next_kind(&mut self) -> PieceKind {
        self.rng.random()
    }
}
