//! True-negative hint generation.
//!
//! Every new game ships six pre-generated hints, each asserting "sector S
//! does NOT hold animal A". The multiset of asserted animals is fixed —
//! three vulture, two leopard, one zebra — and the six sectors are pairwise
//! distinct, so the hints prune the search space without ever pointing at
//! the board directly.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::ring::N_SECTORS;
use crate::solver::{Animal, Solution};

/// Number of hints generated per game.
pub const HINT_COUNT: usize = 6;

/// The fixed multiset of asserted animals.
pub const HINT_ANIMALS: [Animal; HINT_COUNT] = [
    Animal::Vulture,
    Animal::Vulture,
    Animal::Vulture,
    Animal::Leopard,
    Animal::Leopard,
    Animal::Zebra,
];

/// A single true-negative assertion: `solution[sector] != animal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub animal: Animal,
    pub sector: usize,
}

/// Draw the hint set for `solution`.
///
/// Each asserted animal is paired with a uniformly random sector whose true
/// occupant differs, never reusing a sector. Running out of eligible
/// sectors aborts game creation — the caller must not retry with the same
/// solution.
pub fn generate_hints(
    solution: &Solution,
    rng: &mut impl Rng,
) -> Result<Vec<Hint>, GenerationError> {
    let mut wanted = HINT_ANIMALS;
    wanted.shuffle(rng);

    let mut reserved = [false; N_SECTORS];
    let mut hints = Vec::with_capacity(HINT_COUNT);
    for animal in wanted {
        let candidates: Vec<usize> = (0..N_SECTORS)
            .filter(|&s| !reserved[s] && solution.0[s] != animal)
            .collect();
        let Some(&sector) = candidates.choose(rng) else {
            return Err(GenerationError::HintsExhausted);
        };
        reserved[sector] = true;
        hints.push(Hint { animal, sector });
    }
    Ok(hints)
}
