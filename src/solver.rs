//! Hidden-board generation and validation.
//!
//! A board assigns one animal to each of the 13 sectors under a fixed rule
//! set (counts, oak habitat, leopard spacing, vulture direction, zebra
//! herding). Generation is a randomised constructive search: place the
//! constrained species first, retry the whole attempt on any dead end, and
//! run the full validator over every candidate before accepting it. The
//! search space is small enough that the retry budget is effectively never
//! reached on a sane configuration — exhausting it means the rules
//! themselves are broken.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::GenerationError;
use crate::ring::{N_SECTORS, ccw_neighbor, cw_neighbor, ring_dist, wrap};

/// Species that can occupy a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Animal {
    Oak,
    Leopard,
    Zebra,
    Vulture,
    Aardwolf,
}

impl Animal {
    pub const ALL: [Animal; 5] = [
        Animal::Oak,
        Animal::Leopard,
        Animal::Zebra,
        Animal::Vulture,
        Animal::Aardwolf,
    ];

    /// How many sectors this species occupies on a valid board.
    pub fn quota(self) -> usize {
        match self {
            Animal::Oak | Animal::Leopard => 3,
            Animal::Zebra => 4,
            Animal::Vulture => 2,
            Animal::Aardwolf => 1,
        }
    }

    /// Whether a survey may query this species. The aardwolf is the prize —
    /// it can only be found by deduction.
    pub fn is_surveyable(self) -> bool {
        !matches!(self, Animal::Aardwolf)
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Animal::Oak => write!(f, "oak"),
            Animal::Leopard => write!(f, "leopard"),
            Animal::Zebra => write!(f, "zebra"),
            Animal::Vulture => write!(f, "vulture"),
            Animal::Aardwolf => write!(f, "aardwolf"),
        }
    }
}

/// Sectors where oaks may grow (0-based ring indices).
pub const OAK_ALLOWED: [usize; 6] = [0, 2, 4, 7, 9, 12];

/// Minimum cyclic distance between any two leopards.
pub const LEOPARD_MIN_DIST: usize = 3;

/// Retry budget for the constructive search.
pub const MAX_GENERATION_ATTEMPTS: u32 = 150_000;

/// A complete sector→animal assignment.
///
/// Serialises as a plain 13-element array of animal names, index = sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution(pub [Animal; N_SECTORS]);

impl Solution {
    /// Sectors occupied by `animal`, ascending.
    pub fn sectors_of(&self, animal: Animal) -> Vec<usize> {
        (0..N_SECTORS).filter(|&i| self.0[i] == animal).collect()
    }

    /// How many sectors of `run` hold `animal`. This count is the only
    /// information a survey ever reveals.
    pub fn count_in(&self, run: &[usize], animal: Animal) -> usize {
        run.iter().filter(|&&s| self.0[s] == animal).count()
    }

    /// Check every placement rule. An empty result means the board is valid.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for animal in Animal::ALL {
            let found = self.sectors_of(animal).len();
            if found != animal.quota() {
                violations.push(Violation::Count {
                    animal,
                    expected: animal.quota(),
                    found,
                });
            }
        }

        for &sector in &self.sectors_of(Animal::Oak) {
            if !OAK_ALLOWED.contains(&sector) {
                violations.push(Violation::OakOutOfBounds { sector });
            }
        }

        let leopards = self.sectors_of(Animal::Leopard);
        for (i, &a) in leopards.iter().enumerate() {
            for &b in &leopards[i + 1..] {
                if ring_dist(a, b) < LEOPARD_MIN_DIST {
                    violations.push(Violation::LeopardsTooClose { a, b });
                }
            }
        }

        let vultures = self.sectors_of(Animal::Vulture);
        if vultures.len() == 2 {
            // A vulture shadows a leopard from one side; both must shadow
            // from the same side.
            let cw_of_leopard = |v: usize| self.0[ccw_neighbor(v)] == Animal::Leopard;
            let ccw_of_leopard = |v: usize| self.0[cw_neighbor(v)] == Animal::Leopard;
            let both_cw = cw_of_leopard(vultures[0]) && cw_of_leopard(vultures[1]);
            let both_ccw = ccw_of_leopard(vultures[0]) && ccw_of_leopard(vultures[1]);
            if !(both_cw || both_ccw) {
                violations.push(Violation::VultureDirection);
            }
        }

        let zebras = self.sectors_of(Animal::Zebra);
        if zebras.len() == 4 {
            for &z in &zebras {
                let has_neighbor =
                    zebras.contains(&cw_neighbor(z)) || zebras.contains(&ccw_neighbor(z));
                if !has_neighbor {
                    violations.push(Violation::ZebraIsolated { sector: z });
                }
            }
            let mut sizes: Vec<usize> = cyclic_components(&zebras)
                .iter()
                .map(|c| c.len())
                .collect();
            sizes.sort_unstable();
            if sizes != [4] && sizes != [2, 2] {
                violations.push(Violation::ZebraGrouping { sizes });
            }
        }

        violations
    }
}

/// A single rule breach found by [`Solution::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Wrong number of sectors for a species.
    Count {
        animal: Animal,
        expected: usize,
        found: usize,
    },
    /// An oak outside its allowed habitat.
    OakOutOfBounds { sector: usize },
    /// Two leopards closer than [`LEOPARD_MIN_DIST`].
    LeopardsTooClose { a: usize, b: usize },
    /// Vultures shadowing leopards from mixed (or no) directions.
    VultureDirection,
    /// A zebra with no zebra neighbour.
    ZebraIsolated { sector: usize },
    /// Zebra herd split into anything other than one 4-block or two 2-blocks.
    ZebraGrouping { sizes: Vec<usize> },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Count {
                animal,
                expected,
                found,
            } => write!(f, "expected {expected} {animal}, found {found}"),
            Violation::OakOutOfBounds { sector } => {
                write!(f, "oak in invalid sector {}", sector + 1)
            }
            Violation::LeopardsTooClose { a, b } => {
                write!(f, "leopards too close at {} and {}", a + 1, b + 1)
            }
            Violation::VultureDirection => write!(f, "vulture directional rule violated"),
            Violation::ZebraIsolated { sector } => {
                write!(f, "zebra at {} not adjacent to another zebra", sector + 1)
            }
            Violation::ZebraGrouping { sizes } => {
                let sizes: Vec<String> = sizes.iter().map(ToString::to_string).collect();
                write!(f, "zebra grouping invalid: {}", sizes.join(","))
            }
        }
    }
}

/// Connected components of `sectors` under cyclic adjacency.
pub fn cyclic_components(sectors: &[usize]) -> Vec<Vec<usize>> {
    let mut seen = vec![false; N_SECTORS];
    let mut components = Vec::new();
    for &start in sectors {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut stack = vec![start];
        let mut component = Vec::new();
        while let Some(v) = stack.pop() {
            component.push(v);
            for u in [ccw_neighbor(v), cw_neighbor(v)] {
                if sectors.contains(&u) && !seen[u] {
                    seen[u] = true;
                    stack.push(u);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Generate a valid hidden board.
///
/// Fails only when the retry budget runs dry, which signals a configuration
/// defect rather than bad luck — callers must treat it as fatal for this
/// game creation.
pub fn generate(rng: &mut impl Rng) -> Result<Solution, GenerationError> {
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let Some(board) = attempt(rng) else {
            continue;
        };
        let solution = Solution(board);
        if solution.validate().is_empty() {
            return Ok(solution);
        }
    }
    Err(GenerationError::RetriesExhausted {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

/// One constructive attempt. `None` on any dead end.
fn attempt(rng: &mut impl Rng) -> Option<[Animal; N_SECTORS]> {
    let mut board: [Option<Animal>; N_SECTORS] = [None; N_SECTORS];

    place_zebras(&mut board, rng)?;
    let leopards = place_leopards(&mut board, rng)?;
    place_vultures(&mut board, &leopards, rng)?;
    place_oaks(&mut board, rng)?;

    // Exactly one sector must remain for the aardwolf.
    let open = open_sectors(&board);
    let &[den] = open.as_slice() else {
        return None;
    };
    board[den] = Some(Animal::Aardwolf);

    let mut full = [Animal::Aardwolf; N_SECTORS];
    for (i, slot) in board.iter().enumerate() {
        full[i] = (*slot)?;
    }
    Some(full)
}

fn open_sectors(board: &[Option<Animal>; N_SECTORS]) -> Vec<usize> {
    (0..N_SECTORS).filter(|&i| board[i].is_none()).collect()
}

/// Place the zebra herd using a randomly preferred topology: one block of
/// four, or two disjoint blocks of two.
fn place_zebras(board: &mut [Option<Animal>; N_SECTORS], rng: &mut impl Rng) -> Option<()> {
    let mut modes = [ZebraMode::Quad, ZebraMode::Pairs];
    modes.shuffle(rng);
    for mode in modes {
        let placed = match mode {
            ZebraMode::Quad => place_zebra_quad(board, rng),
            ZebraMode::Pairs => place_zebra_pairs(board, rng),
        };
        if placed {
            return Some(());
        }
    }
    None
}

#[derive(Clone, Copy)]
enum ZebraMode {
    Quad,
    Pairs,
}

fn place_zebra_quad(board: &mut [Option<Animal>; N_SECTORS], rng: &mut impl Rng) -> bool {
    let mut starts: Vec<usize> = (0..N_SECTORS).collect();
    starts.shuffle(rng);
    for s in starts {
        let block: Vec<usize> = (0..4).map(|k| wrap(s as isize + k)).collect();
        if block.iter().all(|&i| board[i].is_none()) {
            for i in block {
                board[i] = Some(Animal::Zebra);
            }
            return true;
        }
    }
    false
}

fn place_zebra_pairs(board: &mut [Option<Animal>; N_SECTORS], rng: &mut impl Rng) -> bool {
    let pairs: Vec<[usize; 2]> = (0..N_SECTORS)
        .map(|s| [s, cw_neighbor(s)])
        .filter(|p| p.iter().all(|&i| board[i].is_none()))
        .collect();

    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.shuffle(rng);
    for (oi, &i) in order.iter().enumerate() {
        for &j in &order[oi + 1..] {
            let all = [pairs[i][0], pairs[i][1], pairs[j][0], pairs[j][1]];
            let mut distinct = all.to_vec();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() != 4 {
                continue;
            }
            // The two pairs must stay disjoint blocks — adjacent pairs
            // would merge into a 4-run handled by the quad mode instead.
            let mut sizes: Vec<usize> = cyclic_components(&distinct)
                .iter()
                .map(|c| c.len())
                .collect();
            sizes.sort_unstable();
            if sizes != [2, 2] {
                continue;
            }
            for s in distinct {
                board[s] = Some(Animal::Zebra);
            }
            return true;
        }
    }
    false
}

/// Greedy random leopard placement honouring the pairwise spacing rule.
fn place_leopards(
    board: &mut [Option<Animal>; N_SECTORS],
    rng: &mut impl Rng,
) -> Option<Vec<usize>> {
    let mut open = open_sectors(board);
    open.shuffle(rng);

    let mut leopards: Vec<usize> = Vec::with_capacity(3);
    for idx in open {
        if leopards.len() == 3 {
            break;
        }
        if leopards.iter().all(|&l| ring_dist(l, idx) >= LEOPARD_MIN_DIST) {
            leopards.push(idx);
            board[idx] = Some(Animal::Leopard);
        }
    }
    (leopards.len() == 3).then_some(leopards)
}

/// Both vultures sit on the same side of some leopard: pick a direction
/// that still offers two distinct open candidate sectors.
fn place_vultures(
    board: &mut [Option<Animal>; N_SECTORS],
    leopards: &[usize],
    rng: &mut impl Rng,
) -> Option<()> {
    let mut cw: Vec<usize> = Vec::new();
    let mut ccw: Vec<usize> = Vec::new();
    for &l in leopards {
        let c = cw_neighbor(l);
        if board[c].is_none() && !cw.contains(&c) {
            cw.push(c);
        }
        let c = ccw_neighbor(l);
        if board[c].is_none() && !ccw.contains(&c) {
            ccw.push(c);
        }
    }

    let use_cw = match (cw.len() >= 2, ccw.len() >= 2) {
        (false, false) => return None,
        (true, false) => true,
        (false, true) => false,
        (true, true) => rng.gen_bool(0.5),
    };
    let pool = if use_cw { &mut cw } else { &mut ccw };
    pool.shuffle(rng);
    for &sector in pool.iter().take(2) {
        board[sector] = Some(Animal::Vulture);
    }
    Some(())
}

fn place_oaks(board: &mut [Option<Animal>; N_SECTORS], rng: &mut impl Rng) -> Option<()> {
    let mut slots: Vec<usize> = OAK_ALLOWED
        .iter()
        .copied()
        .filter(|&i| board[i].is_none())
        .collect();
    if slots.len() < 3 {
        return None;
    }
    slots.shuffle(rng);
    for &sector in slots.iter().take(3) {
        board[sector] = Some(Animal::Oak);
    }
    Some(())
}
