//! Cyclic ring math and selection rules.
//!
//! The play area is a ring of [`N_SECTORS`] fixed sectors around the game
//! center. Indices are cyclic: sector 0 is adjacent to sector 12. Everything
//! in this module is pure — the command processor and the solver both lean
//! on it for neighbourhood and contiguity questions.

use heapless::Vec as FixedVec;

/// Number of sectors in the ring.
pub const N_SECTORS: usize = 13;

/// Length of the active (non-fogged) window of sectors.
pub const ACTIVE_LEN: usize = 6;

/// Largest selection / survey run the rules permit.
pub const MAX_RUN_LEN: usize = 4;

/// A short ordered list of sector indices, capped at [`MAX_RUN_LEN`].
///
/// Used both for the player's current selection and for the canonical
/// ordering of a survey run.
pub type SectorRun = FixedVec<usize, MAX_RUN_LEN>;

/// Wrap an index (possibly negative) onto the ring.
pub fn wrap(i: isize) -> usize {
    i.rem_euclid(N_SECTORS as isize) as usize
}

/// Minimum cyclic distance between two sectors.
pub fn ring_dist(a: usize, b: usize) -> usize {
    let d = a.abs_diff(b);
    d.min(N_SECTORS - d)
}

/// The clockwise neighbour of `i`.
pub fn cw_neighbor(i: usize) -> usize {
    wrap(i as isize + 1)
}

/// The counter-clockwise neighbour of `i`.
pub fn ccw_neighbor(i: usize) -> usize {
    wrap(i as isize - 1)
}

/// Whether `sector` lies inside the active window starting at `active_start`.
pub fn is_sector_active(sector: usize, active_start: usize) -> bool {
    (0..ACTIVE_LEN).any(|k| wrap(active_start as isize + k as isize) == sector)
}

/// Canonicalise a candidate selection into an ordered contiguous run.
///
/// A set of 2–4 distinct in-range indices is contiguous iff some member,
/// walked forward by `len - 1` cyclic steps, visits exactly the input set.
/// Returns that forward walk, or `None` for duplicates, bad sizes,
/// out-of-range indices, or gapped selections.
pub fn contiguous_run(sectors: &[usize]) -> Option<SectorRun> {
    let n = sectors.len();
    if !(2..=MAX_RUN_LEN).contains(&n) {
        return None;
    }
    if sectors.iter().any(|&s| s >= N_SECTORS) {
        return None;
    }
    for (i, &s) in sectors.iter().enumerate() {
        if sectors[..i].contains(&s) {
            return None;
        }
    }

    for &start in sectors {
        let mut walk = SectorRun::new();
        for k in 0..n {
            // Capacity MAX_RUN_LEN >= n, so the push cannot fail.
            let _ = walk.push(wrap(start as isize + k as isize));
        }
        if walk.iter().all(|s| sectors.contains(s)) {
            return Some(walk);
        }
    }
    None
}

/// Human-readable label for an ordered run, 1-based as shown on the map.
///
/// A run that crosses the 13→1 seam is marked `(wrap)`.
pub fn display_range(run: &[usize]) -> String {
    match (run.first(), run.last()) {
        (Some(&start), Some(&end)) => {
            if end < start {
                format!("{} to {} (wrap)", start + 1, end + 1)
            } else {
                format!("{} to {}", start + 1, end + 1)
            }
        }
        _ => "—".to_string(),
    }
}
