//! Fuzz target: selection canonicalisation.
//!
//! Feeds arbitrary sector lists into `contiguous_run` and checks the
//! canonical-walk contract: an accepted run is a forward walk over exactly
//! the input set; everything else is rejected, never a panic.
//!
//! cargo fuzz run fuzz_contiguous_run

#![no_main]

use libfuzzer_sys::fuzz_target;
use savanna::ring::{contiguous_run, wrap};

fuzz_target!(|sectors: Vec<usize>| {
    let Some(run) = contiguous_run(&sectors) else {
        return;
    };

    assert_eq!(run.len(), sectors.len(), "canonical run keeps the input size");
    assert!((2..=4).contains(&run.len()));

    // Forward walk from the first element.
    for (k, &s) in run.iter().enumerate() {
        assert_eq!(s, wrap(run[0] as isize + k as isize));
    }

    // Same set as the input.
    for s in run.iter() {
        assert!(sectors.contains(s));
    }
    for s in &sectors {
        assert!(run.contains(s));
    }
});
