//! Fuzz target: command wire decoding.
//!
//! Drives arbitrary byte sequences through the serde command schema and
//! asserts that decoding never panics and that every accepted command
//! survives a re-encode/re-decode round trip unchanged.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use savanna::app::commands::Command;

fuzz_target!(|data: &[u8]| {
    let Ok(command) = serde_json::from_slice::<Command>(data) else {
        return;
    };

    let encoded = serde_json::to_vec(&command).expect("accepted commands must re-encode");
    let decoded: Command =
        serde_json::from_slice(&encoded).expect("re-encoded commands must decode");

    // NaN coordinates never round-trip through JSON, so equality holds for
    // everything the decoder accepts.
    assert_eq!(command, decoded);
});
