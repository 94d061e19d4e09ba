//! Unified error types for the game core.
//!
//! Command failures are split by how the processor must react: malformed
//! input and rule violations reject the command without touching state,
//! generation failures abort game creation, and storage failures surface
//! the adapter's own error. All of them are converted to a structured,
//! non-throwing result at the processor boundary so a bad command can
//! never stall the queue.

use std::fmt;

use crate::app::ports::StorageError;

// ---------------------------------------------------------------------------
// Command-level errors
// ---------------------------------------------------------------------------

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Malformed fields (non-finite coordinates, wrong guess length).
    /// Rejected before any rule is consulted; no state change.
    Invalid(String),
    /// Well-formed but forbidden by the current rules (wrong status,
    /// fogged sector, non-contiguous selection, ...). No state change.
    Rejected(String),
    /// Solver or hint generation exhausted its budget; game creation
    /// aborted. A fresh NEW_GAME may be attempted.
    Generation(GenerationError),
    /// The storage adapter failed; the command's transaction rolled back.
    Storage(StorageError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) | Self::Rejected(msg) => write!(f, "{msg}"),
            Self::Generation(e) => write!(f, "{e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl From<GenerationError> for CommandError {
    fn from(e: GenerationError) -> Self {
        Self::Generation(e)
    }
}

impl From<StorageError> for CommandError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Generation errors
// ---------------------------------------------------------------------------

/// Fatal failures from board or hint generation.
///
/// Both indicate a configuration defect (impossible rule set), not bad
/// luck — callers abort the current game creation and do not retry
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationError {
    /// The constructive search never produced a valid board.
    RetriesExhausted { attempts: u32 },
    /// No eligible sector remained for a hint.
    HintsExhausted,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts } => {
                write!(f, "failed to generate a board after {attempts} attempts")
            }
            Self::HintsExhausted => write!(f, "no eligible sector remained for a hint"),
        }
    }
}

impl std::error::Error for GenerationError {}
