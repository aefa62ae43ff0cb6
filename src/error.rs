/// Errors that can stop the card from starting or drawing.
///
/// The card logic itself never fails; these cover the terminal and the
/// command-line target only. Config file problems are logged and defaulted.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid target date-time {value:?} (expected YYYY-MM-DDTHH:MM:SS)")]
    InvalidTarget {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Wall-clock time skipped by a DST change.
    #[error("target {0} does not exist in the local timezone")]
    NonexistentTarget(String),
}
