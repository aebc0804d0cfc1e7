//! Formatter run results and their classification
//!
//! Black reports "did anything change" only in free-form stderr text. All of
//! that parsing lives in [`classify`].

use crate::config::StatusMarkers;

/// Exit status Black uses for an internal error
pub const INTERNAL_ERROR_STATUS: i32 = 123;

/// Exit status reported for a child that was killed by a signal
pub const SIGNALLED_STATUS: i32 = -1;

/// What one formatter run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Outcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stderr as text, for notifications and logs
    #[must_use]
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// How a successful run's stderr reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Reformatted,
    Unchanged,
    /// Neither marker was found
    Unrecognized,
}

/// Classify a run from its stderr.
///
/// `unchanged` takes precedence when both markers appear.
#[must_use]
pub fn classify(stderr: &[u8], markers: &StatusMarkers) -> Classification {
    let text = String::from_utf8_lossy(stderr);
    if text.contains(&markers.unchanged) {
        Classification::Unchanged
    } else if text.contains(&markers.reformatted) {
        Classification::Reformatted
    } else {
        Classification::Unrecognized
    }
}
