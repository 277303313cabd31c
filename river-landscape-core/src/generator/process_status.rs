use serde::{Deserialize, Serialize};

/// Landscape generator processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// There is nothing left to process.
    Idle,
    /// There are stages waiting for processing.
    InProgress,
    /// Landscape was completed during last processing.
    LandscapeCompleted,
}
