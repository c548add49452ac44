//! Error types for planner operations.

use thiserror::Error;

use crate::model::{AnnotationId, ParticipantId, TeamId};
use crate::persist::StorageError;

/// Errors surfaced by [`StateManager`](crate::state::StateManager) operations.
///
/// None of these are fatal: a failed operation leaves the state and the
/// history exactly as they were.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The roster already holds the maximum number of participants
    #[error("Maximum {max} players allowed")]
    RosterFull {
        /// The roster cap
        max: usize,
    },

    /// Snapshot text is not valid JSON for the state shape
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot parsed but its contents are inconsistent
    #[error("Invalid snapshot: {message}")]
    InvalidSnapshot {
        /// Description of the problem
        message: String,
    },

    /// Snapshot was written by a newer, incompatible version
    #[error("Snapshot version {found} is newer than supported version {supported}")]
    VersionTooNew {
        /// Version string found in the snapshot
        found: String,
        /// Version string this crate writes
        supported: String,
    },

    /// A field patch could not be applied
    #[error("Invalid patch: {message}")]
    InvalidPatch {
        /// Description of the problem
        message: String,
    },

    /// Participant id does not exist
    #[error("Participant not found: {0}")]
    UnknownParticipant(ParticipantId),

    /// Team id does not exist
    #[error("Team not found: {0}")]
    UnknownTeam(TeamId),

    /// Annotation id does not exist
    #[error("Annotation not found: {0}")]
    UnknownAnnotation(AnnotationId),

    /// Uploaded background could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error while sniffing image data
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PlannerError {
    /// Create an invalid snapshot error with a message.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Create an invalid patch error with a message.
    pub fn invalid_patch(message: impl Into<String>) -> Self {
        Self::InvalidPatch {
            message: message.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
