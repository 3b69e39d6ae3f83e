use thiserror::Error;

use crate::core::store::{LookupError, StorageError};

/// Errors surfaced by the rating/match/messaging lifecycle.
///
/// Authorization failures are reported as `NotFound` so a non-participant
/// cannot learn whether a match exists at all.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MatchNotActive(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("directory error: {0}")]
    Directory(String),
}

impl From<LookupError> for CoreError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(id) => CoreError::NotFound(format!("user not found with id: {id}")),
            LookupError::Transport(msg) => CoreError::Directory(msg),
        }
    }
}

impl CoreError {
    pub fn match_not_found(match_id: uuid::Uuid) -> Self {
        CoreError::NotFound(format!("match not found with id: {match_id}"))
    }

    /// The deliberately vague variant used when a caller is not a
    /// participant of an existing match.
    pub fn access_denied() -> Self {
        CoreError::NotFound("match not found or access denied".to_string())
    }
}
