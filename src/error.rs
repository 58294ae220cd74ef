use thiserror::Error;

use crate::models::StoryId;

/// Why a load cycle failed.
///
/// Transport failures, bad HTTP statuses and malformed JSON all collapse into
/// the variant of the stage that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("unable to load story list: {reason}")]
    Ids { reason: String },

    #[error("unable to load story details (item {id}): {reason}")]
    Details { id: StoryId, reason: String },
}

impl FetchError {
    pub fn ids(err: impl std::fmt::Display) -> Self {
        FetchError::Ids {
            reason: err.to_string(),
        }
    }

    pub fn details(id: StoryId, err: impl std::fmt::Display) -> Self {
        FetchError::Details {
            id,
            reason: err.to_string(),
        }
    }

    /// Short headline for the UI, without transport details.
    pub fn summary(&self) -> &'static str {
        match self {
            FetchError::Ids { .. } => "Unable to load story list",
            FetchError::Details { .. } => "Unable to load story details",
        }
    }
}
