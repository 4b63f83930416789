//! Per-request upload state tracking.

use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Where an upload is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// Bytes and filename arrived.
    Received,
    /// Filename, extension, and size passed validation.
    Validated,
    /// Written to scoped storage.
    Persisted,
    /// Decode, feature extraction, and inference are running.
    Processing,
    /// A result was produced.
    Succeeded,
    /// Some stage failed.
    Failed,
    /// Scoped storage has been released.
    Cleaned,
}

impl UploadState {
    /// Whether moving from `self` to `next` is a legal step.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Received, Self::Validated | Self::Failed)
                | (Self::Validated, Self::Persisted | Self::Failed)
                | (Self::Persisted, Self::Processing)
                | (Self::Processing, Self::Succeeded | Self::Failed)
                | (Self::Succeeded | Self::Failed, Self::Cleaned)
        )
    }

    /// Whether no further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cleaned)
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Persisted => "persisted",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}

/// State of one request, tagged with its id.
#[derive(Debug)]
pub struct UploadLifecycle {
    id: Uuid,
    state: UploadState,
}

impl UploadLifecycle {
    /// Start tracking a freshly received upload.
    pub fn new(id: Uuid) -> Self {
        debug!("Upload {id}: {}", UploadState::Received);
        Self {
            id,
            state: UploadState::Received,
        }
    }

    /// Request id.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state.
    pub const fn state(&self) -> UploadState {
        self.state
    }

    /// Move to `next`, logging the transition.
    pub fn advance(&mut self, next: UploadState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal upload transition {} -> {next}",
            self.state
        );
        debug!("Upload {}: {} -> {next}", self.id, self.state);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut lifecycle = UploadLifecycle::new(Uuid::new_v4());
        for next in [
            UploadState::Validated,
            UploadState::Persisted,
            UploadState::Processing,
            UploadState::Succeeded,
            UploadState::Cleaned,
        ] {
            lifecycle.advance(next);
        }
        assert!(lifecycle.state().is_terminal());
    }

    #[test]
    fn test_failure_is_reachable_before_and_during_processing() {
        assert!(UploadState::Received.can_advance_to(UploadState::Failed));
        assert!(UploadState::Validated.can_advance_to(UploadState::Failed));
        assert!(UploadState::Processing.can_advance_to(UploadState::Failed));
        assert!(UploadState::Failed.can_advance_to(UploadState::Cleaned));
    }

    #[test]
    fn test_cannot_skip_cleanup_or_persistence() {
        assert!(!UploadState::Validated.can_advance_to(UploadState::Processing));
        assert!(!UploadState::Processing.can_advance_to(UploadState::Cleaned));
        assert!(!UploadState::Cleaned.can_advance_to(UploadState::Received));
        assert!(!UploadState::Succeeded.can_advance_to(UploadState::Failed));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(UploadState::Processing.to_string(), "processing");
        assert_eq!(UploadState::Cleaned.to_string(), "cleaned");
    }
}
