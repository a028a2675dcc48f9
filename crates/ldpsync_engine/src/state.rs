//! Per-request phases.

use std::fmt;

/// Where one request currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Looking up (or minting) the repository location.
    Resolving,
    /// No repository resource exists yet.
    Creating,
    /// Reading both sides to decide whether to write.
    Comparing,
    /// Issuing the conditional write.
    Writing,
    /// The request achieved its goal.
    Done,
    /// A write was refused.
    Conflict,
    /// An upstream failure or missing resource ended the request.
    Failed,
}

impl SyncPhase {
    /// Returns true if moving to `next` is a legal step.
    pub fn can_transition_to(&self, next: SyncPhase) -> bool {
        use SyncPhase::*;
        match self {
            Resolving => matches!(next, Creating | Comparing | Writing | Failed),
            Creating => matches!(next, Writing | Failed),
            Comparing => matches!(next, Creating | Writing | Done | Conflict | Failed),
            Writing => matches!(next, Done | Conflict | Failed),
            Done | Conflict | Failed => false,
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Resolving => "resolving",
            SyncPhase::Creating => "creating",
            SyncPhase::Comparing => "comparing",
            SyncPhase::Writing => "writing",
            SyncPhase::Done => "done",
            SyncPhase::Conflict => "conflict",
            SyncPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases_go_nowhere() {
        for terminal in [SyncPhase::Done, SyncPhase::Conflict, SyncPhase::Failed] {
            assert!(!terminal.can_transition_to(SyncPhase::Writing));
        }
    }

    #[test]
    fn create_path() {
        assert!(SyncPhase::Resolving.can_transition_to(SyncPhase::Creating));
        assert!(SyncPhase::Creating.can_transition_to(SyncPhase::Writing));
        assert!(SyncPhase::Writing.can_transition_to(SyncPhase::Done));
    }

    #[test]
    fn writing_never_skips_back() {
        assert!(!SyncPhase::Writing.can_transition_to(SyncPhase::Comparing));
        assert!(!SyncPhase::Creating.can_transition_to(SyncPhase::Done));
        assert!(!SyncPhase::Resolving.can_transition_to(SyncPhase::Done));
    }
}
