use crate::CrawlerError;
use std::fmt;

/// Phase of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Created, no seeds submitted yet
    Idle,

    /// Fetching pages and growing the frontier
    Running,

    /// Frontier empty and no fetch in flight; waiting for queued deliveries
    Draining,

    /// Finished, either normally or by cancellation
    Done,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Cancellation may jump from any live phase straight to `Done`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
                | (Self::Idle, Self::Done)
                | (Self::Running, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current phase plus the partial-results marker
#[derive(Debug, Clone)]
pub struct RunState {
    phase: CrawlPhase,
    partial: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
            partial: false,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// True once the run was cut short by cancellation
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Moves to the next phase
    ///
    /// # Returns
    ///
    /// * `Err(CrawlerError::InvalidTransition)` - The transition is not allowed
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlerError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!(from = %self.phase, to = %next, "Crawl phase transition");
        self.phase = next;
        Ok(())
    }

    /// Jumps to `Done` and flags the results as partial
    pub fn cancel(&mut self) {
        if self.phase != CrawlPhase::Done {
            tracing::debug!(from = %self.phase, "Crawl cancelled");
            self.phase = CrawlPhase::Done;
            self.partial = true;
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_lifecycle() {
        let mut state = RunState::new();
        assert_eq!(state.phase(), CrawlPhase::Idle);

        state.transition(CrawlPhase::Running).unwrap();
        state.transition(CrawlPhase::Draining).unwrap();
        state.transition(CrawlPhase::Done).unwrap();

        assert_eq!(state.phase(), CrawlPhase::Done);
        assert!(!state.is_partial());
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        let mut state = RunState::new();
        assert!(matches!(
            state.transition(CrawlPhase::Draining),
            Err(CrawlerError::InvalidTransition { .. })
        ));

        state.transition(CrawlPhase::Running).unwrap();
        assert!(state.transition(CrawlPhase::Idle).is_err());
        assert!(state.transition(CrawlPhase::Running).is_err());
    }

    #[test]
    fn test_cancel_goes_straight_to_done() {
        let mut state = RunState::new();
        state.transition(CrawlPhase::Running).unwrap();
        state.cancel();

        assert_eq!(state.phase(), CrawlPhase::Done);
        assert!(state.is_partial());
    }

    #[test]
    fn test_cancel_after_done_keeps_complete_result() {
        let mut state = RunState::new();
        state.transition(CrawlPhase::Running).unwrap();
        state.transition(CrawlPhase::Draining).unwrap();
        state.transition(CrawlPhase::Done).unwrap();
        state.cancel();

        assert!(!state.is_partial());
    }
}
