//! Work item state definitions for tracking retry progress
//!
//! Every URL taken from the sitemap is a work item that moves through these
//! states across the retry passes.

use crate::ScribeError;
use std::fmt;

/// Represents the current state of a URL in the retry passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkState {
    // ===== Active States =====
    /// Waiting to be attempted in the current pass
    Pending,

    /// Attempted in the current pass and failed; retried next pass if any remain
    FailedThisPass,

    // ===== Terminal States =====
    /// Scraped and persisted
    Succeeded,

    /// Still failing after the final pass
    PermanentlyFailed,
}

impl WorkState {
    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: WorkState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Succeeded)
                | (Self::Pending, Self::FailedThisPass)
                | (Self::FailedThisPass, Self::Pending)
                | (Self::FailedThisPass, Self::PermanentlyFailed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::FailedThisPass => "failed_this_pass",
            Self::Succeeded => "succeeded",
            Self::PermanentlyFailed => "permanently_failed",
        }
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A URL moving through the retry passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    state: WorkState,
    attempts: u32,
    last_error: Option<String>,
}

impl WorkItem {
    /// Creates a pending work item for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: WorkState::Pending,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> WorkState {
        self.state
    }

    /// Number of fetch attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Reason recorded for the most recent failed attempt
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Records a successful attempt
    pub fn succeed(&mut self) -> Result<(), ScribeError> {
        self.transition(WorkState::Succeeded)?;
        self.attempts += 1;
        self.last_error = None;
        Ok(())
    }

    /// Records a failed attempt along with its reason
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), ScribeError> {
        self.transition(WorkState::FailedThisPass)?;
        self.attempts += 1;
        self.last_error = Some(reason.into());
        Ok(())
    }

    /// Puts a failed item back in line for the next pass
    pub fn requeue(&mut self) -> Result<(), ScribeError> {
        self.transition(WorkState::Pending)
    }

    /// Gives up on a failed item once the pass budget is spent
    pub fn abandon(&mut self) -> Result<(), ScribeError> {
        self.transition(WorkState::PermanentlyFailed)
    }

    fn transition(&mut self, next: WorkState) -> Result<(), ScribeError> {
        if !self.state.can_transition_to(next) {
            return Err(ScribeError::InvalidTransition {
                url: self.url.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_successors() {
        let all = [
            WorkState::Pending,
            WorkState::FailedThisPass,
            WorkState::Succeeded,
            WorkState::PermanentlyFailed,
        ];
        for terminal in [WorkState::Succeeded, WorkState::PermanentlyFailed] {
            for next in all {
                assert!(
                    !terminal.can_transition_to(next),
                    "{} -> {} should be rejected",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", WorkState::Pending), "pending");
        assert_eq!(
            format!("{}", WorkState::PermanentlyFailed),
            "permanently_failed"
        );
    }

    #[test]
    fn test_retry_lifecycle() {
        let mut item = WorkItem::new("https://x.com/p1");
        assert_eq!(item.state(), WorkState::Pending);

        item.fail("timeout").unwrap();
        assert_eq!(item.state(), WorkState::FailedThisPass);
        assert_eq!(item.last_error(), Some("timeout"));

        item.requeue().unwrap();
        item.succeed().unwrap();
        assert_eq!(item.state(), WorkState::Succeeded);
        assert_eq!(item.attempts(), 2);
        assert_eq!(item.last_error(), None);
    }

    #[test]
    fn test_abandon_after_failure() {
        let mut item = WorkItem::new("https://x.com/p2");
        item.fail("no content").unwrap();
        item.abandon().unwrap();

        assert_eq!(item.state(), WorkState::PermanentlyFailed);
        assert_eq!(item.attempts(), 1);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut item = WorkItem::new("https://x.com/p3");
        item.succeed().unwrap();

        let err = item.fail("late failure").unwrap_err();
        assert!(matches!(
            err,
            ScribeError::InvalidTransition {
                from: WorkState::Succeeded,
                to: WorkState::FailedThisPass,
                ..
            }
        ));
        assert_eq!(item.state(), WorkState::Succeeded);
    }

    #[test]
    fn test_pending_cannot_be_abandoned() {
        let mut item = WorkItem::new("https://x.com/p4");
        assert!(item.abandon().is_err());
    }
}
