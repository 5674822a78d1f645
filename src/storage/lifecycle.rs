// Submission status lifecycle with validation

use crate::intake::Urgency;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Review status of a stored submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    New,
    Reviewing,
    Quoted,
    Accepted,
    Declined,
    InProgress,
    Completed,
    Cancelled,
}

impl SubmissionStatus {
    pub fn all() -> &'static [SubmissionStatus] {
        &[
            SubmissionStatus::New,
            SubmissionStatus::Reviewing,
            SubmissionStatus::Quoted,
            SubmissionStatus::Accepted,
            SubmissionStatus::Declined,
            SubmissionStatus::InProgress,
            SubmissionStatus::Completed,
            SubmissionStatus::Cancelled,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Reviewing => "reviewing",
            SubmissionStatus::Quoted => "quoted",
            SubmissionStatus::Accepted => "accepted",
            SubmissionStatus::Declined => "declined",
            SubmissionStatus::InProgress => "in_progress",
            SubmissionStatus::Completed => "completed",
            SubmissionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubmissionStatus::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown submission status: {}", s))
    }
}

/// Triage priority, derived from the submitted urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Priority for a raw urgency value; medium when absent or unrecognized
    pub fn from_urgency(urgency: Option<&str>) -> Self {
        match urgency.and_then(|u| u.trim().parse::<Urgency>().ok()) {
            Some(Urgency::Low) => Priority::Low,
            Some(Urgency::High) => Priority::High,
            Some(Urgency::Urgent) => Priority::Urgent,
            Some(Urgency::Medium) | None => Priority::Medium,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    #[error("Submission already in terminal status: {0}")]
    AlreadyTerminal(SubmissionStatus),
}

/// Validates if a submission can move from one status to another
pub fn can_transition(from: SubmissionStatus, to: SubmissionStatus) -> bool {
    use SubmissionStatus::*;

    match (from, to) {
        // Same status is always allowed (no-op)
        (a, b) if a == b => true,

        (New, Reviewing) | (New, Declined) | (New, Cancelled) => true,
        (Reviewing, Quoted) | (Reviewing, Declined) | (Reviewing, Cancelled) => true,
        (Quoted, Accepted) | (Quoted, Declined) | (Quoted, Cancelled) => true,
        (Accepted, InProgress) | (Accepted, Cancelled) => true,
        (InProgress, Completed) | (InProgress, Cancelled) => true,

        _ => false,
    }
}

/// Validates and performs a status transition
pub fn transition_status(
    current: SubmissionStatus,
    target: SubmissionStatus,
) -> Result<SubmissionStatus, TransitionError> {
    if current == target {
        return Ok(target);
    }
    if is_terminal(current) {
        return Err(TransitionError::AlreadyTerminal(current));
    }
    if !can_transition(current, target) {
        return Err(TransitionError::InvalidTransition {
            from: current,
            to: target,
        });
    }
    Ok(target)
}

/// Check if a status is terminal
pub fn is_terminal(status: SubmissionStatus) -> bool {
    matches!(
        status,
        SubmissionStatus::Completed | SubmissionStatus::Declined | SubmissionStatus::Cancelled
    )
}

/// Get all valid next statuses from the current one
pub fn valid_next_statuses(current: SubmissionStatus) -> Vec<SubmissionStatus> {
    SubmissionStatus::all()
        .iter()
        .copied()
        .filter(|&status| status != current && can_transition(current, status))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;

    #[test]
    fn test_happy_path() {
        let mut status = New;
        for next in [Reviewing, Quoted, Accepted, InProgress, Completed] {
            status = transition_status(status, next).unwrap();
        }
        assert_eq!(status, Completed);
    }

    #[test]
    fn test_cannot_skip_review() {
        let result = transition_status(New, Quoted);
        assert_eq!(
            result,
            Err(TransitionError::InvalidTransition {
                from: New,
                to: Quoted
            })
        );
        assert!(!can_transition(Reviewing, InProgress));
    }

    #[test]
    fn test_terminal_statuses() {
        for terminal in [Completed, Declined, Cancelled] {
            assert!(is_terminal(terminal));
            assert!(valid_next_statuses(terminal).is_empty());
            assert_eq!(
                transition_status(terminal, Reviewing),
                Err(TransitionError::AlreadyTerminal(terminal))
            );
        }
        assert!(!is_terminal(New));
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in SubmissionStatus::all() {
            assert_eq!(transition_status(*status, *status), Ok(*status));
        }
    }

    #[test]
    fn test_cancel_from_any_open_status() {
        for status in [New, Reviewing, Quoted, Accepted, InProgress] {
            assert!(can_transition(status, Cancelled));
        }
    }

    #[test]
    fn test_valid_next_statuses() {
        assert_eq!(valid_next_statuses(New), vec![Reviewing, Declined, Cancelled]);
        assert_eq!(valid_next_statuses(Accepted), vec![InProgress, Cancelled]);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&InProgress).unwrap(), "\"in_progress\"");
        assert_eq!("in_progress".parse::<SubmissionStatus>().unwrap(), InProgress);
        assert!("archived".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_priority_from_urgency() {
        assert_eq!(Priority::from_urgency(Some("urgent")), Priority::Urgent);
        assert_eq!(Priority::from_urgency(Some("low")), Priority::Low);
        assert_eq!(Priority::from_urgency(Some("flexible")), Priority::Medium);
        assert_eq!(Priority::from_urgency(None), Priority::Medium);
    }
}
