//! Requirement lifecycle - states and legal transitions
//!
//! States are persisted as the single-character codes `"0"`..`"4"` so that
//! existing data keeps its meaning; everywhere else they are a typed enum.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a purchase requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    /// Created, no quotation received yet
    #[default]
    Draft,
    /// At least one quotation received
    Quoted,
    /// Refused by an administrator
    Rejected,
    /// A winning quotation has been chosen
    WinnerSet,
    /// Terminal
    Closed,
}

impl RequirementState {
    /// Persisted state code
    pub fn code(&self) -> &'static str {
        match self {
            RequirementState::Draft => "0",
            RequirementState::Quoted => "1",
            RequirementState::Rejected => "2",
            RequirementState::WinnerSet => "3",
            RequirementState::Closed => "4",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(RequirementState::Draft),
            "1" => Some(RequirementState::Quoted),
            "2" => Some(RequirementState::Rejected),
            "3" => Some(RequirementState::WinnerSet),
            "4" => Some(RequirementState::Closed),
            _ => None,
        }
    }

    pub fn all() -> &'static [RequirementState] {
        &[
            RequirementState::Draft,
            RequirementState::Quoted,
            RequirementState::Rejected,
            RequirementState::WinnerSet,
            RequirementState::Closed,
        ]
    }

    /// States in which the requirement still accepts work
    pub fn is_open(&self) -> bool {
        !matches!(self, RequirementState::Rejected | RequirementState::Closed)
    }
}

impl fmt::Display for RequirementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementState::Draft => write!(f, "draft"),
            RequirementState::Quoted => write!(f, "quoted"),
            RequirementState::Rejected => write!(f, "rejected"),
            RequirementState::WinnerSet => write!(f, "winner_set"),
            RequirementState::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for RequirementState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(state) = RequirementState::from_code(s) {
            return Ok(state);
        }
        match s.to_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(RequirementState::Draft),
            "quoted" => Ok(RequirementState::Quoted),
            "rejected" => Ok(RequirementState::Rejected),
            "winner_set" | "winner" => Ok(RequirementState::WinnerSet),
            "closed" => Ok(RequirementState::Closed),
            _ => Err(format!("Unknown requirement state: {}", s)),
        }
    }
}

/// Illegal lifecycle move
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Invalid state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: RequirementState,
    pub to: RequirementState,
}

/// Check whether a requirement may move from one state to another
///
/// `Quoted -> Quoted` covers further quotations and price revisions, and
/// `WinnerSet -> WinnerSet` covers replacing the selected winner.
pub fn is_valid_transition(from: RequirementState, to: RequirementState) -> bool {
    use RequirementState::*;

    matches!(
        (from, to),
        // Quotation received
        (Draft, Quoted)
            | (Quoted, Quoted)
            // Administrator refusal
            | (Quoted, Rejected)
            // Winner selection, including re-selection
            | (Quoted, WinnerSet)
            | (Rejected, WinnerSet)
            | (WinnerSet, WinnerSet)
            // Terminal
            | (WinnerSet, Closed)
    )
}

/// Get the states reachable from the current one
pub fn allowed_transitions(current: RequirementState) -> Vec<RequirementState> {
    use RequirementState::*;

    match current {
        Draft => vec![Quoted],
        Quoted => vec![Quoted, Rejected, WinnerSet],
        Rejected => vec![WinnerSet],
        WinnerSet => vec![WinnerSet, Closed],
        Closed => vec![],
    }
}

/// Validate a transition, returning the target state
pub fn transition(
    from: RequirementState,
    to: RequirementState,
) -> Result<RequirementState, TransitionError> {
    if is_valid_transition(from, to) {
        Ok(to)
    } else {
        Err(TransitionError { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequirementState::*;

    #[test]
    fn test_valid_transitions() {
        // Forward
        assert!(is_valid_transition(Draft, Quoted));
        assert!(is_valid_transition(Quoted, WinnerSet));
        assert!(is_valid_transition(WinnerSet, Closed));

        // Side paths
        assert!(is_valid_transition(Quoted, Rejected));
        assert!(is_valid_transition(Rejected, WinnerSet));
        assert!(is_valid_transition(WinnerSet, WinnerSet));
        assert!(is_valid_transition(Quoted, Quoted));

        // Invalid
        assert!(!is_valid_transition(Draft, WinnerSet));
        assert!(!is_valid_transition(Draft, Rejected));
        assert!(!is_valid_transition(Closed, WinnerSet));
        assert!(!is_valid_transition(Rejected, Quoted));
        assert!(!is_valid_transition(WinnerSet, Quoted));
        assert!(!is_valid_transition(Quoted, Closed));
    }

    #[test]
    fn test_allowed_transitions_agree_with_rules() {
        for &from in RequirementState::all() {
            for &to in RequirementState::all() {
                assert_eq!(
                    allowed_transitions(from).contains(&to),
                    is_valid_transition(from, to),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
        assert!(allowed_transitions(Closed).is_empty());
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = transition(Closed, WinnerSet).unwrap_err();
        assert_eq!(err.to_string(), "Invalid state transition: closed -> winner_set");
    }

    #[test]
    fn test_codes_roundtrip() {
        for &state in RequirementState::all() {
            assert_eq!(RequirementState::from_code(state.code()), Some(state));
        }
        assert_eq!(RequirementState::from_code("9"), None);
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!("winner_set".parse::<RequirementState>(), Ok(WinnerSet));
        assert_eq!("winner-set".parse::<RequirementState>(), Ok(WinnerSet));
        assert_eq!("3".parse::<RequirementState>(), Ok(WinnerSet));
        assert_eq!("Draft".parse::<RequirementState>(), Ok(Draft));
        assert!("pending".parse::<RequirementState>().is_err());
    }
}
