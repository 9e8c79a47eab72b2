//! Form state machine definitions.
//!
//! The collection flow is a linear automaton: every submission walks the
//! four steps in order and ends with exactly one persistence write.

use serde::{Deserialize, Serialize};

/// Form automaton states.
///
/// `Idle` and `Completed` are the bookends of the chain: a stored session
/// is never in either (no session encodes `Idle`, and the terminal step
/// destroys the session), but both appear here so the transition table is
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    /// No form in progress.
    Idle,
    /// Step 1: waiting for a category button.
    ChoosingCategory,
    /// Step 2: waiting for the price location.
    ChoosingLocation,
    /// Step 3: waiting for the numeric price.
    EnteringPrice,
    /// Step 4: waiting for photo evidence or the skip button.
    UploadingPhoto,
    /// Terminal state - report handed to the repository.
    Completed,
}

impl FormState {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Get valid transitions from current state.
    ///
    /// Rejected input is not a transition (the state stays put and the
    /// step is re-prompted). The begin command may restart the form from
    /// any non-terminal step, so `ChoosingCategory` is reachable from all
    /// of them.
    pub fn valid_transitions(&self) -> &'static [FormState] {
        match self {
            Self::Idle => &[Self::ChoosingCategory],
            Self::ChoosingCategory => &[Self::ChoosingLocation, Self::ChoosingCategory],
            Self::ChoosingLocation => &[Self::EnteringPrice, Self::ChoosingCategory],
            Self::EnteringPrice => &[Self::UploadingPhoto, Self::ChoosingCategory],
            Self::UploadingPhoto => &[Self::Completed, Self::ChoosingCategory],
            Self::Completed => &[],
        }
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: FormState) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// The state that follows a successful answer at this step, if any.
    pub fn next_step(&self) -> Option<FormState> {
        match self {
            Self::Idle => None,
            Self::ChoosingCategory => Some(Self::ChoosingLocation),
            Self::ChoosingLocation => Some(Self::EnteringPrice),
            Self::EnteringPrice => Some(Self::UploadingPhoto),
            Self::UploadingPhoto => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_transitions() {
        let state = FormState::ChoosingCategory;
        assert!(state.can_transition_to(FormState::ChoosingLocation));
        assert!(!state.can_transition_to(FormState::EnteringPrice));
        assert!(!state.can_transition_to(FormState::Completed));
    }

    #[test]
    fn restart_reaches_first_step() {
        assert!(FormState::ChoosingLocation.can_transition_to(FormState::ChoosingCategory));
        assert!(FormState::EnteringPrice.can_transition_to(FormState::ChoosingCategory));
        assert!(FormState::UploadingPhoto.can_transition_to(FormState::ChoosingCategory));
        assert!(!FormState::Completed.can_transition_to(FormState::ChoosingCategory));
    }

    #[test]
    fn terminal_states() {
        assert!(FormState::Completed.is_terminal());
        assert!(!FormState::Idle.is_terminal());
        assert!(!FormState::UploadingPhoto.is_terminal());
    }

    #[test]
    fn next_step_walks_the_chain() {
        assert_eq!(
            FormState::ChoosingCategory.next_step(),
            Some(FormState::ChoosingLocation)
        );
        assert_eq!(
            FormState::UploadingPhoto.next_step(),
            Some(FormState::Completed)
        );
        assert_eq!(FormState::Completed.next_step(), None);
    }
}
