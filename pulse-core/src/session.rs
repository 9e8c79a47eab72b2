//! Per-user form sessions and the draft they accumulate.

use chrono::Utc;
use uuid::Uuid;

use crate::catalog::IndexSlug;
use crate::error::{PulseError, PulseResult};
use crate::message::UserId;
use crate::report::Submission;
use crate::state::FormState;

/// Partial answers collected so far. Fields fill in step order; all of the
/// required ones are present exactly when the photo step has been answered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftReport {
    pub index_slug: Option<IndexSlug>,
    pub location_type: Option<String>,
    pub price: Option<u64>,
    pub photo_url: Option<String>,
}

impl DraftReport {
    /// Build the submission record. A missing field means the engine
    /// advanced a session out of step order.
    pub fn finalize(self, user: UserId) -> PulseResult<Submission> {
        let index_slug = self
            .index_slug
            .ok_or_else(|| PulseError::Protocol("draft missing index slug".to_string()))?;
        let location_type = self
            .location_type
            .ok_or_else(|| PulseError::Protocol("draft missing location".to_string()))?;
        let price = self
            .price
            .ok_or_else(|| PulseError::Protocol("draft missing price".to_string()))?;

        Ok(Submission {
            id: Uuid::new_v4(),
            user_id: user,
            index_slug,
            location_type,
            price,
            photo_url: self.photo_url,
            submitted_at: Utc::now(),
        })
    }
}

/// One user's in-progress form. Exists only while the form is uncommitted;
/// the terminal step destroys it whether or not the write succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSession {
    pub user: UserId,
    pub state: FormState,
    pub draft: DraftReport,
}

impl FormSession {
    /// Fresh session at the first step, with an empty draft.
    pub fn begin(user: UserId) -> Self {
        Self {
            user,
            state: FormState::ChoosingCategory,
            draft: DraftReport::default(),
        }
    }
}
