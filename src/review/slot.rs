use super::config::ReviewConfig;
use super::error::ReviewError;
use super::session::ReviewSession;
use crate::plan::ParsedPlan;
use std::sync::Arc;

/// Holder for the one review that may be in progress.
///
/// Starting a review while another is still pending is refused, so two
/// reviews can never race to answer their processes.
#[derive(Default)]
pub struct ReviewSlot {
    session: Option<ReviewSession>,
}

impl ReviewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pending review occupies the slot
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.is_terminal())
    }

    /// Start a review. A decided session left in the slot is discarded.
    pub fn begin(
        &mut self,
        plan: Arc<ParsedPlan>,
        config: ReviewConfig,
    ) -> Result<&mut ReviewSession, ReviewError> {
        if self.is_active() {
            return Err(ReviewError::SessionActive);
        }

        Ok(self.session.insert(ReviewSession::new(plan, config)))
    }

    /// Take the session out of the slot, freeing it
    pub fn finish(&mut self) -> Option<ReviewSession> {
        self.session.take()
    }
}
