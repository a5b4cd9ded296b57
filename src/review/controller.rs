//! Interactive review loop
//!
//! Reads one event at a time from the user, applies it to the session and
//! re-renders, until the session is decided.

use super::error::ReviewError;
use super::renderer::SessionRenderer;
use super::session::{Decision, Direction, Outcome, ReviewSession};
use crate::context::Context;
use crate::process::ConfirmationRelay;

/// A user gesture in the review menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    ToggleReviewed,
    Next,
    Previous,
    ToggleCollapsed,
    Approve,
    Reject,
    /// Leaving the review; always rejects
    Quit,
}

impl ReviewEvent {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewEvent::ToggleReviewed => "Toggle reviewed",
            ReviewEvent::Next => "Next resource",
            ReviewEvent::Previous => "Previous resource",
            ReviewEvent::ToggleCollapsed => "Toggle collapsed",
            ReviewEvent::Approve => "Approve (yes)",
            ReviewEvent::Reject => "Reject (no)",
            ReviewEvent::Quit => "Quit",
        }
    }

    /// Events offered for the current session
    fn menu(session: &ReviewSession) -> Vec<ReviewEvent> {
        if session.total_resources() == 0 {
            return vec![ReviewEvent::Approve, ReviewEvent::Reject];
        }

        vec![
            ReviewEvent::ToggleReviewed,
            ReviewEvent::Next,
            ReviewEvent::Previous,
            ReviewEvent::ToggleCollapsed,
            ReviewEvent::Approve,
            ReviewEvent::Reject,
            ReviewEvent::Quit,
        ]
    }
}

pub struct ReviewController<'a> {
    ctx: &'a Context,
    renderer: SessionRenderer,
}

impl<'a> ReviewController<'a> {
    pub fn new(ctx: &'a Context, renderer: SessionRenderer) -> Self {
        Self { ctx, renderer }
    }

    /// Run the review until a decision is reached
    pub fn run(&self, session: &mut ReviewSession, relay: &dyn ConfirmationRelay) -> Decision {
        if session.total_resources() == 0 {
            self.ctx
                .output
                .info("The plan contains no resource changes.");
        }

        let mut dirty = true;
        while !session.is_terminal() {
            if dirty {
                self.ctx.output.text(&self.renderer.render(session));
            }

            let event = match self.next_event(session) {
                Ok(event) => event,
                Err(err) => {
                    // Ctrl-C, Esc or a closed terminal
                    tracing::debug!(error = %err, "Review input ended");
                    ReviewEvent::Quit
                }
            };

            dirty = self.dispatch(session, event, relay) == Outcome::Applied;
        }

        match session.decision() {
            Decision::Approved => self.ctx.output.success("Changes approved"),
            Decision::Rejected => self.ctx.output.warning("Changes rejected"),
            Decision::Pending => {}
        }

        session.decision()
    }

    /// Apply one event to the session, surfacing errors as warnings
    pub fn dispatch(
        &self,
        session: &mut ReviewSession,
        event: ReviewEvent,
        relay: &dyn ConfirmationRelay,
    ) -> Outcome {
        match event {
            ReviewEvent::Next => session.navigate(Direction::Next),
            ReviewEvent::Previous => session.navigate(Direction::Previous),
            ReviewEvent::ToggleReviewed => session.toggle_reviewed(),
            ReviewEvent::ToggleCollapsed => session.toggle_collapsed(),
            ReviewEvent::Approve => {
                if !self.confirm_partial_review(session) {
                    return Outcome::Ignored;
                }

                match session.approve(relay) {
                    Ok(outcome) => outcome,
                    Err(err @ ReviewError::PolicyViolation { .. }) => {
                        self.ctx.output.warning(&err.to_string());
                        Outcome::Ignored
                    }
                    Err(err) => {
                        self.ctx.output.warning(&err.to_string());
                        Outcome::Applied
                    }
                }
            }
            ReviewEvent::Reject | ReviewEvent::Quit => match session.reject(relay) {
                Ok(outcome) => outcome,
                // Logged by the session
                Err(_) => Outcome::Applied,
            },
        }
    }

    /// Without the review-all policy, ask before approving unreviewed changes
    fn confirm_partial_review(&self, session: &ReviewSession) -> bool {
        if session.config().require_review_all || session.is_terminal() {
            return true;
        }

        let unreviewed = session.total_resources() - session.reviewed_count();
        if unreviewed == 0 {
            return true;
        }

        let prompt = format!(
            "{} resource change(s) not reviewed. Approve anyway?",
            unreviewed
        );
        self.ctx.input.confirm(&prompt, false).unwrap_or(false)
    }

    fn next_event(&self, session: &ReviewSession) -> anyhow::Result<ReviewEvent> {
        let menu = ReviewEvent::menu(session);
        let options: Vec<String> = menu.iter().map(|e| e.label().to_string()).collect();

        let prompt = match session.current_block().and_then(|b| b.resource()) {
            Some(resource) => format!(
                "{} [{}/{} reviewed]",
                resource.address,
                session.reviewed_count(),
                session.total_resources()
            ),
            None => "Apply these changes?".to_string(),
        };

        let answer = self.ctx.input.select(&prompt, options)?;
        menu.into_iter()
            .find(|e| e.label() == answer)
            .ok_or_else(|| anyhow::anyhow!("Unknown review action: {}", answer))
    }
}
