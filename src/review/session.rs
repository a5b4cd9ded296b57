//! Review session state machine
//!
//! A [`ReviewSession`] wraps one parsed plan and tracks which resource
//! blocks the operator has reviewed or collapsed, which block is selected,
//! and the final decision. Review state lives beside the blocks, keyed by
//! block position; the blocks themselves are never touched.
//!
//! The decision moves `Pending -> Approved` or `Pending -> Rejected` exactly
//! once. Every operation on a decided session is a silent no-op.

use super::config::ReviewConfig;
use super::error::ReviewError;
use crate::plan::{Block, ParsedPlan};
use crate::process::{ConfirmationRelay, ConfirmationToken};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

impl Decision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Pending)
    }
}

/// Whether an operation changed the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored,
}

pub struct ReviewSession {
    plan: Arc<ParsedPlan>,
    config: ReviewConfig,
    reviewed: Vec<bool>,
    collapsed: Vec<bool>,
    current: Option<usize>,
    decision: Decision,
}

impl ReviewSession {
    /// Start a review of a parsed plan. Selects the first resource block,
    /// if there is one.
    pub fn new(plan: Arc<ParsedPlan>, config: ReviewConfig) -> Self {
        let collapsed = plan
            .blocks
            .iter()
            .map(|b| b.is_resource() && config.default_collapsed)
            .collect();
        let current = plan.resource_positions().first().copied();

        Self {
            reviewed: vec![false; plan.blocks.len()],
            collapsed,
            current,
            decision: Decision::Pending,
            plan,
            config,
        }
    }

    /// Move the selection to the nearest resource block in `direction`.
    /// Stays put at either end.
    pub fn navigate(&mut self, direction: Direction) -> Outcome {
        if self.is_terminal() {
            return Outcome::Ignored;
        }
        let Some(current) = self.current else {
            return Outcome::Ignored;
        };

        let blocks = &self.plan.blocks;
        let target = match direction {
            Direction::Next => (current + 1..blocks.len()).find(|&i| blocks[i].is_resource()),
            Direction::Previous => (0..current).rev().find(|&i| blocks[i].is_resource()),
        };

        match target {
            Some(position) => {
                self.current = Some(position);
                Outcome::Applied
            }
            None => Outcome::Ignored,
        }
    }

    /// Flip the reviewed flag of the selected block, then advance to the
    /// next resource block. The advance happens on un-review too.
    pub fn toggle_reviewed(&mut self) -> Outcome {
        let Some(position) = self.selected_resource() else {
            return Outcome::Ignored;
        };

        let now_reviewed = !self.reviewed[position];
        self.reviewed[position] = now_reviewed;

        // Un-reviewing leaves the collapse state alone
        if now_reviewed && self.config.auto_collapse_on_review {
            self.collapsed[position] = true;
        }

        tracing::debug!(position, reviewed = now_reviewed, "Toggled reviewed");
        self.navigate(Direction::Next);
        Outcome::Applied
    }

    /// Flip the collapsed flag of the selected block
    pub fn toggle_collapsed(&mut self) -> Outcome {
        let Some(position) = self.selected_resource() else {
            return Outcome::Ignored;
        };

        self.collapsed[position] = !self.collapsed[position];
        Outcome::Applied
    }

    /// Approve the plan and relay `yes`.
    ///
    /// Fails with [`ReviewError::PolicyViolation`] (session stays pending)
    /// when the review-all policy is on and resources remain unreviewed. A
    /// relay failure is returned as [`ReviewError::RelayFailure`] but the
    /// session stays approved.
    pub fn approve(&mut self, relay: &dyn ConfirmationRelay) -> Result<Outcome, ReviewError> {
        if self.is_terminal() {
            return Ok(Outcome::Ignored);
        }

        if self.config.require_review_all {
            let reviewed = self.reviewed_count();
            let total = self.total_resources();
            if reviewed < total {
                return Err(ReviewError::PolicyViolation { reviewed, total });
            }
        }

        self.decision = Decision::Approved;
        tracing::info!(resources = self.total_resources(), "Plan approved");

        relay
            .send_confirmation(ConfirmationToken::Yes)
            .map_err(|source| ReviewError::RelayFailure {
                token: ConfirmationToken::Yes,
                source,
            })?;

        Ok(Outcome::Applied)
    }

    /// Reject the plan and relay `no`. Always succeeds in deciding; a relay
    /// failure is logged and returned for information only.
    pub fn reject(&mut self, relay: &dyn ConfirmationRelay) -> Result<Outcome, ReviewError> {
        if self.is_terminal() {
            return Ok(Outcome::Ignored);
        }

        self.decision = Decision::Rejected;
        tracing::info!("Plan rejected");

        if let Err(source) = relay.send_confirmation(ConfirmationToken::No) {
            tracing::warn!(error = %source, "Could not relay rejection");
            return Err(ReviewError::RelayFailure {
                token: ConfirmationToken::No,
                source,
            });
        }

        Ok(Outcome::Applied)
    }

    /// Selected position, if the session is pending and it is a resource
    fn selected_resource(&self) -> Option<usize> {
        if self.is_terminal() {
            return None;
        }
        self.current
            .filter(|&position| self.plan.blocks[position].is_resource())
    }

    pub fn plan(&self) -> &ParsedPlan {
        &self.plan
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_block(&self) -> Option<&Block> {
        self.current.map(|position| &self.plan.blocks[position])
    }

    pub fn is_reviewed(&self, position: usize) -> bool {
        self.reviewed.get(position).copied().unwrap_or(false)
    }

    pub fn is_collapsed(&self, position: usize) -> bool {
        self.collapsed.get(position).copied().unwrap_or(false)
    }

    /// Number of resource blocks marked reviewed
    pub fn reviewed_count(&self) -> usize {
        self.plan
            .blocks
            .iter()
            .zip(&self.reviewed)
            .filter(|(block, reviewed)| block.is_resource() && **reviewed)
            .count()
    }

    pub fn total_resources(&self) -> usize {
        self.plan.resource_count()
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn is_terminal(&self) -> bool {
        self.decision.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{BlockKind, ChangeAction, PlanParser, PlanSummary, ResourceAddress};
    use crate::process::MockRelay;

    fn block(kind: BlockKind, index: usize) -> Block {
        Block {
            kind,
            lines: vec![format!("line {}", index)],
            start_index: index,
            end_index: index,
        }
    }

    /// A plan with resource blocks at the given positions and `Other` elsewhere
    fn plan_with_resources(len: usize, resources: &[usize]) -> Arc<ParsedPlan> {
        let blocks = (0..len)
            .map(|i| {
                let kind = if resources.contains(&i) {
                    BlockKind::ResourceChange {
                        action: ChangeAction::Create,
                        resource: ResourceAddress::parse(&format!("aws_instance.r{}", i)),
                    }
                } else {
                    BlockKind::Other
                };
                block(kind, i + 1)
            })
            .collect();

        Arc::new(ParsedPlan {
            blocks,
            summary: PlanSummary::default(),
        })
    }

    fn gated() -> ReviewConfig {
        ReviewConfig {
            require_review_all: true,
            ..ReviewConfig::default()
        }
    }

    #[test]
    fn test_starts_on_first_resource() {
        let session = ReviewSession::new(plan_with_resources(10, &[2, 5, 9]), gated());

        assert_eq!(session.current(), Some(2));
        assert_eq!(session.decision(), Decision::Pending);
        assert_eq!(session.total_resources(), 3);
        assert_eq!(session.reviewed_count(), 0);
    }

    #[test]
    fn test_navigation_is_bounded() {
        let mut session = ReviewSession::new(plan_with_resources(10, &[2, 5, 9]), gated());

        assert_eq!(session.navigate(Direction::Previous), Outcome::Ignored);
        assert_eq!(session.current(), Some(2));

        assert_eq!(session.navigate(Direction::Next), Outcome::Applied);
        assert_eq!(session.current(), Some(5));
        session.navigate(Direction::Next);
        assert_eq!(session.current(), Some(9));

        assert_eq!(session.navigate(Direction::Next), Outcome::Ignored);
        assert_eq!(session.current(), Some(9));

        session.navigate(Direction::Previous);
        assert_eq!(session.current(), Some(5));
    }

    #[test]
    fn test_toggle_reviewed_advances_and_collapses() {
        let mut session =
            ReviewSession::new(plan_with_resources(10, &[2, 5, 9]), ReviewConfig::default());

        session.toggle_reviewed();
        assert!(session.is_reviewed(2));
        assert!(session.is_collapsed(2));
        assert_eq!(session.current(), Some(5));
    }

    #[test]
    fn test_toggle_reviewed_without_auto_collapse() {
        let config = ReviewConfig {
            auto_collapse_on_review: false,
            ..ReviewConfig::default()
        };
        let mut session = ReviewSession::new(plan_with_resources(3, &[0, 1]), config);

        session.toggle_reviewed();
        assert!(session.is_reviewed(0));
        assert!(!session.is_collapsed(0));
    }

    #[test]
    fn test_unreview_keeps_collapse_and_still_advances() {
        let mut session =
            ReviewSession::new(plan_with_resources(10, &[2, 5, 9]), ReviewConfig::default());

        session.toggle_reviewed();
        session.navigate(Direction::Previous);
        assert_eq!(session.current(), Some(2));

        session.toggle_reviewed();
        assert!(!session.is_reviewed(2));
        assert!(session.is_collapsed(2));
        assert_eq!(session.current(), Some(5));
    }

    #[test]
    fn test_toggle_on_last_resource_stays() {
        let mut session = ReviewSession::new(plan_with_resources(3, &[1]), ReviewConfig::default());

        session.toggle_reviewed();
        assert_eq!(session.current(), Some(1));
        assert!(session.is_reviewed(1));
    }

    #[test]
    fn test_toggle_collapsed() {
        let mut session = ReviewSession::new(plan_with_resources(3, &[1]), ReviewConfig::default());

        assert_eq!(session.toggle_collapsed(), Outcome::Applied);
        assert!(session.is_collapsed(1));
        session.toggle_collapsed();
        assert!(!session.is_collapsed(1));
        assert!(!session.is_reviewed(1));
    }

    #[test]
    fn test_default_collapsed_applies_to_resources_only() {
        let config = ReviewConfig {
            default_collapsed: true,
            ..ReviewConfig::default()
        };
        let session = ReviewSession::new(plan_with_resources(4, &[1, 3]), config);

        assert!(!session.is_collapsed(0));
        assert!(session.is_collapsed(1));
        assert!(!session.is_collapsed(2));
        assert!(session.is_collapsed(3));
    }

    #[test]
    fn test_gating_policy() {
        let relay = MockRelay::new();
        let mut session = ReviewSession::new(plan_with_resources(10, &[2, 5, 9]), gated());

        for expected_reviewed in 0..3 {
            let err = session.approve(&relay).unwrap_err();
            assert!(matches!(
                err,
                ReviewError::PolicyViolation { reviewed, total: 3 } if reviewed == expected_reviewed
            ));
            assert_eq!(session.decision(), Decision::Pending);
            session.toggle_reviewed();
        }

        assert_eq!(session.approve(&relay).unwrap(), Outcome::Applied);
        assert_eq!(session.decision(), Decision::Approved);
        assert_eq!(relay.sent(), vec![ConfirmationToken::Yes]);
    }

    #[test]
    fn test_approve_without_policy() {
        let relay = MockRelay::new();
        let mut session =
            ReviewSession::new(plan_with_resources(3, &[0, 1]), ReviewConfig::default());

        session.approve(&relay).unwrap();
        assert_eq!(session.decision(), Decision::Approved);
    }

    #[test]
    fn test_empty_plan_can_be_approved() {
        let relay = MockRelay::new();
        let mut session = ReviewSession::new(plan_with_resources(2, &[]), gated());

        assert_eq!(session.current(), None);
        assert_eq!(session.navigate(Direction::Next), Outcome::Ignored);
        assert_eq!(session.toggle_reviewed(), Outcome::Ignored);
        assert_eq!(session.toggle_collapsed(), Outcome::Ignored);

        session.approve(&relay).unwrap();
        assert_eq!(session.decision(), Decision::Approved);
    }

    #[test]
    fn test_empty_plan_can_be_rejected() {
        let relay = MockRelay::new();
        let mut session = ReviewSession::new(plan_with_resources(0, &[]), gated());

        session.reject(&relay).unwrap();
        assert_eq!(session.decision(), Decision::Rejected);
        assert_eq!(relay.sent(), vec![ConfirmationToken::No]);
    }

    #[test]
    fn test_terminal_session_ignores_everything() {
        for approve_first in [true, false] {
            let relay = MockRelay::new();
            let mut session =
                ReviewSession::new(plan_with_resources(10, &[2, 5, 9]), ReviewConfig::default());

            if approve_first {
                session.approve(&relay).unwrap();
            } else {
                session.reject(&relay).unwrap();
            }
            let decided = session.decision();

            assert_eq!(session.navigate(Direction::Next), Outcome::Ignored);
            assert_eq!(session.toggle_reviewed(), Outcome::Ignored);
            assert_eq!(session.toggle_collapsed(), Outcome::Ignored);
            assert_eq!(session.approve(&relay).unwrap(), Outcome::Ignored);
            assert_eq!(session.reject(&relay).unwrap(), Outcome::Ignored);

            assert_eq!(session.decision(), decided);
            assert_eq!(session.current(), Some(2));
            assert!(!session.is_reviewed(2));
            assert!(!session.is_collapsed(2));
            assert_eq!(relay.sent().len(), 1);
        }
    }

    #[test]
    fn test_approve_relay_failure_stays_approved() {
        let relay = MockRelay::closed();
        let mut session =
            ReviewSession::new(plan_with_resources(3, &[0]), ReviewConfig::default());

        let err = session.approve(&relay).unwrap_err();
        assert!(matches!(
            err,
            ReviewError::RelayFailure {
                token: ConfirmationToken::Yes,
                ..
            }
        ));
        assert_eq!(session.decision(), Decision::Approved);
    }

    #[test]
    fn test_reject_relay_failure_stays_rejected() {
        let relay = MockRelay::closed();
        let mut session =
            ReviewSession::new(plan_with_resources(3, &[0]), ReviewConfig::default());

        assert!(session.reject(&relay).is_err());
        assert_eq!(session.decision(), Decision::Rejected);
    }

    #[test]
    fn test_scenario_from_parsed_output() {
        let lines = [
            "  # aws_instance.example will be created",
            "  + ami = \"x\"",
            "",
            "Plan: 1 to add, 0 to change, 0 to destroy",
            "Do you want to perform these actions?",
        ];
        let plan = Arc::new(PlanParser::new().parse(&lines));
        let relay = MockRelay::new();
        let mut session = ReviewSession::new(plan, gated());

        assert_eq!(session.current(), Some(0));
        session.toggle_reviewed();
        session.approve(&relay).unwrap();

        assert_eq!(session.decision(), Decision::Approved);
        assert_eq!(relay.sent(), vec![ConfirmationToken::Yes]);
    }
}
