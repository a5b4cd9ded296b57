use crate::config::ReviewOverrides;
use crate::context::Context;
use crate::plan::PlanParser;
use crate::process::{ConfirmationRelay, PrintRelay};
use crate::review::{
    Decision, RenderOptions, ReviewConfig, ReviewController, ReviewSlot, SessionRenderer,
};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Handles the 'review' command - reviews captured apply output offline and
/// prints the answer the prompt would have received
pub struct ReviewCommand;

impl ReviewCommand {
    /// Execute the review command
    pub fn execute(
        ctx: &Context,
        file: &str,
        overrides: ReviewOverrides,
        changed_only: bool,
    ) -> Result<()> {
        let mut config = ReviewConfig::default();
        overrides.apply(&mut config);

        Self::review_file(ctx, file, config, changed_only, &PrintRelay)?;
        Ok(())
    }

    /// Review a captured output file, relaying the decision through `relay`
    pub fn review_file(
        ctx: &Context,
        file: &str,
        config: ReviewConfig,
        changed_only: bool,
        relay: &dyn ConfirmationRelay,
    ) -> Result<Decision> {
        let content = ctx.fs.read_to_string(Path::new(file))?;
        let plan = Arc::new(PlanParser::new().parse_text(&content));

        if !plan.has_approval_prompt() {
            ctx.output
                .warning("No confirmation prompt found; reviewing the output as captured");
        }

        let mut slot = ReviewSlot::new();
        let session = slot.begin(plan, config)?;

        let controller = ReviewController::new(
            ctx,
            SessionRenderer::new(RenderOptions {
                changed_only,
                ..RenderOptions::default()
            }),
        );

        let decision = controller.run(session, relay);
        slot.finish();

        Ok(decision)
    }
}
