use crate::config::{ProjectConfig, ReviewOverrides};
use crate::context::Context;
use crate::plan::PlanParser;
use crate::process::{PlanProcess, ProcessEvent, ProcessSpec};
use crate::review::{
    Decision, RenderOptions, ReviewConfig, ReviewController, ReviewSlot, SessionRenderer,
};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use std::sync::Arc;

/// Handles the 'apply' command - runs IaC apply with an interactive review
/// in place of the yes/no prompt
pub struct ApplyCommand;

/// Options for the apply command
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub path: Option<String>,
    pub command: Option<String>,
    pub overrides: ReviewOverrides,
    pub changed_only: bool,
}

impl ApplyCommand {
    /// Execute the apply command
    pub fn execute(ctx: &Context, options: &ApplyOptions) -> Result<()> {
        let project_dir = Path::new(options.path.as_deref().unwrap_or("."));

        let mut config = ProjectConfig::load(&*ctx.fs, project_dir)
            .context("Failed to load project configuration")?;
        if let Some(command) = &options.command {
            config.apply_command = Some(command.clone());
        }
        options.overrides.apply(&mut config.review);

        let spec = ProcessSpec::from_command(config.apply_command(), project_dir)?
            .with_envs(config.env.clone());

        ctx.output.section("Interactive Apply");
        ctx.output.key_value("Command", &spec.display());
        ctx.output.key_value("Directory", &project_dir.display().to_string());
        if config.review.require_review_all {
            ctx.output
                .key_value("Policy", "all resource changes must be reviewed");
        }
        ctx.output.blank();

        let render_options = RenderOptions {
            changed_only: options.changed_only,
            ..RenderOptions::default()
        };

        let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        let exit_code = runtime.block_on(Self::run(ctx, &spec, config.review, render_options))?;

        if exit_code != 0 {
            anyhow::bail!("Apply command failed with exit code {}", exit_code);
        }

        ctx.output.success("Apply finished");
        Ok(())
    }

    /// Stream the process output, review at each confirmation prompt and
    /// return the exit code
    async fn run(
        ctx: &Context,
        spec: &ProcessSpec,
        review_config: ReviewConfig,
        render_options: RenderOptions,
    ) -> Result<i32> {
        let (process, mut events) = PlanProcess::spawn(spec)
            .with_context(|| format!("Failed to execute '{}'", spec.display()))?;
        tracing::debug!(pid = ?process.pid(), "Apply process started");

        let relay = process.relay();
        let parser = PlanParser::new();
        let mut captured: Vec<String> = Vec::new();
        let mut slot = ReviewSlot::new();

        while let Some(event) = events.recv().await {
            match event {
                ProcessEvent::Line(line) => {
                    ctx.output.dimmed(&line);
                    captured.push(line);
                }
                ProcessEvent::PromptReady => {
                    let plan = Arc::new(parser.parse(&captured));
                    captured.clear();

                    let session = match slot.begin(plan, review_config) {
                        Ok(session) => session,
                        Err(err) => {
                            tracing::warn!(error = %err, "Ignoring confirmation prompt");
                            continue;
                        }
                    };

                    let controller =
                        ReviewController::new(ctx, SessionRenderer::new(render_options.clone()));
                    let decision =
                        tokio::task::block_in_place(|| controller.run(session, &relay));

                    if decision == Decision::Rejected {
                        ctx.output.info("Waiting for the process to cancel the apply...");
                    }
                    slot.finish();
                }
                ProcessEvent::Exited(code) => {
                    if slot.is_active() {
                        tracing::warn!("Process exited during an active review");
                    }
                    return Ok(code);
                }
            }
        }

        anyhow::bail!("Lost track of the apply process before it exited")
    }
}
