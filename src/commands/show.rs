use crate::context::Context;
use crate::plan::{changed_lines, BlockKind, ParsedPlan, PlanParser};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

/// Handles the 'show' command - classifies captured plan output
pub struct ShowCommand;

impl ShowCommand {
    /// Execute the show command
    pub fn execute(ctx: &Context, file: &str, json: bool, changed_only: bool) -> Result<()> {
        let content = ctx.fs.read_to_string(Path::new(file))?;
        let plan = PlanParser::new().parse_text(&content);

        if json {
            let rendered =
                serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
            ctx.output.text(&format!("{}\n", rendered));
            return Ok(());
        }

        Self::print_blocks(ctx, &plan, changed_only);
        Ok(())
    }

    fn print_blocks(ctx: &Context, plan: &ParsedPlan, changed_only: bool) {
        ctx.output.section("Plan Blocks");

        for block in &plan.blocks {
            let range = format!("{:>4}-{:<4}", block.start_index, block.end_index);
            let description = match &block.kind {
                BlockKind::ResourceChange { action, resource } => {
                    format!("{} {} ({})", action.symbol(), resource.address, action.label())
                }
                kind => format!("[{}] {}", kind.name(), block.title()),
            };
            ctx.output.key_value(&range, &description);

            if changed_only && block.is_resource() {
                for line in changed_lines(&block.lines[1..]) {
                    ctx.output.dimmed(&format!("        {}", line.trim_end()));
                }
            }
        }

        ctx.output.section("Summary");
        ctx.output
            .key_value("To add", &plan.summary.to_add.to_string());
        ctx.output
            .key_value("To change", &plan.summary.to_change.to_string());
        ctx.output
            .key_value("To destroy", &plan.summary.to_destroy.to_string());
        ctx.output
            .key_value("Total changes", &plan.summary.total_changes().to_string());
        ctx.output
            .key_value("Resource blocks", &plan.resource_count().to_string());
        ctx.output
            .key_value("Lines", &plan.line_count().to_string());

        if !plan.has_approval_prompt() {
            ctx.output
                .warning("No confirmation prompt found in the output");
        }
    }
}
