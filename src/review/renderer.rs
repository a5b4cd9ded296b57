//! Text view of a review session
//!
//! Everything here is derived from session state on each refresh; the
//! renderer never mutates the session.

use super::session::{Decision, ReviewSession};
use crate::plan::{changed_lines, Block, BlockKind, PlanSummary};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Options for session rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Show only changed lines inside expanded resource blocks
    pub changed_only: bool,

    /// Terminal width for separators
    pub terminal_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let terminal_width = terminal_size::terminal_size()
            .map(|(terminal_size::Width(w), _)| w as usize)
            .unwrap_or(80);

        Self {
            changed_only: false,
            terminal_width,
        }
    }
}

pub struct SessionRenderer {
    options: RenderOptions,
}

impl SessionRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render the whole session
    pub fn render(&self, session: &ReviewSession) -> String {
        let mut output = String::new();
        let rule = "─".repeat(self.options.terminal_width.clamp(20, 100));

        output.push_str(&self.render_status(session));
        let _ = writeln!(output, "{}", rule.truecolor(160, 160, 160));

        for (position, block) in session.plan().blocks.iter().enumerate() {
            if block.is_resource() {
                output.push_str(&self.render_resource(session, position, block));
            } else {
                output.push_str(&self.render_passthrough(block));
            }
        }

        let _ = writeln!(output, "{}", rule.truecolor(160, 160, 160));
        output
    }

    /// Summary counts plus review progress
    pub fn render_status(&self, session: &ReviewSession) -> String {
        let mut output = String::new();
        let summary = &session.plan().summary;

        let _ = write!(output, "{}", self.render_summary(summary));
        let progress = format!(
            "Reviewed {}/{}",
            session.reviewed_count(),
            session.total_resources()
        );
        let _ = write!(output, "   {}", progress.truecolor(181, 174, 254).bold());

        match session.decision() {
            Decision::Pending => {}
            Decision::Approved => {
                let _ = write!(output, "   {}", "APPROVED".truecolor(152, 225, 152).bold());
            }
            Decision::Rejected => {
                let _ = write!(output, "   {}", "REJECTED".truecolor(255, 160, 160).bold());
            }
        }

        output.push('\n');
        output
    }

    fn render_summary(&self, summary: &PlanSummary) -> String {
        if !summary.has_changes() {
            return "No changes".truecolor(160, 160, 160).to_string();
        }

        format!(
            "Plan: {} {} {}",
            format!("+{}", summary.to_add).truecolor(152, 225, 152),
            format!("~{}", summary.to_change).truecolor(255, 230, 160),
            format!("-{}", summary.to_destroy).truecolor(255, 160, 160),
        )
    }

    fn render_resource(&self, session: &ReviewSession, position: usize, block: &Block) -> String {
        let mut output = String::new();
        let BlockKind::ResourceChange { action, resource } = &block.kind else {
            return output;
        };

        let selected = session.current() == Some(position);
        let marker = if selected { "▸" } else { " " };
        let check = if session.is_reviewed(position) { "✓" } else { " " };
        let (r, g, b) = action.color();

        let _ = write!(
            output,
            "{} {} {} {}",
            marker.truecolor(160, 200, 255).bold(),
            check.truecolor(152, 225, 152).bold(),
            action.symbol().truecolor(r, g, b).bold(),
            if selected {
                resource.address.bright_white().bold().to_string()
            } else {
                resource.address.bright_white().to_string()
            },
        );
        let _ = write!(
            output,
            " {}",
            format!(
                "({}, lines {}-{})",
                action.label(),
                block.start_index,
                block.end_index
            )
            .truecolor(160, 160, 160)
        );

        if session.is_collapsed(position) {
            let hidden = block.lines.len().saturating_sub(1);
            let _ = writeln!(
                output,
                " {}",
                format!("[{} lines hidden]", hidden).truecolor(160, 160, 160)
            );
            return output;
        }
        output.push('\n');

        let body = &block.lines[1..];
        let lines: Vec<&str> = if self.options.changed_only {
            changed_lines(body)
        } else {
            body.iter().map(String::as_str).collect()
        };

        for line in lines {
            let _ = writeln!(output, "    {}", self.color_diff_line(line));
        }

        output
    }

    fn render_passthrough(&self, block: &Block) -> String {
        let mut output = String::new();

        for line in &block.lines {
            if line.trim().is_empty() {
                continue;
            }
            let styled = match block.kind {
                BlockKind::Header => line.truecolor(120, 180, 195).bold().to_string(),
                BlockKind::Summary => line.bright_white().bold().to_string(),
                _ => line.truecolor(160, 160, 160).to_string(),
            };
            let _ = writeln!(output, "{}", styled);
        }

        output
    }

    fn color_diff_line(&self, line: &str) -> String {
        match line.trim_start().chars().next() {
            Some('+') => line.truecolor(152, 225, 152).to_string(),
            Some('-') => line.truecolor(255, 160, 160).to_string(),
            Some('~') => line.truecolor(255, 230, 160).to_string(),
            Some('#') => line.truecolor(160, 160, 160).to_string(),
            _ => line.to_string(),
        }
    }
}
