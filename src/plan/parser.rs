//! Plan output parser for OpenTofu/Terraform
//!
//! Classifies the lines printed by `tofu apply` / `terraform apply` up to the
//! confirmation prompt into typed [`Block`]s. The parser makes a single
//! forward pass with no lookahead, and every input line ends up in exactly
//! one block.

use lazy_static::lazy_static;
use regex::Regex;

use super::types::{Block, BlockKind, ChangeAction, ParsedPlan, PlanSummary, ResourceAddress};

/// Substrings that identify the confirmation prompt
pub const APPROVAL_PROMPT_MARKERS: &[&str] = &[
    "Do you want to perform these actions?",
    "Do you really want to destroy",
    "Enter a value:",
];

/// Prefixes of the section headers printed before the resource list
pub const SECTION_HEADER_PREFIXES: &[&str] = &[
    "Terraform will perform",
    "Terraform used the selected",
    "An execution plan has been generated",
];

lazy_static! {
    static ref ANSI_ESCAPE: Regex =
        Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("Invalid ANSI escape regex");
}

/// Remove terminal color escape sequences from a line
pub fn strip_ansi(line: &str) -> std::borrow::Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}

/// Result of classifying a single line
enum LineClass {
    Resource(ChangeAction, ResourceAddress),
    Summary(PlanSummary),
    Prompt,
    Header,
    Continuation,
}

/// Parser for OpenTofu/Terraform plan output
pub struct PlanParser {
    resource_pattern: Regex,
    summary_pattern: Regex,
}

impl Default for PlanParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanParser {
    /// Create a new plan parser with compiled regex patterns
    pub fn new() -> Self {
        Self {
            // Match resource declarations like:
            // # aws_instance.example will be created
            // # module.vpc.aws_subnet.main must be replaced
            // # aws_instance.old (deposed object 1a2b3c) will be destroyed
            resource_pattern: Regex::new(
                r"^\s*#\s*(.+?)(?:\s+\(deposed object [^)]*\))?\s+(?:will|must) be\s+(.*)$",
            )
            .expect("Invalid resource pattern regex"),

            // Match summary line: Plan: 3 to add, 2 to change, 1 to destroy.
            summary_pattern: Regex::new(
                r"Plan:\s*(\d+)\s*to add,\s*(\d+)\s*to change,\s*(\d+)\s*to destroy",
            )
            .expect("Invalid summary pattern regex"),
        }
    }

    /// Parse captured output into blocks and a summary
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> ParsedPlan {
        let mut plan = ParsedPlan::default();
        let mut open: Option<Block> = None;

        for (offset, raw) in lines.iter().enumerate() {
            let raw = raw.as_ref();
            let index = offset + 1;

            let kind = match self.classify(raw) {
                LineClass::Resource(action, resource) => {
                    BlockKind::ResourceChange { action, resource }
                }
                LineClass::Summary(summary) => {
                    plan.summary = summary;
                    BlockKind::Summary
                }
                LineClass::Prompt => BlockKind::ApprovalPrompt,
                LineClass::Header => BlockKind::Header,
                LineClass::Continuation => {
                    match open.as_mut() {
                        Some(block) => block.push(raw, index),
                        None => open = Some(Block::open(BlockKind::Other, raw, index)),
                    }
                    continue;
                }
            };

            if let Some(block) = open.replace(Block::open(kind, raw, index)) {
                plan.blocks.push(block);
            }
        }

        if let Some(block) = open {
            plan.blocks.push(block);
        }

        tracing::debug!(
            lines = lines.len(),
            blocks = plan.blocks.len(),
            resources = plan.resource_count(),
            "Parsed plan output"
        );

        plan
    }

    /// Parse a chunk of text, splitting it into lines first
    pub fn parse_text(&self, output: &str) -> ParsedPlan {
        let lines: Vec<&str> = output.lines().collect();
        self.parse(&lines)
    }

    /// Classify one line. Checks run in fixed priority order.
    fn classify(&self, raw: &str) -> LineClass {
        let line = strip_ansi(raw);

        if let Some(caps) = self.resource_pattern.captures(&line) {
            let address = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let phrase = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            return LineClass::Resource(
                ChangeAction::from_verb_phrase(phrase),
                ResourceAddress::parse(address.trim()),
            );
        }

        if let Some(caps) = self.summary_pattern.captures(&line) {
            return LineClass::Summary(self.parse_summary_from_captures(&caps));
        }

        if APPROVAL_PROMPT_MARKERS
            .iter()
            .any(|marker| line.contains(marker))
        {
            return LineClass::Prompt;
        }

        let trimmed = line.trim_start();
        if SECTION_HEADER_PREFIXES
            .iter()
            .any(|prefix| trimmed.starts_with(prefix))
        {
            return LineClass::Header;
        }

        LineClass::Continuation
    }

    /// Parse summary from regex captures
    fn parse_summary_from_captures(&self, caps: &regex::Captures) -> PlanSummary {
        // Groups only capture digits, so a failed parse is an overflow
        let count = |group: usize| {
            caps.get(group)
                .map(|m| m.as_str().parse().unwrap_or(usize::MAX))
                .unwrap_or(0)
        };

        PlanSummary {
            to_add: count(1),
            to_change: count(2),
            to_destroy: count(3),
        }
    }
}
