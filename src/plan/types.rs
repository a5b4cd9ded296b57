//! Data types for classified plan output
//!
//! A plan run is captured as an ordered list of [`Block`]s, each one a
//! contiguous span of raw output lines sharing a classification, plus the
//! [`PlanSummary`] taken from the `Plan: ...` line.

use serde::{Deserialize, Serialize};

/// The action a resource header announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    /// Resource will be created
    Create,
    /// Resource will be updated in-place
    Update,
    /// Resource will be destroyed and recreated
    Replace,
    /// Resource will be destroyed
    Destroy,
    /// Data source read
    Read,
    /// Verb phrase we don't recognise
    Unknown,
}

impl ChangeAction {
    /// Classify the verb phrase following `will be`/`must be`.
    ///
    /// Case-insensitive substring match, first match wins.
    pub fn from_verb_phrase(phrase: &str) -> Self {
        let phrase = phrase.to_lowercase();

        if phrase.contains("created") {
            ChangeAction::Create
        } else if phrase.contains("destroyed") || phrase.contains("deleted") {
            ChangeAction::Destroy
        } else if phrase.contains("replaced") {
            ChangeAction::Replace
        } else if ["updated", "modified", "changed"]
            .iter()
            .any(|verb| phrase.contains(verb))
        {
            ChangeAction::Update
        } else if phrase.contains("read") {
            ChangeAction::Read
        } else {
            ChangeAction::Unknown
        }
    }

    /// Get the symbol used to represent this action
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeAction::Create => "+",
            ChangeAction::Update => "~",
            ChangeAction::Replace => "±",
            ChangeAction::Destroy => "-",
            ChangeAction::Read => "≤",
            ChangeAction::Unknown => "?",
        }
    }

    /// Get the label for this action
    pub fn label(&self) -> &'static str {
        match self {
            ChangeAction::Create => "create",
            ChangeAction::Update => "update",
            ChangeAction::Replace => "replace",
            ChangeAction::Destroy => "destroy",
            ChangeAction::Read => "read",
            ChangeAction::Unknown => "unknown",
        }
    }

    /// Get RGB color tuple for this action
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            ChangeAction::Create => (152, 225, 152),  // Pastel mint green
            ChangeAction::Update => (255, 230, 160),  // Pastel cream/yellow
            ChangeAction::Replace => (181, 174, 254), // Pastel lavender
            ChangeAction::Destroy => (255, 160, 160), // Pastel coral
            ChangeAction::Read => (160, 200, 255),    // Pastel sky blue
            ChangeAction::Unknown => (160, 160, 160), // Grey
        }
    }
}

/// A resource address split into its components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAddress {
    /// Full address as rendered (e.g., "module.vpc.aws_subnet.main")
    pub address: String,

    /// Module path if applicable (e.g., "module.vpc")
    pub module_path: Option<String>,

    /// Whether the address names a data source (`data.` prefix)
    pub data_source: bool,

    /// Resource type (e.g., "aws_subnet")
    pub resource_type: String,

    /// Resource name, including any index (e.g., "main", "web[0]")
    pub resource_name: String,
}

impl ResourceAddress {
    /// Parse a rendered resource address
    pub fn parse(address: &str) -> Self {
        let mut rest = address;
        let mut module_parts: Vec<&str> = Vec::new();

        // Peel off module.<name> pairs, indexes included (module.dns["a.b"])
        while let Some(after) = rest.strip_prefix("module.") {
            match split_segment(after) {
                Some((name, tail)) if !tail.is_empty() => {
                    module_parts.push(&rest[..("module.".len() + name.len())]);
                    rest = tail;
                }
                _ => break,
            }
        }

        let data_source = match rest.strip_prefix("data.") {
            Some(tail) if tail.contains('.') => {
                rest = tail;
                true
            }
            _ => false,
        };

        let (resource_type, resource_name) = match split_segment(rest) {
            Some((kind, name)) => (kind.to_string(), name.to_string()),
            None => (rest.to_string(), String::new()),
        };

        Self {
            address: address.to_string(),
            module_path: (!module_parts.is_empty()).then(|| module_parts.join(".")),
            data_source,
            resource_type,
            resource_name,
        }
    }
}

/// Split at the first `.` that is outside `[...]` index text and quoted keys
fn split_segment(address: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in address.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => return Some((&address[..i], &address[i + 1..])),
            _ => {}
        }
    }

    None
}

/// Classification of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Section header such as "Terraform will perform the following actions:"
    Header,
    /// A `# <address> will be <verb>` header and the diff lines under it
    ResourceChange {
        action: ChangeAction,
        resource: ResourceAddress,
    },
    /// The `Plan: N to add, ...` line
    Summary,
    /// The yes/no confirmation prompt
    ApprovalPrompt,
    /// Anything else
    Other,
}

impl BlockKind {
    /// Short name used in listings
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Header => "header",
            BlockKind::ResourceChange { .. } => "resource",
            BlockKind::Summary => "summary",
            BlockKind::ApprovalPrompt => "prompt",
            BlockKind::Other => "other",
        }
    }
}

/// A contiguous run of output lines sharing one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// What the block contains
    pub kind: BlockKind,

    /// Raw output lines, in order
    pub lines: Vec<String>,

    /// 1-based line number of the first line
    pub start_index: usize,

    /// 1-based line number of the last line (inclusive)
    pub end_index: usize,
}

impl Block {
    pub(crate) fn open(kind: BlockKind, first_line: &str, index: usize) -> Self {
        Self {
            kind,
            lines: vec![first_line.to_string()],
            start_index: index,
            end_index: index,
        }
    }

    pub(crate) fn push(&mut self, line: &str, index: usize) {
        self.lines.push(line.to_string());
        self.end_index = index;
    }

    /// Whether this is a resource change block
    pub fn is_resource(&self) -> bool {
        matches!(self.kind, BlockKind::ResourceChange { .. })
    }

    /// Action of a resource change block
    pub fn action(&self) -> Option<ChangeAction> {
        match &self.kind {
            BlockKind::ResourceChange { action, .. } => Some(*action),
            _ => None,
        }
    }

    /// Address of a resource change block
    pub fn resource(&self) -> Option<&ResourceAddress> {
        match &self.kind {
            BlockKind::ResourceChange { resource, .. } => Some(resource),
            _ => None,
        }
    }

    /// First line of the block, used as its title
    pub fn title(&self) -> &str {
        self.lines.first().map(|l| l.trim()).unwrap_or("")
    }
}

/// Summary statistics for the plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Number of resources to add
    pub to_add: usize,

    /// Number of resources to change
    pub to_change: usize,

    /// Number of resources to destroy
    pub to_destroy: usize,
}

impl PlanSummary {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.to_add > 0 || self.to_change > 0 || self.to_destroy > 0
    }

    /// Get total number of changes
    pub fn total_changes(&self) -> usize {
        self.to_add
            .saturating_add(self.to_change)
            .saturating_add(self.to_destroy)
    }
}

/// Parsed plan output: the ordered blocks plus the summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPlan {
    pub blocks: Vec<Block>,
    pub summary: PlanSummary,
}

impl ParsedPlan {
    /// Positions of all resource change blocks, in order
    pub fn resource_positions(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_resource())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of resource change blocks
    pub fn resource_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_resource()).count()
    }

    /// Whether the output ended in (or contained) a confirmation prompt
    pub fn has_approval_prompt(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| b.kind == BlockKind::ApprovalPrompt)
    }

    /// Total number of lines covered by the blocks
    pub fn line_count(&self) -> usize {
        self.blocks.last().map(|b| b.end_index).unwrap_or(0)
    }
}
