//! Plan output classification
//!
//! This module turns the text printed by an OpenTofu/Terraform apply run
//! into typed blocks that the review session walks through.
//!
//! # Example
//!
//! ```ignore
//! use crate::plan::PlanParser;
//!
//! let parser = PlanParser::new();
//! let plan = parser.parse_text(&captured_output);
//!
//! for block in &plan.blocks {
//!     println!("{} {}-{}", block.kind.name(), block.start_index, block.end_index);
//! }
//! ```

mod filter;
mod parser;
mod types;

#[allow(unused_imports)]
pub use filter::{changed_lines, is_changed_line};
pub use parser::{strip_ansi, PlanParser};
#[allow(unused_imports)]
pub use types::{Block, BlockKind, ChangeAction, ParsedPlan, PlanSummary, ResourceAddress};
