//! The external process side of a review
//!
//! Spawns the apply command, turns its output into [`ProcessEvent`]s and
//! writes the confirmation answer back to its stdin.

mod lines;
mod monitor;
mod relay;

pub use monitor::{PlanProcess, ProcessEvent, ProcessSpec};
#[allow(unused_imports)]
pub use monitor::ProcessError;
pub use relay::{ConfirmationRelay, ConfirmationToken, PrintRelay, RelayError};

#[cfg(test)]
pub use relay::MockRelay;
