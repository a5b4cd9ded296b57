//! Interactive review of a parsed plan
//!
//! - [`ReviewSession`]: review state and the approve/reject decision
//! - [`ReviewSlot`]: guards against two reviews running at once
//! - [`SessionRenderer`]: text view derived from session state
//! - [`ReviewController`]: event loop driving a session from user input

mod config;
mod controller;
mod error;
mod renderer;
mod session;
mod slot;

pub use config::ReviewConfig;
pub use controller::{ReviewController, ReviewEvent};
#[allow(unused_imports)]
pub use error::ReviewError;
pub use renderer::{RenderOptions, SessionRenderer};
#[allow(unused_imports)]
pub use session::{Decision, Direction, Outcome, ReviewSession};
pub use slot::ReviewSlot;
