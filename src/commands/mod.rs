pub mod apply;
pub mod review;
pub mod show;

pub use apply::{ApplyCommand, ApplyOptions};
pub use review::ReviewCommand;
pub use show::ShowCommand;
