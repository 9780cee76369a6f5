//! Live adapters for real external interactions.

pub mod desktop;
pub mod prompt;
pub mod registry;
pub mod shell;

pub use desktop::LiveDesktop;
pub use prompt::TerminalPrompter;
pub use registry::{GitLabRegistry, ListingRegistry};
pub use shell::LiveShellExecutor;
