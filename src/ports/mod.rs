//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between franklin's sequencing logic and
//! an external collaborator (shell, user prompts, exercise registry,
//! desktop). Implementations live in `src/adapters/`.

pub mod desktop;
pub mod prompt;
pub mod registry;
pub mod shell;

pub use desktop::Desktop;
pub use prompt::Prompter;
pub use registry::{Course, ExerciseListing, ExerciseRegistry};
pub use shell::{ShellExecutor, ShellOutput};
