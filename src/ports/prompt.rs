//! Prompt port for questions put to the user.

/// Asks the user questions on the terminal.
///
/// Every destructive or blocking step in a sync goes through this port so
/// scripted answers can drive the workflows in tests.
pub trait Prompter: Send + Sync {
    /// Asks a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be read.
    fn confirm(
        &self,
        message: &str,
        default: bool,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Asks for a line of text, returning `default` on an empty answer.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be read.
    fn input(
        &self,
        message: &str,
        default: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Asks the user to pick one of `options`; returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if `options` is empty or no answer can be read.
    fn select(
        &self,
        message: &str,
        options: &[String],
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;

    /// Shows `message` and blocks until the user presses Enter.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn pause(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
