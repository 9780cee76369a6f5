//! Desktop port for the browser and the clipboard.

/// Hands things over to the user's desktop session.
pub trait Desktop: Send + Sync {
    /// Opens `url` in the default browser.
    ///
    /// # Errors
    ///
    /// Returns an error if no browser could be launched.
    fn open_url(&self, url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Places `text` on the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard is unavailable (e.g. no display).
    fn copy_to_clipboard(&self, text: &str)
        -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
