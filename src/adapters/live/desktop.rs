//! Live desktop adapter: default browser and system clipboard.

use crate::ports::desktop::Desktop;

/// Opens URLs with the platform opener and writes the clipboard with `arboard`.
pub struct LiveDesktop;

impl Desktop for LiveDesktop {
    fn open_url(&self, url: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        open::that(url)?;
        Ok(())
    }

    fn copy_to_clipboard(
        &self,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
