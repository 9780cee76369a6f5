//! SSH key setup for GitLab access.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::runner::Check;

/// Page where GitLab users register public keys.
#[must_use]
pub fn key_settings_url(gitlab_domain: &str) -> String {
    format!("https://{gitlab_domain}/-/user_settings/ssh_keys")
}

/// Ensures an ssh key exists and helps the user register it with GitLab.
///
/// A missing key is generated without a passphrase. The public key is
/// printed and put on the clipboard, and the GitLab key page is opened.
/// Returns the private key path.
///
/// # Errors
///
/// Returns an error if `ssh-keygen` fails or the public key cannot be read.
pub fn setup_key(ctx: &ServiceContext, config: &Config) -> Result<PathBuf, FranklinError> {
    let key = config.ssh_key();
    if key.exists() {
        info!(key = %key.display(), "using existing ssh key");
    } else {
        generate_key(ctx, &key)?;
    }

    let public_path = public_key_path(&key);
    let public_key = std::fs::read_to_string(&public_path)?;
    let public_key = public_key.trim();

    let copied = match ctx.desktop.copy_to_clipboard(public_key) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not copy key to clipboard: {e}");
            false
        }
    };

    let url = key_settings_url(&config.gitlab_domain);
    println!("{}", key_instructions(public_key, copied, &url));
    if let Err(e) = ctx.desktop.open_url(&url) {
        warn!(%url, "could not open browser: {e}");
    }
    Ok(key)
}

fn generate_key(ctx: &ServiceContext, key: &Path) -> Result<(), FranklinError> {
    if let Some(dir) = key.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let runner = ctx.runner();
    let command = format!(
        "ssh-keygen -q -t ed25519 -N {} -C franklin -f {}",
        runner.quote_arg(""),
        runner.quote(key)
    );
    runner.run(&command, Check::ExitCode)?;
    info!(key = %key.display(), "generated ssh key");
    Ok(())
}

/// The clipboard may be emptied when franklin exits, so the key is always
/// shown as well.
fn key_instructions(public_key: &str, copied: bool, url: &str) -> String {
    let source = if copied { "It is also on the clipboard." } else { "Copy it from here." };
    format!(
        "Your public key:\n\n{public_key}\n\n{source} \
         Paste it into the 'Key' field at {url} and press 'Add key'."
    )
}

fn public_key_path(key: &Path) -> PathBuf {
    let mut name = key.as_os_str().to_owned();
    name.push(".pub");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::script::Script;

    const PUBLIC: &str = "ssh-ed25519 AAAAC3Nza franklin\n";

    #[test]
    fn existing_key_is_copied_and_page_opened() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("id_ed25519");
        std::fs::write(&key, "private").unwrap();
        std::fs::write(dir.path().join("id_ed25519.pub"), PUBLIC).unwrap();
        let config = Config { ssh_key_path: Some(key.clone()), ..Config::default() };
        let ctx = Script::new()
            .clipboard(None)
            .open_url("https://gitlab.au.dk/-/user_settings/ssh_keys")
            .context();

        assert_eq!(setup_key(&ctx, &config).unwrap(), key);
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn missing_key_is_generated() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("keys").join("gitlab");
        let config = Config { ssh_key_path: Some(key.clone()), ..Config::default() };
        // The scripted ssh-keygen does not write files, so provide the result.
        std::fs::create_dir_all(key.parent().unwrap()).unwrap();
        std::fs::write(dir.path().join("keys").join("gitlab.pub"), PUBLIC).unwrap();
        let ctx = Script::new()
            .ok(&format!(
                "ssh-keygen -q -t ed25519 -N '' -C franklin -f {}",
                shell_words::quote(&key.to_string_lossy())
            ))
            .clipboard(Some("no display"))
            .open_url("https://gitlab.au.dk/-/user_settings/ssh_keys")
            .context();

        setup_key(&ctx, &config).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn key_is_shown_even_when_copied() {
        let url = key_settings_url("gitlab.au.dk");
        for copied in [true, false] {
            let text = key_instructions(PUBLIC.trim(), copied, &url);
            assert!(text.contains("ssh-ed25519 AAAAC3Nza franklin"));
            assert!(text.contains(&url));
        }
        assert!(key_instructions("k", true, &url).contains("clipboard"));
    }

    #[test]
    fn public_key_sits_next_to_private_key() {
        assert_eq!(public_key_path(Path::new("/k/id_ed25519")), PathBuf::from("/k/id_ed25519.pub"));
    }
}
