//! The interactive Jupyter session.

use std::path::Path;

use tracing::{info, warn};

use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::FranklinError;
use crate::runner::Check;

/// Mount point of the exercise inside the container.
pub const CONTAINER_WORK_DIR: &str = "/home/jovyan/work";

/// Address of the Jupyter lab view of the mounted exercise.
#[must_use]
pub fn lab_url(port: u16) -> String {
    format!("http://localhost:{port}/lab/tree/work")
}

/// Runs Jupyter on the exercise at `path` and blocks until the user is done.
///
/// The image is pulled, a container is started with the checkout mounted,
/// the browser is pointed at it and the container is stopped once the user
/// presses Enter.
///
/// # Errors
///
/// Returns an error if the image cannot be pulled or the container cannot be
/// started.
pub fn launch(
    ctx: &ServiceContext,
    config: &Config,
    image: &str,
    path: &Path,
) -> Result<(), FranklinError> {
    let runner = ctx.runner();
    let runtime = &config.container_runtime;
    let source = std::fs::canonicalize(path)?;

    println!("Fetching the exercise image; this can take a while the first time.");
    runner.run(&format!("{runtime} pull {}", runner.quote_arg(image)), Check::ExitCode)?;

    let mount =
        format!("type=bind,source={},target={CONTAINER_WORK_DIR}", source.to_string_lossy());
    let run = format!(
        "{runtime} run -d --rm -p 127.0.0.1:{port}:8888 --mount {} {} \
         start-notebook.py --IdentityProvider.token=",
        runner.quote_arg(&mount),
        runner.quote_arg(image),
        port = config.jupyter_port,
    );
    let container = runner.run(&run, Check::ExitCode)?.stdout.trim().to_string();
    info!(%container, image, "session started");

    let url = lab_url(config.jupyter_port);
    if let Err(e) = ctx.desktop.open_url(&url) {
        warn!(%url, "could not open browser: {e}");
    }
    println!("Jupyter is running at {url}");
    let done = ctx
        .prompt
        .pause("Press Enter here when you are done to stop Jupyter and upload your work.")
        .map_err(FranklinError::prompt);

    let stop = runner.run(&format!("{runtime} stop {container}"), Check::Ignore)?;
    if !stop.success() {
        warn!(%container, output = %stop.combined(), "could not stop container");
    }
    done
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use super::CONTAINER_WORK_DIR;
    use crate::cassette::script::Script;

    /// Scripts a full session on `path` ending with `pause`.
    pub(crate) fn expect_session(script: Script, image: &str, path: &Path) -> Script {
        let source = std::fs::canonicalize(path).unwrap();
        let mount = format!("type=bind,source={},target={CONTAINER_WORK_DIR}", source.display());
        script
            .ok(&format!("docker pull {}", shell_words::quote(image)))
            .shell(
                &format!(
                    "docker run -d --rm -p 127.0.0.1:8888:8888 --mount {} {} \
                     start-notebook.py --IdentityProvider.token=",
                    shell_words::quote(&mount),
                    shell_words::quote(image)
                ),
                0,
                "c0ffee\n",
                "",
            )
            .open_url("http://localhost:8888/lab/tree/work")
            .pause()
            .ok("docker stop c0ffee")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::expect_session;
    use super::*;
    use crate::cassette::script::Script;

    #[test]
    fn session_runs_and_stops_container() {
        let dir = tempfile::tempdir().unwrap();
        let image = "registry.gitlab.au.dk/franklin/mbg/week1:main";
        let ctx = expect_session(Script::new(), image, dir.path()).context();

        launch(&ctx, &Config::default(), image, dir.path()).unwrap();
        assert_eq!(ctx.unplayed(), 0);
    }

    #[test]
    fn failed_pull_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Script::new()
            .shell("docker pull img:main", 1, "", "manifest unknown")
            .context();
        let err = launch(&ctx, &Config::default(), "img:main", dir.path()).unwrap_err();
        assert!(matches!(err, FranklinError::CommandFailed { .. }));
        assert_eq!(ctx.unplayed(), 0);
    }
}
