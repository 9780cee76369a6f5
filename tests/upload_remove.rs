//! `franklin upload --remove` run from inside the checkout it removes.
//!
//! Kept in its own test binary: pruning changes the working directory.

use std::path::Path;
use std::process::Command;

use franklin::cassette::script::Script;

const STATUS: &str = "status --porcelain=v1 -z --untracked-files=all";

#[test]
fn upload_remove_from_inside_the_checkout_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let checkout = dir.path().join("week1");
    std::fs::create_dir_all(checkout.join(".git")).unwrap();
    std::fs::write(checkout.join("notebook.ipynb"), "{}").unwrap();

    let here = Path::new(".");
    let script = Script::new()
        .git_ok(here, "fetch")
        .git(here, STATUS, 0, "")
        .git_ok(here, "add -u")
        .git_ok(here, "diff --cached --quiet")
        .git(here, "rev-list --count @{u}..HEAD", 0, "0\n")
        .git(here, STATUS, 0, "?? franklin.log\0");
    let cassette = dir.path().join("upload.cassette.yaml");
    std::fs::write(&cassette, serde_yaml::to_string(&script.cassette()).unwrap()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_franklin"))
        .args(["upload", "--remove"])
        .current_dir(&checkout)
        .env("FRANKLIN_REPLAY", &cassette)
        .env("FRANKLIN_CONFIG", dir.path().join("no-config.yaml"))
        .env_remove("FRANKLIN_RECORD")
        .output()
        .expect("failed to run franklin binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("No changes to upload."));
    assert!(stdout.contains("Removed "));
    assert!(!checkout.exists());
}
