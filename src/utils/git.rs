//! Fetches a file's content at a given Shopware version tag, for
//! `shopware/twig/getBlockDiff`. Tries `git show` against the vendored
//! framework checkout first, since that's free and works offline; falls
//! back to `raw.githubusercontent.com` when the tag isn't available locally
//! (a shallow vendor clone, or a version the workspace never fetched).

use std::path::Path;
use std::process::Command;

use crate::error::Error;

const RAW_GITHUB_BASE: &str = "https://raw.githubusercontent.com/shopware/frameworks";

/// `git show VERSION:PATH` inside `repo`, where `path` is relative to the
/// repository root.
pub fn show(repo: &Path, version: &str, path: &str) -> Result<String, Error> {
    let revision = format!("{version}:{path}");
    let output = Command::new("git").arg("-C").arg(repo).arg("show").arg(&revision).output()?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }

    tracing::debug!(%revision, "git show failed locally, falling back to raw.githubusercontent.com");
    fetch_raw(version, path)
}

fn fetch_raw(version: &str, path: &str) -> Result<String, Error> {
    let url = format!("{RAW_GITHUB_BASE}/{version}/src/Storefront/{path}");

    let body = ureq::get(&url).call()?.body_mut().read_to_string()?;

    Ok(body)
}

pub fn is_git_repository(path: &Path) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(path)
        .arg("rev-parse")
        .arg("--git-dir")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
