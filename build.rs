//! Stamps `PYREQS_VERSION` for `pyreqs --version`.
//!
//! Resolution order: `PYREQS_BUILD_VERSION`, then the manifest version unless
//! it is the `-dev` placeholder, then `git describe`.

use std::{
    env,
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=PYREQS_BUILD_VERSION");

    let version = env::var("PYREQS_BUILD_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(release_version)
        .or_else(git_version)
        .unwrap_or_else(|| format!("0.0.0-unknown-{}", timestamp()));

    println!("cargo:rustc-env=PYREQS_VERSION={}", version);
}

fn release_version() -> Option<String> {
    env::var("CARGO_PKG_VERSION")
        .ok()
        .filter(|v| !v.ends_with("-dev"))
}

fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let version = described.strip_prefix('v').unwrap_or(described);

    match version {
        "" => None,
        dirty if dirty.ends_with("-dirty") => Some(format!("{}-{}", dirty, timestamp())),
        clean => Some(clean.to_string()),
    }
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
