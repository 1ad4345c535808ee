use anyhow::Result;
use log::{debug, info, warn};
use std::env;
use std::path::{Path, PathBuf};

use crate::{report::OutputFormat, runtime::Runtime, scan::ScanOptions};

/// File name used when the output path names a directory.
pub const DEFAULT_OUTPUT_FILE: &str = "requirements.txt";

/// Colon (or semicolon on Windows) separated list of site directories.
pub const SITE_PACKAGES_ENV: &str = "PYREQS_SITE_PACKAGES";

const SYS_PATH_PROBE: &str = "import sys; print('\\n'.join(sys.path))";

/// Settings as given on the command line, before anything is resolved.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub root: PathBuf,
    pub out: PathBuf,
    pub site_packages: Vec<PathBuf>,
    pub python: String,
    pub extensions: Vec<String>,
    pub excludes: Vec<String>,
    pub format: OutputFormat,
    pub dump_graph: bool,
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub root: PathBuf,
    /// Output file, never a directory
    pub out: PathBuf,
    pub site_dirs: Vec<PathBuf>,
    pub scan: ScanOptions,
    pub format: OutputFormat,
    pub dump_graph: bool,
}

impl Config {
    #[tracing::instrument(skip(runtime))]
    pub fn new<R: Runtime>(runtime: &R, options: Options) -> Result<Self> {
        let site_dirs = if !options.site_packages.is_empty() {
            options.site_packages
        } else {
            site_dirs_from_env(runtime)
                .unwrap_or_else(|| discover_site_dirs(runtime, &options.python))
        };

        if site_dirs.is_empty() {
            warn!("No site-packages directory found; every import will be reported as unknown");
        } else {
            info!("Using site directories: {:?}", site_dirs);
        }

        let defaults = ScanOptions::default();
        let scan = ScanOptions {
            extensions: if options.extensions.is_empty() {
                defaults.extensions
            } else {
                options.extensions
            },
            excludes: if options.excludes.is_empty() {
                defaults.excludes
            } else {
                options.excludes
            },
        };

        Ok(Self {
            root: options.root,
            out: output_file(&options.out),
            site_dirs,
            scan,
            format: options.format,
            dump_graph: options.dump_graph,
        })
    }
}

/// A path without an extension names a directory that receives
/// [`DEFAULT_OUTPUT_FILE`].
pub fn output_file(out: &Path) -> PathBuf {
    if out.extension().is_none() {
        out.join(DEFAULT_OUTPUT_FILE)
    } else {
        out.to_path_buf()
    }
}

fn site_dirs_from_env<R: Runtime>(runtime: &R) -> Option<Vec<PathBuf>> {
    let value = runtime.env_var(SITE_PACKAGES_ENV).ok()?;
    let dirs: Vec<PathBuf> = env::split_paths(&value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    if dirs.is_empty() {
        return None;
    }
    debug!("Site directories from {}: {:?}", SITE_PACKAGES_ENV, dirs);
    Some(dirs)
}

/// Locate site directories when none were configured: the active virtual
/// environment first, then the directories on the interpreter's `sys.path`.
#[tracing::instrument(skip(runtime))]
pub fn discover_site_dirs<R: Runtime>(runtime: &R, python: &str) -> Vec<PathBuf> {
    if let Ok(venv) = runtime.env_var("VIRTUAL_ENV")
        && !venv.is_empty()
    {
        let venv = PathBuf::from(venv);
        let pattern = format!(
            "{}/lib/python*/site-packages",
            glob::Pattern::escape(&venv.to_string_lossy())
        );
        let mut dirs = runtime.glob(&pattern).unwrap_or_else(|e| {
            warn!("Failed to search virtual environment {:?}: {}", venv, e);
            Vec::new()
        });

        let windows_layout = venv.join("Lib").join("site-packages");
        if runtime.is_dir(&windows_layout) {
            dirs.push(windows_layout);
        }

        dirs.sort();
        dirs.dedup();
        if !dirs.is_empty() {
            debug!("Site directories from VIRTUAL_ENV: {:?}", dirs);
            return dirs;
        }
    }

    match runtime.run_command(python, &["-c".to_string(), SYS_PATH_PROBE.to_string()]) {
        Ok(output) => output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|path| runtime.is_dir(path))
            .collect(),
        Err(e) => {
            warn!("Could not query {} for sys.path: {}", python, e);
            Vec::new()
        }
    }
}
