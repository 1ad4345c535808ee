//! Source tree scanning
//!
//! Finds source files below a root directory and collects the top-level
//! module names they import.

mod imports;

pub use imports::extract_imports;

use anyhow::{Result, bail};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Which files a scan looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// File extensions without the leading dot
    pub extensions: Vec<String>,
    /// A file is skipped when any component of its path below the root
    /// contains one of these substrings
    pub excludes: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            excludes: vec!["venv".to_string()],
        }
    }
}

/// All matching source files below `root`, sorted.
#[tracing::instrument(skip(runtime))]
pub fn find_source_files<R: Runtime>(
    runtime: &R,
    root: &Path,
    options: &ScanOptions,
) -> Result<Vec<PathBuf>> {
    if !runtime.is_dir(root) {
        bail!("Source root {:?} is not a directory", root);
    }

    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut files = BTreeSet::new();

    for extension in &options.extensions {
        let pattern = format!(
            "{}/**/*.{}",
            escaped_root,
            extension.trim_start_matches('.')
        );
        for path in runtime.glob(&pattern)? {
            if is_excluded(root, &path, &options.excludes) {
                debug!("Excluding {:?}", path);
                continue;
            }
            // A directory can be named like a source file
            if runtime.is_dir(&path) {
                continue;
            }
            files.insert(path);
        }
    }

    debug!("Found {} source file(s) under {:?}", files.len(), root);
    Ok(files.into_iter().collect())
}

fn is_excluded(root: &Path, path: &Path, excludes: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| {
        let component = component.as_os_str().to_string_lossy();
        excludes
            .iter()
            .any(|ex| !ex.is_empty() && component.contains(ex.as_str()))
    })
}

/// Sorted, de-duplicated top-level modules imported anywhere below `root`.
///
/// Files that cannot be read as text are logged and skipped.
#[tracing::instrument(skip(runtime))]
pub fn scan_imports<R: Runtime>(
    runtime: &R,
    root: &Path,
    options: &ScanOptions,
) -> Result<Vec<String>> {
    let mut modules = BTreeSet::new();

    for file in find_source_files(runtime, root, options)? {
        match runtime.read_to_string(&file) {
            Ok(source) => modules.extend(extract_imports(&source)),
            Err(e) => warn!("Skipping {:?}: {}", file, e),
        }
    }

    debug!("Collected {} imported module(s)", modules.len());
    Ok(modules.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[test]
    fn test_find_source_files_applies_excludes() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/project");

        runtime
            .expect_is_dir()
            .with(eq(root.clone()))
            .returning(|_| true);
        runtime
            .expect_glob()
            .with(eq("/project/**/*.py"))
            .returning(|_| {
                Ok(vec![
                    PathBuf::from("/project/app/main.py"),
                    PathBuf::from("/project/.venv/lib/site.py"),
                    PathBuf::from("/project/venv/bin/activate_this.py"),
                    PathBuf::from("/project/setup.py"),
                ])
            });
        runtime.expect_is_dir().returning(|_| false);

        let files = find_source_files(&runtime, &root, &ScanOptions::default()).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/project/app/main.py"),
                PathBuf::from("/project/setup.py"),
            ]
        );
    }

    #[test]
    fn test_find_source_files_root_containing_exclude_word() {
        // Only components below the root are checked
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/home/venv-user/project");

        runtime.expect_is_dir().with(eq(root.clone())).returning(|_| true);
        runtime
            .expect_glob()
            .returning(|_| Ok(vec![PathBuf::from("/home/venv-user/project/app.py")]));
        runtime.expect_is_dir().returning(|_| false);

        let files = find_source_files(&runtime, &root, &ScanOptions::default()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_find_source_files_multiple_extensions() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/project");

        runtime.expect_is_dir().with(eq(root.clone())).returning(|_| true);
        runtime
            .expect_glob()
            .with(eq("/project/**/*.py"))
            .returning(|_| Ok(vec![PathBuf::from("/project/a.py")]));
        runtime
            .expect_glob()
            .with(eq("/project/**/*.pyi"))
            .returning(|_| Ok(vec![PathBuf::from("/project/a.pyi")]));
        runtime.expect_is_dir().returning(|_| false);

        let options = ScanOptions {
            extensions: vec!["py".into(), ".pyi".into()],
            excludes: vec![],
        };
        let files = find_source_files(&runtime, &root, &options).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_find_source_files_missing_root() {
        let mut runtime = MockRuntime::new();
        runtime.expect_is_dir().returning(|_| false);

        let result = find_source_files(
            &runtime,
            Path::new("/does/not/exist"),
            &ScanOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test_log::test]
    fn test_scan_imports_skips_unreadable_files() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/project");

        runtime.expect_is_dir().with(eq(root.clone())).returning(|_| true);
        runtime.expect_glob().returning(|_| {
            Ok(vec![
                PathBuf::from("/project/ok.py"),
                PathBuf::from("/project/binary.py"),
            ])
        });
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("/project/ok.py")))
            .returning(|_| Ok("import requests\n".to_string()));
        runtime
            .expect_read_to_string()
            .with(eq(PathBuf::from("/project/binary.py")))
            .returning(|_| Err(anyhow::anyhow!("stream did not contain valid UTF-8")));

        let modules = scan_imports(&runtime, &root, &ScanOptions::default()).unwrap();
        assert_eq!(modules, vec!["requests"]);
    }

    #[test]
    fn test_scan_imports_real_tree() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let root = dir.path();

        std::fs::create_dir_all(root.join("pkg")).unwrap();
        std::fs::create_dir_all(root.join(".venv/lib")).unwrap();
        std::fs::write(root.join("main.py"), "import alpha\n").unwrap();
        std::fs::write(root.join("pkg/mod.py"), "from beta.sub import X\nimport alpha\n").unwrap();
        std::fs::write(root.join(".venv/lib/vendored.py"), "import hidden\n").unwrap();
        std::fs::write(root.join("notes.txt"), "import not_python\n").unwrap();

        let modules = scan_imports(&runtime, root, &ScanOptions::default()).unwrap();
        assert_eq!(modules, vec!["alpha", "beta"]);
    }
}
