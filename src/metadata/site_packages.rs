use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::runtime::Runtime;

use super::DistributionSource;
use super::dist_info::{
    InstalledDistribution, MetadataKind, parse_core_metadata, parse_dir_name, parse_requires_txt,
    parse_top_level,
};

static VERSION_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^__version__\s*(?::\s*str\s*)?=\s*['"]([^'"]+)['"]"#).unwrap()
});

static MODULE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Normalize a distribution name the way package indexes compare them:
/// lowercase, with runs of `-`, `_` and `.` collapsed into a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalized.is_empty() {
            normalized.push('-');
        }
        pending_separator = false;
        normalized.extend(c.to_lowercase());
    }
    normalized
}

/// Installed distributions read from one or more `site-packages` directories.
///
/// All metadata is read once by [`SitePackages::load`]; only
/// [`DistributionSource::module_version`] touches the file system afterwards.
pub struct SitePackages<'a, R: Runtime> {
    runtime: &'a R,
    site_dirs: Vec<PathBuf>,
    installed: Vec<InstalledDistribution>,
    by_name: HashMap<String, usize>,
}

impl<'a, R: Runtime> SitePackages<'a, R> {
    /// Scan the given site directories in order.
    ///
    /// Missing directories and unreadable metadata are logged and skipped.
    #[tracing::instrument(skip(runtime))]
    pub fn load(runtime: &'a R, site_dirs: &[PathBuf]) -> Self {
        let mut installed = Vec::new();

        for dir in site_dirs {
            if !runtime.is_dir(dir) {
                warn!("Site directory {:?} does not exist, skipping", dir);
                continue;
            }

            let mut entries = match runtime.read_dir(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to list site directory {:?}: {}", dir, e);
                    continue;
                }
            };
            entries.sort();

            for entry in entries {
                if let Some(dist) = read_distribution(runtime, &entry) {
                    debug!("Found {} {} at {:?}", dist.name, dist.version, entry);
                    installed.push(dist);
                }
            }
        }

        // First installation wins, like the import system's search order
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (idx, dist) in installed.iter().enumerate() {
            match by_name.entry(normalize_name(&dist.name)) {
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
                Entry::Occupied(slot) => warn!(
                    "{} {} at {:?} is shadowed by {:?}",
                    dist.name,
                    dist.version,
                    dist.location,
                    installed[*slot.get()].location
                ),
            }
        }

        debug!(
            "Loaded {} distribution(s) from {} site director(ies)",
            installed.len(),
            site_dirs.len()
        );

        Self {
            runtime,
            site_dirs: site_dirs.to_vec(),
            installed,
            by_name,
        }
    }

    pub fn get(&self, name: &str) -> Option<&InstalledDistribution> {
        self.by_name
            .get(&normalize_name(name))
            .map(|&idx| &self.installed[idx])
    }
}

impl<R: Runtime> DistributionSource for SitePackages<'_, R> {
    fn distributions(&self) -> Vec<InstalledDistribution> {
        self.installed.clone()
    }

    fn version(&self, name: &str) -> Option<String> {
        self.get(name).map(|d| d.version.clone())
    }

    fn requires(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).map(|d| d.requires.clone())
    }

    fn module_version(&self, module: &str) -> Option<String> {
        if !MODULE_NAME.is_match(module) {
            return None;
        }

        for dir in &self.site_dirs {
            let candidates = [
                dir.join(module).join("__init__.py"),
                dir.join(format!("{}.py", module)),
            ];
            for candidate in candidates {
                if !self.runtime.exists(&candidate) {
                    continue;
                }
                match self.runtime.read_to_string(&candidate) {
                    Ok(source) => {
                        // The first module found shadows the rest, version or not
                        return VERSION_ASSIGNMENT
                            .captures(&source)
                            .map(|c| c[1].to_string());
                    }
                    Err(e) => debug!("Cannot read {:?}: {}", candidate, e),
                }
            }
        }
        None
    }
}

/// Read one `*.dist-info` / `*.egg-info` entry. Returns `None` for anything else.
fn read_distribution<R: Runtime>(runtime: &R, path: &Path) -> Option<InstalledDistribution> {
    let file_name = path.file_name()?.to_str()?;
    let (kind, dir_name, dir_version) = parse_dir_name(file_name)?;

    // Old setuptools installs may leave a bare PKG-INFO file named *.egg-info
    let (metadata_text, is_dir) = if runtime.is_dir(path) {
        let metadata_path = path.join(kind.metadata_file());
        match runtime.read_to_string(&metadata_path) {
            Ok(text) => (text, true),
            Err(e) => {
                warn!("Skipping {:?}: cannot read {}: {}", path, kind.metadata_file(), e);
                return None;
            }
        }
    } else if kind == MetadataKind::EggInfo {
        match runtime.read_to_string(path) {
            Ok(text) => (text, false),
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                return None;
            }
        }
    } else {
        return None;
    };

    let core = parse_core_metadata(&metadata_text);

    let mut requires = core.requires_dist;
    if is_dir && kind == MetadataKind::EggInfo && requires.is_empty() {
        let requires_path = path.join("requires.txt");
        if runtime.exists(&requires_path)
            && let Ok(text) = runtime.read_to_string(&requires_path)
        {
            requires = parse_requires_txt(&text);
        }
    }

    let top_level = if is_dir {
        let top_level_path = path.join("top_level.txt");
        if runtime.exists(&top_level_path) {
            runtime
                .read_to_string(&top_level_path)
                .map(|text| parse_top_level(&text))
                .unwrap_or_else(|e| {
                    warn!("Cannot read {:?}: {}", top_level_path, e);
                    Vec::new()
                })
        } else {
            Vec::new()
        }
    } else {
        Vec::new()
    };

    Some(InstalledDistribution {
        name: core.name.unwrap_or(dir_name),
        version: core.version.unwrap_or(dir_version),
        requires,
        top_level,
        location: path.to_path_buf(),
    })
}
