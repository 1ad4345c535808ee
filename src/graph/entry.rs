use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::DistributionSource;

use super::requirement::DeclaredRequirement;

/// Where an entry's version string came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrigin {
    /// Given by the caller, usually a specifier such as `>=1.0`
    Provided,
    /// Read from installed metadata or a module's `__version__`
    Detected,
    /// Nothing found; the version is empty
    Unknown,
}

/// Identity of an entry: lowercased name and exact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    name: String,
    version: String,
}

impl EntryKey {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            version: version.to_string(),
        }
    }
}

/// One distribution at one version.
///
/// Equality, ordering and hashing all go through [`EntryKey`], so `Foo 1.0`
/// and `foo 1.0` are the same entry while the original spelling is kept for
/// display.
#[derive(Debug, Clone)]
pub struct DistributionEntry {
    name: String,
    key: EntryKey,
    version: String,
    origin: VersionOrigin,
}

impl DistributionEntry {
    /// Entry with a caller supplied version, used verbatim.
    pub fn with_version(name: &str, version: &str) -> Self {
        Self::from_parts(name, version.to_string(), VersionOrigin::Provided)
    }

    /// Entry whose version is looked up in the environment: first the
    /// distribution's metadata, then the `__version__` of a same-named module.
    /// When both are missing the version is empty.
    pub fn detect<S: DistributionSource + ?Sized>(name: &str, source: &S) -> Self {
        match source
            .version(name)
            .or_else(|| source.module_version(name))
        {
            Some(version) => Self::from_parts(name, version, VersionOrigin::Detected),
            None => Self::from_parts(name, String::new(), VersionOrigin::Unknown),
        }
    }

    pub fn new<S: DistributionSource + ?Sized>(
        name: &str,
        version: Option<&str>,
        source: &S,
    ) -> Self {
        match version {
            Some(version) => Self::with_version(name, version),
            None => Self::detect(name, source),
        }
    }

    fn from_parts(name: &str, version: String, origin: VersionOrigin) -> Self {
        Self {
            name: name.to_string(),
            key: EntryKey::new(name, &version),
            version,
            origin,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn origin(&self) -> VersionOrigin {
        self.origin
    }

    pub fn version_provided(&self) -> bool {
        self.origin == VersionOrigin::Provided
    }

    pub fn version_detected(&self) -> bool {
        self.origin == VersionOrigin::Detected
    }

    pub fn key(&self) -> &EntryKey {
        &self.key
    }

    /// Declared dependencies of this distribution.
    ///
    /// Empty when the distribution is not installed. Unparseable requirement
    /// strings are skipped.
    pub fn inspect_requirements<S: DistributionSource + ?Sized>(
        &self,
        source: &S,
    ) -> impl Iterator<Item = DeclaredRequirement> {
        source
            .requires(&self.name)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| DeclaredRequirement::parse(&raw))
    }
}

impl PartialEq for DistributionEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DistributionEntry {}

impl Hash for DistributionEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for DistributionEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistributionEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for DistributionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            VersionOrigin::Provided => write!(f, "{}{}", self.name, self.version),
            VersionOrigin::Detected => write!(f, "{} ={}", self.name, self.version),
            VersionOrigin::Unknown => write!(f, "{}", self.name),
        }
    }
}
