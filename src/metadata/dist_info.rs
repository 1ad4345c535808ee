//! Parsers for the files found inside `*.dist-info` and `*.egg-info` directories.

use std::path::PathBuf;

/// One distribution as recorded in a site directory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstalledDistribution {
    /// Display name from the `Name` header (falls back to the directory name)
    pub name: String,
    pub version: String,
    /// Raw requirement strings, markers included
    pub requires: Vec<String>,
    /// Top-level importable modules from `top_level.txt`
    pub top_level: Vec<String>,
    /// The `.dist-info` / `.egg-info` path the record was read from
    pub location: PathBuf,
}

/// Kind of metadata directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    DistInfo,
    EggInfo,
}

impl MetadataKind {
    /// Name of the core metadata file inside the directory.
    pub fn metadata_file(self) -> &'static str {
        match self {
            MetadataKind::DistInfo => "METADATA",
            MetadataKind::EggInfo => "PKG-INFO",
        }
    }
}

/// Headers of interest from a `METADATA` / `PKG-INFO` file.
#[derive(Debug, Default, PartialEq)]
pub struct CoreMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub requires_dist: Vec<String>,
}

/// Split a metadata directory name into its kind, name and version.
///
/// `requests-2.31.0.dist-info` -> (`DistInfo`, `requests`, `2.31.0`)
/// `six-1.16.0-py3.11.egg-info` -> (`EggInfo`, `six`, `1.16.0`)
pub fn parse_dir_name(file_name: &str) -> Option<(MetadataKind, String, String)> {
    let (kind, stem) = if let Some(stem) = file_name.strip_suffix(".dist-info") {
        (MetadataKind::DistInfo, stem)
    } else if let Some(stem) = file_name.strip_suffix(".egg-info") {
        (MetadataKind::EggInfo, stem)
    } else {
        return None;
    };

    let (name, rest) = match stem.split_once('-') {
        Some((name, rest)) => (name, rest),
        None => (stem, ""),
    };
    if name.is_empty() {
        return None;
    }

    // egg-info names may carry a python tag: six-1.16.0-py3.11
    let version = match kind {
        MetadataKind::EggInfo => rest.split_once("-py").map_or(rest, |(v, _)| v),
        MetadataKind::DistInfo => rest,
    };

    Some((kind, name.to_string(), version.to_string()))
}

/// Parse the RFC 822 style header block of a core metadata file.
///
/// Parsing stops at the first blank line (the long description follows it).
/// Continuation lines start with whitespace and are appended to the previous value.
pub fn parse_core_metadata(text: &str) -> CoreMetadata {
    let mut headers: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let mut meta = CoreMetadata::default();
    for (key, value) in headers {
        match key.to_ascii_lowercase().as_str() {
            "name" if meta.name.is_none() => meta.name = Some(value),
            "version" if meta.version.is_none() => meta.version = Some(value),
            "requires-dist" => meta.requires_dist.push(value),
            _ => {}
        }
    }
    meta
}

/// Convert an egg-info `requires.txt` into requirement strings.
///
/// Lines under a `[section]` header are conditional; they are given a marker
/// suffix so they look like the `Requires-Dist` form of the same requirement.
pub fn parse_requires_txt(text: &str) -> Vec<String> {
    let mut requirements = Vec::new();
    let mut marker: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            marker = Some(section_marker(section));
            continue;
        }
        match &marker {
            Some(m) => requirements.push(format!("{}; {}", line, m)),
            None => requirements.push(line.to_string()),
        }
    }
    requirements
}

fn section_marker(section: &str) -> String {
    match section.split_once(':') {
        Some(("", condition)) => condition.trim().to_string(),
        Some((extra, condition)) => {
            format!("({}) and extra == \"{}\"", condition.trim(), extra.trim())
        }
        None => format!("extra == \"{}\"", section.trim()),
    }
}

/// Whitespace separated module names from `top_level.txt`.
pub fn parse_top_level(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}
