use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static IMPORT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(import (\S+)\s*)|(from\s+(\S+)\s+import\s+\S+)").unwrap()
});

static TOP_LEVEL_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^.,\s]+").unwrap());

/// Top-level module names imported by a piece of Python source.
///
/// Recognizes `import a.b` and `from a.b import c` anywhere in the text and
/// keeps the first dotted segment. Relative imports (`from . import x`,
/// `from .mod import x`) yield nothing.
pub fn extract_imports(source: &str) -> BTreeSet<String> {
    IMPORT_STATEMENT
        .captures_iter(source)
        .filter_map(|c| c.get(2).or_else(|| c.get(4)))
        .filter_map(|path| TOP_LEVEL_SEGMENT.find(path.as_str()))
        .map(|m| m.as_str().to_string())
        .collect()
}
