use std::collections::BTreeMap;

use super::DistributionSource;

/// Maps importable top-level module names to the distributions providing them.
///
/// Built from each distribution's `top_level.txt`; distributions without one
/// contribute nothing. Lookups are exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    modules: BTreeMap<String, Vec<String>>,
}

impl PackageIndex {
    pub fn from_source<S: DistributionSource + ?Sized>(source: &S) -> Self {
        let mut index = Self::default();
        for dist in source.distributions() {
            for module in &dist.top_level {
                index.insert(module, &dist.name);
            }
        }
        index
    }

    /// Record that `distribution` provides `module`.
    pub fn insert(&mut self, module: &str, distribution: &str) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .push(distribution.to_string());
    }

    /// Distribution names owning `module`, empty when unknown.
    pub fn lookup_owners(&self, module: &str) -> &[String] {
        self.modules.get(module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_known(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Every owner name, modules in sorted order, owners in recorded order.
    /// A distribution providing several modules appears once per module.
    pub fn distribution_names(&self) -> impl Iterator<Item = &str> {
        self.modules.values().flatten().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{InstalledDistribution, MockDistributionSource};

    fn dist(name: &str, top_level: &[&str]) -> InstalledDistribution {
        InstalledDistribution {
            name: name.to_string(),
            version: "1.0".to_string(),
            top_level: top_level.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_source() {
        let mut source = MockDistributionSource::new();
        source.expect_distributions().returning(|| {
            vec![
                dist("PyYAML", &["yaml", "_yaml"]),
                dist("no-top-level", &[]),
                dist("protobuf", &["google"]),
                dist("googleapis-common-protos", &["google"]),
            ]
        });

        let index = PackageIndex::from_source(&source);

        assert_eq!(index.len(), 3);
        assert_eq!(index.lookup_owners("yaml"), ["PyYAML"]);
        assert_eq!(
            index.lookup_owners("google"),
            ["protobuf", "googleapis-common-protos"]
        );
        assert!(index.is_known("_yaml"));
        assert!(!index.is_known("no-top-level"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut index = PackageIndex::default();
        index.insert("Alpha", "alpha-dist");

        assert!(index.is_known("Alpha"));
        assert!(!index.is_known("alpha"));
        assert!(index.lookup_owners("alpha").is_empty());
    }

    #[test]
    fn test_distribution_names_order() {
        let mut index = PackageIndex::default();
        index.insert("zeta", "Zeta");
        index.insert("alpha", "Alpha");
        index.insert("alpha", "Alpha-Extras");

        assert_eq!(
            index.distribution_names().collect::<Vec<_>>(),
            vec!["Alpha", "Alpha-Extras", "Zeta"]
        );
    }
}
