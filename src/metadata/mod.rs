//! Installed package metadata
//!
//! This module reads the metadata that Python installers leave in
//! `site-packages` and exposes it through the [`DistributionSource`]
//! capability, together with the module -> distribution [`PackageIndex`].

mod dist_info;
mod index;
mod site_packages;

pub use dist_info::InstalledDistribution;
pub use index::PackageIndex;
pub use site_packages::{SitePackages, normalize_name};

/// Read-only view of the installed-package universe.
///
/// Every lookup answers "found" (`Some`) or "not found" (`None`); callers
/// decide what a missing answer means. Nothing here is an error.
#[cfg_attr(test, mockall::automock)]
pub trait DistributionSource {
    /// Every installed distribution, in discovery order.
    fn distributions(&self) -> Vec<InstalledDistribution>;

    /// Installed version of a distribution.
    fn version(&self, name: &str) -> Option<String>;

    /// Declared requirement strings of a distribution, markers included.
    /// `Some(vec![])` means installed without requirements.
    fn requires(&self, name: &str) -> Option<Vec<String>>;

    /// `__version__` attribute of an importable top-level module.
    fn module_version(&self, module: &str) -> Option<String>;
}
