use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    graph::DistributionGraph,
    metadata::{PackageIndex, SitePackages},
    report::Report,
    runtime::Runtime,
    scan::scan_imports,
};

/// Scan the source tree, resolve the installed distributions and write the
/// manifest. Returns the path written.
#[tracing::instrument(skip(runtime, config))]
pub fn generate<R: Runtime>(runtime: &R, config: &Config) -> Result<PathBuf> {
    info!("Scanning {:?} for imports", config.root);
    let imports = scan_imports(runtime, &config.root, &config.scan)?;
    debug!("Imported modules: {:?}", imports);

    let site = SitePackages::load(runtime, &config.site_dirs);
    let index = PackageIndex::from_source(&site);
    debug!("{} importable module(s) are provided by installed distributions", index.len());

    let graph = DistributionGraph::build(&site, &index);
    info!("Resolved {} distribution node(s)", graph.len());

    if config.dump_graph {
        print!("{}", graph_listing(&graph, &site));
    }

    let report = Report::assemble(&graph, &index, &imports);
    let rendered = report.render(config.format)?;

    write_output(runtime, &config.out, &rendered)?;
    info!("Wrote {:?}", config.out);
    Ok(config.out.clone())
}

/// One line per graph node. Nodes backed by an installed distribution of the
/// same version also show where its metadata lives.
fn graph_listing<R: Runtime>(graph: &DistributionGraph, site: &SitePackages<'_, R>) -> String {
    let mut listing = String::new();
    for entry in graph.nodes() {
        match site
            .get(entry.name())
            .filter(|dist| dist.version == entry.version())
        {
            Some(dist) => {
                listing.push_str(&format!("{}\t{}\n", entry, dist.location.display()))
            }
            None => listing.push_str(&format!("{}\n", entry)),
        }
    }
    listing
}

fn write_output<R: Runtime>(runtime: &R, out: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
        && !runtime.exists(parent)
    {
        runtime
            .create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    runtime
        .write(out, contents.as_bytes())
        .with_context(|| format!("Failed to write {:?}", out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OutputFormat;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::scan::ScanOptions;
    use mockall::predicate::eq;
    use tempfile::tempdir;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn config(root: &Path, site: &Path, out: &Path) -> Config {
        Config {
            root: root.to_path_buf(),
            out: out.to_path_buf(),
            site_dirs: vec![site.to_path_buf()],
            scan: ScanOptions::default(),
            format: OutputFormat::Text,
            dump_graph: false,
        }
    }

    #[test]
    fn test_write_output_creates_parent() {
        let mut runtime = MockRuntime::new();
        let out = PathBuf::from("/work/out/requirements.txt");

        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/work/out")))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(PathBuf::from("/work/out")))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/work/out/requirements.txt") && contents == b"x\n"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        write_output(&runtime, &out, "x\n").unwrap();
    }

    #[test]
    fn test_write_output_failure_is_reported() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("read-only file system")));

        let err = write_output(&runtime, Path::new("/ro/requirements.txt"), "").unwrap_err();
        assert!(format!("{:#}", err).contains("read-only file system"));
    }

    #[test]
    fn test_graph_listing_shows_installed_location() {
        let runtime = RealRuntime;
        let site = tempdir().unwrap();

        let alpha = site.path().join("Alpha-1.2.dist-info");
        write(&alpha.join("METADATA"), "Name: Alpha\nVersion: 1.2\n");
        write(&alpha.join("top_level.txt"), "alpha\n");
        let beta = site.path().join("Beta-2.0.dist-info");
        write(
            &beta.join("METADATA"),
            "Name: Beta\nVersion: 2.0\nRequires-Dist: Alpha (>=1.0)\n",
        );
        write(&beta.join("top_level.txt"), "beta\n");

        let packages = SitePackages::load(&runtime, &[site.path().to_path_buf()]);
        let index = PackageIndex::from_source(&packages);
        let graph = DistributionGraph::build(&packages, &index);

        assert_eq!(
            graph_listing(&graph, &packages),
            format!(
                "Alpha =1.2\t{}\nAlpha>=1.0\nBeta =2.0\t{}\n",
                alpha.display(),
                beta.display()
            )
        );
    }

    #[test]
    fn test_generate_end_to_end() {
        let runtime = RealRuntime;
        let project = tempdir().unwrap();
        let site = tempdir().unwrap();
        let out_dir = tempdir().unwrap();

        write(&project.path().join("app.py"), "import alpha\nimport os\n");
        write(
            &project.path().join("pkg/util.py"),
            "from beta.sub import X\n",
        );

        let alpha = site.path().join("Alpha-1.2.dist-info");
        write(&alpha.join("METADATA"), "Name: Alpha\nVersion: 1.2\n");
        write(&alpha.join("top_level.txt"), "alpha\n");

        let beta = site.path().join("Beta-2.0.dist-info");
        write(
            &beta.join("METADATA"),
            "Name: Beta\nVersion: 2.0\nRequires-Dist: Alpha (>=1.0)\n",
        );
        write(&beta.join("top_level.txt"), "beta\n");

        let out = out_dir.path().join("nested/requirements.txt");
        let written = generate(&runtime, &config(project.path(), site.path(), &out)).unwrap();
        assert_eq!(written, out);

        let contents = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            contents,
            "\
# ========= BEGIN Dependencies of required packages ========= #
# Requirement for Alpha =1.2
# Requirement for Alpha>=1.0
# Requirement for Beta =2.0
# \tAlpha>=1.0
Alpha>=1.0
# =========  END  Dependencies of required packages ========= #
# ========= BEGIN         Required packages         ========= #
Alpha =1.2
Beta =2.0
# =========  END          Required packages         ========= #
# Doesn't know package os.
"
        );
    }
}
