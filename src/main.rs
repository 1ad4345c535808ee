use anyhow::Result;
use clap::Parser;
use pyreqs::config::{Config, Options};
use pyreqs::generate::generate;
use pyreqs::report::OutputFormat;
use std::path::PathBuf;

/// pyreqs - requirements.txt from the imports of a Python source tree
///
/// Scans ROOT for import statements, maps each imported module to the
/// installed distribution that provides it and writes the distributions
/// together with their dependencies.
///
/// Installed distributions are read from site-packages directories given with
/// --site-packages, from PYREQS_SITE_PACKAGES, from the active VIRTUAL_ENV, or
/// from the sys.path of the Python interpreter, in that order.
#[derive(Parser, Debug)]
#[command(author, version = env!("PYREQS_VERSION"), about)]
struct Cli {
    /// Root directory of the source tree to scan
    #[arg(
        long = "root",
        short = 'r',
        alias = "tvlRootPath",
        value_name = "PATH"
    )]
    pub root: PathBuf,

    /// Output file; a path without extension is a directory receiving requirements.txt
    #[arg(
        long = "out",
        short = 'o',
        value_name = "PATH",
        default_value = "./out/requirements.txt"
    )]
    pub out: PathBuf,

    /// site-packages directory to read installed distributions from (repeatable)
    #[arg(long = "site-packages", short = 's', value_name = "PATH")]
    pub site_packages: Vec<PathBuf>,

    /// Python interpreter queried for sys.path when no site directory is known
    #[arg(
        long = "python",
        env = "PYREQS_PYTHON",
        value_name = "EXE",
        default_value = "python3"
    )]
    pub python: String,

    /// Source file extension to scan (repeatable, defaults to py)
    #[arg(long = "extension", short = 'e', value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Skip files with a path component containing this text (repeatable, defaults to venv)
    #[arg(long = "exclude", value_name = "TEXT")]
    pub excludes: Vec<String>,

    /// Manifest format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print every resolved distribution to stdout
    #[arg(long = "dump-graph")]
    pub dump_graph: bool,
}

impl From<Cli> for Options {
    fn from(cli: Cli) -> Self {
        Options {
            root: cli.root,
            out: cli.out,
            site_packages: cli.site_packages,
            python: cli.python,
            extensions: cli.extensions,
            excludes: cli.excludes,
            format: cli.format,
            dump_graph: cli.dump_graph,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pyreqs::runtime::RealRuntime;

    let config = Config::new(&runtime, cli.into())?;
    generate(&runtime, &config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pyreqs", "--root", "/src"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/src"));
        assert_eq!(cli.out, PathBuf::from("./out/requirements.txt"));
        assert!(cli.site_packages.is_empty());
        assert!(cli.extensions.is_empty());
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.dump_graph);
    }

    #[test]
    fn test_cli_legacy_root_alias() {
        let cli = Cli::try_parse_from(["pyreqs", "--tvlRootPath", "/src"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("/src"));
    }

    #[test]
    fn test_cli_repeatable_options() {
        let cli = Cli::try_parse_from([
            "pyreqs", "-r", "/src", "-o", "/tmp/out", "-s", "/a", "-s", "/b", "-e", "py", "-e",
            "pyi", "--exclude", "build", "--format", "json", "--dump-graph",
        ])
        .unwrap();
        assert_eq!(cli.out, PathBuf::from("/tmp/out"));
        assert_eq!(
            cli.site_packages,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert_eq!(cli.extensions, vec!["py", "pyi"]);
        assert_eq!(cli.excludes, vec!["build"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.dump_graph);

        let options = Options::from(cli);
        assert_eq!(options.site_packages.len(), 2);
    }

    #[test]
    fn test_cli_missing_root_fails() {
        let result = Cli::try_parse_from(["pyreqs"]);
        assert!(result.is_err());
    }
}
