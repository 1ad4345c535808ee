//! Requirements manifest
//!
//! [`Report::assemble`] walks the imported modules, finds the distributions
//! providing them in the resolved graph and collects their requirements and
//! themselves, each rendered string at most once per run. The report can be
//! rendered as the commented text manifest or as JSON.

mod text;

use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

use crate::graph::{DistributionEntry, DistributionGraph};
use crate::metadata::PackageIndex;

/// Manifest rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// requirements.txt with provenance comments
    #[default]
    Text,
    /// Pretty printed JSON with the same sections
    Json,
}

/// Requirements newly introduced by one required distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    pub distribution: String,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// One group per required distribution, in visiting order
    pub provenance: Vec<Provenance>,
    /// Every requirement of a required distribution, sorted
    pub dependencies: Vec<String>,
    /// Required distributions not already listed as dependencies, sorted
    pub required: Vec<String>,
    /// Imported modules no installed distribution provides
    pub unknown: Vec<String>,
}

impl Report {
    #[tracing::instrument(skip_all)]
    pub fn assemble(graph: &DistributionGraph, index: &PackageIndex, imports: &[String]) -> Self {
        let mut imports: Vec<&str> = imports.iter().map(String::as_str).collect();
        imports.sort_unstable();
        imports.dedup();

        let mut report = Report::default();
        let mut written: HashSet<String> = HashSet::new();

        let mut dependencies: Vec<&DistributionEntry> = Vec::new();
        for &module in &imports {
            for distribution in index.lookup_owners(module) {
                for id in graph.find_by_name(distribution) {
                    let mut group = Provenance {
                        distribution: graph.entry(id).to_string(),
                        requirements: Vec::new(),
                    };
                    for dep in graph.requirements(id) {
                        let entry = graph.entry(dep);
                        let rendered = entry.to_string();
                        if written.insert(rendered.clone()) {
                            group.requirements.push(rendered);
                            dependencies.push(entry);
                        }
                    }
                    report.provenance.push(group);
                }
            }
        }
        report.dependencies = sorted_strings(dependencies);

        let mut required: Vec<&DistributionEntry> = Vec::new();
        for &module in &imports {
            for distribution in index.lookup_owners(module) {
                for id in graph.find_by_name(distribution) {
                    let entry = graph.entry(id);
                    if written.insert(entry.to_string()) {
                        required.push(entry);
                    }
                }
            }
        }
        report.required = sorted_strings(required);

        report.unknown = imports
            .iter()
            .filter(|module| !index.is_known(module))
            .map(|module| module.to_string())
            .collect();

        report
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(text::render(self)?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)? + "\n"),
        }
    }
}

fn sorted_strings(mut entries: Vec<&DistributionEntry>) -> Vec<String> {
    entries.sort();
    entries.iter().map(ToString::to_string).collect()
}
