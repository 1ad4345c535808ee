//! Distribution graph
//!
//! Builds the transitive dependency graph of every installed distribution.
//!
//! Construction seeds one node per distribution named in the
//! [`PackageIndex`](crate::metadata::PackageIndex), then works through a
//! frontier of unprocessed nodes: each node's declared requirements are
//! resolved to existing nodes or materialized as new ones, and new nodes form
//! the next frontier. A node is processed exactly once, so construction ends
//! after at most one pass per distinct `(name, version)` identity, cycles
//! included.
//!
//! The graph is immutable once built.

mod entry;
mod requirement;

pub use entry::{DistributionEntry, EntryKey, VersionOrigin};
pub use requirement::DeclaredRequirement;

use log::debug;
use std::collections::{BTreeSet, HashMap};

use crate::metadata::{DistributionSource, PackageIndex};

/// Index of a node inside its [`DistributionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    entry: DistributionEntry,
    requirements: BTreeSet<NodeId>,
}

#[derive(Debug, Default)]
pub struct DistributionGraph {
    nodes: Vec<Node>,
    ids: HashMap<EntryKey, NodeId>,
}

impl DistributionGraph {
    /// Resolve the full graph for every distribution in `index`.
    #[tracing::instrument(skip_all)]
    pub fn build<S: DistributionSource + ?Sized>(source: &S, index: &PackageIndex) -> Self {
        let mut graph = Self::default();

        let mut frontier = Vec::new();
        for name in index.distribution_names() {
            let (id, added) = graph.insert(DistributionEntry::detect(name, source));
            if added {
                frontier.push(id);
            }
        }
        debug!("Seeded graph with {} distribution(s)", graph.len());

        let mut passes = 0;
        while !frontier.is_empty() {
            passes += 1;
            let mut next = Vec::new();

            for id in frontier {
                let declared: Vec<DeclaredRequirement> = graph.nodes[id.0]
                    .entry
                    .inspect_requirements(source)
                    .collect();

                for requirement in declared {
                    let (dep, added) = graph.resolve(&requirement, source);
                    if added {
                        next.push(dep);
                    }
                    graph.nodes[id.0].requirements.insert(dep);
                }
            }

            debug!(
                "Pass {}: {} new node(s), {} total",
                passes,
                next.len(),
                graph.len()
            );
            frontier = next;
        }

        debug!(
            "Resolved {} node(s) in {} pass(es)",
            graph.len(),
            passes
        );
        graph
    }

    /// Find or create the node for a declared requirement.
    ///
    /// With a version the identity is known up front. Without one, the
    /// installed version is detected first and forms the identity.
    fn resolve<S: DistributionSource + ?Sized>(
        &mut self,
        requirement: &DeclaredRequirement,
        source: &S,
    ) -> (NodeId, bool) {
        match &requirement.version {
            Some(version) => {
                if let Some(&id) = self.ids.get(&EntryKey::new(&requirement.name, version)) {
                    return (id, false);
                }
                self.insert(DistributionEntry::with_version(&requirement.name, version))
            }
            None => self.insert(DistributionEntry::detect(&requirement.name, source)),
        }
    }

    /// Insert an entry unless an equal one exists. Returns the node id and
    /// whether the node is new.
    fn insert(&mut self, entry: DistributionEntry) -> (NodeId, bool) {
        if let Some(&id) = self.ids.get(entry.key()) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len());
        self.ids.insert(entry.key().clone(), id);
        self.nodes.push(Node {
            entry,
            requirements: BTreeSet::new(),
        });
        (id, true)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node with the given identity. The name compares case-insensitively.
    pub fn find(&self, name: &str, version: &str) -> Option<NodeId> {
        self.ids.get(&EntryKey::new(name, version)).copied()
    }

    /// Every node whose name is exactly `name`, in entry order.
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = self
            .ids()
            .filter(|&id| self.entry(id).name() == name)
            .collect();
        found.sort_by(|a, b| self.entry(*a).cmp(self.entry(*b)));
        found
    }

    pub fn entry(&self, id: NodeId) -> &DistributionEntry {
        &self.nodes[id.0].entry
    }

    /// Direct requirements of a node, in entry order.
    pub fn requirements(&self, id: NodeId) -> Vec<NodeId> {
        let mut reqs: Vec<NodeId> = self.nodes[id.0].requirements.iter().copied().collect();
        reqs.sort_by(|a, b| self.entry(*a).cmp(self.entry(*b)));
        reqs
    }

    /// Node ids in insertion order.
    fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Every node's entry, sorted.
    pub fn nodes(&self) -> Vec<&DistributionEntry> {
        let mut entries: Vec<&DistributionEntry> = self.nodes.iter().map(|n| &n.entry).collect();
        entries.sort();
        entries
    }
}
