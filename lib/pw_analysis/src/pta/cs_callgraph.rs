//! Context-sensitive call graph, built on the fly by the solver.

use crate::pta::cs::{CSCallSiteId, CSMethodId};
use pw_ir::program::CallKind;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallEdge {
    pub kind: CallKind,
    pub call_site: CSCallSiteId,
    pub callee: CSMethodId,
}

#[derive(Debug, Default)]
pub struct CSCallGraph {
    entries: Vec<CSMethodId>,
    reachable: FxHashSet<CSMethodId>,
    // reachable methods, in discovery order
    reachable_order: Vec<CSMethodId>,
    edges: Vec<CallEdge>,
    edge_ids: FxHashSet<(CSCallSiteId, CSMethodId)>,
    callees: FxHashMap<CSCallSiteId, Vec<usize>>,
    callers: FxHashMap<CSMethodId, Vec<usize>>,
    call_sites: FxHashMap<CSMethodId, Vec<CSCallSiteId>>,
}

impl CSCallGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry_method(&mut self, method: CSMethodId) {
        if !self.entries.contains(&method) {
            self.entries.push(method);
        }
    }

    /// Returns `true` if the method was not reachable yet.
    pub fn add_reachable_method(&mut self, method: CSMethodId) -> bool {
        if self.reachable.insert(method) {
            self.reachable_order.push(method);
            true
        } else {
            false
        }
    }

    /// Returns `true` if there was no edge between the call site and the callee yet.
    pub fn add_edge(&mut self, edge: CallEdge) -> bool {
        if !self.edge_ids.insert((edge.call_site, edge.callee)) {
            return false;
        }
        let id = self.edges.len();
        self.edges.push(edge);
        self.callees.entry(edge.call_site).or_default().push(id);
        self.callers.entry(edge.callee).or_default().push(id);
        true
    }

    /// Records a call site found in the body of a reachable method.
    pub fn add_call_site(&mut self, method: CSMethodId, call_site: CSCallSiteId) {
        self.call_sites.entry(method).or_default().push(call_site);
    }

    pub fn entries(&self) -> &[CSMethodId] {
        &self.entries
    }

    pub fn is_reachable(&self, method: CSMethodId) -> bool {
        self.reachable.contains(&method)
    }

    pub fn reachable_methods(&self) -> impl Iterator<Item = CSMethodId> + '_ {
        self.reachable_order.iter().copied()
    }

    pub fn call_sites_in(&self, method: CSMethodId) -> &[CSCallSiteId] {
        self.call_sites.get(&method).map_or(&[][..], Vec::as_slice)
    }

    pub fn edges_out_of(&self, call_site: CSCallSiteId) -> impl Iterator<Item = &CallEdge> {
        self.callees
            .get(&call_site)
            .into_iter()
            .flatten()
            .map(move |id| &self.edges[*id])
    }

    pub fn edges_into(&self, method: CSMethodId) -> impl Iterator<Item = &CallEdge> {
        self.callers
            .get(&method)
            .into_iter()
            .flatten()
            .map(move |id| &self.edges[*id])
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = &CallEdge> {
        self.edges.iter()
    }

    pub fn nb_reachable_methods(&self) -> usize {
        self.reachable_order.len()
    }

    pub fn nb_edges(&self) -> usize {
        self.edges.len()
    }
}
