//! Context-insensitive view of the call graph computed by the points-to
//! analysis.

use crate::pta::cs::CSManager;
use crate::pta::cs_callgraph::CSCallGraph;
use petgraph::dot::{Config, Dot};
use petgraph::prelude::*;
use petgraph::visit::Reversed;
use pw_ir::program::{CallKind, MethodUid, Program, StmtUid};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

#[derive(Debug, Clone)]
pub struct Method {
    uid: MethodUid,
    class_name: String,
    name: String,
    descriptor: String,
    defined: bool,
    entry: bool,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

impl Method {
    #[inline]
    pub fn uid(&self) -> MethodUid {
        self.uid
    }

    /// Whether the method has a body.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    #[inline]
    pub fn is_entry(&self) -> bool {
        self.entry
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct Call {
    call_sites: BTreeSet<StmtUid>,
    kinds: BTreeSet<CallKind>,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, kind) in self.kinds.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{kind}")?;
        }
        write!(f, " (")?;
        for (i, stmt) in self.call_sites.iter().enumerate() {
            write!(f, "{stmt}")?;
            if i < self.call_sites.len() - 1 {
                write!(f, ", ")?;
            }
        }
        write!(f, ")")
    }
}

impl Call {
    pub fn call_sites(&self) -> &BTreeSet<StmtUid> {
        &self.call_sites
    }

    pub fn kinds(&self) -> &BTreeSet<CallKind> {
        &self.kinds
    }
}

#[derive(Debug)]
pub struct CallGraph {
    inner: DiGraph<Method, Call>,
    node_ids: BTreeMap<MethodUid, NodeIndex>,
}

impl CallGraph {
    /// Merges the contexts of the methods and call sites of a
    /// context-sensitive call graph.
    pub(crate) fn from_cs(program: &Program, manager: &CSManager, cs_call_graph: &CSCallGraph) -> Self {
        let mut inner = DiGraph::new();
        let mut node_ids = BTreeMap::new();

        let entries: BTreeSet<MethodUid> = cs_call_graph
            .entries()
            .iter()
            .map(|cs_method| manager[*cs_method].method())
            .collect();
        for cs_method in cs_call_graph.reachable_methods() {
            let uid = manager[cs_method].method();
            node_ids.entry(uid).or_insert_with(|| {
                let method = &program[uid];
                inner.add_node(Method {
                    uid,
                    class_name: program[method.class()].name().to_string(),
                    name: method.name().to_string(),
                    descriptor: method.to_string(),
                    defined: method.body().is_some(),
                    entry: entries.contains(&uid),
                })
            });
        }

        let mut calls: BTreeMap<(NodeIndex, NodeIndex), Call> = BTreeMap::new();
        for edge in cs_call_graph.iter_edges() {
            let stmt = manager[edge.call_site].call_site();
            let caller = program[stmt].method();
            let callee = manager[edge.callee].method();
            // both ends are reachable
            if let (Some(src), Some(dst)) = (node_ids.get(&caller), node_ids.get(&callee)) {
                let call = calls.entry((*src, *dst)).or_default();
                call.call_sites.insert(stmt);
                call.kinds.insert(edge.kind);
            }
        }
        for ((src, dst), call) in calls {
            inner.add_edge(src, dst, call);
        }

        Self { inner, node_ids }
    }

    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut res = String::new();
        res.push_str("digraph {\n");
        res.push_str("  rankdir=LR;\n");
        let _ = write!(
            res,
            "{}",
            Dot::with_attr_getters(
                &self.inner,
                &[Config::GraphContentOnly],
                &|_, _| String::new(),
                &|_, (_, m)| {
                    let color = if m.is_entry() {
                        "blue"
                    } else if !m.is_defined() {
                        "red"
                    } else {
                        "black"
                    };
                    format!("color={color},shape=box")
                }
            )
        );
        res.push('}');
        res
    }

    /// Keeps only the methods matching the predicate, and all their
    /// transitive callers.
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&Method) -> bool,
    {
        // Since we remove nodes while keeping ids collection,
        // we need to switch to the stable graph representation so
        // that ids are preserved.
        let mut stable_graph: StableDiGraph<_, _> = self.inner.clone().into();

        let mut to_remove: BTreeSet<NodeIndex> = stable_graph.node_indices().collect();

        // remove from the collection all nodes from paths,
        // by doing a backward traversal from targets.
        let reversed = Reversed(&stable_graph);
        let mut dfs = Dfs::empty(reversed);
        for id in stable_graph.node_indices() {
            if predicate(&stable_graph[id]) {
                dfs.move_to(id);
                while let Some(keep_id) = dfs.next(reversed) {
                    to_remove.remove(&keep_id);
                }
            }
        }

        stable_graph.retain_nodes(|_, id| !to_remove.contains(&id));

        let inner: DiGraph<Method, Call> = stable_graph.into();
        let node_ids = inner
            .node_indices()
            .map(|id| (inner[id].uid(), id))
            .collect();
        Self { inner, node_ids }
    }

    pub fn contains_method(&self, method: MethodUid) -> bool {
        self.node_ids.contains_key(&method)
    }

    pub fn iter_methods(&self) -> impl Iterator<Item = &Method> {
        self.inner.node_weights()
    }

    pub fn callees_of(&self, method: MethodUid) -> BTreeSet<MethodUid> {
        self.neighbors(method, Outgoing)
    }

    pub fn callers_of(&self, method: MethodUid) -> BTreeSet<MethodUid> {
        self.neighbors(method, Incoming)
    }

    fn neighbors(&self, method: MethodUid, dir: Direction) -> BTreeSet<MethodUid> {
        let Some(id) = self.node_ids.get(&method) else {
            return BTreeSet::new();
        };
        self.inner
            .neighbors_directed(*id, dir)
            .map(|n| self.inner[n].uid())
            .collect()
    }

    /// The call between two methods, if any.
    pub fn call(&self, caller: MethodUid, callee: MethodUid) -> Option<&Call> {
        let src = self.node_ids.get(&caller)?;
        let dst = self.node_ids.get(&callee)?;
        self.inner
            .find_edge(*src, *dst)
            .map(|edge| &self.inner[edge])
    }

    pub fn nb_methods(&self) -> usize {
        self.inner.node_count()
    }

    pub fn nb_edges(&self) -> usize {
        self.inner.edge_count()
    }
}
