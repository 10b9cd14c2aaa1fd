//! Pointer flow graph.

use crate::pta::cs::PointerId;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction::Outgoing;

/// An edge `a -> b` states that the objects pointed to by `a` flow to `b`.
#[derive(Debug, Default)]
pub struct PointerFlowGraph {
    inner: DiGraphMap<PointerId, ()>,
}

impl PointerFlowGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the edge was not already in the graph.
    pub fn add_edge(&mut self, source: PointerId, target: PointerId) -> bool {
        if self.inner.contains_edge(source, target) {
            return false;
        }
        self.inner.add_edge(source, target, ());
        true
    }

    pub fn successors_of(&self, pointer: PointerId) -> impl Iterator<Item = PointerId> + '_ {
        self.inner.neighbors_directed(pointer, Outgoing)
    }

    pub fn contains_edge(&self, source: PointerId, target: PointerId) -> bool {
        self.inner.contains_edge(source, target)
    }

    pub fn nb_pointers(&self) -> usize {
        self.inner.node_count()
    }

    pub fn nb_edges(&self) -> usize {
        self.inner.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_added_once() {
        let (a, b, c) = (PointerId::new(0), PointerId::new(1), PointerId::new(2));
        let mut pfg = PointerFlowGraph::new();
        assert!(pfg.add_edge(a, b));
        assert!(!pfg.add_edge(a, b));
        assert!(pfg.add_edge(b, a));
        assert!(pfg.add_edge(a, a));
        assert!(pfg.add_edge(a, c));
        assert_eq!(pfg.nb_edges(), 4);
        assert_eq!(pfg.nb_pointers(), 3);

        let mut succs: Vec<PointerId> = pfg.successors_of(a).collect();
        succs.sort();
        assert_eq!(succs, vec![a, b, c]);
        assert_eq!(pfg.successors_of(c).count(), 0);
        assert_eq!(pfg.successors_of(PointerId::new(9)).count(), 0);
    }
}
