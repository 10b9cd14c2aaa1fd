use std::fmt;

/// Sizes of the structures built by a solver run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub nb_reachable_methods: usize,
    pub nb_reachable_cs_methods: usize,
    pub nb_call_edges: usize,
    pub nb_pointers: usize,
    pub nb_objs: usize,
    pub nb_cs_objs: usize,
    pub nb_pfg_edges: usize,
    pub nb_worklist_entries: usize,
    /// Dynamically dispatched call sites with at least one receiver object
    /// for which no target method was found.
    pub nb_unresolved_call_sites: usize,
}

impl fmt::Display for AnalysisStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "reachable methods: {}", self.nb_reachable_methods)?;
        writeln!(f, "reachable cs methods: {}", self.nb_reachable_cs_methods)?;
        writeln!(f, "call edges: {}", self.nb_call_edges)?;
        writeln!(f, "pointers: {}", self.nb_pointers)?;
        writeln!(f, "objects: {} ({} context-sensitive)", self.nb_objs, self.nb_cs_objs)?;
        writeln!(f, "pfg edges: {}", self.nb_pfg_edges)?;
        writeln!(f, "processed work-list entries: {}", self.nb_worklist_entries)?;
        write!(f, "unresolved call sites: {}", self.nb_unresolved_call_sites)
    }
}
