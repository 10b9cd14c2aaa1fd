//! Queries on the outcome of a solver run.

use crate::callgraph::CallGraph;
use crate::pta::context::{Context, ContextElem};
use crate::pta::cs::*;
use crate::pta::cs_callgraph::{CSCallGraph, CallEdge};
use crate::pta::heap::{HeapModel, ObjId};
use crate::pta::pts::PointsToSet;
use crate::pta::stats::AnalysisStats;
use pw_ir::program::{FieldUid, MethodUid, Program, StmtUid, VarUid};
use std::collections::BTreeSet;

pub struct PointerAnalysisResult<'p> {
    program: &'p Program,
    manager: CSManager,
    call_graph: CSCallGraph,
    heap: Box<dyn HeapModel>,
    stats: AnalysisStats,
}

impl<'p> PointerAnalysisResult<'p> {
    pub(crate) fn new(
        program: &'p Program,
        manager: CSManager,
        call_graph: CSCallGraph,
        heap: Box<dyn HeapModel>,
        stats: AnalysisStats,
    ) -> Self {
        Self {
            program,
            manager,
            call_graph,
            heap,
            stats,
        }
    }

    #[inline]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    #[inline]
    pub fn cs_manager(&self) -> &CSManager {
        &self.manager
    }

    #[inline]
    pub fn cs_call_graph(&self) -> &CSCallGraph {
        &self.call_graph
    }

    pub fn heap(&self) -> &dyn HeapModel {
        self.heap.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    pub fn reachable_cs_methods(&self) -> impl Iterator<Item = CSMethodId> + '_ {
        self.call_graph.reachable_methods()
    }

    /// Reachable methods, whatever their contexts.
    pub fn reachable_methods(&self) -> BTreeSet<MethodUid> {
        self.reachable_cs_methods()
            .map(|cs_method| self.manager[cs_method].method())
            .collect()
    }

    /// The contexts a method has been reached in.
    pub fn contexts_of(&self, method: MethodUid) -> Vec<&Context> {
        self.reachable_cs_methods()
            .map(|cs_method| &self.manager[cs_method])
            .filter(|cs_method| cs_method.method() == method)
            .map(CSMethod::context)
            .collect()
    }

    pub fn edges_out_of(&self, call_site: CSCallSiteId) -> impl Iterator<Item = &CallEdge> {
        self.call_graph.edges_out_of(call_site)
    }

    /// Methods called from a call site, in any context.
    pub fn callees_of(&self, call_site: StmtUid) -> BTreeSet<MethodUid> {
        self.call_graph
            .iter_edges()
            .filter(|edge| self.manager[edge.call_site].call_site() == call_site)
            .map(|edge| self.manager[edge.callee].method())
            .collect()
    }

    #[inline]
    pub fn points_to(&self, pointer: PointerId) -> &PointsToSet {
        self.manager.points_to(pointer)
    }

    pub fn points_to_cs_var(&self, context: &Context, var: VarUid) -> PointsToSet {
        self.manager
            .find_cs_var(context, var)
            .map(|pointer| self.points_to(pointer).clone())
            .unwrap_or_default()
    }

    /// Objects a variable may point to, in any context.
    pub fn points_to_var(&self, var: VarUid) -> BTreeSet<ObjId> {
        self.manager
            .cs_vars_of(var)
            .iter()
            .flat_map(|pointer| self.points_to(*pointer).iter())
            .map(|cs_obj| self.manager[cs_obj].obj())
            .collect()
    }

    pub fn points_to_instance_field(&self, base: CSObjId, field: FieldUid) -> PointsToSet {
        self.manager
            .find_instance_field(base, field)
            .map(|pointer| self.points_to(pointer).clone())
            .unwrap_or_default()
    }

    pub fn points_to_array_index(&self, array: CSObjId) -> PointsToSet {
        self.manager
            .find_array_index(array)
            .map(|pointer| self.points_to(pointer).clone())
            .unwrap_or_default()
    }

    pub fn points_to_static_field(&self, field: FieldUid) -> BTreeSet<ObjId> {
        self.manager
            .find_static_field(field)
            .map(|pointer| self.objs_of(self.points_to(pointer)))
            .unwrap_or_default()
    }

    /// Context-sensitive objects of an abstract object.
    pub fn cs_objs_of(&self, obj: ObjId) -> Vec<CSObjId> {
        self.manager
            .iter_cs_objs()
            .filter(|(_, cs_obj)| cs_obj.obj() == obj)
            .map(|(id, _)| id)
            .collect()
    }

    /// Projects a points-to set to abstract objects.
    pub fn objs_of(&self, pts: &PointsToSet) -> BTreeSet<ObjId> {
        pts.iter().map(|cs_obj| self.manager[cs_obj].obj()).collect()
    }

    pub fn obj_descr(&self, obj: ObjId) -> String {
        self.heap.obj(obj).descr(self.program)
    }

    pub fn cs_obj_descr(&self, cs_obj: CSObjId) -> String {
        let cs_obj = &self.manager[cs_obj];
        format!(
            "{}:{}",
            self.context_descr(cs_obj.context()),
            self.obj_descr(cs_obj.obj())
        )
    }

    /// Human readable context, naming its call sites, objects and types.
    pub fn context_descr(&self, context: &Context) -> String {
        let elems: Vec<String> = context
            .elems()
            .iter()
            .map(|elem| match elem {
                ContextElem::CallSite(stmt) => self.program.stmt_descr(*stmt),
                ContextElem::Obj(obj) => self.obj_descr(*obj),
                ContextElem::Type(class) => self.program[*class].name().to_string(),
            })
            .collect();
        format!("[{}]", elems.join(", "))
    }

    /// Context-insensitive projection of the call graph.
    pub fn call_graph(&self) -> CallGraph {
        CallGraph::from_cs(self.program, &self.manager, &self.call_graph)
    }
}
