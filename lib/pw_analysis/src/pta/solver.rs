//! The points-to solver.
//!
//! Methods become reachable on the fly: when a context-sensitive method is
//! first reached, its statements are visited once to build pointer flow
//! edges and seed the work-list. The main loop then propagates points-to
//! sets along the pointer flow graph; each new object reaching a variable
//! wires the field and array accesses based on that variable, and
//! dispatches the invocations it is the receiver of, which may in turn
//! make new methods reachable.

use crate::errors::{AnalysisError, AnalysisResult};
use crate::pta::context::Context;
use crate::pta::cs::*;
use crate::pta::cs_callgraph::{CSCallGraph, CallEdge};
use crate::pta::heap::{AllocationSiteHeapModel, HeapModel};
use crate::pta::options::AnalysisOptions;
use crate::pta::pfg::PointerFlowGraph;
use crate::pta::plugin::{MainArgsHandler, Plugin};
use crate::pta::pts::PointsToSet;
use crate::pta::result::PointerAnalysisResult;
use crate::pta::selector::{make_selector, ContextSelector};
use crate::pta::stats::AnalysisStats;
use crate::pta::worklist::WorkList;
use pw_ir::program::{Body, CallKind, Method, MethodDescr, MethodUid, Program, StmtKind, StmtUid};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::convert::TryFrom;

pub struct Solver<'p> {
    program: &'p Program,
    options: AnalysisOptions,
    heap: Box<dyn HeapModel>,
    selector: Box<dyn ContextSelector>,
    manager: CSManager,
    call_graph: CSCallGraph,
    pfg: PointerFlowGraph,
    worklist: WorkList,
    // reached methods whose statements are not visited yet
    pending_methods: VecDeque<CSMethodId>,
    // targets of the statically bound invocations
    static_targets: FxHashMap<StmtUid, MethodUid>,
    unresolved_call_sites: FxHashSet<StmtUid>,
    nb_worklist_entries: usize,
    plugins: Vec<Box<dyn Plugin>>,
}

impl<'p> Solver<'p> {
    #[must_use]
    pub fn new(program: &'p Program, options: &AnalysisOptions) -> Self {
        let mut solver = Self {
            program,
            options: options.clone(),
            heap: Box::new(AllocationSiteHeapModel::new()),
            selector: make_selector(options.cs),
            manager: CSManager::new(),
            call_graph: CSCallGraph::new(),
            pfg: PointerFlowGraph::new(),
            worklist: WorkList::new(),
            pending_methods: VecDeque::new(),
            static_targets: FxHashMap::default(),
            unresolved_call_sites: FxHashSet::default(),
            nb_worklist_entries: 0,
            plugins: Vec::new(),
        };
        if options.mock_main_args {
            solver.add_plugin(Box::new(MainArgsHandler::new()));
        }
        solver
    }

    /// Replaces the default allocation-site heap model.
    #[must_use]
    pub fn with_heap_model(mut self, heap: Box<dyn HeapModel>) -> Self {
        self.heap = heap;
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: Box<dyn ContextSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Runs the analysis until the fixpoint is reached.
    pub fn solve(mut self) -> AnalysisResult<PointerAnalysisResult<'p>> {
        log::debug!("starting {} points-to analysis", self.options.cs);
        self.initialize()?;
        self.notify(|plugin, solver| plugin.on_start(solver));
        self.analyze()?;
        self.notify(|plugin, solver| plugin.on_finish(solver));
        if !self.worklist.is_empty() {
            log::warn!(
                "{} facts injected after the fixpoint are ignored",
                self.worklist.len()
            );
        }

        let stats = self.stats();
        log::info!("points-to analysis done:\n{stats}");
        Ok(PointerAnalysisResult::new(
            self.program,
            self.manager,
            self.call_graph,
            self.heap,
            stats,
        ))
    }

    fn initialize(&mut self) -> AnalysisResult<()> {
        let entry = self.entry_method()?;
        self.resolve_static_targets()?;
        log::debug!(
            "{} statically bound call sites resolved",
            self.static_targets.len()
        );

        let context = self.selector.empty_context();
        let cs_entry = self.manager.get_cs_method(&context, entry);
        self.call_graph.add_entry_method(cs_entry);
        self.add_reachable(cs_entry);
        self.visit_pending_methods()
    }

    fn entry_method(&self) -> AnalysisResult<MethodUid> {
        if let Some(entry) = &self.options.entry {
            let descr = MethodDescr::try_from(entry.as_str())?;
            return self
                .program
                .find_method_by_descriptor(&descr)
                .map(Method::uid)
                .ok_or_else(|| AnalysisError::MissingEntryPoint(format!("method {entry} not found")));
        }
        self.program
            .entry()
            .ok_or_else(|| AnalysisError::MissingEntryPoint("program has no entry method".to_string()))
    }

    /// Binds every static and special invocation of the program to its
    /// target. Any failure is fatal.
    fn resolve_static_targets(&mut self) -> AnalysisResult<()> {
        let program = self.program;
        for stmt in program.iter_stmts() {
            let Some(invoke) = stmt.as_invoke() else {
                continue;
            };
            if !invoke.kind().is_statically_bound() {
                continue;
            }
            let callee = program.resolve_callee(None, invoke).ok_or_else(|| {
                AnalysisError::UnresolvedStaticCallee {
                    call_site: program.stmt_descr(stmt.uid()),
                    callee: invoke.method_ref().to_string(),
                }
            })?;
            self.static_targets.insert(stmt.uid(), callee);
        }
        Ok(())
    }

    /// Marks a method as reachable. Its statements are visited later, by
    /// `visit_pending_methods`.
    fn add_reachable(&mut self, cs_method: CSMethodId) {
        if self.call_graph.add_reachable_method(cs_method) {
            self.pending_methods.push_back(cs_method);
        }
    }

    /// Visits the statements of the newly reachable methods, including the
    /// ones their static calls make reachable.
    fn visit_pending_methods(&mut self) -> AnalysisResult<()> {
        let program = self.program;
        while let Some(cs_method) = self.pending_methods.pop_front() {
            let method = self.manager[cs_method].method();
            let context = self.manager[cs_method].context().clone();
            log::trace!("new reachable method {} in context {}", program[method], context);

            if let Some(body) = program[method].body() {
                for stmt in body.stmts() {
                    self.visit_stmt(cs_method, &context, *stmt)?;
                }
            }
            self.notify(|plugin, solver| plugin.on_new_cs_method(solver, cs_method));
        }
        Ok(())
    }

    fn visit_stmt(&mut self, cs_method: CSMethodId, context: &Context, stmt: StmtUid) -> AnalysisResult<()> {
        let program = self.program;
        match program[stmt].kind() {
            StmtKind::New { lhs, .. } => {
                let obj = self.heap.get_obj(program, stmt)?;
                let obj = self.heap.obj(obj);
                let heap_context = self
                    .selector
                    .select_heap_context(&self.manager[cs_method], obj);
                let cs_obj = self.manager.get_cs_obj(&heap_context, obj);
                let lhs = self.manager.get_cs_var(context, *lhs);
                self.worklist.push(lhs, PointsToSet::singleton(cs_obj));
            }
            StmtKind::Copy { lhs, rhs } => {
                let rhs = self.manager.get_cs_var(context, *rhs);
                let lhs = self.manager.get_cs_var(context, *lhs);
                self.add_pfg_edge(rhs, lhs);
            }
            StmtKind::StaticStore { field, rhs } => {
                let rhs = self.manager.get_cs_var(context, *rhs);
                let field = self.manager.get_static_field(*field);
                self.add_pfg_edge(rhs, field);
            }
            StmtKind::StaticLoad { lhs, field } => {
                let field = self.manager.get_static_field(*field);
                let lhs = self.manager.get_cs_var(context, *lhs);
                self.add_pfg_edge(field, lhs);
            }
            StmtKind::Invoke(invoke) => {
                let cs_call_site = self.manager.get_cs_call_site(context, stmt);
                self.call_graph.add_call_site(cs_method, cs_call_site);
                if invoke.kind() == CallKind::Static {
                    let callee = self.static_target(stmt)?;
                    let callee_context = self
                        .selector
                        .select_context(&self.manager[cs_call_site], callee);
                    let cs_callee = self.manager.get_cs_method(&callee_context, callee);
                    self.process_call_edge(CallEdge {
                        kind: CallKind::Static,
                        call_site: cs_call_site,
                        callee: cs_callee,
                    })?;
                }
            }
            // depend on the objects pointed to by their base variable
            StmtKind::InstanceStore { .. }
            | StmtKind::InstanceLoad { .. }
            | StmtKind::ArrayStore { .. }
            | StmtKind::ArrayLoad { .. }
            | StmtKind::Return(_) => (),
        }
        Ok(())
    }

    fn static_target(&self, stmt: StmtUid) -> AnalysisResult<MethodUid> {
        self.static_targets.get(&stmt).copied().ok_or_else(|| {
            AnalysisError::Internal(format!(
                "no target recorded for {}",
                self.program.stmt_descr(stmt)
            ))
        })
    }

    /// Adds the edge `source -> target` to the pointer flow graph. If the
    /// edge is new, the objects already pointed to by `source` are
    /// scheduled for propagation to `target`.
    pub fn add_pfg_edge(&mut self, source: PointerId, target: PointerId) {
        if self.pfg.add_edge(source, target) {
            let pts = self.manager.points_to(source);
            if !pts.is_empty() {
                self.worklist.push(target, pts.clone());
            }
        }
    }

    /// Pushes additional facts to the work-list: `objs` will be added to the
    /// points-to set of `pointer`, and propagated from there.
    pub fn inject(&mut self, pointer: PointerId, objs: PointsToSet) {
        log::trace!("injecting {} objects to {}", objs.len(), pointer);
        self.worklist.push(pointer, objs);
    }

    fn analyze(&mut self) -> AnalysisResult<()> {
        loop {
            self.visit_pending_methods()?;
            let Some((pointer, pts)) = self.worklist.pop() else {
                break;
            };
            self.nb_worklist_entries += 1;
            let delta = self.propagate(pointer, &pts);
            if delta.is_empty() {
                continue;
            }
            if let Pointer::Var(cs_var) = &self.manager[pointer] {
                let cs_var = cs_var.clone();
                for obj in delta.iter() {
                    self.process_instance_accesses(&cs_var, obj);
                    self.process_call(&cs_var, obj)?;
                }
                self.notify(|plugin, solver| plugin.on_new_points_to_set(solver, pointer, &delta));
            }
        }
        log::debug!(
            "fixpoint reached after {} work-list entries",
            self.nb_worklist_entries
        );
        Ok(())
    }

    /// Adds to the points-to set of `pointer` the objects of `pts` it does
    /// not contain yet, forwards them to its successors and returns them.
    fn propagate(&mut self, pointer: PointerId, pts: &PointsToSet) -> PointsToSet {
        let current = self.manager.points_to_mut(pointer);
        let delta = pts.difference(current);
        if !delta.is_empty() {
            current.union_with(&delta);
            for succ in self.pfg.successors_of(pointer) {
                self.worklist.push(succ, delta.clone());
            }
        }
        delta
    }

    /// Connects the field and array slots of a new object of `cs_var` to
    /// the variables stored to or loaded from them.
    fn process_instance_accesses(&mut self, cs_var: &CSVar, obj: CSObjId) {
        let program = self.program;
        let var = &program[cs_var.var()];
        let context = cs_var.context();

        for stmt in var.store_fields() {
            if let StmtKind::InstanceStore { field, rhs, .. } = program[*stmt].kind() {
                let slot = self.manager.get_instance_field(obj, *field);
                let rhs = self.manager.get_cs_var(context, *rhs);
                self.add_pfg_edge(rhs, slot);
            }
        }
        for stmt in var.load_fields() {
            if let StmtKind::InstanceLoad { lhs, field, .. } = program[*stmt].kind() {
                let slot = self.manager.get_instance_field(obj, *field);
                let lhs = self.manager.get_cs_var(context, *lhs);
                self.add_pfg_edge(slot, lhs);
            }
        }
        for stmt in var.store_arrays() {
            if let StmtKind::ArrayStore { rhs, .. } = program[*stmt].kind() {
                let slot = self.manager.get_array_index(obj);
                let rhs = self.manager.get_cs_var(context, *rhs);
                self.add_pfg_edge(rhs, slot);
            }
        }
        for stmt in var.load_arrays() {
            if let StmtKind::ArrayLoad { lhs, .. } = program[*stmt].kind() {
                let slot = self.manager.get_array_index(obj);
                let lhs = self.manager.get_cs_var(context, *lhs);
                self.add_pfg_edge(slot, lhs);
            }
        }
    }

    /// Dispatches the invocations whose receiver is `cs_var` on the new
    /// receiver object `recv`.
    fn process_call(&mut self, cs_var: &CSVar, recv: CSObjId) -> AnalysisResult<()> {
        let program = self.program;
        let context = cs_var.context();

        for stmt in program[cs_var.var()].invokes() {
            let Some(invoke) = program[*stmt].as_invoke() else {
                continue;
            };
            let callee = if invoke.kind() == CallKind::Special {
                Some(self.static_target(*stmt)?)
            } else {
                let recv_type = self.heap.obj(self.manager[recv].obj()).type_();
                program.resolve_callee(Some(recv_type), invoke)
            };
            let Some(callee) = callee else {
                log::trace!(
                    "no target for {} on {}",
                    program.stmt_descr(*stmt),
                    self.heap.obj(self.manager[recv].obj()).descr(program)
                );
                self.unresolved_call_sites.insert(*stmt);
                continue;
            };

            let cs_call_site = self.manager.get_cs_call_site(context, *stmt);
            let callee_context = self.selector.select_context_with_receiver(
                &self.manager[cs_call_site],
                &self.manager[recv],
                callee,
            );
            let cs_callee = self.manager.get_cs_method(&callee_context, callee);
            if let Some(this) = program[callee].body().and_then(Body::this) {
                let this = self.manager.get_cs_var(&callee_context, this);
                self.worklist.push(this, PointsToSet::singleton(recv));
            }
            self.process_call_edge(CallEdge {
                kind: invoke.kind(),
                call_site: cs_call_site,
                callee: cs_callee,
            })?;
        }
        Ok(())
    }

    /// Adds a call edge. If it is new, the callee becomes reachable and
    /// arguments and returned values are connected.
    fn process_call_edge(&mut self, edge: CallEdge) -> AnalysisResult<()> {
        if !self.call_graph.add_edge(edge) {
            return Ok(());
        }
        let program = self.program;
        let call_site = &self.manager[edge.call_site];
        let caller_context = call_site.context().clone();
        let stmt = call_site.call_site();
        let callee = &self.manager[edge.callee];
        let callee_context = callee.context().clone();
        let callee = callee.method();
        log::trace!(
            "new {} call edge {} -> {}",
            edge.kind,
            program.stmt_descr(stmt),
            program[callee]
        );

        self.add_reachable(edge.callee);

        let invoke = program[stmt].as_invoke().ok_or_else(|| {
            AnalysisError::Internal(format!("{} is not a call site", program.stmt_descr(stmt)))
        })?;
        if let Some(body) = program[callee].body() {
            if invoke.args().len() != body.params().len() {
                log::warn!(
                    "{}: {} arguments given to {} which expects {}",
                    program.stmt_descr(stmt),
                    invoke.args().len(),
                    program[callee],
                    body.params().len()
                );
            }
            for (arg, param) in invoke.args().iter().zip(body.params()) {
                let arg = self.manager.get_cs_var(&caller_context, *arg);
                let param = self.manager.get_cs_var(&callee_context, *param);
                self.add_pfg_edge(arg, param);
            }
            if let Some(result) = invoke.result() {
                let result = self.manager.get_cs_var(&caller_context, result);
                for ret in body.return_vars() {
                    let ret = self.manager.get_cs_var(&callee_context, *ret);
                    self.add_pfg_edge(ret, result);
                }
            }
        }
        self.notify(|plugin, solver| plugin.on_new_call_edge(solver, &edge));
        Ok(())
    }

    fn notify<F>(&mut self, mut hook: F)
    where
        F: FnMut(&mut dyn Plugin, &mut Self),
    {
        if self.plugins.is_empty() {
            return;
        }
        let mut plugins = std::mem::take(&mut self.plugins);
        for plugin in &mut plugins {
            hook(plugin.as_mut(), self);
        }
        // keep plugins registered by the hooks themselves
        plugins.append(&mut self.plugins);
        self.plugins = plugins;
    }

    fn stats(&self) -> AnalysisStats {
        let reachable_methods: FxHashSet<MethodUid> = self
            .call_graph
            .reachable_methods()
            .map(|cs_method| self.manager[cs_method].method())
            .collect();
        AnalysisStats {
            nb_reachable_methods: reachable_methods.len(),
            nb_reachable_cs_methods: self.call_graph.nb_reachable_methods(),
            nb_call_edges: self.call_graph.nb_edges(),
            nb_pointers: self.manager.nb_pointers(),
            nb_objs: self.heap.nb_objs(),
            nb_cs_objs: self.manager.nb_cs_objs(),
            nb_pfg_edges: self.pfg.nb_edges(),
            nb_worklist_entries: self.nb_worklist_entries,
            nb_unresolved_call_sites: self.unresolved_call_sites.len(),
        }
    }

    #[inline]
    pub fn program(&self) -> &'p Program {
        self.program
    }

    #[inline]
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn empty_context(&self) -> Context {
        self.selector.empty_context()
    }

    #[inline]
    pub fn cs_manager(&self) -> &CSManager {
        &self.manager
    }

    #[inline]
    pub fn cs_manager_mut(&mut self) -> &mut CSManager {
        &mut self.manager
    }

    #[inline]
    pub fn cs_call_graph(&self) -> &CSCallGraph {
        &self.call_graph
    }

    #[inline]
    pub fn pfg(&self) -> &PointerFlowGraph {
        &self.pfg
    }

    pub fn heap(&self) -> &dyn HeapModel {
        self.heap.as_ref()
    }

    pub fn heap_mut(&mut self) -> &mut dyn HeapModel {
        self.heap.as_mut()
    }

    pub fn points_to(&self, pointer: PointerId) -> &PointsToSet {
        self.manager.points_to(pointer)
    }
}
