//! Solver extensions, notified of the analysis progress.
//!
//! Plugins receive the live solver: they may query it, create canonical
//! elements or mock objects, and push additional facts with
//! [`Solver::inject`]. Injected facts take part in the same fixpoint.

use crate::pta::cs::{CSMethodId, PointerId};
use crate::pta::cs_callgraph::CallEdge;
use crate::pta::pts::PointsToSet;
use crate::pta::solver::Solver;

pub trait Plugin {
    /// Called once the entry method is reachable, before the main loop.
    fn on_start(&mut self, _solver: &mut Solver<'_>) {}

    fn on_new_cs_method(&mut self, _solver: &mut Solver<'_>, _method: CSMethodId) {}

    fn on_new_call_edge(&mut self, _solver: &mut Solver<'_>, _edge: &CallEdge) {}

    /// Called when the points-to set of a context-sensitive variable grows.
    fn on_new_points_to_set(&mut self, _solver: &mut Solver<'_>, _var: PointerId, _delta: &PointsToSet) {}

    /// Called after the fixpoint is reached. Facts injected from here are
    /// not propagated.
    fn on_finish(&mut self, _solver: &mut Solver<'_>) {}
}

const MAIN_ARGS: &str = "<main-args>";
const MAIN_ARG: &str = "<main-arg>";

/// Makes the `String[]` parameter of the entry methods point to a mock
/// array, whose elements point to a mock string.
#[derive(Debug, Default)]
pub struct MainArgsHandler;

impl MainArgsHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for MainArgsHandler {
    fn on_start(&mut self, solver: &mut Solver<'_>) {
        let program = solver.program();
        for entry in solver.cs_call_graph().entries().to_vec() {
            let context = solver.cs_manager()[entry].context().clone();
            let method = &program[solver.cs_manager()[entry].method()];
            let Some(args) = method.body().and_then(|body| body.params().first().copied()) else {
                log::warn!("entry method {method} has no argument to mock");
                continue;
            };
            let args_type = program[args].type_().clone();
            let Some(arg_type) = args_type
                .element_type()
                .filter(|elem| elem.as_class_name().is_some())
            else {
                log::warn!("first argument of entry method {method} is not an array of objects");
                continue;
            };
            let container = method.class();

            let args_obj = solver.heap_mut().mock_obj(MAIN_ARGS, args_type, container);
            let arg_obj = solver.heap_mut().mock_obj(MAIN_ARG, arg_type, container);
            let args_obj = solver.heap().obj(args_obj).clone();
            let arg_obj = solver.heap().obj(arg_obj).clone();

            let manager = solver.cs_manager_mut();
            let cs_args = manager.get_cs_obj(&context, &args_obj);
            let cs_arg = manager.get_cs_obj(&context, &arg_obj);
            let elems = manager.get_array_index(cs_args);
            let param = manager.get_cs_var(&context, args);
            log::debug!("mocking arguments of entry method {method}");
            solver.inject(elems, PointsToSet::singleton(cs_arg));
            solver.inject(param, PointsToSet::singleton(cs_args));
        }
    }
}
