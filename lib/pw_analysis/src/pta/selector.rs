//! Context sensitivity policies.
//!
//! Every selector bounds the length of the contexts it builds, which keeps
//! the context space finite and guarantees the termination of the solver.

use crate::pta::context::{Context, ContextElem};
use crate::pta::cs::{CSCallSite, CSMethod, CSObj};
use crate::pta::heap::Obj;
use crate::pta::options::SelectorKind;
use pw_ir::program::MethodUid;

pub trait ContextSelector {
    fn empty_context(&self) -> Context {
        Context::empty()
    }

    /// Context of the callee of a statically bound call.
    fn select_context(&self, call_site: &CSCallSite, callee: MethodUid) -> Context;

    /// Context of the callee of a call dispatched on the receiver object `recv`.
    fn select_context_with_receiver(
        &self,
        call_site: &CSCallSite,
        recv: &CSObj,
        callee: MethodUid,
    ) -> Context;

    /// Heap context of an object allocated in `method`.
    fn select_heap_context(&self, method: &CSMethod, obj: &Obj) -> Context;
}

/// Builds the selector implementing a policy.
pub fn make_selector(kind: SelectorKind) -> Box<dyn ContextSelector> {
    match kind {
        SelectorKind::Insensitive => Box::new(ContextInsensitiveSelector),
        SelectorKind::KCall(k) => Box::new(KCallSelector::new(k)),
        SelectorKind::KObj(k) => Box::new(KObjSelector::new(k)),
        SelectorKind::KType(k) => Box::new(KTypeSelector::new(k)),
    }
}

#[derive(Debug, Default)]
pub struct ContextInsensitiveSelector;

impl ContextSelector for ContextInsensitiveSelector {
    fn select_context(&self, _: &CSCallSite, _: MethodUid) -> Context {
        Context::empty()
    }

    fn select_context_with_receiver(&self, _: &CSCallSite, _: &CSObj, _: MethodUid) -> Context {
        Context::empty()
    }

    fn select_heap_context(&self, _: &CSMethod, _: &Obj) -> Context {
        Context::empty()
    }
}

/// Call-site sensitivity: the last `k` call sites.
#[derive(Debug)]
pub struct KCallSelector {
    k: usize,
}

impl KCallSelector {
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl ContextSelector for KCallSelector {
    fn select_context(&self, call_site: &CSCallSite, _: MethodUid) -> Context {
        call_site
            .context()
            .append_limited(ContextElem::CallSite(call_site.call_site()), self.k)
    }

    fn select_context_with_receiver(&self, call_site: &CSCallSite, _: &CSObj, callee: MethodUid) -> Context {
        self.select_context(call_site, callee)
    }

    fn select_heap_context(&self, method: &CSMethod, _: &Obj) -> Context {
        method.context().last_k(self.k.saturating_sub(1))
    }
}

/// Object sensitivity: the last `k` allocation sites of the receiver objects.
#[derive(Debug)]
pub struct KObjSelector {
    k: usize,
}

impl KObjSelector {
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl ContextSelector for KObjSelector {
    fn select_context(&self, call_site: &CSCallSite, _: MethodUid) -> Context {
        call_site.context().clone()
    }

    fn select_context_with_receiver(&self, _: &CSCallSite, recv: &CSObj, _: MethodUid) -> Context {
        recv.context()
            .append_limited(ContextElem::Obj(recv.obj()), self.k)
    }

    fn select_heap_context(&self, method: &CSMethod, _: &Obj) -> Context {
        method.context().last_k(self.k.saturating_sub(1))
    }
}

/// Type sensitivity: the last `k` container types of the receiver objects.
#[derive(Debug)]
pub struct KTypeSelector {
    k: usize,
}

impl KTypeSelector {
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl ContextSelector for KTypeSelector {
    fn select_context(&self, call_site: &CSCallSite, _: MethodUid) -> Context {
        call_site.context().clone()
    }

    fn select_context_with_receiver(&self, _: &CSCallSite, recv: &CSObj, _: MethodUid) -> Context {
        recv.context()
            .append_limited(ContextElem::Type(recv.container_type()), self.k)
    }

    fn select_heap_context(&self, method: &CSMethod, _: &Obj) -> Context {
        method.context().last_k(self.k.saturating_sub(1))
    }
}
