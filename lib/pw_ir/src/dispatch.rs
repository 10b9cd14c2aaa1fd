//! Method lookup: the dispatch oracle used to bind invocations to
//! concrete methods.

use crate::program::*;
use crate::types::Type;
use std::collections::{BTreeSet, VecDeque};

impl Program {
    /// Finds the concrete method that a virtual call with the given
    /// subsignature reaches on an object of runtime class `class`.
    ///
    /// The superclass chain is walked first; if no concrete declaration is
    /// found, default methods of the superinterfaces are considered.
    /// Results are memoized per `(class, subsignature)`.
    pub fn dispatch(&self, class: ClassUid, subsig: &Subsignature) -> Option<MethodUid> {
        let key = (class, subsig.clone());
        if let Some(res) = self.dispatch_cache.borrow().get(&key) {
            return *res;
        }
        let res = self.lookup_concrete(class, subsig);
        self.dispatch_cache.borrow_mut().insert(key, res);
        res
    }

    fn lookup_concrete(&self, class: ClassUid, subsig: &Subsignature) -> Option<MethodUid> {
        let is_concrete = |muid: &MethodUid| {
            let method = &self[*muid];
            !method.is_abstract() && !method.is_static()
        };

        let mut current = Some(class);
        while let Some(cuid) = current {
            if let Some(muid) = self[cuid].get_method(subsig).filter(is_concrete) {
                return Some(muid);
            }
            current = self.hierarchy().superclass(cuid);
        }

        self.lookup_in_interfaces(class, subsig, is_concrete)
    }

    /// Breadth-first search over the superinterfaces of a class and of all
    /// its superclasses.
    fn lookup_in_interfaces<P>(&self, class: ClassUid, subsig: &Subsignature, accept: P) -> Option<MethodUid>
    where
        P: Fn(&MethodUid) -> bool,
    {
        let mut queue = VecDeque::new();
        let mut current = Some(class);
        while let Some(cuid) = current {
            queue.extend(self.hierarchy().interfaces(cuid));
            current = self.hierarchy().superclass(cuid);
        }
        let mut visited = BTreeSet::new();
        while let Some(iuid) = queue.pop_front() {
            if !visited.insert(iuid) {
                continue;
            }
            if let Some(muid) = self[iuid].get_method(subsig).filter(&accept) {
                return Some(muid);
            }
            queue.extend(self.hierarchy().interfaces(iuid));
        }
        None
    }

    /// Resolves a method reference the way a statically bound invocation
    /// does: declared class first, then superclasses, then superinterfaces.
    pub fn resolve_method_ref(&self, method_ref: &MethodRef) -> Option<MethodUid> {
        let class = self.get_class_by_name(method_ref.class_name())?.uid();
        let subsig = method_ref.subsignature();
        let mut current = Some(class);
        while let Some(cuid) = current {
            if let Some(muid) = self[cuid].get_method(subsig) {
                return Some(muid);
            }
            current = self.hierarchy().superclass(cuid);
        }
        self.lookup_in_interfaces(class, subsig, |_| true)
    }

    /// Single-type query: the method invoked by `invoke` when the receiver
    /// object has type `recv_type` (ignored for static invocations).
    ///
    /// Returns `None` when no concrete method can be found.
    pub fn resolve_callee(&self, recv_type: Option<&Type>, invoke: &Invoke) -> Option<MethodUid> {
        let method_ref = invoke.method_ref();
        match invoke.kind() {
            CallKind::Static => self
                .resolve_method_ref(method_ref)
                .filter(|muid| self[*muid].is_static() && !self[*muid].is_abstract()),
            CallKind::Special => {
                let class = self.get_class_by_name(method_ref.class_name())?.uid();
                self.dispatch(class, method_ref.subsignature())
            }
            CallKind::Virtual | CallKind::Interface => {
                let class = self.dispatch_class(recv_type?)?;
                self.dispatch(class, method_ref.subsignature())
            }
        }
    }

    /// The class whose method table is looked up for a receiver of the
    /// given type. Arrays only have the methods of `java/lang/Object`.
    fn dispatch_class(&self, recv_type: &Type) -> Option<ClassUid> {
        let name = match recv_type {
            Type::Class(name) => name.as_str(),
            Type::Array(_, _) => JAVA_LANG_OBJECT,
            _ => return None,
        };
        self.get_class_by_name(name).map(Class::uid)
    }

    /// Whole-hierarchy query: every concrete method the invocation may
    /// reach, whatever the runtime type of its receiver (class hierarchy
    /// analysis).
    pub fn resolve_all(&self, invoke: &Invoke) -> BTreeSet<MethodUid> {
        let method_ref = invoke.method_ref();
        match invoke.kind() {
            CallKind::Static | CallKind::Special => {
                self.resolve_callee(None, invoke).into_iter().collect()
            }
            CallKind::Virtual | CallKind::Interface => {
                let Some(declared) = self.get_class_by_name(method_ref.class_name()) else {
                    return BTreeSet::new();
                };
                self.hierarchy()
                    .all_subtypes(declared.uid())
                    .into_iter()
                    .filter(|cuid| !self[*cuid].is_interface() && !self[*cuid].is_abstract())
                    .filter_map(|cuid| self.dispatch(cuid, method_ref.subsignature()))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::loader::load_json;
    use crate::program::*;
    use crate::types::Type;
    use std::convert::TryFrom;

    const PROGRAM: &str = r#"{ "classes": [
        { "name": "java/lang/Object", "methods": [
            { "name": "toString", "return": "Ljava/lang/String;", "native": true },
            { "name": "hashCode", "return": "I", "native": true }
        ]},
        { "name": "I", "interface": true, "methods": [
            { "name": "run", "abstract": true },
            { "name": "hello" }
        ]},
        { "name": "J", "interface": true, "interfaces": ["I"] },
        { "name": "A", "abstract": true, "interfaces": ["J"], "methods": [
            { "name": "foo" },
            { "name": "run", "abstract": true },
            { "name": "util", "static": true }
        ]},
        { "name": "B", "super": "A", "methods": [
            { "name": "run" },
            { "name": "toString", "return": "Ljava/lang/String;" }
        ]},
        { "name": "C", "super": "B", "methods": [{ "name": "foo" }] },
        { "name": "Main", "methods": [{ "name": "main", "static": true, "body": [
            { "op": "invoke", "kind": "static", "method": "LA;->util()V" },
            { "op": "invoke", "kind": "static", "method": "LC;->util()V" },
            { "op": "invoke", "kind": "static", "method": "LA;->foo()V" }
        ]}]}
    ]}"#;

    fn method(program: &Program, class: &str, name: &str) -> MethodUid {
        let class = program.get_class_by_name(class).unwrap();
        class
            .iter_methods(program)
            .find(|method| method.name() == name)
            .unwrap()
            .uid()
    }

    fn subsig(name: &str) -> Subsignature {
        Subsignature::new(name, vec![], Type::Void)
    }

    fn invoke(kind: CallKind, method_ref: &str) -> Invoke {
        Invoke {
            kind,
            method_ref: MethodRef::try_from(method_ref).unwrap(),
            base: None,
            args: vec![],
            result: None,
        }
    }

    #[test]
    fn dispatch_overrides_and_inherited() {
        let program = load_json(PROGRAM).unwrap();
        let b = program.get_class_by_name("B").unwrap().uid();
        let c = program.get_class_by_name("C").unwrap().uid();

        assert_eq!(program.dispatch(c, &subsig("foo")), Some(method(&program, "C", "foo")));
        assert_eq!(program.dispatch(b, &subsig("foo")), Some(method(&program, "A", "foo")));
        assert_eq!(program.dispatch(c, &subsig("run")), Some(method(&program, "B", "run")));
        // memoized answer is stable
        assert_eq!(program.dispatch(c, &subsig("run")), Some(method(&program, "B", "run")));
        assert_eq!(program.dispatch(c, &subsig("nope")), None);
        // static methods are not dispatched
        assert_eq!(program.dispatch(c, &subsig("util")), None);
    }

    #[test]
    fn dispatch_default_methods() {
        let program = load_json(PROGRAM).unwrap();
        let c = program.get_class_by_name("C").unwrap().uid();
        assert_eq!(
            program.dispatch(c, &subsig("hello")),
            Some(method(&program, "I", "hello"))
        );
    }

    #[test]
    fn resolve_static_and_special() {
        let program = load_json(PROGRAM).unwrap();
        let util = method(&program, "A", "util");
        assert_eq!(
            program.resolve_callee(None, &invoke(CallKind::Static, "LA;->util()V")),
            Some(util)
        );
        assert_eq!(
            program.resolve_callee(None, &invoke(CallKind::Static, "LC;->util()V")),
            Some(util)
        );
        // an instance method is not a valid target for a static call
        assert_eq!(
            program.resolve_callee(None, &invoke(CallKind::Static, "LA;->foo()V")),
            None
        );
        assert_eq!(
            program.resolve_callee(None, &invoke(CallKind::Special, "LB;->foo()V")),
            Some(method(&program, "A", "foo"))
        );
    }

    #[test]
    fn resolve_on_receiver_type() {
        let program = load_json(PROGRAM).unwrap();
        let call = invoke(CallKind::Virtual, "LA;->foo()V");
        assert_eq!(
            program.resolve_callee(Some(&Type::Class("C".to_string())), &call),
            Some(method(&program, "C", "foo"))
        );
        assert_eq!(program.resolve_callee(Some(&Type::Int), &call), None);
        assert_eq!(program.resolve_callee(None, &call), None);

        let to_string = Invoke {
            method_ref: MethodRef::try_from("Ljava/lang/Object;->toString()Ljava/lang/String;")
                .unwrap(),
            ..call
        };
        let array = Type::Array(1, Box::new(Type::Int));
        assert_eq!(
            program.resolve_callee(Some(&array), &to_string),
            Some(method(&program, "java/lang/Object", "toString"))
        );
        assert_eq!(
            program.resolve_callee(Some(&Type::Class("B".to_string())), &to_string),
            Some(method(&program, "B", "toString"))
        );
    }

    #[test]
    fn class_hierarchy_analysis() {
        let program = load_json(PROGRAM).unwrap();
        let run = program.resolve_all(&invoke(CallKind::Interface, "LI;->run()V"));
        assert_eq!(
            run.into_iter().collect::<Vec<_>>(),
            vec![method(&program, "B", "run")]
        );

        let foo = program.resolve_all(&invoke(CallKind::Virtual, "LA;->foo()V"));
        assert_eq!(foo.len(), 2);
        assert!(foo.contains(&method(&program, "A", "foo")));
        assert!(foo.contains(&method(&program, "C", "foo")));

        let util = program.resolve_all(&invoke(CallKind::Static, "LA;->util()V"));
        assert_eq!(util.len(), 1);
    }
}
