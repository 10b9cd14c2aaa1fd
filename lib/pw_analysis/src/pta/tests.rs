use super::*;
use crate::errors::AnalysisError;
use crate::pta::cs::{CSMethodId, PointerId};
use crate::pta::selector::{KCallSelector, KObjSelector, KTypeSelector};
use pw_ir::load_json;
use pw_ir::program::{ClassUid, MethodUid, Program, StmtUid, VarUid};
use pw_ir::types::Type;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

fn options(cs: &str) -> AnalysisOptions {
    AnalysisOptions {
        cs: cs.parse().unwrap(),
        ..AnalysisOptions::default()
    }
}

fn solve<'p>(program: &'p Program, cs: &str) -> PointerAnalysisResult<'p> {
    Solver::new(program, &options(cs)).solve().unwrap()
}

fn class(program: &Program, name: &str) -> ClassUid {
    program.get_class_by_name(name).unwrap().uid()
}

fn method(program: &Program, class_name: &str, name: &str) -> MethodUid {
    program
        .get_class_by_name(class_name)
        .unwrap()
        .iter_methods(program)
        .find(|method| method.name() == name)
        .unwrap()
        .uid()
}

fn var(program: &Program, method: MethodUid, name: &str) -> VarUid {
    program[method]
        .body()
        .unwrap()
        .vars()
        .iter()
        .copied()
        .find(|var| program[*var].name() == name)
        .unwrap()
}

fn stmt(program: &Program, method: MethodUid, index: usize) -> StmtUid {
    program[method].body().unwrap().stmts()[index]
}

/// The abstract object allocated by a statement.
fn alloc(result: &PointerAnalysisResult, stmt: StmtUid) -> ObjId {
    (0..result.heap().nb_objs())
        .map(|idx| ObjId::new(idx as u32))
        .find(|obj| result.heap().obj(*obj).kind() == &ObjKind::NewObj(stmt))
        .unwrap()
}

fn objs(ids: &[ObjId]) -> BTreeSet<ObjId> {
    ids.iter().copied().collect()
}

fn methods(ids: &[MethodUid]) -> BTreeSet<MethodUid> {
    ids.iter().copied().collect()
}

#[test]
fn allocation_and_copy() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "A" },
            { "name": "Main", "methods": [{
                "name": "main", "static": true,
                "locals": [{ "name": "x", "type": "LA;" }, { "name": "y", "type": "LA;" }],
                "body": [
                    { "op": "new", "lhs": "x", "type": "LA;" },
                    { "op": "copy", "lhs": "y", "rhs": "x" }
                ]
            }]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    for cs in ["ci", "1-call", "2-obj", "2-type"] {
        let result = solve(&program, cs);
        let o = alloc(&result, stmt(&program, main, 0));
        assert_eq!(result.points_to_var(var(&program, main, "y")), objs(&[o]));
        assert_eq!(result.points_to_var(var(&program, main, "x")), objs(&[o]));
        assert_eq!(result.reachable_methods(), methods(&[main]));
    }
}

const IDENTITY: &str = r#"{ "classes": [
    { "name": "A" },
    { "name": "Main", "methods": [
        { "name": "id", "static": true, "return": "LA;",
          "params": [{ "name": "p", "type": "LA;" }],
          "body": [{ "op": "return", "value": "p" }] },
        { "name": "main", "static": true,
          "locals": [
            { "name": "a", "type": "LA;" }, { "name": "b", "type": "LA;" },
            { "name": "r", "type": "LA;" }, { "name": "s", "type": "LA;" }
          ],
          "body": [
            { "op": "new", "lhs": "a", "type": "LA;" },
            { "op": "invoke", "kind": "static", "method": "LMain;->id(LA;)LA;", "args": ["a"], "result": "r" },
            { "op": "new", "lhs": "b", "type": "LA;" },
            { "op": "invoke", "kind": "static", "method": "LMain;->id(LA;)LA;", "args": ["b"], "result": "s" }
          ]
        }
    ]}
]}"#;

#[test]
fn static_call_context_insensitive() {
    let program = load_json(IDENTITY).unwrap();
    let main = method(&program, "Main", "main");
    let id = method(&program, "Main", "id");
    let result = solve(&program, "ci");

    let oa = alloc(&result, stmt(&program, main, 0));
    let ob = alloc(&result, stmt(&program, main, 2));
    // returns of both calls are merged
    let r = result.points_to_var(var(&program, main, "r"));
    assert!(r.contains(&oa));
    assert_eq!(r, objs(&[oa, ob]));
    assert_eq!(result.contexts_of(id).len(), 1);
    assert_eq!(result.reachable_cs_methods().count(), 2);
    assert_eq!(result.cs_call_graph().nb_edges(), 2);
}

#[test]
fn static_call_single_site() {
    let program = load_json(
        &IDENTITY.replace(
            r#"{ "op": "invoke", "kind": "static", "method": "LMain;->id(LA;)LA;", "args": ["b"], "result": "s" }"#,
            r#"{ "op": "copy", "lhs": "s", "rhs": "b" }"#,
        ),
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let result = solve(&program, "ci");
    assert_eq!(
        result.points_to_var(var(&program, main, "r")),
        result.points_to_var(var(&program, main, "a"))
    );
}

#[test]
fn call_site_sensitivity_separates_calls() {
    let program = load_json(IDENTITY).unwrap();
    let main = method(&program, "Main", "main");
    let id = method(&program, "Main", "id");
    let result = solve(&program, "1-call");

    let oa = alloc(&result, stmt(&program, main, 0));
    let ob = alloc(&result, stmt(&program, main, 2));
    assert_eq!(result.points_to_var(var(&program, main, "r")), objs(&[oa]));
    assert_eq!(result.points_to_var(var(&program, main, "s")), objs(&[ob]));

    let mut contexts: Vec<Context> = result.contexts_of(id).into_iter().cloned().collect();
    contexts.sort();
    assert_eq!(
        contexts,
        vec![
            Context::from_elems(&[ContextElem::CallSite(stmt(&program, main, 1))]),
            Context::from_elems(&[ContextElem::CallSite(stmt(&program, main, 3))]),
        ]
    );
    // the parameter is qualified by each context
    let p = var(&program, id, "p");
    assert_eq!(result.points_to_var(p), objs(&[oa, ob]));
    assert_eq!(
        result.points_to_cs_var(&contexts[0], p).len(),
        1
    );
}

const DISPATCH: &str = r#"{ "classes": [
    { "name": "A", "methods": [{ "name": "m" }] },
    { "name": "B", "super": "A", "methods": [{ "name": "m" }] },
    { "name": "C", "super": "A" },
    { "name": "D", "super": "A", "methods": [{ "name": "m" }] },
    { "name": "Main", "methods": [{
        "name": "main", "static": true,
        "locals": [{ "name": "x", "type": "LA;" }, { "name": "c", "type": "LA;" }],
        "body": [
            { "op": "new", "lhs": "x", "type": "LB;" },
            { "op": "new", "lhs": "c", "type": "LC;" },
            { "op": "copy", "lhs": "x", "rhs": "c" },
            { "op": "invoke", "kind": "virtual", "base": "x", "method": "LA;->m()V" }
        ]
    }]}
]}"#;

#[test]
fn virtual_dispatch_on_receiver_objects() {
    let program = load_json(DISPATCH).unwrap();
    let main = method(&program, "Main", "main");
    let (am, bm, dm) = (
        method(&program, "A", "m"),
        method(&program, "B", "m"),
        method(&program, "D", "m"),
    );
    let result = solve(&program, "ci");

    let call_site = stmt(&program, main, 3);
    assert_eq!(result.callees_of(call_site), methods(&[am, bm]));
    assert!(!result.reachable_methods().contains(&dm));
    assert_eq!(result.cs_call_graph().nb_edges(), 2);

    // each callee receives its own receiver object only
    let ob = alloc(&result, stmt(&program, main, 0));
    let oc = alloc(&result, stmt(&program, main, 1));
    assert_eq!(result.points_to_var(var(&program, bm, "this")), objs(&[ob]));
    assert_eq!(result.points_to_var(var(&program, am, "this")), objs(&[oc]));

    let cg = result.call_graph();
    assert_eq!(cg.nb_methods(), 3);
    assert_eq!(cg.callees_of(main), methods(&[am, bm]));
    assert_eq!(cg.callers_of(bm), methods(&[main]));
    let call = cg.call(main, am).unwrap();
    assert!(call.call_sites().contains(&call_site));
    assert!(cg.to_dot().contains("rankdir=LR"));

    let filtered = cg.filter(|m| m.class_name() == "B");
    assert_eq!(filtered.nb_methods(), 2);
    assert!(filtered.contains_method(main));
    assert!(!filtered.contains_method(am));
}

const CONTAINERS: &str = r#"{ "classes": [
    { "name": "A" },
    { "name": "Box",
      "fields": [{ "name": "f", "type": "Ljava/lang/Object;" }],
      "methods": [
        { "name": "set", "params": [{ "name": "v", "type": "Ljava/lang/Object;" }],
          "body": [{ "op": "store_field", "base": "this", "field": "LBox;->f", "rhs": "v" }] },
        { "name": "get", "return": "Ljava/lang/Object;",
          "locals": [{ "name": "r", "type": "Ljava/lang/Object;" }],
          "body": [
            { "op": "load_field", "lhs": "r", "base": "this", "field": "LBox;->f" },
            { "op": "return", "value": "r" }
          ] }
      ]
    },
    { "name": "Main", "methods": [{
        "name": "main", "static": true,
        "locals": [
            { "name": "b1", "type": "LBox;" }, { "name": "b2", "type": "LBox;" },
            { "name": "o1", "type": "LA;" }, { "name": "o2", "type": "LA;" },
            { "name": "r1", "type": "Ljava/lang/Object;" }, { "name": "r2", "type": "Ljava/lang/Object;" }
        ],
        "body": [
            { "op": "new", "lhs": "b1", "type": "LBox;" },
            { "op": "new", "lhs": "b2", "type": "LBox;" },
            { "op": "new", "lhs": "o1", "type": "LA;" },
            { "op": "new", "lhs": "o2", "type": "LA;" },
            { "op": "invoke", "kind": "virtual", "base": "b1", "method": "LBox;->set(Ljava/lang/Object;)V", "args": ["o1"] },
            { "op": "invoke", "kind": "virtual", "base": "b2", "method": "LBox;->set(Ljava/lang/Object;)V", "args": ["o2"] },
            { "op": "invoke", "kind": "virtual", "base": "b1", "method": "LBox;->get()Ljava/lang/Object;", "result": "r1" },
            { "op": "invoke", "kind": "virtual", "base": "b2", "method": "LBox;->get()Ljava/lang/Object;", "result": "r2" }
        ]
    }]}
]}"#;

struct Containers<'p> {
    result: PointerAnalysisResult<'p>,
    boxes: [ObjId; 2],
    values: [ObjId; 2],
}

fn solve_containers<'p>(program: &'p Program, cs: &str) -> Containers<'p> {
    let result = solve(program, cs);
    let main = method(program, "Main", "main");
    let boxes = [
        alloc(&result, stmt(program, main, 0)),
        alloc(&result, stmt(program, main, 1)),
    ];
    let values = [
        alloc(&result, stmt(program, main, 2)),
        alloc(&result, stmt(program, main, 3)),
    ];
    Containers {
        result,
        boxes,
        values,
    }
}

#[test]
fn object_sensitivity_separates_containers() {
    let program = load_json(CONTAINERS).unwrap();
    let main = method(&program, "Main", "main");
    let field = program.get_class_by_name("Box").unwrap().get_field("f").unwrap();
    let Containers {
        result,
        boxes,
        values,
    } = solve_containers(&program, "1-obj");

    assert_eq!(result.points_to_var(var(&program, main, "r1")), objs(&[values[0]]));
    assert_eq!(result.points_to_var(var(&program, main, "r2")), objs(&[values[1]]));
    for (box_obj, value) in boxes.iter().zip(&values) {
        let cs_boxes = result.cs_objs_of(*box_obj);
        assert_eq!(cs_boxes.len(), 1);
        let slot = result.points_to_instance_field(cs_boxes[0], field);
        assert_eq!(result.objs_of(&slot), objs(&[*value]));
    }
    let set = method(&program, "Box", "set");
    assert_eq!(result.contexts_of(set).len(), 2);
}

#[test]
fn insensitive_analysis_merges_containers() {
    let program = load_json(CONTAINERS).unwrap();
    let main = method(&program, "Main", "main");
    let field = program.get_class_by_name("Box").unwrap().get_field("f").unwrap();
    for cs in ["ci", "1-type"] {
        let Containers {
            result,
            boxes,
            values,
        } = solve_containers(&program, cs);
        assert_eq!(
            result.points_to_var(var(&program, main, "r1")),
            objs(&values)
        );
        for box_obj in boxes {
            let cs_box = result.cs_objs_of(box_obj)[0];
            let slot = result.points_to_instance_field(cs_box, field);
            assert_eq!(result.objs_of(&slot), objs(&values));
        }
    }
}

#[test]
fn type_sensitivity_contexts() {
    let program = load_json(CONTAINERS).unwrap();
    let main_class = class(&program, "Main");
    let set = method(&program, "Box", "set");
    let Containers { result, .. } = solve_containers(&program, "2-type");
    // both boxes are allocated in Main
    assert_eq!(
        result.contexts_of(set),
        vec![&Context::from_elems(&[ContextElem::Type(main_class)])]
    );
    assert_eq!(result.context_descr(result.contexts_of(set)[0]), "[Main]");
}

#[test]
fn store_load_and_special_calls() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "V" },
            { "name": "A",
              "fields": [{ "name": "f", "type": "LV;" }],
              "methods": [{
                "name": "<init>", "params": [{ "name": "v", "type": "LV;" }],
                "body": [{ "op": "store_field", "base": "this", "field": "LA;->f", "rhs": "v" }]
              }]
            },
            { "name": "Main", "methods": [{
                "name": "main", "static": true,
                "locals": [
                    { "name": "a", "type": "LA;" }, { "name": "b", "type": "LA;" },
                    { "name": "v", "type": "LV;" }, { "name": "w", "type": "LV;" }
                ],
                "body": [
                    { "op": "load_field", "lhs": "w", "base": "b", "field": "LA;->f" },
                    { "op": "copy", "lhs": "b", "rhs": "a" },
                    { "op": "new", "lhs": "v", "type": "LV;" },
                    { "op": "new", "lhs": "a", "type": "LA;" },
                    { "op": "invoke", "kind": "special", "base": "a", "method": "LA;-><init>(LV;)V", "args": ["v"] }
                ]
            }]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let init = method(&program, "A", "<init>");
    for cs in ["ci", "2-call", "2-obj", "2-type"] {
        let result = solve(&program, cs);
        let ov = alloc(&result, stmt(&program, main, 2));
        let v = result.points_to_var(var(&program, main, "v"));
        let w = result.points_to_var(var(&program, main, "w"));
        assert!(v.is_subset(&w));
        assert_eq!(w, objs(&[ov]));
        assert_eq!(result.callees_of(stmt(&program, main, 4)), methods(&[init]));
    }
}

#[test]
fn arrays_are_index_insensitive() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "A" },
            { "name": "Main", "methods": [{
                "name": "main", "static": true,
                "locals": [
                    { "name": "arr", "type": "[LA;" }, { "name": "alias", "type": "[LA;" },
                    { "name": "e1", "type": "LA;" }, { "name": "e2", "type": "LA;" },
                    { "name": "x", "type": "LA;" }
                ],
                "body": [
                    { "op": "new", "lhs": "arr", "type": "[LA;" },
                    { "op": "new", "lhs": "e1", "type": "LA;" },
                    { "op": "new", "lhs": "e2", "type": "LA;" },
                    { "op": "store_array", "base": "arr", "rhs": "e1" },
                    { "op": "copy", "lhs": "alias", "rhs": "arr" },
                    { "op": "store_array", "base": "alias", "rhs": "e2" },
                    { "op": "load_array", "lhs": "x", "base": "arr" }
                ]
            }]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let result = solve(&program, "ci");
    let arr = alloc(&result, stmt(&program, main, 0));
    let e1 = alloc(&result, stmt(&program, main, 1));
    let e2 = alloc(&result, stmt(&program, main, 2));
    assert_eq!(result.points_to_var(var(&program, main, "x")), objs(&[e1, e2]));
    let slot = result.points_to_array_index(result.cs_objs_of(arr)[0]);
    assert_eq!(result.objs_of(&slot), objs(&[e1, e2]));
}

#[test]
fn static_fields_are_global() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "A" },
            { "name": "G", "fields": [{ "name": "g", "type": "LA;", "static": true }] },
            { "name": "Main", "methods": [
                { "name": "read", "static": true, "return": "LA;",
                  "locals": [{ "name": "t", "type": "LA;" }],
                  "body": [
                    { "op": "load_field", "lhs": "t", "field": "LG;->g" },
                    { "op": "return", "value": "t" }
                  ] },
                { "name": "main", "static": true,
                  "locals": [{ "name": "a", "type": "LA;" }, { "name": "r", "type": "LA;" }],
                  "body": [
                    { "op": "invoke", "kind": "static", "method": "LMain;->read()LA;", "result": "r" },
                    { "op": "new", "lhs": "a", "type": "LA;" },
                    { "op": "store_field", "field": "LG;->g", "rhs": "a" }
                  ] }
            ]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let field = program.get_class_by_name("G").unwrap().get_field("g").unwrap();
    for cs in ["ci", "1-call"] {
        let result = solve(&program, cs);
        let oa = alloc(&result, stmt(&program, main, 1));
        assert_eq!(result.points_to_var(var(&program, main, "r")), objs(&[oa]));
        assert_eq!(result.points_to_static_field(field), objs(&[oa]));
    }
}

#[test]
fn interface_and_default_methods() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "I", "interface": true, "methods": [
                { "name": "run", "abstract": true },
                { "name": "hello" }
            ]},
            { "name": "Impl", "interfaces": ["I"], "methods": [{ "name": "run" }] },
            { "name": "Other", "interfaces": ["I"], "methods": [{ "name": "run" }] },
            { "name": "Main", "methods": [{
                "name": "main", "static": true,
                "locals": [{ "name": "x", "type": "LI;" }],
                "body": [
                    { "op": "new", "lhs": "x", "type": "LImpl;" },
                    { "op": "invoke", "kind": "interface", "base": "x", "method": "LI;->run()V" },
                    { "op": "invoke", "kind": "interface", "base": "x", "method": "LI;->hello()V" }
                ]
            }]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let result = solve(&program, "ci");
    assert_eq!(
        result.callees_of(stmt(&program, main, 1)),
        methods(&[method(&program, "Impl", "run")])
    );
    assert_eq!(
        result.callees_of(stmt(&program, main, 2)),
        methods(&[method(&program, "I", "hello")])
    );
    assert!(!result
        .reachable_methods()
        .contains(&method(&program, "Other", "run")));
}

#[test]
fn unresolved_dynamic_callee_is_skipped() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "A" },
            { "name": "B", "methods": [{ "name": "m" }] },
            { "name": "Main", "methods": [{
                "name": "main", "static": true,
                "locals": [{ "name": "x", "type": "LB;" }],
                "body": [
                    { "op": "new", "lhs": "x", "type": "LA;" },
                    { "op": "invoke", "kind": "virtual", "base": "x", "method": "LB;->m()V" }
                ]
            }]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let result = solve(&program, "ci");
    assert!(result.callees_of(stmt(&program, main, 1)).is_empty());
    assert_eq!(result.reachable_methods(), methods(&[main]));
    assert_eq!(result.stats().nb_unresolved_call_sites, 1);
}

#[test]
fn unresolved_static_callee_is_fatal() {
    let program = load_json(
        r#"{ "classes": [{ "name": "Main", "methods": [
            { "name": "main", "static": true },
            { "name": "unused", "static": true, "body": [
                { "op": "invoke", "kind": "static", "method": "LMain;->missing()V" }
            ]}
        ]}]}"#,
    )
    .unwrap();
    let res = Solver::new(&program, &options("ci")).solve();
    assert!(matches!(
        res,
        Err(AnalysisError::UnresolvedStaticCallee { .. })
    ));
}

#[test]
fn missing_entry_point() {
    let program = load_json(r#"{ "classes": [{ "name": "A", "methods": [{ "name": "run" }] }] }"#)
        .unwrap();
    assert!(matches!(
        Solver::new(&program, &options("ci")).solve(),
        Err(AnalysisError::MissingEntryPoint(_))
    ));

    let mut opts = options("ci");
    opts.entry = Some("LA;->start()V".to_string());
    assert!(matches!(
        Solver::new(&program, &opts).solve(),
        Err(AnalysisError::MissingEntryPoint(_))
    ));

    // an explicit entry does not need to be static nor named main
    opts.entry = Some("LA;->run()V".to_string());
    let result = Solver::new(&program, &opts).solve().unwrap();
    assert_eq!(result.reachable_methods().len(), 1);
}

#[test]
fn recursion_terminates() {
    let program = load_json(
        r#"{ "classes": [
            { "name": "Node",
              "fields": [{ "name": "next", "type": "LNode;" }],
              "methods": [{
                "name": "walk", "return": "LNode;",
                "locals": [{ "name": "n", "type": "LNode;" }, { "name": "m", "type": "LNode;" }],
                "body": [
                    { "op": "new", "lhs": "m", "type": "LNode;" },
                    { "op": "store_field", "base": "m", "field": "LNode;->next", "rhs": "this" },
                    { "op": "load_field", "lhs": "n", "base": "this", "field": "LNode;->next" },
                    { "op": "invoke", "kind": "virtual", "base": "m", "method": "LNode;->walk()LNode;", "result": "n" },
                    { "op": "return", "value": "n" }
                ]
              }]
            },
            { "name": "Main", "methods": [
                { "name": "rec", "static": true, "return": "LNode;",
                  "params": [{ "name": "p", "type": "LNode;" }],
                  "locals": [{ "name": "q", "type": "LNode;" }],
                  "body": [
                    { "op": "invoke", "kind": "static", "method": "LMain;->rec(LNode;)LNode;", "args": ["p"], "result": "q" },
                    { "op": "return", "value": "p" },
                    { "op": "return", "value": "q" }
                  ] },
                { "name": "main", "static": true,
                  "locals": [{ "name": "x", "type": "LNode;" }, { "name": "y", "type": "LNode;" }],
                  "body": [
                    { "op": "new", "lhs": "x", "type": "LNode;" },
                    { "op": "store_field", "base": "x", "field": "LNode;->next", "rhs": "x" },
                    { "op": "invoke", "kind": "static", "method": "LMain;->rec(LNode;)LNode;", "args": ["x"], "result": "y" },
                    { "op": "invoke", "kind": "virtual", "base": "y", "method": "LNode;->walk()LNode;", "result": "y" }
                  ] }
            ]}
        ]}"#,
    )
    .unwrap();
    let main = method(&program, "Main", "main");
    let rec = method(&program, "Main", "rec");
    for cs in ["ci", "1-call", "3-call", "2-obj", "3-obj", "2-type"] {
        let result = solve(&program, cs);
        let ox = alloc(&result, stmt(&program, main, 0));
        assert!(result.points_to_var(var(&program, main, "y")).contains(&ox));
        assert!(!result.contexts_of(rec).is_empty());
    }
}

#[test]
fn deep_static_call_chain() {
    const DEPTH: usize = 5000;
    let mut methods = Vec::with_capacity(DEPTH + 1);
    for i in 0..DEPTH {
        let body = if i + 1 < DEPTH {
            format!(
                r#"{{ "op": "invoke", "kind": "static", "method": "LMain;->m{}(LA;)LA;", "args": ["p"], "result": "q" }},
                   {{ "op": "return", "value": "q" }}"#,
                i + 1
            )
        } else {
            r#"{ "op": "return", "value": "p" }"#.to_string()
        };
        methods.push(format!(
            r#"{{ "name": "m{i}", "static": true, "return": "LA;",
                 "params": [{{ "name": "p", "type": "LA;" }}],
                 "locals": [{{ "name": "q", "type": "LA;" }}],
                 "body": [{body}] }}"#
        ));
    }
    methods.push(
        r#"{ "name": "main", "static": true,
             "locals": [{ "name": "a", "type": "LA;" }, { "name": "r", "type": "LA;" }],
             "body": [
                { "op": "new", "lhs": "a", "type": "LA;" },
                { "op": "invoke", "kind": "static", "method": "LMain;->m0(LA;)LA;", "args": ["a"], "result": "r" }
             ] }"#
            .to_string(),
    );
    let input = format!(
        r#"{{ "classes": [{{ "name": "A" }}, {{ "name": "Main", "methods": [{}] }}] }}"#,
        methods.join(",")
    );
    let program = load_json(&input).unwrap();
    let main = method(&program, "Main", "main");
    for cs in ["ci", "2-call"] {
        let result = solve(&program, cs);
        let oa = alloc(&result, stmt(&program, main, 0));
        assert_eq!(result.reachable_methods().len(), DEPTH + 1);
        assert_eq!(result.points_to_var(var(&program, main, "r")), objs(&[oa]));
    }
}

#[test]
fn zero_k_is_context_insensitive() {
    let program = load_json(CONTAINERS).unwrap();
    let main = method(&program, "Main", "main");
    let set = method(&program, "Box", "set");
    for cs in ["0-call", "0-obj", "0-type"] {
        assert_eq!(options(cs).cs, SelectorKind::Insensitive);
    }
    let selectors: [Box<dyn ContextSelector>; 3] = [
        Box::new(KCallSelector::new(0)),
        Box::new(KObjSelector::new(0)),
        Box::new(KTypeSelector::new(0)),
    ];
    for selector in selectors {
        let result = Solver::new(&program, &options("ci"))
            .with_selector(selector)
            .solve()
            .unwrap();
        let values = [
            alloc(&result, stmt(&program, main, 2)),
            alloc(&result, stmt(&program, main, 3)),
        ];
        assert_eq!(result.contexts_of(set), vec![&Context::empty()]);
        assert_eq!(result.points_to_var(var(&program, main, "r1")), objs(&values));
        assert!(result
            .cs_manager()
            .iter_cs_objs()
            .all(|(_, cs_obj)| cs_obj.context().is_empty()));
    }
}

/// Injects a mock object in the result of every call to a `source` method.
struct SourcePlugin;

impl Plugin for SourcePlugin {
    fn on_new_call_edge(&mut self, solver: &mut Solver<'_>, edge: &CallEdge) {
        let program = solver.program();
        let callee = solver.cs_manager()[edge.callee].method();
        if program[callee].name() != "source" {
            return;
        }
        let call_site = &solver.cs_manager()[edge.call_site];
        let context = call_site.context().clone();
        let Some(result) = program[call_site.call_site()]
            .as_invoke()
            .and_then(|invoke| invoke.result())
        else {
            return;
        };
        let container = program[callee].class();
        let mock = solver.heap_mut().mock_obj(
            "secret",
            Type::Class("java/lang/String".to_string()),
            container,
        );
        let mock = solver.heap().obj(mock).clone();
        let empty = solver.empty_context();
        let manager = solver.cs_manager_mut();
        let cs_mock = manager.get_cs_obj(&empty, &mock);
        let pointer = manager.get_cs_var(&context, result);
        solver.inject(pointer, PointsToSet::singleton(cs_mock));
    }
}

#[test]
fn plugin_injection() {
    let program = load_json(
        r#"{ "classes": [{ "name": "Main", "methods": [
            { "name": "source", "static": true, "native": true, "return": "Ljava/lang/String;" },
            { "name": "sink", "static": true, "params": [{ "name": "s", "type": "Ljava/lang/String;" }] },
            { "name": "main", "static": true,
              "locals": [{ "name": "x", "type": "Ljava/lang/String;" }, { "name": "y", "type": "Ljava/lang/String;" }],
              "body": [
                { "op": "invoke", "kind": "static", "method": "LMain;->source()Ljava/lang/String;", "result": "x" },
                { "op": "copy", "lhs": "y", "rhs": "x" },
                { "op": "invoke", "kind": "static", "method": "LMain;->sink(Ljava/lang/String;)V", "args": ["y"] }
              ] }
        ]}]}"#,
    )
    .unwrap();
    let sink = method(&program, "Main", "sink");
    let mut solver = Solver::new(&program, &options("1-call"));
    solver.add_plugin(Box::new(SourcePlugin));
    let result = solver.solve().unwrap();

    let reached = result.points_to_var(var(&program, sink, "s"));
    assert_eq!(reached.len(), 1);
    let obj = *reached.iter().next().unwrap();
    assert!(matches!(result.heap().obj(obj).kind(), ObjKind::Mock(descr) if descr == "secret"));
    assert!(result.obj_descr(obj).contains("secret"));
}

/// Checks that points-to sets only grow, and that notified deltas are new.
#[derive(Default)]
struct MonotonicityChecker {
    seen: Rc<RefCell<Vec<(PointerId, PointsToSet)>>>,
    violations: Rc<RefCell<usize>>,
    new_methods: Rc<RefCell<Vec<CSMethodId>>>,
}

impl Plugin for MonotonicityChecker {
    fn on_new_cs_method(&mut self, _: &mut Solver<'_>, method: CSMethodId) {
        self.new_methods.borrow_mut().push(method);
    }

    fn on_new_points_to_set(&mut self, solver: &mut Solver<'_>, var: PointerId, delta: &PointsToSet) {
        let current = solver.points_to(var).clone();
        let mut seen = self.seen.borrow_mut();
        let previous = seen
            .iter()
            .rev()
            .find(|(pointer, _)| *pointer == var)
            .map(|(_, pts)| pts.clone())
            .unwrap_or_default();
        if !previous.is_subset(&current)
            || !delta.is_subset(&current)
            || delta.iter().any(|obj| previous.contains(obj))
        {
            *self.violations.borrow_mut() += 1;
        }
        seen.push((var, current));
    }
}

#[test]
fn points_to_sets_grow_monotonically() {
    let program = load_json(CONTAINERS).unwrap();
    let checker = MonotonicityChecker::default();
    let (seen, violations, new_methods) = (
        checker.seen.clone(),
        checker.violations.clone(),
        checker.new_methods.clone(),
    );
    let mut solver = Solver::new(&program, &options("2-obj"));
    solver.add_plugin(Box::new(checker));
    let result = solver.solve().unwrap();

    assert_eq!(*violations.borrow(), 0);
    assert!(!seen.borrow().is_empty());
    // each context-sensitive method is reached exactly once
    let reached = new_methods.borrow();
    let unique: BTreeSet<CSMethodId> = reached.iter().copied().collect();
    assert_eq!(unique.len(), reached.len());
    assert_eq!(reached.len(), result.reachable_cs_methods().count());
    // final sets contain every observed set
    for (pointer, pts) in seen.borrow().iter() {
        assert!(pts.is_subset(result.points_to(*pointer)));
    }
}

const MAIN_ARGS: &str = r#"{ "classes": [{ "name": "Main", "methods": [{
    "name": "main", "static": true,
    "params": [{ "name": "args", "type": "[Ljava/lang/String;" }],
    "locals": [{ "name": "first", "type": "Ljava/lang/String;" }],
    "body": [{ "op": "load_array", "lhs": "first", "base": "args" }]
}]}]}"#;

#[test]
fn mock_main_arguments() {
    let program = load_json(MAIN_ARGS).unwrap();
    let main = method(&program, "Main", "main");
    let args = var(&program, main, "args");
    let first = var(&program, main, "first");

    let result = solve(&program, "ci");
    assert!(result.points_to_var(args).is_empty());
    assert!(result.points_to_var(first).is_empty());

    let mut opts = options("ci");
    opts.mock_main_args = true;
    let result = Solver::new(&program, &opts).solve().unwrap();
    let args_objs = result.points_to_var(args);
    let first_objs = result.points_to_var(first);
    assert_eq!(args_objs.len(), 1);
    assert_eq!(first_objs.len(), 1);
    let arg = result.heap().obj(*first_objs.iter().next().unwrap());
    assert_eq!(arg.type_(), &Type::Class("java/lang/String".to_string()));
    assert!(matches!(arg.kind(), ObjKind::Mock(_)));
    assert_eq!(result.stats().nb_objs, 2);
}
