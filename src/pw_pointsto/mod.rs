use crate::prelude::*;
use clap::ArgMatches;
use nu_ansi_term::Color;
use pw_analysis::pta::PointsToSet;
use pw_ir::program::{MethodUid, VarUid};
use regex::Regex;
use serde_json::{json, Value};
use std::fs::File;
use std::io::Write;

/// Points-to set of a variable, possibly under a given context.
struct VarEntry {
    name: String,
    context: Option<String>,
    objs: Vec<String>,
}

pub fn run(args: &ArgMatches) -> PwResult<()> {
    init_logger(args);

    let program = load_program(args)?;
    let options = analysis_options(args)?;
    let result = points_to_analysis(&program, &options)?;

    if args.get_flag("stats") {
        println!("{}", result.stats());
        return Ok(());
    }

    let class_pattern = args
        .get_one::<String>("filter-class")
        .map(|r| Regex::new(r))
        .transpose()?;
    let method_pattern = args
        .get_one::<String>("filter-method")
        .map(|r| Regex::new(r))
        .transpose()?;
    let methods: Vec<MethodUid> = result
        .reachable_methods()
        .into_iter()
        .filter(|uid| {
            let method = &program[*uid];
            class_pattern
                .as_ref()
                .map_or(true, |re| re.is_match(program[method.class()].name()))
                && method_pattern
                    .as_ref()
                    .map_or(true, |re| re.is_match(method.name()))
        })
        .collect();
    log::debug!("{} reachable methods selected", methods.len());

    let per_context = args.get_flag("contexts");
    let report: Vec<(MethodUid, Vec<VarEntry>)> = methods
        .into_iter()
        .map(|uid| (uid, var_entries(&result, uid, per_context)))
        .collect();

    if let Some(json_filename) = args.get_one::<String>("output") {
        let methods: Vec<Value> = report
            .iter()
            .map(|(uid, entries)| {
                json!({
                    "method": program[*uid].to_string(),
                    "contexts": result
                        .contexts_of(*uid)
                        .into_iter()
                        .map(|ctx| result.context_descr(ctx))
                        .collect::<Vec<_>>(),
                    "vars": entries
                        .iter()
                        .map(|entry| json!({
                            "name": entry.name,
                            "context": entry.context,
                            "points-to": entry.objs,
                        }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        let stats = result.stats();
        let output = json!({
            "cs": options.cs.to_string(),
            "stats": {
                "reachable-methods": stats.nb_reachable_methods,
                "reachable-cs-methods": stats.nb_reachable_cs_methods,
                "call-edges": stats.nb_call_edges,
                "pointers": stats.nb_pointers,
                "objs": stats.nb_objs,
                "cs-objs": stats.nb_cs_objs,
            },
            "methods": methods,
        });
        let mut file = File::create(json_filename)?;
        serde_json::to_writer_pretty(&mut file, &output)?;
        file.write_all(b"\n")?;
        log::info!("json output written in {:?}", json_filename);
        return Ok(());
    }

    for (uid, entries) in &report {
        println!("{}", Color::Blue.bold().paint(program[*uid].to_string()));
        for entry in entries {
            let name = match &entry.context {
                Some(ctx) => format!("{} {}", Color::Yellow.paint(ctx), entry.name),
                None => entry.name.clone(),
            };
            if entry.objs.is_empty() {
                println!("  {} -> {}", name, Color::DarkGray.paint("{}"));
            } else {
                println!("  {} -> {{{}}}", name, Color::Green.paint(entry.objs.join(", ")));
            }
        }
    }
    Ok(())
}

fn var_entries(result: &PointerAnalysisResult, method: MethodUid, per_context: bool) -> Vec<VarEntry> {
    let program = result.program();
    let Some(body) = program[method].body() else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for var in body.vars() {
        if !program[*var].type_().is_reference() {
            continue;
        }
        let name = program[*var].name().to_string();
        if per_context {
            entries.extend(cs_var_entries(result, *var, &name));
        } else {
            let objs = result
                .points_to_var(*var)
                .into_iter()
                .map(|obj| result.obj_descr(obj))
                .collect();
            entries.push(VarEntry {
                name,
                context: None,
                objs,
            });
        }
    }
    entries
}

fn cs_var_entries(result: &PointerAnalysisResult, var: VarUid, name: &str) -> Vec<VarEntry> {
    let manager = result.cs_manager();
    manager
        .cs_vars_of(var)
        .iter()
        .filter_map(|pointer| {
            let cs_var = manager[*pointer].as_cs_var()?;
            let pts: &PointsToSet = result.points_to(*pointer);
            Some(VarEntry {
                name: name.to_string(),
                context: Some(result.context_descr(cs_var.context())),
                objs: pts.iter().map(|obj| result.cs_obj_descr(obj)).collect(),
            })
        })
        .collect()
}
