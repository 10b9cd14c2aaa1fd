use crate::prelude::*;
use clap::ArgMatches;
use regex::Regex;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> PwResult<()> {
    init_logger(args);

    let program = load_program(args)?;
    let options = analysis_options(args)?;
    let result = points_to_analysis(&program, &options)?;

    let filter_class = args.get_one::<String>("filter-class");
    let filter_method = args.get_one::<String>("filter-method");
    let cg = if filter_class.is_none() && filter_method.is_none() {
        result.call_graph()
    } else {
        let class_pattern = filter_class.map(|r| Regex::new(r)).transpose()?;
        let method_pattern = filter_method.map(|r| Regex::new(r)).transpose()?;
        log::debug!(
            "filtering callgraph on class pattern {:?}, method pattern {:?}",
            class_pattern,
            method_pattern
        );
        result.call_graph().filter(|meth| {
            class_pattern
                .as_ref()
                .map_or(true, |re| re.is_match(meth.class_name()))
                && method_pattern
                    .as_ref()
                    .map_or(true, |re| re.is_match(meth.name()))
        })
    };

    log::info!(
        "callgraph contains {} methods and {} edges ({} analysis)",
        cg.nb_methods(),
        cg.nb_edges(),
        options.cs
    );
    let undefined = cg.iter_methods().filter(|meth| !meth.is_defined()).count();
    log::info!("    - {} methods without body", undefined);

    if let Some(dot_filename) = &args.get_one::<String>("output") {
        let mut file = File::create(dot_filename)?;
        file.write_all(cg.to_dot().as_bytes())?;
        log::info!("dot output written in {:?}", dot_filename);
    } else {
        for meth in cg.iter_methods() {
            for callee in cg.callees_of(meth.uid()) {
                println!("{} -> {}", meth, program[callee]);
            }
        }
    }

    Ok(())
}
