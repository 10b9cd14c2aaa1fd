use crate::prelude::*;
use clap::ArgMatches;
use std::fs::File;
use std::io::Write;

pub fn run(args: &ArgMatches) -> PwResult<()> {
    init_logger(args);

    let program = load_program(args)?;
    let dot = program.hierarchy().to_dot(&program);
    if let Some(dot_filename) = args.get_one::<String>("output") {
        let mut file = File::create(dot_filename)?;
        file.write_all(dot.as_bytes())?;
        log::info!("dot output written in {:?}", dot_filename);
    } else {
        println!("{dot}");
    }
    Ok(())
}
