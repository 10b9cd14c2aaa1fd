//! Inputs shared by the tool binaries: the analyzed program and the
//! analysis options.

use crate::errors::{PwError, PwResult};
use clap::ArgMatches;
use pw_analysis::pta::{AnalysisOptions, SelectorKind};
use pw_ir::program::Program;
use std::fs::{self, File};
use std::io::BufReader;

/// Loads the program given by the `--input` argument.
pub fn load_program(args: &ArgMatches) -> PwResult<Program> {
    let input_fname = args
        .get_one::<String>("input")
        .ok_or_else(|| PwError::BadArguments("--input needed".to_string()))?;
    let reader = BufReader::new(File::open(input_fname)?);
    let program = pw_ir::load_reader(reader)?;
    log::info!(
        "{:?} loaded: {} classes, {} methods",
        input_fname,
        program.nb_classes(),
        program.nb_methods()
    );
    let missing: Vec<&str> = program.iter_missing_classes().collect();
    if !missing.is_empty() {
        log::debug!("{} phantom classes: {}", missing.len(), missing.join(", "));
    }
    Ok(program)
}

/// Builds the analysis options from the `--options` file, then overrides
/// them with the command line flags.
pub fn analysis_options(args: &ArgMatches) -> PwResult<AnalysisOptions> {
    let mut options = match args.get_one::<String>("options") {
        Some(fname) => AnalysisOptions::from_json(&fs::read_to_string(fname)?)?,
        None => AnalysisOptions::default(),
    };
    if let Some(cs) = args.get_one::<SelectorKind>("cs") {
        options.cs = *cs;
    }
    if let Some(entry) = args.get_one::<String>("entry") {
        options.entry = Some(entry.clone());
    }
    if args.get_flag("mock-main-args") {
        options.mock_main_args = true;
    }
    log::debug!("analysis options: {:?}", options);
    Ok(options)
}
