//! Main `PtaWorks` binary command line arguments options.
//!
//! This module declares a function to build `clap` command line arguments
//! parser, so that it can be used from other places than the main binary,
//! such as from bash completion file generator.

use clap::{value_parser, Arg, ArgAction, Command};
use clap_complete::Shell;
use pw_analysis::pta::SelectorKind;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn arg_debug() -> Arg {
    Arg::new("debug")
        .short('d')
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Activate debug mode")
}

fn arg_verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Activate verbose mode")
}

fn arg_ecslog() -> Arg {
    Arg::new("ecslog")
        .short('e')
        .long("ecslog")
        .action(ArgAction::SetTrue)
        .help("Output logs in ECS format")
}

fn arg_input() -> Arg {
    Arg::new("input")
        .short('i')
        .long("input")
        .action(ArgAction::Set)
        .required(true)
        .help("Input program (json)")
}

fn arg_output(help: &str) -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .action(ArgAction::Set)
        .help(help.to_string())
}

fn arg_filter_class() -> Arg {
    Arg::new("filter-class")
        .long("filter-class")
        .action(ArgAction::Set)
        .help("Class(es) regex filter")
}

fn arg_filter_method() -> Arg {
    Arg::new("filter-method")
        .long("filter-method")
        .action(ArgAction::Set)
        .help("Method(s) regex filter")
}

fn arg_cs() -> Arg {
    Arg::new("cs")
        .short('c')
        .long("cs")
        .action(ArgAction::Set)
        .value_parser(|s: &str| s.parse::<SelectorKind>())
        .help("Context sensitivity: ci, <k>-call, <k>-obj or <k>-type")
}

fn arg_entry() -> Arg {
    Arg::new("entry")
        .long("entry")
        .action(ArgAction::Set)
        .help("Entry method descriptor (defaults to the program entry)")
}

fn arg_mock_main_args() -> Arg {
    Arg::new("mock-main-args")
        .long("mock-main-args")
        .action(ArgAction::SetTrue)
        .help("Feed the entry method with a mock arguments array")
}

fn arg_options() -> Arg {
    Arg::new("options")
        .long("options")
        .action(ArgAction::Set)
        .help("Analysis options file (json), overridden by command line flags")
}

#[must_use]
pub fn ptaworks() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author(AUTHORS)
        .about(DESCRIPTION)
        .subcommand(callgraph())
        .subcommand(hierarchy())
        .subcommand(pointsto())
        .subcommand(
            Command::new("gen-completions")
                .about("Generates completions file")
                .arg(
                    Arg::new("shell")
                        .short('s')
                        .long("shell")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(Shell))
                        .required(true)
                        .help("Shell type for completion generation"),
                ),
        )
}

#[must_use]
pub fn callgraph() -> Command {
    Command::new("callgraph")
        .bin_name("pw-callgraph")
        .version(VERSION)
        .author(AUTHORS)
        .about("Generates the call graph built by the points-to analysis")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output dot file"))
        .arg(arg_filter_class())
        .arg(arg_filter_method())
        .arg(arg_cs())
        .arg(arg_entry())
        .arg(arg_mock_main_args())
        .arg(arg_options())
}

#[must_use]
pub fn hierarchy() -> Command {
    Command::new("hierarchy")
        .bin_name("pw-hierarchy")
        .version(VERSION)
        .author(AUTHORS)
        .about("Generates classes hierarchy graph")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output dot file"))
}

#[must_use]
pub fn pointsto() -> Command {
    Command::new("pointsto")
        .bin_name("pw-pointsto")
        .version(VERSION)
        .author(AUTHORS)
        .about("Runs the points-to analysis and prints points-to sets")
        .arg(arg_debug())
        .arg(arg_verbose())
        .arg(arg_ecslog())
        .arg(arg_input())
        .arg(arg_output("Output json file"))
        .arg(arg_filter_class())
        .arg(arg_filter_method())
        .arg(arg_cs())
        .arg(arg_entry())
        .arg(arg_mock_main_args())
        .arg(arg_options())
        .arg(
            Arg::new("contexts")
                .long("contexts")
                .action(ArgAction::SetTrue)
                .help("Print points-to sets per context"),
        )
        .arg(
            Arg::new("stats")
                .short('s')
                .long("stats")
                .action(ArgAction::SetTrue)
                .help("Print only analysis statistics"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        ptaworks().debug_assert();
    }

    #[test]
    fn parse_analysis_flags() {
        let args = pointsto()
            .try_get_matches_from(["pw-pointsto", "-i", "prog.json", "--cs", "2-obj", "--mock-main-args"])
            .unwrap();
        assert_eq!(args.get_one::<SelectorKind>("cs"), Some(&SelectorKind::KObj(2)));
        assert!(args.get_flag("mock-main-args"));
        assert!(pointsto()
            .try_get_matches_from(["pw-pointsto", "-i", "prog.json", "--cs", "k-obj"])
            .is_err());
    }
}
