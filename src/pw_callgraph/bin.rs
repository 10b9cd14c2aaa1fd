use ptaworks::prelude::PwResult;
use ptaworks::{cli, pw_callgraph};

fn main() -> PwResult<()> {
    let args = cli::callgraph().get_matches();
    pw_callgraph::run(&args)
}
