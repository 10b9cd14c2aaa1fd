use ptaworks::prelude::PwResult;
use ptaworks::{cli, pw_pointsto};

fn main() -> PwResult<()> {
    let args = cli::pointsto().get_matches();
    pw_pointsto::run(&args)
}
