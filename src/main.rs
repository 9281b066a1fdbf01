use std::env;

use grepomap::cli;
use grepomap::logging::init_logging;

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
