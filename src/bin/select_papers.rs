use clap::Parser;

use review_tools::args::SelectArgs;
use review_tools::review::{init_logging, report_error, run_selection};

fn main() {
    let args = SelectArgs::parse();
    init_logging(args.verbose);

    if let Err(e) = run_selection(&args) {
        report_error(&e);
        std::process::exit(1);
    }
}
