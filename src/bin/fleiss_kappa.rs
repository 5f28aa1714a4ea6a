use clap::Parser;

use review_tools::args::KappaArgs;
use review_tools::review::{init_logging, report_error, run_kappa};

fn main() {
    let args = KappaArgs::parse();
    init_logging(args.verbose);

    if let Err(e) = run_kappa(&args) {
        report_error(&e);
        std::process::exit(1);
    }
}
