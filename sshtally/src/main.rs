use clap::Parser;
use sshtally_core::cli::{Cli, TallyConfig, print_tally_error, run_tally};
use sshtally_core::logging::init_logging;

fn main() {
    let config = TallyConfig::from(Cli::parse());

    init_logging(config.log_format);
    tracing::debug!(?config, "starting tally");

    if let Err(e) = run_tally(&config) {
        print_tally_error(&e);
        std::process::exit(1);
    }
}
