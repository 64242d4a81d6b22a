mod cli;
mod error;
mod model;
mod scanner;
mod sink;
mod splitter;
mod telemetry;

use clap::Parser;

fn main() {
    let args = cli::Cli::parse();
    telemetry::init_tracing(args.log_level);

    if let Err(e) = cli::run(args) {
        // Split failures carry their own exit status; anything else is a generic failure.
        let code = e
            .downcast_ref::<error::SplitError>()
            .map(error::SplitError::exit_code)
            .unwrap_or(1);
        eprintln!("error: {}", e);
        std::process::exit(code);
    }
}
