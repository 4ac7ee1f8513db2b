use std::process::ExitCode;

use clap::Parser;
use wallpaper_app::cli::{self, Cli};
use wallpaper_app::logging::{self, LogDestination};

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    logging::initialize(destination, logging::level_for_verbosity(cli.verbose));

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
