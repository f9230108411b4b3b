use std::process::ExitCode;

use clap::Parser;
use pixelboard::{cli, logger};

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init();
    logger::set_echo(args.verbose);

    cli::run(args)
}
