mod api;
mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod logging;
mod navigate;
mod output;
mod signing;
mod view;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = cli.validate() {
        e.exit();
    }
    logging::init_logging(cli.debug);
    app::run(&cli)
}
