mod app;
mod cli;
mod config;
mod consts;
mod core;
mod error;
mod output;
mod source;
mod utils;

use clap::Parser;

use cli::{Cli, Commands};
use config::Config;

fn main() {
    let cli = Cli::parse();

    // Statusline output must not be preceded by config chatter on stderr
    let quiet = matches!(cli.command, Some(Commands::Statusline));
    let config = if quiet {
        Config::load_quiet()
    } else {
        Config::load()
    };
    let cli = cli.with_config(&config);

    if let Err(err) = app::run(&cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
