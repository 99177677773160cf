mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{coast, info, lines};
use tracing_subscriber::{fmt, EnvFilter};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    let default = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Coast(args) => coast::run(&cli, args),
        Commands::Lines(args) => lines::run(&cli, args),
        Commands::Info(args) => info::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
