// src/bin/cli.rs
use clap::Parser;
use scorecard::cli::{self, Args};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    scorecard::log::init(args.verbose, args.log_file.as_deref())?;
    cli::run(args)?;
    Ok(())
}
