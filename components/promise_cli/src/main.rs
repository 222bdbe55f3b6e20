//! Promise runtime demo
//!
//! Entry point for the demos. Parses CLI arguments, runs the chosen demo and
//! prints its report.

use clap::Parser as ClapParser;
use promise_cli::{logging, run, Cli, Settings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let settings = Settings::from_cli(&cli);
    let report = run(&cli.demo, &settings);

    print!("{}", report.render(cli.json)?);

    if report.is_rejected() {
        std::process::exit(1);
    }

    Ok(())
}
