use clap::Parser;
use cockpit_tui::Cli;
use cockpit_tui::run_main;
use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    run_main(Cli::parse())
}
