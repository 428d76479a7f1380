use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::runtime::TransportChoice;
use crate::transport::ReplaySource;

#[derive(Parser, Debug, Default)]
#[command(name = "autoglm-cockpit", version, about = "Terminal console for the AutoGLM phone agent")]
pub struct Cli {
    /// Config file to read instead of `~/.autoglm-cockpit/config.toml`.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replay newline-delimited JSON events from FILE, or from stdin with `-`.
    #[arg(long, value_name = "FILE|-", conflicts_with = "demo")]
    pub replay: Option<String>,

    /// Delay between replayed or synthesized events, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub pace_ms: Option<u64>,

    /// Use locally synthesized events. This is the default without `--replay`.
    #[arg(long)]
    pub demo: bool,

    /// Run without the terminal UI and print the execution summary.
    #[arg(long)]
    pub dry_run: bool,

    /// Task the dry run sends in device-control mode (demo transport only).
    #[arg(long, value_name = "TEXT", requires = "dry_run")]
    pub task: Option<String>,
}

impl Cli {
    pub fn transport_choice(&self) -> TransportChoice {
        let pace = self.pace_ms.map(Duration::from_millis);
        match &self.replay {
            Some(arg) => TransportChoice::Replay {
                source: ReplaySource::parse(arg),
                pace,
            },
            None => TransportChoice::Demo { pace },
        }
    }
}
