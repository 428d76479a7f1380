//! Terminal console for the AutoGLM phone agent: a chat pane, the agent's
//! execution panel and a status bar, driven by a pluggable event transport.

pub mod app;
pub mod cli;
pub mod dry_run;
pub mod keymap;
mod logging;
pub mod runtime;
mod terminal;
pub mod transport;
pub mod ui;

use std::path::Path;
use std::path::PathBuf;

use cockpit_core::CockpitConfig;
use cockpit_core::config::default_config_path;
use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;

pub use app::App;
pub use cli::Cli;

pub fn run_main(cli: Cli) -> Result<()> {
    let (config, missing) = load_config(cli.config.as_deref())?;
    let _log_guard = logging::init(&config.log)?;
    if let Some(path) = missing {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
    }
    tracing::info!(device = %config.device.address(), "starting cockpit");

    let choice = cli.transport_choice();
    let transport = runtime::init_transport(choice.clone(), &config)?;

    if cli.dry_run {
        return dry_run::run(&config, &choice, transport, cli.task.as_deref());
    }

    let mut app = App::new(&config, transport)?;
    let mut terminal = terminal::init()?;
    let result = app::run(&mut terminal, &mut app);
    terminal::restore()?;
    result
}

/// The config at `path` (or the default location), plus the path that was
/// looked up when no file exists there and defaults are used instead.
fn load_config(path: Option<&Path>) -> Result<(CockpitConfig, Option<PathBuf>)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    match CockpitConfig::read(&path).wrap_err("failed to load config")? {
        Some(config) => Ok((config, None)),
        None => Ok((CockpitConfig::default(), Some(path))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_config_falls_back_and_names_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        let (config, missing) = load_config(Some(&path)).expect("load");
        assert_eq!(config, CockpitConfig::default());
        assert_eq!(missing, Some(path.clone()));

        std::fs::write(&path, "[device]\nadb_port = 5555\n").expect("write");
        let (config, missing) = load_config(Some(&path)).expect("load");
        assert_eq!(config.device.adb_port, 5555);
        assert_eq!(missing, None);
    }
}
