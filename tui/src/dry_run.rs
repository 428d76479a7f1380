//! Headless pass over the transport: no terminal, the execution summary goes
//! to stdout once the stream settles.

use std::io::Write;
use std::time::Duration;

use cockpit_core::CockpitConfig;
use cockpit_core::Mode;
use color_eyre::eyre::Result;

use crate::app::App;
use crate::keymap::Action;
use crate::runtime::TransportChoice;
use crate::transport::TransportHandle;
use crate::ui::metrics_spans;

pub const SAMPLE_TASK: &str = "打开微信";
const IDLE_LIMIT: Duration = Duration::from_secs(3);

pub fn run(
    config: &CockpitConfig,
    choice: &TransportChoice,
    transport: TransportHandle,
    task: Option<&str>,
) -> Result<()> {
    let mut app = App::new(config, transport)?;
    if app.controller().mode() == Mode::Chat {
        app.perform(Action::ToggleMode);
    }
    if matches!(choice, TransportChoice::Demo { .. }) {
        app.set_composer(task.unwrap_or(SAMPLE_TASK));
        app.perform(Action::Submit);
    }
    settle(&mut app, IDLE_LIMIT);
    report(&app, &mut std::io::stdout().lock())?;
    Ok(())
}

/// Apply events until the transport finishes or stays quiet for `idle`.
pub fn settle(app: &mut App, idle: Duration) {
    while !app.is_finished() {
        if !app.wait_for_event(idle) {
            tracing::debug!(?idle, "transport idle, ending dry run");
            app.end_of_stream();
            break;
        }
    }
}

pub fn report<W: Write>(app: &App, out: &mut W) -> std::io::Result<()> {
    let pipeline = app.controller().pipeline();
    for entry in pipeline.summary().entries() {
        match entry.step {
            Some(step) => writeln!(out, "[{step}] {}", entry.content)?,
            None => writeln!(out, "{}", entry.content)?,
        }
    }
    if let Some(block) = pipeline.metrics().completed().last() {
        let timings: String = metrics_spans(block)
            .iter()
            .map(|span| span.content.as_ref())
            .collect();
        if !timings.is_empty() {
            writeln!(out, "⏱ {timings}")?;
        }
    }
    Ok(())
}
