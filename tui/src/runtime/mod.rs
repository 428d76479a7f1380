use std::sync::Arc;
use std::time::Duration;

use cockpit_core::CockpitConfig;
use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;

use crate::transport::DemoTransport;
use crate::transport::ReplaySource;
use crate::transport::ReplayTransport;
use crate::transport::TransportHandle;

const DEFAULT_DEMO_PACE: Duration = Duration::from_millis(40);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportChoice {
    Demo { pace: Option<Duration> },
    Replay {
        source: ReplaySource,
        pace: Option<Duration>,
    },
}

/// Build the transport runtime and the selected transport on top of it.
pub fn init_transport(choice: TransportChoice, config: &CockpitConfig) -> Result<TransportHandle> {
    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .thread_name("cockpit-transport")
            .enable_all()
            .build()
            .wrap_err("failed to start the transport runtime")?,
    );

    let handle = match choice {
        TransportChoice::Demo { pace } => {
            let transport = DemoTransport::new(
                runtime,
                config.device.address(),
                pace.unwrap_or(DEFAULT_DEMO_PACE),
            );
            TransportHandle::new(Arc::new(transport))
        }
        TransportChoice::Replay { source, pace } => {
            TransportHandle::new(Arc::new(ReplayTransport::new(runtime, source, pace)))
        }
    };
    Ok(handle)
}
