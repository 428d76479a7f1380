use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use cockpit_protocol::OutboundCommand;
use cockpit_protocol::decode_event;
use cockpit_protocol::encode_command;
use color_eyre::eyre::Result;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::runtime::Runtime;

use super::EventStream;
use super::Subscribers;
use super::Transport;
use super::TransportEvent;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplaySource {
    Stdin,
    File(PathBuf),
}

impl ReplaySource {
    /// `-` reads standard input.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            ReplaySource::Stdin
        } else {
            ReplaySource::File(PathBuf::from(arg))
        }
    }
}

/// Plays back a recorded session: one JSON event per line.
pub struct ReplayTransport {
    runtime: Arc<Runtime>,
    source: ReplaySource,
    pace: Option<Duration>,
    subscribers: Arc<Subscribers>,
    started: AtomicBool,
}

impl ReplayTransport {
    pub fn new(runtime: Arc<Runtime>, source: ReplaySource, pace: Option<Duration>) -> Self {
        Self {
            runtime,
            source,
            pace,
            subscribers: Arc::new(Subscribers::default()),
            started: AtomicBool::new(false),
        }
    }
}

impl Transport for ReplayTransport {
    fn subscribe(&self) -> Result<EventStream> {
        let stream = self.subscribers.add();
        // Playback starts with the first subscriber so nothing is missed.
        if !self.started.swap(true, Ordering::SeqCst) {
            let source = self.source.clone();
            let pace = self.pace;
            let subscribers = self.subscribers.clone();
            self.runtime.spawn(async move {
                pump(source, pace, &subscribers).await;
            });
        }
        Ok(stream)
    }

    fn send(&self, command: OutboundCommand) -> Result<()> {
        let wire = encode_command(&command)?;
        tracing::debug!(command = %wire, "replay is read-only, command not delivered");
        Ok(())
    }
}

async fn pump(source: ReplaySource, pace: Option<Duration>, subscribers: &Subscribers) {
    let reader: Box<dyn AsyncBufRead + Send + Unpin> = match &source {
        ReplaySource::Stdin => Box::new(BufReader::new(tokio::io::stdin())),
        ReplaySource::File(path) => match tokio::fs::File::open(path).await {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "cannot open replay file");
                subscribers.broadcast(TransportEvent::Disconnected {
                    reason: format!("无法打开 {}: {err}", path.display()),
                });
                subscribers.broadcast(TransportEvent::Finished);
                return;
            }
        },
    };
    tracing::info!(?source, "replay started");
    subscribers.broadcast(TransportEvent::Connected);

    let mut lines = reader.lines();
    let mut delivered = 0usize;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match decode_event(&line) {
                    Ok(event) => subscribers.broadcast(TransportEvent::Inbound(event)),
                    Err(err) => {
                        tracing::warn!(%err, "undecodable replay line");
                        subscribers.broadcast(TransportEvent::DecodeFailed(err.to_string()));
                    }
                }
                delivered += 1;
                if let Some(pace) = pace {
                    tokio::time::sleep(pace).await;
                }
            }
            Ok(None) => break,
            Err(err) => {
                subscribers.broadcast(TransportEvent::Disconnected {
                    reason: err.to_string(),
                });
                break;
            }
        }
    }
    tracing::info!(delivered, "replay finished");
    subscribers.broadcast(TransportEvent::Finished);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cockpit_protocol::InboundEvent;
    use pretty_assertions::assert_eq;

    fn runtime() -> Arc<Runtime> {
        Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("runtime"),
        )
    }

    fn drain(stream: &EventStream) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.next_timeout(Duration::from_secs(5)) {
            let finished = event == TransportEvent::Finished;
            events.push(event);
            if finished {
                break;
            }
        }
        events
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(ReplaySource::parse("-"), ReplaySource::Stdin);
        assert_eq!(
            ReplaySource::parse("session.jsonl"),
            ReplaySource::File(PathBuf::from("session.jsonl"))
        );
    }

    #[test]
    fn replays_file_lines_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"event":"ai_message_chunk","data":{"chunk":"你"}}"#,
                "\n\n",
                "not json\n",
                r#"{"event":"ai_message_complete","data":{}}"#,
                "\n",
            ),
        )
        .expect("write");

        let transport = ReplayTransport::new(runtime(), ReplaySource::File(path), None);
        let stream = transport.subscribe().expect("subscribe");
        let events = drain(&stream);

        assert_eq!(events.len(), 5);
        assert_eq!(events[0], TransportEvent::Connected);
        assert_eq!(
            events[1],
            TransportEvent::Inbound(InboundEvent::AiMessageChunk {
                chunk: "你".to_string()
            })
        );
        assert!(matches!(events[2], TransportEvent::DecodeFailed(_)));
        assert_eq!(
            events[3],
            TransportEvent::Inbound(InboundEvent::AiMessageComplete { message: None })
        );
        assert_eq!(events[4], TransportEvent::Finished);
    }

    #[test]
    fn missing_file_disconnects_and_finishes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = ReplayTransport::new(
            runtime(),
            ReplaySource::File(dir.path().join("absent.jsonl")),
            None,
        );
        let events = drain(&transport.subscribe().expect("subscribe"));
        assert!(matches!(events[0], TransportEvent::Disconnected { .. }));
        assert_eq!(events[1], TransportEvent::Finished);
    }
}
