use std::sync::Arc;
use std::time::Duration;

use cockpit_protocol::InboundEvent;
use cockpit_protocol::OutboundCommand;
use cockpit_protocol::StepKind;
use cockpit_protocol::WireMode;
use color_eyre::eyre::Result;
use color_eyre::eyre::eyre;
use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use super::EventStream;
use super::Subscribers;
use super::Transport;
use super::TransportEvent;

/// Fragment sizes, in characters, used to chop the synthesized trace.
const FRAGMENT_SIZES: &[usize] = &[3, 11, 1, 7, 24, 2, 16, 5];

const DEMO_TRACE: &str = "💭 思考过程：
当前在手机桌面，需要先找到目标应用的图标
🎯 执行动作：Launch(app=\"微信\")
--------------------------------------------------
⏱️  性能指标:
--------------------------------------------------
首 Token 延迟 (TTFT): 0.523s
思考完成延迟: 1.204s
总推理时间: 2.345s
==================================================

💭 思考过程：
应用已打开，任务目标已达成
✅ 任务完成
";

/// Offline stand-in for the cockpit server. Commands are processed one at a
/// time by a single worker so replies never interleave. The worker starts with
/// the first subscriber; commands sent earlier wait in the queue.
pub struct DemoTransport {
    runtime: Arc<Runtime>,
    subscribers: Arc<Subscribers>,
    commands: mpsc::UnboundedSender<OutboundCommand>,
    pending: Mutex<Option<(DemoWorker, mpsc::UnboundedReceiver<OutboundCommand>)>>,
}

impl DemoTransport {
    pub fn new(runtime: Arc<Runtime>, device_address: String, pace: Duration) -> Self {
        let subscribers = Arc::new(Subscribers::default());
        let (commands, rx) = mpsc::unbounded_channel();
        let worker = DemoWorker {
            subscribers: subscribers.clone(),
            mode: WireMode::Normal,
            device_address,
            pace,
        };
        Self {
            runtime,
            subscribers,
            commands,
            pending: Mutex::new(Some((worker, rx))),
        }
    }
}

impl Transport for DemoTransport {
    fn subscribe(&self) -> Result<EventStream> {
        let stream = self.subscribers.add();
        self.subscribers.broadcast(TransportEvent::Connected);
        self.subscribers
            .broadcast(TransportEvent::Inbound(InboundEvent::Status {
                message: "🧪 演示模式：事件由本地合成".to_string(),
            }));
        if let Some((worker, rx)) = self.pending.lock().take() {
            self.runtime.spawn(worker.run(rx));
        }
        Ok(stream)
    }

    fn send(&self, command: OutboundCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| eyre!("demo worker has stopped"))
    }
}

struct DemoWorker {
    subscribers: Arc<Subscribers>,
    mode: WireMode,
    device_address: String,
    pace: Duration,
}

impl DemoWorker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<OutboundCommand>) {
        while let Some(command) = commands.recv().await {
            tracing::debug!(?command, "demo command");
            match command {
                OutboundCommand::SwitchMode { mode } => {
                    self.mode = mode;
                    self.emit(InboundEvent::ModeSwitched { mode });
                }
                OutboundCommand::SendMessage { message } => {
                    self.emit(InboundEvent::UserMessage {
                        message: message.clone(),
                    });
                    match self.mode {
                        WireMode::Normal => self.chat_reply(&message).await,
                        WireMode::Autoglm => self.run_task(&message).await,
                    }
                }
                OutboundCommand::StartScrcpy => {
                    self.emit(InboundEvent::ScrcpyStarted { message: None });
                    for _ in 0..3 {
                        self.pause().await;
                        self.emit(InboundEvent::ScreenFrame {
                            frame: String::new(),
                        });
                    }
                }
                OutboundCommand::AdbConnect => {
                    self.emit(InboundEvent::AdbConnectResult {
                        success: true,
                        message: Some(format!("✅ 已连接到 {}", self.device_address)),
                    });
                    self.emit(InboundEvent::AdbDevicesList {
                        devices: vec![self.device_address.clone()],
                    });
                }
            }
        }
        tracing::debug!("demo worker stopped");
    }

    async fn chat_reply(&self, message: &str) {
        let reply = format!("收到：“{message}”。这是演示模式下的本地回复，切换到 B 模式可以体验手机控制。");
        for chunk in chop_at_char_boundaries(&reply, &[2, 3, 1, 4]) {
            self.pause().await;
            self.emit(InboundEvent::AiMessageChunk {
                chunk: chunk.to_string(),
            });
        }
        self.emit(InboundEvent::AiMessageComplete {
            message: Some(reply),
        });
    }

    async fn run_task(&self, task: &str) {
        self.emit(InboundEvent::AutoglmStep {
            kind: StepKind::Thinking,
            content: format!("收到任务指令: {task}"),
        });
        for fragment in chop_at_char_boundaries(DEMO_TRACE, FRAGMENT_SIZES) {
            self.pause().await;
            self.emit(InboundEvent::AutoglmRealtimeLog {
                content: fragment.to_string(),
            });
        }
        self.emit(InboundEvent::AutoglmStep {
            kind: StepKind::Finish,
            content: "任务执行完成".to_string(),
        });
    }

    async fn pause(&self) {
        if !self.pace.is_zero() {
            tokio::time::sleep(self.pace).await;
        }
    }

    fn emit(&self, event: InboundEvent) {
        self.subscribers.broadcast(TransportEvent::Inbound(event));
    }
}

/// Split `text` into pieces whose character counts cycle through `sizes`.
/// Zero sizes are skipped; an empty `sizes` yields the whole text.
pub fn chop_at_char_boundaries<'a>(text: &'a str, sizes: &[usize]) -> Vec<&'a str> {
    let sizes: Vec<usize> = sizes.iter().copied().filter(|size| *size > 0).collect();
    if sizes.is_empty() {
        return vec![text];
    }
    let mut pieces = Vec::new();
    let mut rest = text;
    for size in sizes.iter().cycle() {
        if rest.is_empty() {
            break;
        }
        let cut = rest
            .char_indices()
            .nth(*size)
            .map_or(rest.len(), |(idx, _)| idx);
        let (piece, tail) = rest.split_at(cut);
        pieces.push(piece);
        rest = tail;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn drain_until(stream: &EventStream, done: impl Fn(&TransportEvent) -> bool) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.next_timeout(Duration::from_secs(5)) {
            let stop = done(&event);
            events.push(event);
            if stop {
                break;
            }
        }
        events
    }

    #[test]
    fn chopping_preserves_text_and_char_boundaries() {
        let pieces = chop_at_char_boundaries(DEMO_TRACE, FRAGMENT_SIZES);
        assert_eq!(pieces.concat(), DEMO_TRACE);
        assert!(pieces.len() > 10);
        assert_eq!(pieces[0].chars().count(), 3);

        assert_eq!(chop_at_char_boundaries("abc", &[]), vec!["abc"]);
        assert_eq!(chop_at_char_boundaries("abc", &[0, 2]), vec!["ab", "c"]);
        assert!(chop_at_char_boundaries("", &[1]).is_empty());
    }

    #[test]
    fn chat_message_streams_a_reply() {
        let transport = DemoTransport::new(runtime(), "10.0.0.2:5555".to_string(), Duration::ZERO);
        let stream = transport.subscribe().expect("subscribe");
        transport
            .send(OutboundCommand::SendMessage {
                message: "hi".to_string(),
            })
            .expect("send");

        let events = drain_until(&stream, |event| {
            matches!(
                event,
                TransportEvent::Inbound(InboundEvent::AiMessageComplete { .. })
            )
        });
        assert_eq!(events[0], TransportEvent::Connected);
        assert_eq!(
            events[2],
            TransportEvent::Inbound(InboundEvent::UserMessage {
                message: "hi".to_string()
            })
        );
        let reply: String = events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Inbound(InboundEvent::AiMessageChunk { chunk }) => {
                    Some(chunk.as_str())
                }
                _ => None,
            })
            .collect();
        assert!(reply.starts_with("收到：“hi”"));
    }

    #[test]
    fn control_mode_task_streams_the_trace() {
        let transport = DemoTransport::new(runtime(), "10.0.0.2:5555".to_string(), Duration::ZERO);
        let stream = transport.subscribe().expect("subscribe");
        transport
            .send(OutboundCommand::SwitchMode {
                mode: WireMode::Autoglm,
            })
            .expect("switch");
        transport
            .send(OutboundCommand::SendMessage {
                message: "打开微信".to_string(),
            })
            .expect("send");

        let events = drain_until(&stream, |event| {
            matches!(
                event,
                TransportEvent::Inbound(InboundEvent::AutoglmStep {
                    kind: StepKind::Finish,
                    ..
                })
            )
        });
        let trace: String = events
            .iter()
            .filter_map(|event| match event {
                TransportEvent::Inbound(InboundEvent::AutoglmRealtimeLog { content }) => {
                    Some(content.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(trace, DEMO_TRACE);
        assert!(events.contains(&TransportEvent::Inbound(InboundEvent::ModeSwitched {
            mode: WireMode::Autoglm
        })));
    }
}
