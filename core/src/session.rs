//! Top-level state machine: dispatches inbound events to the chat accumulator
//! or the trace pipeline and owns every reset.

use std::collections::VecDeque;

use cockpit_protocol::InboundEvent;
use cockpit_protocol::WireMode;
use strum_macros::Display;

use crate::chat::ChatAccumulator;
use crate::chat::ChatRole;
use crate::chat::ChatView;
use crate::publisher::DetailSink;
use crate::publisher::SummarySink;
use crate::publisher::TracePipeline;

pub const WELCOME_NOTICE: &str = "👋 欢迎使用 AutoGLM Cockpit";
pub const MODE_HINT_NOTICE: &str = "💡 提示：A 模式用于普通对话，B 模式用于控制手机";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Mode {
    #[strum(serialize = "A 普通聊天")]
    Chat,
    #[strum(serialize = "B 手机控制")]
    DeviceControl,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Chat => Mode::DeviceControl,
            Mode::DeviceControl => Mode::Chat,
        }
    }

    pub fn to_wire(self) -> WireMode {
        match self {
            Mode::Chat => WireMode::Normal,
            Mode::DeviceControl => WireMode::Autoglm,
        }
    }

    fn notice(self) -> &'static str {
        match self {
            Mode::Chat => "🔄 切换到 A 模式：普通聊天",
            Mode::DeviceControl => "🔄 切换到 B 模式：手机控制",
        }
    }
}

impl From<WireMode> for Mode {
    fn from(mode: WireMode) -> Self {
        match mode {
            WireMode::Normal => Mode::Chat,
            WireMode::Autoglm => Mode::DeviceControl,
        }
    }
}

/// State of the remote device link as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionStatus {
    #[strum(serialize = "未知")]
    Unknown,
    #[strum(serialize = "已连接")]
    Connected,
    #[strum(serialize = "未连接")]
    Disconnected,
}

/// State of the transport feeding events into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LinkState {
    Connecting,
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub mode: Mode,
    pub connection_status: ConnectionStatus,
    pub active_device: Option<String>,
    pub link: LinkState,
    pub devices: Vec<String>,
    pub mirroring: bool,
    pub frames_received: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            mode: Mode::Chat,
            connection_status: ConnectionStatus::Unknown,
            active_device: None,
            link: LinkState::Connecting,
            devices: Vec::new(),
            mirroring: false,
            frames_received: 0,
        }
    }
}

pub trait ProcessPanel {
    fn set_visible(&mut self, visible: bool);
}

pub struct SessionController<S, D, C, P> {
    state: SessionState,
    pipeline: TracePipeline<S, D>,
    chat: ChatAccumulator<C>,
    panel: P,
    device_address: String,
    decode_failure_reported: bool,
    /// Locally requested modes the server has not echoed yet, oldest first.
    pending_modes: VecDeque<Mode>,
}

impl<S, D, C, P> SessionController<S, D, C, P>
where
    S: SummarySink,
    D: DetailSink,
    C: ChatView,
    P: ProcessPanel,
{
    /// Starts in chat mode with the process panel hidden. `device_address` is
    /// the configured `ip:port` reported as the active device once ADB
    /// connects.
    pub fn new(
        pipeline: TracePipeline<S, D>,
        chat: ChatAccumulator<C>,
        mut panel: P,
        device_address: impl Into<String>,
    ) -> Self {
        panel.set_visible(false);
        Self {
            state: SessionState::default(),
            pipeline,
            chat,
            panel,
            device_address: device_address.into(),
            decode_failure_reported: false,
            pending_modes: VecDeque::new(),
        }
    }

    pub fn greet(&mut self) {
        self.chat.push_notice(ChatRole::System, WELCOME_NOTICE);
        self.chat.push_notice(ChatRole::System, MODE_HINT_NOTICE);
    }

    /// Returns whether the mode actually changed.
    pub fn switch_mode(&mut self, target: Mode) -> bool {
        if target == self.state.mode {
            tracing::debug!(mode = %target, "mode unchanged");
            return false;
        }
        match target {
            Mode::DeviceControl => {
                self.pipeline.reset();
                self.panel.set_visible(true);
            }
            Mode::Chat => {
                self.pipeline.discard_open_line();
                self.pipeline.end_of_stream();
                self.panel.set_visible(false);
            }
        }
        tracing::info!(from = %self.state.mode, to = %target, "mode switched");
        self.state.mode = target;
        self.chat.push_notice(ChatRole::System, target.notice());
        true
    }

    /// Switch on the user's behalf. The server's `mode_switched` echo for this
    /// request is then taken as a confirmation rather than a new switch.
    pub fn request_mode(&mut self, target: Mode) -> bool {
        let changed = self.switch_mode(target);
        if changed {
            self.pending_modes.push_back(target);
        }
        changed
    }

    pub fn handle(&mut self, event: InboundEvent) {
        self.decode_failure_reported = false;
        match event {
            InboundEvent::UserMessage { message } => self.chat.push_user(&message),
            InboundEvent::AiMessageChunk { chunk } => self.chat.on_chunk(&chunk),
            InboundEvent::AiMessageComplete { .. } => self.chat.on_complete(),
            InboundEvent::AutoglmStep { kind, content } => {
                if self.accepts_trace("autoglm_step") {
                    self.pipeline.record_step(kind, &content);
                }
            }
            InboundEvent::AutoglmRealtimeLog { content } => {
                if self.accepts_trace("autoglm_realtime_log") {
                    self.pipeline.ingest(&content);
                }
            }
            InboundEvent::AdbStatus { connected, message } => {
                self.set_device_connected(connected);
                let notice = if connected {
                    "✅ ADB 已连接"
                } else {
                    "❌ ADB 连接失败"
                };
                self.device_notice(connected, notice, message);
            }
            InboundEvent::AdbConnectResult { success, message } => {
                self.set_device_connected(success);
                let notice = if success {
                    "✅ ADB 连接成功"
                } else {
                    "❌ ADB 连接失败"
                };
                self.device_notice(success, notice, message);
            }
            InboundEvent::AdbPairResult { success, message } => {
                let notice = if success {
                    "✅ 配对成功"
                } else {
                    "❌ 配对失败"
                };
                self.device_notice(success, notice, message);
            }
            InboundEvent::AdbDisconnectResult { success, message } => {
                if success {
                    self.set_device_connected(false);
                    self.state.mirroring = false;
                }
                let notice = if success {
                    "🔌 已断开 ADB 连接"
                } else {
                    "❌ 断开 ADB 连接失败"
                };
                self.device_notice(success, notice, message);
            }
            InboundEvent::AdbDevicesList { devices } => {
                tracing::debug!(count = devices.len(), "device list received");
                self.state.devices = devices;
            }
            InboundEvent::ScrcpyStarted { message } => {
                self.state.mirroring = true;
                self.device_notice(true, "🖥️ 投屏已启动", message);
            }
            InboundEvent::ScreenFrame { .. } => {
                self.state.mirroring = true;
                self.state.frames_received += 1;
            }
            InboundEvent::ModeSwitched { mode } => self.server_mode(mode.into()),
            InboundEvent::Error { message } => {
                self.chat
                    .push_notice(ChatRole::Error, format!("❌ 错误: {message}"));
            }
            InboundEvent::Status { message } => {
                self.chat.push_notice(ChatRole::System, message);
            }
        }
    }

    pub fn transport_connected(&mut self) {
        if self.state.link == LinkState::Online {
            return;
        }
        tracing::info!("transport connected");
        self.state.link = LinkState::Online;
        self.chat.push_notice(ChatRole::System, "✅ 已连接到服务器");
    }

    /// Reassembly state is kept so delivery can resume where it paused.
    pub fn transport_lost(&mut self, reason: &str) {
        if self.state.link == LinkState::Offline {
            tracing::debug!(reason, "transport still offline");
            return;
        }
        tracing::info!(reason, "transport disconnected");
        self.state.link = LinkState::Offline;
        // Echoes for requests sent before the drop will not arrive.
        self.pending_modes.clear();
        let notice = if reason.is_empty() {
            "❌ 与服务器断开连接".to_string()
        } else {
            format!("❌ 与服务器断开连接: {reason}")
        };
        self.chat.push_notice(ChatRole::Error, notice);
    }

    /// One notice per run of undecodable input; the next good event re-arms it.
    pub fn decode_failed(&mut self, error: &str) {
        tracing::warn!(error, "dropping undecodable event");
        if self.decode_failure_reported {
            return;
        }
        self.decode_failure_reported = true;
        self.chat
            .push_notice(ChatRole::Error, format!("❌ 无法解析服务器消息: {error}"));
    }

    /// The transport has no more input; close any trailing metrics block.
    pub fn end_of_stream(&mut self) {
        self.pipeline.end_of_stream();
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn pipeline(&self) -> &TracePipeline<S, D> {
        &self.pipeline
    }

    pub fn chat(&self) -> &ChatAccumulator<C> {
        &self.chat
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    fn server_mode(&mut self, mode: Mode) {
        if let Some(pos) = self.pending_modes.iter().position(|pending| *pending == mode) {
            self.pending_modes = self.pending_modes.split_off(pos + 1);
            tracing::debug!(%mode, "mode switch confirmed");
        } else if self.pending_modes.is_empty() {
            self.switch_mode(mode);
        } else {
            tracing::debug!(%mode, pending = self.pending_modes.len(), "stale mode echo ignored");
        }
    }

    fn accepts_trace(&self, event: &'static str) -> bool {
        if self.state.mode == Mode::DeviceControl {
            return true;
        }
        tracing::debug!(event, "trace event outside device-control mode dropped");
        false
    }

    fn set_device_connected(&mut self, connected: bool) {
        if connected {
            self.state.connection_status = ConnectionStatus::Connected;
            self.state.active_device = Some(self.device_address.clone());
        } else {
            self.state.connection_status = ConnectionStatus::Disconnected;
            self.state.active_device = None;
        }
    }

    fn device_notice(&mut self, success: bool, fallback: &str, message: Option<String>) {
        let text = match message {
            Some(message) if !message.trim().is_empty() => message,
            _ => fallback.to_string(),
        };
        let role = if success {
            ChatRole::System
        } else {
            ChatRole::Error
        };
        self.chat.push_notice(role, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingChat;
    use crate::test_support::RecordingDetail;
    use crate::test_support::RecordingPanel;
    use crate::test_support::RecordingSummary;
    use cockpit_protocol::StepKind;
    use pretty_assertions::assert_eq;

    type TestController =
        SessionController<RecordingSummary, RecordingDetail, RecordingChat, RecordingPanel>;

    fn controller() -> TestController {
        SessionController::new(
            TracePipeline::new(RecordingSummary::default(), RecordingDetail::default()),
            ChatAccumulator::new(RecordingChat::default()),
            RecordingPanel::default(),
            "192.168.2.13:34333",
        )
    }

    fn notices(controller: &TestController) -> Vec<String> {
        controller
            .chat()
            .history()
            .map(|message| message.text.clone())
            .collect()
    }

    fn log(content: &str) -> InboundEvent {
        InboundEvent::AutoglmRealtimeLog {
            content: content.to_string(),
        }
    }

    #[test]
    fn starts_in_chat_mode_with_hidden_panel() {
        let controller = controller();
        assert_eq!(controller.mode(), Mode::Chat);
        assert!(!controller.panel().visible);
        assert_eq!(controller.state().link, LinkState::Connecting);
    }

    #[test]
    fn entering_device_mode_twice_clears_once() {
        let mut controller = controller();
        assert!(controller.switch_mode(Mode::DeviceControl));
        controller.handle(log("kept\n"));
        assert!(!controller.switch_mode(Mode::DeviceControl));

        let pipeline = controller.pipeline();
        assert_eq!(pipeline.summary().clears, 1);
        assert_eq!(pipeline.detail().clears, 1);
        assert_eq!(pipeline.summary().entries.len(), 1);
        assert!(controller.panel().visible);
        assert_eq!(notices(&controller), vec!["🔄 切换到 B 模式：手机控制"]);
    }

    #[test]
    fn switching_to_the_current_mode_changes_nothing() {
        let mut controller = controller();
        assert!(!controller.switch_mode(Mode::Chat));
        assert_eq!(controller.panel().toggles, 1);
        assert_eq!(controller.chat().history().count(), 0);
    }

    #[test]
    fn leaving_device_mode_keeps_chat_and_drops_open_line() {
        let mut controller = controller();
        controller.handle(InboundEvent::UserMessage {
            message: "你好".to_string(),
        });
        controller.switch_mode(Mode::DeviceControl);
        controller.handle(log("half a li"));
        controller.switch_mode(Mode::Chat);

        assert!(!controller.panel().visible);
        assert!(controller.pipeline().reassembler().open_line().is_none());
        assert_eq!(
            notices(&controller),
            vec![
                "你好",
                "🔄 切换到 B 模式：手机控制",
                "🔄 切换到 A 模式：普通聊天",
            ]
        );

        controller.switch_mode(Mode::DeviceControl);
        controller.handle(log("ne\n"));
        let summary: Vec<&str> = controller
            .pipeline()
            .summary()
            .entries
            .iter()
            .map(|entry| entry.content.as_str())
            .collect();
        assert_eq!(summary, vec!["ne"]);
    }

    #[test]
    fn trace_events_in_chat_mode_are_dropped() {
        let mut controller = controller();
        controller.handle(log("stale\n"));
        controller.handle(InboundEvent::AutoglmStep {
            kind: StepKind::Thinking,
            content: "ignored".to_string(),
        });
        assert!(controller.pipeline().summary().entries.is_empty());
        assert!(controller.pipeline().detail().entries.is_empty());
    }

    #[test]
    fn chat_events_stream_into_one_reply() {
        let mut controller = controller();
        controller.handle(InboundEvent::AiMessageChunk {
            chunk: "Hel".to_string(),
        });
        controller.handle(InboundEvent::AiMessageChunk {
            chunk: "lo".to_string(),
        });
        controller.handle(InboundEvent::AiMessageComplete { message: None });
        controller.handle(InboundEvent::AiMessageComplete { message: None });

        let history: Vec<(ChatRole, String, bool)> = controller
            .chat()
            .history()
            .map(|message| (message.role, message.text.clone(), message.sealed))
            .collect();
        assert_eq!(history, vec![(ChatRole::Assistant, "Hello".to_string(), true)]);
    }

    #[test]
    fn server_confirmation_of_a_local_switch_is_a_no_op() {
        let mut controller = controller();
        controller.switch_mode(Mode::DeviceControl);
        controller.handle(InboundEvent::ModeSwitched {
            mode: WireMode::Autoglm,
        });
        assert_eq!(controller.pipeline().summary().clears, 1);
        assert_eq!(controller.chat().history().count(), 1);

        controller.handle(InboundEvent::ModeSwitched {
            mode: WireMode::Normal,
        });
        assert_eq!(controller.mode(), Mode::Chat);
    }

    #[test]
    fn late_echoes_of_quick_toggles_do_not_flip_the_mode() {
        let mut controller = controller();
        assert!(controller.request_mode(Mode::DeviceControl));
        assert!(controller.request_mode(Mode::Chat));

        controller.handle(InboundEvent::ModeSwitched {
            mode: WireMode::Autoglm,
        });
        assert_eq!(controller.mode(), Mode::Chat);
        controller.handle(InboundEvent::ModeSwitched {
            mode: WireMode::Normal,
        });
        assert_eq!(controller.mode(), Mode::Chat);

        assert_eq!(controller.pipeline().summary().clears, 1);
        assert_eq!(controller.chat().history().count(), 2);

        // Nothing pending any more: the server may switch on its own.
        controller.handle(InboundEvent::ModeSwitched {
            mode: WireMode::Autoglm,
        });
        assert_eq!(controller.mode(), Mode::DeviceControl);
    }

    #[test]
    fn device_events_update_indicators() {
        let mut controller = controller();
        controller.handle(InboundEvent::AdbStatus {
            connected: true,
            message: None,
        });
        assert_eq!(controller.state().connection_status, ConnectionStatus::Connected);
        assert_eq!(
            controller.state().active_device.as_deref(),
            Some("192.168.2.13:34333")
        );

        controller.handle(InboundEvent::AdbDevicesList {
            devices: vec!["192.168.2.13:34333".to_string()],
        });
        controller.handle(InboundEvent::ScrcpyStarted { message: None });
        controller.handle(InboundEvent::ScreenFrame {
            frame: "aGVsbG8=".to_string(),
        });
        controller.handle(InboundEvent::ScreenFrame {
            frame: "aGVsbG8=".to_string(),
        });
        assert!(controller.state().mirroring);
        assert_eq!(controller.state().frames_received, 2);
        assert_eq!(controller.state().devices.len(), 1);

        controller.handle(InboundEvent::AdbDisconnectResult {
            success: true,
            message: Some("已断开".to_string()),
        });
        assert_eq!(
            controller.state().connection_status,
            ConnectionStatus::Disconnected
        );
        assert_eq!(controller.state().active_device, None);
        assert!(!controller.state().mirroring);
        assert_eq!(
            notices(&controller),
            vec!["✅ ADB 已连接", "🖥️ 投屏已启动", "已断开"]
        );
    }

    #[test]
    fn failed_results_become_error_notices() {
        let mut controller = controller();
        controller.handle(InboundEvent::AdbConnectResult {
            success: false,
            message: Some("   ".to_string()),
        });
        controller.handle(InboundEvent::Error {
            message: "agent crashed".to_string(),
        });
        let roles: Vec<(ChatRole, String)> = controller
            .chat()
            .history()
            .map(|message| (message.role, message.text.clone()))
            .collect();
        assert_eq!(
            roles,
            vec![
                (ChatRole::Error, "❌ ADB 连接失败".to_string()),
                (ChatRole::Error, "❌ 错误: agent crashed".to_string()),
            ]
        );
    }

    #[test]
    fn transport_loss_is_reported_once_and_keeps_the_open_line() {
        let mut controller = controller();
        controller.transport_connected();
        controller.switch_mode(Mode::DeviceControl);
        controller.handle(log("resu"));
        controller.transport_lost("reset by peer");
        controller.transport_lost("reset by peer");
        controller.transport_connected();
        controller.handle(log("med\n"));

        let errors = controller
            .chat()
            .history()
            .filter(|message| message.role == ChatRole::Error)
            .count();
        assert_eq!(errors, 1);
        assert_eq!(
            controller.pipeline().summary().entries[0].content,
            "resumed"
        );
    }

    #[test]
    fn decode_failures_are_reported_once_per_run() {
        let mut controller = controller();
        controller.decode_failed("expected value at line 1 column 1");
        controller.decode_failed("expected value at line 1 column 1");
        controller.handle(InboundEvent::Status {
            message: "ok".to_string(),
        });
        controller.decode_failed("trailing characters");
        let errors = controller
            .chat()
            .history()
            .filter(|message| message.role == ChatRole::Error)
            .count();
        assert_eq!(errors, 2);
    }

    #[test]
    fn greeting_posts_welcome_and_hint() {
        let mut controller = controller();
        controller.greet();
        assert_eq!(notices(&controller), vec![WELCOME_NOTICE, MODE_HINT_NOTICE]);
    }
}
