use cockpit_core::MetricsBlock;
use cockpit_core::Mode;
use cockpit_core::SessionState;
use cockpit_core::session::ConnectionStatus;
use cockpit_core::session::LinkState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;

pub struct StatusBar<'a> {
    pub state: &'a SessionState,
    pub metrics: Option<&'a MetricsBlock>,
    pub finished: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 10 {
            return;
        }
        let mut spans = vec![mode_span(self.state.mode), "  ".into()];
        spans.push(match self.state.link {
            LinkState::Connecting => "● 连接中".yellow(),
            LinkState::Online => "● 在线".green(),
            LinkState::Offline => "● 离线".red(),
        });
        spans.push("  ".into());
        spans.push(device_span(self.state));
        if self.state.mirroring {
            spans.push("  ".into());
            spans.push(format!("🖥 投屏 {} 帧", self.state.frames_received).cyan());
        }
        if let Some(block) = self.metrics {
            let metrics = metrics_spans(block);
            if !metrics.is_empty() {
                spans.push("  ⏱ ".into());
                spans.extend(metrics);
            }
        }
        if self.finished {
            spans.push("  ".into());
            spans.push("回放结束".dim());
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

fn mode_span(mode: Mode) -> Span<'static> {
    let label = format!(" {mode} ");
    match mode {
        Mode::Chat => label.black().on_cyan().bold(),
        Mode::DeviceControl => label.black().on_magenta().bold(),
    }
}

fn device_span(state: &SessionState) -> Span<'static> {
    match (&state.active_device, state.connection_status) {
        (Some(device), ConnectionStatus::Connected) => format!("📱 {device}").green(),
        (_, ConnectionStatus::Unknown) => "📱 设备状态未知".dim(),
        _ => "📱 未连接".red(),
    }
}

/// One span per timed entry of `block`, colored by how slow it was.
pub fn metrics_spans(block: &MetricsBlock) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for entry in &block.entries {
        let (Some(unit), Some(millis)) = (entry.unit, entry.as_millis()) else {
            continue;
        };
        if !spans.is_empty() {
            spans.push(" ".into());
        }
        let text = if entry.label.is_empty() {
            format!("{}{unit}", entry.value)
        } else {
            format!("{} {}{unit}", entry.label, entry.value)
        };
        spans.push(if millis <= 1000.0 {
            text.green()
        } else if millis <= 3000.0 {
            text.cyan()
        } else {
            text.red()
        });
    }
    spans
}
