use cockpit_core::ChatRole;
use cockpit_core::MetricsBlock;
use cockpit_core::SessionState;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use super::ChatPane;
use super::DetailPane;
use super::ScrollState;
use super::Scrolls;
use super::SummaryPane;
use super::scroll::wrap_text;
use super::status_bar::StatusBar;
use super::style::category_style;
use super::style::role_prefix;
use super::style::role_style;

const CLOCK: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const OPEN_MARK: &str = "▌";
const KEY_HINTS: &str = "输入 · Tab 切换模式 · Enter 发送 · F5 投屏 · F6 连接 ADB · Esc 退出";

struct Row {
    text: String,
    style: Style,
}

pub struct CockpitView<'a> {
    pub state: &'a SessionState,
    pub chat: &'a ChatPane,
    pub summary: &'a SummaryPane,
    pub detail: &'a DetailPane,
    pub panel_visible: bool,
    pub metrics: Option<&'a MetricsBlock>,
    pub composer: &'a str,
    pub finished: bool,
    pub scroll: &'a mut Scrolls,
}

impl CockpitView<'_> {
    fn chat_rows(&self, width: usize) -> Vec<Row> {
        let mut rows = Vec::new();
        for message in self.chat.messages() {
            let mut text = format!("{}{}", role_prefix(message.role), message.text);
            if message.role == ChatRole::Assistant && !message.sealed {
                text.push_str(OPEN_MARK);
            }
            push_wrapped(&mut rows, &text, width, role_style(message.role));
        }
        rows
    }

    fn summary_rows(&self, width: usize) -> Vec<Row> {
        let mut rows = Vec::new();
        for entry in self.summary.entries() {
            let text = match entry.step {
                Some(step) => format!("[{step}] {}", entry.content),
                None => entry.content.clone(),
            };
            push_wrapped(&mut rows, &text, width, category_style(entry.category));
        }
        rows
    }

    fn detail_rows(&self, width: usize) -> Vec<Row> {
        let mut rows = Vec::new();
        for entry in self.detail.entries() {
            let clock = entry.timestamp.format(CLOCK).unwrap_or_default();
            let mut text = format!("{clock} {}", entry.content);
            if entry.is_open {
                text.push_str(OPEN_MARK);
            }
            push_wrapped(&mut rows, &text, width, category_style(entry.category));
        }
        rows
    }
}

impl Widget for CockpitView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 5 || area.width < 20 {
            return;
        }
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        StatusBar {
            state: self.state,
            metrics: self.metrics,
            finished: self.finished,
        }
        .render(vertical[0], buf);

        let chat_area = if self.panel_visible {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(vertical[1]);
            let process = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(body[1]);

            let summary_rows = self.summary_rows(inner_width(process[0]));
            render_rows(process[0], buf, "执行摘要", summary_rows, &mut self.scroll.summary);
            let detail_rows = self.detail_rows(inner_width(process[1]));
            render_rows(process[1], buf, "实时日志", detail_rows, &mut self.scroll.detail);
            body[0]
        } else {
            vertical[1]
        };
        let chat_rows = self.chat_rows(inner_width(chat_area));
        render_rows(chat_area, buf, "对话", chat_rows, &mut self.scroll.chat);

        let composer = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(self.composer.to_string()),
            Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]))
        .block(styled_block(KEY_HINTS, true));
        composer.render(vertical[2], buf);
    }
}

fn push_wrapped(rows: &mut Vec<Row>, text: &str, width: usize, style: Style) {
    let text = text.replace(['\r', '\t'], " ");
    for row in wrap_text(&text, width) {
        rows.push(Row { text: row, style });
    }
}

fn inner_width(area: Rect) -> usize {
    usize::from(area.width.saturating_sub(2))
}

fn render_rows(area: Rect, buf: &mut Buffer, title: &str, rows: Vec<Row>, scroll: &mut ScrollState) {
    let title = if scroll.is_following() {
        title.to_string()
    } else {
        format!("{title} · 已暂停跟随 (End 恢复)")
    };
    let block = styled_block(&title, false);
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 {
        return;
    }
    let window = scroll.window(rows.len(), usize::from(inner.height));
    let lines: Vec<Line> = rows
        .into_iter()
        .skip(window.start)
        .take(window.len())
        .map(|row| Line::styled(row.text, row.style))
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

fn styled_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Block::default()
        .title(Span::styled(format!(" {title} "), style))
        .borders(Borders::ALL)
        .border_style(style)
}
