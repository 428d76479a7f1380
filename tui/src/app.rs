use std::time::Duration;

use cockpit_core::ChatAccumulator;
use cockpit_core::CockpitConfig;
use cockpit_core::SessionController;
use cockpit_core::TracePipeline;
use cockpit_protocol::OutboundCommand;
use color_eyre::eyre::Result;
use crossterm::event;
use crossterm::event::Event;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::keymap::Action;
use crate::keymap::Keymap;
use crate::transport::EventStream;
use crate::transport::TransportEvent;
use crate::transport::TransportHandle;
use crate::ui::ChatPane;
use crate::ui::CockpitView;
use crate::ui::DetailPane;
use crate::ui::PanelToggle;
use crate::ui::Scrolls;
use crate::ui::SummaryPane;

const TICK: Duration = Duration::from_millis(50);
const PAGE_ROWS: usize = 10;

pub type Controller = SessionController<SummaryPane, DetailPane, ChatPane, PanelToggle>;

/// Controller wired to the terminal panes and greeted, ready for events.
pub fn build_controller(config: &CockpitConfig) -> Controller {
    let display = &config.display;
    let pipeline = TracePipeline::with_summary_width(
        SummaryPane::default(),
        DetailPane::new(display.detail_capacity),
        display.summary_width,
    );
    let chat = ChatAccumulator::with_capacity(
        ChatPane::new(display.chat_history),
        display.chat_history,
    );
    let mut controller =
        SessionController::new(pipeline, chat, PanelToggle::default(), config.device.address());
    controller.greet();
    controller
}

pub struct App {
    controller: Controller,
    transport: TransportHandle,
    stream: EventStream,
    keymap: Keymap,
    composer: String,
    scroll: Scrolls,
    finished: bool,
    exit: bool,
}

impl App {
    pub fn new(config: &CockpitConfig, transport: TransportHandle) -> Result<Self> {
        let stream = transport.subscribe()?;
        Ok(Self {
            controller: build_controller(config),
            transport,
            stream,
            keymap: Keymap::new(),
            composer: String::new(),
            scroll: Scrolls::default(),
            finished: false,
            exit: false,
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn composer(&self) -> &str {
        &self.composer
    }

    pub fn scroll(&self) -> &Scrolls {
        &self.scroll
    }

    /// The transport reported that no more events will arrive.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    /// Apply every event already queued, in arrival order.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.stream.try_next() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Block up to `timeout` for one event. Returns whether one arrived.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.stream.next_timeout(timeout) {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.controller.transport_connected(),
            TransportEvent::Inbound(event) => {
                tracing::trace!(event = event.name(), "inbound");
                self.controller.handle(event);
            }
            TransportEvent::DecodeFailed(error) => self.controller.decode_failed(&error),
            TransportEvent::Disconnected { reason } => self.controller.transport_lost(&reason),
            TransportEvent::Finished => {
                self.controller.end_of_stream();
                self.finished = true;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(action) = self.keymap.resolve(key) {
            self.perform(action);
        }
    }

    pub fn perform(&mut self, action: Action) {
        let panel_visible = self.controller.panel().is_visible();
        match action {
            Action::ToggleMode => {
                let target = self.controller.mode().toggled();
                if self.controller.request_mode(target) {
                    self.scroll.follow_all();
                    self.send(OutboundCommand::SwitchMode {
                        mode: target.to_wire(),
                    });
                }
            }
            Action::Submit => {
                let message = self.composer.trim().to_string();
                if message.is_empty() {
                    return;
                }
                self.composer.clear();
                self.scroll.chat.follow();
                self.send(OutboundCommand::SendMessage { message });
            }
            Action::Insert(c) => self.composer.push(c),
            Action::Backspace => {
                self.composer.pop();
            }
            Action::ScrollUp if panel_visible => self.scroll.summary.scroll_up(1),
            Action::ScrollDown if panel_visible => self.scroll.summary.scroll_down(1),
            Action::PageUp if panel_visible => self.scroll.detail.scroll_up(PAGE_ROWS),
            Action::PageDown if panel_visible => self.scroll.detail.scroll_down(PAGE_ROWS),
            Action::ScrollUp => self.scroll.chat.scroll_up(1),
            Action::ScrollDown => self.scroll.chat.scroll_down(1),
            Action::PageUp => self.scroll.chat.scroll_up(PAGE_ROWS),
            Action::PageDown => self.scroll.chat.scroll_down(PAGE_ROWS),
            Action::Follow => self.scroll.follow_all(),
            Action::StartMirroring => self.send(OutboundCommand::StartScrcpy),
            Action::ConnectDevice => self.send(OutboundCommand::AdbConnect),
            Action::Quit => self.exit = true,
        }
    }

    pub fn set_composer(&mut self, text: &str) {
        self.composer = text.to_string();
    }

    /// Close any trailing metrics block without waiting for the transport.
    pub fn end_of_stream(&mut self) {
        self.controller.end_of_stream();
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let pipeline = self.controller.pipeline();
        let view = CockpitView {
            state: self.controller.state(),
            chat: self.controller.chat().view(),
            summary: pipeline.summary(),
            detail: pipeline.detail(),
            panel_visible: self.controller.panel().is_visible(),
            metrics: pipeline.metrics().completed().last(),
            composer: &self.composer,
            finished: self.finished,
            scroll: &mut self.scroll,
        };
        frame.render_widget(view, frame.area());
    }

    fn send(&mut self, command: OutboundCommand) {
        if let Err(err) = self.transport.send(command) {
            tracing::warn!(%err, "failed to send command");
            self.controller.transport_lost(&err.to_string());
        }
    }
}

pub fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.drain_events();
        terminal.draw(|frame| app.draw(frame))?;
        if app.should_exit() {
            return Ok(());
        }
        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
}
