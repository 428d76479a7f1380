mod panes;
mod scroll;
mod status_bar;
mod style;
mod view;

pub use panes::ChatPane;
pub use panes::DetailPane;
pub use panes::PanelToggle;
pub use panes::SummaryPane;
pub use scroll::ScrollState;
pub use scroll::wrap_text;
pub use status_bar::StatusBar;
pub use status_bar::metrics_spans;
pub use view::CockpitView;

/// Independent scroll positions for the three scrollable panes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scrolls {
    pub chat: ScrollState,
    pub summary: ScrollState,
    pub detail: ScrollState,
}

impl Scrolls {
    pub fn follow_all(&mut self) {
        self.chat.follow();
        self.summary.follow();
        self.detail.follow();
    }
}
