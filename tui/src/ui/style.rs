use cockpit_core::ChatRole;
use cockpit_core::LineCategory;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

pub fn category_style(category: LineCategory) -> Style {
    match category {
        LineCategory::Performance => Style::default().fg(Color::Magenta),
        LineCategory::Thinking => Style::default().fg(Color::Cyan),
        LineCategory::Action => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        LineCategory::Finish => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        LineCategory::Separator => Style::default().add_modifier(Modifier::DIM),
        LineCategory::Plain => Style::default(),
    }
}

pub fn role_style(role: ChatRole) -> Style {
    match role {
        ChatRole::User => Style::default().fg(Color::Blue),
        ChatRole::Assistant => Style::default(),
        ChatRole::System => Style::default().fg(Color::Indexed(105)),
        ChatRole::Error => Style::default().fg(Color::Red),
    }
}

pub fn role_prefix(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "👤 ",
        ChatRole::Assistant => "🤖 ",
        ChatRole::System | ChatRole::Error => "· ",
    }
}
