use std::ops::Range;

use unicode_width::UnicodeWidthChar;

/// Scroll position measured from the bottom. Zero means the view follows new
/// rows as they arrive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
}

impl ScrollState {
    pub fn is_following(&self) -> bool {
        self.offset == 0
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn follow(&mut self) {
        self.offset = 0;
    }

    /// Rows of a `total`-row document visible in a `height`-row viewport.
    /// The stored offset is clamped so scrolling past the top pins there.
    pub fn window(&mut self, total: usize, height: usize) -> Range<usize> {
        let max_offset = total.saturating_sub(height);
        self.offset = self.offset.min(max_offset);
        let end = total - self.offset;
        end.saturating_sub(height)..end
    }
}

/// Break `text` into rows of at most `width` terminal columns. Characters
/// wider than the whole row get a row of their own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width && !row.is_empty() {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        row.push(ch);
        used += ch_width;
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn following_shows_the_last_rows() {
        let mut scroll = ScrollState::default();
        assert_eq!(scroll.window(10, 4), 6..10);
        assert_eq!(scroll.window(3, 4), 0..3);
        assert!(scroll.is_following());
    }

    #[test]
    fn scrolling_up_is_clamped_to_the_top() {
        let mut scroll = ScrollState::default();
        scroll.scroll_up(3);
        assert_eq!(scroll.window(10, 4), 3..7);
        scroll.scroll_up(100);
        assert_eq!(scroll.window(10, 4), 0..4);
        scroll.scroll_down(1);
        assert_eq!(scroll.window(10, 4), 1..5);
        scroll.follow();
        assert_eq!(scroll.window(10, 4), 6..10);
    }

    #[test]
    fn offset_is_kept_relative_to_the_bottom() {
        let mut scroll = ScrollState::default();
        scroll.scroll_up(2);
        assert_eq!(scroll.window(10, 4), 4..8);
        assert_eq!(scroll.window(12, 4), 6..10);
        assert!(!scroll.is_following());
    }

    #[test]
    fn wraps_by_display_width() {
        assert_eq!(wrap_text("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_text("思考过程", 5), vec!["思考", "过程"]);
        assert_eq!(wrap_text("", 5), vec![""]);
        assert_eq!(wrap_text("宽", 1), vec!["宽"]);
    }
}
