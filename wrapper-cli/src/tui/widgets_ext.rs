use std::borrow::Cow;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
};

#[extend::ext]
pub impl Rect {
    /// Wrap `text` the way it would sit inside a bordered block of this size.
    fn wrap_inside<'a>(&self, text: &'a str) -> Vec<Cow<'a, str>> {
        let max_width = self.width.saturating_sub(2).max(1);
        let wrap = textwrap::Options::new(max_width.into());

        textwrap::wrap(text, wrap)
    }
}

#[extend::ext]
pub impl Style {
    fn focused() -> Self {
        Style::default().fg(Color::Green)
    }

    fn active() -> Self {
        Style::default().fg(Color::Cyan)
    }

    /// Swap foreground and background for list highlights.
    fn inverted(self) -> Self {
        self.fg(self.bg.unwrap_or(Color::Black))
            .bg(self.fg.unwrap_or(Color::White))
    }
}
