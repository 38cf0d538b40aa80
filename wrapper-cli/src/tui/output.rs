use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};
use wrapper_core::state::Region;

use super::{event::Action, widgets_ext::RectExt as _};

#[derive(Clone, Debug, Default)]
pub struct OutputViewModel {
    scroll: u16,
    /// Highest useful scroll offset as of the last draw.
    max_scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Deactivate,
}

impl OutputViewModel {
    pub fn reset(&mut self) {
        self.scroll = 0;
    }

    pub fn handle_action(&mut self, action: Action) -> Option<OutputEvent> {
        match action {
            Action::Up => self.scroll = self.scroll.saturating_sub(1),
            Action::Down => self.scroll = self.scroll.saturating_add(1).min(self.max_scroll),
            Action::Beginning => self.scroll = 0,
            Action::End => self.scroll = self.max_scroll,
            Action::Enter | Action::Escape | Action::Quit => return Some(OutputEvent::Deactivate),
            _ => {}
        }
        None
    }
}

#[extend::ext(name = OutputView)]
pub impl<'a> Frame<'a> {
    /// Nothing is drawn while idle or loading.
    fn output_view(
        &mut self,
        parent: Rect,
        style: Style,
        view_model: &mut OutputViewModel,
        region: Region<'_>,
    ) {
        let (title, text, text_style) = match region {
            Region::Nothing | Region::LoadingIndicator => return,
            Region::Response(response) => ("Response", response, style),
            Region::Error(message) => ("Error", message, style.fg(Color::Red)),
        };

        let wrapped_lines = parent.wrap_inside(text).len();
        let visible_lines = usize::from(parent.height.saturating_sub(2));
        view_model.max_scroll = wrapped_lines
            .saturating_sub(visible_lines)
            .try_into()
            .unwrap_or(u16::MAX);
        view_model.scroll = view_model.scroll.min(view_model.max_scroll);

        let output = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((view_model.scroll, 0))
            .style(text_style)
            .block(Block::bordered().title(title).border_style(style));

        self.render_widget(output, parent);
    }
}
