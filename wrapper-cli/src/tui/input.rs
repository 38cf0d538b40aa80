use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize as _},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar as _;

use super::event::Action;

const PLACEHOLDER: &str = "Enter your text here...";

/// Multi-line text entry with a character cursor.
#[derive(Default, Debug, Clone)]
pub struct TextInputViewModel {
    input: String,
    /// Measured in chars, not bytes.
    cursor_position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    Changed,
    Submit,
    Deactivate,
}

impl TextInputViewModel {
    pub fn text(&self) -> &str {
        &self.input
    }

    pub fn handle_action(&mut self, action: Action) -> Option<TextInputEvent> {
        match action {
            Action::Right => self.move_cursor_right(),
            Action::Left => self.move_cursor_left(),
            Action::Beginning => self.move_cursor_to(0),
            Action::End => self.move_cursor_to(self.char_count()),
            Action::RightWord => {
                self.move_cursor_to(next_word(&self.input, self.cursor_position))
            }
            Action::LeftWord => {
                self.move_cursor_to(previous_word(&self.input, self.cursor_position))
            }
            Action::Enter => {
                self.enter_char('\n');
                return Some(TextInputEvent::Changed);
            }
            Action::Unhandled(to_insert) => {
                self.enter_char(to_insert);
                return Some(TextInputEvent::Changed);
            }
            Action::Backspace => {
                if self.delete_char() {
                    return Some(TextInputEvent::Changed);
                }
            }
            Action::Submit => return Some(TextInputEvent::Submit),
            Action::Escape | Action::Quit => return Some(TextInputEvent::Deactivate),
            _ => {}
        }
        None
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    fn move_cursor_left(&mut self) {
        self.move_cursor_to(self.cursor_position.saturating_sub(1));
    }

    fn move_cursor_right(&mut self) {
        self.move_cursor_to(self.cursor_position.saturating_add(1));
    }

    fn move_cursor_to(&mut self, new_position: usize) {
        self.cursor_position = new_position.min(self.char_count());
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.input.len())
    }

    fn enter_char(&mut self, new_char: char) {
        let index = self.byte_index();
        self.input.insert(index, new_char);
        self.move_cursor_right();
    }

    /// Returns false when there was nothing left of the cursor.
    fn delete_char(&mut self) -> bool {
        if self.cursor_position == 0 {
            return false;
        }

        self.move_cursor_left();
        let index = self.byte_index();
        self.input.remove(index);
        true
    }
}

fn next_word(input: &str, cursor_position: usize) -> usize {
    let chars: Vec<char> = input.chars().collect();
    let mut position = cursor_position.min(chars.len());
    while position < chars.len() && !chars[position].is_whitespace() {
        position += 1;
    }
    while position < chars.len() && chars[position].is_whitespace() {
        position += 1;
    }
    position
}

fn previous_word(input: &str, cursor_position: usize) -> usize {
    let chars: Vec<char> = input.chars().collect();
    let mut position = cursor_position.min(chars.len());
    while position > 0 && chars[position - 1].is_whitespace() {
        position -= 1;
    }
    while position > 0 && !chars[position - 1].is_whitespace() {
        position -= 1;
    }
    position
}

#[derive(Debug, PartialEq, Clone)]
struct CursorLine {
    left: String,
    cursor_char: char,
    right: String,
}

/// Split a line around the char under the cursor so it can be highlighted.
/// A cursor past the end sits on a blank.
fn single_out(line: &str, cursor_position: usize) -> CursorLine {
    CursorLine {
        left: line.chars().take(cursor_position).collect(),
        cursor_char: line.chars().nth(cursor_position).unwrap_or(' '),
        right: line.chars().skip(cursor_position + 1).collect(),
    }
}

/// One row on screen.
/// `cursor` is the column of the cursor if it sits on this row.
#[derive(Debug, PartialEq, Clone)]
struct EditLine {
    text: String,
    cursor: Option<usize>,
}

/// Break the input into rows at most `width` columns wide,
/// honoring newlines, and find the row holding the cursor.
fn edit_lines(input: &str, cursor_position: usize, width: usize) -> (Vec<EditLine>, usize) {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut consumed = 0;
    let mut cursor_row = 0;

    for logical in input.split('\n') {
        let chars: Vec<char> = logical.chars().collect();
        let chunks = rows_by_width(&chars, width);
        let last_chunk = chunks.len() - 1;

        for (index, chunk) in chunks.into_iter().enumerate() {
            let start = consumed;
            let end = consumed + chunk.len();
            let on_row = cursor_position >= start
                && (cursor_position < end || (index == last_chunk && cursor_position == end));
            let cursor = on_row.then(|| cursor_position - start);
            if on_row {
                cursor_row = lines.len();
            }
            lines.push(EditLine {
                text: chunk.iter().collect(),
                cursor,
            });
            consumed = end;
        }
        // the newline itself
        consumed += 1;
    }

    (lines, cursor_row)
}

/// Split one logical line into rows that fit `width` terminal columns.
/// An empty line is still one row.
fn rows_by_width(chars: &[char], width: usize) -> Vec<&[char]> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut row_width = 0;

    for (index, c) in chars.iter().enumerate() {
        let char_width = c.width().unwrap_or(0);
        if row_width + char_width > width && index > start {
            rows.push(&chars[start..index]);
            start = index;
            row_width = 0;
        }
        row_width += char_width;
    }
    rows.push(&chars[start..]);

    rows
}

fn render_lines(lines: Vec<EditLine>, show_cursor: bool) -> Vec<Line<'static>> {
    let cursor_style = Style::default().bg(Color::White).fg(Color::Black);

    lines
        .into_iter()
        .map(|line| match line.cursor {
            Some(cursor_position) if show_cursor => {
                let cursor_line = single_out(&line.text, cursor_position);
                Line::from(vec![
                    Span::from(cursor_line.left),
                    Span::from(cursor_line.cursor_char.to_string()).style(cursor_style),
                    Span::from(cursor_line.right),
                ])
            }
            _ => Line::from(line.text),
        })
        .collect()
}

#[extend::ext(name = InputView)]
pub impl<'a> Frame<'a> {
    fn input_view(
        &mut self,
        parent: Rect,
        style: Style,
        view_model: &TextInputViewModel,
        editing: bool,
    ) {
        let block = Block::bordered().title("Input Text");
        let inner = block.inner(parent);

        if view_model.input.is_empty() && !editing {
            let placeholder = Paragraph::new(PLACEHOLDER.dark_gray()).style(style).block(block);
            self.render_widget(placeholder, parent);
            return;
        }

        let (lines, cursor_row) = edit_lines(
            &view_model.input,
            view_model.cursor_position,
            inner.width.into(),
        );
        let scroll = (cursor_row + 1).saturating_sub(inner.height.into());
        let scroll: u16 = scroll
            .try_into()
            .inspect_err(|err| tracing::warn!(%err, "unable to convert input scroll to u16"))
            .unwrap_or(0);

        let input = Paragraph::new(render_lines(lines, editing))
            .scroll((scroll, 0))
            .style(style)
            .block(block);

        self.render_widget(input, parent);
    }
}
