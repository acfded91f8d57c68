use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// The text was edited. Carries the full new value.
    Changed(String),
}

/// Single-line field editor.
///
/// Keys it has no use for (Enter, Esc, Tab, arrows up/down, most control
/// chords) are ignored so the surrounding dialog can bind them.
pub struct TextInput {
    value: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
    placeholder: Option<String>,
    focused: bool,
}

impl TextInput {
    pub const fn new() -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            placeholder: None,
            focused: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the text and moves the cursor to its end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.len();
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(index, _)| index)
    }

    fn insert_char(&mut self, c: char) {
        let index = self.byte_index(self.cursor);
        self.value.insert(index, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let index = self.byte_index(self.cursor);
        self.value.remove(index);
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        let chars: Vec<char> = self.value.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        if start == self.cursor {
            return false;
        }

        let range = self.byte_index(start)..self.byte_index(self.cursor);
        self.value.drain(range);
        self.cursor = start;
        true
    }

    fn clear_line(&mut self) -> bool {
        if self.value.is_empty() {
            return false;
        }
        self.value.clear();
        self.cursor = 0;
        true
    }

    fn edited(&self, changed: bool) -> EventResult<TextInputEvent> {
        if changed {
            TextInputEvent::Changed(self.value.clone()).into()
        } else {
            EventResult::Consumed
        }
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            // Delete
            (KeyCode::Backspace, KeyModifiers::ALT) => {
                let changed = self.delete_word_before_cursor();
                self.edited(changed)
            }
            (KeyCode::Backspace, _) => {
                let changed = self.delete_char_before_cursor();
                self.edited(changed)
            }
            (KeyCode::Delete, _) => {
                let changed = self.delete_char_at_cursor();
                self.edited(changed)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let changed = self.clear_line();
                self.edited(changed)
            }

            // Navigation
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }

            // Character input
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.edited(true)
            }

            _ => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let input_style = Style::default().fg(theme.text());
        let placeholder_style = Style::default().fg(theme.overlay0());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let line = if !self.focused {
            match (&self.placeholder, self.value.is_empty()) {
                (Some(placeholder), true) => {
                    Line::from(Span::styled(placeholder.clone(), placeholder_style))
                }
                _ => Line::from(Span::styled(self.value.clone(), input_style)),
            }
        } else if self.value.is_empty() {
            let mut spans = vec![Span::styled(" ", cursor_style)];
            if let Some(placeholder) = &self.placeholder {
                spans.push(Span::styled(placeholder.clone(), placeholder_style));
            }
            Line::from(spans)
        } else {
            let before: String = self.value.chars().take(self.cursor).collect();
            let at = self.value.chars().nth(self.cursor).unwrap_or(' ');
            let after: String = self.value.chars().skip(self.cursor + 1).collect();
            Line::from(vec![
                Span::styled(before, input_style),
                Span::styled(at.to_string(), cursor_style),
                Span::styled(after, input_style),
            ])
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}
