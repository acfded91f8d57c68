use std::sync::Arc;

use crossterm::event::KeyEvent;
use modal_form::{FooterButton, FormHandle, ModalView, Values, VisibilitySource};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use serde_json::Value;

use crate::Theme;
use crate::config::{FormAction, KeyResolver};
use crate::ui::{Component, EventResult, Result, Spinner, TextInput, TextInputEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum FormModalEvent {
    Submit,
    /// A close gesture, tagged with the affordance it came from.
    Close(VisibilitySource),
    Reset,
    FieldChanged { name: String, value: Value },
}

struct Field {
    name: String,
    input: TextInput,
    /// Shape of the seeded value, used to convert edits back.
    seed: Value,
}

/// Modal chrome around the form's fields.
///
/// Draws whatever [`ModalView`] it was last synced with and turns key
/// presses into controller requests. It never changes visibility itself.
pub struct FormModal {
    resolver: Arc<KeyResolver>,
    fields: Vec<Field>,
    focus: usize,
    /// Handle the inputs were last loaded from.
    loaded: Option<FormHandle>,
    view: Option<ModalView>,
    spinner: Spinner,
    error: Option<String>,
}

impl FormModal {
    /// Creates the chrome for the fields named in `initial`, in key order.
    pub fn new(resolver: Arc<KeyResolver>, initial: &Values) -> Self {
        let mut names: Vec<String> = initial.keys().cloned().collect();
        if names.is_empty() {
            names.push("name".to_string());
        }

        let fields = names
            .into_iter()
            .map(|name| Field {
                input: TextInput::new().with_placeholder(format!("Enter {name}")),
                name,
                seed: Value::Null,
            })
            .collect();

        let mut modal = Self {
            resolver,
            fields,
            focus: 0,
            loaded: None,
            view: None,
            spinner: Spinner::new().with_label("Submitting"),
            error: None,
        };
        modal.update_focus();
        modal
    }

    /// Takes a fresh snapshot from the controller.
    ///
    /// Inputs are reloaded whenever the live instance changed since the
    /// last sync, so a re-seeded form never shows stale text.
    pub fn sync(&mut self, view: ModalView, handle: Option<FormHandle>) {
        if handle != self.loaded {
            if let Some(values) = &view.values {
                self.load(values);
            }
            self.loaded = handle;
        }
        self.view = Some(view);
    }

    /// Loads every input from `values`.
    pub fn load(&mut self, values: &Values) {
        for field in &mut self.fields {
            let value = values.get(&field.name).cloned().unwrap_or(Value::Null);
            field.input.set_value(display_value(&value));
            field.seed = value;
        }
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn footer_shown(&self) -> bool {
        self.view.as_ref().is_some_and(|view| view.footer.is_some())
    }

    fn move_focus(&mut self, forward: bool) {
        let count = self.fields.len();
        self.focus = if forward {
            (self.focus + 1) % count
        } else {
            (self.focus + count - 1) % count
        };
        self.update_focus();
    }

    fn update_focus(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.input.set_focused(index == self.focus);
        }
    }

    fn render_button(button: &FooterButton, primary: bool, theme: &Theme) -> Span<'static> {
        let style = if button.disabled {
            Style::default().fg(theme.disabled())
        } else if primary {
            Style::default()
                .fg(theme.base())
                .bg(theme.primary())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text()).bg(theme.surface0())
        };
        Span::styled(format!(" {} ", button.label), style)
    }

    fn render_footer(&mut self, frame: &mut Frame, area: Rect, view: &ModalView, theme: &Theme) {
        let Some(footer) = &view.footer else {
            return;
        };

        let buttons = Line::from(vec![
            Self::render_button(&footer.cancel, false, theme),
            Span::raw("  "),
            Self::render_button(&footer.submit, true, theme),
        ])
        .right_aligned();
        frame.render_widget(Paragraph::new(buttons), area);

        if footer.submit.loading {
            self.spinner.render(frame, area, theme);
        }
    }

    fn help_line(&self) -> String {
        let key = |action| self.resolver.display_form(action);
        format!(
            "{} submit · {} close · {} reset · {} next",
            key(FormAction::Submit),
            key(FormAction::Dismiss),
            key(FormAction::Reset),
            key(FormAction::NextField),
        )
    }
}

/// Text shown in an input for a field value.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Converts edited text back into a value shaped like the seed.
///
/// Strings stay strings. Other seeds are parsed as JSON and fall back to a
/// plain string when the text no longer parses.
fn field_value(text: &str, seed: &Value) -> Value {
    match seed {
        Value::Null | Value::String(_) => Value::String(text.to_string()),
        _ => serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())),
    }
}

impl Component for FormModal {
    type Output = FormModalEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if let Some(action) = self.resolver.form_action(&key) {
            return Ok(match action {
                FormAction::Submit => FormModalEvent::Submit.into(),
                FormAction::Cancel if self.footer_shown() => {
                    FormModalEvent::Close(VisibilitySource::CancelButton).into()
                }
                FormAction::Cancel => EventResult::Ignored,
                FormAction::Close => FormModalEvent::Close(VisibilitySource::CloseButton).into(),
                FormAction::Dismiss => FormModalEvent::Close(VisibilitySource::Keyboard).into(),
                FormAction::Reset => FormModalEvent::Reset.into(),
                FormAction::NextField => {
                    self.move_focus(true);
                    EventResult::Consumed
                }
                FormAction::PrevField => {
                    self.move_focus(false);
                    EventResult::Consumed
                }
            });
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return Ok(EventResult::Ignored);
        };
        Ok(match field.input.handle_key(key)? {
            EventResult::Event(TextInputEvent::Changed(text)) => FormModalEvent::FieldChanged {
                name: field.name.clone(),
                value: field_value(&text, &field.seed),
            }
            .into(),
            EventResult::Consumed => EventResult::Consumed,
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn handle_tick(&mut self) {
        if self
            .view
            .as_ref()
            .and_then(|view| view.footer.as_ref())
            .is_some_and(|footer| footer.submit.loading)
        {
            self.spinner.handle_tick();
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(view) = self.view.clone() else {
            return;
        };
        if !view.visible {
            return;
        }

        let label_width = self
            .fields
            .iter()
            .map(|field| field.name.chars().count())
            .max()
            .unwrap_or(0);
        let field_rows = u16::try_from(self.fields.len()).unwrap_or(u16::MAX);
        // Borders, fields, blank line, error, footer, help
        let height = field_rows.saturating_add(6);
        let popup_area = area.centered(Constraint::Percentage(60), Constraint::Length(height));

        frame.render_widget(Clear, popup_area);

        let close_style = if view.footer.as_ref().is_some_and(|f| f.cancel.disabled) {
            Style::default().fg(theme.disabled())
        } else {
            Style::default().fg(theme.subtext0())
        };
        let block = Block::default()
            .title(format!(" {} ", view.title))
            .title(Line::from(Span::styled(" ✕ ", close_style)).right_aligned())
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let [fields_area, _, error_area, footer_area, help_area] = Layout::vertical([
            Constraint::Length(field_rows),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let label_width = u16::try_from(label_width + 2).unwrap_or(u16::MAX);
        let rows = Layout::vertical(vec![Constraint::Length(1); self.fields.len()]).split(fields_area);
        for (field, row) in self.fields.iter_mut().zip(rows.iter()) {
            let [label_area, input_area] =
                Layout::horizontal([Constraint::Length(label_width), Constraint::Fill(1)])
                    .areas(*row);
            let label = Paragraph::new(format!("{}:", field.name))
                .style(Style::default().fg(theme.subtext1()));
            frame.render_widget(label, label_area);
            field.input.render(frame, input_area, theme);
        }

        if let Some(error) = &self.error {
            let line = Paragraph::new(error.as_str()).style(Style::default().fg(theme.error()));
            frame.render_widget(line, error_area);
        }

        self.render_footer(frame, footer_area, &view, theme);

        let help = Paragraph::new(self.help_line()).style(Style::default().fg(theme.overlay0()));
        frame.render_widget(help, help_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keybindings::KeybindingsConfig;
    use crossterm::event::{KeyCode, KeyModifiers};
    use modal_form::ModalForm;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;

    fn modal(initial: &Values) -> FormModal {
        let resolver = Arc::new(KeyResolver::new(Arc::new(KeybindingsConfig::default())));
        FormModal::new(resolver, initial)
    }

    fn press(modal: &mut FormModal, code: KeyCode, modifiers: KeyModifiers) -> EventResult<FormModalEvent> {
        modal.handle_key(KeyEvent::new(code, modifiers)).unwrap()
    }

    fn synced(form: &ModalForm) -> FormModal {
        let mut modal = modal(&form.initial_values());
        modal.sync(form.view(), form.handle());
        modal
    }

    fn screen(modal: &mut FormModal) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|frame| modal.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_close_gestures_carry_their_source() {
        let form = ModalForm::builder().visible(true).build();
        let mut modal = synced(&form);

        assert_eq!(
            press(&mut modal, KeyCode::Esc, KeyModifiers::NONE),
            EventResult::Event(FormModalEvent::Close(VisibilitySource::Keyboard))
        );
        assert_eq!(
            press(&mut modal, KeyCode::Char('w'), KeyModifiers::CONTROL),
            EventResult::Event(FormModalEvent::Close(VisibilitySource::CloseButton))
        );
        assert_eq!(
            press(&mut modal, KeyCode::Char('x'), KeyModifiers::CONTROL),
            EventResult::Event(FormModalEvent::Close(VisibilitySource::CancelButton))
        );
    }

    #[test]
    fn test_cancel_button_needs_a_footer() {
        let form = ModalForm::builder().visible(true).submitter(false).build();
        let mut modal = synced(&form);

        assert_eq!(
            press(&mut modal, KeyCode::Char('x'), KeyModifiers::CONTROL),
            EventResult::Ignored
        );
        assert_eq!(
            press(&mut modal, KeyCode::Enter, KeyModifiers::NONE),
            EventResult::Event(FormModalEvent::Submit)
        );
    }

    #[test]
    fn test_typing_edits_the_focused_field() {
        let initial = Values::from([
            ("name".to_string(), json!("1234")),
            ("replicas".to_string(), json!(3)),
        ]);
        let form = ModalForm::builder()
            .visible(true)
            .initial_values(initial)
            .build();
        let mut modal = synced(&form);

        assert_eq!(
            press(&mut modal, KeyCode::Char('5'), KeyModifiers::NONE),
            EventResult::Event(FormModalEvent::FieldChanged {
                name: "name".to_string(),
                value: json!("12345"),
            })
        );

        press(&mut modal, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(
            press(&mut modal, KeyCode::Char('0'), KeyModifiers::NONE),
            EventResult::Event(FormModalEvent::FieldChanged {
                name: "replicas".to_string(),
                value: json!(30),
            })
        );
    }

    #[test]
    fn test_sync_reloads_after_reseed() {
        let form = ModalForm::builder()
            .destroy_on_close(true)
            .initial_values(Values::from([("name".to_string(), json!("1234"))]))
            .build();
        form.open();
        let mut modal = synced(&form);

        form.set_field(form.handle().unwrap(), "name", "1111").unwrap();
        form.close();
        form.open();
        modal.sync(form.view(), form.handle());

        assert_eq!(modal.fields[0].input.value(), "1234");
    }

    #[test]
    fn test_field_value_keeps_shape() {
        assert_eq!(field_value("42", &json!("text")), json!("42"));
        assert_eq!(field_value("42", &json!(1)), json!(42));
        assert_eq!(field_value("true", &json!(false)), json!(true));
        assert_eq!(field_value("oops", &json!(1)), json!("oops"));
    }

    #[test]
    fn test_render_shows_footer_and_error() {
        let form = ModalForm::builder().visible(true).title("Rename").build();
        let mut modal = synced(&form);
        modal.set_error(Some("name is taken".to_string()));

        let screen = screen(&mut modal);
        assert!(screen.contains("Rename"));
        assert!(screen.contains("Confirm"));
        assert!(screen.contains("Cancel"));
        assert!(screen.contains("name is taken"));
    }

    #[test]
    fn test_hidden_dialog_draws_nothing() {
        let form = ModalForm::builder().title("Rename").build();
        let mut modal = synced(&form);

        assert!(!screen(&mut modal).contains("Rename"));
    }
}
