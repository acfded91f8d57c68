use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

/// Busy indicator drawn next to the submit button while a submission runs.
pub struct Spinner {
    throbber_state: ThrobberState,
    label: Option<String>,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            throbber_state: ThrobberState::default(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Columns needed to draw the spinner and its label.
    pub fn width(&self) -> u16 {
        // 1 for the glyph, 1 for the space before the label
        let label = self.label.as_deref().map_or(0, |label| label.chars().count() + 1);
        u16::try_from(label + 1).unwrap_or(u16::MAX)
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.throbber_state.calc_next();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.lavender()))
            .style(Style::default().fg(theme.subtext1()));

        if let Some(label) = self.label.as_deref() {
            throbber = throbber.label(label);
        }

        let area = Rect {
            width: area.width.min(self.width()),
            height: area.height.min(1),
            ..area
        };
        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }
}
