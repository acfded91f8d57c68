use std::collections::VecDeque;
use std::sync::Arc;

use modal_form::MountState;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};

const HISTORY_LEN: usize = 8;

/// Controller state shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormStatus {
    pub visible: bool,
    pub controlled: bool,
    pub mount: MountState,
    pub epoch: Option<u64>,
    pub submitting: bool,
    pub close_disabled: bool,
}

/// Bottom panel with the controller's state and the visibility change log.
pub struct StatusBar {
    resolver: Arc<KeyResolver>,
    status: FormStatus,
    /// Most recent `on_visible_change` values, newest last.
    history: VecDeque<bool>,
    notice: Option<String>,
}

impl StatusBar {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            resolver,
            status: FormStatus::default(),
            history: VecDeque::with_capacity(HISTORY_LEN),
            notice: None,
        }
    }

    pub const fn set_status(&mut self, status: FormStatus) {
        self.status = status;
    }

    pub fn record_visible_change(&mut self, visible: bool) {
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(visible);
    }

    pub fn history(&self) -> Vec<bool> {
        self.history.iter().copied().collect()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let [status_area, log_area] =
            Layout::horizontal([Constraint::Length(36), Constraint::Min(20)]).areas(inner_area);

        self.render_status(frame, status_area, theme);
        self.render_log(frame, log_area, theme);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let label_style = Style::default().fg(theme.subtext0());
        let value_style = Style::default().fg(theme.text());
        let flag = |on: bool| {
            if on {
                Span::styled("yes", Style::default().fg(theme.success()))
            } else {
                Span::styled("no", value_style)
            }
        };

        let mount = match self.status.mount {
            MountState::Unmounted => "unmounted".to_string(),
            MountState::MountedHidden | MountState::MountedVisible => self
                .status
                .epoch
                .map_or_else(|| "mounted".to_string(), |epoch| format!("mounted (epoch {epoch})")),
        };
        let mode = if self.status.controlled {
            "controlled"
        } else {
            "uncontrolled"
        };

        let lines = vec![
            status_line("visible", flag(self.status.visible), label_style),
            status_line("mode", Span::styled(mode, value_style), label_style),
            status_line("form", Span::styled(mount, value_style), label_style),
            status_line("submitting", flag(self.status.submitting), label_style),
            status_line(
                "close",
                if self.status.close_disabled {
                    Span::styled("disabled", Style::default().fg(theme.warning()))
                } else {
                    Span::styled("enabled", value_style)
                },
                label_style,
            ),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_log(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let history: Vec<Span> = self
            .history
            .iter()
            .map(|visible| {
                Span::styled(
                    format!("{visible} "),
                    Style::default().fg(if *visible {
                        theme.success()
                    } else {
                        theme.mauve()
                    }),
                )
            })
            .collect();

        let mut lines = vec![
            Line::from(Span::styled(
                "on_visible_change",
                Style::default()
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(history),
            Line::from(""),
        ];
        if let Some(notice) = &self.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(theme.subtext1()),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!(
                "{} open · {} quit",
                self.resolver.display_global(GlobalAction::Open),
                self.resolver.display_global(GlobalAction::Quit)
            ),
            Style::default().fg(theme.overlay0()),
        )));

        frame.render_widget(Paragraph::new(lines), area);
    }
}

fn status_line<'a>(label: &'a str, value: Span<'a>, label_style: Style) -> Line<'a> {
    const LABEL_W: usize = 11;
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_W$}"), label_style),
        Span::raw(" "),
        value,
    ])
}
