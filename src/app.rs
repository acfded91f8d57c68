use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::eyre::eyre;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use modal_form::{
    CancelOutcome, ModalForm, ModalFormError, SubmitHandler, Transition, Values,
    VisibilitySource,
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::Theme;
use crate::config::{AppConfig, DemoConfig, GlobalAction, KeyResolver};
use crate::tui::{Event, Tui};
use crate::ui::{Component, EventResult, FormModal, FormModalEvent, FormStatus, StatusBar};

const STATUS_BAR_HEIGHT: u16 = 9;

#[derive(Debug)]
pub enum AppMessage {
    VisibilityChanged(bool),
    SubmitFinished(modal_form::Result<bool>),
    Notice(String),
}

/// Submit handler standing in for a real backend.
pub struct DemoSubmitHandler {
    delay: Duration,
    close_on_success: bool,
    fail: bool,
}

impl From<&DemoConfig> for DemoSubmitHandler {
    fn from(config: &DemoConfig) -> Self {
        Self {
            delay: config.submit_delay(),
            close_on_success: config.close_on_success,
            fail: config.fail,
        }
    }
}

#[async_trait]
impl SubmitHandler for DemoSubmitHandler {
    async fn on_finish(&self, values: Values) -> color_eyre::Result<bool> {
        info!(fields = values.len(), delay = ?self.delay, "Demo backend received submission");
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(eyre!("Backend rejected the submission"));
        }
        Ok(self.close_on_success)
    }
}

pub struct App {
    form: ModalForm,
    modal: FormModal,
    status_bar: StatusBar,
    resolver: Arc<KeyResolver>,
    theme: Theme,
    should_quit: bool,
    should_suspend: bool,
    message_tx: UnboundedSender<AppMessage>,
    message_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(config: &AppConfig, resolver: Arc<KeyResolver>, theme: Theme) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let visibility_tx = message_tx.clone();
        let cancel_tx = message_tx.clone();
        let form = ModalForm::builder()
            .options(&config.form)
            .on_visible_change(move |visible| {
                let _ = visibility_tx.send(AppMessage::VisibilityChanged(visible));
            })
            .on_cancel(move || {
                let _ = cancel_tx.send(AppMessage::Notice("Cancelled".to_string()));
                CancelOutcome::Unhandled
            })
            .submit_handler(Arc::new(DemoSubmitHandler::from(&config.demo)))
            .build();

        let mut app = Self {
            modal: FormModal::new(Arc::clone(&resolver), &config.form.initial_values),
            status_bar: StatusBar::new(Arc::clone(&resolver)),
            form,
            resolver,
            theme,
            should_quit: false,
            should_suspend: false,
            message_tx,
            message_rx,
        };
        app.refresh();
        app
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(30.0, 8.0)?;
        tui.enter()?;

        loop {
            if let Some(event) = tui.next_event().await {
                self.handle_event(&mut tui, event)?;
            }
            self.handle_messages();

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.enter()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        self.form.teardown();
        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> color_eyre::Result<()> {
        match event {
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Tick => {
                self.refresh();
                self.modal.handle_tick();
            }
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
                }
            }
            Event::Error(error) => warn!(%error, "Terminal event error"),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.form.is_visible() {
            match self.modal.handle_key(key) {
                Ok(EventResult::Event(event)) => self.handle_form_event(event),
                Ok(result) if result.is_consumed() => {}
                Ok(_) => self.handle_global_key(key),
                Err(err) => self.modal.set_error(Some(err.to_string())),
            }
            self.refresh();
            return;
        }

        self.handle_global_key(key);
        self.refresh();
    }

    fn handle_global_key(&mut self, key: KeyEvent) {
        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if self.resolver.matches_global(&key, GlobalAction::Open)
            && !self.form.is_visible()
        {
            self.form.open();
        }
    }

    fn handle_form_event(&mut self, event: FormModalEvent) {
        match event {
            FormModalEvent::Submit => self.spawn_submit(),
            FormModalEvent::Close(source) => self.request_close(source),
            FormModalEvent::Reset => match self.form.reset_fields() {
                Ok(()) => {
                    self.modal.load(&self.form.initial_values());
                    self.modal.set_error(None);
                }
                Err(err) => self.modal.set_error(Some(err.to_string())),
            },
            FormModalEvent::FieldChanged { name, value } => {
                let Some(handle) = self.form.handle() else {
                    return;
                };
                if let Err(err) = self.form.set_field(handle, &name, value) {
                    self.modal.set_error(Some(err.to_string()));
                }
            }
        }
    }

    fn request_close(&mut self, source: VisibilitySource) {
        match self.form.request_visibility_change(false, source) {
            Transition::Rejected => self
                .status_bar
                .set_notice("Close is disabled while the submission is running"),
            Transition::Hidden => self.modal.set_error(None),
            transition => debug!(?source, ?transition, "Close request settled"),
        }
    }

    fn spawn_submit(&mut self) {
        if self.form.is_submitting() {
            self.status_bar.set_notice("Already submitting");
            return;
        }

        self.modal.set_error(None);
        let form = self.form.clone();
        let message_tx = self.message_tx.clone();
        tokio::spawn(async move {
            let result = form.submit().await;
            let _ = message_tx.send(AppMessage::SubmitFinished(result));
        });
    }

    fn handle_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                AppMessage::VisibilityChanged(visible) => {
                    self.status_bar.record_visible_change(visible);
                }
                AppMessage::SubmitFinished(Ok(true)) => self.status_bar.set_notice("Submitted"),
                AppMessage::SubmitFinished(Ok(false)) => {
                    self.status_bar.set_notice("Submitted, dialog kept open");
                }
                AppMessage::SubmitFinished(Err(ModalFormError::SubmitInFlight)) => {
                    self.status_bar.set_notice("Already submitting");
                }
                AppMessage::SubmitFinished(Err(ModalFormError::Handler(report))) => {
                    self.modal.set_error(Some(report.to_string()));
                }
                AppMessage::SubmitFinished(Err(err)) => self.modal.set_error(Some(err.to_string())),
                AppMessage::Notice(notice) => self.status_bar.set_notice(notice),
            }
            self.refresh();
        }
    }

    /// Pulls the controller's current state into the UI.
    fn refresh(&mut self) {
        let handle = self.form.handle();
        self.modal.sync(self.form.view(), handle);
        self.status_bar.set_status(FormStatus {
            visible: self.form.is_visible(),
            controlled: self.form.is_controlled(),
            mount: self.form.mount_state(),
            epoch: handle.map(|handle| handle.epoch()),
            submitting: self.form.is_submitting(),
            close_disabled: self.form.close_disabled(),
        });
    }

    fn render(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let theme = self.theme;
        let open_keys = self.resolver.display_global(GlobalAction::Open);
        let modal = &mut self.modal;
        let status_bar = &self.status_bar;

        tui.draw(|frame| {
            let [main_area, status_area] = Layout::vertical([
                Constraint::Min(0),
                Constraint::Length(STATUS_BAR_HEIGHT),
            ])
            .areas(frame.area());

            let intro = Paragraph::new(vec![
                Line::from(Span::styled(
                    "modal-form",
                    Style::default()
                        .fg(theme.mauve())
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("Press {open_keys} to open the form"),
                    Style::default().fg(theme.subtext1()),
                )),
            ])
            .style(Style::default().bg(theme.mantle()));
            frame.render_widget(intro, main_area);

            status_bar.render(frame, status_area, &theme);
            modal.render(frame, main_area, &theme);
        })?;
        Ok(())
    }
}
