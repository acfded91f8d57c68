use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::form::error::{ModalFormError, Result};
use crate::form::footer::{Footer, Submitter};
use crate::form::instance::{FormHandle, FormInstanceManager, Values};
use crate::form::lifecycle::{InstanceAction, LifecyclePolicy, MountState};
use crate::form::options::ModalFormOptions;
use crate::form::submission::{SubmissionCoordinator, SubmitHandler, SubmitTicket};
use crate::form::visibility::{Transition, VisibilityController, VisibilitySource};

type VisibleChangeFn = dyn Fn(bool) + Send + Sync;
type CancelHookFn = dyn Fn() -> CancelOutcome + Send + Sync;

/// Returned by the cancel hook to say who performs the close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The hook took care of the gesture. The controller leaves visibility
    /// alone; the hook's owner closes the dialog if and when it wants to.
    Handled,
    /// The controller closes the dialog itself.
    Unhandled,
}

/// Snapshot of everything the modal chrome needs to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalView {
    pub title: String,
    pub visible: bool,
    pub mount: MountState,
    /// Field values of the live instance, `None` while unmounted.
    pub values: Option<Values>,
    /// `None` when the submitter is hidden.
    pub footer: Option<Footer>,
}

struct Inner {
    title: String,
    visibility: VisibilityController,
    submission: SubmissionCoordinator,
    lifecycle: LifecyclePolicy,
    instances: FormInstanceManager,
    initial_values: Values,
    submitter: Submitter,
    on_visible_change: Option<Arc<VisibleChangeFn>>,
    on_cancel: Option<Arc<CancelHookFn>>,
    handler: Option<Arc<dyn SubmitHandler>>,
}

impl Inner {
    /// Applies a visibility change and the lifecycle action it implies.
    ///
    /// Returns the value to notify, if any.
    fn transition(&mut self, next: bool, source: VisibilitySource) -> Option<bool> {
        let visible = self.visibility.apply(next, source)?;
        let action = if visible {
            self.lifecycle.on_show()
        } else {
            self.lifecycle.on_hide()
        };
        self.apply_instance_action(action);
        Some(visible)
    }

    fn apply_instance_action(&mut self, action: InstanceAction) {
        match action {
            InstanceAction::Keep => {}
            InstanceAction::Ensure => {
                self.instances.ensure_instance(&self.initial_values);
            }
            InstanceAction::Dispose => {
                self.instances.dispose();
            }
        }
    }

    fn footer(&self, now: Instant) -> Option<Footer> {
        Footer::build(
            &self.submitter,
            self.submission.is_in_flight(),
            self.submission.blocks_close(now),
        )
    }
}

/// Controller binding a form's lifecycle to its modal dialog.
///
/// Cloning is cheap and every clone drives the same dialog, so a clone can
/// be moved into a spawned [`ModalForm::submit`] task while the UI keeps
/// handling close gestures.
#[derive(Clone)]
pub struct ModalForm {
    inner: Arc<Mutex<Inner>>,
}

impl ModalForm {
    pub fn builder() -> ModalFormBuilder {
        ModalFormBuilder::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Single entry point for every visibility change.
    ///
    /// Close gestures (close icon, mask, cancel button, keyboard) are refused
    /// while a submission is inside its timeout window, and otherwise go to
    /// the cancel hook first. Everything else is applied directly.
    pub fn request_visibility_change(&self, next: bool, source: VisibilitySource) -> Transition {
        if next || !source.is_close_gesture() {
            return self.apply(next, source);
        }

        let hook = {
            let inner = self.lock();
            if !inner.visibility.visible() {
                debug!(?source, "Close gesture on a hidden dialog");
                return Transition::Unchanged;
            }
            if inner.submission.blocks_close(Instant::now()) {
                debug!(?source, "Close rejected inside the submit timeout window");
                return Transition::Rejected;
            }
            inner.on_cancel.clone()
        };

        if let Some(hook) = hook
            && hook() == CancelOutcome::Handled
        {
            debug!(?source, "Cancel hook handled the close gesture");
            return Transition::Deferred;
        }
        self.apply(false, source)
    }

    fn apply(&self, next: bool, source: VisibilitySource) -> Transition {
        let (changed, callback) = {
            let mut inner = self.lock();
            (
                inner.transition(next, source),
                inner.on_visible_change.clone(),
            )
        };

        let Some(visible) = changed else {
            debug!(?source, visible = next, "Visibility unchanged");
            return Transition::Unchanged;
        };

        info!(?source, visible, "Visibility changed");
        if let Some(callback) = callback {
            callback(visible);
        }
        Transition::from(visible)
    }

    /// Opens the dialog as the trigger element would.
    pub fn open(&self) -> Transition {
        self.request_visibility_change(true, VisibilitySource::Trigger)
    }

    /// Closes the dialog on the owner's behalf, skipping the cancel hook.
    pub fn close(&self) -> Transition {
        self.request_visibility_change(false, VisibilitySource::Programmatic)
    }

    /// Supplies the owner's `visible` value. The dialog is controlled from
    /// the first call on.
    pub fn set_visible(&self, visible: bool) -> Transition {
        self.request_visibility_change(visible, VisibilitySource::ExternalProp)
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visibility.visible()
    }

    pub fn is_controlled(&self) -> bool {
        self.lock().visibility.is_controlled()
    }

    pub fn mount_state(&self) -> MountState {
        self.lock().lifecycle.state()
    }

    /// Handle to the live form instance, `None` while unmounted.
    pub fn handle(&self) -> Option<FormHandle> {
        self.lock().instances.handle()
    }

    pub fn field(&self, handle: FormHandle, name: &str) -> Result<Option<Value>> {
        let inner = self.lock();
        Ok(inner.instances.instance(handle)?.get(name).cloned())
    }

    pub fn set_field(
        &self,
        handle: FormHandle,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.lock()
            .instances
            .set_field(handle, name, value.into())
    }

    pub fn values(&self, handle: FormHandle) -> Result<Values> {
        let inner = self.lock();
        Ok(inner.instances.instance(handle)?.values().clone())
    }

    pub fn is_dirty(&self, handle: FormHandle) -> Result<bool> {
        let inner = self.lock();
        Ok(inner.instances.instance(handle)?.is_dirty())
    }

    /// Re-seeds the live instance from the current initial values.
    pub fn reset_fields(&self) -> Result<()> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        inner.instances.reset_to(&inner.initial_values)
    }

    /// Replaces the values the next mount epoch is seeded with.
    pub fn set_initial_values(&self, values: Values) {
        self.lock().initial_values = values;
    }

    pub fn initial_values(&self) -> Values {
        self.lock().initial_values.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submission.is_in_flight()
    }

    /// Whether the close affordances are currently disabled.
    pub fn close_disabled(&self) -> bool {
        self.lock().submission.blocks_close(Instant::now())
    }

    pub fn footer(&self) -> Option<Footer> {
        self.lock().footer(Instant::now())
    }

    pub fn view(&self) -> ModalView {
        let inner = self.lock();
        let values = inner
            .instances
            .handle()
            .and_then(|handle| inner.instances.instance(handle).ok())
            .map(|instance| instance.values().clone());

        ModalView {
            title: inner.title.clone(),
            visible: inner.visibility.visible(),
            mount: inner.lifecycle.state(),
            values,
            footer: inner.footer(Instant::now()),
        }
    }

    /// Submits the live form's values to the handler.
    ///
    /// Resolves to the handler's answer. On `true` the dialog is closed,
    /// unless it was closed or reopened while the handler ran. Handler
    /// failures are returned as [`ModalFormError::Handler`] and leave the
    /// dialog open.
    pub async fn submit(&self) -> Result<bool> {
        let (ticket, session, values, handler) = {
            let mut guard = self.lock();
            let inner = &mut *guard;
            let handle = inner.instances.handle().ok_or(ModalFormError::NotMounted)?;
            let values = inner.instances.instance(handle)?.values().clone();
            let ticket = inner.submission.begin(Instant::now())?;
            (
                ticket,
                inner.visibility.session(),
                values,
                inner.handler.clone(),
            )
        };
        let in_flight = InFlightGuard {
            form: self,
            generation: ticket.generation,
        };
        debug!(
            generation = ticket.generation,
            deadline = ?ticket.deadline,
            "Submitting form"
        );

        let outcome = match handler {
            Some(handler) => self.run_handler(handler.as_ref(), values, ticket).await,
            None => Ok(false),
        };
        drop(in_flight);

        match outcome {
            Ok(true) => {
                self.close_after_submit(session);
                Ok(true)
            }
            Ok(false) => {
                debug!(generation = ticket.generation, "Submission kept the dialog open");
                Ok(false)
            }
            Err(report) => {
                warn!(generation = ticket.generation, error = %report, "Submit handler failed");
                Err(ModalFormError::Handler(report))
            }
        }
    }

    /// Awaits the handler while the timeout window runs alongside it.
    async fn run_handler(
        &self,
        handler: &dyn SubmitHandler,
        values: Values,
        ticket: SubmitTicket,
    ) -> color_eyre::Result<bool> {
        let mut pending = handler.on_finish(values);
        let Some(deadline) = ticket.deadline else {
            return pending.await;
        };

        tokio::select! {
            result = &mut pending => result,
            () = tokio::time::sleep_until(deadline) => {
                self.release_window(ticket.generation);
                pending.await
            }
        }
    }

    fn release_window(&self, generation: u64) {
        if self.lock().submission.release_window(generation) {
            info!(generation, "Submit timeout elapsed, close re-enabled");
        }
    }

    fn close_after_submit(&self, session: u64) -> Transition {
        if self.lock().visibility.session() != session {
            debug!("Dialog was reopened during submission, keeping it open");
            return Transition::Unchanged;
        }
        self.apply(false, VisibilitySource::SubmitSuccess)
    }

    /// Disposes the form instance regardless of configuration.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        let action = inner.lifecycle.on_teardown();
        inner.apply_instance_action(action);
        info!("Modal form torn down");
    }
}

/// Ends a submission when `submit` returns, is dropped, or its handler panics.
struct InFlightGuard<'a> {
    form: &'a ModalForm,
    generation: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.form.lock().submission.finish(self.generation);
    }
}

impl fmt::Debug for ModalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ModalForm")
            .field("title", &inner.title)
            .field("visibility", &inner.visibility.state())
            .field("mount", &inner.lifecycle.state())
            .field("submission", &inner.submission.state())
            .finish_non_exhaustive()
    }
}

/// Configures a [`ModalForm`].
#[derive(Default)]
pub struct ModalFormBuilder {
    title: Option<String>,
    visible: Option<bool>,
    destroy_on_close: bool,
    force_render: bool,
    submit_timeout: Option<Duration>,
    initial_values: Values,
    submitter: Submitter,
    on_visible_change: Option<Arc<VisibleChangeFn>>,
    on_cancel: Option<Arc<CancelHookFn>>,
    handler: Option<Arc<dyn SubmitHandler>>,
}

impl ModalFormBuilder {
    /// Takes every data option at once.
    #[must_use]
    pub fn options(mut self, options: &ModalFormOptions) -> Self {
        self.title = Some(options.title.clone());
        self.visible = options.visible;
        self.destroy_on_close = options.destroy_on_close;
        self.force_render = options.force_render;
        self.submit_timeout = options.submit_timeout();
        self.initial_values = options.initial_values.clone();
        self.submitter = Submitter::from(&options.submitter);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Puts the dialog in controlled mode with the given initial value.
    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    #[must_use]
    pub const fn destroy_on_close(mut self, destroy_on_close: bool) -> Self {
        self.destroy_on_close = destroy_on_close;
        self
    }

    #[must_use]
    pub const fn force_render(mut self, force_render: bool) -> Self {
        self.force_render = force_render;
        self
    }

    #[must_use]
    pub const fn submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn initial_values(mut self, values: Values) -> Self {
        self.initial_values = values;
        self
    }

    #[must_use]
    pub fn submitter(mut self, submitter: impl Into<Submitter>) -> Self {
        self.submitter = submitter.into();
        self
    }

    #[must_use]
    pub fn on_visible_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_visible_change = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_cancel<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> CancelOutcome + Send + Sync + 'static,
    {
        self.on_cancel = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_finish<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Values) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = color_eyre::Result<bool>> + Send + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    #[must_use]
    pub fn submit_handler(mut self, handler: Arc<dyn SubmitHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> ModalForm {
        let mut inner = Inner {
            title: self.title.unwrap_or_else(|| ModalFormOptions::default().title),
            visibility: VisibilityController::new(self.visible),
            submission: SubmissionCoordinator::new(self.submit_timeout),
            lifecycle: LifecyclePolicy::new(self.force_render, self.destroy_on_close),
            instances: FormInstanceManager::new(),
            initial_values: self.initial_values,
            submitter: self.submitter,
            on_visible_change: self.on_visible_change,
            on_cancel: self.on_cancel,
            handler: self.handler,
        };

        let action = inner.lifecycle.on_construct();
        inner.apply_instance_action(action);
        let initial = self
            .visible
            .and_then(|visible| inner.transition(visible, VisibilitySource::ExternalProp));
        let callback = inner.on_visible_change.clone();

        let form = ModalForm {
            inner: Arc::new(Mutex::new(inner)),
        };
        if let Some(visible) = initial {
            info!(visible, "Modal form mounted visible");
            if let Some(callback) = callback {
                callback(visible);
            }
        }
        form
    }
}
