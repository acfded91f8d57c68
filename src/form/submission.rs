//! Submission bookkeeping and the submit handler seam.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::form::error::{ModalFormError, Result};
use crate::form::instance::Values;

/// Consumer-supplied submission handler.
///
/// Resolving to `Ok(true)` asks the controller to close the dialog. `Ok(false)`
/// keeps it open. An error keeps it open and is returned to the caller of
/// [`crate::ModalForm::submit`].
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn on_finish(&self, values: Values) -> color_eyre::Result<bool>;
}

#[async_trait]
impl<F, Fut> SubmitHandler for F
where
    F: Fn(Values) -> Fut + Send + Sync,
    Fut: Future<Output = color_eyre::Result<bool>> + Send + 'static,
{
    async fn on_finish(&self, values: Values) -> color_eyre::Result<bool> {
        self(values).await
    }
}

/// Stand-in deadline for timeouts too long to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmissionState {
    pub in_flight: bool,
    pub deadline: Option<Instant>,
    pub generation: u64,
}

/// Issued when a submission starts; identifies it when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    pub generation: u64,
    pub deadline: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct SubmissionCoordinator {
    timeout: Option<Duration>,
    state: SubmissionState,
}

impl SubmissionCoordinator {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            state: SubmissionState::default(),
        }
    }

    /// Marks a submission as in flight and opens the timeout window.
    pub fn begin(&mut self, now: Instant) -> Result<SubmitTicket> {
        if self.state.in_flight {
            return Err(ModalFormError::SubmitInFlight);
        }

        self.state.generation += 1;
        self.state.in_flight = true;
        self.state.deadline = self
            .timeout
            .map(|timeout| now.checked_add(timeout).unwrap_or(now + FAR_FUTURE));
        Ok(SubmitTicket {
            generation: self.state.generation,
            deadline: self.state.deadline,
        })
    }

    /// Closes the timeout window of the given submission while its handler is
    /// still pending. Returns true only the first time for a generation.
    pub fn release_window(&mut self, generation: u64) -> bool {
        if self.state.generation != generation || self.state.deadline.is_none() {
            return false;
        }
        self.state.deadline = None;
        true
    }

    /// Clears the in-flight flag once the handler has settled.
    pub fn finish(&mut self, generation: u64) {
        if self.state.generation == generation {
            self.state.in_flight = false;
            self.state.deadline = None;
        }
    }

    /// Whether close gestures are refused at `now`.
    pub fn blocks_close(&self, now: Instant) -> bool {
        self.state.in_flight && self.state.deadline.is_some_and(|deadline| now < deadline)
    }

    pub const fn is_in_flight(&self) -> bool {
        self.state.in_flight
    }

    pub const fn state(&self) -> SubmissionState {
        self.state
    }
}
