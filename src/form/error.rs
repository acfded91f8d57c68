use thiserror::Error;

/// Errors surfaced by [`crate::ModalForm`] operations.
///
/// A close request that is refused while a submission is running is not an
/// error; it is reported as [`crate::Transition::Rejected`].
#[derive(Debug, Error)]
pub enum ModalFormError {
    /// A handle from a disposed mount epoch was used to reach field state.
    #[error("form instance from epoch {handle} was used after disposal (live epoch: {live:?})")]
    StaleInstance { handle: u64, live: Option<u64> },
    #[error("no form instance is mounted")]
    NotMounted,
    #[error("a submission is already in flight")]
    SubmitInFlight,
    /// The submit handler failed. The dialog stays open.
    #[error("submit handler failed: {0}")]
    Handler(color_eyre::Report),
}

pub type Result<T> = std::result::Result<T, ModalFormError>;
