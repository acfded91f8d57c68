//! Modal form state machine.
//!
//! This module contains the pieces the [`ModalForm`] coordinates:
//! - [`instance`] - Form instance creation, reset and disposal
//! - [`visibility`] - Controlled/uncontrolled visibility reconciliation
//! - [`submission`] - In-flight tracking and the submit timeout window
//! - [`lifecycle`] - Mount/dispose decisions per visibility transition
//! - [`footer`] - Submitter configuration and footer button state

mod controller;
mod error;
pub mod footer;
pub mod instance;
pub mod lifecycle;
mod options;
pub mod submission;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use controller::{CancelOutcome, ModalForm, ModalFormBuilder, ModalView};
pub use error::{ModalFormError, Result};
pub use footer::{Footer, FooterButton, Submitter, SubmitterConfig};
pub use instance::{FormHandle, Values};
pub use lifecycle::MountState;
pub use options::ModalFormOptions;
pub use submission::SubmitHandler;
pub use visibility::{Transition, VisibilitySource};
