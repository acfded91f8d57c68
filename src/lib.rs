//! Headless controller for a form hosted inside a modal dialog.
//!
//! The [`ModalForm`] ties a form's lifecycle to the dialog that shows it:
//! - when the form instance exists, is reset or is thrown away
//! - when the dialog may be closed while a submission is running
//! - which collaborators get told about visibility changes
//!
//! Rendering is left to the host. It reads a [`ModalView`] snapshot and
//! reports user gestures back through [`ModalForm::request_visibility_change`].

pub mod form;

pub use form::{
    CancelOutcome, Footer, FooterButton, FormHandle, ModalForm, ModalFormBuilder,
    ModalFormError, ModalFormOptions, ModalView, MountState, Result, SubmitHandler, Submitter,
    SubmitterConfig, Transition, Values, VisibilitySource,
};
