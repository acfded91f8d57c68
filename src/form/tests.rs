//! End-to-end scenarios for the modal form controller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use color_eyre::eyre::eyre;
use serde_json::json;
use tokio::time::sleep;

use crate::form::{
    CancelOutcome, ModalForm, ModalFormError, MountState, Submitter, SubmitterConfig, Transition,
    Values, VisibilitySource,
};

/// Collects `on_visible_change` notifications.
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<bool>>>);

impl Recorder {
    fn callback(&self) -> impl Fn(bool) + Send + Sync + 'static {
        let events = Arc::clone(&self.0);
        move |visible| events.lock().unwrap().push(visible)
    }

    fn events(&self) -> Vec<bool> {
        self.0.lock().unwrap().clone()
    }
}

/// Counts cancel hook invocations.
#[derive(Clone, Default)]
struct HookCounter(Arc<AtomicUsize>);

impl HookCounter {
    fn hook(&self, outcome: CancelOutcome) -> impl Fn() -> CancelOutcome + Send + Sync + 'static {
        let calls = Arc::clone(&self.0);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            outcome
        }
    }

    fn calls(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn name_values(name: &str) -> Values {
    Values::from([("name".to_string(), json!(name))])
}

fn name_of(form: &ModalForm) -> serde_json::Value {
    let handle = form.handle().expect("form should be mounted");
    form.field(handle, "name").unwrap().unwrap()
}

// === Visibility ===

#[test]
fn test_trigger_notifies_visible() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .on_visible_change(recorder.callback())
        .build();

    assert_eq!(form.open(), Transition::Shown);
    assert!(form.is_visible());
    assert_eq!(recorder.events(), vec![true]);
}

#[test]
fn test_repeated_requests_notify_once_per_value() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .on_visible_change(recorder.callback())
        .build();

    form.open();
    assert_eq!(form.open(), Transition::Unchanged);
    assert_eq!(form.open(), Transition::Unchanged);
    form.request_visibility_change(false, VisibilitySource::CloseButton);
    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::MaskClick),
        Transition::Unchanged
    );

    assert_eq!(recorder.events(), vec![true, false]);
}

/// Values a request sequence should notify, starting hidden.
fn expected_notifications(requests: &[bool]) -> Vec<bool> {
    let mut visible = false;
    let mut expected = Vec::new();
    for &next in requests {
        if next != visible {
            expected.push(next);
            visible = next;
        }
    }
    expected
}

#[test]
fn test_every_request_sequence_notifies_only_changes() {
    for len in 0..=6 {
        for bits in 0u32..(1 << len) {
            let requests: Vec<bool> = (0..len).map(|i| bits & (1 << i) != 0).collect();
            let expected = expected_notifications(&requests);

            let recorder = Recorder::default();
            let form = ModalForm::builder()
                .on_visible_change(recorder.callback())
                .build();
            for &next in &requests {
                if next {
                    form.open();
                } else {
                    form.request_visibility_change(false, VisibilitySource::CloseButton);
                }
            }
            assert_eq!(recorder.events(), expected, "uncontrolled {requests:?}");

            let recorder = Recorder::default();
            let form = ModalForm::builder()
                .visible(false)
                .on_visible_change(recorder.callback())
                .build();
            for &next in &requests {
                form.set_visible(next);
            }
            assert_eq!(recorder.events(), expected, "controlled {requests:?}");
        }
    }
}

#[test]
fn test_initially_visible_notifies_on_construction() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .build();

    assert!(form.is_visible());
    assert!(form.is_controlled());
    assert_eq!(recorder.events(), vec![true]);

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Hidden
    );
    assert_eq!(recorder.events(), vec![true, false]);
}

#[test]
fn test_hidden_construction_is_silent() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(false)
        .on_visible_change(recorder.callback())
        .build();

    assert!(!form.is_visible());
    assert!(form.is_controlled());
    assert!(recorder.events().is_empty());
}

#[test]
fn test_cancel_button_closes() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .build();

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CancelButton),
        Transition::Hidden
    );
    assert_eq!(recorder.events(), vec![true, false]);
}

#[test]
fn test_unhandled_cancel_hook_then_close() {
    let recorder = Recorder::default();
    let hook = HookCounter::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_cancel(hook.hook(CancelOutcome::Unhandled))
        .build();

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Hidden
    );
    assert_eq!(hook.calls(), 1);
    assert_eq!(recorder.events(), vec![true, false]);
}

#[test]
fn test_handled_cancel_hook_defers_close() {
    let recorder = Recorder::default();
    let hook = HookCounter::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_cancel(hook.hook(CancelOutcome::Handled))
        .build();

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::MaskClick),
        Transition::Deferred
    );
    assert!(form.is_visible());
    assert_eq!(recorder.events(), vec![true]);

    // The hook's owner closes later on its own terms
    assert_eq!(form.set_visible(false), Transition::Hidden);
    assert_eq!(recorder.events(), vec![true, false]);
    assert_eq!(hook.calls(), 1);
}

#[test]
fn test_cancel_hook_may_close_from_inside() {
    let recorder = Recorder::default();
    let slot: Arc<OnceLock<ModalForm>> = Arc::new(OnceLock::new());
    let hook_slot = Arc::clone(&slot);
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_cancel(move || {
            if let Some(form) = hook_slot.get() {
                form.close();
            }
            CancelOutcome::Handled
        })
        .build();
    slot.set(form.clone()).unwrap();

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Deferred
    );
    assert!(!form.is_visible());
    assert_eq!(recorder.events(), vec![true, false]);
}

#[test]
fn test_close_gesture_on_hidden_dialog_skips_hook() {
    let hook = HookCounter::default();
    let form = ModalForm::builder()
        .on_cancel(hook.hook(CancelOutcome::Unhandled))
        .build();

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::Keyboard),
        Transition::Unchanged
    );
    assert_eq!(hook.calls(), 0);
}

#[test]
fn test_controlled_mode_applies_optimistically() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(false)
        .on_visible_change(recorder.callback())
        .build();

    assert_eq!(form.open(), Transition::Shown);
    // Owner confirms the value it was told about
    assert_eq!(form.set_visible(true), Transition::Unchanged);
    assert_eq!(recorder.events(), vec![true]);

    form.request_visibility_change(false, VisibilitySource::CloseButton);
    assert!(!form.is_visible());
    assert_eq!(recorder.events(), vec![true, false]);

    // Owner disagrees and reopens
    assert_eq!(form.set_visible(true), Transition::Shown);
    assert!(form.is_visible());
    assert_eq!(recorder.events(), vec![true, false, true]);
}

// === Lifecycle ===

#[test]
fn test_lazy_mount_on_first_open() {
    let form = ModalForm::builder().build();
    assert!(form.handle().is_none());
    assert_eq!(form.mount_state(), MountState::Unmounted);
    assert_eq!(form.view().values, None);

    form.open();
    assert!(form.handle().is_some());
    assert_eq!(form.mount_state(), MountState::MountedVisible);
}

#[test]
fn test_force_render_mounts_before_open() {
    let form = ModalForm::builder()
        .force_render(true)
        .initial_values(name_values("1234"))
        .build();

    assert!(!form.is_visible());
    assert_eq!(form.mount_state(), MountState::MountedHidden);
    assert_eq!(name_of(&form), json!("1234"));
}

#[test]
fn test_destroy_on_close_drops_handle() {
    let form = ModalForm::builder().destroy_on_close(true).build();
    assert!(form.handle().is_none());

    form.set_visible(true);
    let old = form.handle().unwrap();

    form.set_visible(false);
    assert!(form.handle().is_none());
    assert_eq!(form.mount_state(), MountState::Unmounted);
    assert!(matches!(
        form.field(old, "name"),
        Err(ModalFormError::StaleInstance { live: None, .. })
    ));

    form.set_visible(true);
    let new = form.handle().unwrap();
    assert_ne!(old, new);
    assert!(matches!(
        form.set_field(old, "name", "late write"),
        Err(ModalFormError::StaleInstance { .. })
    ));
}

#[test]
fn test_close_keeps_edited_values() {
    let form = ModalForm::builder()
        .initial_values(name_values("1234"))
        .build();

    form.open();
    let handle = form.handle().unwrap();
    form.set_field(handle, "name", "test").unwrap();
    assert_eq!(name_of(&form), json!("test"));

    form.request_visibility_change(false, VisibilitySource::CloseButton);
    assert_eq!(form.mount_state(), MountState::MountedHidden);
    form.open();

    assert_eq!(form.handle(), Some(handle));
    assert_eq!(name_of(&form), json!("test"));
    assert!(form.is_dirty(handle).unwrap());
}

#[test]
fn test_destroy_on_close_reseeds_values() {
    let form = ModalForm::builder()
        .destroy_on_close(true)
        .initial_values(name_values("1234"))
        .build();

    form.open();
    let handle = form.handle().unwrap();
    form.set_field(handle, "name", "1111").unwrap();
    assert_eq!(name_of(&form), json!("1111"));

    form.request_visibility_change(false, VisibilitySource::CloseButton);
    form.open();

    assert_eq!(name_of(&form), json!("1234"));
}

#[test]
fn test_reseed_uses_updated_initial_values() {
    let form = ModalForm::builder()
        .destroy_on_close(true)
        .initial_values(name_values("1234"))
        .build();

    form.open();
    form.set_initial_values(name_values("5678"));
    // The live epoch keeps its seed
    assert_eq!(name_of(&form), json!("1234"));

    form.close();
    form.open();
    assert_eq!(name_of(&form), json!("5678"));
}

#[test]
fn test_reset_fields_restores_initial_values() {
    let form = ModalForm::builder()
        .initial_values(name_values("1234"))
        .build();
    assert!(matches!(form.reset_fields(), Err(ModalFormError::NotMounted)));

    form.open();
    let handle = form.handle().unwrap();
    form.set_field(handle, "name", "test").unwrap();
    form.reset_fields().unwrap();

    assert_eq!(name_of(&form), json!("1234"));
    assert!(!form.is_dirty(handle).unwrap());
}

#[test]
fn test_teardown_disposes_preserved_instance() {
    let form = ModalForm::builder().build();
    form.open();
    form.close();
    let handle = form.handle().unwrap();

    form.teardown();
    assert!(form.handle().is_none());
    assert_eq!(form.mount_state(), MountState::Unmounted);
    assert!(matches!(
        form.values(handle),
        Err(ModalFormError::StaleInstance { .. })
    ));
}

// === Footer ===

#[test]
fn test_default_footer() {
    let form = ModalForm::builder().visible(true).build();
    let footer = form.view().footer.unwrap();

    assert_eq!(footer.submit.label, "Confirm");
    assert_eq!(footer.cancel.label, "Cancel");
    assert!(!footer.cancel.disabled);
    assert!(!footer.submit.loading);
}

#[test]
fn test_custom_submitter_labels() {
    let form = ModalForm::builder()
        .submitter(Submitter::Footer(SubmitterConfig {
            submit_text: "OK".to_string(),
            reset_text: "Back".to_string(),
        }))
        .build();

    let footer = form.footer().unwrap();
    assert_eq!(footer.submit.label, "OK");
    assert_eq!(footer.cancel.label, "Back");
}

#[test]
fn test_hidden_submitter_still_toggles() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .submitter(false)
        .on_visible_change(recorder.callback())
        .build();

    assert_eq!(form.footer(), None);
    assert_eq!(form.open(), Transition::Shown);

    let view = form.view();
    assert!(view.visible);
    assert_eq!(view.footer, None);
    assert_eq!(recorder.events(), vec![true]);
}

// === Submission ===

#[tokio::test(start_paused = true)]
async fn test_finish_true_closes_once() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_finish(|_| async { Ok(true) })
        .build();

    assert!(form.submit().await.unwrap());
    assert!(!form.is_visible());
    assert!(!form.is_submitting());
    assert_eq!(recorder.events(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_finish_false_keeps_dialog_open() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_finish(|_| async { Ok(false) })
        .build();

    assert!(!form.submit().await.unwrap());
    assert!(form.is_visible());
    assert_eq!(recorder.events(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn test_missing_handler_keeps_dialog_open() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .build();

    assert!(!form.submit().await.unwrap());
    assert!(form.is_visible());
    assert_eq!(recorder.events(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn test_handler_receives_current_values() {
    let received: Arc<Mutex<Option<Values>>> = Arc::default();
    let sink = Arc::clone(&received);
    let form = ModalForm::builder()
        .initial_values(name_values("1234"))
        .on_finish(move |values| {
            *sink.lock().unwrap() = Some(values);
            async { Ok(false) }
        })
        .build();

    form.open();
    form.set_field(form.handle().unwrap(), "name", "test").unwrap();
    form.submit().await.unwrap();

    assert_eq!(*received.lock().unwrap(), Some(name_values("test")));
}

#[tokio::test(start_paused = true)]
async fn test_handler_failure_keeps_values() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_finish(|_| async { Err(eyre!("backend unavailable")) })
        .build();
    let handle = form.handle().unwrap();
    form.set_field(handle, "name", "typed").unwrap();

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, ModalFormError::Handler(_)));
    assert!(err.to_string().contains("backend unavailable"));

    assert!(form.is_visible());
    assert!(!form.is_submitting());
    assert!(!form.close_disabled());
    assert_eq!(form.field(handle, "name").unwrap(), Some(json!("typed")));
    assert_eq!(recorder.events(), vec![true]);
}

#[tokio::test(start_paused = true)]
async fn test_submit_requires_mounted_form() {
    let form = ModalForm::builder().on_finish(|_| async { Ok(true) }).build();
    assert!(matches!(
        form.submit().await,
        Err(ModalFormError::NotMounted)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_is_refused() {
    let form = ModalForm::builder()
        .visible(true)
        .on_finish(|_| async {
            sleep(Duration::from_millis(1000)).await;
            Ok(false)
        })
        .build();

    let first = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });
    sleep(Duration::from_millis(10)).await;

    assert!(form.is_submitting());
    assert!(form.footer().unwrap().submit.loading);
    assert!(matches!(
        form.submit().await,
        Err(ModalFormError::SubmitInFlight)
    ));

    assert!(!first.await.unwrap().unwrap());
    assert!(!form.is_submitting());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_submit_clears_in_flight() {
    let form = ModalForm::builder()
        .visible(true)
        .submit_timeout(Duration::from_millis(3000))
        .on_finish(|_| async {
            sleep(Duration::from_millis(5000)).await;
            Ok(true)
        })
        .build();

    let result = tokio::time::timeout(Duration::from_millis(100), form.submit()).await;
    assert!(result.is_err());

    assert!(!form.is_submitting());
    assert!(!form.close_disabled());
    assert!(!form.footer().unwrap().submit.loading);
    assert!(form.is_visible());

    // A fresh submission is accepted and runs to completion
    assert!(form.submit().await.unwrap());
    assert!(!form.is_visible());
}

#[tokio::test(start_paused = true)]
async fn test_panicking_handler_clears_in_flight() {
    let form = ModalForm::builder()
        .visible(true)
        .submit_timeout(Duration::from_millis(3000))
        .on_finish(|_| async { panic!("handler blew up") })
        .build();

    let submission = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });
    assert!(submission.await.unwrap_err().is_panic());

    assert!(!form.is_submitting());
    assert!(!form.close_disabled());
    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Hidden
    );
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_timeout_disables_close_until_settled() {
    let form = ModalForm::builder()
        .visible(true)
        .submit_timeout(Duration::MAX)
        .on_finish(|_| async {
            sleep(Duration::from_millis(2000)).await;
            Ok(false)
        })
        .build();

    let submission = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });

    sleep(Duration::from_millis(1000)).await;
    assert!(form.close_disabled());
    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::Keyboard),
        Transition::Rejected
    );

    assert!(!submission.await.unwrap().unwrap());
    assert!(!form.is_submitting());
    assert!(!form.close_disabled());
}

#[tokio::test(start_paused = true)]
async fn test_submit_timeout_disables_close() {
    let hook = HookCounter::default();
    let form = ModalForm::builder()
        .visible(true)
        .submit_timeout(Duration::from_millis(3000))
        .on_cancel(hook.hook(CancelOutcome::Unhandled))
        .on_finish(|_| async {
            sleep(Duration::from_millis(2000)).await;
            Ok(false)
        })
        .build();

    let submission = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });

    sleep(Duration::from_millis(500)).await;
    assert!(form.close_disabled());
    assert!(form.footer().unwrap().cancel.disabled);

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Rejected
    );
    sleep(Duration::from_millis(500)).await;
    assert_eq!(hook.calls(), 0);
    assert!(form.is_visible());

    sleep(Duration::from_millis(2500)).await;
    assert!(!form.close_disabled());
    assert!(!form.footer().unwrap().cancel.disabled);

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Hidden
    );
    assert_eq!(hook.calls(), 1);
    assert!(!submission.await.unwrap().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_close_accepted_after_window_while_pending() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .submit_timeout(Duration::from_millis(3000))
        .on_visible_change(recorder.callback())
        .on_finish(|_| async {
            sleep(Duration::from_millis(5000)).await;
            Ok(true)
        })
        .build();

    let submission = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });

    sleep(Duration::from_millis(2500)).await;
    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::Keyboard),
        Transition::Rejected
    );

    sleep(Duration::from_millis(500)).await;
    assert!(form.is_submitting());
    assert!(!form.close_disabled());
    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::Keyboard),
        Transition::Hidden
    );

    // The late success finds the dialog already hidden
    assert!(submission.await.unwrap().unwrap());
    assert!(!form.is_visible());
    assert_eq!(recorder.events(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_no_timeout_never_disables_close() {
    let hook = HookCounter::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_cancel(hook.hook(CancelOutcome::Unhandled))
        .on_finish(|_| async {
            sleep(Duration::from_millis(2000)).await;
            Ok(false)
        })
        .build();

    let submission = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });

    sleep(Duration::from_millis(500)).await;
    assert!(form.is_submitting());
    assert!(!form.close_disabled());
    assert!(!form.footer().unwrap().cancel.disabled);

    assert_eq!(
        form.request_visibility_change(false, VisibilitySource::CloseButton),
        Transition::Hidden
    );
    assert_eq!(hook.calls(), 1);
    assert!(!submission.await.unwrap().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_success_after_reopen_keeps_dialog_open() {
    let recorder = Recorder::default();
    let form = ModalForm::builder()
        .visible(true)
        .on_visible_change(recorder.callback())
        .on_finish(|_| async {
            sleep(Duration::from_millis(1000)).await;
            Ok(true)
        })
        .build();

    let submission = tokio::spawn({
        let form = form.clone();
        async move { form.submit().await }
    });

    sleep(Duration::from_millis(100)).await;
    form.request_visibility_change(false, VisibilitySource::CloseButton);
    form.open();

    assert!(submission.await.unwrap().unwrap());
    assert!(form.is_visible());
    assert_eq!(recorder.events(), vec![true, false, true]);
}
