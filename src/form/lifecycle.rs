//! Mount policy for the form instance.
//!
//! The policy only decides; the controller applies each [`InstanceAction`]
//! to the instance manager in the same turn as the visibility change.

/// Where the form is in its mount lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountState {
    /// No form instance exists.
    #[default]
    Unmounted,
    /// An instance exists but the dialog is hidden.
    MountedHidden,
    /// An instance exists and the dialog is shown.
    MountedVisible,
}

/// What the instance manager must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    /// Leave the instance as it is.
    Keep,
    /// Make sure an instance exists, creating one if needed.
    Ensure,
    /// Throw the instance away.
    Dispose,
}

#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    force_render: bool,
    destroy_on_close: bool,
    state: MountState,
}

impl LifecyclePolicy {
    pub const fn new(force_render: bool, destroy_on_close: bool) -> Self {
        Self {
            force_render,
            destroy_on_close,
            state: MountState::Unmounted,
        }
    }

    /// Action to take when the controller is constructed hidden.
    ///
    /// With `force_render` the form is mounted eagerly so it exists before
    /// the first open.
    pub const fn on_construct(&mut self) -> InstanceAction {
        if self.force_render {
            self.state = MountState::MountedHidden;
            InstanceAction::Ensure
        } else {
            InstanceAction::Keep
        }
    }

    pub const fn on_show(&mut self) -> InstanceAction {
        self.state = MountState::MountedVisible;
        InstanceAction::Ensure
    }

    pub const fn on_hide(&mut self) -> InstanceAction {
        match self.state {
            MountState::Unmounted => InstanceAction::Keep,
            MountState::MountedHidden | MountState::MountedVisible if self.destroy_on_close => {
                self.state = MountState::Unmounted;
                InstanceAction::Dispose
            }
            MountState::MountedHidden | MountState::MountedVisible => {
                self.state = MountState::MountedHidden;
                InstanceAction::Keep
            }
        }
    }

    /// Full teardown always disposes, regardless of configuration.
    pub const fn on_teardown(&mut self) -> InstanceAction {
        self.state = MountState::Unmounted;
        InstanceAction::Dispose
    }

    pub const fn state(&self) -> MountState {
        self.state
    }
}
