//! Form instance ownership.
//!
//! A [`FormInstanceManager`] holds at most one live [`FormInstance`]. Every
//! instance it creates starts a new mount epoch, and every [`FormHandle`]
//! remembers the epoch it was issued for. Using a handle after its epoch has
//! ended is a lifecycle bug and fails with [`ModalFormError::StaleInstance`].

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, error};

use crate::form::error::{ModalFormError, Result};

/// Field values keyed by field name.
pub type Values = BTreeMap<String, Value>;

/// Opaque reference to the form instance of one mount epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormHandle {
    epoch: u64,
}

impl FormHandle {
    /// The mount epoch this handle was issued for.
    pub const fn epoch(self) -> u64 {
        self.epoch
    }
}

/// Field state of a single mount epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct FormInstance {
    values: Values,
    initial: Values,
    dirty: BTreeSet<String>,
}

impl FormInstance {
    fn seeded(initial: &Values) -> Self {
        Self {
            values: initial.clone(),
            initial: initial.clone(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub const fn values(&self) -> &Values {
        &self.values
    }

    /// Returns true if any field differs from the value it was seeded with.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn set(&mut self, name: &str, value: Value) {
        if self.initial.get(name) == Some(&value) {
            self.dirty.remove(name);
        } else {
            self.dirty.insert(name.to_string());
        }
        self.values.insert(name.to_string(), value);
    }

    fn reset_to(&mut self, initial: &Values) {
        *self = Self::seeded(initial);
    }
}

struct LiveInstance {
    epoch: u64,
    instance: FormInstance,
}

/// Creates, resets and disposes the form instance.
#[derive(Default)]
pub struct FormInstanceManager {
    live: Option<LiveInstance>,
    last_epoch: u64,
}

impl FormInstanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live handle, creating a fresh instance seeded with
    /// `initial` if none exists.
    pub fn ensure_instance(&mut self, initial: &Values) -> FormHandle {
        if let Some(live) = &self.live {
            return FormHandle { epoch: live.epoch };
        }

        self.last_epoch += 1;
        debug!(epoch = self.last_epoch, "Mounting form instance");
        self.live = Some(LiveInstance {
            epoch: self.last_epoch,
            instance: FormInstance::seeded(initial),
        });
        FormHandle {
            epoch: self.last_epoch,
        }
    }

    /// Re-seeds the live instance in place. The epoch does not change.
    pub fn reset_to(&mut self, initial: &Values) -> Result<()> {
        let live = self.live.as_mut().ok_or(ModalFormError::NotMounted)?;
        live.instance.reset_to(initial);
        Ok(())
    }

    /// Discards the live instance. Returns false if nothing was mounted.
    pub fn dispose(&mut self) -> bool {
        match self.live.take() {
            Some(live) => {
                debug!(epoch = live.epoch, "Disposing form instance");
                true
            }
            None => false,
        }
    }

    pub fn handle(&self) -> Option<FormHandle> {
        self.live.as_ref().map(|live| FormHandle { epoch: live.epoch })
    }

    pub fn instance(&self, handle: FormHandle) -> Result<&FormInstance> {
        match &self.live {
            Some(live) if live.epoch == handle.epoch => Ok(&live.instance),
            _ => Err(self.stale(handle)),
        }
    }

    pub fn set_field(&mut self, handle: FormHandle, name: &str, value: Value) -> Result<()> {
        if let Some(live) = self.live.as_mut()
            && live.epoch == handle.epoch
        {
            live.instance.set(name, value);
            return Ok(());
        }
        Err(self.stale(handle))
    }

    fn stale(&self, handle: FormHandle) -> ModalFormError {
        let live = self.live.as_ref().map(|live| live.epoch);
        error!(
            handle = handle.epoch,
            live = ?live,
            "Form instance accessed after its mount epoch ended"
        );
        ModalFormError::StaleInstance {
            handle: handle.epoch,
            live,
        }
    }
}
