//! Shared slot for a registered module.
//!
//! The kernel registry and the event bus both hold clones of the same [`ModuleHandle`], so
//! an enabled-flag flip made through one is seen by the other on its next read.

use crate::module::{LifecycleState, Module, ModuleDescriptor};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

const REGISTERED: u8 = 0;
const BOOTED: u8 = 1;

#[derive(Debug)]
struct ModuleEntry {
    module: Box<dyn Module>,
    order: u32,
    enabled: AtomicBool,
    state: AtomicU8,
}

/// Cheaply cloneable handle to one registered module.
///
/// The enabled flag is a single atomic word: readers always see a fully applied value.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    inner: Arc<ModuleEntry>,
}

impl ModuleHandle {
    /// Wraps a module that has completed [`Module::register`].
    #[must_use]
    pub fn new(module: Box<dyn Module>, order: u32, enabled: bool) -> Self {
        Self {
            inner: Arc::new(ModuleEntry {
                module,
                order,
                enabled: AtomicBool::new(enabled),
                state: AtomicU8::new(REGISTERED),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.module.name()
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.inner.order
    }

    #[must_use]
    pub fn module(&self) -> &dyn Module {
        self.inner.module.as_ref()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Sets the flag and returns the previous value.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.inner.enabled.swap(enabled, Ordering::AcqRel)
    }

    #[must_use]
    pub fn lifecycle(&self) -> LifecycleState {
        match self.inner.state.load(Ordering::Acquire) {
            BOOTED => LifecycleState::Booted,
            _ => LifecycleState::Registered,
        }
    }

    /// Moves `Registered -> Booted`. Returns `false` if the module had already booted.
    pub fn mark_booted(&self) -> bool {
        self.inner
            .state
            .compare_exchange(REGISTERED, BOOTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[must_use]
    pub fn descriptor(&self) -> ModuleDescriptor {
        let module = self.module();
        ModuleDescriptor {
            name: module.name().to_owned(),
            alias: module.alias().to_owned(),
            description: module.description().to_owned(),
            version: module.version().to_owned(),
            registration_order: self.order(),
            enabled: self.is_enabled(),
            lifecycle_state: self.lifecycle(),
        }
    }

    /// Whether two handles point at the same registered module.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Probe;

    impl Module for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn alias(&self) -> &str {
            "Probe"
        }

        fn description(&self) -> &str {
            "Test module"
        }

        fn version(&self) -> &str {
            "2.1.0"
        }
    }

    #[test]
    fn toggles_are_shared_between_clones() {
        let handle = ModuleHandle::new(Box::new(Probe), 4, true);
        let other = handle.clone();

        assert!(other.set_enabled(false));
        assert!(!handle.is_enabled());
        assert!(!handle.set_enabled(true));
        assert!(other.is_enabled());
        assert!(handle.same_as(&other));
    }

    #[test]
    fn boots_exactly_once() {
        let handle = ModuleHandle::new(Box::new(Probe), 0, true);
        assert_eq!(handle.lifecycle(), LifecycleState::Registered);
        assert!(handle.mark_booted());
        assert!(!handle.mark_booted());
        assert_eq!(handle.lifecycle(), LifecycleState::Booted);
    }

    #[test]
    fn descriptor_reflects_current_state() {
        let handle = ModuleHandle::new(Box::new(Probe), 7, false);
        let descriptor = handle.descriptor();
        assert_eq!(descriptor.name, "probe");
        assert_eq!(descriptor.alias, "Probe");
        assert_eq!(descriptor.version, "2.1.0");
        assert_eq!(descriptor.registration_order, 7);
        assert!(!descriptor.enabled);
        assert_eq!(descriptor.lifecycle_state, LifecycleState::Registered);
    }
}
