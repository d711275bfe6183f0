//! Storage for an emitter's registry. Which cell is used is a build-time choice:
//! `thread-safe` puts the registry behind a reader-writer lock, otherwise it lives
//! in a `RefCell` and the emitter is confined to one thread.

use crate::ident::SignalId;
use crate::registry::{Fetch, Registry};

#[cfg(feature = "thread-safe")]
pub(crate) use locked::*;
#[cfg(not(feature = "thread-safe"))]
pub(crate) use unlocked::*;

#[cfg(feature = "thread-safe")]
mod locked {
    use super::*;
    use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    pub(crate) struct RegistryCell(RwLock<Registry>);

    impl RegistryCell {
        pub fn new(registry: Registry) -> Self { Self(RwLock::new(registry)) }

        pub fn read(&self) -> RwLockReadGuard<'_, Registry> { self.0.read().unwrap_or_else(PoisonError::into_inner) }

        pub fn write(&self) -> RwLockWriteGuard<'_, Registry> { self.0.write().unwrap_or_else(PoisonError::into_inner) }

        /// Holds the shared lock until the cursor is dropped. A slot that binds or
        /// unbinds on the same emitter while the cursor is alive will deadlock.
        pub fn cursor(&self) -> Cursor<'_> { Cursor { registry: self.read() } }
    }

    pub(crate) struct Cursor<'a> {
        registry: RwLockReadGuard<'a, Registry>,
    }

    impl Cursor<'_> {
        pub fn at(&self, signal: &SignalId, index: usize) -> Fetch { self.registry.at(signal, index) }
    }
}

#[cfg(not(feature = "thread-safe"))]
mod unlocked {
    use super::*;
    use std::cell::{Ref, RefCell, RefMut};

    pub(crate) struct RegistryCell(RefCell<Registry>);

    impl RegistryCell {
        pub fn new(registry: Registry) -> Self { Self(RefCell::new(registry)) }

        pub fn read(&self) -> Ref<'_, Registry> { self.0.borrow() }

        pub fn write(&self) -> RefMut<'_, Registry> { self.0.borrow_mut() }

        /// Pins the registry for indexed iteration. Nothing stays borrowed between
        /// lookups, so slots may bind and unbind on the same emitter.
        pub fn cursor(&self) -> Cursor<'_> {
            self.0.borrow_mut().pin();
            Cursor { cell: &self.0 }
        }
    }

    pub(crate) struct Cursor<'a> {
        cell: &'a RefCell<Registry>,
    }

    impl Cursor<'_> {
        pub fn at(&self, signal: &SignalId, index: usize) -> Fetch { self.cell.borrow().at(signal, index) }
    }

    impl Drop for Cursor<'_> {
        fn drop(&mut self) {
            // also runs while a panicking slot unwinds through emit
            if let Ok(mut registry) = self.cell.try_borrow_mut() {
                registry.unpin();
            }
        }
    }
}
