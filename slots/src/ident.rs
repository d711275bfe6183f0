use std::any::TypeId;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// Callback identities are function pointers widened to a word. Refuse to build
// anywhere that widening would truncate.
const _: () = assert!(std::mem::size_of::<fn()>() <= std::mem::size_of::<usize>());

/// Identifies one signal declaration on one publisher type.
///
/// Two `SignalId`s are equal exactly when they were taken from the same signal
/// marker type. The name is carried along for logging only.
#[derive(Debug, Clone, Copy)]
pub struct SignalId {
    type_id: TypeId,
    name: &'static str,
}

impl SignalId {
    pub(crate) fn new(type_id: TypeId, name: &'static str) -> Self { Self { type_id, name } }

    /// The declared name of the signal, e.g. `"Greeter::Hello"`
    pub fn name(&self) -> &'static str { self.name }
}

impl PartialEq for SignalId {
    fn eq(&self, other: &Self) -> bool { self.type_id == other.type_id }
}

impl Eq for SignalId {}

impl Hash for SignalId {
    fn hash<H: Hasher>(&self, state: &mut H) { self.type_id.hash(state) }
}

impl std::fmt::Display for SignalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name) }
}

/// Identifies the object instance whose method a slot wraps.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OwnerId(usize);

impl OwnerId {
    /// Identity of the value an `Arc` points at. Clones of the same `Arc` share it.
    pub fn of<T: ?Sized>(owner: &Arc<T>) -> Self { Self(Arc::as_ptr(owner) as *const () as usize) }

    pub(crate) fn from_addr(addr: usize) -> Self { Self(addr) }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#x}", self.0) }
}

/// Identifies the callable embedded in a slot, used to match slots on unbind.
///
/// Free functions and methods are identified by their function pointer. Closures
/// are identified by whatever address the binder chose: either the closure's own
/// heap storage (returned from `bind_closure`) or a caller supplied one.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CallbackId(usize);

impl CallbackId {
    /// Identity taken from the address of any value the caller keeps in place
    /// for as long as the binding should remain reachable.
    pub fn of<T: ?Sized>(value: &T) -> Self { Self(value as *const T as *const () as usize) }

    /// Identity of a free function.
    pub fn function<A>(function: fn(&A)) -> Self { Self(function as usize) }

    /// Identity of a method, independent of the receiver it is bound to.
    pub fn method<T, A>(method: fn(&T, &A)) -> Self { Self(method as usize) }

    pub(crate) fn from_addr(addr: usize) -> Self { Self(addr) }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:#x}", self.0) }
}
