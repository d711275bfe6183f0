use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::cell::RegistryCell;
use crate::config::{DispatchMode, EmitterConfig};
use crate::error::DispatchError;
use crate::ident::{CallbackId, OwnerId};
use crate::registry::{Fetch, Registry};
use crate::signal::Signal;
use crate::slot::{ErasedSlot, Matcher, Slot};

/// The per-instance signal state of a publisher.
///
/// A publisher keeps an `Emitter<Self>` in a private field and calls
/// [`emit`](Emitter::emit) from its own methods. Receivers never see the emitter
/// itself: the [`Publisher`] trait hands out a [`Bindings`] view, which can bind,
/// unbind and inspect but not emit.
///
/// Binding and unbinding take `&self`. Without the `thread-safe` feature the
/// emitter is `!Sync`, and slots may bind or unbind on the emitter that is
/// currently invoking them. With `thread-safe` the emitter is `Sync`, emission
/// holds a shared lock while slots run, and a slot that binds or unbinds on the
/// same emitter deadlocks.
pub struct Emitter<P: ?Sized> {
    registry: RegistryCell,
    config: EmitterConfig,
    _publisher: PhantomData<fn(&P)>,
}

impl<P: ?Sized + 'static> Default for Emitter<P> {
    fn default() -> Self { Self::new() }
}

impl<P: ?Sized + 'static> Emitter<P> {
    pub fn new() -> Self { Self::with_config(EmitterConfig::default()) }

    pub fn with_config(config: EmitterConfig) -> Self {
        debug!(publisher = std::any::type_name::<P>(), mode = %DispatchMode::CURRENT, "emitter created");
        Self { registry: RegistryCell::new(Registry::new()), config, _publisher: PhantomData }
    }

    /// The receiver-facing view of this emitter. Return it from
    /// [`Publisher::bindings`].
    pub fn bindings(&self) -> Bindings<'_, P> { Bindings(self) }

    /// Binds a free function to `signal`.
    pub fn bind<S>(&self, _signal: S, function: fn(&S::Args))
    where S: Signal<Publisher = P> {
        self.store::<S>(Slot::function(function));
    }

    /// Binds `method` called on `owner` to `signal`. The binding keeps `owner`
    /// alive until it is unbound or the emitter is dropped.
    pub fn bind_method<S, T>(&self, _signal: S, owner: &Arc<T>, method: fn(&T, &S::Args))
    where
        S: Signal<Publisher = P>,
        T: Send + Sync + 'static,
    {
        self.store::<S>(Slot::method(owner, method));
    }

    /// Binds a closure to `signal`. The returned identity is the closure's own
    /// storage; pass it to [`unbind_callback`](Emitter::unbind_callback) to remove it.
    pub fn bind_closure<S, F>(&self, _signal: S, closure: F) -> CallbackId
    where
        S: Signal<Publisher = P>,
        F: Fn(&S::Args) + Send + Sync + 'static,
    {
        self.store::<S>(Slot::closure(closure))
    }

    /// Binds a closure to `signal` under an identity chosen by the caller,
    /// typically [`CallbackId::of`] some value the caller keeps in place.
    ///
    /// Returns the slot's owner identity, the closure's own storage. Unbinding
    /// with [`Matcher::Owner`] removes this one slot even if the caller's
    /// identity is no longer at hand.
    pub fn bind_closure_with<S, F>(&self, _signal: S, callback: CallbackId, closure: F) -> OwnerId
    where
        S: Signal<Publisher = P>,
        F: Fn(&S::Args) + Send + Sync + 'static,
    {
        let (slot, owner) = Slot::closure_with(callback, closure);
        self.store::<S>(slot);
        owner
    }

    fn store<S: Signal>(&self, slot: Slot<S::Args>) -> CallbackId {
        let callback = slot.callback();
        trace!(signal = S::NAME, kind = %slot.kind(), %callback, "bind");
        self.registry.write().store(S::id(), Arc::new(slot));
        callback
    }

    /// Removes every binding of a free function, from all signals.
    pub fn unbind_function<A: 'static>(&self, function: fn(&A)) -> usize { self.unbind(Matcher::Callback(CallbackId::function(function))) }

    /// Removes every binding of `method` on `owner`, from all signals.
    pub fn unbind_method<T, A>(&self, owner: &Arc<T>, method: fn(&T, &A)) -> usize {
        self.unbind(Matcher::Exact { owner: OwnerId::of(owner), callback: CallbackId::method(method) })
    }

    /// Removes every method bound on `owner`, from all signals.
    pub fn unbind_owner<T: ?Sized>(&self, owner: &Arc<T>) -> usize { self.unbind(Matcher::Owner(OwnerId::of(owner))) }

    /// Removes every slot with this callback identity, from all signals.
    pub fn unbind_callback(&self, callback: CallbackId) -> usize { self.unbind(Matcher::Callback(callback)) }

    /// Removes every slot the matcher selects and returns how many there were.
    /// Unbinding something that is not bound is a no-op.
    pub fn unbind(&self, matcher: Matcher) -> usize {
        let removed = self.registry.write().remove(&matcher);
        // slots are dropped here, after the registry is released
        debug!(?matcher, removed = removed.len(), "unbind");
        removed.len()
    }

    /// Removes every slot from every signal.
    pub fn clear(&self) -> usize {
        let removed = self.registry.write().clear();
        debug!(removed = removed.len(), "clear");
        removed.len()
    }

    /// Invokes every slot bound to `signal` with `args`.
    ///
    /// Slots run in bind order on the calling thread, or each on its own detached
    /// worker with the `parallel` feature. A slot that panics in sequential mode
    /// unwinds through this call and the slots after it are skipped.
    pub fn emit<S>(&self, signal: S, args: S::Args)
    where S: Signal<Publisher = P> {
        if let Err(err) = self.try_emit(signal, args) {
            error!(signal = S::NAME, "{err}");
        }
    }

    /// Like [`emit`](Emitter::emit), but reports dispatch failures and returns the
    /// number of slots invoked (or workers started).
    pub fn try_emit<S>(&self, _signal: S, args: S::Args) -> Result<usize, DispatchError>
    where S: Signal<Publisher = P> {
        let signal = S::id();
        let cursor = self.registry.cursor();
        let mut dispatched = 0;
        let mut index = 0;
        loop {
            let slot = match cursor.at(&signal, index) {
                Fetch::Slot(slot) => slot,
                Fetch::Vacant => {
                    index += 1;
                    continue;
                }
                Fetch::End => break,
            };
            index += 1;

            // slots are stored under the id of the signal whose arguments they take
            let Ok(slot) = slot.into_any().downcast::<Slot<S::Args>>() else {
                unreachable!("slot bound to {} takes other arguments", S::NAME);
            };
            trace!(signal = S::NAME, index = index - 1, kind = %slot.kind(), "dispatch");
            self.dispatch::<S>(slot, &args)?;
            dispatched += 1;
        }
        Ok(dispatched)
    }

    #[cfg(not(feature = "parallel"))]
    fn dispatch<S: Signal>(&self, slot: Arc<Slot<S::Args>>, args: &S::Args) -> Result<(), DispatchError> {
        slot.invoke(args);
        Ok(())
    }

    #[cfg(feature = "parallel")]
    fn dispatch<S: Signal>(&self, slot: Arc<Slot<S::Args>>, args: &S::Args) -> Result<(), DispatchError> {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let args = args.clone();
        self.config
            .worker()
            .spawn(move || {
                if catch_unwind(AssertUnwindSafe(|| slot.invoke(&args))).is_err() {
                    tracing::warn!(signal = S::NAME, "slot panicked on a worker");
                }
            })
            .map(drop)
            .map_err(|source| DispatchError::Spawn { signal: S::NAME, source })
    }

    /// Number of slots bound across all signals
    pub fn len(&self) -> usize { self.registry.read().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Number of slots bound to `signal`
    pub fn slot_count<S>(&self, _signal: S) -> usize
    where S: Signal<Publisher = P> {
        self.registry.read().slot_count(&S::id())
    }

    pub fn is_bound<S>(&self, signal: S) -> bool
    where S: Signal<Publisher = P> {
        self.slot_count(signal) > 0
    }

    /// Number of signals with at least one slot
    pub fn signal_count(&self) -> usize { self.registry.read().signal_count() }

    pub fn mode(&self) -> DispatchMode { DispatchMode::CURRENT }

    pub fn config(&self) -> &EmitterConfig { &self.config }
}

impl<P: ?Sized> std::fmt::Debug for Emitter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("publisher", &std::any::type_name::<P>())
            .field("mode", &DispatchMode::CURRENT)
            .field("config", &self.config)
            .field("registry", &*self.registry.read())
            .finish()
    }
}

/// What a receiver gets to see of a publisher's [`Emitter`]: binding, unbinding
/// and introspection. There is no way to emit through it.
pub struct Bindings<'a, P: ?Sized>(&'a Emitter<P>);

impl<P: ?Sized> Clone for Bindings<'_, P> {
    fn clone(&self) -> Self { *self }
}

impl<P: ?Sized> Copy for Bindings<'_, P> {}

impl<P: ?Sized + 'static> Bindings<'_, P> {
    pub fn bind<S>(self, signal: S, function: fn(&S::Args))
    where S: Signal<Publisher = P> {
        self.0.bind(signal, function)
    }

    pub fn bind_method<S, T>(self, signal: S, owner: &Arc<T>, method: fn(&T, &S::Args))
    where
        S: Signal<Publisher = P>,
        T: Send + Sync + 'static,
    {
        self.0.bind_method(signal, owner, method)
    }

    pub fn bind_closure<S, F>(self, signal: S, closure: F) -> CallbackId
    where
        S: Signal<Publisher = P>,
        F: Fn(&S::Args) + Send + Sync + 'static,
    {
        self.0.bind_closure(signal, closure)
    }

    pub fn bind_closure_with<S, F>(self, signal: S, callback: CallbackId, closure: F) -> OwnerId
    where
        S: Signal<Publisher = P>,
        F: Fn(&S::Args) + Send + Sync + 'static,
    {
        self.0.bind_closure_with(signal, callback, closure)
    }

    pub fn unbind_function<A: 'static>(self, function: fn(&A)) -> usize { self.0.unbind_function(function) }

    pub fn unbind_method<T, A>(self, owner: &Arc<T>, method: fn(&T, &A)) -> usize { self.0.unbind_method(owner, method) }

    pub fn unbind_owner<T: ?Sized>(self, owner: &Arc<T>) -> usize { self.0.unbind_owner(owner) }

    pub fn unbind_callback(self, callback: CallbackId) -> usize { self.0.unbind_callback(callback) }

    pub fn unbind(self, matcher: Matcher) -> usize { self.0.unbind(matcher) }

    pub fn len(self) -> usize { self.0.len() }

    pub fn is_empty(self) -> bool { self.0.is_empty() }

    pub fn slot_count<S>(self, signal: S) -> usize
    where S: Signal<Publisher = P> {
        self.0.slot_count(signal)
    }

    pub fn is_bound<S>(self, signal: S) -> bool
    where S: Signal<Publisher = P> {
        self.0.is_bound(signal)
    }

    pub fn signal_count(self) -> usize { self.0.signal_count() }

    pub fn mode(self) -> DispatchMode { self.0.mode() }
}

impl<P: ?Sized> std::fmt::Debug for Bindings<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_tuple("Bindings").field(self.0).finish() }
}

/// The binding surface of a publisher.
///
/// Implement [`bindings`](Publisher::bindings) by returning
/// [`Emitter::bindings`] of the publisher's private emitter; everything else is
/// provided. Only code with access to the emitter field itself can fire the
/// publisher's signals.
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use signal_slots::{Bindings, Emitter, Publisher, signals};
///
/// pub struct Thermometer {
///     slots: Emitter<Thermometer>,
/// }
///
/// signals! {
///     Thermometer {
///         pub Reading(f32);
///     }
/// }
///
/// impl Thermometer {
///     pub fn record(&self, celsius: f32) { self.slots.emit(Reading, celsius) }
/// }
///
/// impl Publisher for Thermometer {
///     fn bindings(&self) -> Bindings<'_, Self> { self.slots.bindings() }
/// }
///
/// struct Panel {
///     updates: AtomicUsize,
/// }
///
/// impl Panel {
///     fn on_reading(&self, _celsius: &f32) { self.updates.fetch_add(1, Ordering::SeqCst); }
/// }
///
/// let thermometer = Thermometer { slots: Emitter::new() };
/// let display = Arc::new(Panel { updates: AtomicUsize::new(0) });
/// thermometer.bind_method(Reading, &display, Panel::on_reading);
/// thermometer.record(21.5);
/// # #[cfg(not(feature = "parallel"))]
/// assert_eq!(display.updates.load(Ordering::SeqCst), 1);
///
/// thermometer.unbind_owner(&display);
/// thermometer.record(22.0);
/// # #[cfg(not(feature = "parallel"))]
/// assert_eq!(display.updates.load(Ordering::SeqCst), 1);
/// ```
///
/// Receivers cannot emit:
///
/// ```rust,compile_fail
/// use signal_slots::{Bindings, Emitter, Publisher, signals};
///
/// pub struct Door {
///     slots: Emitter<Door>,
/// }
///
/// signals! {
///     Door {
///         pub Opened(u8);
///     }
/// }
///
/// impl Publisher for Door {
///     fn bindings(&self) -> Bindings<'_, Self> { self.slots.bindings() }
/// }
///
/// let door = Door { slots: Emitter::new() };
/// door.bindings().emit(Opened, 7);
/// ```
pub trait Publisher: Sized + 'static {
    fn bindings(&self) -> Bindings<'_, Self>;

    fn bind<S>(&self, signal: S, function: fn(&S::Args))
    where S: Signal<Publisher = Self> {
        self.bindings().bind(signal, function)
    }

    fn bind_method<S, T>(&self, signal: S, owner: &Arc<T>, method: fn(&T, &S::Args))
    where
        S: Signal<Publisher = Self>,
        T: Send + Sync + 'static,
    {
        self.bindings().bind_method(signal, owner, method)
    }

    fn bind_closure<S, F>(&self, signal: S, closure: F) -> CallbackId
    where
        S: Signal<Publisher = Self>,
        F: Fn(&S::Args) + Send + Sync + 'static,
    {
        self.bindings().bind_closure(signal, closure)
    }

    fn bind_closure_with<S, F>(&self, signal: S, callback: CallbackId, closure: F) -> OwnerId
    where
        S: Signal<Publisher = Self>,
        F: Fn(&S::Args) + Send + Sync + 'static,
    {
        self.bindings().bind_closure_with(signal, callback, closure)
    }

    fn unbind_function<A: 'static>(&self, function: fn(&A)) -> usize { self.bindings().unbind_function(function) }

    fn unbind_method<T, A>(&self, owner: &Arc<T>, method: fn(&T, &A)) -> usize { self.bindings().unbind_method(owner, method) }

    fn unbind_owner<T: ?Sized>(&self, owner: &Arc<T>) -> usize { self.bindings().unbind_owner(owner) }

    fn unbind_callback(&self, callback: CallbackId) -> usize { self.bindings().unbind_callback(callback) }

    fn unbind(&self, matcher: Matcher) -> usize { self.bindings().unbind(matcher) }
}
