use std::any::Any;
use std::sync::Arc;

use crate::ident::{CallbackId, OwnerId};

/// Which shape of callable a slot wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A method bound to an owner object
    Method,
    /// A free function
    Function,
    /// A captured closure with a binder-chosen identity
    Closure,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotKind::Method => f.write_str("method"),
            SlotKind::Function => f.write_str("function"),
            SlotKind::Closure => f.write_str("closure"),
        }
    }
}

type BoxedCallable<A> = Box<dyn Fn(&A) + Send + Sync + 'static>;

/// The invocation behavior of a slot. Fixed at construction.
enum Callable<A> {
    /// Receiver and method pointer, already joined
    Method(BoxedCallable<A>),
    Function(fn(&A)),
    Closure(Arc<dyn Fn(&A) + Send + Sync + 'static>),
}

/// One callable registered against one signal.
pub(crate) struct Slot<A> {
    owner: Option<OwnerId>,
    callback: CallbackId,
    callable: Callable<A>,
}

impl<A: 'static> Slot<A> {
    pub fn function(function: fn(&A)) -> Self {
        Self { owner: None, callback: CallbackId::function(function), callable: Callable::Function(function) }
    }

    pub fn method<T>(owner: &Arc<T>, method: fn(&T, &A)) -> Self
    where T: Send + Sync + 'static {
        let receiver = owner.clone();
        Self {
            owner: Some(OwnerId::of(owner)),
            callback: CallbackId::method(method),
            callable: Callable::Method(Box::new(move |args: &A| method(&receiver, args))),
        }
    }

    /// A closure slot identified by its own storage address.
    pub fn closure<F>(closure: F) -> Self
    where F: Fn(&A) + Send + Sync + 'static {
        let closure: Arc<dyn Fn(&A) + Send + Sync> = Arc::new(closure);
        let addr = Arc::as_ptr(&closure) as *const () as usize;
        Self { owner: Some(OwnerId::from_addr(addr)), callback: CallbackId::from_addr(addr), callable: Callable::Closure(closure) }
    }

    /// A closure slot identified by a caller-chosen callback identity, along with
    /// its owner identity: the closure's storage, which no user object can share.
    pub fn closure_with<F>(callback: CallbackId, closure: F) -> (Self, OwnerId)
    where F: Fn(&A) + Send + Sync + 'static {
        let closure: Arc<dyn Fn(&A) + Send + Sync> = Arc::new(closure);
        let owner = OwnerId::from_addr(Arc::as_ptr(&closure) as *const () as usize);
        (Self { owner: Some(owner), callback, callable: Callable::Closure(closure) }, owner)
    }

    pub fn invoke(&self, args: &A) {
        match &self.callable {
            Callable::Method(call) => call(args),
            Callable::Function(function) => function(args),
            Callable::Closure(closure) => closure(args),
        }
    }
}

/// The argument-independent face of a slot, as held by the registry.
pub(crate) trait ErasedSlot: Send + Sync + 'static {
    fn kind(&self) -> SlotKind;
    fn owner(&self) -> Option<OwnerId>;
    fn callback(&self) -> CallbackId;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<A: 'static> ErasedSlot for Slot<A> {
    fn kind(&self) -> SlotKind {
        match self.callable {
            Callable::Method(_) => SlotKind::Method,
            Callable::Function(_) => SlotKind::Function,
            Callable::Closure(_) => SlotKind::Closure,
        }
    }

    fn owner(&self) -> Option<OwnerId> { self.owner }

    fn callback(&self) -> CallbackId { self.callback }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> { self }
}

impl std::fmt::Debug for dyn ErasedSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("kind", &self.kind()).field("owner", &self.owner()).field("callback", &self.callback()).finish()
    }
}

/// Selects the slots removed by an unbind.
///
/// There is deliberately no variant matching on neither owner nor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Every slot whose callback identity is this one, whatever its owner
    Callback(CallbackId),
    /// Every slot owned by this object
    Owner(OwnerId),
    /// Slots matching both owner and callback
    Exact { owner: OwnerId, callback: CallbackId },
}

impl Matcher {
    pub(crate) fn matches(&self, slot: &dyn ErasedSlot) -> bool {
        match *self {
            Matcher::Callback(callback) => slot.callback() == callback,
            Matcher::Owner(owner) => slot.owner() == Some(owner),
            Matcher::Exact { owner, callback } => slot.callback() == callback && slot.owner() == Some(owner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FUNCTION_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn count(value: &usize) { FUNCTION_CALLS.fetch_add(*value, Ordering::SeqCst); }

    struct Receiver {
        seen: Mutex<Vec<usize>>,
    }

    impl Receiver {
        fn record(&self, value: &usize) { self.seen.lock().unwrap().push(*value); }
    }

    #[test]
    fn test_function_slot_identity() {
        let slot = Slot::function(count as fn(&usize));
        assert_eq!(slot.kind(), SlotKind::Function);
        assert_eq!(slot.owner(), None);
        assert_eq!(slot.callback(), CallbackId::function(count as fn(&usize)));

        let before = FUNCTION_CALLS.load(Ordering::SeqCst);
        slot.invoke(&3);
        assert!(FUNCTION_CALLS.load(Ordering::SeqCst) >= before + 3);
    }

    #[test]
    fn test_method_slot_identity() {
        let receiver = Arc::new(Receiver { seen: Mutex::new(Vec::new()) });
        let slot = Slot::method(&receiver, Receiver::record);
        assert_eq!(slot.kind(), SlotKind::Method);
        assert_eq!(slot.owner(), Some(OwnerId::of(&receiver)));
        assert_eq!(slot.callback(), CallbackId::method(Receiver::record as fn(&Receiver, &usize)));

        slot.invoke(&7);
        slot.invoke(&8);
        assert_eq!(*receiver.seen.lock().unwrap(), [7, 8]);
    }

    #[test]
    fn test_closure_slot_identity() {
        let hits = Arc::new(AtomicUsize::new(0));
        let slot = {
            let hits = hits.clone();
            Slot::closure(move |value: &usize| {
                hits.fetch_add(*value, Ordering::SeqCst);
            })
        };
        assert_eq!(slot.kind(), SlotKind::Closure);
        // closure slots are owned by their own storage, which is also their default identity
        let owner = slot.owner().expect("closure slots have an owner");
        assert_eq!(owner.to_string(), slot.callback().to_string());

        slot.invoke(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_closure_with_supplied_identity() {
        let marker = 0u64;
        let (slot, owner) = Slot::closure_with(CallbackId::of(&marker), |_: &usize| {});
        assert_eq!(slot.callback(), CallbackId::of(&marker));
        assert_eq!(slot.owner(), Some(owner));
        assert!(Matcher::Owner(owner).matches(&slot));
    }

    #[test]
    fn test_matcher_modes() {
        let receiver = Arc::new(Receiver { seen: Mutex::new(Vec::new()) });
        let other = Arc::new(Receiver { seen: Mutex::new(Vec::new()) });
        let method = Slot::method(&receiver, Receiver::record);
        let function = Slot::function(count as fn(&usize));
        let method_id = CallbackId::method(Receiver::record as fn(&Receiver, &usize));

        assert!(Matcher::Callback(method_id).matches(&method));
        assert!(!Matcher::Callback(method_id).matches(&function));
        assert!(Matcher::Owner(OwnerId::of(&receiver)).matches(&method));
        assert!(!Matcher::Owner(OwnerId::of(&other)).matches(&method));
        assert!(!Matcher::Owner(OwnerId::of(&receiver)).matches(&function));
        assert!(Matcher::Exact { owner: OwnerId::of(&receiver), callback: method_id }.matches(&method));
        assert!(!Matcher::Exact { owner: OwnerId::of(&other), callback: method_id }.matches(&method));
    }
}
