use std::any::TypeId;

use crate::ident::SignalId;

/// A signal declared by a publisher type.
///
/// Implementors are zero-sized markers, one per declaration. The marker type is
/// what gives the signal its identity, so two signals with the same argument type
/// are still distinct. Use the [`signals!`](crate::signals) macro rather than
/// implementing this by hand.
pub trait Signal: 'static {
    /// The only type allowed to emit this signal
    type Publisher: ?Sized + 'static;
    /// Payload handed to every slot. Parallel dispatch clones it once per slot.
    type Args: Clone + Send + 'static;
    /// Declared name, used in logs
    const NAME: &'static str;

    fn id() -> SignalId { SignalId::new(TypeId::of::<Self>(), Self::NAME) }
}

/// Declares the signals of a publisher type.
///
/// ```rust
/// use signal_slots::signals;
///
/// pub struct Greeter;
///
/// signals! {
///     Greeter {
///         /// Someone said hello
///         pub Hello(String);
///         pub Goodbye(());
///     }
/// }
///
/// use signal_slots::Signal;
/// assert_eq!(Hello::NAME, "Greeter::Hello");
/// assert_ne!(Hello::id(), Goodbye::id());
/// ```
#[macro_export]
macro_rules! signals {
    ($publisher:ty { $( $(#[$meta:meta])* $vis:vis $name:ident ( $args:ty ) ; )* }) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            $vis struct $name;

            impl $crate::Signal for $name {
                type Publisher = $publisher;
                type Args = $args;
                const NAME: &'static str = concat!(stringify!($publisher), "::", stringify!($name));
            }
        )*
    };
}
