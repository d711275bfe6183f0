/*!
Signal/slot dispatch for objects that publish events to in-process subscribers.

A publisher type declares its signals with [`signals!`], keeps an [`Emitter`] in a
private field, and fires signals from its own methods with [`Emitter::emit`].
Receivers bind free functions, methods on an owner object, or closures through
the [`Publisher`] trait, and unbind them again by identity. The trait only hands
out a [`Bindings`] view, so receivers cannot fire a publisher's signals.

# Slots
- function: `fn(&Args)`, identified by its address
- method: an `Arc<T>` owner plus `fn(&T, &Args)`, identified by owner and method
- closure: any `Fn(&Args)`, identified by its own storage or by a caller-chosen [`CallbackId`]

Unbinding matches on the callback identity, the owner, or both, and removes every
matching slot from every signal of that emitter. Unbinding something that is not
bound does nothing.

# Modes
Two cargo features select how an emitter behaves. They are build-time only.
- `thread-safe`: the registry sits behind a reader-writer lock. Emit holds it
  shared while slots run, bind/unbind take it exclusively.
- `parallel`: every slot of an emit runs on its own detached worker thread with a
  clone of the arguments, and emit returns without waiting.

Without `thread-safe` an emitter is confined to one thread, and a slot may bind
or unbind on the emitter that is invoking it: slots appended during an emit are
reached by that emit, slots removed during an emit are skipped if not reached yet.

# Basic usage

```rust
use signal_slots::{Bindings, Emitter, Publisher, signals};

pub struct Door {
    slots: Emitter<Door>,
}

signals! {
    Door {
        pub Opened(String);
    }
}

impl Door {
    pub fn open(&self, who: &str) { self.slots.emit(Opened, who.to_string()) }
}

impl Publisher for Door {
    fn bindings(&self) -> Bindings<'_, Self> { self.slots.bindings() }
}

fn greet(who: &String) { println!("welcome, {who}"); }

let door = Door { slots: Emitter::new() };
door.bind(Opened, greet);
let id = door.bind_closure(Opened, |who: &String| println!("{who} came in"));
door.open("Buffy");
// welcome, Buffy
// Buffy came in

door.unbind_function(greet as fn(&String));
door.unbind_callback(id);
door.open("Willow"); // nothing bound anymore
```
*/

mod cell;
mod config;
mod emitter;
mod error;
mod ident;
mod registry;
mod signal;
mod slot;

pub use config::*;
pub use emitter::*;
pub use error::*;
pub use ident::*;
pub use signal::*;
pub use slot::{Matcher, SlotKind};
