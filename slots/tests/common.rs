#![allow(unused)]

use std::cell::RefCell;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use signal_slots::{Bindings, DispatchError, Emitter, EmitterConfig, Publisher, signals};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub struct Greeter {
    slots: Emitter<Greeter>,
}

signals! {
    Greeter {
        /// Carries the greeting text
        pub Hello(String);
        pub Ping(());
        pub Pong(());
    }
}

impl Greeter {
    pub fn new() -> Self { Self { slots: Emitter::new() } }

    pub fn with_config(config: EmitterConfig) -> Self { Self { slots: Emitter::with_config(config) } }

    pub fn hello(&self, message: &str) { self.slots.emit(Hello, message.to_string()) }

    pub fn ping(&self) { self.slots.emit(Ping, ()) }

    pub fn pong(&self) { self.slots.emit(Pong, ()) }

    /// Says hello and reports how many slots were dispatched
    pub fn try_hello(&self, message: &str) -> Result<usize, DispatchError> { self.slots.try_emit(Hello, message.to_string()) }

    pub fn try_ping(&self) -> Result<usize, DispatchError> { self.slots.try_emit(Ping, ()) }
}

impl Publisher for Greeter {
    fn bindings(&self) -> Bindings<'_, Self> { self.slots.bindings() }
}

thread_local! {
    static OUTPUT: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Stands in for stdout of slots running on the test thread
pub fn print(line: String) {
    println!("{line}");
    OUTPUT.with(|output| output.borrow_mut().push(line));
}

/// Drains everything printed on this thread so far
pub fn printed() -> Vec<String> { OUTPUT.with(|output| output.borrow_mut().drain(..).collect()) }

/// Generic watcher usable from any thread
pub fn watcher<T: Send + 'static>() -> (Arc<dyn Fn(T) + Send + Sync>, Box<dyn Fn() -> Vec<T> + Send + Sync>) {
    let changes = Arc::new(Mutex::new(Vec::new()));
    let accumulate = {
        let changes = changes.clone();
        Arc::new(move |value: T| {
            changes.lock().unwrap().push(value);
        })
    };

    let check = Box::new(move || {
        let changes: Vec<T> = changes.lock().unwrap().drain(..).collect();
        changes
    });

    (accumulate, check)
}
