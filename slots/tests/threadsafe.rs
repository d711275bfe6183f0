#![cfg(feature = "thread-safe")]

mod common;
use common::{Greeter, Hello, Ping};
use signal_slots::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, mpsc};
use std::time::Duration;
use std::thread;

const THREADS: usize = 8;
const CYCLES: usize = 1000;

#[test]
fn test_concurrent_bind_emit_unbind() {
    let greeter = Arc::new(Greeter::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let greeter = greeter.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let fired = Arc::new(AtomicUsize::new(0));
                barrier.wait();
                for _ in 0..CYCLES {
                    let id = {
                        let fired = fired.clone();
                        greeter.bind_closure(Ping, move |_: &()| {
                            fired.fetch_add(1, Ordering::SeqCst);
                        })
                    };
                    greeter.ping();
                    assert_eq!(greeter.unbind_callback(id), 1);
                }
                fired
            })
        })
        .collect();

    for worker in workers {
        let fired = worker.join().unwrap();
        // every cycle emits while its own closure is bound
        #[cfg(not(feature = "parallel"))]
        assert!(fired.load(Ordering::SeqCst) >= CYCLES);
        let _ = fired;
    }

    assert!(greeter.bindings().is_empty());
    assert_eq!(greeter.bindings().signal_count(), 0);
}

#[test]
fn test_emitter_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Emitter<Greeter>>();
    assert_send_sync::<Greeter>();

    let greeter = Arc::new(Greeter::new());
    let (tx, rx) = mpsc::channel::<String>();
    greeter.bind_closure(Hello, move |message: &String| tx.send(message.clone()).unwrap());

    let sender = {
        let greeter = greeter.clone();
        thread::spawn(move || greeter.hello("from another thread"))
    };
    sender.join().unwrap();

    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "from another thread");
}

#[test]
fn test_unbind_from_other_thread() {
    let greeter = Arc::new(Greeter::new());
    let fired = Arc::new(AtomicUsize::new(0));
    let id = {
        let fired = fired.clone();
        greeter.bind_closure(Ping, move |_: &()| {
            fired.fetch_add(1, Ordering::SeqCst);
        })
    };

    let remover = {
        let greeter = greeter.clone();
        thread::spawn(move || greeter.unbind_callback(id))
    };
    assert_eq!(remover.join().unwrap(), 1);

    assert_eq!(greeter.try_ping().unwrap(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
