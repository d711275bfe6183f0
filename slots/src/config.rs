/// The dispatch mode compiled into this build, selected with the `thread-safe`
/// and `parallel` cargo features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchMode {
    /// Registry guarded by a reader-writer lock
    pub thread_safe: bool,
    /// Each slot runs on its own detached worker thread
    pub parallel: bool,
}

impl DispatchMode {
    pub const CURRENT: DispatchMode = DispatchMode { thread_safe: cfg!(feature = "thread-safe"), parallel: cfg!(feature = "parallel") };
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.thread_safe, self.parallel) {
            (false, false) => f.write_str("sequential"),
            (false, true) => f.write_str("parallel"),
            (true, false) => f.write_str("thread-safe"),
            (true, true) => f.write_str("thread-safe+parallel"),
        }
    }
}

pub const DEFAULT_WORKER_NAME: &str = "slot-worker";

/// Runtime settings for an [`Emitter`](crate::Emitter).
///
/// Only parallel dispatch spawns workers, so in a sequential build these
/// settings are carried but have no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    worker_name: String,
    worker_stack_size: Option<usize>,
}

impl Default for EmitterConfig {
    fn default() -> Self { Self { worker_name: DEFAULT_WORKER_NAME.to_string(), worker_stack_size: None } }
}

impl EmitterConfig {
    pub fn new() -> Self { Self::default() }

    /// Thread name given to parallel workers
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// Stack size for parallel workers. `None` uses the platform default.
    pub fn with_worker_stack_size(mut self, size: Option<usize>) -> Self {
        self.worker_stack_size = size;
        self
    }

    pub fn worker_name(&self) -> &str { &self.worker_name }

    pub fn worker_stack_size(&self) -> Option<usize> { self.worker_stack_size }

    #[cfg(feature = "parallel")]
    pub(crate) fn worker(&self) -> std::thread::Builder {
        let builder = std::thread::Builder::new().name(self.worker_name.clone());
        match self.worker_stack_size {
            Some(size) => builder.stack_size(size),
            None => builder,
        }
    }
}
