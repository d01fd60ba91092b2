//! Tracer Module
//!
//! Logging capability injected into the store and its collaborators.
//! Nothing in the crate logs through an ambient global; every component is
//! handed a `Tracer` when it is built.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

/// Shared handle to a tracer.
pub type SharedTracer = Arc<dyn Tracer>;

// == Tracer Trait ==
/// Sink for the structured events emitted by the store and HTTP layer.
pub trait Tracer: Send + Sync {
    fn log_info(&self, message: &str);
    fn log_error(&self, message: &str);
    fn log_warning(&self, message: &str);
    /// Flushes and releases whatever the sink holds.
    fn close(&self) {}
}

// == Tracing Tracer ==
/// Production tracer forwarding to `tracing`, tagged with a component name.
#[derive(Debug, Clone)]
pub struct TracingTracer {
    component: &'static str,
}

impl TracingTracer {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Convenience constructor returning a shared handle.
    pub fn shared(component: &'static str) -> SharedTracer {
        Arc::new(Self::new(component))
    }
}

impl Tracer for TracingTracer {
    fn log_info(&self, message: &str) {
        info!(component = self.component, "{}", message);
    }

    fn log_error(&self, message: &str) {
        error!(component = self.component, "{}", message);
    }

    fn log_warning(&self, message: &str) {
        warn!(component = self.component, "{}", message);
    }

    fn close(&self) {
        info!(component = self.component, "tracer closed");
    }
}

// == Null Tracer ==
/// Discards everything.
#[derive(Debug, Clone, Default)]
pub struct NullTracer;

impl NullTracer {
    pub fn shared() -> SharedTracer {
        Arc::new(Self)
    }
}

impl Tracer for NullTracer {
    fn log_info(&self, _message: &str) {}
    fn log_error(&self, _message: &str) {}
    fn log_warning(&self, _message: &str) {}
}

// == Recording Tracer ==
/// Severity of a recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    Warning,
}

/// Keeps every line in memory so tests can assert on what was logged.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    lines: Mutex<Vec<(Level, String)>>,
    closed: AtomicBool,
}

impl RecordingTracer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of all recorded lines.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    /// Returns true if any line at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn record(&self, level: Level, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

impl Tracer for RecordingTracer {
    fn log_info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn log_error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn log_warning(&self, message: &str) {
        self.record(Level::Warning, message);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
