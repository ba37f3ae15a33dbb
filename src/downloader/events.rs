// Subscriber lists for yt-dlp output lines and the stream-closed signal

use std::sync::{Arc, Mutex, MutexGuard};

/// Called with every stdout line, in arrival order
pub type LineHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Called once when stdout reaches EOF
pub type ClosedHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    output: Vec<LineHandler>,
    closed: Vec<ClosedHandler>,
}

/// Shared, cloneable handle to the two subscriber lists.
///
/// The client hands a clone to the process runner, which publishes through it;
/// callers and retrieval sessions edit the lists through the same handle.
/// Handlers are invoked outside the lock, so a handler may subscribe or
/// unsubscribe without deadlocking.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<Subscribers>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subs = self.lock();
        f.debug_struct("EventHub")
            .field("output", &subs.output.len())
            .field("closed", &subs.closed.len())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        // A handler panicking on another thread must not wedge the hub
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe_output(&self, handler: LineHandler) {
        self.lock().output.push(handler);
    }

    pub fn subscribe_closed(&self, handler: ClosedHandler) {
        self.lock().closed.push(handler);
    }

    pub fn output_subscribers(&self) -> Vec<LineHandler> {
        self.lock().output.clone()
    }

    pub fn closed_subscribers(&self) -> Vec<ClosedHandler> {
        self.lock().closed.clone()
    }

    /// Remove and return both lists, leaving them empty
    pub fn take_all(&self) -> (Vec<LineHandler>, Vec<ClosedHandler>) {
        let mut subs = self.lock();
        (
            std::mem::take(&mut subs.output),
            std::mem::take(&mut subs.closed),
        )
    }

    /// Replace both lists wholesale
    pub fn replace_all(&self, output: Vec<LineHandler>, closed: Vec<ClosedHandler>) {
        let mut subs = self.lock();
        subs.output = output;
        subs.closed = closed;
    }

    pub fn emit_line(&self, line: &str) {
        let handlers = self.output_subscribers();
        for handler in handlers {
            handler(line);
        }
    }

    pub fn emit_closed(&self) {
        let handlers = self.closed_subscribers();
        for handler in handlers {
            handler();
        }
    }
}
