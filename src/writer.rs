//! The per check-in record and its single-shot release latch.
//!
//! The latch is a `Mutex` + `Condvar` pair, in the idiom of this codebase's
//! count-down latch (`scheduler::sync::count_down_latch`), simplified to the
//! one-shot case: a `Writer`'s latch is signaled exactly once and waited on
//! exactly once, so there's no need for the generation bookkeeping a reusable
//! latch requires.

use std::sync::{Arc, Condvar, Mutex};

use once_cell::sync::Lazy;

use crate::message::LogMsg;

/// A single-shot latch. `signal` must be called at most once; `wait` returns
/// exactly once, after `signal`, with no spurious wakeups.
#[derive(Clone)]
pub struct ReleaseHandle {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ReleaseHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    /// Block until `signal` is called. Returns immediately if already
    /// signaled.
    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut signaled = lock.lock().unwrap();
        while !*signaled {
            signaled = cvar.wait(signaled).unwrap();
        }
    }

    /// Wake the waiter. Must be called at most once per `Writer`; calling it
    /// twice is a bug (double-release), and is caught by a debug assertion.
    pub fn signal(&self) {
        let (lock, cvar) = &*self.inner;
        let mut signaled = lock.lock().unwrap();
        debug_assert!(!*signaled, "Writer released more than once");
        *signaled = true;
        cvar.notify_all();
    }
}

impl Default for ReleaseHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A process-wide, never-signaled latch used only as a structural
/// placeholder in `DontWait` mode. `DontWait` producers never call
/// [`ReleaseHandle::wait`] on it.
static DUMMY_LATCH: Lazy<ReleaseHandle> = Lazy::new(ReleaseHandle::new);

pub fn dummy_latch() -> ReleaseHandle {
    DUMMY_LATCH.clone()
}

/// The per-call record carrying the message, originator identity, and
/// release handle. Exists from the moment a producer publishes it to the
/// check-in queue until the coordinator signals its latch.
pub struct Writer {
    pub who: String,
    pub release: ReleaseHandle,
    pub msg: LogMsg,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn wait_returns_immediately_if_already_signaled() {
        let h = ReleaseHandle::new();
        h.signal();
        h.wait();
    }

    #[test]
    fn wait_blocks_until_signal() {
        let h = ReleaseHandle::new();
        let h2 = h.clone();
        let t = std::thread::spawn(move || {
            let start = Instant::now();
            h2.wait();
            start.elapsed()
        });
        std::thread::sleep(Duration::from_millis(100));
        h.signal();
        let waited = t.join().unwrap();
        assert!(waited >= Duration::from_millis(80));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "released more than once")]
    fn double_signal_panics_in_debug() {
        let h = ReleaseHandle::new();
        h.signal();
        h.signal();
    }
}
