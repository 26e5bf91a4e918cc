//! The public façade: construction, level filtering, the four `log_*`
//! submission entry points, `flush_logs`, and `close_it`.
//!
//! Grounded on `ShadowLogger`'s split between a cheap, cloneable front end
//! (here, an `Arc<Logger>`) and a single coordinator thread that owns all
//! output — including its join-on-drop-equivalent shutdown path, here named
//! `close_it` to match the submission-side `log_on` naming.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::coordinator::Coordinator;
use crate::message::{LogMsg, OutDest, WaitMode};
use crate::queue::CheckinQueue;
use crate::writer::{dummy_latch, ReleaseHandle, Writer};

/// A thread-safe debug logger that doubles as a deterministic-interleaving
/// scheduler. Cheap to clone via `Arc`; all instances sharing one `Arc`
/// share one coordinator thread, one queue, and one memory buffer.
pub struct Logger {
    min_lvl: i32,
    max_lvl: i32,
    wait_mode: WaitMode,
    queue: Arc<CheckinQueue>,
    shutdown: Arc<AtomicBool>,
    memory_buffer: Arc<Mutex<VecDeque<String>>>,
    coordinator_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Logger {
    /// Construct a logger and spawn its coordinator thread. The RNG used by
    /// `WaitFixed`'s pick-and-proceed step seeds from entropy.
    pub fn new(min_lvl: i32, max_lvl: i32, destinations: Vec<OutDest>, wait_mode: WaitMode) -> Arc<Logger> {
        Self::with_rng_seed(min_lvl, max_lvl, destinations, wait_mode, None)
    }

    /// As [`Logger::new`], but with an explicit RNG seed so `WaitFixed`'s
    /// scheduling picks are reproducible across runs.
    pub fn with_rng_seed(
        min_lvl: i32,
        max_lvl: i32,
        destinations: Vec<OutDest>,
        wait_mode: WaitMode,
        rng_seed: Option<u64>,
    ) -> Arc<Logger> {
        let queue = Arc::new(CheckinQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let memory_buffer = Arc::new(Mutex::new(VecDeque::new()));

        let coordinator = Coordinator::new(
            Arc::clone(&queue),
            destinations,
            wait_mode.clone(),
            Arc::clone(&shutdown),
            Arc::clone(&memory_buffer),
            rng_seed,
        );

        let handle = std::thread::Builder::new()
            .name("schedlog-coordinator".to_string())
            .spawn(move || coordinator.run())
            .expect("failed to spawn coordinator thread");

        Arc::new(Logger {
            min_lvl,
            max_lvl,
            wait_mode,
            queue,
            shutdown,
            memory_buffer,
            coordinator_thread: Mutex::new(Some(handle)),
        })
    }

    #[cfg(not(feature = "disabled"))]
    fn accepts(&self, lvl: i32) -> bool {
        lvl >= self.min_lvl && lvl <= self.max_lvl
    }

    /// Submit a message, blocking (in `WaitFixed` mode) until the
    /// coordinator has scheduled and released it. Selecting `WaitDynamic`
    /// is fatal: the mode is reserved but not implemented.
    #[cfg(feature = "disabled")]
    pub fn log_on(&self, _msg: LogMsg) {}

    #[cfg(not(feature = "disabled"))]
    pub fn log_on(&self, msg: LogMsg) {
        if !self.accepts(msg.lvl()) {
            return;
        }

        // Submitting after close_it has returned is undefined behavior per
        // the facility's lifecycle rules; dropping silently is preferred
        // over enqueuing onto a queue nothing will ever drain again, which
        // would otherwise strand a WaitFixed caller on `release.wait()`
        // forever.
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        match &self.wait_mode {
            WaitMode::DontWait => {
                self.queue.push(Writer {
                    who: thread_name(),
                    release: dummy_latch(),
                    msg,
                });
            }
            WaitMode::WaitFixed { .. } => {
                let release = ReleaseHandle::new();
                self.queue.push(Writer {
                    who: thread_name(),
                    release: release.clone(),
                    msg,
                });
                release.wait();
            }
            WaitMode::WaitDynamic => {
                unimplemented!(
                    "WaitDynamic is reserved for a future release; select DontWait or \
                     WaitFixed"
                );
            }
        }
    }

    pub fn log_str_ln(&self, lvl: i32, body: &str) {
        self.log_on(LogMsg::Standard {
            lvl,
            body: body.to_string(),
        });
    }

    pub fn log_text_ln(&self, lvl: i32, body: String) {
        self.log_on(LogMsg::Standard { lvl, body });
    }

    pub fn log_byte_string_ln(&self, lvl: i32, body: &[u8]) {
        self.log_on(LogMsg::Standard {
            lvl,
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    pub fn log_off_the_record(&self, lvl: i32, body: &str) {
        self.log_on(LogMsg::OffTheRecord {
            lvl,
            body: body.to_string(),
        });
    }

    /// Drain the in-memory buffer and return its contents in chronological
    /// order. The buffer itself is built newest-first (each dispatched line
    /// is pushed to the front), so draining and returning it as-is yields
    /// chronological order directly.
    pub fn flush_logs(&self) -> Vec<String> {
        let mut buf = self.memory_buffer.lock().unwrap();
        let drained: Vec<String> = std::mem::take(&mut *buf).into();
        drained.into_iter().rev().collect()
    }

    /// Signal the coordinator to shut down, flush-drain any remaining
    /// check-ins, and join its thread. Idempotent: later calls find no
    /// thread to join and return immediately. If the coordinator panicked,
    /// its panic is logged and re-raised here.
    pub fn close_it(&self) {
        self.shutdown.store(true, Ordering::Release);

        let handle = self.coordinator_thread.lock().unwrap().take();
        if let Some(handle) = handle {
            if let Err(payload) = handle.join() {
                log::error!("coordinator thread panicked: {}", panic_message(&payload));
                std::panic::resume_unwind(payload);
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close_it();
    }
}

fn thread_name() -> String {
    std::thread::current()
        .name()
        .unwrap_or("<unnamed>")
        .to_string()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
