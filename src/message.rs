//! Wire-level data model: messages, destinations, and wait modes.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// A tagged log message. Only [`LogMsg::Standard`] participates in
/// scheduling; [`LogMsg::OffTheRecord`] logs but never gates a round.
#[derive(Debug, Clone)]
pub enum LogMsg {
    Standard { lvl: i32, body: String },
    OffTheRecord { lvl: i32, body: String },
}

impl LogMsg {
    pub fn lvl(&self) -> i32 {
        match self {
            LogMsg::Standard { lvl, .. } | LogMsg::OffTheRecord { lvl, .. } => *lvl,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            LogMsg::Standard { body, .. } | LogMsg::OffTheRecord { body, .. } => body,
        }
    }

    pub fn is_off_the_record(&self) -> bool {
        matches!(self, LogMsg::OffTheRecord { .. })
    }
}

/// A terminal for formatted lines.
#[derive(Clone)]
pub enum OutDest {
    /// Emit as a runtime trace event, via `log`'s trace level.
    Events,
    /// A human-readable, newline-terminated line written to any
    /// `Write + Send` sink (a file, stderr, stdout, or a test-owned buffer).
    Handle(Arc<Mutex<dyn Write + Send>>),
    /// Append to the owning [`crate::Logger`]'s in-memory buffer, with no
    /// trailing newline.
    Memory,
}

impl OutDest {
    /// Convenience constructor for a destination backed by any `Write + Send` sink.
    pub fn handle(w: impl Write + Send + 'static) -> OutDest {
        OutDest::Handle(Arc::new(Mutex::new(w)))
    }
}

/// How the coordinator decides when a round of scheduling is complete.
#[derive(Clone)]
pub enum WaitMode {
    /// Non-blocking logging: producers never park.
    DontWait,
    /// A round completes when `parked + extra_idle() >= target`.
    WaitFixed {
        target: usize,
        extra_idle: Arc<dyn Fn() -> usize + Send + Sync>,
    },
    /// Reserved, unimplemented: selecting this at submission time is fatal.
    WaitDynamic,
}

impl WaitMode {
    /// A `WaitFixed` mode whose idle count is always zero; the common case
    /// for tests and for callers without a separate notion of idle workers.
    pub fn wait_fixed(target: usize) -> WaitMode {
        WaitMode::WaitFixed {
            target,
            extra_idle: Arc::new(|| 0),
        }
    }
}
