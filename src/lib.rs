//! A thread-safe debug-logging facility that doubles as a
//! deterministic-interleaving concurrency test harness.
//!
//! The moving parts:
//!
//! - [`backoff`]: the exponential delay the coordinator uses while idle.
//! - [`message`]: the wire-level data model (`LogMsg`, `OutDest`, `WaitMode`).
//! - [`writer`]: a single check-in record and its one-shot release latch.
//! - [`queue`]: the unbounded multi-producer check-in queue.
//! - [`env`]: the process-wide `DEBUG`/`SILENCEOTR` environment snapshot.
//! - [`coordinator`]: the single thread that owns output and scheduling.
//! - [`logger`]: the public façade ([`Logger`]) that producers call into.
//!
//! In `DontWait` mode, submissions are fire-and-forget: the coordinator
//! drains and prints them in the background. In `WaitFixed` mode, a
//! submission blocks until enough concurrent callers have checked in, at
//! which point the coordinator picks one uniformly at random (seeded, for
//! reproducibility) and releases it — turning ordinary log calls into
//! scheduling checkpoints usable for fuzzing thread interleavings.

pub mod backoff;
pub mod coordinator;
pub mod env;
pub mod logger;
pub mod message;
pub mod queue;
pub mod writer;

pub use env::{DEFAULT_MEM_DBG_RANGE, EnvSnapshot};
pub use logger::Logger;
pub use message::{LogMsg, OutDest, WaitMode};
