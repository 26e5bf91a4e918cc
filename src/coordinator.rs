//! The coordinator loop: the single task that owns output and schedule
//! decisions. Drains the check-in queue, formats messages, dispatches to
//! destinations, and — in `WaitFixed` mode — implements the
//! quiescence/pick/release protocol that makes this facility double as a
//! deterministic-interleaving test harness.
//!
//! The overall shape (a dedicated thread draining an MPSC-style queue,
//! formatting records, and writing them to one or more sinks) follows
//! `ShadowLogger::logger_thread_fn`/`flush_records`; the scheduling half
//! (quiescence test, pick-and-proceed) has no direct analogue in this
//! codebase and is built fresh from the specification.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::backoff::Backoff;
use crate::env;
use crate::message::{LogMsg, OutDest, WaitMode};
use crate::queue::CheckinQueue;
use crate::writer::Writer;

/// Emit a spin diagnostic every this many scheduling-loop iterations. Not
/// load-bearing; tunable.
const SPIN_DIAGNOSTIC_INTERVAL: u64 = 500;

pub struct Coordinator {
    queue: Arc<CheckinQueue>,
    destinations: Vec<OutDest>,
    wait_mode: WaitMode,
    shutdown: Arc<AtomicBool>,
    memory_buffer: Arc<Mutex<VecDeque<String>>>,
    rng_seed: Option<u64>,
}

impl Coordinator {
    pub fn new(
        queue: Arc<CheckinQueue>,
        destinations: Vec<OutDest>,
        wait_mode: WaitMode,
        shutdown: Arc<AtomicBool>,
        memory_buffer: Arc<Mutex<VecDeque<String>>>,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            queue,
            destinations,
            wait_mode,
            shutdown,
            memory_buffer,
            rng_seed,
        }
    }

    pub fn run(self) {
        match &self.wait_mode {
            WaitMode::DontWait => self.run_dont_wait(),
            WaitMode::WaitFixed { .. } => self.run_wait_fixed(),
            // Submission under WaitDynamic is fatal at `Logger::log_on`, so
            // nothing but a shutdown command ever reaches this loop; behave
            // like the non-scheduling print loop so the coordinator can
            // still be joined cleanly.
            WaitMode::WaitDynamic => self.run_dont_wait(),
        }
    }

    /// DontWait mode: a plain print loop. No Writer is ever released here,
    /// since producers in this mode never park.
    fn run_dont_wait(&self) {
        let mut backoff = Backoff::default();
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                self.flush_drain();
                return;
            }
            match self.queue.try_pop() {
                None => backoff = backoff.step(),
                Some(w) => {
                    self.dispatch(&w.msg, "");
                    backoff = Backoff::new(backoff.cap());
                }
            }
        }
    }

    /// WaitFixed mode: the scheduling loop.
    fn run_wait_fixed(&self) {
        let (target, extra_idle) = match &self.wait_mode {
            WaitMode::WaitFixed { target, extra_idle } => (*target, Arc::clone(extra_idle)),
            _ => unreachable!("run_wait_fixed is only called for WaitFixed"),
        };

        let silence_otr = env::snapshot().silence_otr;
        let mut rng = match self.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        // Reverse-arrival order: newly-drained Writers are prepended.
        let mut waiting: Vec<Writer> = Vec::new();
        let mut iters: u64 = 0;
        let mut backoff = Backoff::default();

        loop {
            flush_stdout();

            if self.shutdown.load(Ordering::Acquire) {
                self.flush_drain();
                return;
            }

            // Drain-with-sideline: off-the-record messages are printed and
            // released immediately; standard messages join `waiting`.
            while let Some(w) = self.queue.try_pop() {
                match &w.msg {
                    LogMsg::Standard { .. } => waiting.insert(0, w),
                    LogMsg::OffTheRecord { .. } => {
                        if !silence_otr {
                            self.dispatch(&w.msg, "");
                        }
                        w.release.signal();
                    }
                }
            }

            let parked = waiting.len();
            let idle = (extra_idle)();

            if parked + idle >= target && parked > 0 {
                self.pick_and_proceed(&mut waiting, &mut rng);
                backoff = Backoff::new(backoff.cap());
                iters = 0;
                continue;
            }

            // Either not yet quiescent, or every worker is idle and there's
            // nothing parked to release (the "all idle, keep waiting"
            // branch: logically done, but this loop only terminates via
            // shutdown, so it just keeps spinning).
            backoff = backoff.step();
            iters += 1;

            if iters % SPIN_DIAGNOSTIC_INTERVAL == 0 {
                println!(
                    "logger has spun for {iters} iterations, {parked} checked-in, {idle} idling."
                );
            }
        }
    }

    /// Sort `waiting` by message body, pick a uniformly random index, remove
    /// and dispatch it, and release its latch.
    fn pick_and_proceed(&self, waiting: &mut Vec<Writer>, rng: &mut ChaCha8Rng) {
        waiting.sort_by(|a, b| a.msg.body().cmp(b.msg.body()));

        for pair in waiting.windows(2) {
            if pair[0].msg.body() == pair[1].msg.body() {
                panic!(
                    "ambiguous schedule: two concurrently-checked-in messages have equal \
                     bodies ({:?}); the caller's instrumentation must use distinct bodies to \
                     be reproducibly scheduled",
                    pair[0].msg.body()
                );
            }
        }

        let len = waiting.len();
        let pos = rng.gen_range(0..len);
        let picked = waiting.remove(pos);

        self.dispatch(&picked.msg, &format!("#{} of {len}: ", pos + 1));
        picked.release.signal();

        std::thread::yield_now();
    }

    /// Drain the remainder of the queue synchronously on shutdown. Does not
    /// release latches (there are none left to release once quiescence has
    /// held through to shutdown in a well-behaved caller, and any that do
    /// remain are off-the-record and were already released on arrival).
    fn flush_drain(&self) {
        while let Some(w) = self.queue.try_pop() {
            self.dispatch(&w.msg, "");
        }
    }

    fn dispatch(&self, msg: &LogMsg, extra: &str) {
        let line = format_line(msg, extra);
        for dest in &self.destinations {
            match dest {
                OutDest::Events => log::trace!("{}", line.trim_end_matches('\n')),
                OutDest::Handle(handle) => {
                    let mut h = handle.lock().unwrap();
                    let _ = h.write_all(line.as_bytes());
                }
                OutDest::Memory => {
                    let mut buf = self.memory_buffer.lock().unwrap();
                    buf.push_front(line.trim_end_matches('\n').to_string());
                }
            }
        }
    }
}

fn flush_stdout() {
    let _ = std::io::stdout().flush();
}

/// Standard lead is `|`, off-the-record lead is `\`. `extra` is the
/// contextual prefix ("#k of n: " for a scheduled pick, empty otherwise).
fn format_line(msg: &LogMsg, extra: &str) -> String {
    let lead = if msg.is_off_the_record() { '\\' } else { '|' };
    format!("{lead}{}| {extra}{}\n", msg.lvl(), msg.body())
}
