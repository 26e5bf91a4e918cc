//! Process-wide environment snapshot: `DEBUG` and `SILENCEOTR` are read once,
//! lazily, and memoized. Subsequent mutation of the environment is ignored.
//!
//! Grounded on the same pattern this codebase's `ShadowLogger` uses for its
//! own once-per-process configuration (`max_log_level`/`log_errors_to_stderr`
//! as `OnceCell`s, set once at `init` and read thereafter), generalized here
//! to a lazily-computed snapshot rather than one set explicitly by a caller.

use once_cell::sync::OnceCell;

/// Compile-time default debug level, used when `DEBUG` is unset, empty, or
/// `"0"`. With the `disabled` feature this is the only value `dbg_lvl` can
/// ever take.
pub const COMPILED_DEFAULT_DBG_LVL: i32 = 0;

/// Default range of message levels callers should use to select messages for
/// schedule-fuzz testing.
pub const DEFAULT_MEM_DBG_RANGE: (i32, i32) = (0, 10);

#[derive(Debug, Clone, Copy)]
pub struct EnvSnapshot {
    pub dbg_lvl: i32,
    pub silence_otr: bool,
}

static SNAPSHOT: OnceCell<EnvSnapshot> = OnceCell::new();

#[cfg(not(feature = "disabled"))]
fn parse_dbg_lvl() -> anyhow::Result<i32> {
    use anyhow::Context;

    match std::env::var("DEBUG") {
        Err(_) => Ok(COMPILED_DEFAULT_DBG_LVL),
        Ok(s) if s.is_empty() || s == "0" => Ok(COMPILED_DEFAULT_DBG_LVL),
        Ok(s) => s
            .trim()
            .parse::<i32>()
            .with_context(|| format!("DEBUG={s:?} is not a valid integer")),
    }
}

#[cfg(not(feature = "disabled"))]
fn parse_silence_otr() -> bool {
    match std::env::var("SILENCEOTR") {
        Ok(v) => !matches!(v.as_str(), "0" | "false" | "False"),
        Err(_) => false,
    }
}

/// Read and memoize `DEBUG`/`SILENCEOTR`. A malformed `DEBUG` is fatal, per
/// the error-handling design's "Parse" class. Emits a one-time diagnostic
/// when `DEBUG` successfully parses to a non-default value.
#[cfg(not(feature = "disabled"))]
pub fn snapshot() -> EnvSnapshot {
    *SNAPSHOT.get_or_init(|| {
        let dbg_lvl = parse_dbg_lvl().unwrap_or_else(|e| panic!("{e:#}"));
        if dbg_lvl != COMPILED_DEFAULT_DBG_LVL {
            log::info!("Responding to env var: DEBUG={dbg_lvl}");
            println!("Responding to env var: DEBUG={dbg_lvl}");
        }
        EnvSnapshot {
            dbg_lvl,
            silence_otr: parse_silence_otr(),
        }
    })
}

/// With the `disabled` feature, the level check trivially rejects every
/// message and the environment is never consulted.
#[cfg(feature = "disabled")]
pub fn snapshot() -> EnvSnapshot {
    *SNAPSHOT.get_or_init(|| EnvSnapshot {
        dbg_lvl: COMPILED_DEFAULT_DBG_LVL,
        silence_otr: false,
    })
}

#[cfg(all(test, not(feature = "disabled")))]
mod tests {
    use super::*;

    #[test]
    fn parses_unset_as_compiled_default() {
        // SAFETY: test-only; no other test in this process sets DEBUG before
        // this assertion runs concurrently with it touching the same var.
        let saved = std::env::var("DEBUG").ok();
        unsafe { std::env::remove_var("DEBUG") };
        assert_eq!(parse_dbg_lvl().unwrap(), COMPILED_DEFAULT_DBG_LVL);
        if let Some(saved) = saved {
            unsafe { std::env::set_var("DEBUG", saved) };
        }
    }

    #[test]
    fn silence_otr_accepts_false_variants() {
        for v in ["0", "false", "False"] {
            unsafe { std::env::set_var("SILENCEOTR", v) };
            assert!(!parse_silence_otr(), "{v:?} should mean not silenced");
        }
        unsafe { std::env::set_var("SILENCEOTR", "1") };
        assert!(parse_silence_otr());
        unsafe { std::env::remove_var("SILENCEOTR") };
    }
}
