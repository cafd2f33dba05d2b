use anyhow::{bail, Context, Result};
use guest::{fastfib, fib, MAX_EXACT_INDEX};
use serde::Serialize;
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, trace};

pub const PROGRAM: &str = "fib-native";

/// Number of terms printed when `FIB_ARG` is not set.
pub const DEFAULT_COUNT: u32 = 30;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Stats {
    pub program: &'static str,
    pub n: u32,
    pub last: Option<i64>,
    pub overflowed: bool,
    pub setup_secs: f32,
    pub compute_secs: f32,
    pub verify_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub count: u32,
    pub stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            stats: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default = Self::default();
        Ok(Self {
            count: env_or("FIB_ARG", default.count)?,
            stats: env_or("FIB_STATS", default.stats)?,
        })
    }
}

/// Reads and parses `var`, falling back to `def` when it is unset.
pub fn env_or<T: FromStr>(var: &str, def: T) -> Result<T>
where
    <T as FromStr>::Err: Display,
{
    match std::env::var(var) {
        Ok(s) => s
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Could not parse {var}={s:?}")),
        Err(std::env::VarError::NotPresent) => Ok(def),
        Err(e) => Err(e).with_context(|| format!("Could not read {var}")),
    }
}

/// What [`write_sequence`] reports back once every term is out.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Written {
    pub last: Option<i64>,
    pub compute_secs: f32,
    pub verify_secs: f32,
}

/// Checks one term against the matrix method.
///
/// Both sides wrap modulo 2^64, so they agree past `MAX_EXACT_INDEX` too.
pub fn verify_term(i: i64, term: i64) -> Result<()> {
    let expected = fastfib(i as u64) as i64;
    if term != expected {
        bail!("fib({i}) = {term}, but fastfib({i}) = {expected}");
    }
    Ok(())
}

/// Writes the header and the first `count` terms to `out`.
///
/// Each term is computed, verified and written before the next one, so no
/// count needs more than constant memory.
pub fn write_sequence<W: Write>(out: &mut W, count: u32) -> Result<Written> {
    let mut written = Written::default();
    writeln!(out, "The first {count} Fibonacci numbers are:")
        .context("Could not write the sequence")?;

    for i in 0..i64::from(count) {
        let it = Instant::now();
        let term = fib(i);
        written.compute_secs += it.elapsed().as_secs_f32();
        trace!("fib({i}) = {term}");

        let it = Instant::now();
        verify_term(i, term)?;
        written.verify_secs += it.elapsed().as_secs_f32();

        write!(out, "{term} ").context("Could not write the sequence")?;
        written.last = Some(term);
    }

    writeln!(out).context("Could not write the sequence")?;
    debug!("verified {count} terms");
    Ok(written)
}

/// Runs the setup phase, then streams the terms to `out` while timing the
/// compute and verify phases.
pub fn run<W: Write>(config: Config, out: &mut W) -> Result<Stats> {
    // setup
    let it = Instant::now();
    let n = config.count;
    info!("computing the first {n} Fibonacci numbers");
    let setup_secs = it.elapsed().as_secs_f32();

    // compute + verify
    let written = write_sequence(out, n)?;
    out.flush()?;
    info!("compute took {}s", written.compute_secs);
    info!("verify took {}s", written.verify_secs);

    Ok(Stats {
        program: PROGRAM,
        n,
        last: written.last,
        overflowed: i64::from(n) - 1 > MAX_EXACT_INDEX,
        setup_secs,
        compute_secs: written.compute_secs,
        verify_secs: written.verify_secs,
    })
}
