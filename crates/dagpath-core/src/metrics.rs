//! Counter/timer observers injected into each pipeline stage.
//!
//! Stages take `&mut M where M: Metrics + ?Sized` and report to it at stage
//! boundaries and inside their inner loops. Observers only record; nothing
//! an observer does can change a stage's result.
//!
//! [`TimingReport`] aggregates named durations across many runs (one sample
//! per stage per dataset) for the CLI `--timing` table.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use serde_json::json;

/// Observer capability set used by the pipeline stages.
pub trait Metrics {
    /// Record the start of the measured operation.
    fn start(&mut self);

    /// Record the end of the measured operation.
    fn stop(&mut self);

    /// Time between the last `start` and `stop`.
    fn elapsed(&self) -> Duration;

    /// Add one to the counter called `name`.
    fn increment(&mut self, name: &str);

    /// Current value of the counter called `name` (zero if never touched).
    fn counter(&self, name: &str) -> u64;

    /// Forget all counters and timings.
    fn reset(&mut self);

    /// Human-readable summary of the timer and every counter.
    fn summary(&self) -> String;
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn start(&mut self) {}

    fn stop(&mut self) {}

    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }

    fn increment(&mut self, _name: &str) {}

    fn counter(&self, _name: &str) -> u64 {
        0
    }

    fn reset(&mut self) {}

    fn summary(&self) -> String {
        String::new()
    }
}

/// In-memory counters plus a single start/stop timer.
#[derive(Debug, Clone, Default)]
pub struct SimpleMetrics {
    started: Option<Instant>,
    elapsed: Duration,
    counters: BTreeMap<String, u64>,
}

impl SimpleMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All counters, sorted by name.
    #[must_use]
    pub const fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    /// Render the timer and counters as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "elapsed_us": self.elapsed.as_micros(),
            "counters": self.counters,
        })
    }
}

impl Metrics for SimpleMetrics {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn increment(&mut self, name: &str) {
        if let Some(value) = self.counters.get_mut(name) {
            *value += 1;
        } else {
            self.counters.insert(name.to_string(), 1);
        }
    }

    fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    fn reset(&mut self) {
        self.started = None;
        self.elapsed = Duration::ZERO;
        self.counters.clear();
    }

    fn summary(&self) -> String {
        let millis = self.elapsed.as_secs_f64() * 1_000.0;
        let mut out = format!("Time: {millis:.3} ms\nCounters:\n");
        for (name, value) in &self.counters {
            let _ = writeln!(out, "  {name}: {value}");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Aggregated timing report
// ---------------------------------------------------------------------------

/// Aggregated timing report across instrumented stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingReport {
    /// Per-stage timing statistics, sorted by name.
    pub operations: Vec<OpTiming>,
}

/// Timing statistics for a single named stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpTiming {
    pub name: String,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    /// Number of samples collected for this stage.
    pub count: usize,
}

impl TimingReport {
    /// Group `(name, elapsed)` samples by name and compute percentiles.
    pub fn from_samples<I, S>(samples: I) -> Self
    where
        I: IntoIterator<Item = (S, Duration)>,
        S: Into<String>,
    {
        let mut grouped: BTreeMap<String, Vec<Duration>> = BTreeMap::new();
        for (name, elapsed) in samples {
            grouped.entry(name.into()).or_default().push(elapsed);
        }

        let operations = grouped
            .into_iter()
            .map(|(name, mut values)| {
                values.sort_unstable();
                OpTiming {
                    name,
                    p50: percentile(&values, 50),
                    p95: percentile(&values, 95),
                    p99: percentile(&values, 99),
                    count: values.len(),
                }
            })
            .collect();

        Self { operations }
    }

    /// Returns true when no timing samples were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Render the timing report as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let operations = self
            .operations
            .iter()
            .map(|op| {
                json!({
                    "name": op.name,
                    "count": op.count,
                    "p50_us": op.p50.as_micros(),
                    "p95_us": op.p95.as_micros(),
                    "p99_us": op.p99.as_micros(),
                })
            })
            .collect::<Vec<_>>();

        json!({ "operations": operations })
    }

    /// Render the timing report as a simple table for terminal output.
    #[must_use]
    pub fn display_table(&self) -> String {
        if self.operations.is_empty() {
            return "No timing samples recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("stage                        count      p50      p95      p99\n");
        out.push_str("--------------------------------------------------------------\n");

        for op in &self.operations {
            let _ = writeln!(
                out,
                "{:<28} {:>6} {:>8} {:>8} {:>8}",
                op.name,
                op.count,
                format_duration(op.p50),
                format_duration(op.p95),
                format_duration(op.p99)
            );
        }

        out
    }
}

fn percentile(sorted: &[Duration], pct: u32) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }

    let pct_usize = usize::try_from(pct).unwrap_or(100).min(100);
    let rank = pct_usize.saturating_mul(sorted.len()).saturating_add(99) / 100;
    let index = rank.saturating_sub(1).min(sorted.len().saturating_sub(1));

    sorted[index]
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        let secs = micros / 1_000_000;
        let millis = (micros % 1_000_000) / 1_000;
        format!("{secs}.{millis:03}s")
    } else if micros >= 1_000 {
        let millis = micros / 1_000;
        let rem = micros % 1_000;
        format!("{millis}.{rem:03}ms")
    } else {
        format!("{micros}µs")
    }
}

/// Returns true for `1`, `true`, `yes`, `on` (case-insensitive).
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("1")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("on")
}
