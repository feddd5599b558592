//! Per-stage operation counters and wall-clock timing.
//!
//! A [`MetricsRecorder`] is started at the top of one analysis stage, fed
//! counts by the algorithm under measurement, and consumed by
//! [`MetricsRecorder::finish`] into an immutable [`Metrics`] snapshot that
//! travels with the stage's result. Nothing is shared between stages and
//! there is no reset: a fresh recorder is the only way to measure again.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

/// A named unit of algorithmic work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// A node entered by depth-first search.
    DfsVisit,
    /// An adjacency-list entry examined.
    EdgeTraversal,
    /// A strongly connected component closed and emitted.
    ComponentEmitted,
    /// An edge inserted into a condensation graph.
    CondensedEdge,
    /// An edge counted while computing in-degrees.
    DegreeCalculation,
    QueuePush,
    QueuePop,
    /// A node taken from the topological order for relaxation.
    RelaxationPass,
    /// A strict improvement applied to a distance.
    Relaxation,
}

impl Operation {
    /// Every operation, in report order.
    pub const ALL: [Self; 9] = [
        Self::DfsVisit,
        Self::EdgeTraversal,
        Self::ComponentEmitted,
        Self::CondensedEdge,
        Self::DegreeCalculation,
        Self::QueuePush,
        Self::QueuePop,
        Self::RelaxationPass,
        Self::Relaxation,
    ];

    /// Stable snake_case name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DfsVisit => "dfs_visit",
            Self::EdgeTraversal => "edge_traversal",
            Self::ComponentEmitted => "component_emitted",
            Self::CondensedEdge => "condensed_edge",
            Self::DegreeCalculation => "degree_calculation",
            Self::QueuePush => "queue_push",
            Self::QueuePop => "queue_pop",
            Self::RelaxationPass => "relaxation_pass",
            Self::Relaxation => "relaxation",
        }
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Live counters for one stage. Timing starts at construction.
#[derive(Debug)]
pub struct MetricsRecorder {
    started: Instant,
    operations: BTreeMap<Operation, u64>,
}

impl MetricsRecorder {
    /// Start measuring a new stage.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            operations: BTreeMap::new(),
        }
    }

    /// Count one occurrence of `op`.
    pub fn incr(&mut self, op: Operation) {
        self.add(op, 1);
    }

    /// Count `n` occurrences of `op`.
    pub fn add(&mut self, op: Operation, n: u64) {
        let slot = self.operations.entry(op).or_insert(0);
        *slot = slot.saturating_add(n);
    }

    /// Current count for `op` without stopping the clock.
    #[must_use]
    pub fn count(&self, op: Operation) -> u64 {
        self.operations.get(&op).copied().unwrap_or(0)
    }

    /// Stop the clock and freeze the counters.
    #[must_use]
    pub fn finish(self) -> Metrics {
        Metrics {
            elapsed: self.started.elapsed(),
            operations: self.operations,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Immutable metrics for one completed stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    #[serde(rename = "elapsed_ns", serialize_with = "serialize_nanos")]
    elapsed: Duration,
    operations: BTreeMap<Operation, u64>,
}

impl Metrics {
    /// Wall time between [`MetricsRecorder::start`] and [`MetricsRecorder::finish`].
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in nanoseconds, saturating at `u64::MAX`.
    #[must_use]
    pub fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.elapsed.as_nanos()).unwrap_or(u64::MAX)
    }

    /// Count recorded for `op` (0 if never counted).
    #[must_use]
    pub fn count(&self, op: Operation) -> u64 {
        self.operations.get(&op).copied().unwrap_or(0)
    }

    /// Sum of all counters.
    #[must_use]
    pub fn total_operations(&self) -> u64 {
        self.operations
            .values()
            .fold(0_u64, |acc, n| acc.saturating_add(*n))
    }

    /// Non-zero counters in report order.
    pub fn operations(&self) -> impl Iterator<Item = (Operation, u64)> + '_ {
        self.operations.iter().map(|(op, n)| (*op, *n))
    }

    /// Compact `name:count; name:count` form used in CSV cells.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (op, n) in self.operations() {
            if !out.is_empty() {
                out.push_str("; ");
            }
            let _ = write!(out, "{}:{n}", op.name());
        }
        out
    }

    /// Render as a small table for terminal output.
    #[must_use]
    pub fn display_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "elapsed: {}", format_duration(self.elapsed));
        if self.operations.is_empty() {
            out.push_str("no operations recorded\n");
            return out;
        }
        for (op, n) in self.operations() {
            let _ = writeln!(out, "  {:<20} {:>10}", op.name(), n);
        }
        out
    }
}

fn serialize_nanos<S: Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    u64::try_from(elapsed.as_nanos())
        .unwrap_or(u64::MAX)
        .serialize(s)
}

/// Format a duration with a unit suited to its magnitude.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        let secs = micros / 1_000_000;
        let millis = (micros % 1_000_000) / 1_000;
        format!("{secs}.{millis:03}s")
    } else if micros >= 1_000 {
        let millis = micros / 1_000;
        let rem = micros % 1_000;
        format!("{millis}.{rem:03}ms")
    } else if micros > 0 {
        format!("{micros}µs")
    } else {
        format!("{}ns", duration.as_nanos())
    }
}
