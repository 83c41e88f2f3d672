//! Progress reporting for the long-running analysis steps.

use std::sync::atomic::{AtomicU64, Ordering};

/// Receives one `step` call per elementary unit of work: a candidate probe
/// while tracing, a pairwise comparison in the longest-chord search, a
/// pixel or bucket visit in the perpendicular search, a kernel multiply or
/// pixel visit in an enhancement stage.
///
/// Implementations must tolerate concurrent calls; analyses running in
/// parallel may share one sink.
///
/// # Example
///
/// ```
/// use shapetrace::ProgressSink;
///
/// struct Tick;
///
/// impl ProgressSink for Tick {
///     fn step(&self) {}
/// }
/// ```
pub trait ProgressSink: Send + Sync {
    fn step(&self);
}

/// Sink that discards every step.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    #[inline]
    fn step(&self) {}
}

/// Sink that counts steps with an atomic counter, safe to share across
/// threads.
#[derive(Debug, Default)]
pub struct CountingSink {
    count: AtomicU64,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps observed so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl ProgressSink for CountingSink {
    #[inline]
    fn step(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Exact comparison count of the longest-chord search over `n` boundary
/// pixels.
pub fn longest_chord_work(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}

/// Step ceiling of the perpendicular-chord search over `n` boundary pixels:
/// `n` rotations plus at most `n` bucket visits. Exact when every pixel
/// lands in its own bucket.
pub fn perpendicular_chord_work(n: usize) -> u64 {
    2 * n as u64
}

/// Probe estimate for tracing a mask with `boundary_candidates` contour
/// candidates (see `PixelMask::boundary_candidate_count`): up to six probes
/// per step, and spur walks pass a pixel from both sides. Sized for
/// progress displays; heavily branched regions can exceed it.
pub fn trace_work_estimate(boundary_candidates: usize) -> u64 {
    12 * boundary_candidates as u64
}
