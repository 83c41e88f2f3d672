//! Contour tracing and geometric shape descriptors for segmented pixel
//! regions.
//!
//! The analysis runs in stages, each feeding the next:
//!
//! 1. A sparse pixel list becomes a dense offset-normalized [`PixelMask`].
//! 2. Moore-neighbor tracing walks the mask's outer contour
//!    ([`trace_boundary`]) and accumulates the chain-code perimeter.
//! 3. The traced boundary feeds the extremal-chord searches
//!    ([`longest_chord`] and [`longest_perpendicular_chord`]).
//! 4. [`Region`] ties the stages together with one-time lazy caching and
//!    assembles the serializable [`ShapeDescriptors`] record.
//!
//! Optional [`enhance`] stages prepare grayscale input before mask
//! extraction, and every long-running step reports elementary operations
//! through an injected [`ProgressSink`].
//!
//! The input is assumed to be one already-segmented region; this crate does
//! not split an image into objects.

pub mod chord;
pub mod direction;
pub mod enhance;
pub mod error;
pub mod mask;
pub mod progress;
pub mod region;
pub mod trace;

#[cfg(test)]
pub(crate) mod test_utils;

pub use chord::{longest_chord, longest_perpendicular_chord, Chord};
pub use direction::Direction;
pub use error::RegionError;
pub use mask::{PixelCoord, PixelMask};
pub use progress::{CountingSink, NullSink, ProgressSink};
pub use region::{AnalysisConfig, Region};
pub use trace::{trace_boundary, BoundaryTrace};

use serde::{Deserialize, Serialize};

/// Endpoints and measurements of an extremal chord, in input-frame
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChordReport {
    /// First endpoint as [x, y].
    pub point_a: [i32; 2],
    /// Second endpoint as [x, y].
    pub point_b: [i32; 2],
    /// Euclidean length in pixels.
    pub distance: f64,
    /// Angle of `point_b - point_a` against the +x axis, radians.
    pub orientation: f64,
}

impl From<&Chord> for ChordReport {
    fn from(chord: &Chord) -> Self {
        Self {
            point_a: [chord.a.x, chord.a.y],
            point_b: [chord.b.x, chord.b.y],
            distance: chord.distance,
            orientation: chord.orientation,
        }
    }
}

/// Complete descriptor record for one region, as assembled by
/// [`Region::descriptors`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptors {
    /// Foreground pixel count.
    pub area: u64,
    /// Chain-code boundary length; 0 for a single-pixel region.
    pub perimeter: f64,
    /// Perimeter squared over 4*pi*area.
    pub compactness: f64,
    /// Inverse compactness. Absent when the perimeter is 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roundness: Option<f64>,
    pub longest_chord: ChordReport,
    pub longest_perpendicular_chord: ChordReport,
    /// Longest over longest-perpendicular chord length. Absent when the
    /// perpendicular chord is degenerate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<f64>,
    /// Cell count of the bounding-box grid.
    pub bounding_box_area: u64,
    /// Area over bounding-box area.
    pub rectangularity: f64,
    /// Longest bounding-box side over shortest.
    pub elongation: f64,
    /// Area over the squared half short side.
    pub elongation2: f64,
}
