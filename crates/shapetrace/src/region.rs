//! One analyzed pixel region: validation at construction, lazily computed
//! trace and chord results, and the derived shape descriptors.

use std::cell::OnceCell;
use std::sync::Arc;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::chord::{longest_chord, longest_perpendicular_chord, Chord};
use crate::error::RegionError;
use crate::mask::{PixelCoord, PixelMask};
use crate::progress::ProgressSink;
use crate::trace::{trace_boundary, BoundaryTrace};
use crate::{ChordReport, ShapeDescriptors};

/// Controls for region validation and chord analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reject input that does not form a single 8-connected region. When
    /// disabled, tracing covers only the component containing the scan-start
    /// pixel while area still counts every foreground cell.
    pub require_connected: bool,
    /// Bucket width in pixels when grouping rotated boundary pixels by
    /// chord-axis coordinate in the perpendicular-chord search.
    pub chord_axis_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { require_connected: true, chord_axis_tolerance: 0.5 }
    }
}

/// A single connected foreground region and its shape descriptors.
///
/// The mask is built and validated once at construction. The boundary
/// trace, the two extremal chords and the descriptor record are computed on
/// first access and cached for the region's lifetime; repeated reads return
/// bit-identical values.
pub struct Region {
    mask: PixelMask,
    config: AnalysisConfig,
    progress: Option<Arc<dyn ProgressSink>>,
    trace: OnceCell<BoundaryTrace>,
    longest: OnceCell<Chord>,
    perpendicular: OnceCell<Chord>,
    report: OnceCell<ShapeDescriptors>,
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("mask", &self.mask)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Region {
    /// Builds a region from pixel coordinates with the default
    /// configuration.
    pub fn from_pixels(pixels: &[PixelCoord]) -> Result<Self, RegionError> {
        Self::with_config(pixels, AnalysisConfig::default())
    }

    /// Builds a region from pixel coordinates, validating per `config`.
    pub fn with_config(pixels: &[PixelCoord], config: AnalysisConfig) -> Result<Self, RegionError> {
        let mask = PixelMask::from_pixels(pixels)?;
        Self::from_mask(mask, config)
    }

    /// Builds a region from a grayscale mask image: every pixel with value
    /// at least `cutoff` is foreground. The image is not segmented; the
    /// whole foreground is taken as one region and validated per `config`.
    pub fn from_gray_image(
        img: &GrayImage,
        cutoff: u8,
        config: AnalysisConfig,
    ) -> Result<Self, RegionError> {
        let mask = PixelMask::from_gray_image(img, cutoff)?;
        Self::from_mask(mask, config)
    }

    fn from_mask(mask: PixelMask, config: AnalysisConfig) -> Result<Self, RegionError> {
        if config.require_connected {
            let components = mask.connected_components();
            if components != 1 {
                return Err(RegionError::DisconnectedInput { components });
            }
        }
        Ok(Self {
            mask,
            config,
            progress: None,
            trace: OnceCell::new(),
            longest: OnceCell::new(),
            perpendicular: OnceCell::new(),
            report: OnceCell::new(),
        })
    }

    /// Attaches a progress sink. It receives one step per elementary
    /// operation of the lazy computations: candidate probes while tracing,
    /// pairwise comparisons and pixel/bucket visits in the chord searches.
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// The underlying mask.
    pub fn mask(&self) -> &PixelMask {
        &self.mask
    }

    /// Traced boundary, computed on first call.
    pub fn boundary(&self) -> &BoundaryTrace {
        self.trace.get_or_init(|| trace_boundary(&self.mask, self.progress.as_deref()))
    }

    /// Longest chord over the boundary pixels, computed on first call.
    pub fn longest_chord(&self) -> &Chord {
        self.longest.get_or_init(|| {
            longest_chord(&self.boundary().pixels, self.progress.as_deref())
        })
    }

    /// Longest chord perpendicular to the longest chord, computed on first
    /// call.
    pub fn longest_perpendicular_chord(&self) -> &Chord {
        self.perpendicular.get_or_init(|| {
            let axis = *self.longest_chord();
            longest_perpendicular_chord(
                &self.boundary().pixels,
                &axis,
                self.config.chord_axis_tolerance,
                self.progress.as_deref(),
            )
        })
    }

    /// Foreground pixel count.
    pub fn area(&self) -> u64 {
        self.mask.foreground_count() as u64
    }

    /// Chain-code boundary length; 0 for a single-pixel region.
    pub fn perimeter(&self) -> f64 {
        self.boundary().perimeter
    }

    /// Perimeter squared over 4*pi*area. Grows as the shape departs from a
    /// disc.
    pub fn compactness(&self) -> f64 {
        let p = self.perimeter();
        (p * p) / (4.0 * std::f64::consts::PI * self.area() as f64)
    }

    /// Inverse compactness. Undefined when the perimeter is 0.
    pub fn roundness(&self) -> Result<f64, RegionError> {
        let compactness = self.compactness();
        if compactness == 0.0 {
            return Err(RegionError::UndefinedRatio { descriptor: "roundness" });
        }
        Ok(1.0 / compactness)
    }

    /// Longest over longest-perpendicular chord length. Undefined when the
    /// perpendicular chord is degenerate.
    pub fn eccentricity(&self) -> Result<f64, RegionError> {
        let width = self.longest_perpendicular_chord().distance;
        if width == 0.0 {
            return Err(RegionError::UndefinedRatio { descriptor: "eccentricity" });
        }
        Ok(self.longest_chord().distance / width)
    }

    /// Cell count of the bounding-box grid.
    pub fn bounding_box_area(&self) -> u64 {
        (self.mask.width() * self.mask.height()) as u64
    }

    /// Area over bounding-box area, in (0, 1].
    pub fn rectangularity(&self) -> f64 {
        self.area() as f64 / self.bounding_box_area() as f64
    }

    /// Longest bounding-box side over shortest, at least 1.
    pub fn elongation(&self) -> f64 {
        let (long, short) = self.box_sides();
        long / short
    }

    /// Area over the squared half short side; an ellipse-style elongation
    /// heuristic.
    pub fn elongation2(&self) -> f64 {
        let (_, short) = self.box_sides();
        let half = short / 2.0;
        self.area() as f64 / (half * half)
    }

    #[inline]
    fn box_sides(&self) -> (f64, f64) {
        let w = self.mask.width() as f64;
        let h = self.mask.height() as f64;
        if w >= h {
            (w, h)
        } else {
            (h, w)
        }
    }

    /// The full descriptor record, assembled once and cached. Ratio
    /// descriptors that are undefined for this region are `None`.
    pub fn descriptors(&self) -> &ShapeDescriptors {
        self.report.get_or_init(|| {
            let record = ShapeDescriptors {
                area: self.area(),
                perimeter: self.perimeter(),
                compactness: self.compactness(),
                roundness: self.roundness().ok(),
                longest_chord: ChordReport::from(self.longest_chord()),
                longest_perpendicular_chord: ChordReport::from(self.longest_perpendicular_chord()),
                eccentricity: self.eccentricity().ok(),
                bounding_box_area: self.bounding_box_area(),
                rectangularity: self.rectangularity(),
                elongation: self.elongation(),
                elongation2: self.elongation2(),
            };
            tracing::debug!(
                "descriptors ready: area {}, perimeter {:.3}, compactness {:.3}",
                record.area,
                record.perimeter,
                record.compactness
            );
            record
        })
    }
}
