//! Extremal chords over a traced boundary: the longest chord and the
//! longest chord perpendicular to it.

use std::collections::BTreeMap;

use nalgebra::{Point2, Rotation2};

use crate::mask::PixelCoord;
use crate::progress::ProgressSink;

/// A segment between two boundary pixels, in input-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    pub a: PixelCoord,
    pub b: PixelCoord,
    /// Euclidean length in pixels.
    pub distance: f64,
    /// Angle of `b - a` against the +x axis, radians in (-pi, pi].
    pub orientation: f64,
}

impl Chord {
    pub fn new(a: PixelCoord, b: PixelCoord) -> Self {
        let dx = f64::from(b.x - a.x);
        let dy = f64::from(b.y - a.y);
        Self { a, b, distance: dx.hypot(dy), orientation: dy.atan2(dx) }
    }

    fn point(p: PixelCoord) -> Self {
        Self { a: p, b: p, distance: 0.0, orientation: 0.0 }
    }
}

#[inline]
fn dist2(a: PixelCoord, b: PixelCoord) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    dx * dx + dy * dy
}

/// Longest chord over all pairs of boundary pixels.
///
/// Pairs are enumerated in ascending (i, j) order over the trace-ordered
/// boundary and only a strictly longer distance replaces the current best,
/// so ties keep the first pair found. The chord's `a` endpoint is the
/// lower-indexed pixel. `progress` receives one step per pairwise
/// comparison, n(n-1)/2 in total.
pub fn longest_chord(boundary: &[PixelCoord], progress: Option<&dyn ProgressSink>) -> Chord {
    let Some(&first) = boundary.first() else {
        return Chord::point(PixelCoord::new(0, 0));
    };
    if boundary.len() == 1 {
        return Chord::point(first);
    }

    let mut best_i = 0;
    let mut best_j = 1;
    let mut best_d2 = -1.0f64;
    for i in 0..boundary.len() {
        for j in (i + 1)..boundary.len() {
            if let Some(sink) = progress {
                sink.step();
            }
            let d2 = dist2(boundary[i], boundary[j]);
            if d2 > best_d2 {
                best_d2 = d2;
                best_i = i;
                best_j = j;
            }
        }
    }
    Chord::new(boundary[best_i], boundary[best_j])
}

struct Bucket {
    min_y: f64,
    max_y: f64,
    min_pixel: PixelCoord,
    max_pixel: PixelCoord,
}

impl Bucket {
    fn new(y: f64, p: PixelCoord) -> Self {
        Self { min_y: y, max_y: y, min_pixel: p, max_pixel: p }
    }

    fn update(&mut self, y: f64, p: PixelCoord) {
        if y < self.min_y {
            self.min_y = y;
            self.min_pixel = p;
        }
        if y > self.max_y {
            self.max_y = y;
            self.max_pixel = p;
        }
    }
}

/// Longest chord perpendicular to `axis`.
///
/// Every boundary pixel is rotated so the axis chord lies along +x, then
/// grouped into buckets of `axis_tolerance` width by rotated x coordinate.
/// The widest rotated-y span over any bucket wins and maps back to the
/// original pixel pair recorded for that bucket. Buckets are visited in
/// ascending key order and only strictly wider spans replace the best, so
/// the result is deterministic; within a bucket the first extreme pixel in
/// trace order is kept. The chord's `a` endpoint is the pixel with the
/// smaller rotated y.
///
/// A boundary whose pixels all fall in distinct buckets (a line along the
/// axis, for instance) yields a degenerate zero-length chord; callers treat
/// ratios over it as undefined rather than zero.
///
/// `progress` receives one step per pixel while rotating and one per bucket
/// while scanning spans, at most 2n in total.
pub fn longest_perpendicular_chord(
    boundary: &[PixelCoord],
    axis: &Chord,
    axis_tolerance: f64,
    progress: Option<&dyn ProgressSink>,
) -> Chord {
    let Some(&first) = boundary.first() else {
        return Chord::point(PixelCoord::new(0, 0));
    };
    if boundary.len() == 1 {
        return Chord::point(first);
    }
    let tolerance = if axis_tolerance > 0.0 { axis_tolerance } else { 0.5 };

    let rotation = Rotation2::new(-axis.orientation);
    let mut buckets: BTreeMap<i64, Bucket> = BTreeMap::new();
    for &p in boundary {
        if let Some(sink) = progress {
            sink.step();
        }
        let rotated = rotation * Point2::new(f64::from(p.x), f64::from(p.y));
        let key = (rotated.x / tolerance).round() as i64;
        buckets
            .entry(key)
            .and_modify(|b| b.update(rotated.y, p))
            .or_insert_with(|| Bucket::new(rotated.y, p));
    }

    let mut best_span = f64::NEG_INFINITY;
    let mut best = (first, first);
    for bucket in buckets.values() {
        if let Some(sink) = progress {
            sink.step();
        }
        let span = bucket.max_y - bucket.min_y;
        if span > best_span {
            best_span = span;
            best = (bucket.min_pixel, bucket.max_pixel);
        }
    }
    Chord::new(best.0, best.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CountingSink;
    use approx::assert_relative_eq;

    fn coords(pairs: &[(i32, i32)]) -> Vec<PixelCoord> {
        pairs.iter().map(|&(x, y)| PixelCoord::new(x, y)).collect()
    }

    #[test]
    fn two_points_give_that_chord() {
        let boundary = coords(&[(0, 0), (3, 4)]);
        let chord = longest_chord(&boundary, None);
        assert_eq!((chord.a, chord.b), (boundary[0], boundary[1]));
        assert_relative_eq!(chord.distance, 5.0);
        assert_relative_eq!(chord.orientation, (4.0f64).atan2(3.0));
    }

    #[test]
    fn first_pair_wins_distance_ties() {
        // Both diagonals of the square tie; ascending (i, j) order finds
        // (0, 0)-(2, 2) first.
        let boundary = coords(&[(0, 0), (2, 0), (2, 2), (0, 2)]);
        let chord = longest_chord(&boundary, None);
        assert_eq!((chord.a, chord.b), (boundary[0], boundary[2]));
    }

    #[test]
    fn orientation_points_from_the_lower_indexed_pixel() {
        let boundary = coords(&[(5, 5), (0, 0)]);
        let chord = longest_chord(&boundary, None);
        assert_eq!(chord.a, boundary[0]);
        assert_relative_eq!(chord.orientation, (-5.0f64).atan2(-5.0));
    }

    #[test]
    fn comparison_count_is_the_pair_count() {
        let boundary = coords(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0)]);
        let sink = CountingSink::new();
        longest_chord(&boundary, Some(&sink));
        assert_eq!(sink.count(), 8 * 7 / 2);
    }

    #[test]
    fn perpendicular_to_a_horizontal_axis_spans_a_column() {
        // Outline of a 5x3 rectangle.
        let boundary = coords(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (4, 0),
            (4, 1),
            (4, 2),
            (3, 2),
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
        ]);
        let axis = Chord::new(PixelCoord::new(0, 1), PixelCoord::new(4, 1));
        let chord = longest_perpendicular_chord(&boundary, &axis, 0.5, None);
        assert_eq!((chord.a, chord.b), (PixelCoord::new(0, 0), PixelCoord::new(0, 2)));
        assert_relative_eq!(chord.distance, 2.0);
    }

    #[test]
    fn perpendicular_search_works_in_the_rotated_frame() {
        // A diagonal spine with one pixel either side of it; the off-spine
        // pair shares a rotated-x bucket and spans sqrt(2).
        let boundary = coords(&[(0, 0), (1, 1), (2, 2), (3, 3), (2, 1), (1, 2)]);
        let axis = Chord::new(PixelCoord::new(0, 0), PixelCoord::new(3, 3));
        let chord = longest_perpendicular_chord(&boundary, &axis, 0.5, None);
        assert_eq!((chord.a, chord.b), (PixelCoord::new(2, 1), PixelCoord::new(1, 2)));
        assert_relative_eq!(chord.distance, std::f64::consts::SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn collinear_boundary_degenerates_to_zero_width() {
        let boundary = coords(&[(0, 0), (1, 0), (2, 0), (3, 0)]);
        let axis = longest_chord(&boundary, None);
        let chord = longest_perpendicular_chord(&boundary, &axis, 0.5, None);
        assert_eq!(chord.distance, 0.0);
    }

    #[test]
    fn single_pixel_boundary_degenerates() {
        let boundary = coords(&[(7, 7)]);
        let chord = longest_chord(&boundary, None);
        assert_eq!((chord.a, chord.b), (boundary[0], boundary[0]));
        assert_eq!(chord.distance, 0.0);
        assert_eq!(chord.orientation, 0.0);
        let perp = longest_perpendicular_chord(&boundary, &chord, 0.5, None);
        assert_eq!(perp.distance, 0.0);
    }

    #[test]
    fn perpendicular_step_count_stays_within_two_n() {
        let boundary = coords(&[(0, 0), (1, 1), (2, 2), (3, 3), (2, 1), (1, 2)]);
        let axis = Chord::new(PixelCoord::new(0, 0), PixelCoord::new(3, 3));
        let sink = CountingSink::new();
        longest_perpendicular_chord(&boundary, &axis, 0.5, Some(&sink));
        // Six rotations plus five buckets: the off-spine pair shares one.
        assert_eq!(sink.count(), 11);
        assert!(sink.count() <= 2 * boundary.len() as u64);
    }
}
