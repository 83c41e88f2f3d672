//! Shared synthetic fixtures for module tests.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::mask::PixelCoord;

/// Pixels of a filled axis-aligned rectangle.
pub(crate) fn filled_rect(x0: i32, y0: i32, w: i32, h: i32) -> Vec<PixelCoord> {
    let mut pixels = Vec::with_capacity((w * h) as usize);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            pixels.push(PixelCoord::new(x, y));
        }
    }
    pixels
}

/// Pixels of a filled disc.
pub(crate) fn filled_disc(cx: i32, cy: i32, r: i32) -> Vec<PixelCoord> {
    let mut pixels = Vec::new();
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= r * r {
                pixels.push(PixelCoord::new(x, y));
            }
        }
    }
    pixels
}

/// Grows a connected blob of `target` pixels by repeatedly attaching a
/// 4-neighbor of a randomly picked member, so the result is always one
/// 8-connected (in fact 4-connected) region.
pub(crate) fn random_blob(seed: u64, target: usize) -> Vec<PixelCoord> {
    const STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    let mut rng = StdRng::seed_from_u64(seed);
    let mut members = HashSet::new();
    members.insert((0i32, 0i32));
    let mut pixels = vec![PixelCoord::new(0, 0)];
    while pixels.len() < target {
        let base = pixels[rng.gen_range(0..pixels.len())];
        let (dx, dy) = STEPS[rng.gen_range(0..STEPS.len())];
        let candidate = (base.x + dx, base.y + dy);
        if members.insert(candidate) {
            pixels.push(PixelCoord::new(candidate.0, candidate.1));
        }
    }
    pixels
}

/// Pixels of a filled axis-aligned ellipse with semi-axes `a` and `b`.
pub(crate) fn filled_ellipse(cx: i32, cy: i32, a: i32, b: i32) -> Vec<PixelCoord> {
    let mut pixels = Vec::new();
    for y in cy - b..=cy + b {
        for x in cx - a..=cx + a {
            let fx = f64::from(x - cx) / f64::from(a);
            let fy = f64::from(y - cy) / f64::from(b);
            if fx * fx + fy * fy <= 1.0 {
                pixels.push(PixelCoord::new(x, y));
            }
        }
    }
    pixels
}

/// Rotates pixels a quarter turn about the origin: (x, y) -> (-y, x).
pub(crate) fn rotate_90(pixels: &[PixelCoord]) -> Vec<PixelCoord> {
    pixels.iter().map(|p| PixelCoord::new(-p.y, p.x)).collect()
}
