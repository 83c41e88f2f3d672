//! Moore-neighbor contour tracing over a pixel mask.

use crate::direction::Direction;
use crate::mask::{PixelCoord, PixelMask};
use crate::progress::ProgressSink;

/// Relative headings probed at each step, in probe order. The walk prefers
/// turning back toward where it came from, which keeps it hugging the
/// contour.
const SWEEP: [i8; 5] = [-2, -1, 0, 1, 2];

/// Result of tracing a mask's outer contour.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryTrace {
    /// Boundary pixels in first-visit order, starting at the scan-start
    /// pixel, in input-frame coordinates. Spur pixels visited twice appear
    /// once.
    pub pixels: Vec<PixelCoord>,
    /// Chain-code length of the walk: 1 per axis move, sqrt(2) per diagonal.
    pub perimeter: f64,
}

/// Walks the outer contour of `mask`.
///
/// The start pixel is the first foreground cell in column-major scan order
/// (smallest x, then smallest y within that column) and the initial heading
/// is north. At each step the headings at offsets -2..=2 from the current
/// one are probed in that order and the first foreground neighbor wins;
/// cells outside the grid read as background. If the whole sweep fails the
/// walk reverses (offset +4), which is what brings it back out of one-pixel
/// spurs. The walk ends when the position returns to the start pixel.
///
/// A start pixel with no foreground neighbor among the six probed headings
/// terminates immediately with a single-pixel boundary and perimeter 0; an
/// isolated pixel is the common case. The probe set never covers the +-3
/// offsets, so this also applies to a start pixel whose only neighbor lies
/// southeast of it.
///
/// `progress` receives one step per candidate probe.
pub fn trace_boundary(mask: &PixelMask, progress: Option<&dyn ProgressSink>) -> BoundaryTrace {
    let Some((sx, sy)) = mask.first_foreground_column_major() else {
        // Masks are never empty by construction.
        return BoundaryTrace { pixels: Vec::new(), perimeter: 0.0 };
    };

    let start = (sx as isize, sy as isize);
    let mut pos = start;
    let mut heading = Direction::North;
    let mut perimeter = 0.0f64;
    let mut pixels = vec![mask.to_original(sx, sy)];
    let mut seen = vec![false; mask.width() * mask.height()];
    seen[sy * mask.width() + sx] = true;

    loop {
        let mut chosen = None;
        for offset in SWEEP {
            let cand = heading.turned(offset);
            if let Some(sink) = progress {
                sink.step();
            }
            if mask.is_set(pos.0 + cand.dx(), pos.1 + cand.dy()) {
                chosen = Some(cand);
                break;
            }
        }
        let next = match chosen {
            Some(dir) => dir,
            None => {
                let back = heading.reversed();
                if let Some(sink) = progress {
                    sink.step();
                }
                if !mask.is_set(pos.0 + back.dx(), pos.1 + back.dy()) {
                    break;
                }
                back
            }
        };

        perimeter += next.step_len();
        pos = (pos.0 + next.dx(), pos.1 + next.dy());
        heading = next;
        if pos == start {
            break;
        }
        let idx = pos.1 as usize * mask.width() + pos.0 as usize;
        if !seen[idx] {
            seen[idx] = true;
            pixels.push(mask.to_original(pos.0 as usize, pos.1 as usize));
        }
    }

    tracing::debug!("traced {} boundary pixels, perimeter {:.3}", pixels.len(), perimeter);
    BoundaryTrace { pixels, perimeter }
}
