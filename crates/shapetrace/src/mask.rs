//! Dense offset-normalized binary mask built from a sparse pixel list.

use image::GrayImage;

use crate::direction::Direction;
use crate::error::RegionError;

/// Integer pixel coordinate in the input (image) frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

impl PixelCoord {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Binary grid covering exactly the bounding box of the input pixels.
///
/// Grid-local coordinates start at (0, 0); `(offset_x, offset_y)` translates
/// them back to the input frame. Cells outside the grid always read as
/// background.
#[derive(Debug, Clone)]
pub struct PixelMask {
    width: usize,
    height: usize,
    offset_x: i32,
    offset_y: i32,
    cells: Vec<u8>,
    foreground: usize,
}

impl PixelMask {
    /// Builds the mask from a non-empty pixel list. Duplicate coordinates
    /// collapse into one foreground cell.
    pub fn from_pixels(pixels: &[PixelCoord]) -> Result<Self, RegionError> {
        let Some(first) = pixels.first() else {
            return Err(RegionError::EmptyInput);
        };
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        for p in &pixels[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        let width = (i64::from(max_x) - i64::from(min_x) + 1) as usize;
        let height = (i64::from(max_y) - i64::from(min_y) + 1) as usize;

        let mut cells = vec![0u8; width * height];
        let mut foreground = 0usize;
        for p in pixels {
            let gx = (i64::from(p.x) - i64::from(min_x)) as usize;
            let gy = (i64::from(p.y) - i64::from(min_y)) as usize;
            let cell = &mut cells[gy * width + gx];
            if *cell == 0 {
                *cell = 1;
                foreground += 1;
            }
        }

        tracing::debug!(
            "built {}x{} mask at offset ({}, {}): {} foreground pixels",
            width,
            height,
            min_x,
            min_y,
            foreground
        );
        Ok(Self { width, height, offset_x: min_x, offset_y: min_y, cells, foreground })
    }

    /// Builds the mask from a grayscale image: every pixel with value at
    /// least `cutoff` is foreground. The image is not segmented; the whole
    /// foreground is taken as one region.
    pub fn from_gray_image(img: &GrayImage, cutoff: u8) -> Result<Self, RegionError> {
        let mut pixels = Vec::new();
        for (x, y, px) in img.enumerate_pixels() {
            if px[0] >= cutoff {
                pixels.push(PixelCoord::new(x as i32, y as i32));
            }
        }
        Self::from_pixels(&pixels)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// X of the grid origin in the input frame.
    #[inline]
    pub fn offset_x(&self) -> i32 {
        self.offset_x
    }

    /// Y of the grid origin in the input frame.
    #[inline]
    pub fn offset_y(&self) -> i32 {
        self.offset_y
    }

    /// Foreground cell count.
    #[inline]
    pub fn foreground_count(&self) -> usize {
        self.foreground
    }

    /// Whether the grid-local cell is foreground; out-of-grid cells are
    /// background.
    #[inline]
    pub fn is_set(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.cells[y as usize * self.width + x as usize] != 0
    }

    /// Whether an input-frame coordinate is foreground.
    #[inline]
    pub fn contains(&self, p: PixelCoord) -> bool {
        let x = i64::from(p.x) - i64::from(self.offset_x);
        let y = i64::from(p.y) - i64::from(self.offset_y);
        x >= 0 && y >= 0 && self.is_set(x as isize, y as isize)
    }

    /// Translates a grid-local cell back to the input frame.
    #[inline]
    pub fn to_original(&self, x: usize, y: usize) -> PixelCoord {
        PixelCoord::new(x as i32 + self.offset_x, y as i32 + self.offset_y)
    }

    /// First foreground cell in column-major scan order (smallest x, then
    /// smallest y within that column), in grid coordinates.
    pub fn first_foreground_column_major(&self) -> Option<(usize, usize)> {
        for x in 0..self.width {
            for y in 0..self.height {
                if self.cells[y * self.width + x] != 0 {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Foreground cells with at least one background 8-neighbor (cells on
    /// the grid edge count, since out-of-grid reads as background). Every
    /// traced boundary pixel is one of these.
    pub fn boundary_candidate_count(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[y * self.width + x] == 0 {
                    continue;
                }
                let (x, y) = (x as isize, y as isize);
                if Direction::ALL.iter().any(|d| !self.is_set(x + d.dx(), y + d.dy())) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Number of 8-connected foreground components.
    pub fn connected_components(&self) -> usize {
        let mut visited = vec![false; self.cells.len()];
        let mut stack = Vec::new();
        let mut components = 0;
        for seed in 0..self.cells.len() {
            if self.cells[seed] == 0 || visited[seed] {
                continue;
            }
            components += 1;
            visited[seed] = true;
            stack.push(seed);
            while let Some(idx) = stack.pop() {
                let x = (idx % self.width) as isize;
                let y = (idx / self.width) as isize;
                for d in Direction::ALL {
                    let (nx, ny) = (x + d.dx(), y + d.dy());
                    if !self.is_set(nx, ny) {
                        continue;
                    }
                    let nidx = ny as usize * self.width + nx as usize;
                    if !visited[nidx] {
                        visited[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::filled_rect;
    use image::Luma;

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(PixelMask::from_pixels(&[]).unwrap_err(), RegionError::EmptyInput);
    }

    #[test]
    fn grid_is_the_exact_bounding_box() {
        let mask = PixelMask::from_pixels(&filled_rect(-3, 10, 5, 2)).unwrap();
        assert_eq!((mask.width(), mask.height()), (5, 2));
        assert_eq!((mask.offset_x(), mask.offset_y()), (-3, 10));
        assert_eq!(mask.foreground_count(), 10);
    }

    #[test]
    fn duplicates_collapse_into_one_cell() {
        let pixels = [
            PixelCoord::new(4, 4),
            PixelCoord::new(5, 4),
            PixelCoord::new(4, 4),
        ];
        let mask = PixelMask::from_pixels(&pixels).unwrap();
        assert_eq!(mask.foreground_count(), 2);
    }

    #[test]
    fn membership_works_in_both_frames() {
        let pixels = [PixelCoord::new(-2, -2), PixelCoord::new(-1, -2)];
        let mask = PixelMask::from_pixels(&pixels).unwrap();
        assert!(mask.is_set(0, 0));
        assert!(mask.is_set(1, 0));
        assert!(!mask.is_set(-1, 0), "out of grid reads as background");
        assert!(!mask.is_set(2, 0));
        assert!(mask.contains(PixelCoord::new(-2, -2)));
        assert!(!mask.contains(PixelCoord::new(0, 0)));
        assert_eq!(mask.to_original(1, 0), PixelCoord::new(-1, -2));
    }

    #[test]
    fn column_major_scan_prefers_smallest_x() {
        // Row-major order would find (1, 0) first.
        let pixels = [PixelCoord::new(1, 0), PixelCoord::new(0, 1), PixelCoord::new(1, 1)];
        let mask = PixelMask::from_pixels(&pixels).unwrap();
        assert_eq!(mask.first_foreground_column_major(), Some((0, 1)));
    }

    #[test]
    fn boundary_candidates_exclude_the_interior() {
        let mask = PixelMask::from_pixels(&filled_rect(0, 0, 4, 4)).unwrap();
        assert_eq!(mask.boundary_candidate_count(), 12);
        let single = PixelMask::from_pixels(&[PixelCoord::new(7, 7)]).unwrap();
        assert_eq!(single.boundary_candidate_count(), 1);
    }

    #[test]
    fn component_count_uses_eight_connectivity() {
        let one = PixelMask::from_pixels(&filled_rect(0, 0, 3, 2)).unwrap();
        assert_eq!(one.connected_components(), 1);

        let diagonal = [PixelCoord::new(0, 0), PixelCoord::new(1, 1)];
        assert_eq!(PixelMask::from_pixels(&diagonal).unwrap().connected_components(), 1);

        let split = [PixelCoord::new(0, 0), PixelCoord::new(3, 0), PixelCoord::new(3, 3)];
        assert_eq!(PixelMask::from_pixels(&split).unwrap().connected_components(), 3);
    }

    #[test]
    fn gray_image_cutoff_selects_foreground() {
        let img = GrayImage::from_fn(4, 3, |x, y| {
            if x >= 2 && y <= 1 {
                Luma([200])
            } else {
                Luma([40])
            }
        });
        let mask = PixelMask::from_gray_image(&img, 128).unwrap();
        assert_eq!((mask.width(), mask.height()), (2, 2));
        assert_eq!((mask.offset_x(), mask.offset_y()), (2, 0));
        assert_eq!(mask.foreground_count(), 4);
    }
}
