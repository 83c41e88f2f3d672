//! Grayscale enhancement stages applied before mask extraction.
//!
//! A pipeline is an ordered list of [`Stage`]s applied in sequence. Every
//! stage reports its elementary operations through [`ProgressSink`] and
//! publishes the exact count in advance via [`Stage::work`], so callers can
//! size a progress display before starting.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::progress::ProgressSink;

/// One enhancement step over a grayscale buffer. Kernel stages copy the
/// input and overwrite the interior; the one-pixel border passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 3x3 mean kernel.
    Smooth3x3,
    /// Keeps values at or above the cutoff, zeroes the rest.
    HighPass { cutoff: u8 },
    /// Keeps values at or below the cutoff, zeroes the rest.
    LowPass { cutoff: u8 },
    /// Binarizes: values at or above the cutoff become 255, the rest 0.
    Threshold { cutoff: u8 },
    /// 3x3 Kirsch compass kernel; the output is floor(sum / 30) + 128.
    KirschEdge { compass: Direction },
}

impl Stage {
    /// Applies the stage, returning a new buffer. `progress` receives one
    /// step per kernel multiply for kernel stages and one per pixel for
    /// point stages; the total equals [`Stage::work`].
    pub fn apply(&self, src: &GrayImage, progress: Option<&dyn ProgressSink>) -> GrayImage {
        match *self {
            Stage::Smooth3x3 => convolve3x3(src, MEAN_KERNEL, |sum| sum / 9.0, progress),
            Stage::HighPass { cutoff } => {
                map_pixels(src, progress, |v| if v >= cutoff { v } else { 0 })
            }
            Stage::LowPass { cutoff } => {
                map_pixels(src, progress, |v| if v <= cutoff { v } else { 0 })
            }
            Stage::Threshold { cutoff } => {
                map_pixels(src, progress, |v| if v >= cutoff { 255 } else { 0 })
            }
            Stage::KirschEdge { compass } => {
                convolve3x3(src, kirsch_kernel(compass), |sum| sum / 30.0 + 128.0, progress)
            }
        }
    }

    /// Exact step count `apply` reports for a `width` x `height` input.
    pub fn work(&self, width: u32, height: u32) -> u64 {
        match self {
            Stage::Smooth3x3 | Stage::KirschEdge { .. } => {
                if width < 3 || height < 3 {
                    return 0;
                }
                u64::from(width - 2) * u64::from(height - 2) * 9
            }
            _ => u64::from(width) * u64::from(height),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    /// Parses compact stage specs: `smooth`, `highpass:128`, `lowpass:64`,
    /// `threshold:128`, `kirsch:ne`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((n, a)) => (n.trim(), Some(a.trim())),
            None => (s.trim(), None),
        };
        match name {
            "smooth" => Ok(Stage::Smooth3x3),
            "highpass" => Ok(Stage::HighPass { cutoff: parse_cutoff(name, arg)? }),
            "lowpass" => Ok(Stage::LowPass { cutoff: parse_cutoff(name, arg)? }),
            "threshold" => Ok(Stage::Threshold { cutoff: parse_cutoff(name, arg)? }),
            "kirsch" => {
                let arg = arg
                    .ok_or_else(|| "kirsch needs a compass direction, e.g. kirsch:ne".to_string())?;
                Ok(Stage::KirschEdge { compass: arg.parse()? })
            }
            other => Err(format!("unknown stage `{}`", other)),
        }
    }
}

fn parse_cutoff(name: &str, arg: Option<&str>) -> Result<u8, String> {
    let arg = arg.ok_or_else(|| format!("{} needs a cutoff value, e.g. {}:128", name, name))?;
    arg.parse::<u8>().map_err(|e| format!("bad cutoff `{}` for {}: {}", arg, name, e))
}

/// Parses a comma-separated stage list such as `smooth,kirsch:ne,threshold:96`.
/// Empty segments are skipped, so trailing commas are harmless.
pub fn parse_stage_list(spec: &str) -> Result<Vec<Stage>, String> {
    spec.split(',').filter(|part| !part.trim().is_empty()).map(str::parse).collect()
}

/// Applies `stages` in order, reporting through the shared sink.
pub fn run_stages(
    src: &GrayImage,
    stages: &[Stage],
    progress: Option<&dyn ProgressSink>,
) -> GrayImage {
    let mut img = src.clone();
    for stage in stages {
        img = stage.apply(&img, progress);
        tracing::debug!("applied enhancement stage {:?}", stage);
    }
    img
}

/// Total step count for running `stages` over a `width` x `height` image.
/// Every stage preserves dimensions, so the per-stage counts simply add up.
pub fn total_work(stages: &[Stage], width: u32, height: u32) -> u64 {
    stages.iter().map(|stage| stage.work(width, height)).sum()
}

const MEAN_KERNEL: [[f64; 3]; 3] = [[1.0; 3]; 3];

/// Kirsch compass kernel: weight 5 on the three neighbors facing `compass`,
/// -3 on the remaining five, 0 in the center.
fn kirsch_kernel(compass: Direction) -> [[f64; 3]; 3] {
    let mut kernel = [[-3.0; 3]; 3];
    kernel[1][1] = 0.0;
    for offset in [-1i8, 0, 1] {
        let d = compass.turned(offset);
        kernel[(d.dy() + 1) as usize][(d.dx() + 1) as usize] = 5.0;
    }
    kernel
}

fn convolve3x3(
    src: &GrayImage,
    kernel: [[f64; 3]; 3],
    normalize: impl Fn(f64) -> f64,
    progress: Option<&dyn ProgressSink>,
) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = src.clone();
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut sum = 0.0;
            for ky in 0..3u32 {
                for kx in 0..3u32 {
                    if let Some(sink) = progress {
                        sink.step();
                    }
                    let v = f64::from(src.get_pixel(x + kx - 1, y + ky - 1)[0]);
                    sum += v * kernel[ky as usize][kx as usize];
                }
            }
            out.put_pixel(x, y, Luma([to_u8(normalize(sum))]));
        }
    }
    out
}

fn map_pixels(
    src: &GrayImage,
    progress: Option<&dyn ProgressSink>,
    f: impl Fn(u8) -> u8,
) -> GrayImage {
    let mut out = src.clone();
    for px in out.pixels_mut() {
        if let Some(sink) = progress {
            sink.step();
        }
        px[0] = f(px[0]);
    }
    out
}

#[inline]
fn to_u8(v: f64) -> u8 {
    v.floor().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CountingSink;

    fn flat(w: u32, h: u32, value: u8) -> GrayImage {
        GrayImage::from_fn(w, h, |_, _| Luma([value]))
    }

    #[test]
    fn kirsch_kernel_faces_its_compass() {
        let north = kirsch_kernel(Direction::North);
        assert_eq!(north[0], [5.0, 5.0, 5.0]);
        assert_eq!(north[1], [-3.0, 0.0, -3.0]);
        assert_eq!(north[2], [-3.0, -3.0, -3.0]);

        let east = kirsch_kernel(Direction::East);
        for row in east {
            assert_eq!(row[2], 5.0);
        }
        assert_eq!(east[1][1], 0.0);
    }

    #[test]
    fn kirsch_on_a_flat_image_settles_at_128() {
        let img = flat(5, 5, 77);
        let out = Stage::KirschEdge { compass: Direction::North }.apply(&img, None);
        assert_eq!(out.get_pixel(2, 2)[0], 128, "flat interior has zero response");
        assert_eq!(out.get_pixel(0, 0)[0], 77, "border passes through");
        assert_eq!(out.get_pixel(4, 2)[0], 77);
    }

    #[test]
    fn smooth_leaves_a_flat_image_unchanged() {
        let img = flat(6, 4, 93);
        let out = Stage::Smooth3x3.apply(&img, None);
        assert!(out.pixels().all(|p| p[0] == 93));
    }

    fn row(img: &GrayImage) -> Vec<u8> {
        (0..img.width()).map(|x| img.get_pixel(x, 0)[0]).collect()
    }

    #[test]
    fn point_stages_apply_their_cutoffs() {
        let img = GrayImage::from_fn(4, 1, |x, _| Luma([(x as u8) * 60]));
        let high = Stage::HighPass { cutoff: 100 }.apply(&img, None);
        assert_eq!(row(&high), [0, 0, 120, 180]);
        let low = Stage::LowPass { cutoff: 100 }.apply(&img, None);
        assert_eq!(row(&low), [0, 60, 0, 0]);
        let bin = Stage::Threshold { cutoff: 100 }.apply(&img, None);
        assert_eq!(row(&bin), [0, 0, 255, 255]);
    }

    #[test]
    fn reported_steps_equal_the_published_work() {
        let img = flat(8, 6, 50);
        let stages = [
            Stage::Smooth3x3,
            Stage::Threshold { cutoff: 90 },
            Stage::KirschEdge { compass: Direction::SouthWest },
        ];
        let planned = total_work(&stages, img.width(), img.height());
        assert_eq!(planned, 6 * 4 * 9 + 8 * 6 + 6 * 4 * 9);

        let sink = CountingSink::new();
        run_stages(&img, &stages, Some(&sink));
        assert_eq!(sink.count(), planned);
    }

    #[test]
    fn tiny_images_skip_kernel_stages() {
        let img = flat(2, 2, 10);
        let out = Stage::Smooth3x3.apply(&img, None);
        assert!(out.pixels().all(|p| p[0] == 10));
        assert_eq!(Stage::Smooth3x3.work(2, 2), 0);
    }

    #[test]
    fn stage_specs_parse_and_reject() {
        let stages = parse_stage_list("smooth, highpass:128,kirsch:ne,threshold:96,").unwrap();
        assert_eq!(
            stages,
            vec![
                Stage::Smooth3x3,
                Stage::HighPass { cutoff: 128 },
                Stage::KirschEdge { compass: Direction::NorthEast },
                Stage::Threshold { cutoff: 96 },
            ]
        );
        assert!(parse_stage_list("kirsch").is_err(), "kirsch needs a compass");
        assert!(parse_stage_list("threshold:300").is_err(), "cutoff must fit u8");
        assert!(parse_stage_list("sharpen").is_err(), "unknown stage");
    }
}
