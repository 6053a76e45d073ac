//! Pixel-level comparison of a candidate image against a reference.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::screenshot::timestamp;
use crate::error::Result;

/// Summed absolute RGB difference above which a pixel counts as changed
pub const CHANGED_THRESHOLD: u32 = 30;

pub const DEFAULT_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub passed: bool,
    pub diff_percent: f64,
    pub diff_pixels: u64,
    pub total_pixels: u64,
    pub tolerance_percent: f64,
    pub diff_image: String,
    pub image_a: String,
    pub image_b: String,
}

/// Result of comparing two same-sized buffers
pub struct PixelDiff {
    pub diff_pixels: u64,
    pub total_pixels: u64,
    /// Candidate with every changed pixel painted red
    pub overlay: RgbImage,
}

impl PixelDiff {
    pub fn fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            0.0
        } else {
            self.diff_pixels as f64 / self.total_pixels as f64
        }
    }
}

/// Compare `candidate` against `reference`, resizing the candidate if needed
pub fn diff_buffers(reference: &RgbImage, candidate: &RgbImage) -> PixelDiff {
    let resized;
    let candidate = if reference.dimensions() != candidate.dimensions() {
        debug!(
            "Resizing candidate from {:?} to {:?}",
            candidate.dimensions(),
            reference.dimensions()
        );
        resized = imageops::resize(candidate, reference.width(), reference.height(), FilterType::Lanczos3);
        &resized
    } else {
        candidate
    };

    let mut overlay = candidate.clone();
    let mut diff_pixels = 0u64;
    for (a, b) in reference.pixels().zip(overlay.pixels_mut()) {
        let delta: u32 = a
            .0
            .iter()
            .zip(b.0.iter())
            .map(|(x, y)| u32::from(x.abs_diff(*y)))
            .sum();
        if delta > CHANGED_THRESHOLD {
            diff_pixels += 1;
            *b = Rgb([255, 0, 0]);
        }
    }

    PixelDiff {
        diff_pixels,
        total_pixels: u64::from(reference.width()) * u64::from(reference.height()),
        overlay,
    }
}

/// Compare two image files and write `diff_<timestamp>.png` into `out_dir`
pub fn compare_images(path_a: &Path, path_b: &Path, tolerance: f64, out_dir: &Path) -> Result<DiffReport> {
    let reference = image::open(path_a)?.to_rgb8();
    let candidate = image::open(path_b)?.to_rgb8();
    let diff = diff_buffers(&reference, &candidate);

    fs::create_dir_all(out_dir)?;
    let diff_path = out_dir.join(format!("diff_{}.png", timestamp()));
    diff.overlay.save(&diff_path)?;
    info!("Diff image saved: {}", diff_path.display());

    let diff_percent = round6(diff.fraction());
    Ok(DiffReport {
        passed: diff.fraction() <= tolerance,
        diff_percent,
        diff_pixels: diff.diff_pixels,
        total_pixels: diff.total_pixels,
        tolerance_percent: tolerance,
        diff_image: diff_path.display().to_string(),
        image_a: path_a.display().to_string(),
        image_b: path_b.display().to_string(),
    })
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_buffers() {
        let img = RgbImage::from_pixel(10, 10, Rgb([40, 80, 120]));
        let diff = diff_buffers(&img, &img);
        assert_eq!(diff.diff_pixels, 0);
        assert_eq!(diff.total_pixels, 100);
        assert_eq!(diff.fraction(), 0.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let reference = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        let mut candidate = reference.clone();
        candidate.put_pixel(0, 0, Rgb([110, 110, 110]));
        candidate.put_pixel(1, 0, Rgb([111, 110, 110]));

        let diff = diff_buffers(&reference, &candidate);
        assert_eq!(diff.diff_pixels, 1);
        assert_eq!(diff.overlay.get_pixel(1, 0), &Rgb([255, 0, 0]));
        assert_eq!(diff.overlay.get_pixel(0, 0), &Rgb([110, 110, 110]));
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(1.0 / 3.0), 0.333333);
    }
}
