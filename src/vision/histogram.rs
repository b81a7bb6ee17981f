/// Whole-image grayscale histogram and histogram correlation.
use std::path::Path;

use crate::errors::DroidTapResult;
use crate::vision::screenshot::Screenshot;

pub const BUCKETS: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: [f64; BUCKETS],
}

impl Histogram {
    /// Grayscale-convert `shot` and count pixels per intensity level.
    pub fn from_screenshot(shot: &Screenshot) -> Self {
        let mut bins = [0.0; BUCKETS];
        for p in shot.image().to_luma8().pixels() {
            bins[p[0] as usize] += 1.0;
        }
        Self { bins }
    }

    /// Decode the image at `path` and build its histogram.
    pub fn from_path(path: &Path) -> DroidTapResult<Self> {
        Ok(Self::from_screenshot(&Screenshot::load(path)?))
    }

    pub fn bins(&self) -> &[f64; BUCKETS] {
        &self.bins
    }

    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// Pearson correlation of the two bucket vectors, in `[-1, 1]`.
    ///
    /// If either histogram is perfectly flat the coefficient is undefined and
    /// `1.0` is returned, the same convention as OpenCV's `HISTCMP_CORREL`.
    pub fn correlate(&self, other: &Histogram) -> f64 {
        let n = BUCKETS as f64;
        let mean_a = self.total() / n;
        let mean_b = other.total() / n;

        let mut num = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (a, b) in self.bins.iter().zip(other.bins.iter()) {
            let da = a - mean_a;
            let db = b - mean_b;
            num += da * db;
            var_a += da * da;
            var_b += db * db;
        }

        let denom = (var_a * var_b).sqrt();
        if denom.abs() <= f64::EPSILON {
            return 1.0;
        }
        num / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    /// Dark ramp over the top half, full ramp below: every bucket populated, unevenly.
    fn textured() -> Screenshot {
        let img = GrayImage::from_fn(256, 64, |x, y| {
            if y < 32 {
                Luma([(x / 4) as u8])
            } else {
                Luma([x as u8])
            }
        });
        Screenshot::from_image(DynamicImage::ImageLuma8(img))
    }

    fn solid(level: u8) -> Screenshot {
        Screenshot::from_image(DynamicImage::ImageLuma8(GrayImage::from_pixel(256, 64, Luma([level]))))
    }

    #[test]
    fn counts_every_pixel() {
        let h = Histogram::from_screenshot(&textured());
        assert_eq!(h.total(), 256.0 * 64.0);
        assert_eq!(h.bins()[0], 32.0 * 4.0 + 32.0);
        assert_eq!(h.bins()[200], 32.0);
    }

    #[test]
    fn self_correlation_is_one() {
        let h = Histogram::from_screenshot(&textured());
        assert!((h.correlate(&h) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_is_symmetric() {
        let a = Histogram::from_screenshot(&textured());
        let b = Histogram::from_screenshot(&solid(255));
        assert_eq!(a.correlate(&b), b.correlate(&a));
    }

    #[test]
    fn solid_against_textured_is_far_below_threshold() {
        let a = Histogram::from_screenshot(&textured());
        let b = Histogram::from_screenshot(&solid(255));
        let score = a.correlate(&b);
        assert!(score < 0.5, "score {score}");
        assert!(score >= -1.0);
    }

    #[test]
    fn different_solid_colours_do_not_match() {
        let a = Histogram::from_screenshot(&solid(10));
        let b = Histogram::from_screenshot(&solid(240));
        assert!(a.correlate(&b) < 0.0);
    }
}
