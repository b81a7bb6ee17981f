/// Decoded device screenshot, read-only once produced.
use std::path::Path;

use image::DynamicImage;

use crate::errors::{DroidTapError, DroidTapResult};

#[derive(Debug, Clone)]
pub struct Screenshot {
    image: DynamicImage,
}

impl Screenshot {
    /// Decode the image at `path`. Missing or corrupt files are an `ImageLoad` error.
    pub fn load(path: &Path) -> DroidTapResult<Self> {
        let image = image::open(path).map_err(|e| DroidTapError::image_load(path, e))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(DroidTapError::image_load(path, "image has no pixels"));
        }
        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "screenshot decoded"
        );
        Ok(Self { image })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Downscale to exactly `width × height` with an area-averaging (box) filter.
    /// Same-size requests return a copy untouched.
    pub fn resize_area(&self, width: u32, height: u32) -> Screenshot {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        Screenshot {
            image: self.image.thumbnail_exact(width, height),
        }
    }

    /// Pixels packed as `0x00RRGGBB`, row-major, the layout a software framebuffer expects.
    pub fn to_xrgb(&self) -> Vec<u32> {
        self.image
            .to_rgb8()
            .pixels()
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn missing_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Screenshot::load(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, DroidTapError::ImageLoad { .. }));
    }

    #[test]
    fn corrupt_file_is_image_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = Screenshot::load(&path).unwrap_err();
        assert!(matches!(err, DroidTapError::ImageLoad { .. }));
    }

    #[test]
    fn resize_area_hits_requested_size() {
        let shot = Screenshot::from_image(DynamicImage::ImageRgb8(RgbImage::new(400, 800)));
        let small = shot.resize_area(300, 600);
        assert_eq!((small.width(), small.height()), (300, 600));
    }

    #[test]
    fn xrgb_packs_channels() {
        let img = RgbImage::from_pixel(2, 1, Rgb([0x12, 0x34, 0x56]));
        let shot = Screenshot::from_image(DynamicImage::ImageRgb8(img));
        assert_eq!(shot.to_xrgb(), vec![0x0012_3456, 0x0012_3456]);
    }
}
