/// Display-space ↔ source-space mapping for the calibration preview.
///
/// The preview is the source screenshot scaled uniformly by
/// `scale = min(max_w / w, max_h / h, 1.0)`. A click in the preview is
/// normalised against the preview size and projected back onto the source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    /// Always in `(0, 1]`. The preview never upscales.
    pub scale: f64,
    pub disp_width: u32,
    pub disp_height: u32,
}

impl DisplayTransform {
    /// Fit a `width × height` source into `max_width × max_height`.
    ///
    /// Display dimensions are at least one pixel and never exceed the bounds
    /// (callers guarantee non-zero bounds).
    pub fn compute(width: u32, height: u32, max_width: u32, max_height: u32) -> Self {
        let sx = f64::from(max_width) / f64::from(width.max(1));
        let sy = f64::from(max_height) / f64::from(height.max(1));
        let scale = sx.min(sy).min(1.0);

        let disp_width = ((f64::from(width) * scale).floor() as u32)
            .min(max_width)
            .max(1);
        let disp_height = ((f64::from(height) * scale).floor() as u32)
            .min(max_height)
            .max(1);

        Self {
            scale,
            disp_width,
            disp_height,
        }
    }

    /// Project a display-space click onto a `width × height` source image.
    ///
    /// `x = floor(x_disp / disp_w * w)`, evaluated in integers so a 1:1 preview
    /// maps every pixel onto itself. Clicks past the preview edge are clamped
    /// to the last display pixel first.
    pub fn remap(&self, click: ClickPoint, width: u32, height: u32) -> CalibratedTarget {
        CalibratedTarget {
            x: project(click.x, self.disp_width, width),
            y: project(click.y, self.disp_height, height),
        }
    }
}

fn project(disp: u32, disp_len: u32, src_len: u32) -> u32 {
    let disp_len = u64::from(disp_len.max(1));
    let disp = u64::from(disp).min(disp_len - 1);
    (disp * u64::from(src_len) / disp_len) as u32
}

/// A primary-button press in preview pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickPoint {
    pub x: u32,
    pub y: u32,
}

/// The device-native pixel the poller taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibratedTarget {
    pub x: u32,
    pub y: u32,
}

impl std::fmt::Display for CalibratedTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portrait_phone_into_landscape_box() {
        let t = DisplayTransform::compute(400, 800, 800, 600);
        assert!((t.scale - 0.75).abs() < 1e-12);
        assert_eq!((t.disp_width, t.disp_height), (300, 600));

        let target = t.remap(ClickPoint { x: 150, y: 300 }, 400, 800);
        assert_eq!(target, CalibratedTarget { x: 200, y: 400 });
    }

    #[test]
    fn small_source_is_not_upscaled() {
        let t = DisplayTransform::compute(320, 240, 800, 600);
        assert_eq!(t.scale, 1.0);
        assert_eq!((t.disp_width, t.disp_height), (320, 240));

        for (x, y) in [(0, 0), (1, 1), (13, 200), (319, 239), (160, 120)] {
            let target = t.remap(ClickPoint { x, y }, 320, 240);
            assert_eq!((target.x, target.y), (x, y));
        }
    }

    #[test]
    fn preview_stays_inside_bounds() {
        let sources = [(1080, 2400), (1440, 3200), (720, 1280), (2560, 1600), (1, 5000), (5000, 1), (800, 600)];
        let bounds = [(800, 600), (300, 300), (1, 1), (1920, 1080), (123, 457)];
        for &(w, h) in &sources {
            for &(mw, mh) in &bounds {
                let t = DisplayTransform::compute(w, h, mw, mh);
                assert!(t.scale <= 1.0, "{w}x{h} in {mw}x{mh} upscaled");
                assert!(t.disp_width <= mw && t.disp_height <= mh, "{w}x{h} in {mw}x{mh} overflowed");
                assert!(t.disp_width >= 1 && t.disp_height >= 1);
            }
        }
    }

    #[test]
    fn remapped_corners_stay_inside_source() {
        let (w, h) = (1080, 2400);
        let t = DisplayTransform::compute(w, h, 800, 600);
        let corners = [
            (0, 0),
            (t.disp_width - 1, 0),
            (0, t.disp_height - 1),
            (t.disp_width - 1, t.disp_height - 1),
        ];
        for (x, y) in corners {
            let target = t.remap(ClickPoint { x, y }, w, h);
            assert!(target.x < w && target.y < h, "{target} escaped {w}x{h}");
        }
    }

    #[test]
    fn out_of_preview_click_is_clamped() {
        let t = DisplayTransform::compute(400, 800, 800, 600);
        let target = t.remap(ClickPoint { x: 10_000, y: 10_000 }, 400, 800);
        assert!(target.x < 400 && target.y < 800);
    }
}
