/// One-shot calibration: show the reference screenshot, take the first
/// primary click, and turn it into a device-native coordinate.
pub mod viewport;

use std::path::Path;

use crate::calibrator::viewport::{MinifbViewport, Viewport};
use crate::config::CalibrationConfig;
use crate::errors::{DroidTapError, DroidTapResult};
use crate::vision::screenshot::Screenshot;
use crate::vision::transform::{CalibratedTarget, ClickPoint, DisplayTransform};

pub struct Calibrator {
    max_width: u32,
    max_height: u32,
    window_title: String,
}

impl Calibrator {
    pub fn new(config: &CalibrationConfig) -> DroidTapResult<Self> {
        if config.max_width == 0 || config.max_height == 0 {
            return Err(DroidTapError::Config(format!(
                "preview bounds must be non-zero, got {}x{}",
                config.max_width, config.max_height
            )));
        }
        Ok(Self {
            max_width: config.max_width,
            max_height: config.max_height,
            window_title: config.window_title.clone(),
        })
    }

    pub fn load_reference_image(&self, path: &Path) -> DroidTapResult<Screenshot> {
        Screenshot::load(path)
    }

    pub fn compute_display_transform(&self, shot: &Screenshot) -> DisplayTransform {
        DisplayTransform::compute(shot.width(), shot.height(), self.max_width, self.max_height)
    }

    /// Show the scaled preview and block until the first primary press or
    /// until the window is closed (`None`).
    pub fn run_interactive_capture(
        &self,
        shot: &Screenshot,
        transform: &DisplayTransform,
    ) -> DroidTapResult<Option<ClickPoint>> {
        let preview = shot.resize_area(transform.disp_width, transform.disp_height);
        let mut viewport = MinifbViewport::open(&self.window_title, &preview)?;
        let click = capture_first_click(&mut viewport);
        drop(viewport);
        tracing::debug!("preview window closed");
        click
    }

    pub fn remap_to_source(
        &self,
        click: ClickPoint,
        transform: &DisplayTransform,
        shot: &Screenshot,
    ) -> CalibratedTarget {
        transform.remap(click, shot.width(), shot.height())
    }

    /// Full calibration against an already decoded reference screenshot.
    pub fn calibrate(&self, shot: &Screenshot) -> DroidTapResult<Option<CalibratedTarget>> {
        self.calibrate_with(shot, |transform| self.run_interactive_capture(shot, transform))
    }

    /// Load the reference screenshot from `path`, then calibrate against it.
    pub fn calibrate_file(&self, path: &Path) -> DroidTapResult<Option<CalibratedTarget>> {
        let shot = self.load_reference_image(path)?;
        self.calibrate(&shot)
    }

    fn calibrate_with<F>(&self, shot: &Screenshot, capture: F) -> DroidTapResult<Option<CalibratedTarget>>
    where
        F: FnOnce(&DisplayTransform) -> DroidTapResult<Option<ClickPoint>>,
    {
        let transform = self.compute_display_transform(shot);
        tracing::info!(
            width = shot.width(),
            height = shot.height(),
            disp_width = transform.disp_width,
            disp_height = transform.disp_height,
            scale = transform.scale,
            "calibration preview ready; click the tap target"
        );

        let Some(click) = capture(&transform)? else {
            tracing::info!("preview closed without a click; no target recorded");
            return Ok(None);
        };

        let target = self.remap_to_source(click, &transform, shot);
        tracing::info!(
            disp_x = click.x,
            disp_y = click.y,
            x = target.x,
            y = target.y,
            "calibration click recorded"
        );
        Ok(Some(target))
    }
}

/// Pump `viewport` until the first primary press-down or until it closes.
/// Everything after the first press is never looked at.
pub fn capture_first_click<V: Viewport>(viewport: &mut V) -> DroidTapResult<Option<ClickPoint>> {
    while viewport.is_open() {
        if let Some(first) = viewport.pump()?.into_iter().next() {
            return Ok(Some(first));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use image::{DynamicImage, RgbImage};

    /// Replays canned frames of events, then reports itself closed.
    struct ScriptedViewport {
        frames: VecDeque<Vec<ClickPoint>>,
        pumped: usize,
    }

    impl ScriptedViewport {
        fn new(frames: Vec<Vec<ClickPoint>>) -> Self {
            Self {
                frames: frames.into(),
                pumped: 0,
            }
        }
    }

    impl Viewport for ScriptedViewport {
        fn is_open(&self) -> bool {
            !self.frames.is_empty()
        }

        fn pump(&mut self) -> DroidTapResult<Vec<ClickPoint>> {
            self.pumped += 1;
            Ok(self.frames.pop_front().unwrap_or_default())
        }
    }

    fn down(x: u32, y: u32) -> ClickPoint {
        ClickPoint { x, y }
    }

    fn calibrator() -> Calibrator {
        Calibrator::new(&CalibrationConfig::default()).unwrap()
    }

    fn phone_screenshot() -> Screenshot {
        Screenshot::from_image(DynamicImage::ImageRgb8(RgbImage::new(400, 800)))
    }

    #[test]
    fn closed_without_click_is_absent() {
        let mut vp = ScriptedViewport::new(vec![vec![], vec![], vec![]]);
        assert_eq!(capture_first_click(&mut vp).unwrap(), None);
        assert_eq!(vp.pumped, 3);
    }

    #[test]
    fn first_primary_press_wins() {
        let mut vp = ScriptedViewport::new(vec![
            vec![],
            vec![],
            vec![down(10, 20), down(30, 40)],
            vec![down(50, 60)],
        ]);
        assert_eq!(capture_first_click(&mut vp).unwrap(), Some(ClickPoint { x: 10, y: 20 }));
        assert_eq!(vp.pumped, 3);
    }

    #[test]
    fn viewport_errors_propagate() {
        struct Broken;
        impl Viewport for Broken {
            fn is_open(&self) -> bool {
                true
            }
            fn pump(&mut self) -> DroidTapResult<Vec<ClickPoint>> {
                Err(DroidTapError::Display("gone".into()))
            }
        }
        assert!(matches!(capture_first_click(&mut Broken), Err(DroidTapError::Display(_))));
    }

    #[test]
    fn calibration_maps_click_to_source() {
        let cal = calibrator();
        let shot = phone_screenshot();
        let target = cal
            .calibrate_with(&shot, |t| {
                assert_eq!((t.disp_width, t.disp_height), (300, 600));
                capture_first_click(&mut ScriptedViewport::new(vec![vec![down(150, 300)]]))
            })
            .unwrap();
        assert_eq!(target, Some(CalibratedTarget { x: 200, y: 400 }));
    }

    #[test]
    fn calibration_without_click_yields_no_target() {
        let cal = calibrator();
        let shot = phone_screenshot();
        let target = cal
            .calibrate_with(&shot, |_| capture_first_click(&mut ScriptedViewport::new(vec![vec![]])))
            .unwrap();
        assert_eq!(target, None);
    }

    #[test]
    fn zero_bounds_are_rejected() {
        let config = CalibrationConfig {
            max_width: 0,
            ..CalibrationConfig::default()
        };
        assert!(matches!(Calibrator::new(&config), Err(DroidTapError::Config(_))));
    }

    #[test]
    fn missing_reference_fails_before_any_window() {
        let dir = tempfile::tempdir().unwrap();
        let err = calibrator().calibrate_file(&dir.path().join("target.png")).unwrap_err();
        assert!(matches!(err, DroidTapError::ImageLoad { .. }));
    }
}
