/// Preview window for calibration.
///
/// `Viewport` is the seam between the capture loop and the windowing
/// backend; `MinifbViewport` is the real window.
use minifb::{Key, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};

use crate::errors::{DroidTapError, DroidTapResult};
use crate::vision::screenshot::Screenshot;
use crate::vision::transform::ClickPoint;

pub trait Viewport {
    /// `false` once the user closed the window.
    fn is_open(&self) -> bool;

    /// Present one frame and return the primary-button presses seen since the
    /// last call, in display-space pixels, oldest first.
    fn pump(&mut self) -> DroidTapResult<Vec<ClickPoint>>;
}

/// Turns a sampled button level into press-down edges.
///
/// The level is sampled once per frame, so a press and release that both fall
/// inside one frame (about 16 ms at 60 fps) is not seen.
#[derive(Debug, Clone, Copy)]
pub struct PressEdge {
    was_down: bool,
}

impl PressEdge {
    /// `initially_down` is the level when sampling starts; a button already
    /// held then only counts after it has been released.
    pub fn new(initially_down: bool) -> Self {
        Self { was_down: initially_down }
    }

    /// Feed the current level; `true` on an up→down transition.
    pub fn update(&mut self, down: bool) -> bool {
        let pressed = down && !self.was_down;
        self.was_down = down;
        pressed
    }
}

/// Map a window-local pointer position to display space.
///
/// The window may have been resized by the user, so the position is scaled
/// from the current window size back onto the preview size. `None` when the
/// pointer is outside the window.
pub fn window_to_display(
    pos: (f32, f32),
    window_size: (usize, usize),
    display_size: (u32, u32),
) -> Option<ClickPoint> {
    let (px, py) = pos;
    let (ww, wh) = (window_size.0.max(1) as f32, window_size.1.max(1) as f32);
    if px < 0.0 || py < 0.0 || px >= ww || py >= wh {
        return None;
    }
    let (dw, dh) = display_size;
    let x = ((px / ww) * dw as f32).floor() as u32;
    let y = ((py / wh) * dh as f32).floor() as u32;
    Some(ClickPoint {
        x: x.min(dw.saturating_sub(1)),
        y: y.min(dh.saturating_sub(1)),
    })
}

pub struct MinifbViewport {
    window: Window,
    buffer: Vec<u32>,
    width: u32,
    height: u32,
    primary: PressEdge,
    closed: bool,
}

impl MinifbViewport {
    /// Open a resizable window sized to `preview` and showing it.
    pub fn open(title: &str, preview: &Screenshot) -> DroidTapResult<Self> {
        let (width, height) = (preview.width(), preview.height());
        let mut window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions {
                resize: true,
                scale_mode: ScaleMode::Stretch,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| DroidTapError::Display(format!("open window: {e}")))?;
        window.set_target_fps(60);
        let primary = PressEdge::new(window.get_mouse_down(MouseButton::Left));
        tracing::debug!(title, width, height, "preview window opened");

        Ok(Self {
            window,
            buffer: preview.to_xrgb(),
            width,
            height,
            primary,
            closed: false,
        })
    }

    fn pointer(&self) -> Option<ClickPoint> {
        let pos = self.window.get_unscaled_mouse_pos(MouseMode::Discard)?;
        window_to_display(pos, self.window.get_size(), (self.width, self.height))
    }
}

impl Viewport for MinifbViewport {
    fn is_open(&self) -> bool {
        !self.closed && self.window.is_open()
    }

    fn pump(&mut self) -> DroidTapResult<Vec<ClickPoint>> {
        self.window
            .update_with_buffer(&self.buffer, self.width as usize, self.height as usize)
            .map_err(|e| DroidTapError::Display(format!("update window: {e}")))?;

        if self.window.is_key_down(Key::Escape) {
            self.closed = true;
            return Ok(Vec::new());
        }

        if !self.primary.update(self.window.get_mouse_down(MouseButton::Left)) {
            return Ok(Vec::new());
        }
        Ok(self.pointer().into_iter().collect())
    }
}
