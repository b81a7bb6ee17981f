use std::path::Path;

use async_trait::async_trait;

use crate::errors::DroidTapResult;

/// Everything the tool needs from the phone. Every call blocks the flow until
/// the device has finished and fails loudly on any error.
#[async_trait]
pub trait DeviceDriver: Send + Sync {
    /// Turn the screen on if it is off.
    async fn wake(&self) -> DroidTapResult<()>;

    /// Write a PNG of the current screen to `local_path`, replacing any previous file.
    async fn capture_screenshot_to_file(&self, local_path: &Path) -> DroidTapResult<()>;

    /// Inject a touch at device-native pixel coordinates.
    async fn tap(&self, x: u32, y: u32) -> DroidTapResult<()>;
}
