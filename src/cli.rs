use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, CaptureMode};

/// Tap an Android screen whenever it looks like a reference screenshot.
///
/// Wakes the device, captures the reference screenshot, lets you click the
/// tap target on a preview, then polls forever and taps on every match.
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Args {
    /// Config file (default: config.toml next to the binary, in the working dir, or in the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reference screenshot path
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Latest screenshot path, overwritten every iteration
    #[arg(long)]
    pub latest: Option<PathBuf>,

    /// Minimum correlation (exclusive) that triggers a tap
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Maximum preview width in pixels
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Maximum preview height in pixels
    #[arg(long)]
    pub max_height: Option<u32>,

    /// Device serial (adb -s)
    #[arg(long)]
    pub serial: Option<String>,

    /// adb executable
    #[arg(long)]
    pub adb: Option<String>,

    #[arg(long, value_enum)]
    pub capture_mode: Option<CaptureMode>,

    /// Pause between poll iterations
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Calibrate against the existing reference file instead of capturing a new one
    #[arg(long)]
    pub reuse_reference: bool,

    /// Do not send the wake key event
    #[arg(long)]
    pub no_wake: bool,

    /// Write the effective configuration to this path and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,
}

impl Args {
    /// Command-line values override whatever the config file said.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(p) = &self.reference {
            config.calibration.reference_path = p.clone();
        }
        if let Some(p) = &self.latest {
            config.poller.latest_path = p.clone();
        }
        if let Some(t) = self.threshold {
            config.poller.threshold = t;
        }
        if let Some(w) = self.max_width {
            config.calibration.max_width = w;
        }
        if let Some(h) = self.max_height {
            config.calibration.max_height = h;
        }
        if let Some(s) = &self.serial {
            config.device.serial = Some(s.clone());
        }
        if let Some(a) = &self.adb {
            config.device.adb_path = a.clone();
        }
        if let Some(m) = self.capture_mode {
            config.device.capture_mode = m;
        }
        if let Some(ms) = self.interval_ms {
            config.poller.interval_ms = ms;
        }
        if self.no_wake {
            config.device.wake_on_start = false;
        }
    }
}
