use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::DroidTapResult;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Path or name of the `adb` executable.
    #[serde(default = "default_adb_path")]
    pub adb_path: String,
    /// Device serial passed as `adb -s <serial>`. Needed only with several devices attached.
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub capture_mode: CaptureMode,
    /// Scratch file on the device, used by `CaptureMode::Pull`.
    #[serde(default = "default_remote_path")]
    pub remote_screenshot_path: String,
    /// Send a wake key event before capturing the reference screenshot.
    #[serde(default = "default_true")]
    pub wake_on_start: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            serial: None,
            capture_mode: CaptureMode::default(),
            remote_screenshot_path: default_remote_path(),
            wake_on_start: true,
        }
    }
}

/// How a screenshot travels from the device to the local file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// `adb exec-out screencap -p`, streamed straight into the local file.
    #[default]
    ExecOut,
    /// `adb shell screencap` to device storage, then `adb pull`.
    Pull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default = "default_reference_path")]
    pub reference_path: PathBuf,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    #[serde(default = "default_window_title")]
    pub window_title: String,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            reference_path: default_reference_path(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            window_title: default_window_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Minimum correlation (exclusive) that fires a tap.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Overwritten on every iteration.
    #[serde(default = "default_latest_path")]
    pub latest_path: PathBuf,
    /// Pause between iterations. Zero polls back to back.
    #[serde(default)]
    pub interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            latest_path: default_latest_path(),
            interval_ms: 0,
        }
    }
}

fn default_adb_path() -> String {
    "adb".into()
}

fn default_remote_path() -> String {
    "/sdcard/screenshot.png".into()
}

fn default_true() -> bool {
    true
}

fn default_reference_path() -> PathBuf {
    PathBuf::from("target.png")
}

fn default_max_width() -> u32 {
    800
}

fn default_max_height() -> u32 {
    600
}

fn default_window_title() -> String {
    "Mobile Screen".into()
}

fn default_threshold() -> f64 {
    0.95
}

fn default_latest_path() -> PathBuf {
    PathBuf::from("screenshot.png")
}

/// Looks for `config.toml` next to the executable, then in the working
/// directory, then under the user config dir. `None` if none exists.
fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(CONFIG_FILE);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    let candidate = dirs::config_dir()?.join("droidtap").join(CONFIG_FILE);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in user config dir");
        return Some(candidate);
    }
    None
}

/// Load the config from `explicit` or the default search path.
///
/// An explicit path must exist. Without one, a missing file yields the
/// defaults. A file that exists but does not parse is always an error.
pub fn load_config(explicit: Option<&Path>) -> DroidTapResult<AppConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => resolve_config_path(),
    };
    let mut config = match path {
        Some(p) => load_config_from(&p)?,
        None => {
            tracing::info!("no config.toml found; using defaults");
            AppConfig::default()
        }
    };
    config.apply_env();
    Ok(config)
}

pub fn load_config_from(path: &Path) -> DroidTapResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> DroidTapResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

impl AppConfig {
    /// `DROIDTAP_ADB` and `DROIDTAP_SERIAL` override the device section.
    pub fn apply_env(&mut self) {
        if let Ok(adb) = std::env::var("DROIDTAP_ADB") {
            if !adb.is_empty() {
                self.device.adb_path = adb;
            }
        }
        if let Ok(serial) = std::env::var("DROIDTAP_SERIAL") {
            if !serial.is_empty() {
                self.device.serial = Some(serial);
            }
        }
    }
}
