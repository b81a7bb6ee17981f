// adb-backed device driver.
use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::{CaptureMode, DeviceConfig};
use crate::device::driver::DeviceDriver;
use crate::errors::{DroidTapError, DroidTapResult};

/// `KEYCODE_WAKEUP`
const KEYCODE_WAKEUP: &str = "224";

pub struct AdbDriver {
    adb_path: String,
    serial: Option<String>,
    capture_mode: CaptureMode,
    remote_path: String,
}

impl AdbDriver {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            adb_path: config.adb_path.clone(),
            serial: config.serial.clone(),
            capture_mode: config.capture_mode,
            remote_path: config.remote_screenshot_path.clone(),
        }
    }

    /// Full argument vector for `adb`, including the serial selector.
    fn argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            argv.push("-s".to_string());
            argv.push(serial.clone());
        }
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    fn command_line(&self, argv: &[String]) -> String {
        std::iter::once(self.adb_path.as_str())
            .chain(argv.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run `adb <args>` to completion and return its stdout.
    async fn run(&self, args: &[&str]) -> DroidTapResult<Vec<u8>> {
        let argv = self.argv(args);
        let command = self.command_line(&argv);
        tracing::debug!(command = %command, "running device command");

        let output = Command::new(&self.adb_path)
            .args(&argv)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DroidTapError::DeviceCommand {
                command: command.clone(),
                detail: format!("cannot start: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DroidTapError::DeviceCommand {
                command,
                detail: format!("{} ({})", output.status, stderr.trim()),
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl DeviceDriver for AdbDriver {
    async fn wake(&self) -> DroidTapResult<()> {
        self.run(&["shell", "input", "keyevent", KEYCODE_WAKEUP]).await?;
        tracing::info!("wake key sent");
        Ok(())
    }

    async fn capture_screenshot_to_file(&self, local_path: &Path) -> DroidTapResult<()> {
        let local = local_path.to_string_lossy();
        match self.capture_mode {
            CaptureMode::ExecOut => {
                let png = self.run(&["exec-out", "screencap", "-p"]).await?;
                if png.is_empty() {
                    return Err(DroidTapError::DeviceCommand {
                        command: self.command_line(&self.argv(&["exec-out", "screencap", "-p"])),
                        detail: "empty screenshot".into(),
                    });
                }
                tokio::fs::write(local_path, png).await?;
            }
            CaptureMode::Pull => {
                self.run(&["shell", "screencap", "-p", self.remote_path.as_str()]).await?;
                self.run(&["pull", self.remote_path.as_str(), local.as_ref()]).await?;
            }
        }
        tracing::debug!(path = %local, mode = ?self.capture_mode, "screenshot captured");
        Ok(())
    }

    async fn tap(&self, x: u32, y: u32) -> DroidTapResult<()> {
        let (xs, ys) = (x.to_string(), y.to_string());
        self.run(&["shell", "input", "tap", xs.as_str(), ys.as_str()]).await?;
        tracing::info!(x, y, "tap sent");
        Ok(())
    }
}
