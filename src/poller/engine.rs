use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::PollerConfig;
use crate::device::DeviceDriver;
use crate::errors::{DroidTapError, DroidTapResult};
use crate::poller::loop_control::LoopController;
use crate::poller::state::{exceeds_threshold, similarity_percent, PollReport, PollerState};
use crate::vision::histogram::Histogram;
use crate::vision::transform::CalibratedTarget;

/// Captures, compares against the reference histogram, and taps on a match.
///
/// A match that persists taps again on every iteration; there is no debounce.
pub struct SimilarityPoller {
    driver: Arc<dyn DeviceDriver>,
    reference: Histogram,
    target: CalibratedTarget,
    threshold: f64,
    latest_path: PathBuf,
    interval: Duration,
    state: PollerState,
    loop_ctrl: LoopController,
}

impl SimilarityPoller {
    pub fn new(
        driver: Arc<dyn DeviceDriver>,
        reference: Histogram,
        target: CalibratedTarget,
        config: &PollerConfig,
        loop_ctrl: LoopController,
    ) -> Self {
        Self {
            driver,
            reference,
            target,
            threshold: config.threshold,
            latest_path: config.latest_path.clone(),
            interval: Duration::from_millis(config.interval_ms),
            state: PollerState::Waiting,
            loop_ctrl,
        }
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Poll until the loop controller says stop. Any device or image failure
    /// ends the loop with that error, unless a stop was already requested when
    /// it surfaced (Ctrl-C also interrupts the adb child); that iteration is
    /// dropped and the loop ends cleanly. Returns the completed iterations.
    pub async fn run_loop(&mut self) -> DroidTapResult<u64> {
        tracing::info!(
            x = self.target.x,
            y = self.target.y,
            threshold = self.threshold,
            "similarity polling started"
        );
        let mut completed = 0;
        while !self.loop_ctrl.should_stop() {
            if let Err(e) = self.poll_once().await {
                if !self.loop_ctrl.stop_requested() {
                    return Err(e);
                }
                tracing::info!(error = %e, "iteration interrupted by stop request");
                break;
            }
            completed += 1;
            if !self.interval.is_zero() && !self.loop_ctrl.should_stop() {
                tokio::time::sleep(self.interval).await;
            }
        }
        tracing::info!(iterations = completed, "similarity polling stopped");
        Ok(completed)
    }

    /// One iteration: capture, score, and tap if the score clears the threshold.
    pub async fn poll_once(&mut self) -> DroidTapResult<PollReport> {
        self.loop_ctrl.record_iteration();
        let iteration = self.loop_ctrl.iterations();

        self.driver.capture_screenshot_to_file(&self.latest_path).await?;

        // Decoding a full-resolution PNG is CPU-bound; keep it off the reactor.
        let path = self.latest_path.clone();
        let current = tokio::task::spawn_blocking(move || Histogram::from_path(&path))
            .await
            .map_err(|e| DroidTapError::image_load(&self.latest_path, format!("histogram worker: {e}")))??;

        let score = current.correlate(&self.reference);
        let percent = similarity_percent(score);
        tracing::info!(iteration, percent, "similarity {percent}%");
        tracing::debug!(iteration, score, "raw correlation");

        let tapped = exceeds_threshold(score, self.threshold);
        if tapped {
            self.state = PollerState::Triggered;
            tracing::info!(x = self.target.x, y = self.target.y, percent, "screen matched; tapping");
            self.driver.tap(self.target.x, self.target.y).await?;
            self.state = PollerState::Waiting;
        }

        Ok(PollReport {
            iteration,
            score,
            percent,
            tapped,
            at: chrono::Utc::now(),
        })
    }
}
