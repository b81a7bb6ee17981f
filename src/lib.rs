pub mod calibrator;
pub mod cli;
pub mod config;
pub mod device;
pub mod errors;
pub mod poller;
pub mod vision;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use crate::calibrator::Calibrator;
use crate::config::AppConfig;
use crate::device::{AdbDriver, DeviceDriver};
use crate::errors::DroidTapResult;
use crate::poller::loop_control::{LoopController, LoopMode};
use crate::poller::SimilarityPoller;
use crate::vision::histogram::Histogram;
use crate::vision::screenshot::Screenshot;
use crate::vision::transform::CalibratedTarget;

pub fn run() -> DroidTapResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let args = cli::Args::parse();
    let mut config = config::load_config(args.config.as_deref())?;
    args.apply(&mut config);

    if let Some(path) = &args.write_config {
        return config::save_config(&config, path);
    }

    // One logical flow: every device call and image step finishes before the next starts.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let driver: Arc<dyn DeviceDriver> = Arc::new(AdbDriver::from_config(&config.device));
    runtime.block_on(async {
        run_session(
            &config,
            args.reuse_reference,
            driver,
            |calibrator, reference| calibrator.calibrate(reference),
            interruptible_loop,
        )
        .await
        .map(|_| ())
    })
}

/// Poll until Ctrl-C. The handler is installed only when this is called, so an
/// interrupt during calibration still terminates the process.
fn interruptible_loop() -> LoopController {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let flag = stop_flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; stopping after the current iteration");
            flag.store(true, Ordering::Relaxed);
        }
    });
    LoopController::new(LoopMode::UntilStopped, stop_flag)
}

/// wake → capture reference → calibrate → poll.
///
/// Returns `None` when calibration recorded no click, otherwise the number of
/// completed poll iterations.
async fn run_session<C, L>(
    config: &AppConfig,
    reuse_reference: bool,
    driver: Arc<dyn DeviceDriver>,
    calibrate: C,
    start_loop: L,
) -> DroidTapResult<Option<u64>>
where
    C: FnOnce(&Calibrator, &Screenshot) -> DroidTapResult<Option<CalibratedTarget>>,
    L: FnOnce() -> LoopController,
{
    let calibrator = Calibrator::new(&config.calibration)?;
    let reference_path = &config.calibration.reference_path;

    if config.device.wake_on_start {
        driver.wake().await?;
    }
    if reuse_reference {
        tracing::info!(path = %reference_path.display(), "reusing existing reference screenshot");
    } else {
        driver.capture_screenshot_to_file(reference_path).await?;
        tracing::info!(path = %reference_path.display(), "reference screenshot captured");
    }

    let reference = calibrator.load_reference_image(reference_path)?;
    let Some(target) = calibrate(&calibrator, &reference)? else {
        println!("No click was made; no coordinates recorded.");
        return Ok(None);
    };
    println!("Final coordinates: {target}");

    let reference_hist = Histogram::from_screenshot(&reference);
    drop(reference);

    let mut poller = SimilarityPoller::new(driver, reference_hist, target, &config.poller, start_loop());
    let iterations = poller.run_loop().await?;
    Ok(Some(iterations))
}
