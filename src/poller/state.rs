/// Poller lifecycle. `Triggered` lasts for one tap, then the poller is back to `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Waiting,
    Triggered,
}

/// What one capture-and-compare iteration observed.
#[derive(Debug, Clone)]
pub struct PollReport {
    pub iteration: u64,
    pub score: f64,
    /// `score * 100` truncated toward zero.
    pub percent: i64,
    pub tapped: bool,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Strictly greater: a score equal to the threshold does not fire.
pub fn exceeds_threshold(score: f64, threshold: f64) -> bool {
    score > threshold
}

pub fn similarity_percent(score: f64) -> i64 {
    (score * 100.0).trunc() as i64
}
