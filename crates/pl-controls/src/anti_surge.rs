//! Anti-surge "kick" parameters.
//!
//! Compressor recycle controllers open their valve fast when the operating
//! point approaches the surge line, then close it back at a rate-limited
//! pace. The kick is realized as a feed-forward term added to the ordinary
//! PID output.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntiSurgeParams {
    /// Kick when the negated control error falls below this value (often
    /// zero or slightly negative).
    pub kick_below_threshold_e: f64,

    /// Opening rate of the kick, in percent per second.
    pub kick_prc_per_sec: f64,

    /// After a kick, the valve closure is rate-limited to this many percent
    /// per minute. `None` snaps the kick term straight back to zero.
    pub ff_ramp_down_rate_prc_per_min: Option<f64>,
}

impl AntiSurgeParams {
    pub fn new(kick_prc_per_sec: f64, ff_ramp_down_rate_prc_per_min: Option<f64>) -> Self {
        Self {
            kick_below_threshold_e: -5.0,
            kick_prc_per_sec,
            ff_ramp_down_rate_prc_per_min,
        }
    }

    pub fn with_threshold(mut self, kick_below_threshold_e: f64) -> Self {
        self.kick_below_threshold_e = kick_below_threshold_e;
        self
    }
}
