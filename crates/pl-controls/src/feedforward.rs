//! General feed-forward configuration.
//!
//! The feed-forward variable is run through a pair of low-pass filters; with
//! both time constants positive the term acts band-pass (responds to changes
//! between the two time scales), otherwise only the faster filter applies.
//! The controller adds the *change* in the term to its output each scan, so
//! activating feed-forward is bumpless.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedForward {
    pub active: bool,

    /// Gain applied to the filtered feed-forward signal.
    pub gain: f64,

    /// Time constant of the slow (low-pass) leg.
    pub lp_time_constant_s: f64,
    /// Time constant of the fast (high-pass) leg.
    pub hp_time_constant_s: f64,

    pub lp_filter_order: u32,
    pub hp_filter_order: u32,
}

impl Default for FeedForward {
    fn default() -> Self {
        Self {
            active: false,
            gain: 0.0,
            lp_time_constant_s: 0.0,
            hp_time_constant_s: 0.0,
            lp_filter_order: 1,
            hp_filter_order: 1,
        }
    }
}
