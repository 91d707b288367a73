//! Low-pass filtering of scan-sampled signals.
//!
//! The filter is a recursive (IIR) form: few coefficients, little memory,
//! causal. Causality costs a phase shift, which is exactly the behavior of
//! the filters found in real control systems.

use pl_core::{is_bad, BAD_DATA_SENTINEL};
use serde::{Deserialize, Serialize};

/// First- or second-order recursive low-pass filter.
#[derive(Debug, Clone)]
pub struct LowPass {
    time_base_s: f64,
    prev: f64,
    prev_order2: f64,
    samples_seen: u32,
}

impl LowPass {
    /// `time_base_s` is the interval between samples fed to [`Self::filter`].
    pub fn new(time_base_s: f64) -> Self {
        Self {
            time_base_s,
            prev: f64::NAN,
            prev_order2: f64::NAN,
            samples_seen: 0,
        }
    }

    /// Filter a single sample.
    ///
    /// `order` 1 or 2 is supported; anything else passes the signal through.
    /// `reset` forces the filter state to the incoming sample (always the
    /// case for the first sample).
    pub fn filter(&mut self, signal: f64, filter_tc_s: f64, order: u32, reset: bool) -> f64 {
        if self.samples_seen < 2 {
            self.samples_seen += 1;
        }
        // a cutoff close to the sampling frequency fails-to-safe: no filtering
        let mut a = if filter_tc_s < 0.4 * self.time_base_s {
            0.0
        } else {
            1.0 / (1.0 + self.time_base_s / filter_tc_s)
        };
        if a.is_nan() {
            a = 0.0;
        }

        let mut filtered = signal;
        let prev_usable =
            !(self.prev.is_nan() || self.prev.is_infinite() || self.prev == BAD_DATA_SENTINEL);
        if prev_usable {
            match order {
                1 => {
                    filtered = a * self.prev + (1.0 - a) * signal;
                }
                2 => {
                    let prev2 = if is_bad(self.prev_order2) {
                        signal
                    } else {
                        self.prev_order2
                    };
                    let order2 = a * prev2 + (1.0 - a) * signal;
                    filtered = a * self.prev + (1.0 - a) * order2;
                    self.prev_order2 = order2;
                }
                _ => {
                    filtered = signal;
                }
            }
        }
        self.prev = filtered;

        if reset || self.samples_seen <= 1 {
            self.prev = signal;
            self.prev_order2 = signal;
            filtered = signal;
        }
        filtered
    }
}

/// How a pid-controller should low-pass filter its process-value input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidFilterParams {
    /// Time constant in seconds of the low-pass filter.
    pub time_constant_s: f64,
    /// Filter order: 0 (off), 1 or 2.
    pub order: u32,
    pub enabled: bool,
}

impl Default for PidFilterParams {
    fn default() -> Self {
        Self {
            time_constant_s: 0.0,
            order: 0,
            enabled: false,
        }
    }
}

/// Process-value filter of a pid-controller.
///
/// Second order is realized by cascading two first-order stages.
#[derive(Debug, Clone)]
pub struct PidFilter {
    params: PidFilterParams,
    stage1: LowPass,
    stage2: LowPass,
}

impl PidFilter {
    pub fn new(params: PidFilterParams, time_base_s: f64) -> Self {
        Self {
            params,
            stage1: LowPass::new(time_base_s),
            stage2: LowPass::new(time_base_s),
        }
    }

    pub fn params(&self) -> &PidFilterParams {
        &self.params
    }

    pub fn filter(&mut self, y: f64) -> f64 {
        if !self.params.enabled || self.params.time_constant_s <= 0.0 {
            return y;
        }
        match self.params.order {
            1 => self.stage1.filter(y, self.params.time_constant_s, 1, false),
            2 => {
                let y1 = self.stage1.filter(y, self.params.time_constant_s, 1, false);
                self.stage2.filter(y1, self.params.time_constant_s, 1, false)
            }
            _ => y,
        }
    }
}
