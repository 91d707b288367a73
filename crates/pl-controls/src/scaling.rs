//! Input/output scaling of a pid-controller.
//!
//! Vendors differ on whether the proportional gain acts on engineering units
//! or on percent-of-range values. When `scales_kp` is set, the configured Kp
//! is interpreted against the y- and u-ranges; otherwise Kp applies to
//! unscaled values directly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidScaling {
    y_min: f64,
    y_max: f64,
    u_min: f64,
    u_max: f64,
    scales_kp: bool,
    is_default: bool,
}

impl Default for PidScaling {
    fn default() -> Self {
        Self {
            y_min: 0.0,
            y_max: 100.0,
            u_min: 0.0,
            u_max: 100.0,
            scales_kp: false,
            is_default: true,
        }
    }
}

impl PidScaling {
    pub fn new(y_min: f64, y_max: f64, u_min: f64, u_max: f64, scales_kp: bool) -> Self {
        Self {
            y_min,
            y_max,
            u_min,
            u_max,
            scales_kp,
            is_default: false,
        }
    }

    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn u_min(&self) -> f64 {
        self.u_min
    }

    pub fn u_max(&self) -> f64 {
        self.u_max
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_kp_scaling_on(&self) -> bool {
        self.scales_kp
    }

    /// Express an absolute y value as a fraction of the y-range.
    pub fn scale_y(&self, y_abs: f64) -> f64 {
        (y_abs - self.y_min) / (self.y_max - self.y_min)
    }

    fn y_scale_factor(&self) -> f64 {
        if self.scales_kp {
            let range = self.y_max - self.y_min;
            if range > 0.0 {
                100.0 / range
            } else {
                1.0
            }
        } else {
            1.0
        }
    }

    fn u_scale_factor(&self) -> f64 {
        if self.scales_kp {
            let range = self.u_max - self.u_min;
            if range > 0.0 {
                100.0 / range
            } else {
                1.0
            }
        } else {
            1.0
        }
    }

    /// Factor the configured Kp is divided by to get the internally applied
    /// gain.
    pub fn kp_scaling_factor(&self) -> f64 {
        self.y_scale_factor() / self.u_scale_factor()
    }
}
