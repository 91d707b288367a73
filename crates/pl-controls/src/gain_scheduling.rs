//! Gain scheduling: Kp (and optionally Ti) as a piecewise-linear function of
//! an auxiliary process variable.
//!
//! The schedule is defined on three segments between four breakpoints
//! `x_min < x1 < x2 < x_max`. The schedule variable is low-pass filtered by
//! the controller before interpolation so that scheduling does not chatter on
//! measurement noise.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSchedule {
    /// Schedule Kp from the schedule variable.
    pub schedule_kp: bool,
    /// Also schedule Ti.
    pub schedule_ti: bool,

    /// Time constant of the low-pass filtering of the schedule variable.
    pub variable_filter_tc_s: f64,

    pub x_min: f64,
    pub x1: f64,
    pub x2: f64,
    pub x_max: f64,

    pub kp_min: f64,
    pub kp1: f64,
    pub kp2: f64,
    pub kp_max: f64,

    pub ti_min: f64,
    pub ti1: f64,
    pub ti2: f64,
    pub ti_max: f64,
}

impl Default for GainSchedule {
    fn default() -> Self {
        Self {
            schedule_kp: false,
            schedule_ti: false,
            variable_filter_tc_s: 0.0,
            x_min: 0.0,
            x1: 0.0,
            x2: 0.0,
            x_max: 0.0,
            kp_min: 0.0,
            kp1: 0.0,
            kp2: 0.0,
            kp_max: 0.0,
            ti_min: 0.0,
            ti1: 0.0,
            ti2: 0.0,
            ti_max: 0.0,
        }
    }
}

fn interpolate(x: f64, x1: f64, x2: f64, y1: f64, y2: f64) -> f64 {
    (y2 - y1) / (x2 - x1) * (x - x1) + y1
}

impl GainSchedule {
    /// Interpolated (Kp, Ti) at the given (already filtered) schedule
    /// variable. Inactive dimensions return `None`.
    pub fn kp_and_ti(&self, x: f64) -> (Option<f64>, Option<f64>) {
        let kp = if self.schedule_kp {
            let (x1, x2, y1, y2) = if x < self.x1 {
                (self.x_min, self.x1, self.kp_min, self.kp1)
            } else if x > self.x2 {
                (self.x2, self.x_max, self.kp2, self.kp_max)
            } else {
                (self.x1, self.x2, self.kp1, self.kp2)
            };
            Some(interpolate(x, x1, x2, y1, y2))
        } else {
            None
        };

        let ti = if self.schedule_ti {
            let (x1, x2, y1, y2) = if x < self.x1 {
                (self.x_min, self.x1, self.ti_min, self.ti1)
            } else if x > self.x2 {
                (self.x2, self.x_max, self.ti2, self.ti_max)
            } else {
                (self.x1, self.x2, self.ti1, self.ti2)
            };
            Some(interpolate(x, x1, x2, y1, y2))
        } else {
            None
        };

        (kp, ti)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> GainSchedule {
        GainSchedule {
            schedule_kp: true,
            x_min: 0.0,
            x1: 10.0,
            x2: 20.0,
            x_max: 30.0,
            kp_min: 1.0,
            kp1: 2.0,
            kp2: 4.0,
            kp_max: 8.0,
            ..Default::default()
        }
    }

    #[test]
    fn interpolates_at_breakpoints() {
        let gs = schedule();
        assert_eq!(gs.kp_and_ti(0.0).0, Some(1.0));
        assert_eq!(gs.kp_and_ti(10.0).0, Some(2.0));
        assert_eq!(gs.kp_and_ti(20.0).0, Some(4.0));
        assert_eq!(gs.kp_and_ti(30.0).0, Some(8.0));
    }

    #[test]
    fn interpolates_between_breakpoints() {
        let gs = schedule();
        assert_eq!(gs.kp_and_ti(15.0).0, Some(3.0));
        assert_eq!(gs.kp_and_ti(25.0).0, Some(6.0));
    }

    #[test]
    fn extrapolates_outside_range() {
        // below x_min the first segment's line continues
        let gs = schedule();
        assert_eq!(gs.kp_and_ti(-10.0).0, Some(0.0));
    }

    #[test]
    fn ti_inactive_by_default() {
        let gs = schedule();
        assert_eq!(gs.kp_and_ti(15.0).1, None);
    }

    #[test]
    fn inactive_schedule_returns_none() {
        let gs = GainSchedule::default();
        assert_eq!(gs.kp_and_ti(5.0), (None, None));
    }
}
