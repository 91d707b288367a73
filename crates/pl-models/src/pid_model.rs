//! Simulatable PID controller: wraps [`PidController`] into the shared model
//! capability.
//!
//! To simulate minimum or maximum select control, combine this model with a
//! [`crate::SelectModel`] and feed the selector output back into the
//! tracking input slot.

use pl_controls::{PidController, PidParameters, PidStatus};
use pl_core::SignalId;

use crate::delay::SampleDelay;
use crate::error::ModelError;
use crate::model::{ModelIo, ModelKind, SimulatableModel};

/// Fixed input slot layout of a PID model.
pub mod pid_slots {
    /// Measured process value.
    pub const Y_MEAS: usize = 0;
    /// Setpoint.
    pub const SETPOINT: usize = 1;
    /// Tracking signal (select-block output), optional.
    pub const TRACKING: usize = 2;
    /// Gain-scheduling variable, optional.
    pub const GAIN_SCHED: usize = 3;
    /// Feed-forward variable, optional.
    pub const FEED_FORWARD: usize = 4;
}

#[derive(Debug, Clone, Copy)]
struct WarmStartPoint {
    y_process: f64,
    y_set: f64,
    u: f64,
}

#[derive(Debug, Clone)]
pub struct PidModel {
    io: ModelIo,
    params: PidParameters,
    pid: Option<PidController>,
    warm: Option<WarmStartPoint>,
    delay: Option<SampleDelay>,
    manual_requested: bool,
    manual_output: Option<f64>,
}

impl PidModel {
    pub fn new(params: PidParameters, id: impl Into<String>) -> Self {
        // minimum is two inputs; scheduling and feed-forward claim their
        // slots up front so connection code can see them
        let mut n_inputs = 2;
        if params.gain_scheduling.is_some() {
            n_inputs = pid_slots::GAIN_SCHED + 1;
        }
        if params.feed_forward.is_some() {
            n_inputs = pid_slots::FEED_FORWARD + 1;
        }
        Self {
            io: ModelIo::new(id, n_inputs),
            params,
            pid: None,
            warm: None,
            delay: None,
            manual_requested: false,
            manual_output: None,
        }
    }

    pub fn params(&self) -> &PidParameters {
        &self.params
    }

    /// The controller's status after the latest iteration, if it has run.
    pub fn status(&self) -> Option<PidStatus> {
        self.pid.as_ref().map(PidController::status)
    }

    /// Put the controller in manual (constant output) mode.
    pub fn set_manual_mode(&mut self) {
        self.manual_requested = true;
        if let Some(pid) = &mut self.pid {
            pid.set_manual_mode();
        }
    }

    pub fn set_auto_mode(&mut self) {
        self.manual_requested = false;
        if let Some(pid) = &mut self.pid {
            pid.set_auto_mode();
        }
    }

    /// Desired output while in manual mode.
    pub fn set_manual_output(&mut self, u_manual: f64) {
        self.manual_output = Some(u_manual);
        if let Some(pid) = &mut self.pid {
            pid.set_manual_output(u_manual);
        }
    }

    fn build_controller(&self, time_base_s: f64) -> PidController {
        let mut pid = PidController::from_params(&self.params, time_base_s);
        if let Some(warm) = self.warm {
            pid.warm_start(warm.y_process, warm.y_set, warm.u);
        }
        if self.manual_requested {
            pid.set_manual_mode();
        }
        if let Some(u_manual) = self.manual_output {
            pid.set_manual_output(u_manual);
        }
        pid
    }
}

impl SimulatableModel for PidModel {
    fn id(&self) -> &str {
        self.io.id()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Pid
    }

    fn output_id(&self) -> SignalId {
        self.io.output_id_or(ModelKind::Pid)
    }

    fn set_output_id(&mut self, id: SignalId) {
        self.io.set_output_id(id)
    }

    fn input_ids(&self) -> &[Option<SignalId>] {
        self.io.input_ids()
    }

    fn set_input_id(&mut self, slot: usize, id: SignalId) {
        self.io.set_input_id(slot, id)
    }

    fn additive_input_ids(&self) -> &[SignalId] {
        self.io.additive_input_ids()
    }

    fn add_additive_input(&mut self, id: SignalId) {
        self.io.add_additive_input(id)
    }

    fn check_simulatable(&self) -> Result<(), ModelError> {
        let bad = |v: f64| !v.is_finite() || v == self.params.bad_data_value;
        if bad(self.params.kp) {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "illegal or missing Kp".into(),
            });
        }
        if bad(self.params.ti_s) {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "illegal or missing Ti".into(),
            });
        }
        if bad(self.params.td_s) {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "illegal or missing Td".into(),
            });
        }
        if self.io.input_ids().len() < 2 {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "fewer than two inputs".into(),
            });
        }
        for slot in [pid_slots::Y_MEAS, pid_slots::SETPOINT] {
            if self.io.input_ids()[slot].is_none() {
                return Err(ModelError::UnresolvedInput {
                    model: self.id().to_string(),
                    slot,
                });
            }
        }
        Ok(())
    }

    fn steady_state_output(&self, _inputs: &[f64]) -> Option<f64> {
        // controllers are seeded by the initializer, never solved
        None
    }

    fn steady_state_input(&self, _y0: f64, _free_slot: usize, _given: &[f64]) -> Option<f64> {
        None
    }

    fn warm_start(&mut self, inputs: &[f64], output: f64) {
        if inputs.len() < 2 {
            return;
        }
        self.warm = Some(WarmStartPoint {
            y_process: inputs[pid_slots::Y_MEAS],
            y_set: inputs[pid_slots::SETPOINT],
            u: output,
        });
        // recreate the controller on the next iterate so filters restart
        self.pid = None;
        self.delay = None;
    }

    fn iterate(&mut self, inputs: &[f64], time_base_s: f64) -> f64 {
        if inputs.len() < 2 {
            return f64::NAN;
        }
        let y_process = inputs[pid_slots::Y_MEAS];
        let y_set = inputs[pid_slots::SETPOINT];
        let not_nan = |v: &f64| !v.is_nan();
        let tracking = inputs.get(pid_slots::TRACKING).copied().filter(not_nan);
        let gain_sched = inputs.get(pid_slots::GAIN_SCHED).copied().filter(not_nan);
        let feed_forward = inputs
            .get(pid_slots::FEED_FORWARD)
            .copied()
            .filter(not_nan);

        // the controller object is created on first use (or after a warm
        // start) so its filters restart from the seeded state
        if self.pid.is_none() {
            self.pid = Some(self.build_controller(time_base_s));
        }
        let u = match self.pid.as_mut() {
            Some(pid) => pid.iterate(y_process, y_set, tracking, gain_sched, feed_forward),
            None => return f64::NAN,
        };

        let delay_samples = usize::from(self.params.delay_output_one_sample);
        self.delay
            .get_or_insert_with(|| SampleDelay::new(delay_samples))
            .delay(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(kp: f64, ti_s: f64) -> PidModel {
        PidModel::new(
            PidParameters {
                kp,
                ti_s,
                ..Default::default()
            },
            "pid",
        )
    }

    #[test]
    fn warm_started_model_is_steady() {
        let mut m = model(0.5, 20.0);
        m.warm_start(&[50.0, 50.0], 30.0);
        for _ in 0..10 {
            assert_eq!(m.iterate(&[50.0, 50.0], 1.0), 30.0);
        }
    }

    #[test]
    fn too_few_inputs_yields_nan() {
        let mut m = model(0.5, 20.0);
        assert!(m.iterate(&[50.0], 1.0).is_nan());
    }

    #[test]
    fn status_reported_after_iterate() {
        let mut m = model(0.5, 20.0);
        assert_eq!(m.status(), None);
        m.warm_start(&[50.0, 50.0], 30.0);
        m.iterate(&[50.0, 50.0], 1.0);
        assert_eq!(m.status(), Some(PidStatus::Auto));
    }

    #[test]
    fn nan_tracking_input_means_no_tracking() {
        let mut m = model(0.5, 20.0);
        m.warm_start(&[50.0, 50.0], 30.0);
        m.iterate(&[50.0, 50.0, f64::NAN], 1.0);
        assert_eq!(m.status(), Some(PidStatus::Auto));
    }

    #[test]
    fn one_sample_output_delay() {
        let mut m = PidModel::new(
            PidParameters {
                kp: 1.0,
                ti_s: 10.0,
                delay_output_one_sample: true,
                ..Default::default()
            },
            "pid",
        );
        m.warm_start(&[50.0, 50.0], 30.0);
        let u0 = m.iterate(&[50.0, 50.0], 1.0);
        assert_eq!(u0, 30.0);
        // step the setpoint: the response only shows one sample later
        let u1 = m.iterate(&[50.0, 51.0], 1.0);
        assert_eq!(u1, 30.0);
        let u2 = m.iterate(&[50.0, 51.0], 1.0);
        assert!(u2 > 30.0);
    }

    #[test]
    fn manual_mode_requested_before_first_iterate() {
        let mut m = model(0.5, 20.0);
        m.set_manual_mode();
        m.warm_start(&[50.0, 50.0], 30.0);
        assert_eq!(m.iterate(&[10.0, 50.0], 1.0), 30.0);
        assert_eq!(m.status(), Some(PidStatus::Manual));
    }

    #[test]
    fn missing_setpoint_wiring_detected() {
        let mut m = model(0.5, 20.0);
        m.set_input_id(pid_slots::Y_MEAS, SignalId::external("y"));
        assert!(matches!(
            m.check_simulatable(),
            Err(ModelError::UnresolvedInput { slot: 1, .. })
        ));
    }
}
