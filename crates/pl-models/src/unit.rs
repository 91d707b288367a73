//! First-order-lag process unit model.
//!
//! A static gain curve (linear, optionally with second-order curvature)
//! filtered through a first-order lag and an optional dead time. Disturbances
//! are additive signals on the output. The model supports both directions of
//! steady-state reasoning: output from inputs, and one free input from a
//! desired output.

use pl_controls::LowPass;
use pl_core::{is_bad_value, SignalId, BAD_DATA_SENTINEL};
use serde::{Deserialize, Serialize};

use crate::delay::SampleDelay;
use crate::error::ModelError;
use crate::model::{ModelIo, ModelKind, SimulatableModel};

/// Parameters of a [`UnitModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitParameters {
    /// First-order lag time constant.
    pub time_constant_s: f64,
    /// Dead time, rounded to whole samples at simulation time.
    pub time_delay_s: f64,
    /// One gain per input.
    pub linear_gains: Vec<f64>,
    /// Input operating points; gains act on `u - u0`.
    pub u0: Option<Vec<f64>>,
    /// Curvature normalization divisors.
    pub u_norm: Option<Vec<f64>>,
    /// Second-order curvature gains per input.
    pub curvatures: Option<Vec<f64>>,
    /// Output bias.
    pub bias: f64,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
}

impl Default for UnitParameters {
    fn default() -> Self {
        Self {
            time_constant_s: 0.0,
            time_delay_s: 0.0,
            linear_gains: vec![1.0],
            u0: None,
            u_norm: None,
            curvatures: None,
            bias: 0.0,
            y_min: None,
            y_max: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitModel {
    io: ModelIo,
    params: UnitParameters,
    filter: Option<LowPass>,
    delay: Option<SampleDelay>,
    first_iteration: bool,
    last_good_inputs: Vec<f64>,
}

impl UnitModel {
    pub fn new(params: UnitParameters, id: impl Into<String>) -> Self {
        let n_inputs = params.linear_gains.len();
        Self {
            io: ModelIo::new(id, n_inputs),
            params,
            filter: None,
            delay: None,
            first_iteration: true,
            last_good_inputs: vec![f64::NAN; n_inputs],
        }
    }

    pub fn params(&self) -> &UnitParameters {
        &self.params
    }

    fn n_model_inputs(&self) -> usize {
        self.params.linear_gains.len()
    }

    fn u0_at(&self, idx: usize) -> f64 {
        self.params
            .u0
            .as_ref()
            .and_then(|v| v.get(idx))
            .copied()
            .unwrap_or(0.0)
    }

    fn linear_term(&self, idx: usize, u: f64) -> f64 {
        self.params.linear_gains[idx] * (u - self.u0_at(idx))
    }

    fn curvature_term(&self, idx: usize, u: f64) -> f64 {
        let Some(curvatures) = &self.params.curvatures else {
            return 0.0;
        };
        let Some(&curvature) = curvatures.get(idx) else {
            return 0.0;
        };
        if curvature.is_nan() {
            return 0.0;
        }
        let u_norm = self
            .params
            .u_norm
            .as_ref()
            .and_then(|v| v.get(idx))
            .copied()
            .unwrap_or(1.0);
        curvature * (u - self.u0_at(idx)).powi(2) / u_norm
    }

    fn has_curvature(&self, idx: usize) -> bool {
        self.params
            .curvatures
            .as_ref()
            .and_then(|v| v.get(idx))
            .map(|c| c.is_finite() && *c != 0.0)
            .unwrap_or(false)
    }

    /// Static (infinite-time) state for the given inputs, substituting the
    /// last good value for bad samples.
    fn static_state(&mut self, inputs: &[f64]) -> f64 {
        let mut x = self.params.bias;
        let n = inputs.len().min(self.n_model_inputs());
        for idx in 0..n {
            let mut u = inputs[idx];
            if is_bad_value(u, BAD_DATA_SENTINEL) {
                u = self.last_good_inputs[idx];
            } else {
                self.last_good_inputs[idx] = u;
            }
            x += self.linear_term(idx, u);
            x += self.curvature_term(idx, u);
        }
        x
    }

    /// Static state without touching the bad-value memory.
    fn static_state_pure(&self, inputs: &[f64]) -> f64 {
        let mut x = self.params.bias;
        let n = inputs.len().min(self.n_model_inputs());
        for idx in 0..n {
            x += self.linear_term(idx, inputs[idx]);
            x += self.curvature_term(idx, inputs[idx]);
        }
        x
    }

    fn clamp_output(&self, mut y: f64) -> f64 {
        if let Some(y_max) = self.params.y_max {
            if y > y_max {
                y = y_max;
            }
        }
        if let Some(y_min) = self.params.y_min {
            if y < y_min {
                y = y_min;
            }
        }
        y
    }
}

/// Roots of `a*x^2 + b*x + c = 0`. A negative discriminant returns the real
/// part of the complex pair, matching the solver this model's inversion is
/// built around.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant > 0.0 {
        let root = discriminant.sqrt();
        vec![(-b + root) / (2.0 * a), (-b - root) / (2.0 * a)]
    } else {
        vec![-b / (2.0 * a)]
    }
}

impl SimulatableModel for UnitModel {
    fn id(&self) -> &str {
        self.io.id()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Unit
    }

    fn output_id(&self) -> SignalId {
        self.io.output_id_or(ModelKind::Unit)
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
        if self.params.linear_gains.is_empty() {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "no process gains configured".into(),
            });
        }
        if self.params.linear_gains.iter().any(|g| !g.is_finite()) {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "illegal process gain".into(),
            });
        }
        if let Some(slot) = self.io.first_unresolved_slot() {
            return Err(ModelError::UnresolvedInput {
                model: self.id().to_string(),
                slot,
            });
        }
        Ok(())
    }

    fn steady_state_output(&self, inputs: &[f64]) -> Option<f64> {
        let mut y = self.static_state_pure(inputs);
        // values beyond the model inputs are additive signals
        for v in inputs.iter().skip(self.n_model_inputs()) {
            y += v;
        }
        let y = self.clamp_output(y);
        y.is_finite().then_some(y)
    }

    fn steady_state_input(&self, y0: f64, free_slot: usize, given_inputs: &[f64]) -> Option<f64> {
        if free_slot >= self.n_model_inputs() {
            return None;
        }
        // contribution of everything except the free input
        let mut y_other = self.params.bias;
        for (idx, &u) in given_inputs.iter().enumerate() {
            if idx == free_slot || u.is_nan() {
                continue;
            }
            if idx < self.n_model_inputs() {
                y_other += self.linear_term(idx, u);
                y_other += self.curvature_term(idx, u);
            } else {
                y_other += u;
            }
        }
        let y_from_free = y0 - y_other;

        let u = if !self.has_curvature(free_slot) {
            let gain = self.params.linear_gains[free_slot];
            if gain == 0.0 {
                return None;
            }
            self.u0_at(free_slot) + y_from_free / gain
        } else {
            let u_norm = self
                .params
                .u_norm
                .as_ref()
                .and_then(|v| v.get(free_slot))
                .copied()
                .unwrap_or(1.0);
            let a = self.params.curvatures.as_ref()?[free_slot] / u_norm;
            let b = self.params.linear_gains[free_slot];
            let c = -y_from_free;
            let roots = solve_quadratic(a, b, c);
            let chosen = roots.iter().copied().fold(f64::INFINITY, f64::min);
            chosen + self.u0_at(free_slot)
        };
        u.is_finite().then_some(u)
    }

    fn warm_start(&mut self, _inputs: &[f64], _output: f64) {
        // restart at steady state: the next iterate resets filter and delay
        self.filter = None;
        self.delay = None;
        self.first_iteration = true;
    }

    fn iterate(&mut self, inputs: &[f64], time_base_s: f64) -> f64 {
        // the dynamics: steady-state curve filtered by the lag, then delayed
        let x_static = self.static_state(inputs);
        let filter = self.filter.get_or_insert_with(|| LowPass::new(time_base_s));
        let x_dynamic = filter.filter(
            x_static,
            self.params.time_constant_s,
            1,
            self.first_iteration,
        );
        self.first_iteration = false;

        let n_samples = if self.params.time_delay_s > 0.0 && time_base_s > 0.0 {
            (self.params.time_delay_s / time_base_s).round() as usize
        } else {
            0
        };
        let delay = self.delay.get_or_insert_with(|| SampleDelay::new(n_samples));
        let mut y = delay.delay(x_dynamic);

        for v in inputs.iter().skip(self.n_model_inputs()) {
            y += v;
        }
        self.clamp_output(y)
    }
}
