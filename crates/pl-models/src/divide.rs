//! Guarded divide combiner: `y = u0 / u1`.

use pl_core::{is_bad_value, SignalId, BAD_DATA_SENTINEL};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{ModelIo, ModelKind, SimulatableModel};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DivideParameters {
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for DivideParameters {
    fn default() -> Self {
        Self {
            y_min: f64::NEG_INFINITY,
            y_max: f64::INFINITY,
        }
    }
}

/// Divides its first input by its second, with divide-by-zero and bad-data
/// guarding and output clamping. Requires exactly two inputs.
#[derive(Debug, Clone)]
pub struct DivideModel {
    io: ModelIo,
    params: DivideParameters,
}

impl DivideModel {
    pub fn new(params: DivideParameters, id: impl Into<String>) -> Self {
        Self {
            io: ModelIo::new(id, 2),
            params,
        }
    }

    fn compute(&self, inputs: &[f64]) -> f64 {
        if inputs.len() != 2 {
            return f64::NAN;
        }
        let (num, den) = (inputs[0], inputs[1]);
        if den == 0.0
            || is_bad_value(num, BAD_DATA_SENTINEL)
            || is_bad_value(den, BAD_DATA_SENTINEL)
        {
            return f64::NAN;
        }
        (num / den).clamp(self.params.y_min, self.params.y_max)
    }
}

impl SimulatableModel for DivideModel {
    fn id(&self) -> &str {
        self.io.id()
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Combiner
    }

    fn output_id(&self) -> SignalId {
        self.io.output_id_or(ModelKind::Combiner)
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
        if self.io.input_ids().len() != 2 {
            return Err(ModelError::NotSimulatable {
                model: self.id().to_string(),
                reason: "divide requires exactly two inputs".into(),
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
        let y = self.compute(inputs);
        y.is_finite().then_some(y)
    }

    fn steady_state_input(&self, _y0: f64, _free_slot: usize, _given: &[f64]) -> Option<f64> {
        None
    }

    fn warm_start(&mut self, _inputs: &[f64], _output: f64) {}

    fn iterate(&mut self, inputs: &[f64], _time_base_s: f64) -> f64 {
        self.compute(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides() {
        let mut d = DivideModel::new(DivideParameters::default(), "div");
        assert_eq!(d.iterate(&[10.0, 4.0], 1.0), 2.5);
    }

    #[test]
    fn divide_by_zero_is_nan() {
        let mut d = DivideModel::new(DivideParameters::default(), "div");
        assert!(d.iterate(&[10.0, 0.0], 1.0).is_nan());
    }

    #[test]
    fn bad_data_is_nan() {
        let mut d = DivideModel::new(DivideParameters::default(), "div");
        assert!(d.iterate(&[-9999.0, 2.0], 1.0).is_nan());
        assert!(d.iterate(&[1.0, f64::NAN], 1.0).is_nan());
    }

    #[test]
    fn output_is_clamped() {
        let mut d = DivideModel::new(
            DivideParameters {
                y_min: -1.0,
                y_max: 1.0,
            },
            "div",
        );
        assert_eq!(d.iterate(&[10.0, 2.0], 1.0), 1.0);
        assert_eq!(d.iterate(&[-10.0, 2.0], 1.0), -1.0);
    }
}
