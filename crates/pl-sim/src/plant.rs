//! Plant assembly: the model arena and the wiring API.

use std::collections::HashMap;

use pl_core::{SignalId, SignalKind};
use pl_models::{pid_slots, ModelKind, PlantModel, SimulatableModel};

use crate::error::{SimError, SimResult};

/// A plant: a set of interconnected models plus the external signals that
/// drive them.
///
/// Models live in an arena; arena insertion order is the declaration order
/// that every downstream analysis uses as its tie-break, so building the same
/// plant twice yields identical orderings and results.
#[derive(Debug, Clone, Default)]
pub struct Plant {
    name: String,
    description: String,
    models: Vec<PlantModel>,
    index: HashMap<String, usize>,
    external_input_ids: Vec<SignalId>,
}

impl Plant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Add a model to the arena. Model ids must be unique.
    pub fn add_model(&mut self, model: impl Into<PlantModel>) -> SimResult<()> {
        let model = model.into();
        let id = model.id().to_string();
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateModelId { id });
        }
        self.index.insert(id, self.models.len());
        self.models.push(model);
        Ok(())
    }

    pub fn models(&self) -> &[PlantModel] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [PlantModel] {
        &mut self.models
    }

    pub fn n_models(&self) -> usize {
        self.models.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn model(&self, id: &str) -> Option<&PlantModel> {
        self.index_of(id).map(|i| &self.models[i])
    }

    pub fn model_mut(&mut self, id: &str) -> Option<&mut PlantModel> {
        let i = self.index_of(id)?;
        Some(&mut self.models[i])
    }

    fn require(&self, id: &str) -> SimResult<usize> {
        self.index_of(id).ok_or_else(|| SimError::UnknownModelId {
            id: id.to_string(),
        })
    }

    /// Connect the output of the upstream model to an input of the
    /// downstream model. Returns the connecting signal id.
    ///
    /// When the downstream model is a PID controller and no slot is given,
    /// the process-value slot is assumed; otherwise slot 0.
    pub fn connect(
        &mut self,
        upstream_id: &str,
        downstream_id: &str,
        slot: Option<usize>,
    ) -> SimResult<SignalId> {
        let up = self.require(upstream_id)?;
        let down = self.require(downstream_id)?;
        let output_id = self.models[up].output_id();
        let slot = slot.unwrap_or(match self.models[down].kind() {
            ModelKind::Pid => pid_slots::Y_MEAS,
            _ => 0,
        });
        self.models[down].set_input_id(slot, output_id.clone());
        Ok(output_id)
    }

    /// Wire an already-registered signal into a model input slot.
    pub fn connect_signal(&mut self, signal: SignalId, model_id: &str, slot: usize) -> SimResult<()> {
        let idx = self.require(model_id)?;
        self.models[idx].set_input_id(slot, signal);
        Ok(())
    }

    /// Register an externally supplied signal and wire it to a model, the
    /// wiring depending on the signal role and the model kind.
    pub fn add_and_connect_external_signal(
        &mut self,
        model_id: &str,
        signal: SignalId,
        kind: SignalKind,
        index: usize,
    ) -> SimResult<SignalId> {
        let idx = self.require(model_id)?;
        let model = &mut self.models[idx];
        match (kind, model.kind()) {
            // a disturbance is always additive on a process output
            (SignalKind::Disturbance, ModelKind::Unit) => {
                model.add_additive_input(signal.clone());
            }
            (SignalKind::ExternalInput, ModelKind::Unit)
            | (SignalKind::ExternalInput, ModelKind::Combiner)
            | (SignalKind::ExternalInput, ModelKind::Select) => {
                model.set_input_id(index, signal.clone());
            }
            (SignalKind::Setpoint, ModelKind::Pid) => {
                model.set_input_id(pid_slots::SETPOINT, signal.clone());
            }
            (SignalKind::Output, ModelKind::Pid) => {
                model.set_input_id(pid_slots::Y_MEAS, signal.clone());
            }
            _ => {
                return Err(SimError::UnsupportedTopology {
                    what: format!(
                        "cannot wire external signal '{}' of role {:?} into model '{}'",
                        signal, kind, model_id
                    ),
                });
            }
        }
        self.external_input_ids.push(signal.clone());
        Ok(signal)
    }

    /// Convenience: register an external signal named by the standard
    /// convention for the given model and role.
    pub fn add_external_signal(
        &mut self,
        model_id: &str,
        kind: SignalKind,
        index: usize,
    ) -> SimResult<SignalId> {
        let signal = SignalId::indexed(model_id, kind, index as u16);
        self.add_and_connect_external_signal(model_id, signal, kind, index)
    }

    pub fn external_input_ids(&self) -> &[SignalId] {
        &self.external_input_ids
    }

    pub fn is_external(&self, id: &SignalId) -> bool {
        self.external_input_ids.contains(id)
    }

    /// Slots (into the combined input vector) of a model's inputs that are
    /// not externally supplied, i.e. must come from other models.
    pub fn free_input_slots(&self, model_idx: usize) -> Vec<usize> {
        self.models[model_idx]
            .input_ids()
            .iter()
            .enumerate()
            .filter(|(_, id)| match id {
                Some(id) => !self.is_external(id),
                None => true,
            })
            .map(|(slot, _)| slot)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_models::{PidModel, PidParameters, UnitModel, UnitParameters};

    fn unit(id: &str) -> UnitModel {
        UnitModel::new(UnitParameters::default(), id)
    }

    #[test]
    fn duplicate_model_id_rejected() {
        let mut plant = Plant::new("p");
        plant.add_model(unit("a")).unwrap();
        assert!(matches!(
            plant.add_model(unit("a")),
            Err(SimError::DuplicateModelId { .. })
        ));
    }

    #[test]
    fn connect_defaults_to_pid_process_value_slot() {
        let mut plant = Plant::new("p");
        plant.add_model(unit("proc")).unwrap();
        plant
            .add_model(PidModel::new(PidParameters::default(), "pid"))
            .unwrap();
        let signal = plant.connect("proc", "pid", None).unwrap();
        let pid = plant.model("pid").unwrap();
        assert_eq!(pid.input_ids()[pid_slots::Y_MEAS], Some(signal));
    }

    #[test]
    fn external_setpoint_lands_in_setpoint_slot() {
        let mut plant = Plant::new("p");
        plant
            .add_model(PidModel::new(PidParameters::default(), "pid"))
            .unwrap();
        let signal = plant
            .add_external_signal("pid", SignalKind::Setpoint, 0)
            .unwrap();
        assert!(plant.is_external(&signal));
        let pid = plant.model("pid").unwrap();
        assert_eq!(pid.input_ids()[pid_slots::SETPOINT], Some(signal));
    }

    #[test]
    fn disturbance_becomes_additive_input() {
        let mut plant = Plant::new("p");
        plant.add_model(unit("proc")).unwrap();
        let signal = plant
            .add_external_signal("proc", SignalKind::Disturbance, 0)
            .unwrap();
        let proc_model = plant.model("proc").unwrap();
        assert_eq!(proc_model.additive_input_ids(), &[signal]);
    }

    #[test]
    fn free_input_slots_skip_external() {
        let mut plant = Plant::new("p");
        plant
            .add_model(UnitModel::new(
                UnitParameters {
                    linear_gains: vec![1.0, 1.0],
                    ..Default::default()
                },
                "proc",
            ))
            .unwrap();
        plant
            .add_external_signal("proc", SignalKind::ExternalInput, 1)
            .unwrap();
        // slot 0 unset (free), slot 1 external
        assert_eq!(plant.free_input_slots(0), vec![0]);
    }

    #[test]
    fn unknown_model_is_an_error() {
        let mut plant = Plant::new("p");
        assert!(matches!(
            plant.connect("a", "b", None),
            Err(SimError::UnknownModelId { .. })
        ));
    }
}
