//! The shared model capability and the closed variant enum over model kinds.

use pl_core::{SignalId, SignalKind};

use crate::divide::DivideModel;
use crate::error::ModelError;
use crate::pid_model::PidModel;
use crate::select::SelectModel;
use crate::unit::UnitModel;

/// Tag distinguishing the kinds of graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// A process unit (first-order lag with gains and bias).
    Unit,
    /// A PID controller.
    Pid,
    /// A min/max select block.
    Select,
    /// An algebraic combiner (divide).
    Combiner,
}

impl ModelKind {
    /// The role of the signal this kind of model produces.
    pub fn output_signal_kind(self) -> SignalKind {
        match self {
            ModelKind::Unit => SignalKind::Output,
            ModelKind::Pid => SignalKind::PidOutput,
            ModelKind::Select => SignalKind::SelectorOutput,
            ModelKind::Combiner => SignalKind::Output,
        }
    }
}

/// Input/output wiring shared by every model.
///
/// Input slots start out unset and are filled in by connection calls;
/// additive inputs (disturbances on the output) are kept separately and
/// treated as appended after the ordinary inputs wherever a model consumes a
/// flat value vector.
#[derive(Debug, Clone)]
pub struct ModelIo {
    id: String,
    input_ids: Vec<Option<SignalId>>,
    additive_input_ids: Vec<SignalId>,
    output_id: Option<SignalId>,
}

impl ModelIo {
    pub fn new(id: impl Into<String>, n_inputs: usize) -> Self {
        Self {
            id: id.into(),
            input_ids: vec![None; n_inputs],
            additive_input_ids: Vec::new(),
            output_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input_ids(&self) -> &[Option<SignalId>] {
        &self.input_ids
    }

    /// Fill one input slot, growing the slot list if needed.
    pub fn set_input_id(&mut self, slot: usize, id: SignalId) {
        if slot >= self.input_ids.len() {
            self.input_ids.resize(slot + 1, None);
        }
        self.input_ids[slot] = Some(id);
    }

    pub fn additive_input_ids(&self) -> &[SignalId] {
        &self.additive_input_ids
    }

    pub fn add_additive_input(&mut self, id: SignalId) {
        if !self.additive_input_ids.contains(&id) {
            self.additive_input_ids.push(id);
        }
    }

    pub fn set_output_id(&mut self, id: SignalId) {
        self.output_id = Some(id);
    }

    /// The model's output id, falling back to the naming convention when no
    /// explicit id has been registered.
    pub fn output_id_or(&self, kind: ModelKind) -> SignalId {
        self.output_id
            .clone()
            .unwrap_or_else(|| SignalId::new(self.id.clone(), kind.output_signal_kind()))
    }

    /// Ordinary input ids followed by additive input ids.
    pub fn combined_input_ids(&self) -> Vec<Option<SignalId>> {
        let mut ids = self.input_ids.clone();
        ids.extend(self.additive_input_ids.iter().cloned().map(Some));
        ids
    }

    /// First unset ordinary input slot, if any.
    pub fn first_unresolved_slot(&self) -> Option<usize> {
        self.input_ids.iter().position(Option::is_none)
    }
}

/// The polymorphic contract every graph node implements.
///
/// All scheduling, initialization and stepping code goes through this trait
/// (plus the [`ModelKind`] tag); no algorithm reaches into a concrete model.
pub trait SimulatableModel {
    fn id(&self) -> &str;

    fn kind(&self) -> ModelKind;

    /// The id of the signal this model produces (naming-convention default
    /// when none has been registered).
    fn output_id(&self) -> SignalId;

    fn set_output_id(&mut self, id: SignalId);

    /// Ordinary (non-additive) input signal ids; unset slots are `None`.
    fn input_ids(&self) -> &[Option<SignalId>];

    fn set_input_id(&mut self, slot: usize, id: SignalId);

    /// Additive (disturbance) inputs applied on the output.
    fn additive_input_ids(&self) -> &[SignalId];

    fn add_additive_input(&mut self, id: SignalId);

    /// Ordinary inputs followed by additive inputs, the order in which
    /// [`Self::iterate`] expects its flat value vector.
    fn combined_input_ids(&self) -> Vec<Option<SignalId>> {
        let mut ids = self.input_ids().to_vec();
        ids.extend(self.additive_input_ids().iter().cloned().map(Some));
        ids
    }

    fn input_len(&self) -> usize {
        self.input_ids().len() + self.additive_input_ids().len()
    }

    /// Check that the model's configuration makes sense to simulate.
    fn check_simulatable(&self) -> Result<(), ModelError>;

    /// Given steady inputs, the steady output. `None` when the model cannot
    /// answer (controllers, or missing values).
    fn steady_state_output(&self, inputs: &[f64]) -> Option<f64>;

    /// Given the desired output and all-but-one input, solve for the free
    /// input. `None` when the model relation cannot be inverted.
    fn steady_state_input(&self, y0: f64, free_slot: usize, given_inputs: &[f64]) -> Option<f64>;

    /// Reset internal state so the model is steady at the given inputs and
    /// output.
    fn warm_start(&mut self, inputs: &[f64], output: f64);

    /// Advance one time step and return the output sample.
    fn iterate(&mut self, inputs: &[f64], time_base_s: f64) -> f64;
}

/// A graph node: one of the four model kinds.
#[derive(Debug, Clone)]
pub enum PlantModel {
    Unit(UnitModel),
    Pid(PidModel),
    Select(SelectModel),
    Divide(DivideModel),
}

impl PlantModel {
    fn inner(&self) -> &dyn SimulatableModel {
        match self {
            PlantModel::Unit(m) => m,
            PlantModel::Pid(m) => m,
            PlantModel::Select(m) => m,
            PlantModel::Divide(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SimulatableModel {
        match self {
            PlantModel::Unit(m) => m,
            PlantModel::Pid(m) => m,
            PlantModel::Select(m) => m,
            PlantModel::Divide(m) => m,
        }
    }

    pub fn as_pid(&self) -> Option<&PidModel> {
        match self {
            PlantModel::Pid(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_pid_mut(&mut self) -> Option<&mut PidModel> {
        match self {
            PlantModel::Pid(m) => Some(m),
            _ => None,
        }
    }
}

impl From<UnitModel> for PlantModel {
    fn from(m: UnitModel) -> Self {
        PlantModel::Unit(m)
    }
}

impl From<PidModel> for PlantModel {
    fn from(m: PidModel) -> Self {
        PlantModel::Pid(m)
    }
}

impl From<SelectModel> for PlantModel {
    fn from(m: SelectModel) -> Self {
        PlantModel::Select(m)
    }
}

impl From<DivideModel> for PlantModel {
    fn from(m: DivideModel) -> Self {
        PlantModel::Divide(m)
    }
}

impl SimulatableModel for PlantModel {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn kind(&self) -> ModelKind {
        self.inner().kind()
    }

    fn output_id(&self) -> SignalId {
        self.inner().output_id()
    }

    fn set_output_id(&mut self, id: SignalId) {
        self.inner_mut().set_output_id(id)
    }

    fn input_ids(&self) -> &[Option<SignalId>] {
        self.inner().input_ids()
    }

    fn set_input_id(&mut self, slot: usize, id: SignalId) {
        self.inner_mut().set_input_id(slot, id)
    }

    fn additive_input_ids(&self) -> &[SignalId] {
        self.inner().additive_input_ids()
    }

    fn add_additive_input(&mut self, id: SignalId) {
        self.inner_mut().add_additive_input(id)
    }

    fn check_simulatable(&self) -> Result<(), ModelError> {
        self.inner().check_simulatable()
    }

    fn steady_state_output(&self, inputs: &[f64]) -> Option<f64> {
        self.inner().steady_state_output(inputs)
    }

    fn steady_state_input(&self, y0: f64, free_slot: usize, given_inputs: &[f64]) -> Option<f64> {
        self.inner().steady_state_input(y0, free_slot, given_inputs)
    }

    fn warm_start(&mut self, inputs: &[f64], output: f64) {
        self.inner_mut().warm_start(inputs, output)
    }

    fn iterate(&mut self, inputs: &[f64], time_base_s: f64) -> f64 {
        self.inner_mut().iterate(inputs, time_base_s)
    }
}
