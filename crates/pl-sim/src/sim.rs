//! The time-stepping simulation loop.

use std::collections::BTreeMap;

use pl_controls::PidStatus;
use pl_core::{SignalId, SignalStore};
use pl_graph::{determine_calculation_order, find_computational_loops, ConnectionGraph};
use pl_models::{ModelKind, SimulatableModel};
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::init::initialize_steady_state;
use crate::plant::Plant;

/// One runtime problem encountered mid-sweep. The run is flagged failed but
/// the sweep continues, so the caller gets the complete picture instead of
/// the first symptom.
#[derive(Debug, Clone)]
pub struct SimFailure {
    pub model: String,
    pub time_index: usize,
    pub what: String,
}

/// Outcome of a plant simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Every simulated signal, seeded at index 0 by the initializer.
    pub data: SignalStore,
    /// True when the run completed without runtime failures.
    pub ok: bool,
    pub failures: Vec<SimFailure>,
    /// Per-controller status trace, one entry per time index.
    pub pid_status: BTreeMap<String, Vec<PidStatus>>,
}

impl Plant {
    /// Simulate this plant against the given external input data.
    pub fn simulate(&mut self, input_data: &SignalStore) -> SimResult<SimulationResult> {
        simulate(self, input_data)
    }
}

/// Perform a plant-wide dynamic simulation of all models, given the declared
/// connections and external signals.
///
/// The external data determines the time span and time base. The plant
/// starts in steady state: every internal signal is seeded by the
/// steady-state initializer before the first step.
pub fn simulate(plant: &mut Plant, input_data: &SignalStore) -> SimResult<SimulationResult> {
    let n = input_data.length().ok_or(SimError::NoExternalSignals)?;
    for model in plant.models() {
        model.check_simulatable()?;
    }

    let graph = ConnectionGraph::build(plant.models());
    let loops = find_computational_loops(&graph);
    let order = determine_calculation_order(plant.models(), &graph, &loops)?;
    debug!(
        n_models = plant.n_models(),
        n_samples = n,
        n_loops = loops.len(),
        "plant simulation starting"
    );

    let mut sim = initialize_steady_state(plant, &graph, &loops, &order, input_data)?;

    let time_base_s = input_data.time_base_s();
    let mut failures: Vec<SimFailure> = Vec::new();
    let mut pid_status: BTreeMap<String, Vec<PidStatus>> = BTreeMap::new();

    for t in 0..n {
        // every model restarts steady on the first sample
        if t == 0 {
            for &idx in &order {
                let input_ids = plant.models()[idx].combined_input_ids();
                let inputs = gather(&input_ids, 0, &sim, input_data);
                let output_id = plant.models()[idx].output_id();
                let output0 = value_at(&output_id, 0, &sim, input_data).unwrap_or(f64::NAN);
                plant.models_mut()[idx].warm_start(&inputs, output0);
            }
        }

        for &idx in &order {
            let kind = plant.models()[idx].kind();
            let model_id = plant.models()[idx].id().to_string();
            let input_ids = plant.models()[idx].combined_input_ids();
            // controllers read one sample back: the scan delay of a real
            // control system
            let read_t = if kind == ModelKind::Pid && t > 0 { t - 1 } else { t };
            let inputs = gather(&input_ids, read_t, &sim, input_data);

            let output_id = plant.models()[idx].output_id();
            let y = plant.models_mut()[idx].iterate(&inputs, time_base_s);
            if y.is_nan() {
                failures.push(SimFailure {
                    model: model_id.clone(),
                    time_index: t,
                    what: "model produced no value".into(),
                });
            }
            if let Err(e) = sim.set_value(&output_id, t, y) {
                failures.push(SimFailure {
                    model: model_id.clone(),
                    time_index: t,
                    what: e.to_string(),
                });
            }
            if kind == ModelKind::Pid {
                if let Some(status) = plant.models()[idx].as_pid().and_then(|p| p.status()) {
                    pid_status.entry(model_id).or_default().push(status);
                }
            }
        }
    }

    if !failures.is_empty() {
        warn!(
            n_failures = failures.len(),
            "plant simulation completed with failures"
        );
    }
    if let Some(timestamps) = input_data.timestamps() {
        sim.set_timestamps(timestamps.to_vec());
    }

    Ok(SimulationResult {
        data: sim,
        ok: failures.is_empty(),
        failures,
        pid_status,
    })
}

/// Look up one signal value for time `t`, preferring the simulated store.
///
/// A simulated slot still holding the not-yet-simulated sentinel falls back
/// to the previous sample (this is what lets members of an algebraic loop
/// see each other's latest outputs), and then to the external data.
fn value_at(id: &SignalId, t: usize, sim: &SignalStore, input: &SignalStore) -> Option<f64> {
    if let Some(v) = sim.get(id, t) {
        if !v.is_nan() {
            return Some(v);
        }
        if t > 0 {
            if let Some(prev) = sim.get(id, t - 1) {
                if !prev.is_nan() {
                    return Some(prev);
                }
            }
        }
    }
    input.get(id, t).filter(|v| !v.is_nan())
}

/// Gather one value per input id; unset slots and missing signals yield NaN,
/// which the models treat as bad data.
fn gather(ids: &[Option<SignalId>], t: usize, sim: &SignalStore, input: &SignalStore) -> Vec<f64> {
    ids.iter()
        .map(|id| match id {
            Some(id) => value_at(id, t, sim, input).unwrap_or(f64::NAN),
            None => f64::NAN,
        })
        .collect()
}
