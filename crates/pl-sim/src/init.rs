//! Steady-state initialization.
//!
//! Given the first sample of every externally supplied signal, derive a
//! value for every internal signal such that, if simulation were frozen,
//! every model equation would already be satisfied. The plant is traversed
//! by logic (forward, setpoint seeding, backward inversion, loop iteration,
//! select resolution) rather than by a matrix solver.

use std::collections::BTreeMap;

use pl_core::{SignalId, SignalStore};
use pl_graph::{ComputationalLoop, ConnectionGraph};
use pl_models::{pid_slots, ModelError, ModelKind, PlantModel, SimulatableModel};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::plant::Plant;

/// Bounded Gauss-Seidel sweeps used to settle raw algebraic loops.
const LOOP_SOLVE_ITERATIONS: usize = 7;

/// Compute a steady value for every internal signal and return a store with
/// those values at index 0 and the not-yet-simulated sentinel elsewhere.
pub(crate) fn initialize_steady_state(
    plant: &Plant,
    graph: &ConnectionGraph,
    loops: &[ComputationalLoop],
    order: &[usize],
    input_data: &SignalStore,
) -> SimResult<SignalStore> {
    let n = input_data.length().ok_or(SimError::NoExternalSignals)?;

    // signal -> steady value; absent means not yet known.
    // a BTreeMap keeps the final write-out deterministic.
    let mut values: BTreeMap<SignalId, f64> = BTreeMap::new();
    for id in input_data.signal_ids() {
        if let Some(v) = input_data.get(id, 0) {
            values.insert(id.clone(), v);
        }
    }

    forward_calc_non_pid(plant, order, &mut values)?;
    let mut unresolved = seed_pid_setpoints(plant, graph, order, &mut values)?;
    backward_calc_feedback(plant, graph, order, &mut values, &mut unresolved)?;
    init_computational_loops(plant, loops, &mut values)?;
    if !unresolved.is_empty() {
        resolve_select_loops(plant, graph, &mut values, &mut unresolved)?;
    }
    // pick up anything downstream of what the previous steps resolved
    forward_calc_non_pid(plant, order, &mut values)?;

    if let Some(&pid_idx) = unresolved.first() {
        return Err(SimError::UninitializedController {
            model: plant.models()[pid_idx].id().to_string(),
        });
    }
    debug!(n_values = values.len(), "steady-state initialization complete");

    let mut sim = SignalStore::new(input_data.time_base_s());
    for model in plant.models() {
        let output_id = model.output_id();
        if sim.contains(&output_id) {
            continue;
        }
        if let Some(&v) = values.get(&output_id) {
            sim.init_new_signal(output_id, v, n)?;
        }
    }
    // seeded signals beyond the model outputs (none are expected today, but
    // a seed that is neither an output nor external data must not be lost)
    for (id, &v) in &values {
        if !input_data.contains(id) && !sim.contains(id) {
            sim.init_new_signal(id.clone(), v, n)?;
        }
    }
    if sim.signal_ids().is_empty() {
        return Err(SimError::InitFailed {
            what: "initialized zero simulated variables".into(),
        });
    }
    Ok(sim)
}

/// Forward pass: walk the calculation order and fill in the steady output of
/// every non-PID model whose inputs are all known. Re-invoked after the
/// other steps to catch models downstream of late-resolved signals.
fn forward_calc_non_pid(
    plant: &Plant,
    order: &[usize],
    values: &mut BTreeMap<SignalId, f64>,
) -> SimResult<()> {
    let models = plant.models();
    for &idx in order {
        let model = &models[idx];
        if model.kind() == ModelKind::Pid {
            continue;
        }
        let output_id = model.output_id();
        if values.contains_key(&output_id) {
            continue;
        }
        let input_ids = model.combined_input_ids();
        let mut inputs = Vec::with_capacity(input_ids.len());
        let mut all_given = true;
        for (slot, id) in input_ids.iter().enumerate() {
            let Some(id) = id else {
                return Err(SimError::Model(ModelError::UnresolvedInput {
                    model: model.id().to_string(),
                    slot,
                }));
            };
            match values.get(id) {
                Some(&v) => inputs.push(v),
                None => {
                    all_given = false;
                    break;
                }
            }
        }
        if all_given {
            if let Some(y) = model.steady_state_output(&inputs) {
                values.insert(output_id, y);
            }
        }
    }
    Ok(())
}

/// Seed each PID-controlled variable at its setpoint (steady state means the
/// measured value has reached the target).
///
/// Controllers feeding a select block, and cascade controllers whose
/// setpoint comes from a not-yet-solved outer loop, are deferred; the
/// returned list holds their indices. A controller with neither a setpoint
/// value nor an upstream controller cannot be initialized at all.
fn seed_pid_setpoints(
    plant: &Plant,
    graph: &ConnectionGraph,
    order: &[usize],
    values: &mut BTreeMap<SignalId, f64>,
) -> SimResult<Vec<usize>> {
    let models = plant.models();
    let mut unresolved = Vec::new();
    for &idx in order {
        let model = &models[idx];
        if model.kind() != ModelKind::Pid {
            continue;
        }
        let feeds_select = graph
            .downstream_of(idx)
            .first()
            .map(|&d| models[d].kind() == ModelKind::Select)
            .unwrap_or(false);
        if feeds_select {
            unresolved.push(idx);
            continue;
        }
        let setpoint_id = pid_input_id(model, pid_slots::SETPOINT)?;
        let y_meas_id = pid_input_id(model, pid_slots::Y_MEAS)?;
        if let Some(&setpoint0) = values.get(&setpoint_id) {
            values.entry(y_meas_id).or_insert(setpoint0);
        } else if graph.has_upstream_pid(idx, models) {
            // cascade: the outer loop must be back-solved first
            unresolved.push(idx);
        } else {
            return Err(SimError::MissingSetpoint {
                model: model.id().to_string(),
            });
        }
    }
    Ok(unresolved)
}

fn pid_input_id(model: &PlantModel, slot: usize) -> SimResult<SignalId> {
    model
        .input_ids()
        .get(slot)
        .cloned()
        .flatten()
        .ok_or_else(|| {
            SimError::Model(ModelError::UnresolvedInput {
                model: model.id().to_string(),
                slot,
            })
        })
}

/// Backward pass: walk the order right to left and invert each non-PID
/// model's steady relation for its single free (controller- or model-fed)
/// input, given its now-known output. Solving an inner cascade process also
/// fixes the outer controller's setpoint.
fn backward_calc_feedback(
    plant: &Plant,
    graph: &ConnectionGraph,
    order: &[usize],
    values: &mut BTreeMap<SignalId, f64>,
    unresolved: &mut Vec<usize>,
) -> SimResult<()> {
    let models = plant.models();
    for i in (1..order.len()).rev() {
        let idx = order[i];
        let model = &models[idx];
        if model.kind() == ModelKind::Pid {
            continue;
        }
        // several controller inputs means a select block; resolved later
        if graph.upstream_pids(idx, models).len() > 1 {
            continue;
        }
        let free_slots = plant.free_input_slots(idx);
        if free_slots.len() != 1 {
            continue;
        }
        let free_slot = free_slots[0];
        let Some(free_id) = model.input_ids()[free_slot].clone() else {
            continue;
        };
        let output_id = model.output_id();
        let Some(&y0) = values.get(&output_id) else {
            continue;
        };

        let input_ids = model.combined_input_ids();
        let mut given = Vec::with_capacity(input_ids.len());
        for (slot, id) in input_ids.iter().enumerate() {
            if slot == free_slot {
                given.push(f64::NAN);
                continue;
            }
            let Some(id) = id else {
                return Err(SimError::Model(ModelError::UnresolvedInput {
                    model: model.id().to_string(),
                    slot,
                }));
            };
            match values.get(id) {
                Some(&v) => given.push(v),
                None => {
                    return Err(SimError::MissingInitValue {
                        model: model.id().to_string(),
                        signal: id.to_string(),
                    });
                }
            }
        }

        let u0 = model
            .steady_state_input(y0, free_slot, &given)
            .ok_or_else(|| SimError::InitFailed {
                what: format!("could not back-solve a steady input of '{}'", model.id()),
            })?;
        values.entry(free_id).or_insert(u0);

        // inner loop of a cascade: knowing this model's y fixes the setpoint
        // of the controller that drives it
        if let Some(&pid_idx) = graph.upstream_pids(idx, models).first() {
            if unresolved.contains(&pid_idx) {
                let setpoint_id = pid_input_id(&models[pid_idx], pid_slots::SETPOINT)?;
                values.insert(setpoint_id, y0);
                unresolved.retain(|&p| p != pid_idx);
            }
        }
    }
    Ok(())
}

/// Settle each raw algebraic loop by bounded Gauss-Seidel sweeps: feed every
/// member's latest steady output into the other members' input slots until
/// the pair (or ring) of outputs stops moving.
///
/// Controller-mediated loops are skipped here; the setpoint machinery seeds
/// those.
fn init_computational_loops(
    plant: &Plant,
    loops: &[ComputationalLoop],
    values: &mut BTreeMap<SignalId, f64>,
) -> SimResult<()> {
    let models = plant.models();
    for lp in loops {
        if lp.contains_pid(models) {
            continue;
        }
        let member_outputs: Vec<SignalId> =
            lp.members.iter().map(|&m| models[m].output_id()).collect();
        let mut member_inputs: Vec<Vec<f64>> = lp
            .members
            .iter()
            .map(|&m| {
                models[m]
                    .combined_input_ids()
                    .iter()
                    .map(|id| {
                        id.as_ref()
                            .and_then(|id| values.get(id))
                            .copied()
                            .unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();
        let mut member_values: Vec<f64> = vec![0.0; lp.members.len()];

        for _ in 0..LOOP_SOLVE_ITERATIONS {
            for (k, &member) in lp.members.iter().enumerate() {
                let input_ids = models[member].combined_input_ids();
                for (other, output_id) in member_outputs.iter().enumerate() {
                    if let Some(pos) = input_ids
                        .iter()
                        .position(|id| id.as_ref() == Some(output_id))
                    {
                        member_inputs[k][pos] = member_values[other];
                    }
                }
                member_values[k] = models[member]
                    .steady_state_output(&member_inputs[k])
                    .ok_or_else(|| SimError::InitFailed {
                        what: format!(
                            "computational loop {}: member '{}' has no steady-state output",
                            lp.id,
                            models[member].id()
                        ),
                    })?;
            }
        }
        for (k, output_id) in member_outputs.iter().enumerate() {
            values.insert(output_id.clone(), member_values[k]);
        }
    }
    Ok(())
}

/// Resolve controllers that share a min/max select block.
///
/// Back-solve the downstream process for the steady input implied by each
/// controller's setpoint, run the candidates through the block's selection
/// rule, seed the winner at its candidate value, and seed every loser at the
/// selected output offset by its own tracking offset (so it starts in
/// tracking, not fighting the winner).
fn resolve_select_loops(
    plant: &Plant,
    graph: &ConnectionGraph,
    values: &mut BTreeMap<SignalId, f64>,
    unresolved: &mut Vec<usize>,
) -> SimResult<()> {
    let models = plant.models();

    let mut select_candidates: Vec<usize> = Vec::new();
    for &pid_idx in unresolved.iter() {
        for d in graph.downstream_of(pid_idx) {
            if !select_candidates.contains(&d) {
                select_candidates.push(d);
            }
        }
    }
    // a plant with several select blocks among the unresolved controllers is
    // detected and refused rather than initialized wrongly
    if select_candidates.len() != 1 {
        return Err(SimError::UnsupportedTopology {
            what: format!(
                "expected one select block downstream of unresolved controllers, found {}",
                select_candidates.len()
            ),
        });
    }
    let select_idx = select_candidates[0];
    if models[select_idx].kind() != ModelKind::Select {
        return Err(SimError::UnsupportedTopology {
            what: format!(
                "model '{}' downstream of unresolved controllers is not a select block",
                models[select_idx].id()
            ),
        });
    }
    let process_candidates = graph.downstream_of(select_idx);
    if process_candidates.len() != 1 {
        return Err(SimError::UnsupportedTopology {
            what: format!(
                "select block '{}' must drive exactly one process model",
                models[select_idx].id()
            ),
        });
    }
    let process_idx = process_candidates[0];

    // the process must have exactly one unknown input: the selected signal
    let process_input_ids = models[process_idx].combined_input_ids();
    let mut given = Vec::with_capacity(process_input_ids.len());
    let mut free_slots = Vec::new();
    for (slot, id) in process_input_ids.iter().enumerate() {
        match id.as_ref().and_then(|id| values.get(id)) {
            Some(&v) => given.push(v),
            None => {
                given.push(f64::NAN);
                free_slots.push(slot);
            }
        }
    }
    if free_slots.len() != 1 {
        return Err(SimError::UnsupportedTopology {
            what: format!(
                "process '{}' has {} free inputs, cannot initialize the select loop",
                models[process_idx].id(),
                free_slots.len()
            ),
        });
    }
    let free_slot = free_slots[0];

    // candidate selector inputs implied by each controller's setpoint
    let mut select_inputs = Vec::with_capacity(unresolved.len());
    let mut setpoints = Vec::with_capacity(unresolved.len());
    for &pid_idx in unresolved.iter() {
        let setpoint_id = pid_input_id(&models[pid_idx], pid_slots::SETPOINT)?;
        let &setpoint0 = values
            .get(&setpoint_id)
            .ok_or_else(|| SimError::MissingSetpoint {
                model: models[pid_idx].id().to_string(),
            })?;
        setpoints.push(setpoint0);
        let u0 = models[process_idx]
            .steady_state_input(setpoint0, free_slot, &given)
            .ok_or_else(|| SimError::InitFailed {
                what: format!(
                    "could not back-solve process '{}' for controller '{}'",
                    models[process_idx].id(),
                    models[pid_idx].id()
                ),
            })?;
        select_inputs.push(u0);
    }

    // the block's own selection rule decides the winner
    let select_output = models[select_idx]
        .steady_state_output(&select_inputs)
        .ok_or_else(|| SimError::InitFailed {
            what: format!("select block '{}' produced no output", models[select_idx].id()),
        })?;
    let winner = select_inputs
        .iter()
        .position(|&u| u == select_output)
        .ok_or_else(|| SimError::InitFailed {
            what: "no controller candidate matches the select output".into(),
        })?;
    let winner_idx = unresolved[winner];
    let y0 = setpoints[winner];

    values.insert(models[select_idx].output_id(), select_output);
    values.insert(models[process_idx].output_id(), y0);
    values.insert(models[winner_idx].output_id(), select_inputs[winner]);

    for &pid_idx in unresolved.iter() {
        if pid_idx == winner_idx {
            continue;
        }
        let tracking_offset = models[pid_idx]
            .as_pid()
            .map(|p| p.params().tracking_offset)
            .unwrap_or(1.0);
        values.insert(
            models[pid_idx].output_id(),
            select_output + tracking_offset,
        );
    }
    unresolved.clear();
    Ok(())
}
