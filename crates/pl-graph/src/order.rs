//! Deterministic calculation ordering.
//!
//! The order is computed once per plant topology in four phases:
//!
//! 1. forward chains from the sources,
//! 2. PID controllers, outermost cascade loops first,
//! 3. interiors of controller feedback loops, walked downstream from each
//!    controller and interleaved round-robin across independent loops,
//! 4. raw computational loops (mutual algebraic dependencies not mediated by
//!    a controller).
//!
//! Whenever several candidates become eligible at once, arena insertion
//! order wins, so the result is reproducible for a given plant declaration.
//! All phases are iteration-bounded as a fail-safe against malformed graphs.

use std::collections::VecDeque;

use pl_models::{ModelKind, PlantModel, SimulatableModel};

use crate::error::{GraphError, GraphResult};
use crate::graph::ConnectionGraph;
use crate::loops::ComputationalLoop;

const FORWARD_PHASE_MAX_ITERATIONS: usize = 100;
const PID_PHASE_MAX_ROUNDS: usize = 500;
const LOOP_PHASE_MAX_ROUNDS: usize = 500;
const LOOP_WALK_MAX_STEPS: usize = 20;

/// Determine the order in which the models must be solved.
///
/// Every model index appears exactly once in the result; an error lists the
/// models no phase could place.
pub fn determine_calculation_order(
    models: &[PlantModel],
    graph: &ConnectionGraph,
    loops: &[ComputationalLoop],
) -> GraphResult<Vec<usize>> {
    let mut ordered: Vec<usize> = Vec::new();
    let mut unprocessed: Vec<usize> = (0..models.len()).collect();
    let mut pid_models: Vec<usize> = Vec::new();

    forward_phase(graph, &mut ordered, &mut unprocessed);
    if !unprocessed.is_empty() {
        pid_phase(models, graph, &mut ordered, &mut unprocessed, &mut pid_models);
    }
    if !unprocessed.is_empty() {
        loop_interior_phase(graph, &pid_models, &mut ordered, &mut unprocessed);
    }
    if !loops.is_empty() && !unprocessed.is_empty() {
        computational_loop_phase(models, loops, &mut ordered, &mut unprocessed);
    }

    if !unprocessed.is_empty() {
        return Err(GraphError::OrderingIncomplete {
            unresolved: unprocessed
                .iter()
                .map(|&m| models[m].id().to_string())
                .collect(),
        });
    }
    Ok(ordered)
}

/// Phase 1: purely forward-coupled models, drained left to right.
fn forward_phase(graph: &ConnectionGraph, ordered: &mut Vec<usize>, unprocessed: &mut Vec<usize>) {
    let sources = graph.sources();
    for &model in &sources {
        ordered.push(model);
        unprocessed.retain(|&x| x != model);
    }

    let mut worklist: VecDeque<usize> = sources.into();
    let mut iterations = 0;
    while let Some(current) = worklist.pop_front() {
        if iterations >= FORWARD_PHASE_MAX_ITERATIONS {
            break;
        }
        iterations += 1;
        for downstream in graph.downstream_of(current) {
            if !unprocessed.contains(&downstream) {
                continue;
            }
            let upstream_all_ordered = graph
                .upstream_of(downstream)
                .iter()
                .all(|up| ordered.contains(up));
            if upstream_all_ordered {
                ordered.push(downstream);
                unprocessed.retain(|&x| x != downstream);
                // serial chains continue from here
                worklist.push_back(downstream);
            }
        }
    }
}

/// Phase 2: PID controllers. Controllers in cascades must be ordered
/// outermost first, so a controller is only placed once no not-yet-ordered
/// controller remains upstream of it; rounds repeat because independent
/// cascades may unblock each other.
fn pid_phase(
    models: &[PlantModel],
    graph: &ConnectionGraph,
    ordered: &mut Vec<usize>,
    unprocessed: &mut Vec<usize>,
    pid_models: &mut Vec<usize>,
) {
    for _ in 0..PID_PHASE_MAX_ROUNDS {
        let snapshot = unprocessed.clone();
        for model in snapshot {
            if models[model].kind() != ModelKind::Pid {
                continue;
            }
            let has_unordered_upstream_pid = graph.upstream_of(model).iter().any(|&up| {
                models[up].kind() == ModelKind::Pid && unprocessed.contains(&up)
            });
            if !has_unordered_upstream_pid {
                ordered.push(model);
                pid_models.push(model);
                unprocessed.retain(|&x| x != model);
            }
        }
        let pids_left = unprocessed
            .iter()
            .any(|&m| models[m].kind() == ModelKind::Pid);
        if !pids_left {
            break;
        }
    }
}

/// Phase 3: models inside controller feedback loops, added left to right.
///
/// Walk downstream from each ordered controller, appending any reached model
/// whose upstream models are all already ordered, and stop a branch once it
/// closes back on the originating controller. The set of controllers is
/// visited round-robin so that independent loops interleave in declaration
/// order instead of draining one loop at a time.
fn loop_interior_phase(
    graph: &ConnectionGraph,
    pid_models: &[usize],
    ordered: &mut Vec<usize>,
    unprocessed: &mut Vec<usize>,
) {
    let mut pids_left: Vec<usize> = pid_models.to_vec();
    // starts at the end so the first advance wraps to the first controller
    let mut cursor = pids_left.len().saturating_sub(1);
    let mut rounds = 0;
    while !pids_left.is_empty() && rounds < LOOP_PHASE_MAX_ROUNDS {
        rounds += 1;
        cursor = if cursor + 1 >= pids_left.len() {
            0
        } else {
            cursor + 1
        };
        let pid = pids_left[cursor];

        let mut loop_completed = false;
        let mut to_parse: Vec<usize> = Vec::new();
        for downstream in graph.downstream_of(pid) {
            if !to_parse.contains(&downstream) {
                to_parse.push(downstream);
            }
        }
        let mut visited: Vec<usize> = Vec::new();
        let mut steps = 0;
        while !to_parse.is_empty() && steps < LOOP_WALK_MAX_STEPS {
            steps += 1;
            let current = to_parse.remove(0);
            visited.push(current);
            for downstream in graph.downstream_of(current) {
                if downstream == pid {
                    // loop closure: do not traverse the same loop twice
                    loop_completed = true;
                } else if !to_parse.contains(&downstream) && !visited.contains(&downstream) {
                    to_parse.push(downstream);
                }
            }
            if ordered.contains(&current) {
                continue;
            }
            let depends_only_on_ordered = graph
                .upstream_of(current)
                .iter()
                .all(|up| ordered.contains(up));
            if depends_only_on_ordered {
                ordered.push(current);
                unprocessed.retain(|&x| x != current);
            }
        }
        if loop_completed {
            pids_left.remove(cursor);
            // leave the cursor in place: the advance at the top of the loop
            // lands on the next controller in declaration order
        }
    }
}

/// Phase 4: raw algebraic cycles. Two-member loops are appended in discovery
/// order; larger loops rank members by how many of their inputs are outputs
/// of other loop members, fewest first.
fn computational_loop_phase(
    models: &[PlantModel],
    loops: &[ComputationalLoop],
    ordered: &mut Vec<usize>,
    unprocessed: &mut Vec<usize>,
) {
    for lp in loops {
        if lp.members.len() == 2 {
            for &member in &lp.members {
                if unprocessed.contains(&member) {
                    ordered.push(member);
                    unprocessed.retain(|&x| x != member);
                }
            }
            continue;
        }

        let loop_outputs: Vec<_> = lp
            .members
            .iter()
            .map(|&m| models[m].output_id())
            .collect();
        let looped_input_counts: Vec<(usize, usize)> = lp
            .members
            .iter()
            .map(|&member| {
                let count = models[member]
                    .combined_input_ids()
                    .iter()
                    .flatten()
                    .filter(|id| loop_outputs.contains(id))
                    .count();
                (member, count)
            })
            .collect();
        let max_count = looped_input_counts
            .iter()
            .map(|&(_, c)| c)
            .max()
            .unwrap_or(1)
            .max(1);

        // members depending on the fewest in-loop outputs are evaluated first
        for wanted in 1..=max_count {
            for &(member, count) in &looped_input_counts {
                if count == wanted && unprocessed.contains(&member) {
                    ordered.push(member);
                    unprocessed.retain(|&x| x != member);
                }
            }
        }
    }
}
