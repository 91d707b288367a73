//! Computational-loop discovery.
//!
//! A computational loop is a maximal set of models that are mutually
//! reachable through the connection graph. Discovery is an iterative
//! fixed-point closure of the "depends on" relation rather than a recursive
//! DFS: real plants legitimately contain cycles that must be scheduled, not
//! rejected, and the closure converges in at most `n_models` rounds.

use std::collections::BTreeSet;

use pl_models::{ModelKind, PlantModel, SimulatableModel};

use crate::graph::ConnectionGraph;

/// One discovered loop: an id for diagnostics plus the member model indices
/// in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationalLoop {
    pub id: String,
    pub members: Vec<usize>,
}

impl ComputationalLoop {
    /// True if any member is a PID controller. Controller-mediated loops are
    /// seeded through the setpoint machinery, not through algebraic loop
    /// iteration.
    pub fn contains_pid(&self, models: &[PlantModel]) -> bool {
        self.members
            .iter()
            .any(|&m| models[m].kind() == ModelKind::Pid)
    }
}

/// Find all maximal mutual-dependency sets in the graph.
pub fn find_computational_loops(graph: &ConnectionGraph) -> Vec<ComputationalLoop> {
    let n = graph.n_models();

    // depends_on[i]: every model i transitively depends on.
    // BTreeSet keeps iteration deterministic.
    let mut depends_on: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for &(up, down) in graph.edges() {
        depends_on[down].insert(up);
    }

    // fixed point: propagate until no new dependency is discovered.
    // converges within n rounds; bound it anyway.
    for _ in 0..=n {
        let mut changed = false;
        for model in 0..n {
            let direct: Vec<usize> = depends_on[model].iter().copied().collect();
            for dep in direct {
                let transitive: Vec<usize> = depends_on[dep].iter().copied().collect();
                for far in transitive {
                    if far != model && depends_on[model].insert(far) {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    // mutual pairs form loops; merge transitively into maximal sets
    let mut loops: Vec<ComputationalLoop> = Vec::new();
    for model in 0..n {
        let deps: Vec<usize> = depends_on[model].iter().copied().collect();
        for dep in deps {
            if !depends_on[dep].contains(&model) {
                continue;
            }
            let mut added_to_existing = false;
            let mut already_known = false;
            for lp in &mut loops {
                if lp.members.contains(&model) {
                    if !lp.members.contains(&dep) {
                        lp.members.push(dep);
                        added_to_existing = true;
                    } else {
                        already_known = true;
                    }
                } else if lp.members.contains(&dep) {
                    lp.members.push(model);
                    added_to_existing = true;
                }
            }
            if !added_to_existing && !already_known {
                loops.push(ComputationalLoop {
                    id: format!("CompLoop_{}", loops.len()),
                    members: vec![model, dep],
                });
            }
        }
    }
    loops
}
