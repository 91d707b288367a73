//! The directed edge set between models of one plant.

use pl_models::{pid_slots, ModelKind, PlantModel, SimulatableModel};

/// Tracks which model feeds which in a set of models.
///
/// Models are referenced by their index in the plant's model arena;
/// insertion order of the arena is the tie-break order everywhere, which
/// keeps analysis results reproducible.
#[derive(Debug, Clone)]
pub struct ConnectionGraph {
    edges: Vec<(usize, usize)>,
    n_models: usize,
}

impl ConnectionGraph {
    /// Derive the edge set from the models' input/output signal ids.
    ///
    /// A PID controller's tracking input is a control coupling, not a data
    /// dependency: including it would manufacture spurious cycles between
    /// split-range controllers, so it is left out of the edge set.
    pub fn build(models: &[PlantModel]) -> Self {
        let outputs: Vec<_> = models.iter().map(SimulatableModel::output_id).collect();
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (upstream, output_id) in outputs.iter().enumerate() {
            for (downstream, model) in models.iter().enumerate() {
                if upstream == downstream {
                    continue;
                }
                let mut input_ids = model.combined_input_ids();
                if model.kind() == ModelKind::Pid && input_ids.len() > pid_slots::TRACKING {
                    input_ids[pid_slots::TRACKING] = None;
                }
                let feeds = input_ids
                    .iter()
                    .flatten()
                    .any(|input_id| input_id == output_id);
                if feeds && !edges.contains(&(upstream, downstream)) {
                    edges.push((upstream, downstream));
                }
            }
        }
        Self {
            edges,
            n_models: models.len(),
        }
    }

    pub fn n_models(&self) -> usize {
        self.n_models
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Models one level directly downstream of the given model.
    pub fn downstream_of(&self, model: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|(up, _)| *up == model)
            .map(|(_, down)| *down)
            .collect()
    }

    /// Models one level directly upstream of the given model.
    pub fn upstream_of(&self, model: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|(_, down)| *down == model)
            .map(|(up, _)| *up)
            .collect()
    }

    /// Models with no upstream connections (signal generators, or models fed
    /// purely by external signals).
    pub fn sources(&self) -> Vec<usize> {
        (0..self.n_models)
            .filter(|m| !self.edges.iter().any(|(_, down)| down == m))
            .collect()
    }

    /// Immediate upstream models that are PID controllers.
    pub fn upstream_pids(&self, model: usize, models: &[PlantModel]) -> Vec<usize> {
        self.upstream_of(model)
            .into_iter()
            .filter(|&up| models[up].kind() == ModelKind::Pid)
            .collect()
    }

    pub fn has_upstream_pid(&self, model: usize, models: &[PlantModel]) -> bool {
        !self.upstream_pids(model, models).is_empty()
    }
}
