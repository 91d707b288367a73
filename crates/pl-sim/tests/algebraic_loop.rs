//! Two static units in mutual feedback (a raw algebraic loop, no controller
//! involved).
//!
//! y_a = 0.5*y_b + u1,  y_b = 0.5*y_a + u2; with u1 = u2 = 1 the fixed
//! point is y_a = y_b = 2. The initializer settles the pair by bounded
//! Gauss-Seidel sweeps and the time stepping then converges the remaining
//! residual geometrically.

use pl_core::{SignalKind, SignalStore};
use pl_models::{SimulatableModel, UnitModel, UnitParameters};
use pl_sim::Plant;

#[test]
fn mutual_feedback_pair_settles_to_fixed_point() {
    let n = 100;
    let mut plant = Plant::new("algebraic-loop");
    plant
        .add_model(UnitModel::new(
            UnitParameters {
                linear_gains: vec![0.5, 1.0],
                ..Default::default()
            },
            "a",
        ))
        .unwrap();
    plant
        .add_model(UnitModel::new(
            UnitParameters {
                linear_gains: vec![0.5, 1.0],
                ..Default::default()
            },
            "b",
        ))
        .unwrap();
    plant.connect("b", "a", Some(0)).unwrap();
    plant.connect("a", "b", Some(0)).unwrap();
    let u1 = plant
        .add_external_signal("a", SignalKind::ExternalInput, 1)
        .unwrap();
    let u2 = plant
        .add_external_signal("b", SignalKind::ExternalInput, 1)
        .unwrap();

    let mut input = SignalStore::new(1.0);
    input.add(u1, vec![1.0; n]).unwrap();
    input.add(u2, vec![1.0; n]).unwrap();

    let result = plant.simulate(&input).unwrap();
    assert!(result.ok, "failures: {:?}", result.failures);

    let y_a = result
        .data
        .get_values(&plant.model("a").unwrap().output_id())
        .unwrap();
    let y_b = result
        .data
        .get_values(&plant.model("b").unwrap().output_id())
        .unwrap();

    // the bounded loop seeding gets close to the fixed point...
    assert!((y_a[0] - 2.0).abs() < 1e-3, "seeded y_a = {}", y_a[0]);
    assert!((y_b[0] - 2.0).abs() < 1e-3, "seeded y_b = {}", y_b[0]);
    // ...and the sweep-to-sweep iteration finishes the job
    assert!((y_a[n - 1] - 2.0).abs() < 1e-9);
    assert!((y_b[n - 1] - 2.0).abs() < 1e-9);
}
