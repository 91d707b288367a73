//! Closed PID loop around a single process unit.

use pl_core::{SignalKind, SignalStore};
use pl_models::{PidModel, PidParameters, SimulatableModel, UnitModel, UnitParameters};
use pl_sim::Plant;

fn closed_loop_plant(process_gain: f64) -> Plant {
    let mut plant = Plant::new("pid-loop");
    plant
        .add_model(PidModel::new(
            PidParameters {
                kp: 0.5,
                ti_s: 20.0,
                ..Default::default()
            },
            "pid",
        ))
        .unwrap();
    plant
        .add_model(UnitModel::new(
            UnitParameters {
                time_constant_s: 10.0,
                linear_gains: vec![process_gain],
                bias: 0.0,
                ..Default::default()
            },
            "proc",
        ))
        .unwrap();
    plant.connect("proc", "pid", None).unwrap();
    plant.connect("pid", "proc", Some(0)).unwrap();
    plant
}

#[test]
fn setpoint_step_converges_to_new_setpoint() {
    let n = 600;
    let mut plant = closed_loop_plant(1.0);
    let yset_id = plant
        .add_external_signal("pid", SignalKind::Setpoint, 0)
        .unwrap();

    let mut input = SignalStore::new(1.0);
    let mut yset = vec![50.0; n];
    for v in yset.iter_mut().skip(n / 4) {
        *v = 51.0;
    }
    input.add(yset_id, yset).unwrap();

    let result = plant.simulate(&input).unwrap();
    assert!(result.ok, "failures: {:?}", result.failures);

    let y_id = plant.model("proc").unwrap().output_id();
    let y = result.data.get_values(&y_id).unwrap();
    assert!((y[n / 4 - 1] - 50.0).abs() < 0.01, "pre-step y = {}", y[n / 4 - 1]);
    assert!((y[n - 1] - 51.0).abs() < 0.01, "settled y = {}", y[n - 1]);
}

#[test]
fn initialization_back_solves_controller_output() {
    let n = 20;
    let mut plant = closed_loop_plant(2.0);
    let yset_id = plant
        .add_external_signal("pid", SignalKind::Setpoint, 0)
        .unwrap();

    let mut input = SignalStore::new(1.0);
    input.add(yset_id, vec![50.0; n]).unwrap();

    let result = plant.simulate(&input).unwrap();
    assert!(result.ok);

    // steady state for y = 50 through a gain-2 process needs u = 25
    let u_id = plant.model("pid").unwrap().output_id();
    let u = result.data.get_values(&u_id).unwrap();
    assert!((u[0] - 25.0).abs() < 1e-6);
    assert!((u[n - 1] - 25.0).abs() < 1e-6);
}

#[test]
fn disturbance_is_rejected_by_integral_action() {
    let n = 800;
    let mut plant = closed_loop_plant(1.0);
    let yset_id = plant
        .add_external_signal("pid", SignalKind::Setpoint, 0)
        .unwrap();
    let d_id = plant
        .add_external_signal("proc", SignalKind::Disturbance, 0)
        .unwrap();

    let mut input = SignalStore::new(1.0);
    input.add(yset_id, vec![50.0; n]).unwrap();
    let mut d = vec![0.0; n];
    for v in d.iter_mut().skip(n / 4) {
        *v = 2.0;
    }
    input.add(d_id, d).unwrap();

    let result = plant.simulate(&input).unwrap();
    assert!(result.ok, "failures: {:?}", result.failures);

    let y_id = plant.model("proc").unwrap().output_id();
    let u_id = plant.model("pid").unwrap().output_id();
    let y = result.data.get_values(&y_id).unwrap();
    let u = result.data.get_values(&u_id).unwrap();

    // before the disturbance: steady at the setpoint with u = 50
    assert!((y[n / 4 - 1] - 50.0).abs() < 0.01);
    assert!((u[n / 4 - 1] - 50.0).abs() < 0.01);
    // after: the controller has absorbed the +2 disturbance
    assert!((y[n - 1] - 50.0).abs() < 0.01, "settled y = {}", y[n - 1]);
    assert!((u[n - 1] - 48.0).abs() < 0.01, "settled u = {}", u[n - 1]);
}
