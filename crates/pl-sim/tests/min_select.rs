//! Min-select (split-range) control: two controllers drive one process
//! through a minimum selector; the non-selected controller tracks.

use pl_controls::PidStatus;
use pl_core::{SignalKind, SignalStore};
use pl_models::{
    pid_slots, PidModel, PidParameters, SelectKind, SelectModel, SimulatableModel, UnitModel,
    UnitParameters,
};
use pl_sim::Plant;

fn min_select_plant() -> Plant {
    let mut plant = Plant::new("min-select");
    let pid_params = PidParameters {
        kp: 0.5,
        ti_s: 20.0,
        ..Default::default()
    };
    plant
        .add_model(PidModel::new(pid_params.clone(), "pidA"))
        .unwrap();
    plant.add_model(PidModel::new(pid_params, "pidB")).unwrap();
    plant
        .add_model(SelectModel::new(SelectKind::Min, "sel", 2))
        .unwrap();
    plant
        .add_model(UnitModel::new(
            UnitParameters {
                time_constant_s: 10.0,
                linear_gains: vec![1.0],
                bias: 0.0,
                ..Default::default()
            },
            "proc",
        ))
        .unwrap();

    plant.connect("pidA", "sel", Some(0)).unwrap();
    plant.connect("pidB", "sel", Some(1)).unwrap();
    plant.connect("sel", "proc", Some(0)).unwrap();
    plant.connect("proc", "pidA", None).unwrap();
    plant.connect("proc", "pidB", None).unwrap();
    plant
        .connect("sel", "pidA", Some(pid_slots::TRACKING))
        .unwrap();
    plant
        .connect("sel", "pidB", Some(pid_slots::TRACKING))
        .unwrap();
    plant
}

#[test]
fn exactly_one_controller_in_auto_at_every_index() {
    let n = 120;
    let mut plant = min_select_plant();
    let yset_a = plant
        .add_external_signal("pidA", SignalKind::Setpoint, 0)
        .unwrap();
    let yset_b = plant
        .add_external_signal("pidB", SignalKind::Setpoint, 0)
        .unwrap();

    let mut input = SignalStore::new(1.0);
    input.add(yset_a, vec![50.0; n]).unwrap();
    input.add(yset_b, vec![60.0; n]).unwrap();

    let result = plant.simulate(&input).unwrap();
    assert!(result.ok, "failures: {:?}", result.failures);

    let status_a = &result.pid_status["pidA"];
    let status_b = &result.pid_status["pidB"];
    assert_eq!(status_a.len(), n);
    assert_eq!(status_b.len(), n);
    for t in 0..n {
        let auto_count = [status_a[t], status_b[t]]
            .iter()
            .filter(|&&s| s == PidStatus::Auto)
            .count();
        assert_eq!(
            auto_count, 1,
            "t={}: statuses were {:?}/{:?}",
            t, status_a[t], status_b[t]
        );
    }
    // the lower-setpoint controller wins a min select
    assert!(status_a.iter().all(|&s| s == PidStatus::Auto));
    assert!(status_b.iter().all(|&s| s == PidStatus::Tracking));
}

#[test]
fn selector_passes_winner_and_loser_stays_offset() {
    let n = 120;
    let mut plant = min_select_plant();
    let yset_a = plant
        .add_external_signal("pidA", SignalKind::Setpoint, 0)
        .unwrap();
    let yset_b = plant
        .add_external_signal("pidB", SignalKind::Setpoint, 0)
        .unwrap();

    let mut input = SignalStore::new(1.0);
    input.add(yset_a, vec![50.0; n]).unwrap();
    input.add(yset_b, vec![60.0; n]).unwrap();

    let result = plant.simulate(&input).unwrap();
    assert!(result.ok);

    let sel = result
        .data
        .get_values(&plant.model("sel").unwrap().output_id())
        .unwrap();
    let u_b = result
        .data
        .get_values(&plant.model("pidB").unwrap().output_id())
        .unwrap();
    let y = result
        .data
        .get_values(&plant.model("proc").unwrap().output_id())
        .unwrap();

    for t in 0..n {
        assert!((sel[t] - 50.0).abs() < 1e-6, "sel[{}] = {}", t, sel[t]);
        // the loser holds one tracking offset above the selected output
        assert!((u_b[t] - 51.0).abs() < 1e-6, "u_B[{}] = {}", t, u_b[t]);
        assert!((y[t] - 50.0).abs() < 1e-6, "y[{}] = {}", t, y[t]);
    }
}
