// ─────────────────────────────────────────────────────────────────────
// SCPN Control — End-to-End Control Loop Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Closed-loop runs of the blend controller against the reference plant.

use ctrl_control::{BlendController, Constraint, HorizonOptimizer};
use ctrl_dynamics::{DynamicsModel, LinearSystem, LinearSystemConfig};
use ctrl_types::config::{
    ControlConfig, ControllerConfig, NominalMode, OptimizerConfig, OptimizerMode, TuneOptions,
};
use ctrl_types::input_space::InputSpace;
use ndarray::Array1;

const HORIZON: usize = 5;

fn plant(seed: u64) -> LinearSystem {
    let mut cfg = LinearSystemConfig::new(3, vec![InputSpace::continuous(0.0, 1.0).unwrap()]);
    cfg.seed = Some(seed);
    LinearSystem::new(cfg).unwrap()
}

fn gradient_config() -> OptimizerConfig {
    let mut cfg = OptimizerConfig::new(HORIZON);
    cfg.optimizer = OptimizerMode::Gradient;
    cfg.max_iterations = 200;
    cfg.seed = Some(17);
    cfg
}

fn constant_predictions() -> Vec<Array1<f64>> {
    vec![Array1::from_vec(vec![1.0, 0.0, 0.0]); HORIZON]
}

#[test]
fn test_mean_baseline_gradient_loop() {
    let model = plant(2024);
    let optimizer = HorizonOptimizer::for_model(gradient_config(), &model).unwrap();
    let config = ControllerConfig {
        nominal: NominalMode::MeanBaseline,
        seed: Some(5),
        ..ControllerConfig::default()
    };
    let mut controller = BlendController::new(model, optimizer, config).unwrap();
    let preds = constant_predictions();
    let opts = TuneOptions::default();

    for cycle in 0..10 {
        let (costs, controls) = controller.tune(&preds, None, &opts).unwrap();
        assert_eq!(costs.len(), HORIZON, "cycle {cycle}");
        assert_eq!(controls.len(), HORIZON, "cycle {cycle}");
        let psi = controller.psi();
        assert!((0.0..=1.0).contains(&psi), "cycle {cycle}: psi = {psi}");
        for u in &controls {
            assert!(u[0] >= 0.0 && u[0] <= 1.0, "control out of range: {}", u[0]);
            assert_eq!(u[1], 0.0);
            assert_eq!(u[2], 0.0);
        }
    }
    assert_eq!(controller.window().map(|w| w.len()), Some(3));
    assert_eq!(controller.last_nominal().len(), HORIZON);
}

#[test]
fn test_every_optimizer_and_nominal_mode_runs() {
    for optimizer_mode in [
        OptimizerMode::Random,
        OptimizerMode::Gradient,
        OptimizerMode::Genetic,
    ] {
        for nominal in [
            NominalMode::Baseline,
            NominalMode::MeanBaseline,
            NominalMode::Ema,
        ] {
            let model = plant(11);
            let mut cfg = gradient_config();
            cfg.optimizer = optimizer_mode;
            cfg.max_iterations = 30;
            cfg.tolerance_step = 10;
            cfg.population_size = 20;
            let optimizer = HorizonOptimizer::for_model(cfg, &model).unwrap();
            let config = ControllerConfig {
                nominal,
                seed: Some(8),
                ..ControllerConfig::default()
            };
            let mut controller = BlendController::new(model, optimizer, config).unwrap();
            for _ in 0..4 {
                let (_, controls) = controller
                    .tune(&constant_predictions(), None, &TuneOptions::default())
                    .unwrap();
                assert_eq!(controls.len(), HORIZON, "{optimizer_mode:?}/{nominal:?}");
            }
            assert!((0.0..=1.0).contains(&controller.psi()));
        }
    }
}

#[test]
fn test_first_control_applied_to_plant() {
    let mut model = plant(99);
    let mut optimizer = HorizonOptimizer::for_model(gradient_config(), &model).unwrap();
    let (_, controls) = optimizer.optimize(&model, &constant_predictions()).unwrap();

    let x = model.state().clone();
    model.step(&controls[0]).unwrap();
    let expected = &x + &controls[0] + model.disturbance();
    assert_eq!(model.state(), &expected);
}

#[test]
fn test_controller_hands_back_plant() {
    let mut model = plant(12);
    model
        .set_state(Array1::from_vec(vec![2.0, -1.0, 0.5]))
        .unwrap();
    let optimizer = HorizonOptimizer::for_model(gradient_config(), &model).unwrap();
    let mut controller =
        BlendController::new(model, optimizer, ControllerConfig::default()).unwrap();
    let (_, controls) = controller
        .tune(&constant_predictions(), None, &TuneOptions::default())
        .unwrap();

    let mut model = controller.into_model();
    let expected = Array1::from_vec(vec![2.0, -1.0, 0.5]) + &controls[0] + model.disturbance();
    assert_eq!(model.state(), &expected);
    model.reset();
    assert!(model.state().iter().all(|&x| x == 0.0));
}

#[test]
fn test_planning_leaves_real_state() {
    let model = plant(4);
    let before = model.state().clone();
    let mut optimizer = HorizonOptimizer::for_model(gradient_config(), &model).unwrap();
    optimizer.optimize(&model, &constant_predictions()).unwrap();
    assert_eq!(model.state(), &before);
}

#[test]
fn test_constrained_loop_respects_limit() {
    let model = plant(31);
    let optimizer = HorizonOptimizer::for_model(gradient_config(), &model)
        .unwrap()
        .with_constraint("actuator", Constraint::box_limit(0.0, 0.25));
    let mut controller =
        BlendController::new(model, optimizer, ControllerConfig::default()).unwrap();
    for _ in 0..5 {
        let (_, controls) = controller
            .tune(&constant_predictions(), None, &TuneOptions::default())
            .unwrap();
        for u in &controls {
            assert!(u[0] <= 0.25 + 1e-12, "limit exceeded: {}", u[0]);
        }
    }
}

#[test]
fn test_config_file_drives_loop() {
    let json = r#"{
        "optimizer": { "horizon": 5, "optimizer": "random", "max_iterations": 40, "tolerance_step": 10, "seed": 1 },
        "controller": { "nominal": "ema", "seed": 2 },
        "tune": { "window": { "kind": "auto", "init": 0.5, "size": 4 }, "alpha_ema": 0.2 }
    }"#;
    let cfg = ControlConfig::from_json(json).unwrap();
    let model = plant(6);
    let optimizer = HorizonOptimizer::for_model(cfg.optimizer, &model).unwrap();
    let mut controller = BlendController::new(model, optimizer, cfg.controller).unwrap();
    let (costs, _) = controller
        .tune(&constant_predictions(), None, &cfg.tune)
        .unwrap();
    assert_eq!(costs.len(), HORIZON);
    assert_eq!(controller.window().map(|w| w.len()), Some(4));
}
