// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Controller Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ctrl_control::adaptation::{blend_weight_update, ErrorRecord};
use ctrl_control::forecast::{mean_baseline, Window};
use ctrl_control::{BlendController, HorizonOptimizer};
use ctrl_dynamics::{LinearSystem, LinearSystemConfig};
use ctrl_types::config::{ControllerConfig, NominalMode, OptimizerConfig, TuneOptions};
use ctrl_types::input_space::InputSpace;
use ndarray::Array1;
use std::hint::black_box;

const HORIZON: usize = 5;

fn controller() -> BlendController<LinearSystem> {
    let mut sys = LinearSystemConfig::new(3, vec![InputSpace::continuous(0.0, 1.0).unwrap()]);
    sys.seed = Some(3);
    let model = LinearSystem::new(sys).unwrap();
    let mut cfg = OptimizerConfig::new(HORIZON);
    cfg.max_iterations = 100;
    cfg.seed = Some(4);
    let optimizer = HorizonOptimizer::for_model(cfg, &model).unwrap();
    let config = ControllerConfig {
        nominal: NominalMode::MeanBaseline,
        seed: Some(5),
        ..ControllerConfig::default()
    };
    BlendController::new(model, optimizer, config).unwrap()
}

fn bench_tune(c: &mut Criterion) {
    let preds = vec![Array1::from_vec(vec![1.0, 0.0, 0.0]); HORIZON];
    let opts = TuneOptions::default();
    c.bench_function("blend_tune_10_cycles", |b| {
        b.iter_batched(
            controller,
            |mut ctrl| {
                for _ in 0..10 {
                    let (costs, _) = ctrl.tune(&preds, None, &opts).unwrap();
                    black_box(costs[0]);
                }
                black_box(ctrl.psi());
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_forecast_and_adaptation(c: &mut Criterion) {
    let window = Window::constant(0.3, 16, 8).unwrap();
    c.bench_function("mean_baseline_h20_w16", |b| {
        b.iter_batched(
            || window.clone(),
            |w| {
                let (means, _) = mean_baseline(20, 8, w).unwrap();
                black_box(means.len());
            },
            BatchSize::SmallInput,
        )
    });

    let queue: Vec<ErrorRecord> = (0..32)
        .map(|i| {
            let s = i as f64 * 0.01;
            ErrorRecord::new(Array1::from_elem(8, s), Array1::from_elem(8, -s))
        })
        .collect();
    c.bench_function("blend_weight_update_q32", |b| {
        b.iter(|| black_box(blend_weight_update(black_box(0.4), 0.93, 3, &queue, 8)))
    });
}

criterion_group!(benches, bench_tune, bench_forecast_and_adaptation);
criterion_main!(benches);
