// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Property-Based Tests (proptest) for ctrl-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for ctrl-types using proptest.
//!
//! Covers: input-space projection, padding, configuration serialization.

use ctrl_types::config::{ControlConfig, ControllerConfig, OptimizerConfig, TuneOptions};
use ctrl_types::input_space::{admissible_mask, pad_input_space, InputSpace, Sampling};
use proptest::prelude::*;

// ── Input-Space Projection ───────────────────────────────────────────

proptest! {
    /// Continuous clip always lands inside [min, max].
    #[test]
    fn continuous_clip_in_range(
        min in -100.0f64..0.0,
        width in 0.0f64..100.0,
        v in -1e4f64..1e4,
    ) {
        let max = min + width;
        let s = InputSpace::continuous(min, max).unwrap();
        let c = s.clip(v);
        prop_assert!(c >= min && c <= max, "clip({}) = {} outside [{}, {}]", v, c, min, max);
    }

    /// Discrete clip lands on a grid point.
    #[test]
    fn discrete_clip_on_grid(
        min in -20.0f64..0.0,
        width in 0.5f64..40.0,
        step in 0.1f64..5.0,
        v in -100.0f64..100.0,
    ) {
        let s = InputSpace::discrete(min, min + width, step).unwrap();
        let c = s.clip(v);
        let k = (c - min) / step;
        prop_assert!((k - k.round()).abs() < 1e-9, "{} is not on the grid", c);
        prop_assert!(k.round() >= 0.0 && (k.round() as usize) < s.grid_len());
    }

    /// Clipping is idempotent.
    #[test]
    fn clip_idempotent(v in -50.0f64..50.0, step in 0.25f64..3.0) {
        let spaces = [
            InputSpace::continuous(-5.0, 5.0).unwrap(),
            InputSpace::discrete(-5.0, 5.0, step).unwrap(),
            InputSpace::random(Sampling::Normal, -5.0, 5.0).unwrap(),
            InputSpace::Unconstrained,
        ];
        for s in spaces {
            let once = s.clip(v);
            prop_assert!((s.clip(once) - once).abs() < 1e-12);
        }
    }

    /// Padding preserves the given prefix and fills with Unconstrained.
    #[test]
    fn padding_shape(n_given in 0usize..5, extra in 0usize..5) {
        let given: Vec<InputSpace> = (0..n_given)
            .map(|i| InputSpace::continuous(-(i as f64), i as f64).unwrap())
            .collect();
        let sys_dim = n_given + extra;
        let padded = pad_input_space(&given, sys_dim).unwrap();
        prop_assert_eq!(padded.len(), sys_dim);
        let mask = admissible_mask(&padded);
        prop_assert_eq!(mask.iter().filter(|&&m| m == 1.0).count(), n_given);
    }
}

// ── Configuration Serialization ──────────────────────────────────────

proptest! {
    /// Configuration survives a JSON roundtrip.
    #[test]
    fn config_json_roundtrip(
        horizon in 1usize..50,
        alpha in 1e-4f64..1.0,
        warmup in 1usize..10,
        alpha_ema in 0.0f64..1.0,
    ) {
        let mut optimizer = OptimizerConfig::new(horizon);
        optimizer.alpha = alpha;
        let controller = ControllerConfig { warmup_steps: warmup, ..ControllerConfig::default() };
        let tune = TuneOptions { alpha_ema, ..TuneOptions::default() };
        let cfg = ControlConfig { optimizer, controller, tune };

        let json = serde_json::to_string(&cfg).unwrap();
        let back = ControlConfig::from_json(&json).unwrap();
        prop_assert_eq!(back, cfg);
    }
}
