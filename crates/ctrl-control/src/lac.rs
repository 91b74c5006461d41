// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Learning-Augmented Blend Controller
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Receding-horizon controller that plans against a convex blend of an
//! external disturbance prediction and a model-based nominal forecast.
//!
//! Each `tune` cycle forecasts nominals, periodically adapts the blend weight
//! `psi`, optimises over the blended disturbances, applies the first control
//! to the owned plant and records how far each source was from the
//! disturbance the plant actually realised.

use crate::adaptation::{blend_weight_update, ErrorRecord};
use crate::forecast::{forecast, Window};
use crate::mpc::HorizonOptimizer;
use ctrl_dynamics::DynamicsModel;
use ctrl_math::vector::{blend, head, zero_pad};
use ctrl_types::config::{ControllerConfig, TuneOptions, WindowInit};
use ctrl_types::error::{CtrlError, CtrlResult};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub struct BlendController<M: DynamicsModel> {
    model: M,
    optimizer: HorizonOptimizer,
    config: ControllerConfig,
    psi: f64,
    counter: usize,
    errors: Vec<ErrorRecord>,
    window: Option<Window>,
    last_nominal: Vec<Array1<f64>>,
}

impl<M: DynamicsModel> BlendController<M> {
    /// Takes ownership of the plant. The initial `psi` is uniform on [0, 1).
    pub fn new(model: M, optimizer: HorizonOptimizer, config: ControllerConfig) -> CtrlResult<Self> {
        config.validate()?;
        if optimizer.sys_dim() != model.sys_dim() {
            return Err(CtrlError::dimension(
                "optimizer sys_dim",
                model.sys_dim(),
                optimizer.sys_dim(),
            ));
        }
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let psi = rng.gen::<f64>();
        Ok(BlendController {
            model,
            optimizer,
            config,
            psi,
            counter: 0,
            errors: Vec::new(),
            window: None,
            last_nominal: Vec::new(),
        })
    }

    /// Replace the initial blend weight.
    pub fn with_psi(mut self, psi: f64) -> CtrlResult<Self> {
        if !(0.0..=1.0).contains(&psi) {
            return Err(CtrlError::ConfigError(format!(
                "psi must be in [0, 1], got {psi}"
            )));
        }
        self.psi = psi;
        Ok(self)
    }

    pub fn psi(&self) -> f64 {
        self.psi
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn error_queue(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// `None` until the first `tune` call.
    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn last_nominal(&self) -> &[Array1<f64>] {
        &self.last_nominal
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn optimizer(&self) -> &HorizonOptimizer {
        &self.optimizer
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Run one adaptation of `psi` against the current error queue.
    pub fn adapt_weight(&mut self) -> f64 {
        let before = self.psi;
        self.psi = self.adapted_psi(self.counter);
        debug!(before, after = self.psi, queued = self.errors.len(), "psi adapted");
        self.psi
    }

    fn adapted_psi(&self, counter: usize) -> f64 {
        blend_weight_update(
            self.psi,
            self.config.rho,
            counter,
            &self.errors,
            self.model.disturbance_dim(),
        )
    }

    /// One control cycle.
    ///
    /// `predictions` holds `horizon` vectors of length `disturbance_dim`.
    /// `manual_nominals`, when given, replaces the forecast and holds
    /// `horizon` vectors of length `sys_dim`. Returns the per-step costs and
    /// controls of the plan whose first control was applied.
    pub fn tune(
        &mut self,
        predictions: &[Array1<f64>],
        manual_nominals: Option<&[Array1<f64>]>,
        options: &TuneOptions,
    ) -> CtrlResult<(Vec<f64>, Vec<Array1<f64>>)> {
        options.validate()?;
        let horizon = self.optimizer.horizon();
        let sys_dim = self.model.sys_dim();
        let dist_dim = self.model.disturbance_dim();

        if predictions.len() != horizon {
            return Err(CtrlError::horizon("predictions", horizon, predictions.len()));
        }
        for p in predictions {
            if p.len() != dist_dim {
                return Err(CtrlError::dimension("prediction", dist_dim, p.len()));
            }
        }
        if let Some(manual) = manual_nominals {
            if manual.len() != horizon {
                return Err(CtrlError::horizon("manual nominals", horizon, manual.len()));
            }
            for n in manual {
                if n.len() != sys_dim {
                    return Err(CtrlError::dimension("manual nominal", sys_dim, n.len()));
                }
            }
        }

        // Controller state is only written back once the plant has stepped.
        let window = match &self.window {
            Some(w) => w.clone(),
            None => materialize_window(&options.window, dist_dim)?,
        };

        let (nominals, mut window) = match manual_nominals {
            Some(manual) => (manual.to_vec(), window),
            None => {
                let seed = Array1::zeros(dist_dim);
                let f = forecast(
                    self.config.nominal,
                    horizon,
                    dist_dim,
                    window,
                    &seed,
                    &seed,
                    options.alpha_ema,
                )?;
                (f.nominals, f.window)
            }
        };

        let mut counter = self.counter + 1;
        let adapt = counter >= self.config.warmup_steps;
        let psi = if adapt {
            self.adapted_psi(counter)
        } else {
            self.psi
        };
        if adapt {
            counter = 0;
        }

        let blended: Vec<Array1<f64>> = predictions
            .iter()
            .zip(&nominals)
            .map(|(p, n)| blend(&zero_pad(p, sys_dim), &zero_pad(n, sys_dim), psi))
            .collect();

        let (costs, controls) = self.optimizer.optimize(&self.model, &blended)?;
        let first = controls
            .first()
            .ok_or_else(|| CtrlError::horizon("controls", horizon, 0))?;
        self.model.step(first)?;

        let phi = head(self.model.disturbance(), dist_dim);
        let record = ErrorRecord::new(
            &phi - &predictions[0],
            &phi - &head(&nominals[0], dist_dim),
        );
        window.slide(phi)?;

        if adapt {
            debug!(before = self.psi, after = psi, queued = self.errors.len(), "psi adapted");
            self.errors.pop();
        }
        self.psi = psi;
        self.counter = counter;
        self.errors.push(record);
        self.window = Some(window);
        self.last_nominal = nominals;

        debug!(
            psi = self.psi,
            counter = self.counter,
            cost = costs.first().copied(),
            queued = self.errors.len(),
            "tune cycle complete"
        );
        Ok((costs, controls))
    }
}

fn materialize_window(init: &WindowInit, dim: usize) -> CtrlResult<Window> {
    match init {
        WindowInit::Auto { init, size } => Window::constant(*init, *size, dim),
        WindowInit::Manual { entries } => Window::from_entries(
            entries.iter().map(|e| Array1::from_vec(e.clone())).collect(),
            dim,
        ),
    }
}
