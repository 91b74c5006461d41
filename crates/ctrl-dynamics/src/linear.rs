// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Linear System
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reference integrator plant `x_{t+1} = x_t + u_t + φ_t`.
//!
//! The disturbance φ is redrawn on every step from a configurable source
//! over the first `disturbance_dim` dimensions and zero-padded to `sys_dim`.

use crate::model::DynamicsModel;
use ctrl_types::error::{CtrlError, CtrlResult};
use ctrl_types::input_space::{pad_input_space, InputSpace};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Disturbance source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisturbanceKind {
    Normal { mean: f64, std: f64 },
    Uniform { low: f64, high: f64 },
    /// Exponential with mean `scale`.
    Exponential { scale: f64 },
    /// Constant vector, zero-padded to `sys_dim`.
    Fixed { values: Vec<f64> },
}

impl Default for DisturbanceKind {
    fn default() -> Self {
        DisturbanceKind::Normal {
            mean: 0.0,
            std: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSystemConfig {
    #[serde(default = "default_sys_name")]
    pub sys_name: String,
    pub sys_dim: usize,
    pub input_dim: usize,
    pub input_space: Vec<InputSpace>,
    /// Active disturbance dimensions; `None` means all of `sys_dim`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disturbance_dim: Option<usize>,
    #[serde(default)]
    pub disturbance: DisturbanceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_sys_name() -> String {
    "LinearSystem".to_string()
}

impl LinearSystemConfig {
    pub fn new(sys_dim: usize, input_space: Vec<InputSpace>) -> Self {
        LinearSystemConfig {
            sys_name: default_sys_name(),
            sys_dim,
            input_dim: input_space.len(),
            input_space,
            disturbance_dim: None,
            disturbance: DisturbanceKind::default(),
            seed: None,
        }
    }
}

enum Source {
    Normal(Normal<f64>),
    Uniform { low: f64, high: f64 },
    Exponential(Exp<f64>),
    Fixed(Array1<f64>),
}

impl Source {
    fn build(kind: &DisturbanceKind, sys_dim: usize) -> CtrlResult<Self> {
        match kind {
            DisturbanceKind::Normal { mean, std } => {
                if !mean.is_finite() {
                    return Err(CtrlError::ConfigError(format!(
                        "disturbance mean must be finite, got {mean}"
                    )));
                }
                Normal::new(*mean, *std).map(Source::Normal).map_err(|e| {
                    CtrlError::ConfigError(format!("invalid normal disturbance: {e}"))
                })
            }
            DisturbanceKind::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(CtrlError::ConfigError(format!(
                        "uniform disturbance needs finite low <= high, got [{low}, {high}]"
                    )));
                }
                Ok(Source::Uniform {
                    low: *low,
                    high: *high,
                })
            }
            DisturbanceKind::Exponential { scale } => {
                if !scale.is_finite() || *scale <= 0.0 {
                    return Err(CtrlError::ConfigError(format!(
                        "exponential disturbance scale must be > 0, got {scale}"
                    )));
                }
                Exp::new(1.0 / scale).map(Source::Exponential).map_err(|e| {
                    CtrlError::ConfigError(format!("invalid exponential disturbance: {e}"))
                })
            }
            DisturbanceKind::Fixed { values } => {
                if values.len() > sys_dim {
                    return Err(CtrlError::dimension(
                        "fixed disturbance (length <= sys_dim)",
                        sys_dim,
                        values.len(),
                    ));
                }
                let mut padded = Array1::zeros(sys_dim);
                for (p, &v) in padded.iter_mut().zip(values.iter()) {
                    *p = v;
                }
                Ok(Source::Fixed(padded))
            }
        }
    }
}

pub struct LinearSystem {
    name: String,
    sys_dim: usize,
    input_dim: usize,
    disturbance_dim: usize,
    input_space: Vec<InputSpace>,
    source: Source,
    x: Array1<f64>,
    phi: Array1<f64>,
    rng: StdRng,
}

impl LinearSystem {
    pub fn new(config: LinearSystemConfig) -> CtrlResult<Self> {
        if config.sys_dim == 0 {
            return Err(CtrlError::ConfigError("sys_dim must be >= 1".to_string()));
        }
        if config.input_dim == 0 {
            return Err(CtrlError::ConfigError("input_dim must be >= 1".to_string()));
        }
        if config.input_space.len() != config.input_dim {
            return Err(CtrlError::dimension(
                "input_space entries vs input_dim",
                config.input_dim,
                config.input_space.len(),
            ));
        }
        let input_space = pad_input_space(&config.input_space, config.sys_dim)?;

        let disturbance_dim = config.disturbance_dim.unwrap_or(config.sys_dim);
        if disturbance_dim == 0 || disturbance_dim > config.sys_dim {
            return Err(CtrlError::ConfigError(format!(
                "disturbance_dim must be in [1, sys_dim={}], got {disturbance_dim}",
                config.sys_dim
            )));
        }

        let source = Source::build(&config.disturbance, config.sys_dim)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut system = LinearSystem {
            name: config.sys_name,
            sys_dim: config.sys_dim,
            input_dim: config.input_dim,
            disturbance_dim,
            input_space,
            source,
            x: Array1::zeros(config.sys_dim),
            phi: Array1::zeros(config.sys_dim),
            rng,
        };
        system.phi = system.draw_disturbance();
        Ok(system)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overwrite the real state.
    pub fn set_state(&mut self, x: Array1<f64>) -> CtrlResult<()> {
        if x.len() != self.sys_dim {
            return Err(CtrlError::dimension("state", self.sys_dim, x.len()));
        }
        self.x = x;
        Ok(())
    }

    /// Return the state to the origin.
    pub fn reset(&mut self) {
        self.x.fill(0.0);
    }

    fn draw_disturbance(&mut self) -> Array1<f64> {
        let mut phi = Array1::zeros(self.sys_dim);
        match &self.source {
            Source::Fixed(values) => phi.assign(values),
            Source::Normal(dist) => {
                for p in phi.iter_mut().take(self.disturbance_dim) {
                    *p = dist.sample(&mut self.rng);
                }
            }
            Source::Uniform { low, high } => {
                for p in phi.iter_mut().take(self.disturbance_dim) {
                    *p = if low < high {
                        self.rng.gen_range(*low..*high)
                    } else {
                        *low
                    };
                }
            }
            Source::Exponential(dist) => {
                for p in phi.iter_mut().take(self.disturbance_dim) {
                    *p = dist.sample(&mut self.rng);
                }
            }
        }
        phi
    }
}

impl DynamicsModel for LinearSystem {
    fn sys_dim(&self) -> usize {
        self.sys_dim
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn disturbance_dim(&self) -> usize {
        self.disturbance_dim
    }

    fn state(&self) -> &Array1<f64> {
        &self.x
    }

    fn disturbance(&self) -> &Array1<f64> {
        &self.phi
    }

    fn input_space(&self) -> &[InputSpace] {
        &self.input_space
    }

    fn step(&mut self, u: &Array1<f64>) -> CtrlResult<()> {
        if u.len() != self.sys_dim {
            return Err(CtrlError::dimension("control", self.sys_dim, u.len()));
        }
        self.phi = self.draw_disturbance();
        self.x = &self.x + u + &self.phi;
        trace!(system = %self.name, x = ?self.x, phi = ?self.phi, "plant step");
        Ok(())
    }
}
