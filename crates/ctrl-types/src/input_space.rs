// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Input Space
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Admissible control description, one entry per system dimension.
//!
//! Sampling lives in `ctrl-control::sampler`; this module only carries the
//! data, its validation and the projection back onto the admissible set.

use crate::error::{CtrlError, CtrlResult};
use serde::{Deserialize, Serialize};

/// Distribution used by [`InputSpace::Random`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    #[default]
    Uniform,
    Normal,
}

impl std::str::FromStr for Sampling {
    type Err = CtrlError;

    fn from_str(s: &str) -> CtrlResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Sampling::Uniform),
            "normal" => Ok(Sampling::Normal),
            _ => Err(CtrlError::InvalidMode {
                kind: "sampling",
                value: s.to_string(),
            }),
        }
    }
}

/// Legal control values for a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSpace {
    Continuous {
        min: f64,
        max: f64,
    },
    Discrete {
        min: f64,
        max: f64,
        step: f64,
    },
    Random {
        #[serde(default)]
        sampling: Sampling,
        min: f64,
        max: f64,
    },
    Unconstrained,
}

impl InputSpace {
    pub fn continuous(min: f64, max: f64) -> CtrlResult<Self> {
        let space = InputSpace::Continuous { min, max };
        space.validate()?;
        Ok(space)
    }

    pub fn discrete(min: f64, max: f64, step: f64) -> CtrlResult<Self> {
        let space = InputSpace::Discrete { min, max, step };
        space.validate()?;
        Ok(space)
    }

    pub fn random(sampling: Sampling, min: f64, max: f64) -> CtrlResult<Self> {
        let space = InputSpace::Random { sampling, min, max };
        space.validate()?;
        Ok(space)
    }

    pub fn validate(&self) -> CtrlResult<()> {
        let (min, max) = match *self {
            InputSpace::Unconstrained => return Ok(()),
            InputSpace::Continuous { min, max } | InputSpace::Random { min, max, .. } => {
                (min, max)
            }
            InputSpace::Discrete { min, max, step } => {
                if !step.is_finite() || step <= 0.0 {
                    return Err(CtrlError::ConfigError(format!(
                        "discrete input step must be finite and > 0, got {step}"
                    )));
                }
                (min, max)
            }
        };
        if !min.is_finite() || !max.is_finite() {
            return Err(CtrlError::ConfigError(format!(
                "input bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(CtrlError::ConfigError(format!(
                "input min must not exceed max, got [{min}, {max}]"
            )));
        }
        Ok(())
    }

    /// True for every variant except `Unconstrained`.
    pub fn is_admissible(&self) -> bool {
        !matches!(self, InputSpace::Unconstrained)
    }

    /// `(min, max)` of the admissible range, `None` when unconstrained.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            InputSpace::Continuous { min, max }
            | InputSpace::Discrete { min, max, .. }
            | InputSpace::Random { min, max, .. } => Some((min, max)),
            InputSpace::Unconstrained => None,
        }
    }

    /// Number of points on a discrete grid `min, min+step, … < max`.
    /// An empty half-open range still admits `min`.
    pub fn grid_len(&self) -> usize {
        match *self {
            InputSpace::Discrete { min, max, step } => {
                let n = ((max - min) / step).ceil();
                if n.is_finite() && n >= 1.0 {
                    n as usize
                } else {
                    1
                }
            }
            _ => 0,
        }
    }

    /// Value of grid point `k` for a discrete space.
    pub fn grid_point(&self, k: usize) -> f64 {
        match *self {
            InputSpace::Discrete { min, step, .. } => min + k as f64 * step,
            _ => 0.0,
        }
    }

    /// Project a value back onto the admissible set. Discrete spaces snap to
    /// the nearest grid point; unconstrained dimensions are pinned to 0.
    pub fn clip(&self, value: f64) -> f64 {
        match *self {
            InputSpace::Continuous { min, max } | InputSpace::Random { min, max, .. } => {
                value.clamp(min, max)
            }
            InputSpace::Discrete { min, max, step } => {
                let clamped = value.clamp(min, max);
                let last = self.grid_len().saturating_sub(1) as f64;
                let k = ((clamped - min) / step).round().clamp(0.0, last);
                min + k * step
            }
            InputSpace::Unconstrained => 0.0,
        }
    }
}

/// Pad an input-space description with `Unconstrained` up to `sys_dim`.
pub fn pad_input_space(spaces: &[InputSpace], sys_dim: usize) -> CtrlResult<Vec<InputSpace>> {
    if spaces.len() > sys_dim {
        return Err(CtrlError::dimension(
            "input space (specified dimensions <= sys_dim)",
            sys_dim,
            spaces.len(),
        ));
    }
    for space in spaces {
        space.validate()?;
    }
    let mut padded = spaces.to_vec();
    padded.resize(sys_dim, InputSpace::Unconstrained);
    Ok(padded)
}

/// 1.0 for admissible dimensions, 0.0 for unconstrained ones.
pub fn admissible_mask(spaces: &[InputSpace]) -> Vec<f64> {
    spaces
        .iter()
        .map(|s| if s.is_admissible() { 1.0 } else { 0.0 })
        .collect()
}
