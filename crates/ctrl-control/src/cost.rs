// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Cost Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Tracking cost of the post-control state `x + u`, restricted to the
//! actuated dimensions by a 0/1 mask.

use ctrl_math::vector::{norm_l1, norm_l2};
use ctrl_types::config::CostMode;
use ndarray::Array1;

/// Keeps the linear-cost gradient finite at `x + u = 0`.
const LINEAR_GRAD_EPS: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct CostFunction {
    mode: CostMode,
    mask: Array1<f64>,
}

impl CostFunction {
    pub fn new(mode: CostMode, mask: Array1<f64>) -> Self {
        CostFunction { mode, mask }
    }

    pub fn mode(&self) -> CostMode {
        self.mode
    }

    pub fn mask(&self) -> &Array1<f64> {
        &self.mask
    }

    /// quadratic: ‖(x+u)⊙m‖₂, linear: ‖|x+u|⊙m‖₁.
    pub fn evaluate(&self, x: &Array1<f64>, u: &Array1<f64>) -> f64 {
        let z = (x + u) * &self.mask;
        match self.mode {
            CostMode::Quadratic => norm_l2(&z),
            CostMode::Linear => norm_l1(&z),
        }
    }

    /// Search direction used by gradient descent.
    ///
    /// quadratic: `(2x + u)⊙m`; linear: `cost·(x+u)/(‖x+u‖₁+ε)⊙m`.
    pub fn gradient(&self, x: &Array1<f64>, u: &Array1<f64>, cost: f64) -> Array1<f64> {
        match self.mode {
            CostMode::Quadratic => (x * 2.0 + u) * &self.mask,
            CostMode::Linear => {
                let z = x + u;
                let scale = cost / (norm_l1(&z) + LINEAR_GRAD_EPS);
                z * scale * &self.mask
            }
        }
    }
}
