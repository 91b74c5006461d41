// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Blend Weight Adaptation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Online update of the weight `psi` given to the learned prediction versus
//! the nominal forecast, driven by their accumulated one-step errors.

use ctrl_math::vector::{column_sum, norm_l2};
use ndarray::Array1;
use tracing::{trace, warn};

/// Added to ‖V‖₂ in the update denominator.
const UPDATE_EPS: f64 = 0.03;

/// One-step errors of both disturbance sources against the realised one,
/// in the active disturbance dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    /// `phi − prediction`.
    pub prediction: Array1<f64>,
    /// `phi − nominal`.
    pub nominal: Array1<f64>,
}

impl ErrorRecord {
    pub fn new(prediction: Array1<f64>, nominal: Array1<f64>) -> Self {
        ErrorRecord {
            prediction,
            nominal,
        }
    }
}

/// Ramp `0..counter` tiled cyclically over `dim` entries.
fn ramp(counter: usize, dim: usize) -> Array1<f64> {
    if counter == 0 {
        return Array1::zeros(dim);
    }
    (0..dim).map(|i| (i % counter) as f64).collect()
}

/// New blend weight after one adaptation.
///
/// ```text
/// eML = Σ prediction errors,  eNo = Σ nominal errors,  δ = eML − eNo
/// V   = ρ · T ⊙ (ψ·δ + eNo)
/// ψ'  = clip(ψ − 2·⟨δ, V⟩ / (‖V‖₂ + 0.03), 0, 1)
/// ```
///
/// An empty queue yields `psi` unchanged. A non-finite update is discarded.
pub fn blend_weight_update(
    psi: f64,
    rho: f64,
    counter: usize,
    queue: &[ErrorRecord],
    dim: usize,
) -> f64 {
    let e_ml = column_sum(queue.iter().map(|r| &r.prediction), dim);
    let e_no = column_sum(queue.iter().map(|r| &r.nominal), dim);
    let delta = &e_ml - &e_no;
    let v = ramp(counter, dim) * (&delta * psi + &e_no) * rho;

    let step = 2.0 * delta.dot(&v) / (norm_l2(&v) + UPDATE_EPS);
    let next = psi - step;
    if !next.is_finite() {
        warn!(psi, step, "non-finite blend weight update discarded");
        return psi;
    }
    let next = next.clamp(0.0, 1.0);
    trace!(psi, next, queued = queue.len(), "blend weight adapted");
    next
}
