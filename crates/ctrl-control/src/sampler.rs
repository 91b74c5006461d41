// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Candidate Sampler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Draws and projects candidate controls against the admissible input space.

use ctrl_types::input_space::{admissible_mask, InputSpace, Sampling};
use ndarray::Array1;
use rand::Rng;
use rand_distr::StandardNormal;

/// Normal sampling spans ±3σ of the admissible range.
const NORMAL_SIGMAS_PER_RANGE: f64 = 6.0;

#[derive(Debug, Clone)]
pub struct CandidateSampler {
    spaces: Vec<InputSpace>,
    mask: Array1<f64>,
}

impl CandidateSampler {
    /// `spaces` must already be padded to `sys_dim`.
    pub fn new(spaces: Vec<InputSpace>) -> Self {
        let mask = Array1::from_vec(admissible_mask(&spaces));
        CandidateSampler { spaces, mask }
    }

    pub fn dim(&self) -> usize {
        self.spaces.len()
    }

    pub fn spaces(&self) -> &[InputSpace] {
        &self.spaces
    }

    /// 1.0 on actuated dimensions, 0.0 elsewhere.
    pub fn mask(&self) -> &Array1<f64> {
        &self.mask
    }

    /// One candidate control.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Array1<f64> {
        self.spaces.iter().map(|s| sample_one(s, rng)).collect()
    }

    /// Project every dimension onto its admissible range or grid.
    pub fn clip(&self, u: &Array1<f64>) -> Array1<f64> {
        self.spaces
            .iter()
            .zip(u.iter())
            .map(|(s, &v)| s.clip(v))
            .collect()
    }

    /// Additive N(0,1) noise on actuated dimensions.
    pub fn perturb<R: Rng + ?Sized>(&self, u: &Array1<f64>, rng: &mut R) -> Array1<f64> {
        let noise: Array1<f64> = (0..u.len())
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect();
        u + &(noise * &self.mask)
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if min < max {
        rng.gen_range(min..max)
    } else {
        min
    }
}

fn sample_one<R: Rng + ?Sized>(space: &InputSpace, rng: &mut R) -> f64 {
    match *space {
        InputSpace::Continuous { min, max } => uniform(rng, min, max),
        InputSpace::Random {
            sampling: Sampling::Uniform,
            min,
            max,
        } => uniform(rng, min, max),
        InputSpace::Random {
            sampling: Sampling::Normal,
            min,
            max,
        } => {
            let mid = 0.5 * (min + max);
            let sigma = (max - min) / NORMAL_SIGMAS_PER_RANGE;
            let z: f64 = rng.sample(StandardNormal);
            (mid + sigma * z).clamp(min, max)
        }
        InputSpace::Discrete { .. } => {
            let k = rng.gen_range(0..space.grid_len());
            space.grid_point(k)
        }
        InputSpace::Unconstrained => 0.0,
    }
}
