// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Control
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Horizon optimizer, disturbance forecasts and the blend controller.

pub mod adaptation;
pub mod constraints;
pub mod cost;
pub mod forecast;
pub mod lac;
pub mod mpc;
pub mod sampler;

pub use constraints::{Constraint, ConstraintSet};
pub use lac::BlendController;
pub use mpc::{HorizonOptimizer, SearchOutcome};
