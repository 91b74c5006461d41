// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Control Constraints
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! User-supplied corrections applied to candidate controls.
//!
//! Each constraint maps `u`, `x` or both to a correction of `u`'s shape; the
//! set subtracts every correction from `u` in registration order.

use ctrl_types::error::{CtrlError, CtrlResult};
use ndarray::Array1;

type UnaryFn = Box<dyn Fn(&Array1<f64>) -> Array1<f64>>;
type BinaryFn = Box<dyn Fn(&Array1<f64>, &Array1<f64>) -> Array1<f64>>;

/// A correction function and the arguments it reads.
pub enum Constraint {
    /// Reads the candidate control.
    Control(UnaryFn),
    /// Reads the lookahead state.
    State(UnaryFn),
    /// Reads `(u, x)`.
    Both(BinaryFn),
}

impl Constraint {
    pub fn on_control<F>(f: F) -> Self
    where
        F: Fn(&Array1<f64>) -> Array1<f64> + 'static,
    {
        Constraint::Control(Box::new(f))
    }

    pub fn on_state<F>(f: F) -> Self
    where
        F: Fn(&Array1<f64>) -> Array1<f64> + 'static,
    {
        Constraint::State(Box::new(f))
    }

    pub fn on_both<F>(f: F) -> Self
    where
        F: Fn(&Array1<f64>, &Array1<f64>) -> Array1<f64> + 'static,
    {
        Constraint::Both(Box::new(f))
    }

    /// Absolute actuator limit: the correction is the overshoot
    /// `u − clamp(u, min, max)`, so subtracting it lands `u` inside the box.
    pub fn box_limit(min: f64, max: f64) -> Self {
        Constraint::on_control(move |u: &Array1<f64>| u.mapv(|v| v - v.clamp(min, max)))
    }

    /// Caps the post-control state `x + u` at `limit` in absolute value.
    pub fn state_envelope(limit: f64) -> Self {
        Constraint::on_both(move |u: &Array1<f64>, x: &Array1<f64>| {
            let next = x + u;
            next.mapv(|v| v - v.clamp(-limit, limit))
        })
    }

    fn evaluate(&self, u: &Array1<f64>, x: &Array1<f64>) -> Array1<f64> {
        match self {
            Constraint::Control(f) => f(u),
            Constraint::State(f) => f(x),
            Constraint::Both(f) => f(u, x),
        }
    }
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Constraint::Control(_) => "Control",
            Constraint::State(_) => "State",
            Constraint::Both(_) => "Both",
        };
        f.write_str(kind)
    }
}

/// Ordered, named constraints.
#[derive(Debug, Default)]
pub struct ConstraintSet {
    entries: Vec<(String, Constraint)>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, constraint: Constraint) {
        self.entries.push((name.into(), constraint));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `u ← u − c_k(u, x)` for every constraint, in order.
    pub fn apply(&self, mut u: Array1<f64>, x: &Array1<f64>) -> CtrlResult<Array1<f64>> {
        for (name, constraint) in &self.entries {
            let correction = constraint.evaluate(&u, x);
            if correction.len() != u.len() {
                return Err(CtrlError::dimension(
                    format!("constraint '{name}' correction"),
                    u.len(),
                    correction.len(),
                ));
            }
            u -= &correction;
        }
        Ok(u)
    }
}
