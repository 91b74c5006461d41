// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Dynamics Model
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Contract between the control core and a discrete-time plant
//! `x_{t+1} = f(x_t, u_t, φ_t)` with additive disturbance.

use ctrl_types::error::CtrlResult;
use ctrl_types::input_space::InputSpace;
use ndarray::Array1;

pub trait DynamicsModel {
    /// Length of the state and control vectors.
    fn sys_dim(&self) -> usize;

    /// Number of actuated dimensions.
    fn input_dim(&self) -> usize;

    /// Number of active disturbance dimensions (≤ `sys_dim`).
    fn disturbance_dim(&self) -> usize;

    fn state(&self) -> &Array1<f64>;

    /// Last realised disturbance, zero-padded to `sys_dim`.
    fn disturbance(&self) -> &Array1<f64>;

    /// Admissible control per dimension, padded with `Unconstrained` to `sys_dim`.
    fn input_space(&self) -> &[InputSpace];

    /// Advance the real plant by one step under control `u`.
    fn step(&mut self, u: &Array1<f64>) -> CtrlResult<()>;

    /// Planning projection; must not touch the real state.
    fn lookahead(&self, x: &Array1<f64>, u: &Array1<f64>, phi: &Array1<f64>) -> Array1<f64> {
        x + u + phi
    }
}

impl<M: DynamicsModel + ?Sized> DynamicsModel for Box<M> {
    fn sys_dim(&self) -> usize {
        (**self).sys_dim()
    }
    fn input_dim(&self) -> usize {
        (**self).input_dim()
    }
    fn disturbance_dim(&self) -> usize {
        (**self).disturbance_dim()
    }
    fn state(&self) -> &Array1<f64> {
        (**self).state()
    }
    fn disturbance(&self) -> &Array1<f64> {
        (**self).disturbance()
    }
    fn input_space(&self) -> &[InputSpace] {
        (**self).input_space()
    }
    fn step(&mut self, u: &Array1<f64>) -> CtrlResult<()> {
        (**self).step(u)
    }
    fn lookahead(&self, x: &Array1<f64>, u: &Array1<f64>, phi: &Array1<f64>) -> Array1<f64> {
        (**self).lookahead(x, u, phi)
    }
}
