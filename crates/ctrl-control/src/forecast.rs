// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Nominal Disturbance Forecast
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Model-based disturbance forecasts over the control horizon.
//!
//! Three models: constant zero (`Baseline`), self-feeding rolling mean over
//! a FIFO window (`MeanBaseline`), and an exponential moving average (`Ema`).
//! Accumulators go in by value and come back advanced in [`Forecast`].

use ctrl_math::vector::column_mean;
use ctrl_types::config::NominalMode;
use ctrl_types::error::{CtrlError, CtrlResult};
use ndarray::Array1;
use std::collections::VecDeque;

/// FIFO of disturbance vectors, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    dim: usize,
    entries: VecDeque<Array1<f64>>,
}

impl Window {
    /// `size` copies of `[value; dim]`.
    pub fn constant(value: f64, size: usize, dim: usize) -> CtrlResult<Self> {
        if size == 0 {
            return Err(CtrlError::ConfigError(
                "window_size must be >= 1".to_string(),
            ));
        }
        Ok(Window {
            dim,
            entries: (0..size).map(|_| Array1::from_elem(dim, value)).collect(),
        })
    }

    pub fn from_entries(entries: Vec<Array1<f64>>, dim: usize) -> CtrlResult<Self> {
        if entries.is_empty() {
            return Err(CtrlError::ConfigError("window cannot be empty".to_string()));
        }
        for e in &entries {
            if e.len() != dim {
                return Err(CtrlError::dimension("window entry", dim, e.len()));
            }
        }
        Ok(Window {
            dim,
            entries: entries.into(),
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Array1<f64>> {
        self.entries.iter()
    }

    /// Per-dimension mean of the current entries.
    pub fn mean(&self) -> Array1<f64> {
        column_mean(self.entries.iter(), self.dim)
    }

    /// Drop the oldest entry and append `v`.
    pub fn slide(&mut self, v: Array1<f64>) -> CtrlResult<()> {
        if v.len() != self.dim {
            return Err(CtrlError::dimension("window entry", self.dim, v.len()));
        }
        self.entries.pop_front();
        self.entries.push_back(v);
        Ok(())
    }
}

/// Output of one forecast call.
#[derive(Debug, Clone)]
pub struct Forecast {
    /// One vector per horizon step.
    pub nominals: Vec<Array1<f64>>,
    /// Window after the forecast; advanced only by `MeanBaseline`.
    pub window: Window,
    /// EMA value after the last horizon step (`prev_ema` for non-EMA modes).
    pub last_ema: Array1<f64>,
}

/// `horizon` zero vectors.
pub fn baseline(horizon: usize, dim: usize) -> Vec<Array1<f64>> {
    (0..horizon).map(|_| Array1::zeros(dim)).collect()
}

/// Rolling-mean forecast. Each step's mean is fed back into the window so
/// later horizon steps see the updated means.
pub fn mean_baseline(
    horizon: usize,
    dim: usize,
    mut window: Window,
) -> CtrlResult<(Vec<Array1<f64>>, Window)> {
    if window.is_empty() {
        return Err(CtrlError::ConfigError("window cannot be empty".to_string()));
    }
    if window.dim() != dim {
        return Err(CtrlError::dimension("window", dim, window.dim()));
    }
    let mut means = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        let m = window.mean();
        window.slide(m.clone())?;
        means.push(m);
    }
    Ok((means, window))
}

/// `next = α·prev_ema + (1−α)·prev_real`, iterated over the horizon with
/// `prev_real` held fixed.
pub fn ema(
    horizon: usize,
    dim: usize,
    prev_ema: &Array1<f64>,
    prev_real: &Array1<f64>,
    alpha: f64,
) -> CtrlResult<(Vec<Array1<f64>>, Array1<f64>)> {
    check_alpha(alpha)?;
    if prev_ema.len() != dim {
        return Err(CtrlError::dimension("prev_ema", dim, prev_ema.len()));
    }
    if prev_real.len() != dim {
        return Err(CtrlError::dimension("prev_real", dim, prev_real.len()));
    }
    let mut avgs = Vec::with_capacity(horizon);
    let mut current = prev_ema.clone();
    for _ in 0..horizon {
        current = &current * alpha + prev_real * (1.0 - alpha);
        avgs.push(current.clone());
    }
    Ok((avgs, current))
}

fn check_alpha(alpha: f64) -> CtrlResult<()> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(CtrlError::ConfigError(format!(
            "ema alpha must be in [0, 1], got {alpha}"
        )));
    }
    Ok(())
}

/// Dispatch to the forecast model selected by `mode`.
pub fn forecast(
    mode: NominalMode,
    horizon: usize,
    dim: usize,
    window: Window,
    prev_ema: &Array1<f64>,
    prev_real: &Array1<f64>,
    alpha: f64,
) -> CtrlResult<Forecast> {
    if prev_ema.len() != dim {
        return Err(CtrlError::dimension("prev_ema", dim, prev_ema.len()));
    }
    if prev_real.len() != dim {
        return Err(CtrlError::dimension("prev_real", dim, prev_real.len()));
    }
    match mode {
        NominalMode::Baseline => Ok(Forecast {
            nominals: baseline(horizon, dim),
            window,
            last_ema: prev_ema.clone(),
        }),
        NominalMode::MeanBaseline => {
            let (nominals, window) = mean_baseline(horizon, dim, window)?;
            Ok(Forecast {
                nominals,
                window,
                last_ema: prev_ema.clone(),
            })
        }
        NominalMode::Ema => {
            let (nominals, last_ema) = ema(horizon, dim, prev_ema, prev_real, alpha)?;
            Ok(Forecast {
                nominals,
                window,
                last_ema,
            })
        }
    }
}
