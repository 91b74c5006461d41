// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtrlError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    #[error("Horizon mismatch in {context}: expected {expected}, got {got}")]
    HorizonMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid {kind} mode: '{value}'")]
    InvalidMode { kind: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CtrlError {
    pub fn dimension(context: impl Into<String>, expected: usize, got: usize) -> Self {
        CtrlError::DimensionMismatch {
            context: context.into(),
            expected,
            got,
        }
    }

    pub fn horizon(context: impl Into<String>, expected: usize, got: usize) -> Self {
        CtrlError::HorizonMismatch {
            context: context.into(),
            expected,
            got,
        }
    }
}

pub type CtrlResult<T> = Result<T, CtrlError>;
