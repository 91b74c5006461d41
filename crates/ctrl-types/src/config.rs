// ─────────────────────────────────────────────────────────────────────
// SCPN Control — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{CtrlError, CtrlResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Scalar cost minimised at every horizon step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum CostMode {
    #[default]
    Quadratic,
    Linear,
}

/// Search strategy of the horizon optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum OptimizerMode {
    Random,
    #[default]
    Gradient,
    Genetic,
}

/// Model used for the nominal disturbance forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum NominalMode {
    #[default]
    Baseline,
    MeanBaseline,
    Ema,
}

impl FromStr for CostMode {
    type Err = CtrlError;

    fn from_str(s: &str) -> CtrlResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quadratic" => Ok(CostMode::Quadratic),
            "linear" => Ok(CostMode::Linear),
            _ => Err(CtrlError::InvalidMode {
                kind: "cost",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for OptimizerMode {
    type Err = CtrlError;

    fn from_str(s: &str) -> CtrlResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(OptimizerMode::Random),
            "gradient" => Ok(OptimizerMode::Gradient),
            "genetic" => Ok(OptimizerMode::Genetic),
            _ => Err(CtrlError::InvalidMode {
                kind: "optimizer",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for NominalMode {
    type Err = CtrlError;

    fn from_str(s: &str) -> CtrlResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(NominalMode::Baseline),
            "mean_baseline" => Ok(NominalMode::MeanBaseline),
            "ema" => Ok(NominalMode::Ema),
            _ => Err(CtrlError::InvalidMode {
                kind: "nominal disturbance",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CostMode {
    type Error = CtrlError;

    fn try_from(s: String) -> CtrlResult<Self> {
        s.parse()
    }
}

impl TryFrom<String> for OptimizerMode {
    type Error = CtrlError;

    fn try_from(s: String) -> CtrlResult<Self> {
        s.parse()
    }
}

impl TryFrom<String> for NominalMode {
    type Error = CtrlError;

    fn try_from(s: String) -> CtrlResult<Self> {
        s.parse()
    }
}

/// Parse a selector string found at `section.key`, if present.
fn check_selector<T: FromStr<Err = CtrlError>>(
    raw: &serde_json::Value,
    section: &str,
    key: &str,
) -> CtrlResult<()> {
    if let Some(value) = raw
        .get(section)
        .and_then(|v| v.get(key))
        .and_then(serde_json::Value::as_str)
    {
        value.parse::<T>()?;
    }
    Ok(())
}

/// Horizon optimizer hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub horizon: usize,
    #[serde(default)]
    pub cost: CostMode,
    #[serde(default)]
    pub optimizer: OptimizerMode,
    /// Gradient step size.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_cross_over_rate")]
    pub cross_over_rate: f64,
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Fraction of each generation kept as parents.
    #[serde(default = "default_cut_off_rate")]
    pub cut_off_rate: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Consecutive sub-threshold improvements before a search stalls out.
    /// 0 disables stall detection.
    #[serde(default = "default_tolerance_step")]
    pub tolerance_step: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Early-exit cost.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_alpha() -> f64 {
    0.01
}
fn default_population_size() -> usize {
    100
}
fn default_cross_over_rate() -> f64 {
    0.7
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_cut_off_rate() -> f64 {
    0.5
}
fn default_max_iterations() -> usize {
    1000
}
fn default_tolerance_step() -> usize {
    50
}
fn default_threshold() -> f64 {
    0.005
}
fn default_tolerance() -> f64 {
    1e-3
}

fn check_unit(name: &str, value: f64) -> CtrlResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CtrlError::ConfigError(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

impl OptimizerConfig {
    pub fn new(horizon: usize) -> Self {
        OptimizerConfig {
            horizon,
            cost: CostMode::default(),
            optimizer: OptimizerMode::default(),
            alpha: default_alpha(),
            population_size: default_population_size(),
            cross_over_rate: default_cross_over_rate(),
            mutation_rate: default_mutation_rate(),
            cut_off_rate: default_cut_off_rate(),
            max_iterations: default_max_iterations(),
            tolerance_step: default_tolerance_step(),
            threshold: default_threshold(),
            tolerance: default_tolerance(),
            seed: None,
        }
    }

    pub fn validate(&self) -> CtrlResult<()> {
        if self.horizon == 0 {
            return Err(CtrlError::ConfigError("horizon must be >= 1".to_string()));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(CtrlError::ConfigError(format!(
                "alpha must be finite and > 0, got {}",
                self.alpha
            )));
        }
        if self.population_size == 0 {
            return Err(CtrlError::ConfigError(
                "population_size must be >= 1".to_string(),
            ));
        }
        check_unit("cross_over_rate", self.cross_over_rate)?;
        check_unit("mutation_rate", self.mutation_rate)?;
        check_unit("cut_off_rate", self.cut_off_rate)?;
        if self.max_iterations == 0 {
            return Err(CtrlError::ConfigError(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        if self.tolerance_step > self.max_iterations {
            return Err(CtrlError::ConfigError(format!(
                "tolerance_step must be within [0, max_iterations={}], got {}",
                self.max_iterations, self.tolerance_step
            )));
        }
        check_unit("threshold", self.threshold)?;
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(CtrlError::ConfigError(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Blend controller hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub nominal: NominalMode,
    /// Cycles between two weight adaptations.
    #[serde(default = "default_warmup_steps")]
    pub warmup_steps: usize,
    #[serde(default = "default_rho")]
    pub rho: f64,
    /// Accepted and range-checked; the adaptation rule does not consume it.
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_warmup_steps() -> usize {
    3
}
fn default_rho() -> f64 {
    0.93
}
fn default_beta() -> f64 {
    1e-3
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            nominal: NominalMode::default(),
            warmup_steps: default_warmup_steps(),
            rho: default_rho(),
            beta: default_beta(),
            seed: None,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> CtrlResult<()> {
        if self.warmup_steps == 0 {
            return Err(CtrlError::ConfigError(
                "warmup_steps must be >= 1".to_string(),
            ));
        }
        if !self.rho.is_finite() {
            return Err(CtrlError::ConfigError(format!(
                "rho must be finite, got {}",
                self.rho
            )));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(CtrlError::ConfigError(format!(
                "beta must be in (0, 1), got {}",
                self.beta
            )));
        }
        Ok(())
    }
}

/// How the mean-baseline window is materialised on the first cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowInit {
    /// `size` copies of a constant vector.
    Auto { init: f64, size: usize },
    /// Caller-supplied entries, oldest first.
    Manual { entries: Vec<Vec<f64>> },
}

impl Default for WindowInit {
    fn default() -> Self {
        WindowInit::Auto {
            init: 0.0,
            size: 3,
        }
    }
}

impl WindowInit {
    pub fn validate(&self) -> CtrlResult<()> {
        match self {
            WindowInit::Auto { init, size } => {
                if *size == 0 {
                    return Err(CtrlError::ConfigError(
                        "window_size must be >= 1".to_string(),
                    ));
                }
                if !init.is_finite() {
                    return Err(CtrlError::ConfigError(format!(
                        "window init must be finite, got {init}"
                    )));
                }
            }
            WindowInit::Manual { entries } => {
                if entries.is_empty() {
                    return Err(CtrlError::ConfigError(
                        "manual window cannot be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Per-call options of the blend controller's `tune`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneOptions {
    #[serde(default)]
    pub window: WindowInit,
    #[serde(default = "default_alpha_ema")]
    pub alpha_ema: f64,
}

fn default_alpha_ema() -> f64 {
    0.01
}

impl Default for TuneOptions {
    fn default() -> Self {
        TuneOptions {
            window: WindowInit::default(),
            alpha_ema: default_alpha_ema(),
        }
    }
}

impl TuneOptions {
    pub fn validate(&self) -> CtrlResult<()> {
        self.window.validate()?;
        check_unit("alpha_ema", self.alpha_ema)
    }
}

/// Top-level control session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub tune: TuneOptions,
}

impl ControlConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> CtrlResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Unknown mode selectors surface as `InvalidMode`, not as a parse error.
    pub fn from_json(contents: &str) -> CtrlResult<Self> {
        let raw: serde_json::Value = serde_json::from_str(contents)?;
        check_selector::<CostMode>(&raw, "optimizer", "cost")?;
        check_selector::<OptimizerMode>(&raw, "optimizer", "optimizer")?;
        check_selector::<NominalMode>(&raw, "controller", "nominal")?;
        let config: Self = serde_json::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CtrlResult<()> {
        self.optimizer.validate()?;
        self.controller.validate()?;
        self.tune.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = OptimizerConfig::new(5);
        assert!(cfg.validate().is_ok());
        assert!(ControllerConfig::default().validate().is_ok());
        assert!(TuneOptions::default().validate().is_ok());
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let cfg = OptimizerConfig::new(0);
        assert!(matches!(cfg.validate(), Err(CtrlError::ConfigError(_))));
    }

    #[test]
    fn test_rates_out_of_range_rejected() {
        let mut cfg = OptimizerConfig::new(3);
        cfg.cut_off_rate = 1.5;
        assert!(cfg.validate().is_err());
        let mut cfg = OptimizerConfig::new(3);
        cfg.tolerance_step = cfg.max_iterations + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("genetic".parse::<OptimizerMode>().unwrap(), OptimizerMode::Genetic);
        assert_eq!("LINEAR".parse::<CostMode>().unwrap(), CostMode::Linear);
        assert_eq!(
            "mean_baseline".parse::<NominalMode>().unwrap(),
            NominalMode::MeanBaseline
        );
        let err = "setbased".parse::<NominalMode>().unwrap_err();
        assert!(matches!(err, CtrlError::InvalidMode { .. }));
    }

    #[test]
    fn test_json_defaults_filled() {
        let json = r#"{
            "optimizer": { "horizon": 5, "optimizer": "genetic", "cost": "linear" },
            "controller": { "nominal": "ema" }
        }"#;
        let cfg = ControlConfig::from_json(json).unwrap();
        assert_eq!(cfg.optimizer.optimizer, OptimizerMode::Genetic);
        assert_eq!(cfg.optimizer.population_size, 100);
        assert_eq!(cfg.controller.nominal, NominalMode::Ema);
        assert_eq!(cfg.controller.warmup_steps, 3);
        assert_eq!(cfg.tune.window, WindowInit::Auto { init: 0.0, size: 3 });
    }

    #[test]
    fn test_json_unknown_mode_rejected() {
        let json = r#"{ "optimizer": { "horizon": 5, "optimizer": "annealing" } }"#;
        assert!(matches!(
            ControlConfig::from_json(json),
            Err(CtrlError::InvalidMode { kind: "optimizer", .. })
        ));
        let json = r#"{ "optimizer": { "horizon": 5 }, "controller": { "nominal": "kalman" } }"#;
        assert!(matches!(
            ControlConfig::from_json(json),
            Err(CtrlError::InvalidMode { kind: "nominal disturbance", .. })
        ));
    }

    #[test]
    fn test_mode_deserializes_through_from_str() {
        let mode: CostMode = serde_json::from_str("\"Linear\"").unwrap();
        assert_eq!(mode, CostMode::Linear);
        assert!(serde_json::from_str::<OptimizerMode>("\"annealing\"").is_err());
        let out = serde_json::to_string(&NominalMode::MeanBaseline).unwrap();
        assert_eq!(out, "\"mean_baseline\"");
    }

    #[test]
    fn test_json_invalid_value_rejected() {
        let json = r#"{ "optimizer": { "horizon": 5 }, "controller": { "beta": 2.0 } }"#;
        assert!(matches!(
            ControlConfig::from_json(json),
            Err(CtrlError::ConfigError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ControlConfig::from_file("/nonexistent/control.json"),
            Err(CtrlError::Io(_))
        ));
    }
}
