// ─────────────────────────────────────────────────────────────────────
// SCPN Control — MPC
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Receding-horizon optimizer over a disturbed integrator.
//!
//! For every horizon step the lookahead state is projected by the predicted
//! disturbance, a derivative-free or gradient search picks the control that
//! minimises the tracking cost, and the lookahead state is advanced through
//! the plant's `lookahead`. Only the plant's real `step` ever moves the real
//! state, and that is the controller's job.

use crate::constraints::{Constraint, ConstraintSet};
use crate::cost::CostFunction;
use crate::sampler::CandidateSampler;
use ctrl_dynamics::DynamicsModel;
use ctrl_types::config::{OptimizerConfig, OptimizerMode};
use ctrl_types::error::{CtrlError, CtrlResult};
use ctrl_types::input_space::InputSpace;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

/// Stall detection is disabled when the patience exceeds this share of
/// `max_iterations`.
const STALL_PATIENCE_CAP: f64 = 0.90;

/// Result of one per-step search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub cost: f64,
    pub control: Array1<f64>,
    /// Iterations (generations for the genetic strategy) actually run.
    pub iterations: usize,
    /// Best-so-far cost after every iteration.
    pub trace: Vec<f64>,
}

/// Counts consecutive iterations whose improvement stays below `threshold`.
#[derive(Debug, Clone)]
struct StallDetector {
    enabled: bool,
    threshold: f64,
    patience: usize,
    bucket: usize,
    prev: f64,
}

impl StallDetector {
    fn new(config: &OptimizerConfig) -> Self {
        let enabled = config.tolerance_step != 0
            && config.tolerance_step as f64 <= STALL_PATIENCE_CAP * config.max_iterations as f64;
        StallDetector {
            enabled,
            threshold: config.threshold,
            patience: config.tolerance_step,
            bucket: 0,
            prev: f64::INFINITY,
        }
    }

    fn observe(&mut self, cost: f64) -> bool {
        if !self.enabled {
            return false;
        }
        let improvement = self.prev - cost;
        self.prev = cost;
        if improvement < self.threshold {
            self.bucket += 1;
            self.bucket >= self.patience
        } else {
            self.bucket = 0;
            false
        }
    }
}

/// Per-step optimizer over a fixed horizon.
pub struct HorizonOptimizer {
    config: OptimizerConfig,
    sampler: CandidateSampler,
    cost: CostFunction,
    constraints: ConstraintSet,
    rng: StdRng,
}

impl HorizonOptimizer {
    /// `input_space` is the plant's per-dimension description, already padded
    /// to `sys_dim`.
    pub fn new(config: OptimizerConfig, input_space: &[InputSpace]) -> CtrlResult<Self> {
        config.validate()?;
        if input_space.is_empty() {
            return Err(CtrlError::ConfigError(
                "input space must cover at least one dimension".to_string(),
            ));
        }
        for space in input_space {
            space.validate()?;
        }
        let sampler = CandidateSampler::new(input_space.to_vec());
        let cost = CostFunction::new(config.cost, sampler.mask().clone());
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(HorizonOptimizer {
            config,
            sampler,
            cost,
            constraints: ConstraintSet::new(),
            rng,
        })
    }

    pub fn for_model<M: DynamicsModel + ?Sized>(
        config: OptimizerConfig,
        model: &M,
    ) -> CtrlResult<Self> {
        Self::new(config, model.input_space())
    }

    /// Register a named constraint; applied after the ones already present.
    pub fn with_constraint(mut self, name: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.push(name, constraint);
        self
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, constraint: Constraint) {
        self.constraints.push(name, constraint);
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn horizon(&self) -> usize {
        self.config.horizon
    }

    pub fn sys_dim(&self) -> usize {
        self.sampler.dim()
    }

    pub fn mask(&self) -> &Array1<f64> {
        self.sampler.mask()
    }

    pub fn cost_function(&self) -> &CostFunction {
        &self.cost
    }

    /// Plan over the horizon. Returns per-step costs and controls.
    pub fn optimize<M: DynamicsModel + ?Sized>(
        &mut self,
        model: &M,
        predictions: &[Array1<f64>],
    ) -> CtrlResult<(Vec<f64>, Vec<Array1<f64>>)> {
        let outcomes = self.optimize_detailed(model, predictions)?;
        Ok(outcomes.into_iter().map(|o| (o.cost, o.control)).unzip())
    }

    /// Like [`optimize`](Self::optimize) but keeps iteration counts and traces.
    pub fn optimize_detailed<M: DynamicsModel + ?Sized>(
        &mut self,
        model: &M,
        predictions: &[Array1<f64>],
    ) -> CtrlResult<Vec<SearchOutcome>> {
        let horizon = self.config.horizon;
        if predictions.len() != horizon {
            return Err(CtrlError::horizon("predictions", horizon, predictions.len()));
        }
        let sys_dim = self.sampler.dim();
        if model.sys_dim() != sys_dim {
            return Err(CtrlError::dimension("model sys_dim", sys_dim, model.sys_dim()));
        }
        for p in predictions {
            if p.len() != sys_dim {
                return Err(CtrlError::dimension("prediction", sys_dim, p.len()));
            }
        }

        let mut x = model.state().clone();
        let mut outcomes = Vec::with_capacity(horizon);
        for (h, pred) in predictions.iter().enumerate() {
            let x_h = &x + pred;
            let outcome = self.search(&x_h)?;
            trace!(
                step = h,
                cost = outcome.cost,
                iterations = outcome.iterations,
                "horizon step solved"
            );
            x = model.lookahead(&x_h, &outcome.control, pred);
            outcomes.push(outcome);
        }
        debug!(
            horizon,
            mode = ?self.config.optimizer,
            first_cost = outcomes.first().map(|o| o.cost),
            "horizon optimized"
        );
        Ok(outcomes)
    }

    /// Minimise `cost(x, u)` over admissible `u` with the configured strategy.
    pub fn search(&mut self, x: &Array1<f64>) -> CtrlResult<SearchOutcome> {
        if x.len() != self.sampler.dim() {
            return Err(CtrlError::dimension("state", self.sampler.dim(), x.len()));
        }
        match self.config.optimizer {
            OptimizerMode::Random => self.random_search(x),
            OptimizerMode::Gradient => self.gradient_descent(x),
            OptimizerMode::Genetic => self.genetic_algorithm(x),
        }
    }

    fn constrain(&self, u: Array1<f64>, x: &Array1<f64>) -> CtrlResult<Array1<f64>> {
        if self.constraints.is_empty() {
            Ok(u)
        } else {
            self.constraints.apply(u, x)
        }
    }

    fn constrain_masked(&self, u: Array1<f64>, x: &Array1<f64>) -> CtrlResult<Array1<f64>> {
        if self.constraints.is_empty() {
            Ok(u)
        } else {
            Ok(self.constraints.apply(u, x)? * self.sampler.mask())
        }
    }

    fn random_search(&mut self, x: &Array1<f64>) -> CtrlResult<SearchOutcome> {
        let mut stall = StallDetector::new(&self.config);
        let mut best_cost = f64::INFINITY;
        let first = self.sampler.sample(&mut self.rng);
        let mut u = self.constrain(first, x)?;
        let mut best_u = u.clone();
        let mut trace = Vec::new();

        for it in 0..self.config.max_iterations {
            let cost = self.cost.evaluate(x, &u);
            if cost < self.config.tolerance {
                trace.push(cost);
                return Ok(SearchOutcome {
                    cost,
                    control: u,
                    iterations: it + 1,
                    trace,
                });
            }
            if cost < best_cost {
                best_cost = cost;
                best_u = u.clone();
            }
            trace.push(best_cost);
            let candidate = self.sampler.sample(&mut self.rng);
            u = self.constrain(candidate, x)?;
            if stall.observe(cost) {
                break;
            }
        }

        Ok(SearchOutcome {
            cost: best_cost,
            control: best_u,
            iterations: trace.len(),
            trace,
        })
    }

    fn gradient_descent(&mut self, x: &Array1<f64>) -> CtrlResult<SearchOutcome> {
        let alpha = self.config.alpha;
        let mut best_cost = f64::INFINITY;
        let first = self.sampler.sample(&mut self.rng);
        let mut u = self.constrain(first, x)?;
        let mut best_u = u.clone();
        let mut trace = Vec::new();

        for it in 0..self.config.max_iterations {
            let cost = self.cost.evaluate(x, &u);
            if cost < self.config.tolerance {
                trace.push(cost);
                return Ok(SearchOutcome {
                    cost,
                    control: u,
                    iterations: it + 1,
                    trace,
                });
            }
            if cost < best_cost {
                best_cost = cost;
                best_u = u.clone();
            }
            trace.push(best_cost);

            let grad = self.cost.gradient(x, &u, cost);
            let step = grad * self.sampler.mask() * alpha;
            u = self.sampler.clip(&(&u - &step));
            u = self.constrain_masked(u, x)?;
        }

        Ok(SearchOutcome {
            cost: best_cost,
            control: best_u,
            iterations: trace.len(),
            trace,
        })
    }

    /// First generation: `population_size` constrained samples.
    pub fn initial_population(&mut self, x: &Array1<f64>) -> CtrlResult<Vec<Array1<f64>>> {
        let mut population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            let u = self.sampler.sample(&mut self.rng);
            population.push(self.constrain(u, x)?);
        }
        Ok(population)
    }

    /// Number of parents kept per generation.
    pub fn survivor_count(&self) -> usize {
        let n = self.config.population_size;
        ((n as f64 * self.config.cut_off_rate).round() as usize).clamp(1, n)
    }

    /// Truncation selection, crossover, mutation and projection. Always
    /// returns exactly `population_size` children.
    pub fn evolve(
        &mut self,
        population: &[Array1<f64>],
        costs: &[f64],
        x: &Array1<f64>,
    ) -> CtrlResult<Vec<Array1<f64>>> {
        if population.is_empty() || population.len() != costs.len() {
            return Err(CtrlError::dimension(
                "population costs",
                population.len(),
                costs.len(),
            ));
        }
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));
        let survivors: Vec<&Array1<f64>> = order
            .iter()
            .take(self.survivor_count())
            .map(|&i| &population[i])
            .collect();

        let n = self.config.population_size;
        let mut next = Vec::with_capacity(n);
        while next.len() < n {
            let p1 = survivors[self.rng.gen_range(0..survivors.len())];
            let p2 = survivors[self.rng.gen_range(0..survivors.len())];
            let mut child = crossover(p1, p2, self.config.cross_over_rate, &mut self.rng);
            if self.rng.gen::<f64>() < self.config.mutation_rate {
                child = self.sampler.perturb(&child, &mut self.rng);
            }
            let child = self.sampler.clip(&child);
            next.push(self.constrain_masked(child, x)?);
        }
        Ok(next)
    }

    fn genetic_algorithm(&mut self, x: &Array1<f64>) -> CtrlResult<SearchOutcome> {
        let mut stall = StallDetector::new(&self.config);
        let mut population = self.initial_population(x)?;
        let mut best_cost = f64::INFINITY;
        let mut best_u = population[0].clone();
        let mut trace = Vec::new();

        for it in 0..self.config.max_iterations {
            let costs: Vec<f64> = population
                .iter()
                .map(|u| self.cost.evaluate(x, u))
                .collect();
            let (gen_idx, gen_best) = costs
                .iter()
                .copied()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap_or((0, f64::INFINITY));

            if gen_best < self.config.tolerance {
                trace.push(gen_best);
                return Ok(SearchOutcome {
                    cost: gen_best,
                    control: population[gen_idx].clone(),
                    iterations: it + 1,
                    trace,
                });
            }
            if gen_best < best_cost {
                best_cost = gen_best;
                best_u = population[gen_idx].clone();
            }
            trace.push(best_cost);

            population = self.evolve(&population, &costs, x)?;
            if stall.observe(gen_best) {
                break;
            }
        }

        Ok(SearchOutcome {
            cost: best_cost,
            control: best_u,
            iterations: trace.len(),
            trace,
        })
    }
}

/// Single-point crossover with probability `rate`; otherwise one parent
/// chosen uniformly.
fn crossover<R: Rng + ?Sized>(
    p1: &Array1<f64>,
    p2: &Array1<f64>,
    rate: f64,
    rng: &mut R,
) -> Array1<f64> {
    if rng.gen::<f64>() < rate {
        let point = rng.gen_range(0..p1.len());
        p1.iter()
            .take(point)
            .chain(p2.iter().skip(point))
            .copied()
            .collect()
    } else if rng.gen::<f64>() < 0.5 {
        p1.clone()
    } else {
        p2.clone()
    }
}
