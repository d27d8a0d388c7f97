//! Derivative-free optimizers
//!
//! Strategies are ask/tell state machines: the driver evaluates a candidate,
//! appends the result to the history and asks the strategy for the next
//! candidate via [`OptimizationStrategy::propose_next`]. The strategy reads
//! the most recent evaluation as the outcome of its previous proposal (the
//! first call sees the initial point).
//!
//! # Supported Optimizers
//!
//! | Optimizer | Evaluations per step | Best For |
//! |-----------|----------------------|----------|
//! | Nelder–Mead | 1-2 (n on shrink) | Smooth, low-dimensional landscapes |
//! | SPSA | 3 (plus 2 per calibration sample) | Noisy or higher-dimensional objectives |
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        minimize()                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  candidate ──▶ objective ──▶ history.push(Evaluation)        │
//! │      ▲                                │                      │
//! │      └──── Step::Evaluate ◀── strategy.propose_next(history) │
//! │                                       │                      │
//! │                          Step::Converged / budget / failure  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QaeError, Result};

// =============================================================================
// Constants
// =============================================================================

/// Default Nelder–Mead initial simplex step (radians)
pub const DEFAULT_INITIAL_STEP: f64 = 0.5;

/// Nelder–Mead reflection coefficient
pub const NM_REFLECTION: f64 = 1.0;

/// Nelder–Mead expansion coefficient
pub const NM_EXPANSION: f64 = 2.0;

/// Nelder–Mead contraction coefficient
pub const NM_CONTRACTION: f64 = 0.5;

/// Nelder–Mead shrink coefficient
pub const NM_SHRINK: f64 = 0.5;

/// Default parameter tolerance
pub const DEFAULT_XTOL: f64 = 1e-6;

/// Default objective tolerance
pub const DEFAULT_FTOL: f64 = 1e-9;

/// Default SPSA learning rate coefficient, used when calibration is off or
/// the calibration samples see a flat objective
pub const DEFAULT_SPSA_A: f64 = 0.2;

/// Default SPSA perturbation
pub const DEFAULT_SPSA_C: f64 = 0.2;

/// Default SPSA alpha
pub const DEFAULT_SPSA_ALPHA: f64 = 0.602;

/// Default SPSA gamma
pub const DEFAULT_SPSA_GAMMA: f64 = 0.101;

/// Default number of gradient samples used to calibrate the SPSA learning rate
pub const DEFAULT_SPSA_CALIBRATION_STEPS: usize = 25;

/// Default first-iteration SPSA step per parameter (radians)
pub const DEFAULT_SPSA_TARGET_STEP: f64 = std::f64::consts::TAU / 10.0;

/// Calibrated gradient magnitudes below this keep the configured `spsa_a`
const SPSA_CALIBRATION_FLOOR: f64 = 1e-10;

/// Consecutive stalled SPSA iterations before converging
pub const SPSA_STALL_ITERATIONS: usize = 3;

// =============================================================================
// Optimizer Kind
// =============================================================================

/// Optimizer algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Downhill simplex
    #[default]
    NelderMead,
    /// Simultaneous Perturbation Stochastic Approximation
    Spsa,
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::NelderMead => "nelder_mead",
            OptimizerKind::Spsa => "spsa",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = QaeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "nelder_mead" | "neldermead" | "simplex" | "nm" => Ok(OptimizerKind::NelderMead),
            "spsa" => Ok(OptimizerKind::Spsa),
            other => Err(QaeError::config(format!(
                "unknown optimizer '{other}' (expected nelder_mead or spsa)"
            ))),
        }
    }
}

// =============================================================================
// Optimizer Configuration
// =============================================================================

/// Optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Optimizer algorithm
    pub kind: OptimizerKind,
    /// Nelder–Mead initial simplex step along each axis
    pub initial_step: f64,
    /// Parameter tolerance (simplex diameter / SPSA update norm)
    pub xtol: f64,
    /// Objective tolerance (simplex loss spread / SPSA iterate loss change)
    pub ftol: f64,
    /// SPSA learning rate coefficient
    pub spsa_a: f64,
    /// SPSA perturbation coefficient
    pub spsa_c: f64,
    /// SPSA learning rate decay exponent
    pub spsa_alpha: f64,
    /// SPSA perturbation decay exponent
    pub spsa_gamma: f64,
    /// Gradient samples spent calibrating `spsa_a`; 0 uses `spsa_a` as given
    pub spsa_calibration_steps: usize,
    /// Calibrated first step per parameter
    pub spsa_target_step: f64,
    /// Seed for stochastic strategies; `None` draws from entropy
    pub seed: Option<u64>,
}

impl OptimizerConfig {
    /// Nelder–Mead with default coefficients
    pub fn nelder_mead() -> Self {
        Self::default()
    }

    /// SPSA with default gains
    pub fn spsa() -> Self {
        Self {
            kind: OptimizerKind::Spsa,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: OptimizerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    pub fn with_spsa_gains(mut self, a: f64, c: f64) -> Self {
        self.spsa_a = a;
        self.spsa_c = c;
        self
    }

    /// `steps = 0` disables calibration.
    pub fn with_spsa_calibration(mut self, steps: usize, target_step: f64) -> Self {
        self.spsa_calibration_steps = steps;
        self.spsa_target_step = target_step;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that every coefficient is finite and in range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("initial_step", self.initial_step),
            ("spsa_a", self.spsa_a),
            ("spsa_c", self.spsa_c),
            ("spsa_target_step", self.spsa_target_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(QaeError::config(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("xtol", self.xtol),
            ("ftol", self.ftol),
            ("spsa_alpha", self.spsa_alpha),
            ("spsa_gamma", self.spsa_gamma),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(QaeError::config(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            kind: OptimizerKind::NelderMead,
            initial_step: DEFAULT_INITIAL_STEP,
            xtol: DEFAULT_XTOL,
            ftol: DEFAULT_FTOL,
            spsa_a: DEFAULT_SPSA_A,
            spsa_c: DEFAULT_SPSA_C,
            spsa_alpha: DEFAULT_SPSA_ALPHA,
            spsa_gamma: DEFAULT_SPSA_GAMMA,
            spsa_calibration_steps: DEFAULT_SPSA_CALIBRATION_STEPS,
            spsa_target_step: DEFAULT_SPSA_TARGET_STEP,
            seed: None,
        }
    }
}

// =============================================================================
// Strategy Interface
// =============================================================================

/// One objective evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub params: Vec<f64>,
    pub loss: f64,
}

/// Answer of a strategy to the latest evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Evaluate this candidate next
    Evaluate(Vec<f64>),
    /// The strategy's own stopping criterion is met
    Converged,
}

/// Opaque derivative-free strategy.
pub trait OptimizationStrategy: Send {
    fn name(&self) -> &'static str;

    /// Consumes the latest entry of `history` and proposes the next candidate.
    ///
    /// `history` is never empty. Errors are numerical failures (degenerate or
    /// non-finite candidates) and end the run.
    fn propose_next(&mut self, history: &[Evaluation]) -> Result<Step>;
}

/// Strategy selected by `config.kind`.
pub fn build_strategy(config: &OptimizerConfig) -> Box<dyn OptimizationStrategy> {
    match config.kind {
        OptimizerKind::NelderMead => Box::new(NelderMead::new(config)),
        OptimizerKind::Spsa => Box::new(Spsa::new(config)),
    }
}

fn latest(history: &[Evaluation]) -> Result<&Evaluation> {
    history
        .last()
        .ok_or_else(|| QaeError::NumericalFailure("strategy called with empty history".into()))
}

fn ensure_finite(point: &[f64], what: &str) -> Result<()> {
    if point.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(QaeError::NumericalFailure(format!("non-finite {what} candidate")))
    }
}

/// origin + t (target - origin)
fn toward(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}

// =============================================================================
// Nelder–Mead
// =============================================================================

#[derive(Debug, Clone)]
enum SimplexPhase {
    /// Collecting the n + 1 initial vertices; `axis` is the last proposed
    Build { axis: Option<usize> },
    Reflect { centroid: Vec<f64>, reflected: Vec<f64> },
    Expand { expanded: Vec<f64>, reflected: Evaluation },
    ContractOutside { contracted: Vec<f64>, reflected_loss: f64 },
    ContractInside { contracted: Vec<f64> },
    /// Re-evaluating shrunk vertex `vertex`
    Shrink { vertex: usize },
    Done,
}

/// Nelder–Mead downhill simplex as an ask/tell state machine.
#[derive(Debug, Clone)]
pub struct NelderMead {
    initial_step: f64,
    xtol: f64,
    ftol: f64,
    /// Vertices; sorted by loss at the start of each iteration
    simplex: Vec<Evaluation>,
    origin: Vec<f64>,
    phase: SimplexPhase,
}

impl NelderMead {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            initial_step: config.initial_step,
            xtol: config.xtol,
            ftol: config.ftol,
            simplex: Vec::new(),
            origin: Vec::new(),
            phase: SimplexPhase::Build { axis: None },
        }
    }

    /// Current vertices (unsorted mid-iteration).
    pub fn simplex(&self) -> &[Evaluation] {
        &self.simplex
    }

    fn dim(&self) -> usize {
        self.origin.len()
    }

    /// Max coordinate distance of any vertex from the best one.
    fn diameter(&self) -> f64 {
        let best = &self.simplex[0].params;
        self.simplex[1..]
            .iter()
            .flat_map(|v| v.params.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max)
    }

    fn spread(&self) -> f64 {
        let best = self.simplex[0].loss;
        self.simplex[1..]
            .iter()
            .map(|v| (v.loss - best).abs())
            .fold(0.0, f64::max)
    }

    fn replace_worst(&mut self, vertex: Evaluation) {
        let worst = self.simplex.len() - 1;
        self.simplex[worst] = vertex;
    }

    fn propose(&mut self, phase: SimplexPhase, candidate: Vec<f64>) -> Result<Step> {
        ensure_finite(&candidate, "simplex")?;
        self.phase = phase;
        Ok(Step::Evaluate(candidate))
    }

    fn start_iteration(&mut self) -> Result<Step> {
        self.simplex.sort_by(|a, b| a.loss.total_cmp(&b.loss));

        if self.diameter() <= self.xtol && self.spread() <= self.ftol {
            self.phase = SimplexPhase::Done;
            return Ok(Step::Converged);
        }

        let n = self.dim();
        let mut centroid = vec![0.0; n];
        for vertex in &self.simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(&vertex.params) {
                *c += x / n as f64;
            }
        }
        let reflected = toward(&centroid, &self.simplex[n].params, -NM_REFLECTION);
        self.propose(
            SimplexPhase::Reflect {
                centroid,
                reflected: reflected.clone(),
            },
            reflected,
        )
    }

    fn start_shrink(&mut self) -> Result<Step> {
        let best = self.simplex[0].params.clone();
        for vertex in &mut self.simplex[1..] {
            vertex.params = toward(&best, &vertex.params, NM_SHRINK);
            vertex.loss = f64::NAN;
        }
        let first = self.simplex[1].params.clone();
        self.propose(SimplexPhase::Shrink { vertex: 1 }, first)
    }

    fn propose_axis(&mut self, axis: usize) -> Result<Step> {
        let mut vertex = self.origin.clone();
        vertex[axis] += self.initial_step;
        self.propose(SimplexPhase::Build { axis: Some(axis) }, vertex)
    }
}

impl OptimizationStrategy for NelderMead {
    fn name(&self) -> &'static str {
        "nelder_mead"
    }

    fn propose_next(&mut self, history: &[Evaluation]) -> Result<Step> {
        let last = latest(history)?.clone();
        let n = self.dim();

        match std::mem::replace(&mut self.phase, SimplexPhase::Done) {
            SimplexPhase::Build { axis } => {
                if axis.is_none() {
                    self.origin = last.params.clone();
                }
                self.simplex.push(last);
                let next = axis.map_or(0, |a| a + 1);
                if next < self.dim() {
                    self.propose_axis(next)
                } else {
                    self.start_iteration()
                }
            }
            SimplexPhase::Reflect {
                centroid,
                reflected,
            } => {
                let fr = last.loss;
                let best = self.simplex[0].loss;
                let second_worst = self.simplex[n.saturating_sub(1)].loss;
                let worst = self.simplex[n].loss;

                if fr < best {
                    let expanded = toward(&centroid, &reflected, NM_EXPANSION);
                    self.propose(
                        SimplexPhase::Expand {
                            expanded: expanded.clone(),
                            reflected: last,
                        },
                        expanded,
                    )
                } else if fr < second_worst {
                    self.replace_worst(last);
                    self.start_iteration()
                } else if fr < worst {
                    let contracted = toward(&centroid, &reflected, NM_CONTRACTION);
                    self.propose(
                        SimplexPhase::ContractOutside {
                            contracted: contracted.clone(),
                            reflected_loss: fr,
                        },
                        contracted,
                    )
                } else {
                    let contracted = toward(&centroid, &self.simplex[n].params, NM_CONTRACTION);
                    self.propose(
                        SimplexPhase::ContractInside {
                            contracted: contracted.clone(),
                        },
                        contracted,
                    )
                }
            }
            SimplexPhase::Expand {
                expanded,
                reflected,
            } => {
                if last.loss < reflected.loss {
                    self.replace_worst(Evaluation {
                        params: expanded,
                        loss: last.loss,
                    });
                } else {
                    self.replace_worst(reflected);
                }
                self.start_iteration()
            }
            SimplexPhase::ContractOutside {
                contracted,
                reflected_loss,
            } => {
                if last.loss <= reflected_loss {
                    self.replace_worst(Evaluation {
                        params: contracted,
                        loss: last.loss,
                    });
                    self.start_iteration()
                } else {
                    self.start_shrink()
                }
            }
            SimplexPhase::ContractInside { contracted } => {
                if last.loss < self.simplex[n].loss {
                    self.replace_worst(Evaluation {
                        params: contracted,
                        loss: last.loss,
                    });
                    self.start_iteration()
                } else {
                    self.start_shrink()
                }
            }
            SimplexPhase::Shrink { vertex } => {
                self.simplex[vertex].loss = last.loss;
                let next = vertex + 1;
                if next <= n {
                    let candidate = self.simplex[next].params.clone();
                    self.propose(SimplexPhase::Shrink { vertex: next }, candidate)
                } else {
                    self.start_iteration()
                }
            }
            SimplexPhase::Done => Ok(Step::Converged),
        }
    }
}

// =============================================================================
// SPSA
// =============================================================================

/// Internal state for SPSA
#[derive(Debug, Clone)]
pub struct SPSAState {
    /// Current iteration
    pub k: usize,
    /// Perturbation coefficient
    pub c: f64,
    /// Learning rate coefficient
    pub a: f64,
    /// Alpha exponent
    pub alpha: f64,
    /// Gamma exponent
    pub gamma: f64,
}

impl SPSAState {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            k: 0,
            c: config.spsa_c,
            a: config.spsa_a,
            alpha: config.spsa_alpha,
            gamma: config.spsa_gamma,
        }
    }

    /// Current learning rate a_k = a / (k + 1)^alpha
    pub fn learning_rate(&self) -> f64 {
        self.a / ((self.k + 1) as f64).powf(self.alpha)
    }

    /// Current perturbation c_k = c / (k + 1)^gamma
    pub fn perturbation(&self) -> f64 {
        self.c / ((self.k + 1) as f64).powf(self.gamma)
    }
}

#[derive(Debug, Clone)]
enum SpsaPhase {
    /// Latest evaluation is the current iterate
    Center,
    CalibratePlus {
        delta: Vec<f64>,
        taken: usize,
        magnitude: f64,
    },
    CalibrateMinus {
        delta: Vec<f64>,
        loss_plus: f64,
        taken: usize,
        magnitude: f64,
    },
    Plus {
        delta: Vec<f64>,
    },
    Minus {
        delta: Vec<f64>,
        loss_plus: f64,
    },
    Done,
}

/// SPSA with Rademacher perturbations from a seeded RNG.
///
/// Before the first iteration the learning rate is calibrated from
/// `spsa_calibration_steps` gradient samples at the initial point, so that
/// the first step moves each parameter by about `spsa_target_step`. Each
/// iteration then evaluates θ + c_k Δ and θ − c_k Δ, steps θ by −a_k ĝ and
/// evaluates the new θ so the history tracks the iterates.
///
/// An iteration is stalled when its update norm is below `xtol` or the
/// iterate loss changed by at most `ftol`; [`SPSA_STALL_ITERATIONS`]
/// consecutive stalls converge.
#[derive(Debug, Clone)]
pub struct Spsa {
    state: SPSAState,
    xtol: f64,
    ftol: f64,
    calibration_steps: usize,
    target_step: f64,
    rng: StdRng,
    theta: Vec<f64>,
    center_loss: Option<f64>,
    last_update: f64,
    stalled: usize,
    phase: SpsaPhase,
}

impl Spsa {
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            state: SPSAState::new(config),
            xtol: config.xtol,
            ftol: config.ftol,
            calibration_steps: config.spsa_calibration_steps,
            target_step: config.spsa_target_step,
            rng: config.rng(),
            theta: Vec::new(),
            center_loss: None,
            last_update: f64::INFINITY,
            stalled: 0,
            phase: SpsaPhase::Center,
        }
    }

    pub fn iteration(&self) -> usize {
        self.state.k
    }

    /// Gain schedule, with `a` replaced by its calibrated value once known.
    pub fn state(&self) -> &SPSAState {
        &self.state
    }

    fn rademacher(&mut self) -> Vec<f64> {
        (0..self.theta.len())
            .map(|_| if self.rng.gen::<bool>() { 1.0 } else { -1.0 })
            .collect()
    }

    fn shifted(&self, delta: &[f64], sign: f64) -> Result<Vec<f64>> {
        let ck = self.state.perturbation();
        let point: Vec<f64> = self
            .theta
            .iter()
            .zip(delta)
            .map(|(t, d)| t + sign * ck * d)
            .collect();
        ensure_finite(&point, "perturbed")?;
        Ok(point)
    }

    fn begin_iteration(&mut self) -> Result<Step> {
        let delta = self.rademacher();
        let plus = self.shifted(&delta, 1.0)?;
        self.phase = SpsaPhase::Plus { delta };
        Ok(Step::Evaluate(plus))
    }

    fn begin_calibration_sample(&mut self, taken: usize, magnitude: f64) -> Result<Step> {
        let delta = self.rademacher();
        let plus = self.shifted(&delta, 1.0)?;
        self.phase = SpsaPhase::CalibratePlus {
            delta,
            taken,
            magnitude,
        };
        Ok(Step::Evaluate(plus))
    }
}

impl OptimizationStrategy for Spsa {
    fn name(&self) -> &'static str {
        "spsa"
    }

    fn propose_next(&mut self, history: &[Evaluation]) -> Result<Step> {
        let last = latest(history)?;

        match std::mem::replace(&mut self.phase, SpsaPhase::Done) {
            SpsaPhase::Center => {
                self.theta = last.params.clone();
                match self.center_loss.replace(last.loss) {
                    Some(previous) => {
                        let flat = (previous - last.loss).abs() <= self.ftol;
                        if self.last_update < self.xtol || flat {
                            self.stalled += 1;
                        } else {
                            self.stalled = 0;
                        }
                        if self.stalled >= SPSA_STALL_ITERATIONS {
                            return Ok(Step::Converged);
                        }
                    }
                    None if self.calibration_steps > 0 => {
                        return self.begin_calibration_sample(0, 0.0);
                    }
                    None => {}
                }
                self.begin_iteration()
            }
            SpsaPhase::CalibratePlus {
                delta,
                taken,
                magnitude,
            } => {
                let minus = self.shifted(&delta, -1.0)?;
                self.phase = SpsaPhase::CalibrateMinus {
                    delta,
                    loss_plus: last.loss,
                    taken,
                    magnitude,
                };
                Ok(Step::Evaluate(minus))
            }
            SpsaPhase::CalibrateMinus {
                loss_plus,
                taken,
                magnitude,
                ..
            } => {
                let ck = self.state.perturbation();
                let magnitude = magnitude + ((loss_plus - last.loss) / (2.0 * ck)).abs();
                let taken = taken + 1;
                if taken < self.calibration_steps {
                    return self.begin_calibration_sample(taken, magnitude);
                }

                let average = magnitude / taken as f64;
                if average > SPSA_CALIBRATION_FLOOR {
                    self.state.a = self.target_step / average;
                }
                debug!(a = self.state.a, average, "spsa learning rate calibrated");
                self.begin_iteration()
            }
            SpsaPhase::Plus { delta } => {
                let minus = self.shifted(&delta, -1.0)?;
                self.phase = SpsaPhase::Minus {
                    delta,
                    loss_plus: last.loss,
                };
                Ok(Step::Evaluate(minus))
            }
            SpsaPhase::Minus { delta, loss_plus } => {
                let ak = self.state.learning_rate();
                let ck = self.state.perturbation();
                let diff = (loss_plus - last.loss) / (2.0 * ck);

                let mut update_sq = 0.0;
                for (t, d) in self.theta.iter_mut().zip(&delta) {
                    let step = ak * diff / d;
                    *t -= step;
                    update_sq += step * step;
                }
                ensure_finite(&self.theta, "updated")?;
                self.state.k += 1;
                self.last_update = update_sq.sqrt();

                self.phase = SpsaPhase::Center;
                Ok(Step::Evaluate(self.theta.clone()))
            }
            SpsaPhase::Done => Ok(Step::Converged),
        }
    }
}

// =============================================================================
// Optimization Loop
// =============================================================================

/// Terminal status of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum RunStatus {
    Converged,
    BudgetExhausted,
    Failed(String),
}

impl RunStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, RunStatus::Failed(_))
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Converged => f.write_str("converged"),
            RunStatus::BudgetExhausted => f.write_str("budget_exhausted"),
            RunStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Result of optimization
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best parameters seen (the initial point if nothing was evaluated)
    pub params: Vec<f64>,
    /// Loss at `params`; NaN if no evaluation succeeded
    pub objective: f64,
    /// Loss of every evaluation, in order
    pub history: Vec<f64>,
    /// Number of objective evaluations
    pub evaluations: usize,
    pub status: RunStatus,
}

/// Runs `strategy` from `initial` for at most `budget` objective evaluations.
///
/// The objective failing or returning a non-finite loss ends the run with
/// [`RunStatus::Failed`]; nothing is retried.
pub fn minimize<F>(
    strategy: &mut dyn OptimizationStrategy,
    initial: Vec<f64>,
    budget: usize,
    mut objective: F,
) -> OptimizationResult
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let mut history: Vec<Evaluation> = Vec::with_capacity(budget);
    let mut best: Option<usize> = None;
    let mut candidate = initial.clone();

    let status = loop {
        if history.len() >= budget {
            break RunStatus::BudgetExhausted;
        }

        let loss = match objective(&candidate) {
            Ok(loss) if loss.is_finite() => loss,
            Ok(loss) => {
                break RunStatus::Failed(format!(
                    "non-finite loss {loss} at evaluation {}",
                    history.len()
                ))
            }
            Err(e) => break RunStatus::Failed(e.to_string()),
        };
        debug!(evaluation = history.len(), loss, "objective evaluated");

        if best.map_or(true, |b| loss < history[b].loss) {
            best = Some(history.len());
        }
        history.push(Evaluation {
            params: candidate,
            loss,
        });

        match strategy.propose_next(&history) {
            Ok(Step::Evaluate(next)) => candidate = next,
            Ok(Step::Converged) => break RunStatus::Converged,
            Err(e) => break RunStatus::Failed(e.to_string()),
        }
    };

    let (params, objective) = match best {
        Some(b) => (history[b].params.clone(), history[b].loss),
        None => (initial, f64::NAN),
    };
    OptimizationResult {
        params,
        objective,
        evaluations: history.len(),
        history: history.into_iter().map(|e| e.loss).collect(),
        status,
    }
}
