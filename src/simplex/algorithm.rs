//! Implementation of the Nelder-Mead downhill simplex minimizer.
//!
//! The simplex holds `n + 1` vertices of an `n`-parameter problem, each with its
//! cached objective value. Every iteration replaces the worst vertex by a
//! reflected, expanded or contracted point, or shrinks the simplex toward the
//! best vertex. After convergence the simplex is rebuilt around the best vertex
//! and minimized again, until two consecutive converged results agree or the
//! restart cap is reached.

use super::config::{SimplexConfig, ALPHA, BETA, GAMMA, SIGMA};
use super::convergence::{
    function_converged, parameters_converged, points_agree, values_agree, FitStatus,
};
use crate::problem::Problem;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, Zip};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked between iterations.
///
/// Clones share the flag, so the host keeps one clone and hands another to
/// the minimizer.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running minimization to stop at the next iteration boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag so the token can be reused for another fit.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Result of a simplex minimization.
#[derive(Debug, Clone)]
pub struct SimplexResult {
    /// Best parameters found
    pub params: Array1<f64>,

    /// Objective value at `params`
    pub cost: f64,

    /// Number of iterations performed, over all restarts
    pub iterations: usize,

    /// Number of restarts performed
    pub restarts: usize,

    /// Number of objective evaluations
    pub func_evals: usize,

    /// How the minimization ended
    pub status: FitStatus,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for SimplexResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Minimization Result:")?;
        writeln!(f, "  Status: {}", self.status)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Restarts: {}", self.restarts)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// Why a single simplex run stopped.
enum RunOutcome {
    Converged,
    BudgetExhausted,
    Cancelled,
}

/// Evaluation counter wrapped around a problem. NaN costs become `+inf`.
struct Objective<'a, P: Problem + ?Sized> {
    problem: &'a P,
    evals: usize,
}

impl<P: Problem + ?Sized> Objective<'_, P> {
    fn eval(&mut self, params: ArrayView1<f64>) -> f64 {
        self.evals += 1;
        let cost = self.problem.eval_cost(params);
        if cost.is_nan() {
            f64::INFINITY
        } else {
            cost
        }
    }
}

/// Vertices, cached costs and scratch buffers of one simplex.
struct Simplex {
    /// Row `i` is vertex `i`
    vertices: Array2<f64>,
    costs: Array1<f64>,
    /// Vertex indices sorted by cost, best first
    order: Vec<usize>,
    centroid: Array1<f64>,
    reflected: Array1<f64>,
    trial: Array1<f64>,
}

impl Simplex {
    /// Vertex 0 is `seed`; vertex `k` moves coordinate `k - 1` by
    /// `max(|seed_k| * fraction, min_step)`.
    fn around<P: Problem + ?Sized>(
        seed: ArrayView1<f64>,
        config: &SimplexConfig,
        objective: &mut Objective<'_, P>,
    ) -> Self {
        let n = seed.len();
        let mut vertices = Array2::zeros((n + 1, n));
        for mut row in vertices.rows_mut() {
            row.assign(&seed);
        }
        for k in 0..n {
            let step = (seed[k].abs() * config.initial_step_fraction).max(config.min_step);
            vertices[[k + 1, k]] += step;
        }

        let costs = vertices
            .rows()
            .into_iter()
            .map(|row| objective.eval(row))
            .collect::<Array1<f64>>();

        let mut simplex = Self {
            vertices,
            costs,
            order: (0..=n).collect(),
            centroid: Array1::zeros(n),
            reflected: Array1::zeros(n),
            trial: Array1::zeros(n),
        };
        simplex.sort();
        simplex
    }

    fn dimension(&self) -> usize {
        self.centroid.len()
    }

    /// Stable sort by cost; ties keep vertex index order.
    fn sort(&mut self) {
        let costs = &self.costs;
        self.order.clear();
        self.order.extend(0..costs.len());
        self.order.sort_by(|&i, &j| costs[i].total_cmp(&costs[j]));
    }

    fn best_index(&self) -> usize {
        self.order[0]
    }

    fn best(&self) -> (ArrayView1<'_, f64>, f64) {
        let b = self.best_index();
        (self.vertices.row(b), self.costs[b])
    }

    fn all_non_finite(&self) -> bool {
        self.costs.iter().all(|c| !c.is_finite())
    }

    fn converged(&self, config: &SimplexConfig) -> bool {
        let n = self.dimension();
        let best = self.costs[self.order[0]];
        let worst = self.costs[self.order[n]];
        function_converged(best, worst, config.ftol)
            || (best.is_finite()
                && parameters_converged(self.vertices.view(), self.best_index(), config.xtol))
    }

    /// One Nelder-Mead step. Expects `order` to be current.
    fn step<P: Problem + ?Sized>(&mut self, objective: &mut Objective<'_, P>) {
        let n = self.dimension();
        let b = self.order[0];
        let g = self.order[n - 1];
        let w = self.order[n];

        // Centroid of every vertex except the worst
        self.centroid.fill(0.0);
        for (i, row) in self.vertices.rows().into_iter().enumerate() {
            if i != w {
                self.centroid += &row;
            }
        }
        self.centroid /= n as f64;

        Zip::from(&mut self.reflected)
            .and(&self.centroid)
            .and(self.vertices.row(w))
            .for_each(|r, &c, &x| *r = c + ALPHA * (c - x));
        let f_r = objective.eval(self.reflected.view());

        if self.costs[b] <= f_r && f_r < self.costs[g] {
            self.vertices.row_mut(w).assign(&self.reflected);
            self.costs[w] = f_r;
        } else if f_r < self.costs[b] {
            Zip::from(&mut self.trial)
                .and(&self.centroid)
                .and(&self.reflected)
                .for_each(|e, &c, &r| *e = c + GAMMA * (r - c));
            let f_e = objective.eval(self.trial.view());

            if f_e < f_r {
                self.vertices.row_mut(w).assign(&self.trial);
                self.costs[w] = f_e;
            } else {
                self.vertices.row_mut(w).assign(&self.reflected);
                self.costs[w] = f_r;
            }
        } else {
            Zip::from(&mut self.trial)
                .and(&self.centroid)
                .and(self.vertices.row(w))
                .for_each(|t, &c, &x| *t = c + BETA * (x - c));
            let f_c = objective.eval(self.trial.view());

            if f_c < self.costs[w] {
                self.vertices.row_mut(w).assign(&self.trial);
                self.costs[w] = f_c;
            } else {
                self.shrink(b, objective);
            }
        }

        self.sort();
    }

    /// Move every vertex halfway toward the best one.
    fn shrink<P: Problem + ?Sized>(&mut self, best: usize, objective: &mut Objective<'_, P>) {
        let anchor = self.vertices.row(best).to_owned();
        for i in 0..self.costs.len() {
            if i == best {
                continue;
            }
            Zip::from(self.vertices.row_mut(i))
                .and(&anchor)
                .for_each(|v, &a| *v = a + SIGMA * (*v - a));
            self.costs[i] = objective.eval(self.vertices.row(i));
        }
    }
}

/// The Nelder-Mead simplex minimizer.
#[derive(Debug, Clone, Default)]
pub struct NelderMead {
    /// Configuration options
    config: SimplexConfig,

    /// Optional cancel flag
    cancel: Option<CancelToken>,
}

impl NelderMead {
    /// Create a minimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a minimizer with the given configuration.
    pub fn with_config(config: SimplexConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = Some(max_iterations);
        self
    }

    /// Set the restart cap.
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.config.max_restarts = max_restarts;
        self
    }

    /// Set the tolerance on the spread of objective values.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance on the spread of vertex coordinates.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Check `token` at every iteration boundary.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimplexConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    /// Minimize `problem` starting from `seed`.
    ///
    /// Never fails: unusable input is reported as
    /// [`FitStatus::InitializationFailure`], and the best vertex found so far is
    /// returned for every other status.
    pub fn minimize<P: Problem + ?Sized>(&self, problem: &P, seed: &Array1<f64>) -> SimplexResult {
        let n = problem.parameter_count();

        if n < 1 {
            return init_failure(seed, "problem has no parameters".to_string());
        }
        if seed.len() != n {
            return init_failure(
                seed,
                format!("seed has {} values for {} parameters", seed.len(), n),
            );
        }
        if seed.iter().any(|v| !v.is_finite()) {
            return init_failure(seed, "seed is not finite".to_string());
        }
        if let Err(e) = self.config.validate() {
            return init_failure(seed, e.to_string());
        }

        let budget = self.config.effective_max_iterations(n);
        let mut objective = Objective { problem, evals: 0 };
        let mut simplex = Simplex::around(seed.view(), &self.config, &mut objective);
        debug!(
            "simplex built: {} parameters, budget {} iterations, best cost {:e}",
            n,
            budget,
            simplex.best().1
        );

        if simplex.all_non_finite() {
            warn!("objective is not finite at any vertex of the initial simplex");
            return SimplexResult {
                params: seed.clone(),
                cost: f64::INFINITY,
                iterations: 0,
                restarts: 0,
                func_evals: objective.evals,
                status: FitStatus::NonFinite,
                message: FitStatus::NonFinite.description().to_string(),
            };
        }

        let mut iterations = 0;
        let mut restarts = 0;
        let mut previous: Option<(Array1<f64>, f64)> = None;

        let (status, message) = loop {
            match self.run(&mut simplex, &mut objective, &mut iterations, budget) {
                RunOutcome::Converged => {
                    let (best_params, best_cost) = simplex.best();

                    if let Some((prev_params, prev_cost)) = &previous {
                        if values_agree(*prev_cost, best_cost, self.config.ftol)
                            || points_agree(prev_params.view(), best_params, self.config.xtol)
                        {
                            break (
                                FitStatus::Ok,
                                "Converged: restarts agree within tolerance".to_string(),
                            );
                        }
                    }
                    if restarts >= self.config.max_restarts {
                        let message = if restarts == 0 {
                            "Converged".to_string()
                        } else {
                            "Converged: restart limit reached without agreement".to_string()
                        };
                        break (FitStatus::Ok, message);
                    }

                    let anchor = best_params.to_owned();
                    previous = Some((anchor.clone(), best_cost));
                    restarts += 1;
                    debug!(
                        "restart {} after {} iterations, best cost {:e}",
                        restarts, iterations, best_cost
                    );
                    simplex = Simplex::around(anchor.view(), &self.config, &mut objective);
                }
                RunOutcome::BudgetExhausted => {
                    warn!("iteration budget of {} exhausted before convergence", budget);
                    break (
                        FitStatus::MaxIter,
                        FitStatus::MaxIter.description().to_string(),
                    );
                }
                RunOutcome::Cancelled => {
                    debug!("minimization cancelled after {} iterations", iterations);
                    break (
                        FitStatus::Aborted,
                        FitStatus::Aborted.description().to_string(),
                    );
                }
            }
        };

        let (best_params, best_cost) = simplex.best();
        SimplexResult {
            params: best_params.to_owned(),
            cost: best_cost,
            iterations,
            restarts,
            func_evals: objective.evals,
            status,
            message,
        }
    }

    /// Iterate one simplex until convergence, budget exhaustion or cancellation.
    fn run<P: Problem + ?Sized>(
        &self,
        simplex: &mut Simplex,
        objective: &mut Objective<'_, P>,
        iterations: &mut usize,
        budget: usize,
    ) -> RunOutcome {
        loop {
            if simplex.converged(&self.config) {
                return RunOutcome::Converged;
            }
            if *iterations >= budget {
                return RunOutcome::BudgetExhausted;
            }
            if self.is_cancelled() {
                return RunOutcome::Cancelled;
            }
            *iterations += 1;
            simplex.step(objective);
        }
    }
}

fn init_failure(seed: &Array1<f64>, message: String) -> SimplexResult {
    warn!("minimization not started: {}", message);
    SimplexResult {
        params: seed.clone(),
        cost: f64::NAN,
        iterations: 0,
        restarts: 0,
        func_evals: 0,
        status: FitStatus::InitializationFailure,
        message,
    }
}
