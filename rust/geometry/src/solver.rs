// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Levenberg-Marquardt constraint solver
//!
//! Damped Gauss-Newton over the free parameters (floating point coordinates
//! and determined variables). The Jacobian is taken by forward differences
//! and stored with one row per parameter and one column per constraint, so
//! the normal equations read `H = J * J^T`, `g = J * r`. The damped system
//! `H * delta = -g` is solved by dense Gaussian elimination with partial
//! pivoting; singular pivots leave their delta component at zero, which
//! together with the damping keeps coincident-point and other degenerate
//! configurations from derailing the iteration.
//!
//! Numerical pathologies never escape: non-finite derivatives are zeroed
//! and non-convergence is reported through the success flag.

use nalgebra::{DMatrix, DVector};
use planesolve_core::{ConstraintKind, EntityId, GeometryState};

use crate::params::{apply_params, extract_free_params, ParamSlot};
use crate::residual::residual_vector;

/// Iteration cap for one solve
pub const MAX_ITERATIONS: usize = 100;

/// Convergence threshold on the residual L2 norm
pub const CONVERGENCE_EPS: f64 = 1e-4;

/// Initial damping factor
const LAMBDA_INIT: f64 = 0.01;

/// Damping growth on a rejected step
const LAMBDA_UP: f64 = 10.0;

/// Damping decay on an accepted step
const LAMBDA_DOWN: f64 = 0.1;

/// Floor on the relative diagonal damping term
const DAMPING_FLOOR: f64 = 1e-6;

/// Pivots below this magnitude are treated as singular
const PIVOT_EPS: f64 = 1e-12;

/// Outcome of one solver run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SolveReport {
    pub success: bool,
    pub iterations: usize,
    pub final_error: f64,
}

fn norm(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum::<f64>().sqrt()
}

/// Forward-difference Jacobian, one row per parameter, one column per
/// constraint; the state is restored to the baseline before returning
fn jacobian(
    state: &mut GeometryState,
    template: &[ParamSlot],
    params: &[f64],
    baseline: &[f64],
) -> DMatrix<f64> {
    let n = template.len();
    let m = baseline.len();
    let mut j = DMatrix::zeros(n, m);
    let mut work = params.to_vec();

    for i in 0..n {
        let eps = (params[i].abs() * 1e-6).max(1e-6);
        work[i] = params[i] + eps;
        apply_params(state, template, &work);

        let perturbed = residual_vector(state);
        for (k, r) in perturbed.iter().enumerate() {
            let derivative = (r - baseline[k]) / eps;
            j[(i, k)] = if derivative.is_finite() { derivative } else { 0.0 };
        }

        work[i] = params[i];
    }

    apply_params(state, template, params);
    j
}

/// Solve `H * delta = -g` by Gaussian elimination with partial pivoting
///
/// Columns whose best pivot is singular are skipped; their delta component
/// stays zero.
fn solve_damped_system(h: &DMatrix<f64>, g: &DVector<f64>) -> DVector<f64> {
    let n = h.nrows();
    let mut a = h.clone_owned();
    let mut b = -g.clone_owned();

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_mag = a[(col, col)].abs();
        for row in (col + 1)..n {
            let mag = a[(row, col)].abs();
            if mag > pivot_mag {
                pivot_row = row;
                pivot_mag = mag;
            }
        }
        if pivot_mag < PIVOT_EPS {
            continue;
        }
        if pivot_row != col {
            a.swap_rows(col, pivot_row);
            b.swap_rows(col, pivot_row);
        }

        for row in (col + 1)..n {
            let factor = a[(row, col)] / a[(col, col)];
            for k in col..n {
                a[(row, k)] -= factor * a[(col, k)];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut delta = DVector::zeros(n);
    for col in (0..n).rev() {
        let pivot = a[(col, col)];
        if pivot.abs() < PIVOT_EPS {
            continue;
        }
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[(col, k)] * delta[k];
        }
        delta[col] = sum / pivot;
    }
    delta
}

/// Run the LM loop until the residual norm converges or the iteration cap
///
/// With no free parameters the document is only checked, never moved.
/// Accepted steps never increase the residual norm.
pub fn solve(state: &mut GeometryState) -> SolveReport {
    solve_observed(state, |_| {})
}

/// LM loop with an observer invoked on the initial residual norm and after
/// every accepted step
fn solve_observed(state: &mut GeometryState, mut observe: impl FnMut(f64)) -> SolveReport {
    let (template, mut params) = extract_free_params(state);

    if template.is_empty() {
        let error = norm(&residual_vector(state));
        return SolveReport {
            success: error < CONVERGENCE_EPS,
            iterations: 0,
            final_error: error,
        };
    }

    apply_params(state, &template, &params);
    let mut residuals = residual_vector(state);
    let mut error = norm(&residuals);
    observe(error);

    let mut lambda = LAMBDA_INIT;
    let mut iterations = 0;

    for _ in 0..MAX_ITERATIONS {
        if error < CONVERGENCE_EPS {
            break;
        }
        iterations += 1;

        let j = jacobian(state, &template, &params, &residuals);
        if j.ncols() == 0 {
            break;
        }

        let n = template.len();
        let mut h = &j * j.transpose();
        let g = &j * DVector::from_column_slice(&residuals);

        // Relative damping with a floor for locally inert parameters
        for i in 0..n {
            let diagonal = h[(i, i)];
            h[(i, i)] = diagonal + lambda * diagonal.max(DAMPING_FLOOR);
        }

        let delta = solve_damped_system(&h, &g);
        let trial: Vec<f64> = params.iter().zip(delta.iter()).map(|(p, d)| p + d).collect();

        apply_params(state, &template, &trial);
        let trial_residuals = residual_vector(state);
        let trial_error = norm(&trial_residuals);

        if trial_error < error {
            params = trial;
            residuals = trial_residuals;
            error = trial_error;
            observe(error);
            lambda *= LAMBDA_DOWN;
        } else {
            apply_params(state, &template, &params);
            lambda *= LAMBDA_UP;
        }
    }

    SolveReport {
        success: error < CONVERGENCE_EPS,
        iterations,
        final_error: error,
    }
}

/// Trial-solve a candidate constraint on a deep clone of the document
///
/// The caller's state is never touched; returns whether the augmented
/// system converges.
pub fn validate_constraint(state: &GeometryState, kind: &ConstraintKind) -> bool {
    let mut trial = state.clone();
    trial.append_constraint(kind.clone());
    solve(&mut trial).success
}

/// Append a constraint if a trial solve accepts it, then solve for real
///
/// Returns the constraint id, or `None` when the trial solve fails to
/// converge (the document is left untouched).
pub fn add_constraint(state: &mut GeometryState, kind: ConstraintKind) -> Option<EntityId> {
    if !validate_constraint(state, &kind) {
        return None;
    }
    let id = state.append_constraint(kind);
    solve(state);
    Some(id)
}
