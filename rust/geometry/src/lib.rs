// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planesolve Geometry
//!
//! Geometry primitives and constraint solving for planesolve documents,
//! built on [nalgebra](https://docs.rs/nalgebra).
//!
//! ## Overview
//!
//! This crate is the numeric half of the planesolve kernel:
//!
//! - **Primitives**: circumcircle, point-to-segment projection, angle
//!   conventions
//! - **Construction**: segment/circle/arc constructors that materialize
//!   derived points and synthesize intersection points
//! - **Intersections**: segment/segment, segment/circle, circle/circle
//! - **Constraint Kernel**: residuals, free-parameter extraction, numeric
//!   Jacobian, Levenberg-Marquardt driver, trial validation
//!
//! ## Quick Start
//!
//! ```rust
//! use planesolve_core::{ConstraintKind, GeometryState};
//! use planesolve_geometry::{construct, solver};
//!
//! let mut state = GeometryState::new();
//! let a = state.add_point(0.0, 0.0);
//! let b = state.add_point(10.0, 0.0);
//! let seg = construct::add_segment_two_points(&mut state, a, b)?;
//!
//! // Pull a floating point onto the segment
//! let p = state.add_point(5.0, 5.0);
//! state.set_floating(p, true);
//! let added = solver::add_constraint(
//!     &mut state,
//!     ConstraintKind::PointOnSegment { point: p, segment: seg },
//! );
//!
//! assert!(added.is_some());
//! assert!(state.point(p).unwrap().y.abs() < 1e-4);
//! # Ok::<(), planesolve_geometry::Error>(())
//! ```
//!
//! ## Solver
//!
//! [`solver::solve`] adjusts floating points and determined variables until
//! the residual norm drops below `1e-4` or 100 iterations pass, and reports
//! `{success, iterations, final_error}`. [`solver::validate_constraint`]
//! trial-solves a candidate constraint on a deep clone, so rejected
//! constraints never disturb the document.

pub mod construct;
pub mod error;
pub mod intersect;
pub mod params;
pub mod primitives;
pub mod residual;
pub mod solver;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use error::{Error, Result};
pub use intersect::find_all_intersections;
pub use params::{apply_params, extract_free_params, ParamSlot};
pub use primitives::{circumcircle, point_segment_distance, segment_angle_deg};
pub use residual::{constraint_residual, residual_vector};
pub use solver::{add_constraint, solve, validate_constraint, SolveReport};
