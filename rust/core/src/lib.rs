// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planesolve Core
//!
//! Entity model and expression language for planar geometry documents.
//!
//! ## Overview
//!
//! This crate provides the non-numeric half of the planesolve kernel:
//!
//! - **Entity Store**: id-keyed, insertion-ordered containers for points,
//!   segments, circles, arcs, variables and constraints
//! - **Dependency Graph**: child-link bookkeeping and cascading delete
//! - **Expression Language**: arithmetic over named variables, tokenized
//!   with [nom](https://docs.rs/nom) and evaluated with an unresolved
//!   sentinel instead of hard failures
//! - **Labels**: monotonic alphabetic point labels (`A..Z`, `A1..`)
//!
//! Geometry primitives, intersection synthesis, and the constraint solver
//! live in `planesolve-geometry`, which builds on these types.
//!
//! ## Quick Start
//!
//! ```rust
//! use planesolve_core::{ConstraintKind, GeometryState};
//!
//! let mut state = GeometryState::new();
//! let a = state.add_point(0.0, 0.0);
//! let b = state.add_point(10.0, 0.0);
//! let seg = state.add_segment_two_points(a, b)?;
//!
//! state.add_variable("width", Some(10.0), false)?;
//! state.append_constraint(ConstraintKind::Distance {
//!     p1: a,
//!     p2: b,
//!     expression: "width".to_string(),
//! });
//!
//! assert_eq!(state.point(a).unwrap().label, "A");
//! assert!(state.segment(seg).is_some());
//! # Ok::<(), planesolve_core::Error>(())
//! ```
//!
//! ## Expressions
//!
//! ```rust
//! use planesolve_core::expr::{evaluate_expression, extract_variable_names};
//!
//! let vars = Default::default();
//! assert_eq!(evaluate_expression("2 + 3 * 4", &vars), Some(14.0));
//! assert_eq!(evaluate_expression("missing + 1", &vars), None); // unresolved
//! assert_eq!(extract_variable_names("a + b * a"), vec!["a", "b", "a"]);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization of the document state

pub mod entity;
pub mod error;
pub mod expr;
pub mod label;
pub mod state;

pub use entity::{
    Arc, Circle, CircleKind, Constraint, ConstraintKind, EntityId, EntityMap, Measurement, Point,
    Segment, SegmentKind, Tool, Variable, VariableMap,
};
pub use error::{Error, Result};
pub use expr::{evaluate_expression, extract_variable_names, validate_expression};
pub use label::LabelAllocator;
pub use state::GeometryState;
