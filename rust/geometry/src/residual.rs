// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constraint residuals
//!
//! One scalar deviation per constraint; the solver minimizes the sum of
//! squares. Unresolved expressions and stale entity references contribute
//! zero, so partially specified documents stay solvable.

use nalgebra::{distance, Point2};
use planesolve_core::{evaluate_expression, ConstraintKind, EntityId, GeometryState};

use crate::primitives::{
    angular_distance, normalize_radians, point2, point_segment_distance, segment_angle_deg,
    wrap_degrees,
};

fn point_coords(state: &GeometryState, id: EntityId) -> Option<Point2<f64>> {
    state.point(id).map(point2)
}

/// Center and radius of a circle, when both resolve
fn circle_coords(state: &GeometryState, id: EntityId) -> Option<(Point2<f64>, f64)> {
    let circle = state.circle(id)?;
    let center = point_coords(state, circle.center?)?;
    Some((center, circle.radius?))
}

/// Residual of a single constraint against the current document
pub fn constraint_residual(state: &GeometryState, kind: &ConstraintKind) -> f64 {
    match kind {
        ConstraintKind::Distance { p1, p2, expression } => {
            let (a, b) = match (point_coords(state, *p1), point_coords(state, *p2)) {
                (Some(a), Some(b)) => (a, b),
                _ => return 0.0,
            };
            match evaluate_expression(expression, &state.variables) {
                Some(target) => distance(&a, &b) - target,
                None => 0.0,
            }
        }

        ConstraintKind::Angle { p1, p2, expression } => {
            let (a, b) = match (point_coords(state, *p1), point_coords(state, *p2)) {
                (Some(a), Some(b)) => (a, b),
                _ => return 0.0,
            };
            match evaluate_expression(expression, &state.variables) {
                Some(target) => wrap_degrees(segment_angle_deg(a, b) - target),
                None => 0.0,
            }
        }

        ConstraintKind::PointOnSegment { point, segment } => {
            let (p, seg) = match (point_coords(state, *point), state.segment(*segment)) {
                (Some(p), Some(seg)) => (p, seg),
                _ => return 0.0,
            };
            let (a, b) = match (point_coords(state, seg.p1), point_coords(state, seg.p2)) {
                (Some(a), Some(b)) => (a, b),
                _ => return 0.0,
            };
            point_segment_distance(p, a, b)
        }

        ConstraintKind::PointOnCircle { point, circle } => {
            let (p, (center, radius)) =
                match (point_coords(state, *point), circle_coords(state, *circle)) {
                    (Some(p), Some(c)) => (p, c),
                    _ => return 0.0,
                };
            (distance(&p, &center) - radius).abs()
        }

        ConstraintKind::PointOnArc { point, arc } => {
            let (p, arc) = match (point_coords(state, *point), state.arc(*arc)) {
                (Some(p), Some(a)) => (p, a),
                _ => return 0.0,
            };
            let (center, radius) = match circle_coords(state, arc.circle) {
                Some(c) => c,
                None => return 0.0,
            };
            let (start, end) = match (
                point_coords(state, arc.start),
                point_coords(state, arc.end),
            ) {
                (Some(s), Some(e)) => (s, e),
                _ => return 0.0,
            };

            let radial = (distance(&p, &center) - radius).abs();

            let theta = normalize_radians((p.y - center.y).atan2(p.x - center.x));
            let start_angle = normalize_radians((start.y - center.y).atan2(start.x - center.x));
            let end_angle = normalize_radians((end.y - center.y).atan2(end.x - center.x));

            // Wrap-around span: inside means on either side of 0
            let inside = if start_angle <= end_angle {
                theta >= start_angle && theta <= end_angle
            } else {
                theta >= start_angle || theta <= end_angle
            };

            if inside {
                radial
            } else {
                let to_span = angular_distance(theta, start_angle)
                    .min(angular_distance(theta, end_angle));
                radial + to_span * radius
            }
        }

        ConstraintKind::Equation { expression } => {
            evaluate_expression(expression, &state.variables).unwrap_or(0.0)
        }
    }
}

/// Residuals of every constraint, in append order
pub fn residual_vector(state: &GeometryState) -> Vec<f64> {
    state
        .constraints
        .iter()
        .map(|c| constraint_residual(state, &c.kind))
        .collect()
}
