// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairwise intersections and the synthesis pass
//!
//! After every construction the document is scanned for segment/segment,
//! segment/circle and circle/circle intersections, and a point is
//! materialized at each novel one. The pass is single-shot: intersections
//! between entities created by the pass itself wait for the next
//! construction.

use nalgebra::{distance, Point2, Vector2};
use planesolve_core::{EntityId, GeometryState};

use crate::primitives::point2;

/// Open-interval margin on segment parameters; endpoint touches do not count
const EDGE_EPS: f64 = 1e-3;

/// Denominator threshold for parallel segments
const PARALLEL_EPS: f64 = 1e-10;

/// Chebyshev tolerance under which a candidate matches an existing point
const SAME_POINT_EPS: f64 = 1e-3;

/// Intersection of two segments, excluding endpoints and parallels
pub fn segment_segment(
    a1: Point2<f64>,
    a2: Point2<f64>,
    b1: Point2<f64>,
    b2: Point2<f64>,
) -> Option<Point2<f64>> {
    let d1 = a2 - a1;
    let d2 = b2 - b1;

    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < PARALLEL_EPS {
        return None;
    }

    let offset = b1 - a1;
    let t = (offset.x * d2.y - offset.y * d2.x) / denom;
    let u = (offset.x * d1.y - offset.y * d1.x) / denom;

    if t > EDGE_EPS && t < 1.0 - EDGE_EPS && u > EDGE_EPS && u < 1.0 - EDGE_EPS {
        Some(a1 + d1 * t)
    } else {
        None
    }
}

/// Intersections of a segment with a circle, excluding endpoints
///
/// Near-tangent contacts where the two quadratic roots coincide within the
/// edge margin emit a single point.
pub fn segment_circle(
    a: Point2<f64>,
    b: Point2<f64>,
    center: Point2<f64>,
    radius: f64,
) -> Vec<Point2<f64>> {
    let d = b - a;
    let qa = d.norm_squared();
    if qa < PARALLEL_EPS {
        return Vec::new();
    }

    let f = a - center;
    let qb = 2.0 * f.dot(&d);
    let qc = f.norm_squared() - radius * radius;

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return Vec::new();
    }

    let sq = disc.sqrt();
    let t1 = (-qb - sq) / (2.0 * qa);
    let t2 = (-qb + sq) / (2.0 * qa);

    let mut points = Vec::new();
    let first_emitted = t1 > EDGE_EPS && t1 < 1.0 - EDGE_EPS;
    if first_emitted {
        points.push(a + d * t1);
    }
    if t2 > EDGE_EPS
        && t2 < 1.0 - EDGE_EPS
        && (!first_emitted || (t2 - t1).abs() > EDGE_EPS)
    {
        points.push(a + d * t2);
    }
    points
}

/// Intersections of two circles
///
/// Empty when the circles are separate, nested, or (near) concentric; a
/// tangent contact emits a single point.
pub fn circle_circle(
    c1: Point2<f64>,
    r1: f64,
    c2: Point2<f64>,
    r2: f64,
) -> Vec<Point2<f64>> {
    let d = distance(&c1, &c2);
    if d > r1 + r2 || d < (r1 - r2).abs() || d < EDGE_EPS {
        return Vec::new();
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let axis = (c2 - c1) / d;
    let mid = c1 + axis * a;

    if h < EDGE_EPS {
        return vec![mid];
    }

    let perp = Vector2::new(-axis.y, axis.x) * h;
    vec![mid + perp, mid - perp]
}

/// Resolved segment coordinates, skipping segments with missing endpoints
fn segment_coords(state: &GeometryState) -> Vec<(Point2<f64>, Point2<f64>)> {
    state
        .segments
        .values()
        .filter_map(|s| {
            let p1 = state.point(s.p1)?;
            let p2 = state.point(s.p2)?;
            Some((point2(p1), point2(p2)))
        })
        .collect()
}

/// Resolved circle coordinates, skipping circles with a missing center or radius
fn circle_coords(state: &GeometryState) -> Vec<(Point2<f64>, f64)> {
    state
        .circles
        .values()
        .filter_map(|c| {
            let center = state.point(c.center?)?;
            Some((point2(center), c.radius?))
        })
        .collect()
}

/// Synthesize a point at every novel intersection in the document
///
/// Candidates within the same-point tolerance (per axis) of an existing
/// point, including points created earlier in the same pass, are skipped.
/// Returns the ids of the created points.
pub fn find_all_intersections(state: &mut GeometryState) -> Vec<EntityId> {
    let segments = segment_coords(state);
    let circles = circle_coords(state);

    let mut candidates: Vec<Point2<f64>> = Vec::new();

    for i in 0..segments.len() {
        for j in (i + 1)..segments.len() {
            let (a1, a2) = segments[i];
            let (b1, b2) = segments[j];
            if let Some(p) = segment_segment(a1, a2, b1, b2) {
                candidates.push(p);
            }
        }
    }

    for &(a, b) in &segments {
        for &(center, radius) in &circles {
            candidates.extend(segment_circle(a, b, center, radius));
        }
    }

    for i in 0..circles.len() {
        for j in (i + 1)..circles.len() {
            let (c1, r1) = circles[i];
            let (c2, r2) = circles[j];
            candidates.extend(circle_circle(c1, r1, c2, r2));
        }
    }

    let mut created = Vec::new();
    for candidate in candidates {
        let exists = state.points.values().any(|p| {
            (p.x - candidate.x).abs() < SAME_POINT_EPS && (p.y - candidate.y).abs() < SAME_POINT_EPS
        });
        if !exists {
            created.push(state.add_point(candidate.x, candidate.y));
        }
    }
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_segment_cross() {
        let p = segment_segment(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(10.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 5.0);
    }

    #[test]
    fn test_segment_segment_parallel() {
        assert!(segment_segment(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(10.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_segment_segment_endpoint_excluded() {
        // Shared endpoint at the origin: t = u = 0 lies outside the open interval
        assert!(segment_segment(
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
        )
        .is_none());
    }

    #[test]
    fn test_segment_circle_two_points() {
        let points = segment_circle(
            Point2::new(-10.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 0.0),
            5.0,
        );
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x, -5.0);
        assert_relative_eq!(points[1].x, 5.0);
    }

    #[test]
    fn test_segment_circle_tangent() {
        let points = segment_circle(
            Point2::new(-10.0, 5.0),
            Point2::new(10.0, 5.0),
            Point2::new(0.0, 0.0),
            5.0,
        );
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_segment_circle_miss() {
        assert!(segment_circle(
            Point2::new(-10.0, 6.0),
            Point2::new(10.0, 6.0),
            Point2::new(0.0, 0.0),
            5.0,
        )
        .is_empty());
    }

    #[test]
    fn test_circle_circle_two_points() {
        let points = circle_circle(Point2::new(0.0, 0.0), 5.0, Point2::new(6.0, 0.0), 5.0);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x, 3.0);
        assert_relative_eq!(points[0].y, 4.0);
        assert_relative_eq!(points[1].x, 3.0);
        assert_relative_eq!(points[1].y, -4.0);
    }

    #[test]
    fn test_circle_circle_separate_and_nested() {
        assert!(circle_circle(Point2::new(0.0, 0.0), 2.0, Point2::new(10.0, 0.0), 2.0).is_empty());
        assert!(circle_circle(Point2::new(0.0, 0.0), 5.0, Point2::new(1.0, 0.0), 1.0).is_empty());
        assert!(circle_circle(Point2::new(0.0, 0.0), 3.0, Point2::new(0.0, 0.0), 3.0).is_empty());
    }

    #[test]
    fn test_circle_circle_tangent() {
        let points = circle_circle(Point2::new(0.0, 0.0), 3.0, Point2::new(5.0, 0.0), 2.0);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 3.0);
        assert_relative_eq!(points[0].y, 0.0);
    }

    #[test]
    fn test_find_all_intersections_idempotent() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 10.0);
        let c = state.add_point(0.0, 10.0);
        let d = state.add_point(10.0, 0.0);
        state.add_segment_two_points(a, b).unwrap();
        state.add_segment_two_points(c, d).unwrap();

        let created = find_all_intersections(&mut state);
        assert_eq!(created.len(), 1);
        let p = state.point(created[0]).unwrap();
        assert_relative_eq!(p.x, 5.0);
        assert_relative_eq!(p.y, 5.0);

        // A second pass discovers nothing new
        assert!(find_all_intersections(&mut state).is_empty());
    }

    #[test]
    fn test_find_all_intersections_dedupes_within_pass() {
        let mut state = GeometryState::new();
        // Three concurrent segments through (5, 5) produce three candidate
        // intersections at the same spot; only one point may appear.
        let pairs = [
            ((0.0, 0.0), (10.0, 10.0)),
            ((0.0, 10.0), (10.0, 0.0)),
            ((0.0, 5.0), (10.0, 5.0)),
        ];
        for ((x1, y1), (x2, y2)) in pairs {
            let p1 = state.add_point(x1, y1);
            let p2 = state.add_point(x2, y2);
            state.add_segment_two_points(p1, p2).unwrap();
        }

        let created = find_all_intersections(&mut state);
        assert_eq!(created.len(), 1);
    }
}
