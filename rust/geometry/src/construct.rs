// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction operations
//!
//! Document-level constructors for segments, circles and arcs. Each wraps
//! the store-level constructor from `planesolve-core`, materializes any
//! derived points (angle-segment far endpoints, three-point circle centers),
//! and finishes with one intersection-synthesis pass over the document.
//!
//! Bare points and variables cannot create intersections; add those
//! directly on [`GeometryState`].

use nalgebra::{distance, Point2};
use planesolve_core::{CircleKind, EntityId, GeometryState, SegmentKind};

use crate::error::{Error, Result};
use crate::intersect::find_all_intersections;
use crate::primitives::{circumcircle, point2, segment_angle_deg};

fn point_coords(state: &GeometryState, id: EntityId) -> Result<Point2<f64>> {
    state
        .point(id)
        .map(point2)
        .ok_or(Error::MissingEntity(id))
}

/// Far endpoint of an angle-constructed segment
///
/// The Y negation embodies the screen inversion: positive angles run
/// counter-clockwise as seen on screen.
fn far_point(start: Point2<f64>, angle_deg: f64, length: f64) -> Point2<f64> {
    let rad = angle_deg.to_radians();
    Point2::new(start.x + length * rad.cos(), start.y - length * rad.sin())
}

/// Create a segment between two existing points
pub fn add_segment_two_points(
    state: &mut GeometryState,
    p1: EntityId,
    p2: EntityId,
) -> Result<EntityId> {
    let id = state.add_segment_two_points(p1, p2)?;
    find_all_intersections(state);
    Ok(id)
}

/// Create a segment from a start point at an absolute angle (degrees, math
/// convention) and length, materializing the far endpoint
pub fn add_segment_abs_angle(
    state: &mut GeometryState,
    p1: EntityId,
    angle_deg: f64,
    length: f64,
) -> Result<EntityId> {
    let start = point_coords(state, p1)?;
    let far = far_point(start, angle_deg, length);
    let far_id = state.add_point(far.x, far.y);

    let id = state.add_segment(
        SegmentKind::AbsAngle,
        p1,
        far_id,
        Some(length),
        Some(angle_deg),
        None,
    )?;
    find_all_intersections(state);
    Ok(id)
}

/// Create a segment at an angle relative to a reference segment's current
/// direction, materializing the far endpoint
pub fn add_segment_rel_angle(
    state: &mut GeometryState,
    p1: EntityId,
    ref_segment: EntityId,
    offset_deg: f64,
    length: f64,
) -> Result<EntityId> {
    let reference = state
        .segment(ref_segment)
        .ok_or(Error::MissingEntity(ref_segment))?;
    let ref_a = point_coords(state, reference.p1)?;
    let ref_b = point_coords(state, reference.p2)?;
    let angle_deg = segment_angle_deg(ref_a, ref_b) + offset_deg;

    let start = point_coords(state, p1)?;
    let far = far_point(start, angle_deg, length);
    let far_id = state.add_point(far.x, far.y);

    let id = state.add_segment(
        SegmentKind::RelAngle,
        p1,
        far_id,
        Some(length),
        Some(offset_deg),
        Some(ref_segment),
    )?;
    find_all_intersections(state);
    Ok(id)
}

/// Create a circle from a center point and a scalar radius
pub fn add_circle_radius(
    state: &mut GeometryState,
    center: EntityId,
    radius: f64,
) -> Result<EntityId> {
    let id = state.add_circle_radius(center, radius)?;
    find_all_intersections(state);
    Ok(id)
}

/// Create a circle from a center point through a circumference point
///
/// The radius is frozen at the construction-time distance; the circle does
/// not follow the circumference point afterwards.
pub fn add_circle_circumference(
    state: &mut GeometryState,
    center: EntityId,
    circum_point: EntityId,
) -> Result<EntityId> {
    let c = point_coords(state, center)?;
    let p = point_coords(state, circum_point)?;
    let radius = distance(&c, &p);

    let id = state.add_circle(
        CircleKind::Radius,
        Some(center),
        Some(radius),
        vec![circum_point],
    )?;
    find_all_intersections(state);
    Ok(id)
}

/// Create the circumcircle of three points, materializing its center
///
/// The center point gets the next label and id like any other point. The
/// radius is frozen at construction.
pub fn add_circle_three_points(
    state: &mut GeometryState,
    p1: EntityId,
    p2: EntityId,
    p3: EntityId,
) -> Result<EntityId> {
    let a = point_coords(state, p1)?;
    let b = point_coords(state, p2)?;
    let c = point_coords(state, p3)?;

    let (center, radius) = circumcircle(a, b, c).ok_or(Error::CollinearPoints)?;
    let center_id = state.add_point(center.x, center.y);

    let id = state.add_circle(
        CircleKind::ThreePoints,
        Some(center_id),
        Some(radius),
        vec![p1, p2, p3],
    )?;
    find_all_intersections(state);
    Ok(id)
}

/// Create an arc on a circle, counter-clockwise from `start` to `end`
pub fn add_arc(
    state: &mut GeometryState,
    circle: EntityId,
    start: EntityId,
    end: EntityId,
) -> Result<EntityId> {
    let id = state.add_arc(circle, start, end)?;
    find_all_intersections(state);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_abs_angle_places_far_endpoint() {
        let mut state = GeometryState::new();
        let p1 = state.add_point(0.0, 0.0);
        let seg = add_segment_abs_angle(&mut state, p1, 90.0, 10.0).unwrap();

        let segment = state.segment(seg).unwrap();
        let far = state.point(segment.p2).unwrap();
        // 90 degrees is screen up: negative Y
        assert_relative_eq!(far.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(far.y, -10.0, epsilon = 1e-9);
        assert_eq!(segment.length, Some(10.0));
        assert_eq!(segment.angle, Some(90.0));
    }

    #[test]
    fn test_rel_angle_follows_reference() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(0.0, -10.0);
        // Reference points screen-up, 90 degrees
        let reference = add_segment_two_points(&mut state, a, b).unwrap();

        let seg = add_segment_rel_angle(&mut state, a, reference, 90.0, 5.0).unwrap();
        let segment = state.segment(seg).unwrap();
        assert_eq!(segment.ref_segment, Some(reference));
        assert_eq!(segment.angle, Some(90.0));

        // 90 + 90 = 180 degrees: screen left
        let far = state.point(segment.p2).unwrap();
        assert_relative_eq!(far.x, -5.0, epsilon = 1e-9);
        assert_relative_eq!(far.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circumference_circle_freezes_radius() {
        let mut state = GeometryState::new();
        let center = state.add_point(0.0, 0.0);
        let rim = state.add_point(3.0, 4.0);
        let circle = add_circle_circumference(&mut state, center, rim).unwrap();

        let c = state.circle(circle).unwrap();
        assert_eq!(c.kind, CircleKind::Radius);
        assert_eq!(c.points, vec![rim]);
        assert_relative_eq!(c.radius.unwrap(), 5.0);

        // Moving the rim point afterwards leaves the radius alone
        state.points.get_mut(&rim).unwrap().x = 30.0;
        assert_relative_eq!(state.circle(circle).unwrap().radius.unwrap(), 5.0);
    }

    #[test]
    fn test_three_point_circle_materializes_center() {
        let mut state = GeometryState::new();
        let p1 = state.add_point(0.0, 0.0);
        let p2 = state.add_point(4.0, 0.0);
        let p3 = state.add_point(0.0, 3.0);
        let circle = add_circle_three_points(&mut state, p1, p2, p3).unwrap();

        let c = state.circle(circle).unwrap();
        assert_eq!(c.kind, CircleKind::ThreePoints);
        assert_relative_eq!(c.radius.unwrap(), 2.5);

        let center = state.point(c.center.unwrap()).unwrap();
        assert_relative_eq!(center.x, 2.0);
        assert_relative_eq!(center.y, 1.5);
        // Center was labeled after the three inputs
        assert_eq!(center.label, "D");
        // The circle is a child of its materialized center
        assert!(center.children.contains(&circle));
    }

    #[test]
    fn test_three_point_circle_rejects_collinear() {
        let mut state = GeometryState::new();
        let p1 = state.add_point(0.0, 0.0);
        let p2 = state.add_point(5.0, 0.0);
        let p3 = state.add_point(10.0, 0.0);

        assert!(matches!(
            add_circle_three_points(&mut state, p1, p2, p3),
            Err(Error::CollinearPoints)
        ));
        assert!(state.circles.is_empty());
    }

    #[test]
    fn test_add_arc_links_children() {
        let mut state = GeometryState::new();
        let center = state.add_point(0.0, 0.0);
        let circle = add_circle_radius(&mut state, center, 5.0).unwrap();
        let start = state.add_point(5.0, 0.0);
        let end = state.add_point(0.0, 5.0);
        let arc = add_arc(&mut state, circle, start, end).unwrap();

        let stored = state.arc(arc).unwrap();
        assert_eq!(
            (stored.circle, stored.start, stored.end),
            (circle, start, end)
        );
        assert!(state.circle(circle).unwrap().children.contains(&arc));
        assert!(state.point(start).unwrap().children.contains(&arc));
        assert!(state.point(end).unwrap().children.contains(&arc));
    }

    #[test]
    fn test_add_arc_rejects_missing_referent() {
        let mut state = GeometryState::new();
        let center = state.add_point(0.0, 0.0);
        let circle = add_circle_radius(&mut state, center, 5.0).unwrap();
        let start = state.add_point(5.0, 0.0);

        assert!(add_arc(&mut state, circle, start, 999).is_err());
        assert!(add_arc(&mut state, 999, start, center).is_err());
        assert!(state.arcs.is_empty());
        assert!(state.point(start).unwrap().children.is_empty());
    }

    #[test]
    fn test_construction_synthesizes_intersections() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 10.0);
        let c = state.add_point(0.0, 10.0);
        let d = state.add_point(10.0, 0.0);
        add_segment_two_points(&mut state, a, b).unwrap();
        assert_eq!(state.points.len(), 4);

        // The second segment crosses the first; the pass adds the crossing
        add_segment_two_points(&mut state, c, d).unwrap();
        assert_eq!(state.points.len(), 5);

        let crossing = state.points.values().last().unwrap();
        assert_relative_eq!(crossing.x, 5.0);
        assert_relative_eq!(crossing.y, 5.0);
        assert_eq!(crossing.label, "E");
    }
}
