// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pure geometry primitives
//!
//! Circumcircle, point-to-segment projection, and the angle conventions
//! shared by the constructors and the constraint residuals.
//!
//! Angles follow math convention on an inverted screen Y axis: 0 degrees
//! east, positive counter-clockwise as seen on screen, computed as
//! `atan2(-(y2 - y1), x2 - x1)`.

use nalgebra::{distance, Point2};
use planesolve_core::Point;

/// Determinant threshold below which three points count as collinear
const COLLINEAR_EPS: f64 = 1e-10;

/// Squared-length threshold below which a segment degenerates to a point
const DEGENERATE_EPS: f64 = 1e-6;

/// Coordinates of a stored point
#[inline]
pub fn point2(p: &Point) -> Point2<f64> {
    Point2::new(p.x, p.y)
}

/// Circumcircle through three points: `(center, radius)`
///
/// Returns `None` for collinear inputs.
pub fn circumcircle(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Option<(Point2<f64>, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < COLLINEAR_EPS {
        return None;
    }

    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;

    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;

    let center = Point2::new(ux, uy);
    Some((center, distance(&center, &a)))
}

/// Distance from a point to a segment, clamped to the endpoints
///
/// Degenerate segments fall back to the distance to the first endpoint.
pub fn point_segment_distance(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 < DEGENERATE_EPS {
        return distance(&p, &a);
    }

    let t = ((p - a).dot(&d) / len2).clamp(0.0, 1.0);
    let projection = a + d * t;
    distance(&p, &projection)
}

/// Direction angle of `a -> b` in degrees, math convention on screen
/// coordinates (0 east, positive counter-clockwise, Y inverted)
pub fn segment_angle_deg(a: Point2<f64>, b: Point2<f64>) -> f64 {
    (-(b.y - a.y)).atan2(b.x - a.x).to_degrees()
}

/// Wrap a degree difference into `(-180, 180]`
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Normalize an angle in radians into `[0, 2*pi)`
pub fn normalize_radians(angle: f64) -> f64 {
    angle.rem_euclid(std::f64::consts::TAU)
}

/// Shortest angular distance between two normalized angles, in `[0, pi]`
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(std::f64::consts::TAU);
    d.min(std::f64::consts::TAU - d)
}
