// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity data model
//!
//! Every entity carries a stable [`EntityId`] from the document's monotonic
//! allocator. Cross-references are always ids, never indices or pointers, so
//! cascading delete and trial cloning stay straightforward.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

/// Stable opaque entity identifier
pub type EntityId = u32;

/// Insertion-ordered entity store keyed by id
///
/// Insertion order is creation order; iteration over the store is therefore
/// deterministic, which fixes the solver's parameter layout and the label
/// order of synthesized intersection points.
pub type EntityMap<T> = IndexMap<EntityId, T, BuildHasherDefault<FxHasher>>;

/// Insertion-ordered variable store keyed by name
pub type VariableMap = IndexMap<String, Variable, BuildHasherDefault<FxHasher>>;

/// A planar point
///
/// `floating` points are the solver's positional degrees of freedom; all
/// other points only move through explicit construction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    /// Display label assigned at creation (`A`, `B`, .., `Z`, `A1`, ..)
    pub label: String,
    /// Ids of entities whose construction referenced this point
    pub children: Vec<EntityId>,
    /// Whether the solver may move this point
    pub floating: bool,
}

/// How a segment was constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    /// Between two existing points
    TwoPoints,
    /// From a start point at an absolute angle and length
    AbsAngle,
    /// From a start point at an angle relative to a reference segment
    RelAngle,
}

/// A line segment between two points
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub id: EntityId,
    pub p1: EntityId,
    pub p2: EntityId,
    pub kind: SegmentKind,
    /// Construction length for the angle-based kinds
    pub length: Option<f64>,
    /// Construction angle in degrees (math convention); for [`SegmentKind::RelAngle`]
    /// this is the offset against the reference segment
    pub angle: Option<f64>,
    /// Reference segment for [`SegmentKind::RelAngle`]
    pub ref_segment: Option<EntityId>,
    pub children: Vec<EntityId>,
}

/// How a circle was constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CircleKind {
    /// Center point plus a scalar radius
    Radius,
    /// Through three points, with a materialized center
    ThreePoints,
}

/// A circle
///
/// The radius is frozen at construction time for every kind; moving the
/// center or the defining points later does not recompute it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    pub id: EntityId,
    pub kind: CircleKind,
    pub center: Option<EntityId>,
    pub radius: Option<f64>,
    /// Defining points: one circumference point for [`CircleKind::Radius`]
    /// circles built through a point, three for [`CircleKind::ThreePoints`]
    pub points: Vec<EntityId>,
    pub children: Vec<EntityId>,
}

/// A circular arc, counter-clockwise from `start` to `end` around the
/// parent circle's center
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    pub id: EntityId,
    pub circle: EntityId,
    pub start: EntityId,
    pub end: EntityId,
    pub children: Vec<EntityId>,
}

/// A named numeric variable usable in constraint expressions
///
/// `determined` variables are the solver's scalar degrees of freedom; the
/// host shows them as "auto". A `None` value evaluates to unresolved.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub name: String,
    pub value: Option<f64>,
    pub determined: bool,
}

/// Constraint payload, one variant per constraint kind
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// Euclidean distance between two points equals an expression
    Distance {
        p1: EntityId,
        p2: EntityId,
        expression: String,
    },
    /// Direction angle of `p1 -> p2` (degrees) equals an expression
    Angle {
        p1: EntityId,
        p2: EntityId,
        expression: String,
    },
    /// A point lies on a segment (clamped to the endpoints)
    PointOnSegment { point: EntityId, segment: EntityId },
    /// A point lies on a circle
    PointOnCircle { point: EntityId, circle: EntityId },
    /// A point lies on an arc
    PointOnArc { point: EntityId, arc: EntityId },
    /// An expression over variables equals zero
    Equation { expression: String },
}

impl ConstraintKind {
    /// Ids of every entity this constraint references
    pub fn referenced_ids(&self) -> Vec<EntityId> {
        match self {
            Self::Distance { p1, p2, .. } | Self::Angle { p1, p2, .. } => vec![*p1, *p2],
            Self::PointOnSegment { point, segment } => vec![*point, *segment],
            Self::PointOnCircle { point, circle } => vec![*point, *circle],
            Self::PointOnArc { point, arc } => vec![*point, *arc],
            Self::Equation { .. } => Vec::new(),
        }
    }
}

/// A constraint with its store identity
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    pub id: EntityId,
    pub kind: ConstraintKind,
}

/// Interactive tool the host currently has active
///
/// The kernel only stores this for the host; it has no effect on solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tool {
    #[default]
    Select,
    Point,
    Segment,
    Circle,
    Arc,
    Measure,
}

impl Tool {
    /// Parse a tool from its host-facing name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(Self::Select),
            "point" => Some(Self::Point),
            "segment" => Some(Self::Segment),
            "circle" => Some(Self::Circle),
            "arc" => Some(Self::Arc),
            "measure" => Some(Self::Measure),
            _ => None,
        }
    }
}

/// One entry of the host's measurement history
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub label: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_ids() {
        let c = ConstraintKind::Distance {
            p1: 1,
            p2: 2,
            expression: "10".to_string(),
        };
        assert_eq!(c.referenced_ids(), vec![1, 2]);

        let e = ConstraintKind::Equation {
            expression: "x - 1".to_string(),
        };
        assert!(e.referenced_ids().is_empty());
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(Tool::from_name("select"), Some(Tool::Select));
        assert_eq!(Tool::from_name("arc"), Some(Tool::Arc));
        assert_eq!(Tool::from_name("extrude"), None);
    }
}
