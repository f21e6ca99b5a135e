// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document state - entity store, constructors, cascading delete
//!
//! One [`GeometryState`] per document. Constructors allocate ids, insert the
//! entity, and record the new id in the `children` of every referenced parent.
//! Deletion walks `children` depth-first before removing the entity itself,
//! so no dangling reference survives.
//!
//! The state is a plain value: cloning it produces an independent deep copy,
//! which is what the constraint validation path relies on.

use indexmap::map::Entry;

use crate::entity::{
    Arc, Circle, CircleKind, Constraint, ConstraintKind, EntityId, EntityMap, Measurement, Point,
    Segment, SegmentKind, Tool, Variable, VariableMap,
};
use crate::error::{Error, Result};
use crate::label::LabelAllocator;

/// In-memory state of one planar geometry document
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryState {
    pub points: EntityMap<Point>,
    pub segments: EntityMap<Segment>,
    pub circles: EntityMap<Circle>,
    pub arcs: EntityMap<Arc>,
    pub variables: VariableMap,
    /// Constraints in append order; this is the solver's residual order
    pub constraints: Vec<Constraint>,

    next_id: EntityId,
    labels: LabelAllocator,

    // UI-facing fields, stored for the host but inert for the solver
    pub active_tool: Tool,
    pub zoom: f64,
    pub offset: (f64, f64),
    pub selected: Vec<EntityId>,
    pub measure_history: Vec<Measurement>,
}

impl GeometryState {
    /// Create an empty document: tool `Select`, zoom 1, offset (0, 0)
    pub fn new() -> Self {
        Self {
            points: EntityMap::default(),
            segments: EntityMap::default(),
            circles: EntityMap::default(),
            arcs: EntityMap::default(),
            variables: VariableMap::default(),
            constraints: Vec::new(),
            next_id: 1,
            labels: LabelAllocator::new(),
            active_tool: Tool::Select,
            zoom: 1.0,
            offset: (0.0, 0.0),
            selected: Vec::new(),
            measure_history: Vec::new(),
        }
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn point(&self, id: EntityId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn segment(&self, id: EntityId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn circle(&self, id: EntityId) -> Option<&Circle> {
        self.circles.get(&id)
    }

    pub fn arc(&self, id: EntityId) -> Option<&Arc> {
        self.arcs.get(&id)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a point at `(x, y)` with the next label
    pub fn add_point(&mut self, x: f64, y: f64) -> EntityId {
        let id = self.alloc_id();
        let label = self.labels.next_label();
        self.points.insert(
            id,
            Point {
                id,
                x,
                y,
                label,
                children: Vec::new(),
                floating: false,
            },
        );
        id
    }

    /// Mark a point as adjustable (or not) by the solver
    pub fn set_floating(&mut self, id: EntityId, floating: bool) -> bool {
        match self.points.get_mut(&id) {
            Some(p) => {
                p.floating = floating;
                true
            }
            None => false,
        }
    }

    /// Create a segment; the general form used by all segment constructors
    ///
    /// Rejects identical endpoints and missing referents without touching
    /// the store.
    pub fn add_segment(
        &mut self,
        kind: SegmentKind,
        p1: EntityId,
        p2: EntityId,
        length: Option<f64>,
        angle: Option<f64>,
        ref_segment: Option<EntityId>,
    ) -> Result<EntityId> {
        if p1 == p2 {
            return Err(Error::DegenerateSegment);
        }
        if !self.points.contains_key(&p1) {
            return Err(Error::MissingEntity(p1));
        }
        if !self.points.contains_key(&p2) {
            return Err(Error::MissingEntity(p2));
        }
        if let Some(r) = ref_segment {
            if !self.segments.contains_key(&r) {
                return Err(Error::MissingEntity(r));
            }
        }

        let id = self.alloc_id();
        self.segments.insert(
            id,
            Segment {
                id,
                p1,
                p2,
                kind,
                length,
                angle,
                ref_segment,
                children: Vec::new(),
            },
        );
        self.link_child(p1, id);
        self.link_child(p2, id);
        if let Some(r) = ref_segment {
            self.link_child(r, id);
        }
        Ok(id)
    }

    /// Create a segment between two existing points
    pub fn add_segment_two_points(&mut self, p1: EntityId, p2: EntityId) -> Result<EntityId> {
        self.add_segment(SegmentKind::TwoPoints, p1, p2, None, None, None)
    }

    /// Create a circle; the general form used by all circle constructors
    pub fn add_circle(
        &mut self,
        kind: CircleKind,
        center: Option<EntityId>,
        radius: Option<f64>,
        points: Vec<EntityId>,
    ) -> Result<EntityId> {
        if let Some(c) = center {
            if !self.points.contains_key(&c) {
                return Err(Error::MissingEntity(c));
            }
        }
        for &p in &points {
            if !self.points.contains_key(&p) {
                return Err(Error::MissingEntity(p));
            }
        }

        let id = self.alloc_id();
        self.circles.insert(
            id,
            Circle {
                id,
                kind,
                center,
                radius,
                points: points.clone(),
                children: Vec::new(),
            },
        );
        if let Some(c) = center {
            self.link_child(c, id);
        }
        for p in points {
            self.link_child(p, id);
        }
        Ok(id)
    }

    /// Create a circle from a center point and a scalar radius
    pub fn add_circle_radius(&mut self, center: EntityId, radius: f64) -> Result<EntityId> {
        self.add_circle(CircleKind::Radius, Some(center), Some(radius), Vec::new())
    }

    /// Create an arc on a circle, counter-clockwise from `start` to `end`
    pub fn add_arc(&mut self, circle: EntityId, start: EntityId, end: EntityId) -> Result<EntityId> {
        if !self.circles.contains_key(&circle) {
            return Err(Error::MissingEntity(circle));
        }
        if !self.points.contains_key(&start) {
            return Err(Error::MissingEntity(start));
        }
        if !self.points.contains_key(&end) {
            return Err(Error::MissingEntity(end));
        }

        let id = self.alloc_id();
        self.arcs.insert(
            id,
            Arc {
                id,
                circle,
                start,
                end,
                children: Vec::new(),
            },
        );
        self.link_child(circle, id);
        self.link_child(start, id);
        self.link_child(end, id);
        Ok(id)
    }

    /// Declare a named variable; names are unique per document
    pub fn add_variable(
        &mut self,
        name: &str,
        value: Option<f64>,
        determined: bool,
    ) -> Result<&Variable> {
        match self.variables.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::DuplicateVariable(name.to_string())),
            Entry::Vacant(e) => Ok(e.insert(Variable {
                name: name.to_string(),
                value,
                determined,
            })),
        }
    }

    /// Append a constraint without validation
    ///
    /// The solving crate wraps this with a trial solve; direct appends are
    /// for hosts that already know the constraint is consistent.
    pub fn append_constraint(&mut self, kind: ConstraintKind) -> EntityId {
        let id = self.alloc_id();
        for referenced in kind.referenced_ids() {
            self.link_child(referenced, id);
        }
        self.constraints.push(Constraint { id, kind });
        id
    }

    // =========================================================================
    // Child links
    // =========================================================================

    fn link_child(&mut self, parent: EntityId, child: EntityId) {
        let children = if let Some(p) = self.points.get_mut(&parent) {
            &mut p.children
        } else if let Some(s) = self.segments.get_mut(&parent) {
            &mut s.children
        } else if let Some(c) = self.circles.get_mut(&parent) {
            &mut c.children
        } else if let Some(a) = self.arcs.get_mut(&parent) {
            &mut a.children
        } else {
            return;
        };

        if !children.contains(&child) {
            children.push(child);
        }
    }

    fn unlink_child(&mut self, parent: EntityId, child: EntityId) {
        let children = if let Some(p) = self.points.get_mut(&parent) {
            &mut p.children
        } else if let Some(s) = self.segments.get_mut(&parent) {
            &mut s.children
        } else if let Some(c) = self.circles.get_mut(&parent) {
            &mut c.children
        } else if let Some(a) = self.arcs.get_mut(&parent) {
            &mut a.children
        } else {
            return;
        };

        children.retain(|c| *c != child);
    }

    // =========================================================================
    // Cascading delete
    // =========================================================================

    /// Delete an entity and, transitively, everything constructed from it
    ///
    /// Children are deleted depth-first before the entity's own
    /// back-references are unlinked from its parents. Stale ids are a no-op.
    pub fn delete_entity(&mut self, id: EntityId) {
        if self.points.contains_key(&id) {
            self.delete_point(id);
        } else if self.segments.contains_key(&id) {
            self.delete_segment(id);
        } else if self.circles.contains_key(&id) {
            self.delete_circle(id);
        } else if self.arcs.contains_key(&id) {
            self.delete_arc(id);
        } else {
            self.delete_constraint(id);
        }
    }

    fn delete_point(&mut self, id: EntityId) {
        let children = match self.points.get(&id) {
            Some(p) => p.children.clone(),
            None => return,
        };
        for child in children {
            self.delete_entity(child);
        }
        self.points.shift_remove(&id);
    }

    fn delete_segment(&mut self, id: EntityId) {
        let seg = match self.segments.get(&id) {
            Some(s) => s.clone(),
            None => return,
        };
        for child in seg.children {
            self.delete_entity(child);
        }
        self.unlink_child(seg.p1, id);
        self.unlink_child(seg.p2, id);
        if let Some(r) = seg.ref_segment {
            self.unlink_child(r, id);
        }
        self.segments.shift_remove(&id);
    }

    fn delete_circle(&mut self, id: EntityId) {
        let circle = match self.circles.get(&id) {
            Some(c) => c.clone(),
            None => return,
        };
        for child in circle.children {
            self.delete_entity(child);
        }
        if let Some(center) = circle.center {
            self.unlink_child(center, id);
        }
        for p in circle.points {
            self.unlink_child(p, id);
        }
        self.circles.shift_remove(&id);
    }

    fn delete_arc(&mut self, id: EntityId) {
        let arc = match self.arcs.get(&id) {
            Some(a) => a.clone(),
            None => return,
        };
        for child in arc.children {
            self.delete_entity(child);
        }
        self.unlink_child(arc.circle, id);
        self.unlink_child(arc.start, id);
        self.unlink_child(arc.end, id);
        self.arcs.shift_remove(&id);
    }

    fn delete_constraint(&mut self, id: EntityId) {
        let kind = match self.constraints.iter().find(|c| c.id == id) {
            Some(c) => c.kind.clone(),
            None => return,
        };
        for referenced in kind.referenced_ids() {
            self.unlink_child(referenced, id);
        }
        self.constraints.retain(|c| c.id != id);
    }

    // =========================================================================
    // UI-facing fields
    // =========================================================================

    pub fn set_active_tool(&mut self, tool: Tool) {
        self.active_tool = tool;
    }

    pub fn add_to_measure_history(&mut self, label: impl Into<String>, value: f64) {
        self.measure_history.push(Measurement {
            label: label.into(),
            value,
        });
    }

    pub fn clear_measure_history(&mut self) {
        self.measure_history.clear();
    }
}

impl Default for GeometryState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every id referenced anywhere must resolve in the store
    fn assert_no_dangling(state: &GeometryState) {
        let resolves = |id: EntityId| {
            state.points.contains_key(&id)
                || state.segments.contains_key(&id)
                || state.circles.contains_key(&id)
                || state.arcs.contains_key(&id)
                || state.constraints.iter().any(|c| c.id == id)
        };

        for p in state.points.values() {
            assert!(p.children.iter().all(|&c| resolves(c)), "point {}", p.id);
        }
        for s in state.segments.values() {
            assert!(resolves(s.p1) && resolves(s.p2));
            assert!(s.ref_segment.map_or(true, resolves));
            assert!(s.children.iter().all(|&c| resolves(c)));
        }
        for c in state.circles.values() {
            assert!(c.center.map_or(true, resolves));
            assert!(c.points.iter().all(|&p| resolves(p)));
            assert!(c.children.iter().all(|&ch| resolves(ch)));
        }
        for a in state.arcs.values() {
            assert!(resolves(a.circle) && resolves(a.start) && resolves(a.end));
            assert!(a.children.iter().all(|&c| resolves(c)));
        }
        for c in &state.constraints {
            assert!(c.kind.referenced_ids().iter().all(|&r| resolves(r)));
        }
    }

    #[test]
    fn test_initial_state() {
        let state = GeometryState::new();
        assert!(state.points.is_empty());
        assert_eq!(state.active_tool, Tool::Select);
        assert_eq!(state.zoom, 1.0);
        assert_eq!(state.offset, (0.0, 0.0));
    }

    #[test]
    fn test_point_labels() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(1.0, 1.0);
        assert_eq!(state.point(a).unwrap().label, "A");
        assert_eq!(state.point(b).unwrap().label, "B");
    }

    #[test]
    fn test_segment_links_children() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 0.0);
        let seg = state.add_segment_two_points(a, b).unwrap();

        assert_eq!(state.point(a).unwrap().children, vec![seg]);
        assert_eq!(state.point(b).unwrap().children, vec![seg]);
        assert_no_dangling(&state);
    }

    #[test]
    fn test_segment_rejects_degenerate_and_missing() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);

        assert!(matches!(
            state.add_segment_two_points(a, a),
            Err(Error::DegenerateSegment)
        ));
        assert!(matches!(
            state.add_segment_two_points(a, 999),
            Err(Error::MissingEntity(999))
        ));
        // Rejected constructions leave no trace
        assert!(state.segments.is_empty());
        assert!(state.point(a).unwrap().children.is_empty());
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let mut state = GeometryState::new();
        state.add_variable("x", Some(1.0), true).unwrap();
        assert!(matches!(
            state.add_variable("x", Some(2.0), false),
            Err(Error::DuplicateVariable(_))
        ));
        assert_eq!(state.variable("x").unwrap().value, Some(1.0));
    }

    #[test]
    fn test_constraint_links_referenced_entities() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 0.0);
        let c = state.append_constraint(ConstraintKind::Distance {
            p1: a,
            p2: b,
            expression: "10".to_string(),
        });

        assert!(state.point(a).unwrap().children.contains(&c));
        assert!(state.point(b).unwrap().children.contains(&c));
    }

    #[test]
    fn test_cascading_delete() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(10.0, 0.0);
        let p = state.add_point(5.0, 5.0);
        let seg = state.add_segment_two_points(a, b).unwrap();
        state.append_constraint(ConstraintKind::PointOnSegment { point: p, segment: seg });

        // Deleting an endpoint takes the segment and its constraint with it
        state.delete_entity(a);

        assert!(state.point(a).is_none());
        assert!(state.segment(seg).is_none());
        assert!(state.constraints.is_empty());
        // Survivors are clean
        assert!(state.point(b).unwrap().children.is_empty());
        assert!(state.point(p).unwrap().children.is_empty());
        assert_no_dangling(&state);
    }

    #[test]
    fn test_delete_circle_keeps_center_point() {
        let mut state = GeometryState::new();
        let center = state.add_point(0.0, 0.0);
        let circle = state.add_circle_radius(center, 5.0).unwrap();
        let s = state.add_point(5.0, 0.0);
        let e = state.add_point(0.0, 5.0);
        let arc = state.add_arc(circle, s, e).unwrap();

        state.delete_entity(circle);

        assert!(state.circle(circle).is_none());
        assert!(state.arc(arc).is_none());
        assert!(state.point(center).is_some());
        assert!(state.point(center).unwrap().children.is_empty());
        assert_no_dangling(&state);
    }

    #[test]
    fn test_delete_stale_id_is_noop() {
        let mut state = GeometryState::new();
        state.add_point(0.0, 0.0);
        state.delete_entity(12345);
        state.delete_entity(12345);
        assert_eq!(state.points.len(), 1);
    }

    #[test]
    fn test_measure_history() {
        let mut state = GeometryState::new();
        state.add_to_measure_history("area", 25.0);
        state.add_to_measure_history("perimeter", 20.0);
        assert_eq!(state.measure_history.len(), 2);
        state.clear_measure_history();
        assert!(state.measure_history.is_empty());
    }
}
