// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for planesolve
//!
//! One document per [`SketchApi`] instance. Construction methods return the
//! new entity id, or `null` when a referent is missing; constraint methods
//! return `null` when the trial solve rejects the constraint. Failures are
//! mirrored to the browser console as warnings.

use planesolve_core::{ConstraintKind, GeometryState, Tool};
use planesolve_geometry::{construct, find_all_intersections, solver};
use wasm_bindgen::prelude::*;

use crate::utils::warn;

/// Main planesolve API
#[wasm_bindgen]
pub struct SketchApi {
    state: GeometryState,
}

impl Default for SketchApi {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SketchApi {
    /// Create an empty document
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        Self {
            state: GeometryState::new(),
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a point, returning its id
    #[wasm_bindgen(js_name = addPoint)]
    pub fn add_point(&mut self, x: f64, y: f64) -> u32 {
        self.state.add_point(x, y)
    }

    /// Mark a point as adjustable by the solver
    #[wasm_bindgen(js_name = setFloating)]
    pub fn set_floating(&mut self, id: u32, floating: bool) -> bool {
        self.state.set_floating(id, floating)
    }

    #[wasm_bindgen(js_name = addSegmentTwoPoints)]
    pub fn add_segment_two_points(&mut self, p1: u32, p2: u32) -> Option<u32> {
        let result = construct::add_segment_two_points(&mut self.state, p1, p2);
        self.report(result)
    }

    #[wasm_bindgen(js_name = addSegmentAbsAngle)]
    pub fn add_segment_abs_angle(&mut self, p1: u32, angle_deg: f64, length: f64) -> Option<u32> {
        let result = construct::add_segment_abs_angle(&mut self.state, p1, angle_deg, length);
        self.report(result)
    }

    #[wasm_bindgen(js_name = addSegmentRelAngle)]
    pub fn add_segment_rel_angle(
        &mut self,
        p1: u32,
        ref_segment: u32,
        offset_deg: f64,
        length: f64,
    ) -> Option<u32> {
        let result =
            construct::add_segment_rel_angle(&mut self.state, p1, ref_segment, offset_deg, length);
        self.report(result)
    }

    #[wasm_bindgen(js_name = addCircleRadius)]
    pub fn add_circle_radius(&mut self, center: u32, radius: f64) -> Option<u32> {
        let result = construct::add_circle_radius(&mut self.state, center, radius);
        self.report(result)
    }

    #[wasm_bindgen(js_name = addCircleCircumference)]
    pub fn add_circle_circumference(&mut self, center: u32, circum_point: u32) -> Option<u32> {
        let result = construct::add_circle_circumference(&mut self.state, center, circum_point);
        self.report(result)
    }

    #[wasm_bindgen(js_name = addCircleThreePoints)]
    pub fn add_circle_three_points(&mut self, p1: u32, p2: u32, p3: u32) -> Option<u32> {
        let result = construct::add_circle_three_points(&mut self.state, p1, p2, p3);
        self.report(result)
    }

    #[wasm_bindgen(js_name = addArc)]
    pub fn add_arc(&mut self, circle: u32, start: u32, end: u32) -> Option<u32> {
        let result = construct::add_arc(&mut self.state, circle, start, end);
        self.report(result)
    }

    /// Declare a named variable; `determined` variables are solved for
    #[wasm_bindgen(js_name = addVariable)]
    pub fn add_variable(&mut self, name: String, value: Option<f64>, determined: bool) -> bool {
        match self.state.add_variable(&name, value, determined) {
            Ok(_) => true,
            Err(e) => {
                warn(&format!("planesolve: {e}"));
                false
            }
        }
    }

    // =========================================================================
    // Constraints
    // =========================================================================

    #[wasm_bindgen(js_name = addDistanceConstraint)]
    pub fn add_distance_constraint(&mut self, p1: u32, p2: u32, expression: String) -> Option<u32> {
        self.add_constraint(ConstraintKind::Distance { p1, p2, expression })
    }

    #[wasm_bindgen(js_name = addAngleConstraint)]
    pub fn add_angle_constraint(&mut self, p1: u32, p2: u32, expression: String) -> Option<u32> {
        self.add_constraint(ConstraintKind::Angle { p1, p2, expression })
    }

    #[wasm_bindgen(js_name = addPointOnSegmentConstraint)]
    pub fn add_point_on_segment_constraint(&mut self, point: u32, segment: u32) -> Option<u32> {
        self.add_constraint(ConstraintKind::PointOnSegment { point, segment })
    }

    #[wasm_bindgen(js_name = addPointOnCircleConstraint)]
    pub fn add_point_on_circle_constraint(&mut self, point: u32, circle: u32) -> Option<u32> {
        self.add_constraint(ConstraintKind::PointOnCircle { point, circle })
    }

    #[wasm_bindgen(js_name = addPointOnArcConstraint)]
    pub fn add_point_on_arc_constraint(&mut self, point: u32, arc: u32) -> Option<u32> {
        self.add_constraint(ConstraintKind::PointOnArc { point, arc })
    }

    #[wasm_bindgen(js_name = addEquationConstraint)]
    pub fn add_equation_constraint(&mut self, expression: String) -> Option<u32> {
        self.add_constraint(ConstraintKind::Equation { expression })
    }

    // =========================================================================
    // Solver and derived geometry
    // =========================================================================

    /// Run the solver; returns `{success, iterations, finalError}`
    #[wasm_bindgen]
    pub fn solve(&mut self) -> JsValue {
        let report = solver::solve(&mut self.state);
        serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
    }

    /// Synthesize intersection points; returns the new point ids
    #[wasm_bindgen(js_name = findAllIntersections)]
    pub fn find_all_intersections(&mut self) -> Vec<u32> {
        find_all_intersections(&mut self.state)
    }

    /// Delete an entity and everything constructed from it
    #[wasm_bindgen(js_name = deleteEntity)]
    pub fn delete_entity(&mut self, id: u32) {
        self.state.delete_entity(id);
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    #[wasm_bindgen(js_name = validateExpression)]
    pub fn validate_expression(&self, expression: String) -> bool {
        planesolve_core::validate_expression(&expression)
    }

    /// Evaluate against the document's variables; `null` when unresolved
    #[wasm_bindgen(js_name = evaluateExpression)]
    pub fn evaluate_expression(&self, expression: String) -> Option<f64> {
        planesolve_core::evaluate_expression(&expression, &self.state.variables)
    }

    #[wasm_bindgen(js_name = extractVariableNames)]
    pub fn extract_variable_names(&self, expression: String) -> Vec<String> {
        planesolve_core::extract_variable_names(&expression)
    }

    // =========================================================================
    // UI-facing state
    // =========================================================================

    /// Switch the active tool by name; unknown names are ignored
    #[wasm_bindgen(js_name = setActiveTool)]
    pub fn set_active_tool(&mut self, name: String) -> bool {
        match Tool::from_name(&name) {
            Some(tool) => {
                self.state.set_active_tool(tool);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = addToMeasureHistory)]
    pub fn add_to_measure_history(&mut self, label: String, value: f64) {
        self.state.add_to_measure_history(label, value);
    }

    #[wasm_bindgen(js_name = clearMeasureHistory)]
    pub fn clear_measure_history(&mut self) {
        self.state.clear_measure_history();
    }

    /// Serialize the whole document for the host
    #[wasm_bindgen]
    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.state).unwrap_or(JsValue::NULL)
    }
}

impl SketchApi {
    fn add_constraint(&mut self, kind: ConstraintKind) -> Option<u32> {
        let added = solver::add_constraint(&mut self.state, kind);
        if added.is_none() {
            warn("planesolve: constraint rejected, trial solve did not converge");
        }
        added
    }

    fn report(&self, result: planesolve_geometry::Result<u32>) -> Option<u32> {
        match result {
            Ok(id) => Some(id),
            Err(e) => {
                warn(&format!("planesolve: {e}"));
                None
            }
        }
    }
}
