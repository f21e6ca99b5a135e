// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Solver parameterization
//!
//! The free parameters of a document, in a fixed order: `x` then `y` of
//! every floating point in creation order, then every determined variable
//! in declaration order. The template records each slot's identity so the
//! same vector layout survives entity deletion (stale slots are skipped on
//! application).

use planesolve_core::{EntityId, GeometryState};

/// Identity of one slot in the parameter vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSlot {
    /// X coordinate of a floating point
    PointX(EntityId),
    /// Y coordinate of a floating point
    PointY(EntityId),
    /// Value of a determined variable
    Variable(String),
}

/// Snapshot the free parameters: `(template, values)`
pub fn extract_free_params(state: &GeometryState) -> (Vec<ParamSlot>, Vec<f64>) {
    let mut template = Vec::new();
    let mut values = Vec::new();

    for p in state.points.values().filter(|p| p.floating) {
        template.push(ParamSlot::PointX(p.id));
        values.push(p.x);
        template.push(ParamSlot::PointY(p.id));
        values.push(p.y);
    }

    for v in state.variables.values().filter(|v| v.determined) {
        template.push(ParamSlot::Variable(v.name.clone()));
        values.push(v.value.unwrap_or(0.0));
    }

    (template, values)
}

/// Write a parameter vector back into the document
///
/// Slots whose point or variable no longer exists are silently skipped.
pub fn apply_params(state: &mut GeometryState, template: &[ParamSlot], values: &[f64]) {
    for (slot, &value) in template.iter().zip(values) {
        match slot {
            ParamSlot::PointX(id) => {
                if let Some(p) = state.points.get_mut(id) {
                    p.x = value;
                }
            }
            ParamSlot::PointY(id) => {
                if let Some(p) = state.points.get_mut(id) {
                    p.y = value;
                }
            }
            ParamSlot::Variable(name) => {
                if let Some(v) = state.variables.get_mut(name) {
                    v.value = Some(value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_order() {
        let mut state = GeometryState::new();
        let a = state.add_point(1.0, 2.0);
        let b = state.add_point(3.0, 4.0);
        state.set_floating(a, true);
        state.set_floating(b, true);
        state.add_variable("pinned", Some(9.0), false).unwrap();
        state.add_variable("auto", Some(5.0), true).unwrap();

        let (template, values) = extract_free_params(&state);
        assert_eq!(
            template,
            vec![
                ParamSlot::PointX(a),
                ParamSlot::PointY(a),
                ParamSlot::PointX(b),
                ParamSlot::PointY(b),
                ParamSlot::Variable("auto".to_string()),
            ]
        );
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_fixed_entities_excluded() {
        let mut state = GeometryState::new();
        state.add_point(1.0, 2.0);
        state.add_variable("pinned", Some(9.0), false).unwrap();

        let (template, _) = extract_free_params(&state);
        assert!(template.is_empty());
    }

    #[test]
    fn test_apply_round_trip() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        state.set_floating(a, true);
        state.add_variable("auto", None, true).unwrap();

        let (template, _) = extract_free_params(&state);
        apply_params(&mut state, &template, &[7.0, 8.0, 9.0]);

        let p = state.point(a).unwrap();
        assert_eq!((p.x, p.y), (7.0, 8.0));
        assert_eq!(state.variable("auto").unwrap().value, Some(9.0));
    }

    #[test]
    fn test_stale_slots_skipped() {
        let mut state = GeometryState::new();
        let a = state.add_point(0.0, 0.0);
        let b = state.add_point(1.0, 1.0);
        state.set_floating(a, true);
        state.set_floating(b, true);

        let (template, values) = extract_free_params(&state);
        state.delete_entity(a);
        apply_params(&mut state, &template, &values);

        // The survivor still gets its slots
        let p = state.point(b).unwrap();
        assert_eq!((p.x, p.y), (1.0, 1.0));
    }
}
