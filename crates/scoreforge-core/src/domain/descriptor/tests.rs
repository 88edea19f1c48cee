//! Tests for schema resolution and shadow linking.

use super::*;
use crate::domain::fact::{ClassId, FactRef};
use crate::domain::variable::{ShadowVariableKind, VariableType};
use crate::error::ScoreForgeError;

#[derive(Default)]
struct Plan {
    depots: usize,
    trucks: Vec<Vec<usize>>,
    stops: Vec<Option<usize>>,
    drivers: Vec<Option<usize>>,
}

fn get(p: &Plan, e: usize) -> Option<usize> {
    p.stops[e]
}

fn set(p: &mut Plan, e: usize, v: Option<usize>) {
    p.stops[e] = v;
}

fn base() -> SolutionDescriptorBuilder<Plan> {
    SolutionDescriptor::<Plan>::builder("Plan")
        .problem_fact_class("Depot", None, |p| p.depots)
        .abstract_class("Vehicle", None)
        .entity_class("Truck", Some("Vehicle"), |p| p.trucks.len())
        .entity_class("Stop", None, |p| p.stops.len())
        .basic_variable("Truck", "driver")
        .list_variable(
            "Vehicle",
            "stops",
            "Stop",
            |p, t| p.trucks[t].len(),
            |p, t, i| p.trucks[t][i],
        )
}

#[test]
fn test_class_ids_follow_registration_order() {
    let descriptor = base().build().unwrap();
    assert_eq!(descriptor.class_id("Depot"), Some(ClassId(0)));
    assert_eq!(descriptor.class_id("Stop"), Some(ClassId(3)));
    assert_eq!(descriptor.class_name(ClassId(2)), "Truck");
    assert_eq!(descriptor.class_name(ClassId(9)), "<unknown>");
}

#[test]
fn test_hierarchy() {
    let descriptor = base().build().unwrap();
    let vehicle = descriptor.class_id("Vehicle").unwrap();
    let truck = descriptor.class_id("Truck").unwrap();
    assert!(descriptor.is_assignable(vehicle, truck));
    assert!(!descriptor.is_assignable(truck, vehicle));
    assert_eq!(descriptor.ancestors(truck), vec![truck, vehicle]);
    assert!(descriptor.is_entity_class(truck));
    assert!(!descriptor.is_entity_class(vehicle));
}

#[test]
fn test_list_variable_inherited_by_subclass() {
    let descriptor = base().build().unwrap();
    let truck = descriptor.class_id("Truck").unwrap();
    let names: Vec<_> = descriptor.list_variables_of(truck).map(|v| v.name).collect();
    assert_eq!(names, vec!["stops"]);
    assert_eq!(descriptor.variable_type(truck, "stops"), Some(VariableType::List));
    assert_eq!(descriptor.variable_type(truck, "driver"), Some(VariableType::Basic));
    assert_eq!(descriptor.variable_type(truck, "missing"), None);
}

#[test]
fn test_for_each_fact_visits_concrete_classes() {
    let descriptor = base().build().unwrap();
    let plan = Plan {
        depots: 1,
        trucks: vec![vec![0], vec![]],
        stops: vec![None],
        drivers: vec![None, None],
    };
    let mut facts = Vec::new();
    descriptor.for_each_fact(&plan, |f| facts.push(f));
    assert_eq!(
        facts,
        vec![
            FactRef::new(ClassId(0), 0),
            FactRef::new(ClassId(2), 0),
            FactRef::new(ClassId(2), 1),
            FactRef::new(ClassId(3), 0),
        ]
    );
    assert_eq!(descriptor.fact_count(&plan), 4);
    assert_eq!(plan.drivers.len(), 2);
}

#[test]
fn test_next_element_shadow_links_to_source() {
    let descriptor = base()
        .next_element_shadow("Stop", "next", "Stop", "stops", get, set)
        .build()
        .unwrap();
    let shadow = &descriptor.shadow_variables()[0];
    assert_eq!(shadow.kind, ShadowVariableKind::NextElement);
    assert_eq!(shadow.source, descriptor.list_variables()[0].id);
    assert_eq!(descriptor.shadows_of(shadow.source).count(), 1);
}

#[test]
fn test_missing_source_variable() {
    let err = base()
        .previous_element_shadow("Stop", "previous", "Stop", "route", get, set)
        .build()
        .unwrap_err();
    assert!(matches!(err, ScoreForgeError::MissingSourceVariable { .. }));
}

#[test]
fn test_source_is_not_a_list_variable() {
    let err = base()
        .next_element_shadow("Stop", "next", "Stop", "driver", get, set)
        .build()
        .unwrap_err();
    assert!(matches!(err, ScoreForgeError::NotAListVariable { .. }));
}

#[test]
fn test_next_element_must_declare_element_class() {
    let err = base()
        .next_element_shadow("Stop", "next", "Truck", "stops", get, set)
        .build()
        .unwrap_err();
    match err {
        ScoreForgeError::ShadowTypeMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, "Stop");
            assert_eq!(actual, "Truck");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_inverse_relation_must_declare_owner_class() {
    assert!(base()
        .inverse_relation_shadow("Stop", "vehicle", "Vehicle", "stops", get, set)
        .build()
        .is_ok());
    let err = base()
        .inverse_relation_shadow("Stop", "vehicle", "Stop", "stops", get, set)
        .build()
        .unwrap_err();
    assert!(matches!(err, ScoreForgeError::ShadowTypeMismatch { .. }));
}

#[test]
fn test_shadow_must_live_on_elements() {
    let err = base()
        .index_shadow("Truck", "index", "stops", get, set)
        .build()
        .unwrap_err();
    assert!(matches!(err, ScoreForgeError::ShadowTypeMismatch { .. }));
}

#[test]
fn test_parent_must_be_registered_first() {
    let err = SolutionDescriptor::<Plan>::builder("Plan")
        .entity_class("Truck", Some("Vehicle"), |p| p.trucks.len())
        .abstract_class("Vehicle", None)
        .build()
        .unwrap_err();
    assert!(matches!(err, ScoreForgeError::Config(_)));
}

#[test]
fn test_duplicate_class_rejected() {
    let err = base()
        .entity_class("Stop", None, |p| p.stops.len())
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("registered twice"));
}
