//! Tests for stream definitions and node sharing.

use std::sync::Arc;

use scoreforge_core::{ClassId, SimpleScore};

use super::collector::{count, sum};
use super::definition::{StreamDef, StreamKey, StreamOp};
use super::joiner::{cross, equal_shared};
use super::*;

const ITEM: ClassId = ClassId(0);
const OTHER: ClassId = ClassId(1);

type Factory = ConstraintFactory<Vec<i64>, SimpleScore>;

fn value_of(values: &Vec<i64>, v: &Value) -> i64 {
    v.as_fact().map_or(0, |f| values[f.index])
}

#[test]
fn test_for_each_is_shared_per_class() {
    let factory = Factory::new();
    let a = factory.for_each(ITEM);
    let b = factory.for_each(ITEM);
    let c = factory.for_each(OTHER);

    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
    assert_eq!(factory.stream_count(), 2);
}

#[test]
fn test_share_runs_initializer_once() {
    let factory = Factory::new();
    let mut runs = 0;

    let first = factory.with_inner(|inner| {
        inner.share(
            StreamDef::new(StreamKey::ForEach { class: ITEM }, StreamOp::ForEach { class: ITEM }),
            |_, _| runs += 1,
        )
    });
    let second = factory.with_inner(|inner| {
        inner.share(
            StreamDef::new(StreamKey::ForEach { class: ITEM }, StreamOp::ForEach { class: ITEM }),
            |_, _| runs += 1,
        )
    });

    assert_eq!(first, second);
    assert_eq!(runs, 1);
}

#[test]
fn test_children_are_attached_once() {
    let factory = Factory::new();
    let predicate: UniPredicate<Vec<i64>> = Arc::new(|s: &Vec<i64>, v: &Value| value_of(s, v) > 0);

    let a = factory.for_each(ITEM).filter_shared(Arc::clone(&predicate));
    let b = factory.for_each(ITEM).filter_shared(predicate);
    assert_eq!(a.id(), b.id());

    let source = factory.for_each(ITEM).id();
    factory.with_inner(|inner| {
        assert_eq!(inner.streams[source.0].children, vec![a.id()]);
    });
}

#[test]
fn test_distinct_closures_are_not_shared() {
    let factory = Factory::new();
    let a = factory.for_each(ITEM).filter(|s, v| value_of(s, v) > 0);
    let b = factory.for_each(ITEM).filter(|s, v| value_of(s, v) > 0);

    assert_ne!(a.id(), b.id());
    assert_eq!(factory.stream_count(), 3);
}

#[test]
fn test_filter_key_ignores_children() {
    let factory = Factory::new();
    let predicate: UniPredicate<Vec<i64>> = Arc::new(|s: &Vec<i64>, v: &Value| value_of(s, v) > 0);

    let positive = factory.for_each(ITEM).filter_shared(Arc::clone(&predicate));
    positive
        .penalize(SimpleScore::of(1))
        .as_constraint("Positive");
    let again = factory.for_each(ITEM).filter_shared(predicate);

    assert_eq!(positive.id(), again.id());
}

#[test]
fn test_join_keys_include_joiner() {
    let factory = Factory::new();
    let key: UniMapper<Vec<i64>> = Arc::new(|s: &Vec<i64>, v: &Value| Value::Int(value_of(s, v) % 2));

    let items = factory.for_each(ITEM);
    let a = items.join(items, equal_shared(Arc::clone(&key)));
    let b = items.join(items, equal_shared(key));
    let c = items.join(items, cross());

    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());

    // A self join lists the join once per side
    factory.with_inner(|inner| {
        let children = &inner.streams[items.id().0].children;
        assert_eq!(children.iter().filter(|&&c| c == a.id()).count(), 2);
    });
}

#[test]
fn test_if_exists_keys_include_mode() {
    let factory = Factory::new();
    let key: UniMapper<Vec<i64>> = Arc::new(|s: &Vec<i64>, v: &Value| Value::Int(value_of(s, v)));
    let items = factory.for_each(ITEM);
    let others = factory.for_each(OTHER);

    let present = items.if_exists(others, equal_shared(Arc::clone(&key)));
    let present_again = items.if_exists(others, equal_shared(Arc::clone(&key)));
    let absent = items.if_not_exists(others, equal_shared(key));

    assert_eq!(present.id(), present_again.id());
    assert_ne!(present.id(), absent.id());
    factory.with_inner(|inner| {
        assert_eq!(inner.streams[others.id().0].children, vec![present.id(), absent.id()]);
        assert!(matches!(
            inner.streams[absent.id().0].op,
            StreamOp::IfExists {
                mode: ExistenceMode::NotExists,
                ..
            }
        ));
    });
}

#[test]
fn test_group_by_key_includes_collector() {
    let factory = Factory::new();
    let key: UniMapper<Vec<i64>> = Arc::new(|_: &Vec<i64>, _: &Value| Value::None);
    let items = factory.for_each(ITEM);

    let counted = items.group_by_shared(Arc::clone(&key), count());
    let counted_again = items.group_by_shared(Arc::clone(&key), count());
    let summed = items.group_by_shared(key, sum(value_of));

    assert_eq!(counted.id(), counted_again.id());
    assert_ne!(counted.id(), summed.id());
}

#[test]
fn test_constraints_get_their_own_scoring_stream() {
    let factory = Factory::new();
    let first = factory
        .for_each(ITEM)
        .penalize(SimpleScore::of(1))
        .as_constraint("First");
    let second = factory
        .for_each(ITEM)
        .reward(SimpleScore::of(1))
        .in_package("pkg")
        .as_constraint("Second");

    assert_eq!(first.full_name(), "First");
    assert_eq!(second.full_name(), "pkg/Second");
    assert_eq!(factory.constraint_count(), 2);
    assert_eq!(factory.stream_count(), 3);

    let (streams, constraints) = factory.into_parts();
    assert_ne!(constraints[0].stream, constraints[1].stream);
    assert!(matches!(
        streams[constraints[1].stream.0].op,
        StreamOp::Scoring { constraint: 1, .. }
    ));
}

#[test]
fn test_value_conversions() {
    assert_eq!(Value::from(Some(3usize)), Value::Int(3));
    assert_eq!(Value::from(None::<usize>), Value::None);
    assert_eq!(Value::from("x").as_str(), Some("x"));
    assert_eq!(Value::from(true).as_bool(), Some(true));
    assert!(Value::default().is_none());
}
