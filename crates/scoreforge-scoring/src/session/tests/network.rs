use scoreforge_core::score::{HardSoftScore, InitScore};
use scoreforge_core::PlanningSolution;
use scoreforge_core::{ClassId, FactRef, ScoreForgeError};
use scoreforge_test::schedule::{Schedule, CONTRACTOR, EMPLOYEE, PERSON, SHIFT};

use super::*;
use crate::stream::collector::sum;

#[test]
fn test_subclass_facts_reach_every_accepting_source() {
    let sessions = ConstraintSessionFactory::<Schedule, HardSoftScore>::from_provider(|factory| {
        factory
            .for_each(PERSON)
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Each person");
        factory
            .for_each(EMPLOYEE)
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Each employee");
    })
    .unwrap();
    let schedule = Schedule::new(&["ann", "bob"], &[]).with_contractors(&["cid"]);
    let mut session = loaded_session(&sessions, &schedule, false);

    assert_eq!(session.source_count(), 2);
    assert_eq!(session.source_fact_count(PERSON), 3);
    assert_eq!(session.source_fact_count(EMPLOYEE), 2);
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-5)
    );

    session.retract(FactRef::new(CONTRACTOR, 0)).unwrap();
    session.retract(FactRef::new(EMPLOYEE, 1)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-2)
    );
}

#[test]
fn test_facts_without_source_are_ignored() {
    let sessions = schedule_sessions();
    let schedule = overbooked();
    let mut session = loaded_session(&sessions, &schedule, false);
    let before = session.calculate_score(&schedule, 0);

    assert!(!session.has_source(EMPLOYEE));
    session.insert(FactRef::new(EMPLOYEE, 7)).unwrap();
    session.update(FactRef::new(EMPLOYEE, 7)).unwrap();
    session.insert(FactRef::new(ClassId(99), 0)).unwrap();
    session.retract(FactRef::new(ClassId(99), 0)).unwrap();

    assert_eq!(session.calculate_score(&schedule, 0), before);
}

#[test]
fn test_invalid_fact_lifecycle_is_rejected() {
    let sessions = schedule_sessions();
    let schedule = overbooked();
    let mut session = loaded_session(&sessions, &schedule, false);

    assert!(matches!(
        session.insert(shift_ref(0)),
        Err(ScoreForgeError::InvalidState(_))
    ));
    assert!(matches!(
        session.update(shift_ref(42)),
        Err(ScoreForgeError::InvalidState(_))
    ));

    session.retract(shift_ref(1)).unwrap();
    assert!(matches!(
        session.retract(shift_ref(1)),
        Err(ScoreForgeError::InvalidState(_))
    ));
    assert!(matches!(
        session.update(shift_ref(1)),
        Err(ScoreForgeError::InvalidState(_))
    ));
}

#[test]
fn test_insert_then_retract_before_flush_has_no_effect() {
    let sessions = schedule_sessions();
    let schedule = overbooked();
    let descriptor = schedule_descriptor();
    let mut session = sessions.build_session(&descriptor, &schedule, true).unwrap();

    session.insert(shift_ref(0)).unwrap();
    session.insert(shift_ref(1)).unwrap();
    session.retract(shift_ref(1)).unwrap();

    // ann has one shift
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::ZERO
    );
    assert!(session.constraint_match_total_map().is_empty());
    assert_eq!(session.source_fact_count(SHIFT), 1);
}

#[test]
fn test_self_cross_join_pairs_every_fact() {
    let sessions = ConstraintSessionFactory::<Schedule, HardSoftScore>::from_provider(|factory| {
        factory
            .for_each(SHIFT)
            .join(factory.for_each(SHIFT), joiner::cross())
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Every pair");
    })
    .unwrap();
    let schedule = Schedule::new(&["ann"], &[0, 1, 2]);
    let mut session = loaded_session(&sessions, &schedule, false);

    // (a, a) included
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-9)
    );

    session.retract(shift_ref(2)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-4)
    );

    session.update(shift_ref(0)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-4)
    );
}

#[test]
fn test_join_between_distinct_classes() {
    // Shifts on a day equal to an employee's index.
    let sessions = ConstraintSessionFactory::<Schedule, HardSoftScore>::from_provider(|factory| {
        factory
            .for_each(SHIFT)
            .join(
                factory.for_each(EMPLOYEE),
                joiner::equal_bi(
                    |s: &Schedule, v: &Value| Value::Int(day_of(s, v)),
                    |_: &Schedule, v: &Value| v.as_fact().map_or(Value::None, |f| f.index.into()),
                ),
            )
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Day of employee");
    })
    .unwrap();
    let mut schedule = Schedule::new(&["ann", "bob"], &[0, 1, 1, 5]);
    let mut session = loaded_session(&sessions, &schedule, false);

    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-3)
    );

    schedule.shifts[3].day = 0;
    session.update(shift_ref(3)).unwrap();
    schedule.shifts[1].day = 4;
    session.update(shift_ref(1)).unwrap();
    session.retract(FactRef::new(EMPLOYEE, 0)).unwrap();

    // Only shift 2 (day 1, bob) is left.
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-1)
    );
}

#[test]
fn test_map_recomputes_on_update() {
    let sessions = ConstraintSessionFactory::<Schedule, HardSoftScore>::from_provider(|factory| {
        factory
            .for_each(SHIFT)
            .map(|s, v| Value::Int(day_of(s, v)))
            .penalize_with(HardSoftScore::ONE_SOFT, |_, day| day.as_int().unwrap_or(0))
            .as_constraint("Late shifts");
    })
    .unwrap();
    let mut schedule = Schedule::new(&["ann"], &[0, 0, 1, 1, 2]);
    let mut session = loaded_session(&sessions, &schedule, false);

    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-4)
    );

    schedule.shifts[4].day = 5;
    session.update(shift_ref(4)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-7)
    );
}

#[test]
fn test_group_sum_follows_members() {
    // Sum of the days worked by each employee.
    let sessions = ConstraintSessionFactory::<Schedule, HardSoftScore>::from_provider(|factory| {
        factory
            .for_each(SHIFT)
            .filter(|s, v| !employee_of(s, v).is_none())
            .group_by(employee_of, sum(day_of))
            .penalize_with(HardSoftScore::ONE_SOFT, |_, _, days| days.as_int().unwrap_or(0))
            .as_constraint("Days worked");
    })
    .unwrap();
    let mut schedule = Schedule::new(&["ann", "bob"], &[1, 2, 3])
        .assign(0, 0)
        .assign(1, 0)
        .assign(2, 1);
    let mut session = loaded_session(&sessions, &schedule, true);

    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-6)
    );
    assert_eq!(session.constraint_match_total_map()["Days worked"].match_count(), 2);

    // Moving shift 1 to bob changes both groups.
    schedule.shifts[1].employee = Some(1);
    session.update(shift_ref(1)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-6)
    );
    let matches: Vec<Vec<Value>> = session.constraint_match_total_map()["Days worked"]
        .matches()
        .map(|m| m.justification.clone())
        .collect();
    assert!(matches.contains(&vec![Value::Int(0), Value::Int(1)]));
    assert!(matches.contains(&vec![Value::Int(1), Value::Int(5)]));

    // Emptying a group retracts it.
    schedule.shifts[0].employee = None;
    session.update(shift_ref(0)).unwrap();
    session.calculate_score(&schedule, 0);
    assert_eq!(session.constraint_match_total_map()["Days worked"].match_count(), 1);
}

#[test]
fn test_filter_follows_updates() {
    let sessions = schedule_sessions();
    let mut schedule = Schedule::new(&["ann"], &[0, 1]);
    let mut session = loaded_session(&sessions, &schedule, false);

    assert_eq!(
        session.calculate_score(&schedule, schedule.init_score()),
        InitScore::of(-2, HardSoftScore::of_soft(-2))
    );

    schedule.shifts[0].employee = Some(0);
    session.update(shift_ref(0)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-1)
    );

    schedule.shifts[0].employee = None;
    session.update(shift_ref(0)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of_soft(-2)
    );
}

fn employee_index(_: &Schedule, v: &Value) -> Value {
    v.as_fact().map_or(Value::None, |f| f.index.into())
}

/// Busy employee (1soft each), idle employee (1hard each).
fn workload_sessions() -> ConstraintSessionFactory<Schedule, HardSoftScore> {
    ConstraintSessionFactory::from_provider(|factory| {
        factory
            .for_each(EMPLOYEE)
            .if_exists(
                factory.for_each(SHIFT),
                joiner::equal_bi(employee_index, employee_of),
            )
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Busy employee");
        factory
            .for_each(EMPLOYEE)
            .if_not_exists(
                factory.for_each(SHIFT),
                joiner::equal_bi(employee_index, employee_of),
            )
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Idle employee");
    })
    .unwrap()
}

#[test]
fn test_if_exists_follows_right_updates() {
    let sessions = workload_sessions();
    let mut schedule = Schedule::new(&["ann", "bob", "carl"], &[0, 1, 2])
        .assign(0, 0)
        .assign(1, 0);
    let mut session = loaded_session(&sessions, &schedule, true);

    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-2, -1)
    );

    schedule.shifts[2].employee = Some(1);
    session.update(shift_ref(2)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-1, -2)
    );

    // ann keeps shift 1, so neither employee changes state
    schedule.shifts[0].employee = Some(1);
    session.update(shift_ref(0)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-1, -2)
    );

    schedule.shifts[1].employee = None;
    session.update(shift_ref(1)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-2, -1)
    );
    let busy: Vec<Vec<Value>> = session.constraint_match_total_map()["Busy employee"]
        .matches()
        .map(|m| m.justification.clone())
        .collect();
    assert_eq!(busy, vec![vec![Value::Fact(FactRef::new(EMPLOYEE, 1))]]);
}

#[test]
fn test_if_exists_follows_retracts_on_both_sides() {
    let sessions = workload_sessions();
    let schedule = Schedule::new(&["ann", "bob", "carl"], &[0, 1, 2])
        .assign(0, 1)
        .assign(2, 1);
    let mut session = loaded_session(&sessions, &schedule, false);

    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-2, -1)
    );

    // bob keeps shift 2
    session.retract(shift_ref(0)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-2, -1)
    );

    session.retract(shift_ref(2)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-3, 0)
    );

    session.retract(FactRef::new(EMPLOYEE, 2)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-2, 0)
    );

    session.insert(shift_ref(2)).unwrap();
    assert_eq!(
        session.calculate_score(&schedule, 0).score(),
        HardSoftScore::of(-1, -1)
    );
}
