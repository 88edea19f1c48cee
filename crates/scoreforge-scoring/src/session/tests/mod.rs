//! Tests for compiled sessions.

mod network;

use scoreforge_core::score::{HardSoftScore, Score};
use scoreforge_core::{FactRef, SolutionDescriptor};
use scoreforge_test::schedule::{schedule_descriptor, Schedule, SHIFT};

use super::{ConstraintSession, ConstraintSessionFactory};
use crate::stream::collector::count;
use crate::stream::{joiner, ConstraintFactory, Value};

pub(super) fn insert_all<S, Sc: Score>(
    session: &mut ConstraintSession<S, Sc>,
    descriptor: &SolutionDescriptor<S>,
    solution: &S,
) {
    descriptor.for_each_fact(solution, |fact| session.insert(fact).unwrap());
}

pub(super) fn shift_ref(index: usize) -> FactRef {
    FactRef::new(SHIFT, index)
}

pub(super) fn employee_of(schedule: &Schedule, v: &Value) -> Value {
    v.as_fact()
        .and_then(|f| schedule.shifts[f.index].employee)
        .into()
}

pub(super) fn day_of(schedule: &Schedule, v: &Value) -> i64 {
    v.as_fact().map_or(-1, |f| schedule.shifts[f.index].day)
}

// Shifts over an employee's maximum.
pub(super) fn overload(schedule: &Schedule, employee: &Value, shifts: &Value) -> i64 {
    let max = employee
        .as_int()
        .map_or(0, |e| schedule.employees[e as usize].max_shifts as i64);
    shifts.as_int().unwrap_or(0) - max
}

/// Unassigned shift (1soft each), same day (1hard per pair), too many shifts
/// (1hard per shift over the maximum).
pub(super) fn schedule_constraints(factory: &ConstraintFactory<Schedule, HardSoftScore>) {
    factory
        .for_each(SHIFT)
        .filter(|s, v| employee_of(s, v).is_none())
        .penalize(HardSoftScore::ONE_SOFT)
        .as_constraint("Unassigned shift");

    factory
        .for_each(SHIFT)
        .join(factory.for_each(SHIFT), joiner::equal(employee_of))
        .filter(|s, a, b| a < b && !employee_of(s, a).is_none() && day_of(s, a) == day_of(s, b))
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Same day");

    factory
        .for_each(SHIFT)
        .filter(|s, v| !employee_of(s, v).is_none())
        .group_by(employee_of, count())
        .filter(|s, e, n| overload(s, e, n) > 0)
        .penalize_with(HardSoftScore::ONE_HARD, overload)
        .as_constraint("Too many shifts");
}

pub(super) fn schedule_sessions() -> ConstraintSessionFactory<Schedule, HardSoftScore> {
    ConstraintSessionFactory::from_provider(schedule_constraints).unwrap()
}

/// Builds a session over `schedule` with every fact inserted.
pub(super) fn loaded_session(
    sessions: &ConstraintSessionFactory<Schedule, HardSoftScore>,
    schedule: &Schedule,
    tracking: bool,
) -> ConstraintSession<Schedule, HardSoftScore> {
    let descriptor = schedule_descriptor();
    let mut session = sessions
        .build_session(&descriptor, schedule, tracking)
        .unwrap();
    insert_all(&mut session, &descriptor, schedule);
    session
}

/// Five shifts on days 0, 0, 1, 1, 2, all assigned to ann.
pub(super) fn overbooked() -> Schedule {
    Schedule::new(&["ann", "bob"], &[0, 0, 1, 1, 2])
        .assign(0, 0)
        .assign(1, 0)
        .assign(2, 0)
        .assign(3, 0)
        .assign(4, 0)
}
