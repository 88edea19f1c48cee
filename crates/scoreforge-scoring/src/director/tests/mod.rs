//! Tests for the score director.

mod lifecycle;

use std::sync::Arc;

use scoreforge_config::{EnvironmentMode, ScoringConfig};
use scoreforge_core::score::HardSoftScore;
use scoreforge_core::FactRef;
use scoreforge_test::route::{route_descriptor, RoutePlan, Visit, VEHICLE, VISIT};
use scoreforge_test::schedule::{schedule_descriptor, Schedule, EMPLOYEE, SHIFT};

use super::BavetScoreDirector;
use crate::session::ConstraintSessionFactory;
use crate::stream::{joiner, ConstraintFactory, Value};

fn full_assert() -> ScoringConfig {
    ScoringConfig::default().with_environment_mode(EnvironmentMode::FullAssert)
}

fn shift_ref(index: usize) -> FactRef {
    FactRef::new(SHIFT, index)
}

fn employee_ref(index: usize) -> FactRef {
    FactRef::new(EMPLOYEE, index)
}

fn employee_of(schedule: &Schedule, v: &Value) -> Value {
    v.as_fact()
        .and_then(|f| schedule.shifts[f.index].employee)
        .into()
}

fn day_of(schedule: &Schedule, v: &Value) -> i64 {
    v.as_fact().map_or(-1, |f| schedule.shifts[f.index].day)
}

/// Unassigned shift (1soft), same day (1hard per pair), staffing cost
/// (1soft per employee).
fn schedule_constraints(factory: &ConstraintFactory<Schedule, HardSoftScore>) {
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
        .for_each(EMPLOYEE)
        .penalize(HardSoftScore::ONE_SOFT)
        .as_constraint("Staffing cost");
}

fn schedule_director(
    schedule: Schedule,
    config: ScoringConfig,
) -> BavetScoreDirector<Schedule> {
    let sessions = ConstraintSessionFactory::from_provider(schedule_constraints).unwrap();
    BavetScoreDirector::new(
        Arc::new(sessions),
        Arc::new(schedule_descriptor()),
        schedule,
        config,
    )
    .unwrap()
}

/// Shifts on days 0, 0, 1 for ann and bob; both day-0 shifts go to ann.
fn clashing() -> Schedule {
    Schedule::new(&["ann", "bob"], &[0, 0, 1])
        .assign(0, 0)
        .assign(1, 0)
}

fn visit<'a>(plan: &'a RoutePlan, v: &Value) -> Option<&'a Visit> {
    v.as_fact().map(|f| &plan.visits[f.index])
}

/// Unassigned visit (1hard), linked visit (1soft per visit with a
/// successor), vehicle load (1soft per visit on a non-empty vehicle).
fn route_constraints(factory: &ConstraintFactory<RoutePlan, HardSoftScore>) {
    factory
        .for_each(VISIT)
        .filter(|p, v| visit(p, v).is_some_and(|visit| visit.vehicle.is_none()))
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Unassigned visit");

    factory
        .for_each(VISIT)
        .filter(|p, v| visit(p, v).is_some_and(|visit| visit.next.is_some()))
        .penalize(HardSoftScore::ONE_SOFT)
        .as_constraint("Linked visit");

    factory
        .for_each(VEHICLE)
        .filter(|p, v| v.as_fact().is_some_and(|f| !p.vehicles[f.index].visits.is_empty()))
        .penalize_with(HardSoftScore::ONE_SOFT, |p, v| {
            v.as_fact()
                .map_or(0, |f| p.vehicles[f.index].visits.len() as i64)
        })
        .as_constraint("Vehicle load");
}

fn route_director(plan: RoutePlan) -> BavetScoreDirector<RoutePlan> {
    let sessions = ConstraintSessionFactory::from_provider(route_constraints).unwrap();
    BavetScoreDirector::new(
        Arc::new(sessions),
        Arc::new(route_descriptor()),
        plan,
        full_assert(),
    )
    .unwrap()
}
