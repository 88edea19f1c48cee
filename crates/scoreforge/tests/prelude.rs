//! End-to-end scoring through the facade.

use std::sync::Arc;

use scoreforge::prelude::*;
use scoreforge::EnvironmentMode;
use scoreforge_test::schedule::{schedule_descriptor, Schedule, EMPLOYEE, SHIFT};

fn employee_of(schedule: &Schedule, v: &Value) -> Value {
    v.as_fact()
        .and_then(|f| schedule.shifts[f.index].employee)
        .into()
}

fn shifts_per_employee(factory: &ConstraintFactory<Schedule, HardSoftScore>) {
    factory
        .for_each(SHIFT)
        .filter(|s, v| !employee_of(s, v).is_none())
        .group_by(employee_of, collector::count())
        .penalize_with(HardSoftScore::ONE_SOFT, |_, _, n| {
            let n = n.as_int().unwrap_or(0);
            n * n
        })
        .as_constraint("Fairness");

    factory
        .for_each(EMPLOYEE)
        .reward(HardSoftScore::ONE_SOFT)
        .as_constraint("Available");
}

#[test]
fn test_director_scores_through_the_prelude() {
    let sessions = ConstraintSessionFactory::from_provider(shifts_per_employee).unwrap();
    let schedule = Schedule::new(&["ann", "bob"], &[0, 1, 2])
        .assign(0, 0)
        .assign(1, 0)
        .assign(2, 1);
    let config = ScoringConfig::default().with_environment_mode(EnvironmentMode::FullAssert);
    let mut director = BavetScoreDirector::new(
        Arc::new(sessions),
        Arc::new(schedule_descriptor()),
        schedule,
        config,
    )
    .unwrap();

    // ann 2 shifts (4), bob 1 shift (1), two employees rewarded
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of_soft(-3))
    );

    director.working_solution_mut().shifts[1].employee = Some(1);
    director
        .after_variable_changed(FactRef::new(SHIFT, 1), "employee")
        .unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of_soft(-3))
    );

    // bob takes every shift; ann's group disappears
    director.working_solution_mut().shifts[0].employee = Some(1);
    director
        .after_variable_changed(FactRef::new(SHIFT, 0), "employee")
        .unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of_soft(-7))
    );
}
