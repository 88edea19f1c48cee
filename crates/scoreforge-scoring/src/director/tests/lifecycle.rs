use scoreforge_core::score::{HardSoftScore, InitScore};
use scoreforge_core::{ClassId, PlanningSolution, ScoreForgeError};
use scoreforge_test::schedule::{Employee, Shift};

use super::*;

#[test]
fn test_initial_score_counts_unassigned_shifts() {
    let mut director = schedule_director(clashing(), ScoringConfig::default());

    let score = director.calculate_score().unwrap();

    assert_eq!(score, InitScore::of(-1, HardSoftScore::of(-1, -3)));
    assert_eq!(
        director.working_solution().score(),
        Some(HardSoftScore::of(-1, -3))
    );
    assert_eq!(director.calculation_count(), 1);
}

#[test]
fn test_basic_variable_changes_are_incremental() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    director.before_variable_changed(shift_ref(1), "employee");
    director.working_solution_mut().shifts[1].employee = Some(1);
    director.after_variable_changed(shift_ref(1), "employee").unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(0, -3))
    );

    director.working_solution_mut().shifts[2].employee = Some(1);
    director.after_variable_changed(shift_ref(2), "employee").unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of(0, -2))
    );
    assert_eq!(director.calculation_count(), 3);
}

#[test]
fn test_problem_fact_hooks() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    director.working_solution_mut().employees.push(Employee {
        name: "carl".to_string(),
        max_shifts: 2,
    });
    director.after_problem_fact_added(employee_ref(2)).unwrap();
    assert_eq!(
        director.calculate_score().unwrap().score(),
        HardSoftScore::of(-1, -4)
    );

    director.working_solution_mut().employees[2].max_shifts = 5;
    director.after_problem_property_changed(employee_ref(2)).unwrap();
    assert_eq!(
        director.calculate_score().unwrap().score(),
        HardSoftScore::of(-1, -4)
    );

    director.working_solution_mut().employees.pop();
    director.after_problem_fact_removed(employee_ref(2)).unwrap();
    assert_eq!(
        director.calculate_score().unwrap().score(),
        HardSoftScore::of(-1, -3)
    );
}

#[test]
fn test_entity_added_and_removed() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    director.working_solution_mut().shifts.push(Shift {
        day: 0,
        employee: Some(0),
    });
    director.after_entity_added(shift_ref(3)).unwrap();
    // ann now works three shifts on day 0
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(-3, -3))
    );

    director.before_entity_removed(shift_ref(3)).unwrap();
    director.working_solution_mut().shifts.pop();
    director.after_entity_removed(shift_ref(3)).unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(-1, -3))
    );
}

#[test]
fn test_removing_the_first_entity_moves_later_shifts() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    director.before_entity_removed(shift_ref(0)).unwrap();
    director.working_solution_mut().shifts.remove(0);
    director.after_entity_removed(shift_ref(0)).unwrap();
    // day 0 for ann, day 1 unassigned
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(0, -3))
    );
    assert_eq!(director.session().source_fact_count(SHIFT), 2);

    director.working_solution_mut().shifts[1].employee = Some(1);
    director.after_variable_changed(shift_ref(1), "employee").unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of(0, -2))
    );
}

#[test]
fn test_inserting_an_entity_in_front_moves_later_shifts() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    director.working_solution_mut().shifts.insert(
        0,
        Shift {
            day: 1,
            employee: Some(1),
        },
    );
    director.after_entity_added(shift_ref(0)).unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(-1, -3))
    );

    // the day 1 shift that used to be last now clashes with bob's
    director.working_solution_mut().shifts[3].employee = Some(1);
    director.after_variable_changed(shift_ref(3), "employee").unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of(-2, -2))
    );
}

#[test]
fn test_removing_the_first_problem_fact_keeps_positions_dense() {
    let config = full_assert().with_constraint_match_enabled(true);
    let mut director = schedule_director(Schedule::new(&["ann", "bob", "carl"], &[0]), config);
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(0, -4))
    );

    director.working_solution_mut().employees.remove(0);
    director.after_problem_fact_removed(employee_ref(0)).unwrap();
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(0, -3))
    );

    let indictments = director.indictment_map();
    assert!(indictments.contains_key(&Value::Fact(employee_ref(0))));
    assert!(indictments.contains_key(&Value::Fact(employee_ref(1))));
    assert!(!indictments.contains_key(&Value::Fact(employee_ref(2))));
}

#[test]
fn test_entity_outside_its_collection_is_rejected() {
    let mut director = schedule_director(clashing(), ScoringConfig::default());

    let err = director.after_entity_added(shift_ref(5)).unwrap_err();
    assert!(matches!(err, ScoreForgeError::InvalidState(_)));
}

#[test]
fn test_adding_a_problem_fact_as_entity_fails() {
    let mut director = schedule_director(clashing(), ScoringConfig::default());

    let err = director.after_entity_added(employee_ref(0)).unwrap_err();
    assert!(
        matches!(&err, ScoreForgeError::UnknownEntityClass { class } if class == "Employee"),
        "unexpected error: {err}"
    );

    let err = director
        .after_entity_added(FactRef::new(ClassId(9), 0))
        .unwrap_err();
    assert!(matches!(err, ScoreForgeError::UnknownClass { id: 9 }));
}

#[test]
fn test_unreported_change_is_score_corruption() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    director.working_solution_mut().shifts[1].employee = Some(1);
    let err = director.calculate_score().unwrap_err();

    assert!(matches!(err, ScoreForgeError::ScoreCorruption { .. }));
    let message = err.to_string();
    assert!(message.contains("not the uncorrected score"), "{message}");
    assert!(message.contains("(Same day)"), "{message}");
    assert!(!message.contains("(Staffing cost)"), "{message}");
}

#[test]
fn test_unreported_change_passes_without_assertions() {
    let mut director = schedule_director(clashing(), ScoringConfig::default());
    director.calculate_score().unwrap();

    director.working_solution_mut().shifts[1].employee = Some(1);
    let stale = director.calculate_score().unwrap();

    assert_eq!(stale.score(), HardSoftScore::of(-1, -3));
    assert!(director.assert_working_score_from_scratch(stale).is_err());
}

#[test]
fn test_config_weights_override_declared_weights() {
    let config = ScoringConfig::default()
        .with_constraint_weight("Unassigned shift", "0hard/10soft")
        .with_constraint_weight("Staffing cost", "0hard/0soft");
    let mut director = schedule_director(clashing(), config);

    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(-1, HardSoftScore::of(-1, -10))
    );
    // the zero-weight constraint is never compiled
    assert!(!director.session().has_source(EMPLOYEE));
}

#[test]
fn test_invalid_config_weight_is_rejected() {
    let sessions = ConstraintSessionFactory::from_provider(schedule_constraints).unwrap();
    let config = ScoringConfig::default().with_constraint_weight("Same day", "lots");

    let err = BavetScoreDirector::new(
        Arc::new(sessions),
        Arc::new(schedule_descriptor()),
        clashing(),
        config,
    )
    .unwrap_err();
    assert!(matches!(err, ScoreForgeError::Config(_)));
}

#[test]
fn test_tracking_follows_config() {
    let config = ScoringConfig::default().with_constraint_match_enabled(true);
    let mut director = schedule_director(clashing(), config);
    director.calculate_score().unwrap();

    assert!(director.is_constraint_match_enabled());
    let totals = director.constraint_match_total_map();
    assert_eq!(totals["Same day"].match_count(), 1);
    assert_eq!(totals["Staffing cost"].match_count(), 2);
    assert_eq!(
        director.indictment_map()[&Value::Fact(shift_ref(0))].score,
        HardSoftScore::of_hard(-1)
    );

    let explanation = director.explain_score();
    assert_eq!(explanation.score, InitScore::of(-1, HardSoftScore::of(-1, -3)));
    assert_eq!(explanation.total_match_count(), 4);
}

#[test]
fn test_untracked_director_keeps_no_matches() {
    let mut director = schedule_director(clashing(), ScoringConfig::default());
    director.calculate_score().unwrap();

    assert!(!director.is_constraint_match_enabled());
    assert!(director.constraint_match_total_map().is_empty());
    assert!(director.indictment_map().is_empty());
}

#[test]
fn test_set_working_solution_rebuilds_the_session() {
    let mut director = schedule_director(clashing(), full_assert());
    director.calculate_score().unwrap();

    let relaxed = Schedule::new(&["ann", "bob", "carl"], &[0, 0, 1])
        .assign(0, 0)
        .assign(1, 1)
        .assign(2, 2);
    director.set_working_solution(relaxed).unwrap();

    assert_eq!(director.session().source_fact_count(SHIFT), 3);
    assert_eq!(
        director.calculate_score().unwrap(),
        InitScore::of(0, HardSoftScore::of(0, -3))
    );
}

#[test]
fn test_statistics() {
    let mut director = schedule_director(clashing(), ScoringConfig::default());
    director.calculate_score().unwrap();
    director.calculate_score().unwrap();
    director.increment_move_count();

    assert_eq!(director.calculation_count(), 2);
    assert_eq!(director.move_count(), 1);

    director.reset_calculation_count();
    assert_eq!(director.calculation_count(), 0);
}
