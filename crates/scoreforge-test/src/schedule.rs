//! Basic variable fixture: shifts assigned to employees.
//!
//! The class hierarchy is `Person` (abstract) with subclasses `Employee`
//! and `Contractor`, so streams over `Person` see both.
//!
//! # Example
//!
//! ```
//! use scoreforge_test::schedule::{schedule_descriptor, Schedule, EMPLOYEE, PERSON};
//!
//! let descriptor = schedule_descriptor();
//! assert!(descriptor.is_assignable(PERSON, EMPLOYEE));
//!
//! let schedule = Schedule::new(&["ann", "bob"], &[0, 0, 1]);
//! assert_eq!(schedule.shifts.len(), 3);
//! ```

use scoreforge_core::domain::{ClassId, PlanningSolution, SolutionDescriptor};
use scoreforge_core::score::HardSoftScore;

pub const PERSON: ClassId = ClassId(0);
pub const EMPLOYEE: ClassId = ClassId(1);
pub const CONTRACTOR: ClassId = ClassId(2);
pub const SHIFT: ClassId = ClassId(3);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Employee {
    pub name: String,
    pub max_shifts: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shift {
    pub day: i64,
    /// Index into `Schedule::employees`.
    pub employee: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Schedule {
    pub employees: Vec<Employee>,
    pub contractors: Vec<Employee>,
    pub shifts: Vec<Shift>,
    pub score: Option<HardSoftScore>,
}

impl Schedule {
    /// Creates a schedule with one unassigned shift per given day.
    pub fn new(employee_names: &[&str], shift_days: &[i64]) -> Self {
        Self {
            employees: employee_names
                .iter()
                .map(|n| Employee {
                    name: n.to_string(),
                    max_shifts: 2,
                })
                .collect(),
            contractors: Vec::new(),
            shifts: shift_days
                .iter()
                .map(|&day| Shift {
                    day,
                    employee: None,
                })
                .collect(),
            score: None,
        }
    }

    pub fn with_contractors(mut self, names: &[&str]) -> Self {
        self.contractors = names
            .iter()
            .map(|n| Employee {
                name: n.to_string(),
                max_shifts: 1,
            })
            .collect();
        self
    }

    pub fn assign(mut self, shift: usize, employee: usize) -> Self {
        self.shifts[shift].employee = Some(employee);
        self
    }
}

impl PlanningSolution for Schedule {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }

    fn uninitialized_variable_count(&self) -> usize {
        self.shifts.iter().filter(|s| s.employee.is_none()).count()
    }
}

/// Person (0, abstract), Employee (1), Contractor (2), Shift (3, entity).
pub fn schedule_descriptor() -> SolutionDescriptor<Schedule> {
    SolutionDescriptor::<Schedule>::builder("Schedule")
        .abstract_class("Person", None)
        .problem_fact_class("Employee", Some("Person"), |s| s.employees.len())
        .problem_fact_class("Contractor", Some("Person"), |s| s.contractors.len())
        .entity_class("Shift", None, |s| s.shifts.len())
        .basic_variable("Shift", "employee")
        .build()
        .expect("schedule descriptor is valid")
}
