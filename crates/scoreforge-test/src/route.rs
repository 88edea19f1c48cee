//! List variable fixture: vehicles visiting locations.
//!
//! Every shadow setter appends to a history vector, so tests can assert
//! exactly which writes a listener performed.
//!
//! # Example
//!
//! ```
//! use scoreforge_test::route::RoutePlan;
//!
//! let plan = RoutePlan::new(&["a", "b", "c"], &[&[0, 1], &[2]]);
//! assert_eq!(plan.vehicles[0].visits, vec![0, 1]);
//! assert!(plan.visits[0].next_history.is_empty());
//! ```

use scoreforge_core::domain::{ClassId, ListVariableId, PlanningSolution, SolutionDescriptor};
use scoreforge_core::score::HardSoftScore;

pub const VEHICLE: ClassId = ClassId(0);
pub const VISIT: ClassId = ClassId(1);
pub const VISITS: ListVariableId = ListVariableId(0);

#[derive(Clone, Debug)]
pub struct Vehicle {
    pub name: String,
    pub visits: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct Visit {
    pub name: String,
    pub demand: i64,
    pub next: Option<usize>,
    pub previous: Option<usize>,
    pub index: Option<usize>,
    pub vehicle: Option<usize>,
    pub next_history: Vec<Option<usize>>,
    pub previous_history: Vec<Option<usize>>,
    pub index_history: Vec<Option<usize>>,
    pub vehicle_history: Vec<Option<usize>>,
}

impl Visit {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            demand: 1,
            next: None,
            previous: None,
            index: None,
            vehicle: None,
            next_history: Vec::new(),
            previous_history: Vec::new(),
            index_history: Vec::new(),
            vehicle_history: Vec::new(),
        }
    }

    pub fn clear_history(&mut self) {
        self.next_history.clear();
        self.previous_history.clear();
        self.index_history.clear();
        self.vehicle_history.clear();
    }
}

#[derive(Clone, Debug)]
pub struct RoutePlan {
    pub vehicles: Vec<Vehicle>,
    pub visits: Vec<Visit>,
    pub score: Option<HardSoftScore>,
}

impl RoutePlan {
    /// Creates a plan with one vehicle per route. Shadows start unset.
    pub fn new(visit_names: &[&str], routes: &[&[usize]]) -> Self {
        Self {
            vehicles: routes
                .iter()
                .enumerate()
                .map(|(i, r)| Vehicle {
                    name: format!("vehicle-{}", i),
                    visits: r.to_vec(),
                })
                .collect(),
            visits: visit_names.iter().map(|n| Visit::new(n)).collect(),
            score: None,
        }
    }

    /// Sets every shadow from the lists directly, without recording history.
    pub fn with_consistent_shadows(mut self) -> Self {
        for visit in &mut self.visits {
            visit.next = None;
            visit.previous = None;
            visit.index = None;
            visit.vehicle = None;
        }
        for (v, vehicle) in self.vehicles.iter().enumerate() {
            for (i, &e) in vehicle.visits.iter().enumerate() {
                let visit = &mut self.visits[e];
                visit.index = Some(i);
                visit.vehicle = Some(v);
                visit.previous = i.checked_sub(1).map(|p| vehicle.visits[p]);
                visit.next = vehicle.visits.get(i + 1).copied();
            }
        }
        self
    }

    pub fn visit_index(&self, name: &str) -> usize {
        self.visits
            .iter()
            .position(|v| v.name == name)
            .unwrap_or_else(|| panic!("no visit named {}", name))
    }

    pub fn clear_history(&mut self) {
        self.visits.iter_mut().for_each(Visit::clear_history);
    }

    /// Checks that every shadow agrees with the lists.
    pub fn check_shadows(&self) -> Result<(), String> {
        let mut assigned = vec![false; self.visits.len()];
        for (v, vehicle) in self.vehicles.iter().enumerate() {
            for (i, &e) in vehicle.visits.iter().enumerate() {
                assigned[e] = true;
                let visit = &self.visits[e];
                let previous = i.checked_sub(1).map(|p| vehicle.visits[p]);
                let next = vehicle.visits.get(i + 1).copied();
                if visit.previous != previous {
                    return Err(format!(
                        "{}.previous is {:?}, expected {:?}",
                        visit.name, visit.previous, previous
                    ));
                }
                if visit.next != next {
                    return Err(format!(
                        "{}.next is {:?}, expected {:?}",
                        visit.name, visit.next, next
                    ));
                }
                if visit.index != Some(i) {
                    return Err(format!("{}.index is {:?}, expected {}", visit.name, visit.index, i));
                }
                if visit.vehicle != Some(v) {
                    return Err(format!(
                        "{}.vehicle is {:?}, expected {}",
                        visit.name, visit.vehicle, v
                    ));
                }
            }
        }
        for (e, visit) in self.visits.iter().enumerate() {
            if !assigned[e]
                && (visit.next.is_some()
                    || visit.previous.is_some()
                    || visit.index.is_some()
                    || visit.vehicle.is_some())
            {
                return Err(format!("unassigned {} still has shadow values", visit.name));
            }
        }
        Ok(())
    }
}

impl PlanningSolution for RoutePlan {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

fn set_next(plan: &mut RoutePlan, e: usize, value: Option<usize>) {
    let visit = &mut plan.visits[e];
    visit.next = value;
    visit.next_history.push(value);
}

fn set_previous(plan: &mut RoutePlan, e: usize, value: Option<usize>) {
    let visit = &mut plan.visits[e];
    visit.previous = value;
    visit.previous_history.push(value);
}

fn set_index(plan: &mut RoutePlan, e: usize, value: Option<usize>) {
    let visit = &mut plan.visits[e];
    visit.index = value;
    visit.index_history.push(value);
}

fn set_vehicle(plan: &mut RoutePlan, e: usize, value: Option<usize>) {
    let visit = &mut plan.visits[e];
    visit.vehicle = value;
    visit.vehicle_history.push(value);
}

/// Vehicle (0) owns the list variable `visits` of Visit (1) elements.
pub fn route_descriptor() -> SolutionDescriptor<RoutePlan> {
    SolutionDescriptor::<RoutePlan>::builder("RoutePlan")
        .entity_class("Vehicle", None, |p| p.vehicles.len())
        .entity_class("Visit", None, |p| p.visits.len())
        .list_variable(
            "Vehicle",
            "visits",
            "Visit",
            |p, v| p.vehicles[v].visits.len(),
            |p, v, i| p.vehicles[v].visits[i],
        )
        .next_element_shadow("Visit", "next", "Visit", "visits", |p, e| p.visits[e].next, set_next)
        .previous_element_shadow(
            "Visit",
            "previous",
            "Visit",
            "visits",
            |p, e| p.visits[e].previous,
            set_previous,
        )
        .index_shadow("Visit", "index", "visits", |p, e| p.visits[e].index, set_index)
        .inverse_relation_shadow(
            "Visit",
            "vehicle",
            "Vehicle",
            "visits",
            |p, e| p.visits[e].vehicle,
            set_vehicle,
        )
        .build()
        .expect("route descriptor is valid")
}
