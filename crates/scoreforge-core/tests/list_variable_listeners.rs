//! Next/previous/index/inverse listeners driven through `VariableListenerSupport`.

use scoreforge_core::domain::{
    ListVariableNotification, VariableChangeSink, VariableListenerSupport,
};
use scoreforge_test::route::{route_descriptor, RoutePlan, VEHICLE, VISIT, VISITS};
use scoreforge_test::sink::RecordingSink;

struct Harness {
    sink: RecordingSink<RoutePlan>,
    support: VariableListenerSupport<RoutePlan>,
}

impl Harness {
    fn new(plan: RoutePlan) -> Self {
        let descriptor = route_descriptor();
        Self {
            sink: RecordingSink::new(plan),
            support: VariableListenerSupport::from_descriptor(&descriptor),
        }
    }

    fn plan(&self) -> &RoutePlan {
        self.sink.working_solution()
    }

    fn idx(&self, name: &str) -> usize {
        self.plan().visit_index(name)
    }

    fn insert(&mut self, vehicle: usize, index: usize, element: usize) {
        self.sink.solution.vehicles[vehicle]
            .visits
            .insert(index, element);
        self.support.notify(ListVariableNotification::ElementAdded {
            list_variable: VISITS,
            entity: vehicle,
            index,
        });
        self.support.trigger(&mut self.sink);
    }

    fn unassign(&mut self, vehicle: usize, index: usize) {
        let element = self.sink.solution.vehicles[vehicle].visits.remove(index);
        self.support.notify(ListVariableNotification::ElementRemoved {
            list_variable: VISITS,
            entity: vehicle,
            index,
        });
        self.support.notify(ListVariableNotification::ElementUnassigned {
            list_variable: VISITS,
            element,
        });
        self.support.trigger(&mut self.sink);
    }

    fn transfer(&mut self, from: (usize, usize), to: (usize, usize)) {
        let element = self.sink.solution.vehicles[from.0].visits.remove(from.1);
        self.support.notify(ListVariableNotification::ElementRemoved {
            list_variable: VISITS,
            entity: from.0,
            index: from.1,
        });
        self.sink.solution.vehicles[to.0].visits.insert(to.1, element);
        self.support.notify(ListVariableNotification::ElementAdded {
            list_variable: VISITS,
            entity: to.0,
            index: to.1,
        });
        self.support.trigger(&mut self.sink);
    }

    /// Moves within one list, reported as a range change.
    fn shift(&mut self, vehicle: usize, from: usize, to: usize) {
        let (lo, hi) = (from.min(to), from.max(to) + 1);
        self.support
            .before_list_variable_changed(&mut self.sink, VISITS, vehicle, lo, hi);
        let visits = &mut self.sink.solution.vehicles[vehicle].visits;
        let element = visits.remove(from);
        visits.insert(to, element);
        self.support.notify(ListVariableNotification::RangeChanged {
            list_variable: VISITS,
            entity: vehicle,
            from_index: lo,
            to_index: hi,
        });
        self.support.trigger(&mut self.sink);
    }
}

#[test]
fn test_element_added_between_neighbours() {
    let plan = RoutePlan::new(&["x", "y", "z", "w"], &[&[0, 1, 2]]).with_consistent_shadows();
    let mut h = Harness::new(plan);
    let (x, y, z, w) = (h.idx("x"), h.idx("y"), h.idx("z"), h.idx("w"));

    h.insert(0, 1, w);

    let p = h.plan();
    assert_eq!(p.visits[x].next, Some(w));
    assert_eq!(p.visits[w].previous, Some(x));
    assert_eq!(p.visits[w].next, Some(y));
    assert_eq!(p.visits[y].previous, Some(w));
    assert_eq!(p.check_shadows(), Ok(()));

    // Exactly one write per changed link.
    assert_eq!(p.visits[x].next_history, vec![Some(w)]);
    assert_eq!(p.visits[w].next_history, vec![Some(y)]);
    assert_eq!(p.visits[w].previous_history, vec![Some(x)]);
    assert_eq!(p.visits[y].previous_history, vec![Some(w)]);
    assert!(p.visits[x].previous_history.is_empty());
    assert!(p.visits[y].next_history.is_empty());
    assert!(p.visits[z].next_history.is_empty());
    assert!(p.visits[z].previous_history.is_empty());
    assert!(h.sink.is_balanced());
}

#[test]
fn test_element_appended_at_end() {
    let plan = RoutePlan::new(&["a", "b", "c"], &[&[0, 1]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.insert(0, 2, 2);

    let p = h.plan();
    assert_eq!(p.visits[1].next_history, vec![Some(2)]);
    assert_eq!(p.visits[2].previous_history, vec![Some(1)]);
    // The appended element's next was already empty.
    assert!(p.visits[2].next_history.is_empty());
    assert_eq!(p.check_shadows(), Ok(()));
}

#[test]
fn test_element_removed_relinks_predecessor() {
    let plan = RoutePlan::new(&["a", "b", "c"], &[&[0, 1, 2]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.unassign(0, 1);

    let p = h.plan();
    assert_eq!(p.visits[0].next_history, vec![Some(2)]);
    assert_eq!(p.visits[2].previous_history, vec![Some(0)]);
    assert_eq!(p.visits[1].next_history, vec![None]);
    assert_eq!(p.visits[1].previous_history, vec![None]);
    assert_eq!(p.visits[1].vehicle_history, vec![None]);
    assert_eq!(p.check_shadows(), Ok(()));
}

#[test]
fn test_last_element_removed() {
    let plan = RoutePlan::new(&["a", "b"], &[&[0, 1]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.unassign(0, 1);

    let p = h.plan();
    assert_eq!(p.visits[0].next_history, vec![None]);
    assert!(p.visits[0].previous_history.is_empty());
    assert_eq!(p.check_shadows(), Ok(()));
}

#[test]
fn test_range_change_reverses_middle() {
    let plan = RoutePlan::new(&["p", "q", "r", "s", "t"], &[&[0, 1, 2, 3, 4]])
        .with_consistent_shadows();
    let mut h = Harness::new(plan);

    // [p, q, r, s, t] -> [p, s, r, q, t]
    h.support
        .before_list_variable_changed(&mut h.sink, VISITS, 0, 1, 4);
    h.sink.solution.vehicles[0].visits.swap(1, 3);
    h.support.notify(ListVariableNotification::RangeChanged {
        list_variable: VISITS,
        entity: 0,
        from_index: 1,
        to_index: 4,
    });
    h.support.trigger(&mut h.sink);

    let p = h.plan();
    assert_eq!(p.check_shadows(), Ok(()));
    assert_eq!(p.visits[0].next_history, vec![Some(3)]);
    assert_eq!(p.visits[4].previous_history, vec![Some(1)]);
    assert!(p.visits[4].next_history.is_empty());
    // r stays at index 2.
    assert!(p.visits[2].index_history.is_empty());
}

#[test]
fn test_range_change_leaves_outside_elements_untouched() {
    let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let plan = RoutePlan::new(&names, &[&[0, 1, 2, 3, 4, 5, 6, 7]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.shift(0, 3, 4);

    let p = h.plan();
    assert_eq!(p.check_shadows(), Ok(()));
    let touched: Vec<usize> = h
        .sink
        .changed_facts()
        .into_iter()
        .map(|f| f.index)
        .collect();
    // Range [3, 5) may touch positions 2..=5 only.
    for e in touched {
        assert!((2..=5).contains(&e), "element {} outside the range was written", e);
    }
    assert!(p.visits[0].next_history.is_empty());
    assert!(p.visits[7].previous_history.is_empty());
}

#[test]
fn test_unchanged_range_fires_no_notifications() {
    let plan = RoutePlan::new(&["a", "b", "c"], &[&[0, 1, 2]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.support.notify(ListVariableNotification::RangeChanged {
        list_variable: VISITS,
        entity: 0,
        from_index: 0,
        to_index: 3,
    });
    h.support.trigger(&mut h.sink);

    assert!(h.sink.events.is_empty());
}

#[test]
fn test_entity_added_links_whole_list() {
    let plan = RoutePlan::new(&["a", "b", "c"], &[]);
    let mut h = Harness::new(plan);

    h.sink.solution.vehicles.push(scoreforge_test::Vehicle {
        name: "v".into(),
        visits: vec![2, 0, 1],
    });
    h.support.notify(ListVariableNotification::EntityAdded {
        list_variable: VISITS,
        entity: 0,
    });
    h.support.trigger(&mut h.sink);

    let p = h.plan();
    assert_eq!(p.check_shadows(), Ok(()));
    assert_eq!(p.visits[2].next_history, vec![Some(0)]);
    assert_eq!(p.visits[0].next_history, vec![Some(1)]);
    assert!(p.visits[1].next_history.is_empty());
    assert!(p.visits[2].previous_history.is_empty());
    assert_eq!(p.visits[1].vehicle, Some(0));
}

#[test]
fn test_entity_removed_clears_links_before_disappearing() {
    let plan = RoutePlan::new(&["a", "b", "c"], &[&[0, 1, 2]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.support.before_entity_removed(&mut h.sink, VISITS, 0);
    h.sink.solution.vehicles.pop();

    let p = h.plan();
    assert_eq!(p.check_shadows(), Ok(()));
    assert_eq!(p.visits[0].next_history, vec![None]);
    assert_eq!(p.visits[1].next_history, vec![None]);
    assert!(p.visits[2].next_history.is_empty());
    assert!(p.visits[0].previous_history.is_empty());
    assert_eq!(p.visits[2].previous_history, vec![None]);
    // The change scope reports the element, never the vehicle.
    assert!(h.sink.changed_facts().iter().all(|f| f.class == VISIT));
    assert!(h.sink.changed_facts().iter().all(|f| f.class != VEHICLE));
}

#[test]
fn test_transfer_between_vehicles() {
    let plan = RoutePlan::new(&["a", "b", "c", "d"], &[&[0, 1], &[2, 3]]).with_consistent_shadows();
    let mut h = Harness::new(plan);

    h.transfer((0, 0), (1, 1));

    let p = h.plan();
    assert_eq!(p.vehicles[1].visits, vec![2, 0, 3]);
    assert_eq!(p.check_shadows(), Ok(()));
    assert_eq!(p.visits[0].vehicle_history, vec![Some(1)]);
}

#[test]
fn test_shadow_invariant_after_mixed_sequence() {
    let names: Vec<String> = (0..12).map(|i| format!("v{}", i)).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let plan = RoutePlan::new(&names, &[&[0, 1, 2, 3], &[4, 5, 6], &[]]).with_consistent_shadows();
    let mut h = Harness::new(plan);
    let mut unassigned: Vec<usize> = (7..12).collect();

    let mut seed = 0x2545_f491_u64;
    let mut next = |bound: usize| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % bound as u64) as usize
    };

    for step in 0..300 {
        let vehicle = next(3);
        let len = h.plan().vehicles[vehicle].visits.len();
        match next(4) {
            0 if !unassigned.is_empty() => {
                let element = unassigned.swap_remove(next(unassigned.len()));
                h.insert(vehicle, next(len + 1), element);
            }
            1 if len > 0 => {
                let index = next(len);
                let element = h.plan().vehicles[vehicle].visits[index];
                h.unassign(vehicle, index);
                unassigned.push(element);
            }
            2 if len > 1 => {
                let (from, to) = (next(len), next(len));
                h.shift(vehicle, from, to);
            }
            3 if len > 0 => {
                let target = (vehicle + 1 + next(2)) % 3;
                let target_len = h.plan().vehicles[target].visits.len();
                let to = next(target_len + 1);
                h.transfer((vehicle, next(len)), (target, to));
            }
            _ => continue,
        }
        assert_eq!(h.plan().check_shadows(), Ok(()), "after step {}", step);
        assert!(h.sink.is_balanced());
        assert_eq!(h.support.pending_count(), 0);
    }
}
