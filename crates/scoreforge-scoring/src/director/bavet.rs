//! Incremental score director backed by a compiled constraint session.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};
use std::ops::Range;
use std::sync::Arc;

use scoreforge_config::ScoringConfig;
use scoreforge_core::domain::{
    ListVariableId, ListVariableNotification, VariableChangeSink, VariableListenerSupport,
};
use scoreforge_core::score::{InitScore, ParseableScore};
use scoreforge_core::{FactRef, PlanningSolution, Result, ScoreForgeError, SolutionDescriptor};
use smallvec::SmallVec;
use tracing::{debug, error};

use crate::api::{
    ConstraintMatchTotal, ConstraintWeightOverrides, IndictmentMap, ScoreExplanation,
    WeightProvider,
};
use crate::session::{ConstraintSession, ConstraintSessionFactory};

/// The part of the director listeners write through.
///
/// Every shadow write reported by a listener becomes a session update of
/// the written fact.
struct DirectorCore<S: PlanningSolution> {
    solution: S,
    session: ConstraintSession<S, S::Score>,
    descriptor: Arc<SolutionDescriptor<S>>,
    // First session error raised inside a listener callback.
    pending_error: Option<ScoreForgeError>,
}

impl<S: PlanningSolution> DirectorCore<S> {
    fn take_pending_error(&mut self) -> Result<()> {
        match self.pending_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: PlanningSolution> VariableChangeSink<S> for DirectorCore<S> {
    fn working_solution(&self) -> &S {
        &self.solution
    }

    fn working_solution_mut(&mut self) -> &mut S {
        &mut self.solution
    }

    fn before_variable_changed(&mut self, _entity: FactRef, _variable_name: &'static str) {}

    fn after_variable_changed(&mut self, entity: FactRef, _variable_name: &'static str) {
        if let Err(e) = self.session.update(entity) {
            if self.pending_error.is_none() {
                self.pending_error = Some(e);
            }
        }
    }
}

/// Score director that keeps a [`ConstraintSession`] in step with the
/// working solution.
///
/// The search layer reports every change through the lifecycle hooks:
/// entity and problem fact additions and removals, basic variable changes,
/// and list variable changes. List changes are also forwarded to the shadow
/// variable listeners. Their "before" hooks run at once; their "after"
/// hooks are queued until [`trigger_variable_listeners`](Self::trigger_variable_listeners),
/// which must run before the next [`calculate_score`](Self::calculate_score).
///
/// Replacing the working solution rebuilds the session, which is the only
/// point where constraint weights are resolved again.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use scoreforge_config::ScoringConfig;
/// use scoreforge_core::{ClassId, FactRef, InitScore, PlanningSolution, SimpleScore, SolutionDescriptor};
/// use scoreforge_scoring::director::BavetScoreDirector;
/// use scoreforge_scoring::session::ConstraintSessionFactory;
///
/// #[derive(Clone)]
/// struct Queens {
///     rows: Vec<Option<usize>>,
///     score: Option<SimpleScore>,
/// }
///
/// impl PlanningSolution for Queens {
///     type Score = SimpleScore;
///     fn score(&self) -> Option<Self::Score> { self.score }
///     fn set_score(&mut self, score: Option<Self::Score>) { self.score = score; }
///     fn uninitialized_variable_count(&self) -> usize {
///         self.rows.iter().filter(|r| r.is_none()).count()
///     }
/// }
///
/// const QUEEN: ClassId = ClassId(0);
///
/// let descriptor = SolutionDescriptor::<Queens>::builder("Queens")
///     .entity_class("Queen", None, |q| q.rows.len())
///     .basic_variable("Queen", "row")
///     .build()
///     .unwrap();
/// let sessions = ConstraintSessionFactory::from_provider(|factory| {
///     factory
///         .for_each(QUEEN)
///         .filter(|q: &Queens, v| v.as_fact().is_some_and(|f| q.rows[f.index] == Some(0)))
///         .penalize(SimpleScore::ONE)
///         .as_constraint("Top row");
/// })
/// .unwrap();
///
/// let queens = Queens { rows: vec![Some(0), None], score: None };
/// let mut director = BavetScoreDirector::new(
///     Arc::new(sessions),
///     Arc::new(descriptor),
///     queens,
///     ScoringConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(director.calculate_score().unwrap(), InitScore::of(-1, SimpleScore::of(-1)));
///
/// director.working_solution_mut().rows[1] = Some(0);
/// director.after_variable_changed(FactRef::new(QUEEN, 1), "row").unwrap();
/// assert_eq!(director.calculate_score().unwrap(), InitScore::of(0, SimpleScore::of(-2)));
/// ```
pub struct BavetScoreDirector<S: PlanningSolution> {
    core: DirectorCore<S>,
    listeners: VariableListenerSupport<S>,
    session_factory: Arc<ConstraintSessionFactory<S, S::Score>>,
    config: ScoringConfig,
    config_weights: Option<ConstraintWeightOverrides<S::Score>>,
    calculation_count: u64,
    move_count: u64,
}

impl<S> BavetScoreDirector<S>
where
    S: PlanningSolution,
    S::Score: ParseableScore,
{
    /// Creates a director and loads `solution` into a new session.
    ///
    /// Fails if a constraint weight in `config` does not parse.
    pub fn new(
        session_factory: Arc<ConstraintSessionFactory<S, S::Score>>,
        descriptor: Arc<SolutionDescriptor<S>>,
        solution: S,
        config: ScoringConfig,
    ) -> Result<Self> {
        let config_weights = if config.constraint_weights.is_empty() {
            None
        } else {
            Some(ConstraintWeightOverrides::from_config(&config)?)
        };
        let session = load_session(
            &session_factory,
            &descriptor,
            &solution,
            config.constraint_match_enabled,
            config_weights.as_ref(),
        )?;
        let mut listeners = VariableListenerSupport::from_descriptor(&descriptor);
        listeners.reset_working_solution(&solution);
        Ok(Self {
            core: DirectorCore {
                solution,
                session,
                descriptor,
                pending_error: None,
            },
            listeners,
            session_factory,
            config,
            config_weights,
            calculation_count: 0,
            move_count: 0,
        })
    }
}

impl<S: PlanningSolution> BavetScoreDirector<S> {
    pub fn working_solution(&self) -> &S {
        &self.core.solution
    }

    /// Mutable access to the working solution.
    ///
    /// Every change made through it must be reported with the matching hook.
    pub fn working_solution_mut(&mut self) -> &mut S {
        &mut self.core.solution
    }

    pub fn clone_working_solution(&self) -> S {
        self.core.solution.clone()
    }

    pub fn descriptor(&self) -> &SolutionDescriptor<S> {
        &self.core.descriptor
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn session(&self) -> &ConstraintSession<S, S::Score> {
        &self.core.session
    }

    /// Replaces the working solution and rebuilds the session over it.
    ///
    /// Constraint weights are resolved again against the new solution.
    /// Queued listener notifications are dropped.
    pub fn set_working_solution(&mut self, solution: S) -> Result<()> {
        let session = load_session(
            &self.session_factory,
            &self.core.descriptor,
            &solution,
            self.config.constraint_match_enabled,
            self.config_weights.as_ref(),
        )?;
        self.core.solution = solution;
        self.core.session = session;
        self.core.pending_error = None;
        self.listeners.reset_working_solution(&self.core.solution);
        Ok(())
    }

    /// Calculates the score of the working solution and stores it in the solution.
    ///
    /// Fails if listener notifications are still queued. With
    /// [`FullAssert`](scoreforge_config::EnvironmentMode::FullAssert) every
    /// score is checked against a session built from scratch.
    pub fn calculate_score(&mut self) -> Result<InitScore<S::Score>> {
        let pending = self.listeners.pending_count();
        if pending > 0 {
            return Err(ScoreForgeError::PendingVariableListenerNotifications { count: pending });
        }
        self.core.take_pending_error()?;

        self.calculation_count += 1;
        let init_score = self.core.solution.init_score();
        let score = self
            .core
            .session
            .calculate_score(&self.core.solution, init_score);
        self.core.solution.set_score(Some(score.score()));

        if self.config.environment_mode.is_fully_asserted() {
            self.assert_working_score_from_scratch(score)?;
        }
        Ok(score)
    }

    /// Compares `working` with the score of a session built from scratch
    /// over the working solution.
    ///
    /// A mismatch means a change to the working solution was not reported,
    /// or was reported to the wrong fact.
    pub fn assert_working_score_from_scratch(&self, working: InitScore<S::Score>) -> Result<()> {
        let solution = &self.core.solution;
        let mut scratch = load_session(
            &self.session_factory,
            &self.core.descriptor,
            solution,
            true,
            self.config_weights.as_ref(),
        )?;
        let uncorrected = scratch.calculate_score(solution, solution.init_score());
        if uncorrected == working {
            return Ok(());
        }

        let analysis = corruption_analysis(&self.core.session, &scratch);
        error!(
            event = "score_corruption",
            working = %working,
            uncorrected = %uncorrected,
            calculation = self.calculation_count,
        );
        Err(ScoreForgeError::ScoreCorruption {
            working: working.to_string(),
            uncorrected: uncorrected.to_string(),
            analysis,
        })
    }

    /// An entity was inserted at `entity.index` of its class collection.
    ///
    /// The entities behind it moved up one position and are re-evaluated.
    /// Queues an entity-added notification for the new entity and every
    /// moved one, for each list variable of the entity's class.
    pub fn after_entity_added(&mut self, entity: FactRef) -> Result<()> {
        let descriptor = Arc::clone(&self.core.descriptor);
        if descriptor.class(entity.class).is_none() {
            return Err(ScoreForgeError::UnknownClass { id: entity.class.0 });
        }
        if !descriptor.is_entity_class(entity.class) {
            return Err(ScoreForgeError::UnknownEntityClass {
                class: descriptor.class_name(entity.class).to_string(),
            });
        }
        let moved = self.insert_at(entity)?;
        self.notify_entities_added(&descriptor, entity, moved);
        Ok(())
    }

    /// An entity is about to be removed; its list elements lose their shadows.
    pub fn before_entity_removed(&mut self, entity: FactRef) -> Result<()> {
        let descriptor = Arc::clone(&self.core.descriptor);
        for list_variable in list_variable_ids(&descriptor, entity) {
            self.listeners
                .before_entity_removed(&mut self.core, list_variable, entity.index);
        }
        self.core.take_pending_error()
    }

    /// The entity at `entity.index` was removed from its class collection.
    ///
    /// The entities behind it moved down one position; they are re-evaluated
    /// and their list shadows rewritten on the next trigger.
    pub fn after_entity_removed(&mut self, entity: FactRef) -> Result<()> {
        let descriptor = Arc::clone(&self.core.descriptor);
        let moved = self.retract_at(entity)?;
        self.notify_entities_added(&descriptor, entity, moved);
        Ok(())
    }

    pub fn before_variable_changed(&mut self, _entity: FactRef, _variable_name: &str) {}

    /// A basic variable of `entity` changed.
    pub fn after_variable_changed(&mut self, entity: FactRef, _variable_name: &str) -> Result<()> {
        self.core.session.update(entity)
    }

    /// Elements in `[from_index, to_index)` of an entity's list are about to change.
    pub fn before_list_variable_changed(
        &mut self,
        entity: usize,
        list_variable: ListVariableId,
        from_index: usize,
        to_index: usize,
    ) -> Result<()> {
        self.listeners.before_list_variable_changed(
            &mut self.core,
            list_variable,
            entity,
            from_index,
            to_index,
        );
        self.core.take_pending_error()
    }

    /// Elements in `[from_index, to_index)` of an entity's list changed.
    pub fn after_list_variable_changed(
        &mut self,
        entity: usize,
        list_variable: ListVariableId,
        from_index: usize,
        to_index: usize,
    ) -> Result<()> {
        let owner = self.list_owner(list_variable, entity)?;
        self.listeners.notify(ListVariableNotification::RangeChanged {
            list_variable,
            entity,
            from_index,
            to_index,
        });
        self.core.session.update(owner)
    }

    /// One element was inserted at `index` of an entity's list.
    pub fn after_list_element_added(
        &mut self,
        entity: usize,
        list_variable: ListVariableId,
        index: usize,
    ) -> Result<()> {
        let owner = self.list_owner(list_variable, entity)?;
        self.listeners.notify(ListVariableNotification::ElementAdded {
            list_variable,
            entity,
            index,
        });
        self.core.session.update(owner)
    }

    /// One element was removed from `index` of an entity's list.
    pub fn after_list_element_removed(
        &mut self,
        entity: usize,
        list_variable: ListVariableId,
        index: usize,
    ) -> Result<()> {
        let owner = self.list_owner(list_variable, entity)?;
        self.listeners.notify(ListVariableNotification::ElementRemoved {
            list_variable,
            entity,
            index,
        });
        self.core.session.update(owner)
    }

    /// An element left every list of `list_variable`.
    pub fn after_list_element_unassigned(&mut self, list_variable: ListVariableId, element: usize) {
        self.listeners
            .notify(ListVariableNotification::ElementUnassigned {
                list_variable,
                element,
            });
    }

    /// A problem fact was inserted at `fact.index`; later facts moved up.
    pub fn after_problem_fact_added(&mut self, fact: FactRef) -> Result<()> {
        self.insert_at(fact).map(|_| ())
    }

    pub fn after_problem_property_changed(&mut self, fact: FactRef) -> Result<()> {
        self.core.session.update(fact)
    }

    /// The problem fact at `fact.index` was removed; later facts moved down.
    ///
    /// Facts elsewhere that referenced the moved positions must be reported
    /// as changed by the caller.
    pub fn after_problem_fact_removed(&mut self, fact: FactRef) -> Result<()> {
        self.retract_at(fact).map(|_| ())
    }

    /// Delivers every queued listener notification.
    ///
    /// Returns how many notifications were delivered.
    pub fn trigger_variable_listeners(&mut self) -> Result<usize> {
        let delivered = self.listeners.trigger(&mut self.core);
        self.core.take_pending_error()?;
        Ok(delivered)
    }

    pub fn pending_notification_count(&self) -> usize {
        self.listeners.pending_count()
    }

    /// Match totals keyed by constraint full name, as of the last calculated
    /// score; empty unless constraint matching is enabled.
    pub fn constraint_match_total_map(&self) -> &BTreeMap<String, ConstraintMatchTotal<S::Score>> {
        self.core.session.constraint_match_total_map()
    }

    pub fn indictment_map(&self) -> &IndictmentMap<S::Score> {
        self.core.session.indictment_map()
    }

    /// Explains the last calculated score.
    pub fn explain_score(&self) -> ScoreExplanation<S::Score> {
        self.core.session.explain(self.core.solution.init_score())
    }

    pub fn is_constraint_match_enabled(&self) -> bool {
        self.core.session.is_tracking()
    }

    pub fn calculation_count(&self) -> u64 {
        self.calculation_count
    }

    pub fn reset_calculation_count(&mut self) {
        self.calculation_count = 0;
    }

    pub fn move_count(&self) -> u64 {
        self.move_count
    }

    pub fn increment_move_count(&mut self) {
        self.move_count += 1;
    }

    fn class_count(&self, fact: FactRef) -> Result<usize> {
        self.core
            .descriptor
            .class(fact.class)
            .map(|class| class.count(&self.core.solution))
            .ok_or(ScoreForgeError::UnknownClass { id: fact.class.0 })
    }

    // Facts are addressed by position: an insertion at `fact.index` moves
    // every later fact up one slot. The collection's new last slot is
    // inserted and the moved slots are updated in place.
    fn insert_at(&mut self, fact: FactRef) -> Result<Range<usize>> {
        let count = self.class_count(fact)?;
        if fact.index >= count {
            return Err(ScoreForgeError::InvalidState(format!(
                "The fact ({}) is outside its collection of {} fact(s)",
                fact, count
            )));
        }
        self.core.session.insert(FactRef::new(fact.class, count - 1))?;
        for index in fact.index..count - 1 {
            self.core.session.update(FactRef::new(fact.class, index))?;
        }
        Ok(fact.index..count)
    }

    // A removal at `fact.index` moves every later fact down one slot. The
    // old last slot is retracted and the moved slots are updated in place.
    fn retract_at(&mut self, fact: FactRef) -> Result<Range<usize>> {
        let remaining = self.class_count(fact)?;
        if fact.index > remaining {
            return Err(ScoreForgeError::InvalidState(format!(
                "The fact ({}) is outside its collection of {} fact(s) before removal",
                fact,
                remaining + 1
            )));
        }
        self.core
            .session
            .retract(FactRef::new(fact.class, remaining))?;
        for index in fact.index..remaining {
            self.core.session.update(FactRef::new(fact.class, index))?;
        }
        Ok(fact.index..remaining)
    }

    fn notify_entities_added(
        &mut self,
        descriptor: &SolutionDescriptor<S>,
        entity: FactRef,
        positions: Range<usize>,
    ) {
        for list_variable in list_variable_ids(descriptor, entity) {
            for index in positions.clone() {
                self.listeners.notify(ListVariableNotification::EntityAdded {
                    list_variable,
                    entity: index,
                });
            }
        }
    }

    fn list_owner(&self, list_variable: ListVariableId, entity: usize) -> Result<FactRef> {
        self.core
            .descriptor
            .list_variable(list_variable)
            .map(|list| list.entity_ref(entity))
            .ok_or_else(|| {
                ScoreForgeError::InvalidState(format!(
                    "Unknown list variable ({})",
                    list_variable.0
                ))
            })
    }
}

impl<S: PlanningSolution> fmt::Debug for BavetScoreDirector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BavetScoreDirector")
            .field("session", &self.core.session)
            .field("listeners", &self.listeners.listener_count())
            .field("environment_mode", &self.config.environment_mode)
            .field("calculation_count", &self.calculation_count)
            .finish()
    }
}

fn list_variable_ids<S>(
    descriptor: &SolutionDescriptor<S>,
    entity: FactRef,
) -> SmallVec<[ListVariableId; 2]> {
    descriptor
        .list_variables_of(entity.class)
        .map(|list| list.id)
        .collect()
}

fn load_session<S: PlanningSolution>(
    session_factory: &ConstraintSessionFactory<S, S::Score>,
    descriptor: &SolutionDescriptor<S>,
    solution: &S,
    tracking: bool,
    config_weights: Option<&ConstraintWeightOverrides<S::Score>>,
) -> Result<ConstraintSession<S, S::Score>> {
    let config_weights = config_weights.map(|w| w as &dyn WeightProvider<S::Score>);
    let mut session =
        session_factory.build_session_with(descriptor, solution, tracking, config_weights)?;
    let mut inserted = Ok(());
    let mut facts = 0usize;
    descriptor.for_each_fact(solution, |fact| {
        if inserted.is_ok() {
            inserted = session.insert(fact);
            facts += 1;
        }
    });
    inserted?;
    debug!(event = "working_solution_set", facts, tracking);
    Ok(session)
}

// Per-constraint differences between the working and the from-scratch session.
fn corruption_analysis<S, Sc: scoreforge_core::Score>(
    working: &ConstraintSession<S, Sc>,
    scratch: &ConstraintSession<S, Sc>,
) -> String {
    let expected: HashMap<_, _> = scratch
        .explain(0)
        .constraint_analyses
        .into_iter()
        .map(|a| (a.constraint_ref, (a.score, a.match_count)))
        .collect();

    let mut analysis = String::new();
    for actual in working.explain(0).constraint_analyses {
        let Some(&(score, match_count)) = expected.get(&actual.constraint_ref) else {
            continue;
        };
        if actual.score != score || actual.match_count != match_count {
            let _ = write!(
                analysis,
                "\n  The constraint ({}) has a working score of ({}) over {} match(es) \
                 but an uncorrected score of ({}) over {} match(es).",
                actual.constraint_ref, actual.score, actual.match_count, score, match_count
            );
        }
    }
    if analysis.is_empty() {
        analysis.push_str("\n  No single constraint differs.");
    }
    analysis.push_str(
        "\n  Check that every change to the working solution is reported to the score director.",
    );
    analysis
}
