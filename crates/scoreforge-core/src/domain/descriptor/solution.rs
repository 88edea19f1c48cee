//! Solution descriptor and its builder.

use std::collections::HashMap;
use std::fmt;

use super::class::{ClassDescriptor, ClassKind};
use super::variable::{
    BasicVariableDescriptor, ListVariableDescriptor, ListVariableId, ShadowVariableDescriptor,
};
use crate::domain::fact::{ClassId, FactRef};
use crate::domain::variable::{ShadowVariableKind, VariableType};
use crate::error::{Result, ScoreForgeError};

/// Describes a planning solution: its classes, their hierarchy, and the
/// variables declared on them.
///
/// Built once with [`SolutionDescriptor::builder`]; every shadow variable is
/// linked to its source list variable and validated in
/// [`SolutionDescriptorBuilder::build`].
pub struct SolutionDescriptor<S> {
    pub name: &'static str,
    classes: Vec<ClassDescriptor<S>>,
    class_index: HashMap<&'static str, ClassId>,
    basic_variables: Vec<BasicVariableDescriptor>,
    list_variables: Vec<ListVariableDescriptor<S>>,
    shadow_variables: Vec<ShadowVariableDescriptor<S>>,
}

impl<S> SolutionDescriptor<S> {
    pub fn builder(name: &'static str) -> SolutionDescriptorBuilder<S> {
        SolutionDescriptorBuilder {
            name,
            classes: Vec::new(),
            basic_variables: Vec::new(),
            list_variables: Vec::new(),
            shadows: Vec::new(),
        }
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassDescriptor<S>> {
        self.classes.get(id.0)
    }

    pub fn classes(&self) -> &[ClassDescriptor<S>] {
        &self.classes
    }

    /// The class name, or `"<unknown>"` for an id outside this descriptor.
    pub fn class_name(&self, id: ClassId) -> &'static str {
        self.class(id).map_or("<unknown>", |c| c.name)
    }

    pub fn is_entity_class(&self, id: ClassId) -> bool {
        self.class(id).is_some_and(ClassDescriptor::is_entity)
    }

    /// Returns `actual` followed by each of its ancestors.
    pub fn ancestors(&self, actual: ClassId) -> Vec<ClassId> {
        let mut chain = Vec::new();
        let mut current = self.class(actual);
        while let Some(class) = current {
            chain.push(class.id);
            current = class.parent.and_then(|p| self.class(p));
        }
        chain
    }

    /// True if a fact of class `actual` is also a `declared`.
    pub fn is_assignable(&self, declared: ClassId, actual: ClassId) -> bool {
        let mut current = self.class(actual);
        while let Some(class) = current {
            if class.id == declared {
                return true;
            }
            current = class.parent.and_then(|p| self.class(p));
        }
        false
    }

    /// Visits every fact of the solution, class by class in registration order.
    pub fn for_each_fact(&self, solution: &S, mut visit: impl FnMut(FactRef)) {
        for class in &self.classes {
            for index in 0..class.count(solution) {
                visit(FactRef::new(class.id, index));
            }
        }
    }

    pub fn fact_count(&self, solution: &S) -> usize {
        self.classes.iter().map(|c| c.count(solution)).sum()
    }

    pub fn basic_variables(&self) -> &[BasicVariableDescriptor] {
        &self.basic_variables
    }

    pub fn list_variable(&self, id: ListVariableId) -> Option<&ListVariableDescriptor<S>> {
        self.list_variables.get(id.0)
    }

    pub fn list_variables(&self) -> &[ListVariableDescriptor<S>] {
        &self.list_variables
    }

    /// List variables declared on `entity_class` or one of its ancestors.
    pub fn list_variables_of(
        &self,
        entity_class: ClassId,
    ) -> impl Iterator<Item = &ListVariableDescriptor<S>> + '_ {
        self.list_variables
            .iter()
            .filter(move |v| self.is_assignable(v.entity_class, entity_class))
    }

    pub fn shadow_variables(&self) -> &[ShadowVariableDescriptor<S>] {
        &self.shadow_variables
    }

    /// Shadow variables sourced from the given list variable.
    pub fn shadows_of(
        &self,
        source: ListVariableId,
    ) -> impl Iterator<Item = &ShadowVariableDescriptor<S>> + '_ {
        self.shadow_variables
            .iter()
            .filter(move |s| s.source == source)
    }

    /// Resolves the type of a variable visible on `class` (declared on it or an ancestor).
    pub fn variable_type(&self, class: ClassId, name: &str) -> Option<VariableType> {
        if self
            .basic_variables
            .iter()
            .any(|v| v.name == name && self.is_assignable(v.entity_class, class))
        {
            return Some(VariableType::Basic);
        }
        if self
            .list_variables
            .iter()
            .any(|v| v.name == name && self.is_assignable(v.entity_class, class))
        {
            return Some(VariableType::List);
        }
        self.shadow_variables
            .iter()
            .find(|v| v.name == name && self.is_assignable(v.owner_class, class))
            .map(|v| VariableType::Shadow(v.kind))
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("name", &self.name)
            .field("classes", &self.classes)
            .field("basic_variables", &self.basic_variables)
            .field("list_variables", &self.list_variables)
            .field("shadow_variables", &self.shadow_variables)
            .finish()
    }
}

struct ClassDef<S> {
    name: &'static str,
    parent: Option<&'static str>,
    kind: ClassKind,
    counter: Option<fn(&S) -> usize>,
}

struct ListDef<S> {
    entity: &'static str,
    name: &'static str,
    element: &'static str,
    len: fn(&S, usize) -> usize,
    element_at: fn(&S, usize, usize) -> usize,
}

struct ShadowDef<S> {
    owner: &'static str,
    name: &'static str,
    kind: ShadowVariableKind,
    declared: Option<&'static str>,
    source: &'static str,
    get: fn(&S, usize) -> Option<usize>,
    set: fn(&mut S, usize, Option<usize>),
}

/// Collects the schema by name; [`build`](Self::build) resolves and validates it.
///
/// # Example
///
/// ```
/// use scoreforge_core::domain::SolutionDescriptor;
///
/// struct Plan {
///     vehicles: Vec<Vec<usize>>,
///     next: Vec<Option<usize>>,
/// }
///
/// let descriptor = SolutionDescriptor::<Plan>::builder("Plan")
///     .entity_class("Vehicle", None, |p| p.vehicles.len())
///     .entity_class("Visit", None, |p| p.next.len())
///     .list_variable(
///         "Vehicle",
///         "visits",
///         "Visit",
///         |p, v| p.vehicles[v].len(),
///         |p, v, i| p.vehicles[v][i],
///     )
///     .next_element_shadow("Visit", "next", "Visit", "visits", |p, e| p.next[e], |p, e, v| p.next[e] = v)
///     .build()
///     .unwrap();
///
/// assert_eq!(descriptor.shadow_variables().len(), 1);
/// ```
pub struct SolutionDescriptorBuilder<S> {
    name: &'static str,
    classes: Vec<ClassDef<S>>,
    basic_variables: Vec<(&'static str, &'static str)>,
    list_variables: Vec<ListDef<S>>,
    shadows: Vec<ShadowDef<S>>,
}

impl<S> SolutionDescriptorBuilder<S> {
    /// Registers a problem fact class. Parents must be registered first.
    pub fn problem_fact_class(
        mut self,
        name: &'static str,
        parent: Option<&'static str>,
        count: fn(&S) -> usize,
    ) -> Self {
        self.classes.push(ClassDef {
            name,
            parent,
            kind: ClassKind::ProblemFact,
            counter: Some(count),
        });
        self
    }

    /// Registers a planning entity class. Parents must be registered first.
    pub fn entity_class(
        mut self,
        name: &'static str,
        parent: Option<&'static str>,
        count: fn(&S) -> usize,
    ) -> Self {
        self.classes.push(ClassDef {
            name,
            parent,
            kind: ClassKind::Entity,
            counter: Some(count),
        });
        self
    }

    /// Registers a class with no instances of its own.
    pub fn abstract_class(mut self, name: &'static str, parent: Option<&'static str>) -> Self {
        self.classes.push(ClassDef {
            name,
            parent,
            kind: ClassKind::Abstract,
            counter: None,
        });
        self
    }

    pub fn basic_variable(mut self, entity: &'static str, name: &'static str) -> Self {
        self.basic_variables.push((entity, name));
        self
    }

    pub fn list_variable(
        mut self,
        entity: &'static str,
        name: &'static str,
        element: &'static str,
        len: fn(&S, usize) -> usize,
        element_at: fn(&S, usize, usize) -> usize,
    ) -> Self {
        self.list_variables.push(ListDef {
            entity,
            name,
            element,
            len,
            element_at,
        });
        self
    }

    pub fn next_element_shadow(
        self,
        owner: &'static str,
        name: &'static str,
        declared: &'static str,
        source: &'static str,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        self.shadow_variable(
            owner,
            name,
            ShadowVariableKind::NextElement,
            Some(declared),
            source,
            get,
            set,
        )
    }

    pub fn previous_element_shadow(
        self,
        owner: &'static str,
        name: &'static str,
        declared: &'static str,
        source: &'static str,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        self.shadow_variable(
            owner,
            name,
            ShadowVariableKind::PreviousElement,
            Some(declared),
            source,
            get,
            set,
        )
    }

    pub fn inverse_relation_shadow(
        self,
        owner: &'static str,
        name: &'static str,
        declared: &'static str,
        source: &'static str,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        self.shadow_variable(
            owner,
            name,
            ShadowVariableKind::InverseRelation,
            Some(declared),
            source,
            get,
            set,
        )
    }

    pub fn index_shadow(
        self,
        owner: &'static str,
        name: &'static str,
        source: &'static str,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        self.shadow_variable(owner, name, ShadowVariableKind::Index, None, source, get, set)
    }

    /// Registers a shadow variable of any kind.
    ///
    /// `declared` is the class the shadow value refers to; `Index` shadows
    /// declare none. Checked against the source variable by [`build`](Self::build).
    #[allow(clippy::too_many_arguments)]
    pub fn shadow_variable(
        mut self,
        owner: &'static str,
        name: &'static str,
        kind: ShadowVariableKind,
        declared: Option<&'static str>,
        source: &'static str,
        get: fn(&S, usize) -> Option<usize>,
        set: fn(&mut S, usize, Option<usize>),
    ) -> Self {
        self.shadows.push(ShadowDef {
            owner,
            name,
            kind,
            declared,
            source,
            get,
            set,
        });
        self
    }

    /// Resolves every name and links every shadow variable to its source.
    pub fn build(self) -> Result<SolutionDescriptor<S>> {
        let mut descriptor = SolutionDescriptor {
            name: self.name,
            classes: Vec::with_capacity(self.classes.len()),
            class_index: HashMap::new(),
            basic_variables: Vec::new(),
            list_variables: Vec::new(),
            shadow_variables: Vec::new(),
        };

        for def in self.classes {
            if descriptor.class_index.contains_key(def.name) {
                return Err(ScoreForgeError::Config(format!(
                    "class ({}) is registered twice in solution ({})",
                    def.name, self.name
                )));
            }
            let parent = match def.parent {
                Some(parent) => Some(descriptor.class_id(parent).ok_or_else(|| {
                    ScoreForgeError::Config(format!(
                        "class ({}) extends ({}) which is not registered before it",
                        def.name, parent
                    ))
                })?),
                None => None,
            };
            let id = ClassId(descriptor.classes.len());
            descriptor.class_index.insert(def.name, id);
            descriptor.classes.push(ClassDescriptor {
                id,
                name: def.name,
                parent,
                kind: def.kind,
                counter: def.counter,
            });
        }

        for (entity, name) in self.basic_variables {
            let entity_class = descriptor.entity_like_class(entity, name)?;
            descriptor.basic_variables.push(BasicVariableDescriptor { name, entity_class });
        }

        for def in self.list_variables {
            let entity_class = descriptor.entity_like_class(def.entity, def.name)?;
            let element_class = descriptor.resolve(def.element)?;
            descriptor.list_variables.push(ListVariableDescriptor {
                id: ListVariableId(descriptor.list_variables.len()),
                name: def.name,
                entity_class,
                element_class,
                len: def.len,
                element_at: def.element_at,
            });
        }

        for def in self.shadows {
            let shadow = descriptor.link_shadow(def)?;
            descriptor.shadow_variables.push(shadow);
        }

        Ok(descriptor)
    }
}

impl<S> SolutionDescriptor<S> {
    fn resolve(&self, name: &str) -> Result<ClassId> {
        self.class_id(name)
            .ok_or_else(|| ScoreForgeError::Config(format!("unknown class ({})", name)))
    }

    fn entity_like_class(&self, class: &str, variable: &str) -> Result<ClassId> {
        let id = self.resolve(class)?;
        match self.classes[id.0].kind {
            ClassKind::Entity | ClassKind::Abstract => Ok(id),
            ClassKind::ProblemFact => Err(ScoreForgeError::Config(format!(
                "variable ({}) is declared on problem fact class ({})",
                variable, class
            ))),
        }
    }

    fn link_shadow(&self, def: ShadowDef<S>) -> Result<ShadowVariableDescriptor<S>> {
        let owner_class = self.resolve(def.owner)?;
        let shadow = format!("{}.{}", def.owner, def.name);

        let Some(list) = self.list_variables.iter().find(|v| v.name == def.source) else {
            if self.basic_variables.iter().any(|v| v.name == def.source) {
                return Err(ScoreForgeError::NotAListVariable {
                    shadow,
                    source_variable: def.source.to_string(),
                });
            }
            return Err(ScoreForgeError::MissingSourceVariable {
                shadow,
                source_variable: def.source.to_string(),
            });
        };

        // The shadow lives on the list's elements.
        if !self.is_assignable(owner_class, list.element_class) {
            return Err(ScoreForgeError::ShadowTypeMismatch {
                shadow,
                expected: self.class_name(list.element_class).to_string(),
                actual: def.owner.to_string(),
            });
        }

        let expected = match def.kind {
            ShadowVariableKind::NextElement | ShadowVariableKind::PreviousElement => {
                Some(list.element_class)
            }
            ShadowVariableKind::InverseRelation => Some(list.entity_class),
            ShadowVariableKind::Index => None,
        };
        let declared_class = match def.declared {
            Some(declared) => Some(self.resolve(declared)?),
            None => None,
        };
        if declared_class != expected {
            return Err(ScoreForgeError::ShadowTypeMismatch {
                shadow,
                expected: expected.map_or("index", |c| self.class_name(c)).to_string(),
                actual: def.declared.unwrap_or("index").to_string(),
            });
        }

        Ok(ShadowVariableDescriptor {
            name: def.name,
            kind: def.kind,
            owner_class,
            declared_class,
            source: list.id,
            get: def.get,
            set: def.set,
        })
    }
}
