//! Conditional-visibility evaluation over a whole form.
//!
//! [`VisibilityEngine::evaluate_all`] decides the effective visibility of
//! every field, page and navigation button. A field is visible when its page,
//! every enclosing container and its own rule-group all are. References
//! resolve to a field in scope first and to a registry variable second; a
//! hidden field contributes `null`. Dependency errors found by the
//! [`DependencyGraph`] block the offending rules and are reported alongside
//! the result, the rest of the form keeps evaluating.

mod context;
mod evaluate;
mod graph;
mod report;
mod trace;
mod tracker;

pub use context::{EvaluationContext, FieldValueProvider, NoValues, ValueContext, reference_limit};
pub use evaluate::{evaluate_group, evaluate_group_traced};
pub use graph::{DependencyGraph, Node};
pub use report::{ButtonVisibility, EvaluationWarning, VisibilityReport};
pub use trace::{GroupTrace, Lookup, RuleTrace, TargetTrace, TraceFormatter};
pub use tracker::{VisibilityChange, VisibilityTracker};

use crate::condition::{Logic, Rule, RuleGroup, Target};
use crate::error::DependencyError;
use crate::form::Form;
use crate::tree::{ContainerSlot, walk};
use crate::value::Value;
use crate::variables::VariableRegistry;
use ahash::{AHashMap, AHashSet};
use evaluate::trace_group;
use tracing::{debug, warn};

/// Evaluates the visibility of a form.
///
/// The engine holds only configuration; every call receives the form, the
/// field values and the variable registry explicitly and works on shared
/// borrows of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEngine {
    collision_warnings: bool,
    traces: bool,
}

impl Default for VisibilityEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub struct VisibilityEngineBuilder {
    collision_warnings: bool,
    traces: bool,
}

impl VisibilityEngineBuilder {
    pub fn new() -> Self {
        Self {
            collision_warnings: true,
            traces: true,
        }
    }

    /// Report names that are both an in-scope field and a variable.
    pub fn with_collision_warnings(mut self, enabled: bool) -> Self {
        self.collision_warnings = enabled;
        self
    }

    /// Keep per-target traces so the report can explain itself.
    pub fn with_traces(mut self, enabled: bool) -> Self {
        self.traces = enabled;
        self
    }

    pub fn build(self) -> VisibilityEngine {
        VisibilityEngine {
            collision_warnings: self.collision_warnings,
            traces: self.traces,
        }
    }
}

impl Default for VisibilityEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> VisibilityEngineBuilder {
        VisibilityEngineBuilder::new()
    }

    /// Evaluates every rule-group of the form.
    ///
    /// Deterministic: the same form, values and registry always give the same
    /// report.
    pub fn evaluate_all<P>(
        &self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
    ) -> VisibilityReport
    where
        P: FieldValueProvider + ?Sized,
    {
        let graph = DependencyGraph::build(form);
        self.evaluate_with_graph(form, values, variables, &graph)
    }

    /// Like [`VisibilityEngine::evaluate_all`] with a graph built earlier for
    /// the same form.
    pub fn evaluate_with_graph<P>(
        &self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
        graph: &DependencyGraph,
    ) -> VisibilityReport
    where
        P: FieldValueProvider + ?Sized,
    {
        let mut pass = Pass::new(self, form, values, variables, graph);
        pass.run();
        debug!(targets = pass.visible.len(), "evaluated form visibility");
        pass.into_report(None)
    }

    /// Recomputes only `affected`, taking every other target from `previous`.
    pub(crate) fn reevaluate<P>(
        &self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
        graph: &DependencyGraph,
        affected: &AHashSet<Target>,
        previous: &VisibilityReport,
    ) -> VisibilityReport
    where
        P: FieldValueProvider + ?Sized,
    {
        let mut pass = Pass::new(self, form, values, variables, graph);
        for (target, visible) in previous.targets() {
            if !affected.contains(&target) {
                pass.visible.insert(target, visible);
            }
        }
        pass.run();
        debug!(affected = affected.len(), "re-evaluated form visibility");
        pass.into_report(Some((previous, affected)))
    }
}

/// One evaluation pass. Results are memoized per target, so every rule-group
/// is evaluated at most once however many rules reference its owner.
struct Pass<'a, P: FieldValueProvider + ?Sized> {
    engine: &'a VisibilityEngine,
    form: &'a Form,
    values: &'a P,
    variables: &'a VariableRegistry,
    graph: &'a DependencyGraph,
    order: Vec<Target>,
    groups: AHashMap<Target, &'a RuleGroup>,
    page_of: AHashMap<&'a str, usize>,
    parent: AHashMap<&'a str, String>,
    visible: AHashMap<Target, bool>,
    traces: AHashMap<Target, TargetTrace>,
    stack: Vec<Target>,
    warnings: Vec<EvaluationWarning>,
    collisions: AHashSet<(Target, String)>,
    reentries: Vec<DependencyError>,
}

impl<'a, P: FieldValueProvider + ?Sized> Pass<'a, P> {
    fn new(
        engine: &'a VisibilityEngine,
        form: &'a Form,
        values: &'a P,
        variables: &'a VariableRegistry,
        graph: &'a DependencyGraph,
    ) -> Self {
        let mut page_of = AHashMap::new();
        let mut parent = AHashMap::new();
        for (index, page) in form.pages.iter().enumerate() {
            walk::visit(&page.fields, &ContainerSlot::Root, &mut |field, slot, _| {
                page_of.insert(field.id.as_str(), index);
                if let Some(container) = slot.container_id() {
                    parent.insert(field.id.as_str(), container.to_string());
                }
            });
        }
        let rule_groups = form.rule_groups();
        let order = rule_groups.iter().map(|(target, _)| target.clone()).collect();
        let groups = rule_groups.into_iter().collect();

        Self {
            engine,
            form,
            values,
            variables,
            graph,
            order,
            groups,
            page_of,
            parent,
            visible: AHashMap::new(),
            traces: AHashMap::new(),
            stack: Vec::new(),
            warnings: Vec::new(),
            collisions: AHashSet::new(),
            reentries: Vec::new(),
        }
    }

    fn run(&mut self) {
        let order = std::mem::take(&mut self.order);
        for target in &order {
            self.visibility(target);
        }
        self.order = order;
    }

    /// Effective visibility of `target`, memoized.
    fn visibility(&mut self, target: &Target) -> bool {
        if let Some(visible) = self.visible.get(target) {
            return *visible;
        }
        if let Some(position) = self.stack.iter().position(|t| t == target) {
            self.report_reentry(position, target);
            return false;
        }

        self.stack.push(target.clone());
        let hidden_by = match self.enclosing(target) {
            Some(parent) if !self.visibility(&parent) => Some(parent),
            _ => None,
        };
        let group = self.evaluate_own(target);
        self.stack.pop();

        let visible = hidden_by.is_none() && group.outcome;
        self.visible.insert(target.clone(), visible);
        if self.engine.traces {
            self.traces.insert(
                target.clone(),
                TargetTrace {
                    group,
                    hidden_by,
                    visible,
                },
            );
        }
        visible
    }

    /// The page or container that must be visible for `target` to be.
    fn enclosing(&self, target: &Target) -> Option<Target> {
        match target {
            Target::Field(id) => match self.parent.get(id.as_str()) {
                Some(container) => Some(Target::field(container.as_str())),
                None => self.page_of.get(id.as_str()).map(|page| Target::Page(*page)),
            },
            Target::Page(_) => None,
            Target::Button { page, .. } => Some(Target::Page(*page)),
        }
    }

    fn evaluate_own(&mut self, target: &Target) -> GroupTrace {
        let Some(group) = self.groups.get(target).copied() else {
            return GroupTrace::unrestricted(true, Logic::And);
        };
        let limit = match target {
            Target::Field(id) => self.page_of.get(id.as_str()).map_or(0, |page| page + 1),
            Target::Page(page) | Target::Button { page, .. } => *page,
        };
        trace_group(group, |index, rule| self.lookup(target, limit, index, rule))
    }

    fn lookup(&mut self, owner: &Target, limit: usize, index: usize, rule: &Rule) -> Lookup {
        if self.graph.is_blocked(owner, index) {
            return Lookup::Blocked;
        }
        let reference = rule.depends_on.as_str();
        match self.page_of.get(reference).copied() {
            Some(page) if page < limit => {
                if self.engine.collision_warnings && self.variables.has(reference) {
                    self.note_collision(owner, reference);
                }
                if self.visibility(&Target::field(reference)) {
                    Lookup::Found(self.values.value_of(reference).unwrap_or(Value::Null))
                } else {
                    Lookup::Hidden
                }
            }
            _ => match self.variables.get(reference) {
                Some(value) => Lookup::Found(value.clone()),
                None => Lookup::Unresolved,
            },
        }
    }

    fn note_collision(&mut self, owner: &Target, name: &str) {
        if self.collisions.insert((owner.clone(), name.to_string())) {
            warn!(owner = %owner, name = %name, "reference is both a field and a variable; using the field");
            self.warnings.push(EvaluationWarning::NamespaceCollision {
                target: owner.clone(),
                name: name.to_string(),
            });
        }
    }

    fn report_reentry(&mut self, position: usize, target: &Target) {
        let Some(owner) = self.stack.last().cloned() else {
            return;
        };
        let mut cycle: Vec<String> = self.stack[position..]
            .iter()
            .map(|t| Node::Target(t.clone()).to_string())
            .collect();
        cycle.push(Node::Target(target.clone()).to_string());
        let error = DependencyError::Circular {
            target: owner,
            depends_on: Node::Target(target.clone()).to_string(),
            cycle,
        };
        warn!(%error, "re-entered a target during evaluation");
        if !self.reentries.contains(&error) {
            self.reentries.push(error);
        }
    }

    fn into_report(
        self,
        previous: Option<(&VisibilityReport, &AHashSet<Target>)>,
    ) -> VisibilityReport {
        let visible = |target: Target| self.visible.get(&target).copied().unwrap_or(false);

        let fields = self
            .form
            .fields()
            .into_iter()
            .map(|(_, field)| (field.id.clone(), visible(Target::field(field.id.as_str()))))
            .collect();
        let pages = (0..self.form.pages.len())
            .map(|page| visible(Target::Page(page)))
            .collect();
        let buttons = (0..self.form.pages.len())
            .map(|page| ButtonVisibility {
                next: visible(Target::next_button(page)),
                submit: visible(Target::submit_button(page)),
            })
            .collect();

        let mut errors = self.graph.errors().to_vec();
        errors.extend(self.reentries);
        let mut warnings = self.warnings;
        let mut traces = self.traces;
        if let Some((previous, affected)) = previous {
            warnings.extend(
                previous
                    .warnings
                    .iter()
                    .filter(|w| !affected.contains(w.target()))
                    .cloned(),
            );
            for (target, trace) in &previous.traces {
                if !affected.contains(target) {
                    traces.entry(target.clone()).or_insert_with(|| trace.clone());
                }
            }
        }

        VisibilityReport {
            fields,
            pages,
            buttons,
            errors,
            warnings,
            traces,
        }
    }
}
