use super::{DependencyGraph, FieldValueProvider, Node, VisibilityEngine, VisibilityReport};
use crate::condition::Target;
use crate::form::Form;
use crate::variables::VariableRegistry;
use ahash::AHashSet;
use tracing::debug;

/// A target whose visibility flipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityChange {
    pub target: Target,
    pub visible: bool,
}

/// Keeps a visibility report current as values, variables and the active page
/// change.
///
/// Each trigger recomputes only the targets that depend on what changed and
/// reuses the cached result for everything else. The dependency graph is
/// built once; call [`VisibilityTracker::refresh`] after structural edits to
/// the form.
#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    engine: VisibilityEngine,
    graph: DependencyGraph,
    report: VisibilityReport,
    current_page: usize,
}

impl VisibilityTracker {
    pub fn new<P>(
        engine: VisibilityEngine,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
    ) -> Self
    where
        P: FieldValueProvider + ?Sized,
    {
        let graph = DependencyGraph::build(form);
        let report = engine.evaluate_with_graph(form, values, variables, &graph);
        Self {
            engine,
            graph,
            report,
            current_page: 0,
        }
    }

    pub fn report(&self) -> &VisibilityReport {
        &self.report
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// A field's value changed.
    pub fn field_changed<P>(
        &mut self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
        field_id: &str,
    ) -> Vec<VisibilityChange>
    where
        P: FieldValueProvider + ?Sized,
    {
        let affected = self
            .graph
            .affected_by([Node::Target(Target::field(field_id))]);
        debug!(field = %field_id, affected = affected.len(), "field changed");
        self.update(form, values, variables, &affected)
    }

    /// A variable was written or deleted.
    pub fn variable_written<P>(
        &mut self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
        name: &str,
    ) -> Vec<VisibilityChange>
    where
        P: FieldValueProvider + ?Sized,
    {
        let affected = self.graph.affected_by([Node::Variable(name.to_string())]);
        debug!(variable = %name, affected = affected.len(), "variable written");
        self.update(form, values, variables, &affected)
    }

    /// The active page changed. Every page and button rule-group is
    /// recomputed, together with whatever depends on them.
    pub fn page_changed<P>(
        &mut self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
        page: usize,
    ) -> Vec<VisibilityChange>
    where
        P: FieldValueProvider + ?Sized,
    {
        self.current_page = page;
        let page_targets = form.page_targets();
        let mut affected = self
            .graph
            .affected_by(page_targets.iter().cloned().map(Node::Target));
        affected.extend(page_targets);
        debug!(page, affected = affected.len(), "page changed");
        self.update(form, values, variables, &affected)
    }

    /// Rebuilds the graph and evaluates everything.
    pub fn refresh<P>(
        &mut self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
    ) -> Vec<VisibilityChange>
    where
        P: FieldValueProvider + ?Sized,
    {
        self.graph = DependencyGraph::build(form);
        let report = self
            .engine
            .evaluate_with_graph(form, values, variables, &self.graph);
        self.replace(report)
    }

    fn update<P>(
        &mut self,
        form: &Form,
        values: &P,
        variables: &VariableRegistry,
        affected: &AHashSet<Target>,
    ) -> Vec<VisibilityChange>
    where
        P: FieldValueProvider + ?Sized,
    {
        if affected.is_empty() {
            return Vec::new();
        }
        let report =
            self.engine
                .reevaluate(form, values, variables, &self.graph, affected, &self.report);
        self.replace(report)
    }

    fn replace(&mut self, report: VisibilityReport) -> Vec<VisibilityChange> {
        let changes = report
            .targets()
            .into_iter()
            .filter(|(target, visible)| self.report.visibility(target) != Some(*visible))
            .map(|(target, visible)| VisibilityChange { target, visible })
            .collect();
        self.report = report;
        changes
    }
}
