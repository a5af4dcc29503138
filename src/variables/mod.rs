//! The variable registry and the assignments that write into it.

mod registry;
mod template;

pub use registry::VariableRegistry;
pub use template::{NoSource, TemplateSource, render};

use crate::form::{EmailVerifyConfig, Field, LoginConfig};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A field's "set variables on change" configuration: variable name to value
/// template, applied in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableAssignments {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub assignments: IndexMap<String, String>,
}

impl VariableAssignments {
    pub fn new<I, K, V>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            enabled: true,
            assignments: assignments
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Renders every template against `source`. Disabled assignments render
    /// nothing.
    pub fn render(&self, source: &dyn TemplateSource) -> Vec<(String, Value)> {
        if !self.enabled {
            return Vec::new();
        }
        render_map(&self.assignments, source)
    }
}

fn render_map(templates: &IndexMap<String, String>, source: &dyn TemplateSource) -> Vec<(String, Value)> {
    templates
        .iter()
        .map(|(name, template)| (name.clone(), render(template, source)))
        .collect()
}

impl VariableRegistry {
    /// Renders `assignments` against `source` and writes the results.
    /// Returns the names written, in order.
    pub fn apply_assignments(
        &mut self,
        assignments: &VariableAssignments,
        source: &dyn TemplateSource,
    ) -> Vec<String> {
        let writes = assignments.render(source);
        let names = writes.iter().map(|(name, _)| name.clone()).collect();
        self.set_many(writes);
        names
    }
}

/// Keys available to a field's on-change templates.
struct ChangeSource<'a> {
    field_id: &'a str,
    value: &'a Value,
    fallback: &'a dyn TemplateSource,
}

impl TemplateSource for ChangeSource<'_> {
    fn lookup(&self, key: &str) -> Option<Value> {
        match key {
            "value" => Some(self.value.clone()),
            "fieldId" => Some(Value::from(self.field_id)),
            other => self.fallback.lookup(other),
        }
    }
}

impl Field {
    /// Variable writes triggered by this field changing to `value`.
    ///
    /// Templates see `{{value}}` (the new value), `{{fieldId}}`, and any key
    /// of `context`, usually the current registry.
    pub fn variable_writes_on_change(
        &self,
        value: &Value,
        context: &dyn TemplateSource,
    ) -> Vec<(String, Value)> {
        match &self.set_variables {
            Some(assignments) => assignments.render(&ChangeSource {
                field_id: &self.id,
                value,
                fallback: context,
            }),
            None => Vec::new(),
        }
    }
}

impl LoginConfig {
    /// Variable writes for a successful login. `outcome` carries whatever the
    /// login flow reports (user name, record id, ...).
    pub fn success_writes(&self, outcome: &dyn TemplateSource) -> Vec<(String, Value)> {
        render_map(&self.success_variables, outcome)
    }
}

impl EmailVerifyConfig {
    pub fn success_writes(&self, outcome: &dyn TemplateSource) -> Vec<(String, Value)> {
        render_map(&self.success_variables, outcome)
    }
}
