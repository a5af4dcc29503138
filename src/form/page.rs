use super::Field;
use crate::condition::{NavButton, RuleGroup};
use crate::value::Value;
use crate::variables::VariableRegistry;
use serde::{Deserialize, Serialize};

/// One page of a form and its top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_mapping: Option<ObjectMapping>,
    /// Variable holding the record id for `update` actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id_variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QuerySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatConfig>,
    #[serde(default)]
    pub hidden_fields: Vec<HiddenField>,
    #[serde(default)]
    pub conditional_visibility: RuleGroup,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

impl Page {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            fields: Vec::new(),
            object_mapping: None,
            record_id_variable: None,
            query: None,
            repeat: None,
            hidden_fields: Vec::new(),
            conditional_visibility: RuleGroup::default(),
            navigation: NavigationConfig::default(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_visibility(mut self, group: RuleGroup) -> Self {
        self.conditional_visibility = group;
        self
    }

    pub fn button_rules(&self, button: NavButton) -> &RuleGroup {
        match button {
            NavButton::Next => &self.navigation.next,
            NavButton::Submit => &self.navigation.submit,
        }
    }

    pub fn button_rules_mut(&mut self, button: NavButton) -> &mut RuleGroup {
        match button {
            NavButton::Next => &mut self.navigation.next,
            NavButton::Submit => &mut self.navigation.submit,
        }
    }
}

/// Maps a page to an external object. Both strings are opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMapping {
    pub object: String,
    /// `create`, `update` or `get`.
    pub action: String,
}

/// Record query used by `get` pages. Filters and where-conditions are kept as
/// raw JSON because only the external record store interprets them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<serde_json::Value>,
    #[serde(default, rename = "where")]
    pub where_conditions: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatConfig {
    #[serde(default)]
    pub min_instances: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HiddenValueSource {
    Static,
    Variable,
    CurrentUser,
}

/// A value written to an external field without being shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenField {
    pub external_field: String,
    pub source: HiddenValueSource,
    #[serde(default)]
    pub value: String,
}

impl HiddenField {
    /// Resolves the value submitted for this hidden field. A variable that is
    /// not set resolves to `Null`.
    pub fn resolve(&self, variables: &VariableRegistry, current_user: Option<&Value>) -> Value {
        match self.source {
            HiddenValueSource::Static => Value::Text(self.value.clone()),
            HiddenValueSource::Variable => variables.get(&self.value).cloned().unwrap_or_default(),
            HiddenValueSource::CurrentUser => current_user.cloned().unwrap_or_default(),
        }
    }
}

/// Rule-groups gating the page's navigation buttons.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub next: RuleGroup,
    #[serde(default)]
    pub submit: RuleGroup,
}
