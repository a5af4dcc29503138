use super::Rule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the rules of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Logic {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl Logic {
    pub fn combine(&self, outcomes: &[bool]) -> bool {
        match self {
            Logic::And => outcomes.iter().all(|o| *o),
            Logic::Or => outcomes.iter().any(|o| *o),
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::And => write!(f, "AND"),
            Logic::Or => write!(f, "OR"),
        }
    }
}

/// Conditional visibility attached to a field, a page or a navigation button.
///
/// A disabled group, or an enabled group without rules, imposes no
/// restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    /// An enabled group with the given logic and rules.
    pub fn new(logic: Logic, rules: Vec<Rule>) -> Self {
        Self {
            enabled: true,
            logic,
            rules,
        }
    }

    pub fn all(rules: Vec<Rule>) -> Self {
        Self::new(Logic::And, rules)
    }

    pub fn any(rules: Vec<Rule>) -> Self {
        Self::new(Logic::Or, rules)
    }

    /// True when the group can hide its owner at all.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.rules.is_empty()
    }

    /// References of every rule, in rule order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.depends_on.as_str())
    }

    pub fn references_any(&self, reference: &str) -> bool {
        self.rules.iter().any(|r| r.depends_on == reference)
    }
}
