use crate::condition::{Logic, Rule, Target};
use crate::value::Value;
use itertools::Itertools;

/// How a rule's reference was resolved during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Value),
    /// The referenced field is hidden and counts as `null`.
    Hidden,
    /// Neither a field in scope nor a variable.
    Unresolved,
    /// The rule takes part in a dependency error and was not evaluated.
    Blocked,
}

impl Lookup {
    /// The value the operator is applied to, if it runs at all.
    pub fn operand(&self) -> Option<Value> {
        match self {
            Lookup::Found(value) => Some(value.clone()),
            Lookup::Hidden => Some(Value::Null),
            Lookup::Unresolved | Lookup::Blocked => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTrace {
    pub rule: Rule,
    pub lookup: Lookup,
    pub outcome: bool,
}

/// A record of how a rule-group was evaluated, rule by rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTrace {
    pub enabled: bool,
    pub logic: Logic,
    pub rules: Vec<RuleTrace>,
    pub outcome: bool,
}

impl GroupTrace {
    /// Trace of a group that imposes no restriction.
    pub fn unrestricted(enabled: bool, logic: Logic) -> Self {
        Self {
            enabled,
            logic,
            rules: Vec::new(),
            outcome: true,
        }
    }
}

/// Everything that decided one target's visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetTrace {
    pub group: GroupTrace,
    /// Enclosing page or container that is hidden, if any.
    pub hidden_by: Option<Target>,
    pub visible: bool,
}

/// Formats evaluation traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Explains a target's visibility, e.g.
    /// `hidden: $email is_not_empty (was "")`.
    pub fn format_target(trace: &TargetTrace) -> String {
        let verdict = if trace.visible { "shown" } else { "hidden" };
        match &trace.hidden_by {
            Some(parent) => format!("{}: {} is hidden", verdict, parent),
            None => format!("{}: {}", verdict, Self::format_group(&trace.group)),
        }
    }

    /// Format a group trace as its rules joined by the group's logic.
    pub fn format_group(trace: &GroupTrace) -> String {
        if !trace.enabled {
            return "conditions disabled".to_string();
        }
        if trace.rules.is_empty() {
            return "no conditions".to_string();
        }
        let separator = format!(" {} ", trace.logic);
        trace
            .rules
            .iter()
            .map(Self::format_rule)
            .join(&separator)
    }

    fn format_rule(trace: &RuleTrace) -> String {
        let detail = match &trace.lookup {
            Lookup::Found(value) => format!("was {}", value),
            Lookup::Hidden => "hidden, counts as null".to_string(),
            Lookup::Unresolved => "unresolved".to_string(),
            Lookup::Blocked => "blocked by dependency error".to_string(),
        };
        format!("{} ({})", trace.rule, detail)
    }
}
