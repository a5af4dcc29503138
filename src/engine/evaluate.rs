use super::context::ValueContext;
use super::trace::{GroupTrace, Lookup, RuleTrace};
use crate::condition::{Rule, RuleGroup};

/// Evaluates one rule-group against a context.
///
/// A disabled group and an enabled group without rules both pass. Otherwise
/// every rule is evaluated, an unresolvable reference makes its rule false,
/// and the outcomes are combined with the group's logic.
///
/// How a reference resolves is up to `context`. Pass a
/// [`scoped`](super::EvaluationContext::scoped) context to get the same
/// answers as the form engine for fields that have no value yet.
pub fn evaluate_group(group: &RuleGroup, context: &impl ValueContext) -> bool {
    evaluate_group_traced(group, context).outcome
}

pub fn evaluate_group_traced(group: &RuleGroup, context: &impl ValueContext) -> GroupTrace {
    trace_group(group, |_, rule| match context.resolve(&rule.depends_on) {
        Some(value) => Lookup::Found(value),
        None => Lookup::Unresolved,
    })
}

/// Shared by the standalone evaluator and the form engine, which resolves
/// references itself.
pub(crate) fn trace_group<F>(group: &RuleGroup, mut lookup: F) -> GroupTrace
where
    F: FnMut(usize, &Rule) -> Lookup,
{
    if !group.enabled || group.rules.is_empty() {
        return GroupTrace::unrestricted(group.enabled, group.logic);
    }

    // No short-circuit: every rule gets a trace.
    let rules: Vec<RuleTrace> = group
        .rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let lookup = lookup(index, rule);
            let outcome = lookup
                .operand()
                .is_some_and(|found| rule.operator.apply(&found, &rule.value));
            RuleTrace {
                rule: rule.clone(),
                lookup,
                outcome,
            }
        })
        .collect();
    let outcomes: Vec<bool> = rules.iter().map(|r| r.outcome).collect();

    GroupTrace {
        enabled: true,
        logic: group.logic,
        outcome: group.logic.combine(&outcomes),
        rules,
    }
}
