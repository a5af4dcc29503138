use crate::condition::Target;
use crate::form::Form;
use crate::value::Value;
use crate::variables::VariableRegistry;
use ahash::AHashMap;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Current user-entered values, supplied by the host UI.
///
/// The engine asks for values by field id and never keeps its own copy.
pub trait FieldValueProvider {
    fn value_of(&self, id: &str) -> Option<Value>;
}

impl FieldValueProvider for HashMap<String, Value> {
    fn value_of(&self, id: &str) -> Option<Value> {
        self.get(id).cloned()
    }
}

impl FieldValueProvider for AHashMap<String, Value> {
    fn value_of(&self, id: &str) -> Option<Value> {
        self.get(id).cloned()
    }
}

impl FieldValueProvider for IndexMap<String, Value> {
    fn value_of(&self, id: &str) -> Option<Value> {
        self.get(id).cloned()
    }
}

impl<P: FieldValueProvider + ?Sized> FieldValueProvider for &P {
    fn value_of(&self, id: &str) -> Option<Value> {
        (**self).value_of(id)
    }
}

/// A provider with no values at all, as for a form nobody has touched yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValues;

impl FieldValueProvider for NoValues {
    fn value_of(&self, _id: &str) -> Option<Value> {
        None
    }
}

/// Resolves a rule's `dependsOn` reference to a value. `None` means the
/// reference names neither a field nor a variable.
pub trait ValueContext {
    fn resolve(&self, reference: &str) -> Option<Value>;
}

impl ValueContext for VariableRegistry {
    fn resolve(&self, reference: &str) -> Option<Value> {
        self.get(reference).cloned()
    }
}

/// Field values first, then variables.
///
/// Without a scope the context does not know the form: every id the provider
/// has a value for counts as a field, and a field nobody has filled in yet is
/// indistinguishable from an unknown name. It falls through to the registry
/// and, absent a variable, stays unresolved, so `is_empty` on it is false.
///
/// With [`EvaluationContext::scoped`] only fields of the form on pages the
/// owner may reference are looked up as fields. Those without a value resolve
/// to `Null`, as in [`VisibilityEngine`](super::VisibilityEngine); other names
/// fall through to the registry.
pub struct EvaluationContext<'a, P: FieldValueProvider + ?Sized> {
    values: &'a P,
    variables: &'a VariableRegistry,
    scope: Option<(&'a Form, usize)>,
}

impl<'a, P: FieldValueProvider + ?Sized> EvaluationContext<'a, P> {
    /// An unscoped context. See the type docs for how it treats fields
    /// without a value.
    pub fn new(values: &'a P, variables: &'a VariableRegistry) -> Self {
        Self {
            values,
            variables,
            scope: None,
        }
    }

    /// Restricts field lookups to what `owner` is allowed to reference.
    pub fn scoped(mut self, form: &'a Form, owner: &Target) -> Self {
        self.scope = Some((form, reference_limit(form, owner)));
        self
    }
}

impl<P: FieldValueProvider + ?Sized> ValueContext for EvaluationContext<'_, P> {
    fn resolve(&self, reference: &str) -> Option<Value> {
        let in_scope = match self.scope {
            Some((form, limit)) => form.page_of_field(reference).is_some_and(|page| page < limit),
            None => true,
        };
        let field_value = if in_scope {
            match self.scope {
                // A form field without an entered value is empty, not unknown.
                Some(_) => Some(self.values.value_of(reference).unwrap_or_default()),
                None => self.values.value_of(reference),
            }
        } else {
            None
        };
        field_value.or_else(|| self.variables.get(reference).cloned())
    }
}

/// Pages below this index hold fields `owner` may reference.
///
/// Field rules see their own page and earlier ones, page and button rules only
/// strictly earlier pages.
pub fn reference_limit(form: &Form, owner: &Target) -> usize {
    match owner {
        Target::Field(id) => form.page_of_field(id).map_or(0, |page| page + 1),
        Target::Page(page) | Target::Button { page, .. } => *page,
    }
}
