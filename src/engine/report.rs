use super::trace::{TargetTrace, TraceFormatter};
use crate::condition::{NavButton, Target};
use crate::error::DependencyError;
use ahash::AHashMap;
use indexmap::IndexMap;
use std::fmt;

/// Non-fatal findings of an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvaluationWarning {
    /// `name` is both a field in scope for `target` and a registered variable.
    /// The field wins.
    NamespaceCollision { target: Target, name: String },
}

impl EvaluationWarning {
    pub fn target(&self) -> &Target {
        match self {
            EvaluationWarning::NamespaceCollision { target, .. } => target,
        }
    }
}

impl fmt::Display for EvaluationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationWarning::NamespaceCollision { target, name } => write!(
                f,
                "{} references '{}', which is both a field and a variable; using the field",
                target, name
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonVisibility {
    pub next: bool,
    pub submit: bool,
}

impl ButtonVisibility {
    pub fn get(&self, button: NavButton) -> bool {
        match button {
            NavButton::Next => self.next,
            NavButton::Submit => self.submit,
        }
    }
}

/// Visibility of every field, page and navigation button of a form.
#[derive(Debug, Clone, Default)]
pub struct VisibilityReport {
    /// Effective visibility by field id, in form order.
    pub fields: IndexMap<String, bool>,
    pub pages: Vec<bool>,
    pub buttons: Vec<ButtonVisibility>,
    pub errors: Vec<DependencyError>,
    pub warnings: Vec<EvaluationWarning>,
    pub(crate) traces: AHashMap<Target, TargetTrace>,
}

impl VisibilityReport {
    /// `None` when the form has no such target.
    pub fn visibility(&self, target: &Target) -> Option<bool> {
        match target {
            Target::Field(id) => self.fields.get(id).copied(),
            Target::Page(page) => self.pages.get(*page).copied(),
            Target::Button { page, button } => self.buttons.get(*page).map(|b| b.get(*button)),
        }
    }

    pub fn is_visible(&self, target: &Target) -> bool {
        self.visibility(target).unwrap_or(false)
    }

    pub fn field_visible(&self, id: &str) -> bool {
        self.fields.get(id).copied().unwrap_or(false)
    }

    pub fn visible_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(id, _)| id.as_str())
    }

    pub fn hidden_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, visible)| !**visible)
            .map(|(id, _)| id.as_str())
    }

    /// Every target of the report with its visibility: fields in form order,
    /// then each page followed by its buttons.
    pub fn targets(&self) -> Vec<(Target, bool)> {
        let mut out: Vec<(Target, bool)> = self
            .fields
            .iter()
            .map(|(id, visible)| (Target::field(id.as_str()), *visible))
            .collect();
        for (page, visible) in self.pages.iter().enumerate() {
            out.push((Target::Page(page), *visible));
            if let Some(buttons) = self.buttons.get(page) {
                out.push((Target::next_button(page), buttons.next));
                out.push((Target::submit_button(page), buttons.submit));
            }
        }
        out
    }

    pub fn errors_for<'a>(&'a self, target: &'a Target) -> impl Iterator<Item = &'a DependencyError> {
        self.errors.iter().filter(move |e| e.target() == target)
    }

    pub fn trace(&self, target: &Target) -> Option<&TargetTrace> {
        self.traces.get(target)
    }

    /// Human-readable explanation of why `target` is shown or hidden.
    /// `None` when traces were disabled or the target does not exist.
    pub fn reason(&self, target: &Target) -> Option<String> {
        self.traces.get(target).map(TraceFormatter::format_target)
    }
}
