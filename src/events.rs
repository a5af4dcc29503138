//! Change notifications emitted by the [`FormEditor`](crate::editor::FormEditor).

use crate::form::{Field, Page};
use crate::tree::{ContainerSlot, FieldMove};
use std::fmt;

/// Exactly one event is emitted per successful mutation, carrying the
/// affected entity.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    FieldAdded {
        page: usize,
        slot: ContainerSlot,
        index: usize,
        field: Field,
    },
    /// The field as it is after the update.
    FieldUpdated { page: usize, field: Field },
    /// The removed field with its whole subtree, and every id that left
    /// the page with it.
    FieldRemoved {
        page: usize,
        field: Field,
        cascaded: Vec<String>,
    },
    FieldMoved { page: usize, movement: FieldMove },
    FieldRenamed {
        old: String,
        new: String,
        rewritten_rules: usize,
    },
    PageAdded { index: usize, page_id: String },
    PageUpdated { index: usize, page_id: String },
    PageRemoved { index: usize, page: Page },
    PagesReordered { from: usize, to: usize },
}

impl FormEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FormEvent::FieldAdded { .. } => "field added",
            FormEvent::FieldUpdated { .. } => "field updated",
            FormEvent::FieldRemoved { .. } => "field removed",
            FormEvent::FieldMoved { .. } => "field moved",
            FormEvent::FieldRenamed { .. } => "field renamed",
            FormEvent::PageAdded { .. } => "page added",
            FormEvent::PageUpdated { .. } => "page updated",
            FormEvent::PageRemoved { .. } => "page removed",
            FormEvent::PagesReordered { .. } => "pages reordered",
        }
    }

    /// Whether the event changed the shape of the form, as opposed to the
    /// properties of one field or page.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            FormEvent::FieldUpdated { .. } | FormEvent::PageUpdated { .. }
        )
    }
}

impl fmt::Display for FormEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormEvent::FieldAdded { field, slot, .. } => {
                write!(f, "{}: '{}' in {}", self.name(), field.id, slot)
            }
            FormEvent::FieldUpdated { field, .. } | FormEvent::FieldRemoved { field, .. } => {
                write!(f, "{}: '{}'", self.name(), field.id)
            }
            FormEvent::FieldMoved { movement, .. } => write!(
                f,
                "{}: '{}' {} -> {}",
                self.name(),
                movement.field_id,
                movement.from,
                movement.to
            ),
            FormEvent::FieldRenamed { old, new, .. } => {
                write!(f, "{}: '{}' -> '{}'", self.name(), old, new)
            }
            FormEvent::PageAdded { page_id, .. } | FormEvent::PageUpdated { page_id, .. } => {
                write!(f, "{}: '{}'", self.name(), page_id)
            }
            FormEvent::PageRemoved { page, .. } => write!(f, "{}: '{}'", self.name(), page.id),
            FormEvent::PagesReordered { from, to } => {
                write!(f, "{}: {} -> {}", self.name(), from, to)
            }
        }
    }
}

/// Receives every event the editor emits, in order.
pub trait ChangeListener {
    fn on_change(&mut self, event: &FormEvent);
}

impl<F> ChangeListener for F
where
    F: FnMut(&FormEvent),
{
    fn on_change(&mut self, event: &FormEvent) {
        self(event)
    }
}
