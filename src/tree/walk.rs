//! The one traversal shared by every tree operation.
//!
//! Containers differ only in how many child lists they own (one for a
//! `section`, one per column for `columns`). Everything below goes through
//! [`Field::child_lists`] and [`child_slot`], so search, removal, renaming and
//! the dependency graph all walk sections and columns the same way.

use super::{ContainerSlot, Located};
use crate::error::EditError;
use crate::form::{Field, FieldKind};

impl Field {
    /// The child lists owned by this field, in column order.
    pub fn child_lists(&self) -> impl Iterator<Item = &Vec<Field>> + '_ {
        let (section, columns) = match &self.kind {
            FieldKind::Section(s) => (Some(&s.fields), None),
            FieldKind::Columns(c) => (None, Some(c.columns.iter().map(|col| &col.fields))),
            _ => (None, None),
        };
        section.into_iter().chain(columns.into_iter().flatten())
    }

    pub fn child_lists_mut(&mut self) -> impl Iterator<Item = &mut Vec<Field>> + '_ {
        let (section, columns) = match &mut self.kind {
            FieldKind::Section(s) => (Some(&mut s.fields), None),
            FieldKind::Columns(c) => (
                None,
                Some(c.columns.iter_mut().map(|col| &mut col.fields)),
            ),
            _ => (None, None),
        };
        section.into_iter().chain(columns.into_iter().flatten())
    }

    /// Whether `id` names this field or anything nested below it.
    pub fn subtree_contains(&self, id: &str) -> bool {
        self.id == id || self.child_lists().any(|list| find(list, id).is_some())
    }
}

/// Slot naming the `list_index`-th child list of `container`.
pub fn child_slot(container: &Field, list_index: usize) -> ContainerSlot {
    match container.kind {
        FieldKind::Columns(_) => ContainerSlot::column(container.id.clone(), list_index),
        _ => ContainerSlot::section(container.id.clone()),
    }
}

/// Depth-first, pre-order visit of every field in `fields` and below.
///
/// The callback receives the field, the slot of the list holding it and its
/// index in that list.
pub fn visit<'a, F>(fields: &'a [Field], parent: &ContainerSlot, f: &mut F)
where
    F: FnMut(&'a Field, &ContainerSlot, usize),
{
    for (index, field) in fields.iter().enumerate() {
        f(field, parent, index);
        for (list_index, children) in field.child_lists().enumerate() {
            visit(children, &child_slot(field, list_index), f);
        }
    }
}

/// Mutable pre-order visit.
pub fn visit_mut<F>(fields: &mut [Field], f: &mut F)
where
    F: FnMut(&mut Field),
{
    for field in fields.iter_mut() {
        f(field);
        for children in field.child_lists_mut() {
            visit_mut(children, f);
        }
    }
}

/// Locates `id` below `fields`, which is the list named by `parent`.
pub fn find_in<'a>(fields: &'a [Field], id: &str, parent: &ContainerSlot) -> Option<Located<'a>> {
    for (index, field) in fields.iter().enumerate() {
        if field.id == id {
            return Some(Located {
                field,
                slot: parent.clone(),
                index,
            });
        }
        for (list_index, children) in field.child_lists().enumerate() {
            if let Some(found) = find_in(children, id, &child_slot(field, list_index)) {
                return Some(found);
            }
        }
    }
    None
}

/// Locates `id` in a page's top-level list or anywhere below it.
pub fn find<'a>(fields: &'a [Field], id: &str) -> Option<Located<'a>> {
    find_in(fields, id, &ContainerSlot::Root)
}

pub fn find_mut<'a>(fields: &'a mut [Field], id: &str) -> Option<&'a mut Field> {
    for field in fields.iter_mut() {
        if field.id == id {
            return Some(field);
        }
        for children in field.child_lists_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Resolves a slot to the list it names, read-only.
pub fn list<'a>(fields: &'a [Field], slot: &ContainerSlot) -> Result<&'a [Field], EditError> {
    let Some(container_id) = slot.container_id() else {
        return Ok(fields);
    };
    let container = find(fields, container_id)
        .ok_or_else(|| EditError::ContainerNotFound(container_id.to_string()))?
        .field;
    match (&container.kind, slot) {
        (FieldKind::Section(s), ContainerSlot::Section { .. }) => Ok(&s.fields),
        (FieldKind::Columns(c), ContainerSlot::Column { column, .. }) => c
            .columns
            .get(*column)
            .map(|col| col.fields.as_slice())
            .ok_or_else(|| EditError::ColumnOutOfRange {
                container: container_id.to_string(),
                column: *column,
                available: c.columns.len(),
            }),
        (kind, _) => Err(EditError::NotAContainer {
            field_id: container_id.to_string(),
            kind: kind.type_name().to_string(),
            slot: slot.to_string(),
        }),
    }
}

/// Resolves a slot to the list it names.
pub fn list_mut<'a>(
    fields: &'a mut Vec<Field>,
    slot: &ContainerSlot,
) -> Result<&'a mut Vec<Field>, EditError> {
    // Validate first so the mutable lookup below cannot fail halfway.
    list(fields.as_slice(), slot)?;
    let Some(container_id) = slot.container_id() else {
        return Ok(fields);
    };
    let container = find_mut(fields, container_id)
        .ok_or_else(|| EditError::ContainerNotFound(container_id.to_string()))?;
    let slot_name = slot.to_string();
    let type_name = container.kind.type_name();
    match (&mut container.kind, slot) {
        (FieldKind::Section(s), ContainerSlot::Section { .. }) => Ok(&mut s.fields),
        (FieldKind::Columns(c), ContainerSlot::Column { column, .. }) => {
            let available = c.columns.len();
            c.columns
                .get_mut(*column)
                .map(|col| &mut col.fields)
                .ok_or_else(|| EditError::ColumnOutOfRange {
                    container: container_id.to_string(),
                    column: *column,
                    available,
                })
        }
        _ => Err(EditError::NotAContainer {
            field_id: container_id.to_string(),
            kind: type_name.to_string(),
            slot: slot_name,
        }),
    }
}
