//! The mutation façade used by form builders.
//!
//! [`FormEditor`] owns a [`Form`] together with the current-page pointer, the
//! identifier allocator and a dirty flag. Every mutating call either succeeds
//! completely, marks the form dirty and emits exactly one [`FormEvent`], or is
//! rejected with an [`EditError`] and leaves the form untouched.

use crate::condition::RuleGroup;
use crate::error::{DocumentError, EditError, IdError};
use crate::events::{ChangeListener, FormEvent};
use crate::form::{Field, FieldKind, Form, HiddenField, ObjectMapping, Page, QuerySpec, RepeatConfig};
use crate::ident::{IdAllocator, validate_identifier};
use crate::tree::{ContainerSlot, FieldMove, Operation, walk};
use crate::variables::VariableAssignments;
use ahash::AHashSet;
use tracing::debug;

/// Partial update of a field's properties. `None` leaves a property as it is;
/// for optional properties `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<Option<String>>,
    pub required: Option<bool>,
    pub help_text: Option<Option<String>>,
    pub external_field: Option<Option<String>>,
    pub conditional_visibility: Option<RuleGroup>,
    pub set_variables: Option<Option<VariableAssignments>>,
    /// Replaces type and configuration. Rejected for containers that still
    /// hold children.
    pub kind: Option<FieldKind>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn visibility(group: RuleGroup) -> Self {
        Self {
            conditional_visibility: Some(group),
            ..Self::default()
        }
    }

    fn apply(self, field: &mut Field) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(placeholder) = self.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(help_text) = self.help_text {
            field.help_text = help_text;
        }
        if let Some(external_field) = self.external_field {
            field.external_field = external_field;
        }
        if let Some(group) = self.conditional_visibility {
            field.conditional_visibility = group;
        }
        if let Some(assignments) = self.set_variables {
            field.set_variables = assignments;
        }
        if let Some(kind) = self.kind {
            field.kind = kind;
        }
    }
}

/// Partial update of a page's properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub object_mapping: Option<Option<ObjectMapping>>,
    pub record_id_variable: Option<Option<String>>,
    pub query: Option<Option<QuerySpec>>,
    pub repeat: Option<Option<RepeatConfig>>,
    pub hidden_fields: Option<Vec<HiddenField>>,
    pub conditional_visibility: Option<RuleGroup>,
    pub next_button: Option<RuleGroup>,
    pub submit_button: Option<RuleGroup>,
}

impl PagePatch {
    fn apply(self, page: &mut Page) {
        if let Some(name) = self.name {
            page.name = name;
        }
        if let Some(description) = self.description {
            page.description = description;
        }
        if let Some(mapping) = self.object_mapping {
            page.object_mapping = mapping;
        }
        if let Some(variable) = self.record_id_variable {
            page.record_id_variable = variable;
        }
        if let Some(query) = self.query {
            page.query = query;
        }
        if let Some(repeat) = self.repeat {
            page.repeat = repeat;
        }
        if let Some(hidden) = self.hidden_fields {
            page.hidden_fields = hidden;
        }
        if let Some(group) = self.conditional_visibility {
            page.conditional_visibility = group;
        }
        if let Some(group) = self.next_button {
            page.navigation.next = group;
        }
        if let Some(group) = self.submit_button {
            page.navigation.submit = group;
        }
    }
}

pub struct FormEditor {
    form: Form,
    current_page: usize,
    allocator: IdAllocator,
    dirty: bool,
    listeners: Vec<Box<dyn ChangeListener>>,
    events: Vec<FormEvent>,
}

impl FormEditor {
    /// An editor for a new form with one empty page.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_valid(Form::new(name))
    }

    /// Opens an existing document. The allocator is seeded from every page.
    /// A form without pages gets a first empty page.
    pub fn open(mut form: Form) -> Result<Self, DocumentError> {
        form.validate_ids()?;
        if form.pages.is_empty() {
            form.pages.push(Page::new("page_1", "Page 1"));
        }
        Ok(Self::from_valid(form))
    }

    fn from_valid(form: Form) -> Self {
        let allocator = IdAllocator::seeded_from(&form);
        Self {
            form,
            current_page: 0,
            allocator,
            dirty: false,
            listeners: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn into_form(self) -> Form {
        self.form
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page(&self) -> &Page {
        &self.form.pages[self.current_page]
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after the form has been persisted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<FormEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: FormEvent) {
        self.dirty = true;
        debug!(event = %event, "form changed");
        for listener in &mut self.listeners {
            listener.on_change(&event);
        }
        self.events.push(event);
    }

    pub fn set_current_page(&mut self, index: usize) -> Result<(), EditError> {
        self.check_page(index)?;
        self.current_page = index;
        Ok(())
    }

    fn check_page(&self, index: usize) -> Result<(), EditError> {
        if index < self.form.pages.len() {
            Ok(())
        } else {
            Err(EditError::PageOutOfRange {
                index,
                count: self.form.pages.len(),
            })
        }
    }

    /// Every id in `fields` and below must be new to the form and occur once.
    fn check_unique(&self, fields: &[Field]) -> Result<(), EditError> {
        let mut seen = AHashSet::new();
        let mut clash = None;
        walk::visit(fields, &ContainerSlot::Root, &mut |f, _, _| {
            if clash.is_none() && (!seen.insert(f.id.as_str()) || self.form.contains_field(&f.id)) {
                clash = Some(f.id.clone());
            }
        });
        match clash {
            Some(id) => Err(IdError::Duplicate(id).into()),
            None => Ok(()),
        }
    }

    /// Appends a new field of `kind` to the current page. Returns its id.
    pub fn add_field(&mut self, kind: FieldKind) -> Result<String, EditError> {
        self.add_field_to_container(kind, &ContainerSlot::Root, None)
    }

    /// Adds a new field of `kind` to a list of the current page, at `index`
    /// or at the end.
    pub fn add_field_to_container(
        &mut self,
        kind: FieldKind,
        slot: &ContainerSlot,
        index: Option<usize>,
    ) -> Result<String, EditError> {
        walk::list(&self.form.pages[self.current_page].fields, slot)?;
        let id = self.allocator.next_id(&self.form)?;
        let field = Field::new(id.clone(), kind);
        self.insert_field(field, slot, index)?;
        Ok(id)
    }

    /// Inserts a ready-made field, such as a pasted one, into the current
    /// page. Its id and every nested id must be valid and unused.
    pub fn insert_field(
        &mut self,
        field: Field,
        slot: &ContainerSlot,
        index: Option<usize>,
    ) -> Result<usize, EditError> {
        let mut invalid = None;
        walk::visit(std::slice::from_ref(&field), &ContainerSlot::Root, &mut |f, _, _| {
            if invalid.is_none() && validate_identifier(&f.id).is_err() {
                invalid = Some(f.id.clone());
            }
        });
        if let Some(id) = invalid {
            return Err(IdError::InvalidFormat(id).into());
        }
        self.check_unique(std::slice::from_ref(&field))?;

        let page = self.current_page;
        let stored = field.clone();
        let at = self.form.pages[page]
            .tree()
            .insert(field, slot, index)?;
        self.emit(FormEvent::FieldAdded {
            page,
            slot: slot.clone(),
            index: at,
            field: stored,
        });
        Ok(at)
    }

    /// Updates properties of a field on any page.
    pub fn update_field(&mut self, id: &str, patch: FieldPatch) -> Result<(), EditError> {
        let page = self
            .form
            .page_of_field(id)
            .ok_or_else(|| EditError::FieldNotFound(id.to_string()))?;
        if let Some(kind) = &patch.kind {
            let current = self
                .form
                .field(id)
                .ok_or_else(|| EditError::FieldNotFound(id.to_string()))?;
            if current.descendant_count() > 0 {
                return Err(EditError::ContainerNotEmpty(id.to_string()));
            }
            let incoming = Field::new(id, kind.clone());
            let children: Vec<Field> = incoming.child_lists().flatten().cloned().collect();
            self.check_unique(&children)?;
        }

        let field = self
            .form
            .field_mut(id)
            .ok_or_else(|| EditError::FieldNotFound(id.to_string()))?;
        patch.apply(field);
        let field = field.clone();
        self.emit(FormEvent::FieldUpdated { page, field });
        Ok(())
    }

    /// Deletes a field of the current page together with its subtree.
    pub fn delete_field(&mut self, id: &str) -> Result<Field, EditError> {
        let page = self.current_page;
        let removal = self.form.pages[page]
            .tree()
            .remove(id, Operation::Delete)
            .ok_or_else(|| EditError::FieldNotFound(id.to_string()))?;
        self.emit(FormEvent::FieldRemoved {
            page,
            field: removal.field.clone(),
            cascaded: removal.cascaded,
        });
        Ok(removal.field)
    }

    /// Moves a field of the current page so it ends up at `index` of `slot`.
    pub fn move_field_to_container(
        &mut self,
        id: &str,
        slot: &ContainerSlot,
        index: usize,
    ) -> Result<FieldMove, EditError> {
        let page = self.current_page;
        let movement = self.form.pages[page].tree().move_field(id, slot, index)?;
        self.emit(FormEvent::FieldMoved {
            page,
            movement: movement.clone(),
        });
        Ok(movement)
    }

    /// Drag-and-drop variant of [`FormEditor::move_field_to_container`].
    pub fn drop_field(
        &mut self,
        id: &str,
        slot: &ContainerSlot,
        drop_index: usize,
    ) -> Result<FieldMove, EditError> {
        let page = self.current_page;
        let movement = self.form.pages[page]
            .tree()
            .move_to_drop_position(id, slot, drop_index)?;
        self.emit(FormEvent::FieldMoved {
            page,
            movement: movement.clone(),
        });
        Ok(movement)
    }

    /// Renames a field anywhere in the form and rewrites the rules that
    /// reference it. Renaming a field to its own id changes nothing.
    pub fn rename_field(&mut self, old: &str, new: &str) -> Result<usize, EditError> {
        if old == new && self.form.contains_field(old) {
            return Ok(0);
        }
        let rewritten_rules = self.form.rename_field(old, new)?;
        self.emit(FormEvent::FieldRenamed {
            old: old.to_string(),
            new: new.to_string(),
            rewritten_rules,
        });
        Ok(rewritten_rules)
    }

    /// Appends an empty page and returns its index.
    pub fn add_page(&mut self, name: impl Into<String>) -> usize {
        let mut n = self.form.pages.len() + 1;
        while self.form.pages.iter().any(|p| p.id == format!("page_{}", n)) {
            n += 1;
        }
        let page_id = format!("page_{}", n);
        self.form.pages.push(Page::new(page_id.clone(), name));
        let index = self.form.pages.len() - 1;
        self.emit(FormEvent::PageAdded { index, page_id });
        index
    }

    pub fn update_page(&mut self, index: usize, patch: PagePatch) -> Result<(), EditError> {
        self.check_page(index)?;
        let page = &mut self.form.pages[index];
        patch.apply(page);
        let page_id = page.id.clone();
        self.emit(FormEvent::PageUpdated { index, page_id });
        Ok(())
    }

    /// Removes a page and every field on it. The last page cannot be removed.
    pub fn remove_page(&mut self, index: usize) -> Result<Page, EditError> {
        self.check_page(index)?;
        if self.form.pages.len() == 1 {
            return Err(EditError::LastPage);
        }
        let page = self.form.pages.remove(index);
        if self.current_page > index || self.current_page >= self.form.pages.len() {
            self.current_page -= 1;
        }
        self.emit(FormEvent::PageRemoved {
            index,
            page: page.clone(),
        });
        Ok(page)
    }

    /// Moves the page at `from` to position `to`.
    ///
    /// The current-page pointer follows the moved page when it was current,
    /// and otherwise shifts by one when the move crosses it.
    pub fn reorder_pages(&mut self, from: usize, to: usize) -> Result<(), EditError> {
        self.check_page(from)?;
        self.check_page(to)?;
        if from == to {
            return Ok(());
        }
        let page = self.form.pages.remove(from);
        self.form.pages.insert(to, page);

        let current = self.current_page;
        self.current_page = if current == from {
            to
        } else if from < current && to >= current {
            current - 1
        } else if from > current && to <= current {
            current + 1
        } else {
            current
        };
        self.emit(FormEvent::PagesReordered { from, to });
        Ok(())
    }
}
