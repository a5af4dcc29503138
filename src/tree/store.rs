use super::{ContainerSlot, Located, walk};
use crate::error::{EditError, IdError};
use crate::form::Field;
use tracing::debug;

/// Why a field is being taken out of its list.
///
/// A `Delete` drops the field and its whole subtree from the page, and the
/// [`Removal`] lists every id that went with it. A `Move` detaches the field
/// so it can be re-inserted elsewhere: the subtree travels with it and no id
/// leaves the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Delete,
    Move,
}

/// A field taken out of its list, with the position it held.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub field: Field,
    pub slot: ContainerSlot,
    pub index: usize,
    pub operation: Operation,
    /// Ids no longer present on the page, the field first. Empty for a move.
    pub cascaded: Vec<String>,
}

impl Removal {
    /// Whether the field and its subtree left the page for good.
    pub fn is_deletion(&self) -> bool {
        self.operation == Operation::Delete
    }
}

/// Where a moved field came from and where it ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMove {
    pub field_id: String,
    pub from: ContainerSlot,
    pub from_index: usize,
    pub to: ContainerSlot,
    pub to_index: usize,
}

/// Locate, insert, remove and move operations over one page's field forest.
///
/// Every operation validates its preconditions before touching the tree, so a
/// rejected call leaves the page exactly as it was.
pub struct FieldTree<'a> {
    fields: &'a mut Vec<Field>,
}

impl<'a> FieldTree<'a> {
    pub fn new(fields: &'a mut Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    pub fn locate(&self, id: &str) -> Option<Located<'_>> {
        walk::find(self.fields.as_slice(), id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Field> {
        walk::find_mut(self.fields.as_mut_slice(), id)
    }

    /// Inserts `field` into the list named by `slot`, at `index` or at the end.
    /// An index past the end appends. Returns the index the field landed on.
    pub fn insert(
        &mut self,
        field: Field,
        slot: &ContainerSlot,
        index: Option<usize>,
    ) -> Result<usize, EditError> {
        let mut clash = None;
        walk::visit(std::slice::from_ref(&field), &ContainerSlot::Root, &mut |f, _, _| {
            if clash.is_none() && walk::find(self.fields.as_slice(), &f.id).is_some() {
                clash = Some(f.id.clone());
            }
        });
        if let Some(id) = clash {
            return Err(IdError::Duplicate(id).into());
        }

        let list = walk::list_mut(self.fields, slot)?;
        let at = index.unwrap_or(list.len()).min(list.len());
        debug!(field = %field.id, slot = %slot, index = at, "inserting field");
        list.insert(at, field);
        Ok(at)
    }

    /// Splices `id` out of whichever list holds it.
    pub fn remove(&mut self, id: &str, operation: Operation) -> Option<Removal> {
        let (slot, index) = {
            let located = self.locate(id)?;
            (located.slot, located.index)
        };
        let field = self.take(&slot, index)?;
        let cascaded = match operation {
            Operation::Delete => {
                let mut gone = Vec::new();
                walk::visit(std::slice::from_ref(&field), &ContainerSlot::Root, &mut |f, _, _| {
                    gone.push(f.id.clone());
                });
                debug!(field = %field.id, cascaded = gone.len(), "deleted field");
                gone
            }
            Operation::Move => {
                debug!(field = %field.id, from = %slot, "detached field for move");
                Vec::new()
            }
        };
        Some(Removal {
            field,
            slot,
            index,
            operation,
            cascaded,
        })
    }

    /// Moves `id` so it ends up at position `index` of the list named by `slot`.
    ///
    /// Within one list this is a pure reorder. Across lists the same `Field`
    /// value is re-homed, so its rule-group and variable bindings travel with
    /// it. A container cannot be moved into itself or any of its descendants.
    pub fn move_field(
        &mut self,
        id: &str,
        slot: &ContainerSlot,
        index: usize,
    ) -> Result<FieldMove, EditError> {
        {
            let origin = self
                .locate(id)
                .ok_or_else(|| EditError::FieldNotFound(id.to_string()))?;
            if let Some(container) = slot.container_id()
                && origin.field.subtree_contains(container)
            {
                return Err(EditError::SelfContainment {
                    field_id: id.to_string(),
                    slot: slot.to_string(),
                });
            }
        }
        walk::list(self.fields.as_slice(), slot)?;

        let Removal {
            field,
            slot: from,
            index: from_index,
            ..
        } = self
            .remove(id, Operation::Move)
            .ok_or_else(|| EditError::FieldNotFound(id.to_string()))?;
        let to_index = match walk::list_mut(self.fields, slot) {
            Ok(list) => {
                let at = index.min(list.len());
                list.insert(at, field);
                at
            }
            Err(e) => {
                // Put the field back where it was.
                if let Ok(list) = walk::list_mut(self.fields, &from) {
                    list.insert(from_index.min(list.len()), field);
                }
                return Err(e);
            }
        };

        debug!(field = %id, from = %from, to = %slot, index = to_index, "moved field");
        Ok(FieldMove {
            field_id: id.to_string(),
            from,
            from_index,
            to: slot.clone(),
            to_index,
        })
    }

    /// Drag-and-drop flavour of [`FieldTree::move_field`].
    ///
    /// `drop_index` is a gap in the target list as currently rendered, before
    /// the field is detached. When the field already sits in that list ahead of
    /// the gap, removing it shifts the gap down by one.
    pub fn move_to_drop_position(
        &mut self,
        id: &str,
        slot: &ContainerSlot,
        drop_index: usize,
    ) -> Result<FieldMove, EditError> {
        let index = match self.locate(id) {
            Some(origin) if origin.slot == *slot && origin.index < drop_index => drop_index - 1,
            Some(_) => drop_index,
            None => return Err(EditError::FieldNotFound(id.to_string())),
        };
        self.move_field(id, slot, index)
    }

    fn take(&mut self, slot: &ContainerSlot, index: usize) -> Option<Field> {
        let list = walk::list_mut(self.fields, slot).ok()?;
        (index < list.len()).then(|| list.remove(index))
    }
}
