//! Page-scoped field forest: locate, insert, remove and move.

mod slot;
mod store;
pub mod walk;

pub use slot::ContainerSlot;
pub use store::{FieldMove, FieldTree, Operation, Removal};

use crate::form::{Field, Page};

/// A field together with the list that holds it.
#[derive(Debug, Clone)]
pub struct Located<'a> {
    pub field: &'a Field,
    pub slot: ContainerSlot,
    pub index: usize,
}

impl Page {
    /// Tree operations over this page's fields.
    pub fn tree(&mut self) -> FieldTree<'_> {
        FieldTree::new(&mut self.fields)
    }

    pub fn locate(&self, id: &str) -> Option<Located<'_>> {
        walk::find(&self.fields, id)
    }
}
