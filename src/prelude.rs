//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the yoshiki crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use yoshiki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let form = Form::from_file("path/to/form.json")?;
//! let variables = VariableRegistry::new();
//!
//! let report = VisibilityEngine::new().evaluate_all(&form, &NoValues, &variables);
//! for error in &report.errors {
//!     println!("Dependency error: {}", error);
//! }
//! println!("Visible fields: {:?}", report.visible_fields().collect::<Vec<_>>());
//! # Ok(())
//! # }
//! ```

// Form model
pub use crate::form::{Field, FieldKind, Form, Page};
pub use crate::value::Value;

// Conditions
pub use crate::condition::{Logic, NavButton, Operator, Rule, RuleGroup, Target};

// Editing
pub use crate::editor::{FieldPatch, FormEditor, PagePatch};
pub use crate::events::{ChangeListener, FormEvent};
pub use crate::ident::IdAllocator;
pub use crate::tree::{ContainerSlot, Operation};

// Evaluation
pub use crate::engine::{
    DependencyGraph, FieldValueProvider, NoValues, VisibilityEngine, VisibilityReport,
    VisibilityTracker,
};
pub use crate::variables::VariableRegistry;

// Error types
pub use crate::error::{DependencyError, DocumentError, EditError, IdError};

// Standard library re-exports commonly used with this crate
pub use std::collections::HashMap;
pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
