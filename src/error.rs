use crate::condition::Target;
use thiserror::Error;

/// Errors produced by the identifier allocator and the rename check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Identifier '{0}' is invalid: it must start with a letter and contain only letters, digits, '_' or '-'")]
    InvalidFormat(String),

    #[error("Identifier '{0}' is already used by another field")]
    Duplicate(String),

    #[error("No field with identifier '{0}' exists in the form")]
    NotFound(String),

    #[error("Could not allocate a free field identifier after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Structural edits rejected before any mutation took place.
///
/// Every variant leaves the form exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error(transparent)]
    Identifier(#[from] IdError),

    #[error("Field '{0}' not found on the current page")]
    FieldNotFound(String),

    #[error("Container '{0}' not found on the current page")]
    ContainerNotFound(String),

    #[error("Field '{field_id}' is a {kind} field and cannot hold children in slot '{slot}'")]
    NotAContainer {
        field_id: String,
        kind: String,
        slot: String,
    },

    #[error("Column {column} does not exist in container '{container}' ({available} columns)")]
    ColumnOutOfRange {
        container: String,
        column: usize,
        available: usize,
    },

    #[error("Field '{field_id}' cannot be moved into '{slot}', which lies inside it")]
    SelfContainment { field_id: String, slot: String },

    #[error("Container '{0}' still has children and cannot change its kind")]
    ContainerNotEmpty(String),

    #[error("Page index {index} is out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("The last remaining page cannot be removed")]
    LastPage,

    #[error("Slot '{0}' is not a valid container slot")]
    InvalidSlot(String),
}

/// A rule-group whose references break the dependency ordering.
///
/// These are reported per rule-group; the offending rule evaluates to false
/// and the rest of the form keeps evaluating.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyError {
    #[error("Circular dependency: {target} depends on '{depends_on}' (cycle: {})", .cycle.join(" -> "))]
    Circular {
        target: Target,
        depends_on: String,
        cycle: Vec<String>,
    },

    #[error(
        "{target} on page {owner_page} references field '{depends_on}' on page {referenced_page}; only earlier pages may be referenced"
    )]
    PageOrder {
        target: Target,
        depends_on: String,
        owner_page: usize,
        referenced_page: usize,
    },
}

impl DependencyError {
    /// The rule-group owner this error is attached to.
    pub fn target(&self) -> &Target {
        match self {
            DependencyError::Circular { target, .. } | DependencyError::PageOrder { target, .. } => {
                target
            }
        }
    }

    /// The `dependsOn` reference of the offending rule.
    pub fn depends_on(&self) -> &str {
        match self {
            DependencyError::Circular { depends_on, .. }
            | DependencyError::PageOrder { depends_on, .. } => depends_on,
        }
    }
}

/// Errors from reading or writing a form document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse form document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Could not access form document '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Form document contains duplicate field identifier '{0}'")]
    DuplicateId(String),
}
