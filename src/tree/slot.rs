use crate::error::EditError;
use std::fmt;
use std::str::FromStr;

/// A list that can hold fields: the page's top-level list, a section's
/// children, or one column of a `columns` container.
///
/// The string form is `<containerId>` for a section and
/// `<containerId>#<column>` for a column. The empty string (or `(page)`) is
/// the page's own list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ContainerSlot {
    #[default]
    Root,
    Section {
        container: String,
    },
    Column {
        container: String,
        column: usize,
    },
}

impl ContainerSlot {
    pub fn section(container: impl Into<String>) -> Self {
        ContainerSlot::Section {
            container: container.into(),
        }
    }

    pub fn column(container: impl Into<String>, column: usize) -> Self {
        ContainerSlot::Column {
            container: container.into(),
            column,
        }
    }

    /// The container field owning this list, `None` for the page list.
    pub fn container_id(&self) -> Option<&str> {
        match self {
            ContainerSlot::Root => None,
            ContainerSlot::Section { container } | ContainerSlot::Column { container, .. } => {
                Some(container)
            }
        }
    }
}

impl fmt::Display for ContainerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerSlot::Root => write!(f, "(page)"),
            ContainerSlot::Section { container } => write!(f, "{}", container),
            ContainerSlot::Column { container, column } => write!(f, "{}#{}", container, column),
        }
    }
}

impl FromStr for ContainerSlot {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "(page)" {
            return Ok(ContainerSlot::Root);
        }
        match s.split_once('#') {
            Some((container, column)) if !container.is_empty() => {
                let column = column
                    .parse()
                    .map_err(|_| EditError::InvalidSlot(s.to_string()))?;
                Ok(ContainerSlot::column(container, column))
            }
            Some(_) => Err(EditError::InvalidSlot(s.to_string())),
            None => Ok(ContainerSlot::section(s)),
        }
    }
}
