use super::Form;
use crate::error::DocumentError;
use std::fs;
use std::path::Path;

impl Form {
    /// Parses a form document.
    ///
    /// Parsing does not check identifier uniqueness; use
    /// [`Form::validate_ids`] or open the form in a
    /// [`FormEditor`](crate::editor::FormEditor), which does.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a form document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Saves the form document as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Rejects a document in which some field identifier occurs twice.
    pub fn validate_ids(&self) -> Result<(), DocumentError> {
        match self.duplicate_ids().into_iter().next() {
            Some(id) => Err(DocumentError::DuplicateId(id)),
            None => Ok(()),
        }
    }
}
