use crate::error::IdError;
use crate::form::Form;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Generated identifiers look like `field_12`.
static FIELD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^field_(\d+)$").expect("valid field id pattern"));

/// Manually assigned identifiers.
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid identifier pattern"));

const MAX_ATTEMPTS: u32 = 10;

/// Checks the format of a manually chosen field identifier.
pub fn validate_identifier(id: &str) -> Result<(), IdError> {
    if IDENTIFIER_RE.is_match(id) {
        Ok(())
    } else {
        Err(IdError::InvalidFormat(id.to_string()))
    }
}

/// The numeric suffix of a generated identifier.
pub fn generated_suffix(id: &str) -> Option<u64> {
    FIELD_ID_RE
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Hands out `field_<n>` identifiers that are unused anywhere in a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the counter one past the highest `field_<n>` found on any page,
    /// including every container subtree. Other identifiers are ignored here.
    pub fn seeded_from(form: &Form) -> Self {
        let highest = form
            .fields()
            .into_iter()
            .filter_map(|(_, field)| generated_suffix(&field.id))
            .max();
        let next = highest.map_or(1, |n| n.saturating_add(1));
        debug!(next, "seeded identifier allocator");
        Self { next }
    }

    /// The counter value the next call will try first.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Returns an identifier not used anywhere in `form`.
    ///
    /// Manually named fields can occupy a generated name, so a collision
    /// advances the counter and retries a bounded number of times.
    pub fn next_id(&mut self, form: &Form) -> Result<String, IdError> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = format!("field_{}", self.next);
            self.next = self.next.saturating_add(1);
            if !form.contains_field(&candidate) {
                return Ok(candidate);
            }
            debug!(candidate = %candidate, "generated identifier already taken");
        }
        Err(IdError::Exhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}
