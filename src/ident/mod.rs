//! Field identifiers: allocation, format checks and form-wide renaming.

mod allocator;
mod rename;

pub use allocator::{IdAllocator, generated_suffix, validate_identifier};
pub use rename::RuleSite;
