//! Rules, rule-groups and the owners they are attached to.

pub mod group;
pub mod rule;
pub mod target;

pub use group::*;
pub use rule::*;
pub use target::*;
