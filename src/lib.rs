//! # Yoshiki - Form Definition Model and Conditional-Visibility Engine
//!
//! **Yoshiki** models multi-page data-collection forms: pages hold fields,
//! fields can be nested inside `section` and `columns` containers, and every
//! field, page and navigation button can carry a rule-group deciding whether it
//! is shown. The crate keeps the form tree consistent under edits and
//! evaluates the visibility rules over entered values and named variables.
//!
//! ## Core Workflow
//!
//! 1.  **Build or Load a Form**: Parse a form document with `Form::from_json` or
//!     start from scratch with a `FormEditor`.
//! 2.  **Edit**: Add, update, move, rename and delete fields and pages through
//!     the `FormEditor`. Identifiers stay unique across the whole form, and rules
//!     follow renamed fields.
//! 3.  **Evaluate**: Hand the form, the current field values and the
//!     `VariableRegistry` to a `VisibilityEngine`. The report lists what is
//!     visible, which rules form dependency errors, and why each target is
//!     shown or hidden.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yoshiki::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // 1. Build a two-page form.
//!     let mut editor = FormEditor::new("Signup");
//!     let email = editor.add_field(FieldKind::Email)?;
//!     let details = editor.add_page("Details");
//!
//!     // 2. Show the second page only once an email was entered.
//!     editor.update_page(
//!         details,
//!         PagePatch {
//!             conditional_visibility: Some(RuleGroup::all(vec![Rule::unary(
//!                 email.as_str(),
//!                 Operator::IsNotEmpty,
//!             )])),
//!             ..PagePatch::default()
//!         },
//!     )?;
//!
//!     // 3. Evaluate against the values entered so far.
//!     let mut values = HashMap::new();
//!     values.insert(email.clone(), Value::from("ada@example.com"));
//!     let variables = VariableRegistry::new();
//!
//!     let engine = VisibilityEngine::new();
//!     let report = engine.evaluate_all(editor.form(), &values, &variables);
//!
//!     let page = Target::Page(details);
//!     println!("-> Page visible: {}", report.is_visible(&page));
//!     if let Some(reason) = report.reason(&page) {
//!         println!("-> Reason: {}", reason);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod condition;
pub mod editor;
pub mod engine;
pub mod error;
pub mod events;
pub mod form;
pub mod ident;
pub mod prelude;
pub mod tree;
pub mod value;
pub mod variables;
