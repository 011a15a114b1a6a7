//! Patch spec definitions: the transformation rule set.
//!
//! A spec names a signature fragment for the locator, a primary structural
//! rule (anchor + marker + replacement template), and zero or more auxiliary
//! find/replace rules. Specs load from TOML files or come compiled in as
//! [`PatchSpec::builtin`].

mod builtin;
mod loader;
mod schema;

pub use loader::{load_from_path, load_from_str, SpecError};
pub use schema::{Meta, PatchSpec, StructuralRule, TextRule, ValidationError, ValidationIssue};
