//! Schema validation pipeline

pub mod semantic;
pub mod syntactic;
pub mod validator;

pub use semantic::validate_semantic;
pub use syntactic::{validate_syntactic, GENERIC_LABELS};
pub use validator::SchemaValidator;
