//! Shared utilities: option validation and generated file output.

pub mod script;
pub mod validation;

pub use script::write_generated_file;
pub use validation::{validate_instance_count, validate_role_count, validate_ticket, MAX_ROLE_COUNT};
