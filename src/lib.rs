pub mod authz;
pub mod config;
pub mod errors;
pub mod events;
pub mod guard;

// Re-export commonly used items for tests
pub use authz::{get_scope, has_permission, Action, Resource, Role, Scope};
pub use errors::{AppError, AppResult};
