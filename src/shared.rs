pub mod types;
pub mod prefs;
pub mod error;

// Re-export AppError for convenience
pub use error::{AppError, AppResult};
