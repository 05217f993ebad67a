//! AI Content Co-Pilot core
//!
//! The non-presentational core of an AI-assisted text editor: operation
//! catalog and prompt builder, Gemini completion client, session state
//! controller, export utilities, and the Markdown preview boundary.
//! Rendering and layout live in the host application.

pub mod core;
pub mod shared;

pub use crate::core::completion::{
    CompletionProvider, GeminiClient, API_KEY_ENV_VAR, GEMINI_TEXT_MODEL,
};
pub use crate::core::export::ExportArtifact;
pub use crate::core::session::{Phase, Session, WELCOME_DOCUMENT};
pub use crate::shared::error::{AppError, AppResult};
pub use crate::shared::prefs::PrefsStore;
pub use crate::shared::types::{LanguageOption, Operation, TranslateParams, ViewMode, LANGUAGES};
