//! Session state controller
//!
//! Owns the editor content and the request lifecycle around the single
//! outstanding completion call. All flags that used to be independent
//! (loading, error, view mode) hang off one explicit `Phase` value, so an
//! error can never coexist with an in-flight request.

use crate::core::catalog::build_prompt;
use crate::core::completion::{CompletionProvider, API_KEY_ENV_VAR};
use crate::core::export::{
    export_content, ExportArtifact, MARKDOWN_FILE_NAME, MARKDOWN_MIME_TYPE, TEXT_FILE_NAME,
    TEXT_MIME_TYPE,
};
use crate::core::markdown::render_preview;
use crate::shared::error::{AppError, AppResult};
use crate::shared::prefs::PrefsStore;
use crate::shared::types::{language_name, target_languages, Operation, TranslateParams, ViewMode};

/// Initial editor content shown on startup.
pub const WELCOME_DOCUMENT: &str = r#"Welcome to the AI Content Co-Pilot!

Type or paste your text here. Then, use the tools above to:

- Summarize lengthy documents
- Rewrite text in formal or casual tones
- Expand on ideas with more detail
- Check grammar and polish your writing
- Simplify complex language
- Generate new ideas from a topic
- Translate text to various languages using the dedicated translation tools below!

You can also **preview** this content as Markdown and **download** it!

## Example Markdown
- Item 1
- Item 2
  - Sub-item A
  - Sub-item B

```rust
fn greet() {
    println!("Hello, Co-Pilot!");
}
```

Enjoy it!
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
}

pub struct Session {
    content: String,
    phase: Phase,
    last_error: Option<String>,
    view_mode: ViewMode,
    source_language: String,
    target_language: String,
    prefs: PrefsStore,
}

/// Render a dispatch failure into the user-visible message. Credential
/// problems get a remediation message naming the environment variable;
/// everything else goes through the generic template.
fn render_failure(err: &AppError) -> String {
    let message = err.message();
    let lowered = message.to_lowercase();
    if lowered.contains("api key not valid")
        || lowered.contains("api key not found")
        || lowered.contains("environment variable is not set")
    {
        format!(
            "Gemini API key is invalid or not configured. Please ensure the {} \
             environment variable is correctly set.",
            API_KEY_ENV_VAR
        )
    } else {
        format!("Failed to perform operation: {}.", message)
    }
}

impl Session {
    pub fn new(prefs: PrefsStore) -> AppResult<Self> {
        let source_language = prefs.source_language()?;
        let target_language = prefs.target_language()?;
        Ok(Self {
            content: WELCOME_DOCUMENT.to_string(),
            phase: Phase::Idle,
            last_error: None,
            view_mode: ViewMode::Edit,
            source_language,
            target_language,
            prefs,
        })
    }

    /// Open a session backed by the default preference database.
    pub fn open_default() -> AppResult<Self> {
        Self::new(PrefsStore::open_default()?)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Direct edit from the editor. Refused while a request is running,
    /// mirroring the disabled editor in the view.
    pub fn set_content(&mut self, text: impl Into<String>) -> AppResult<()> {
        if self.is_busy() {
            return Err(AppError::Precondition(
                "Cannot edit while an operation is in progress".to_string(),
            ));
        }
        self.content = text.into();
        Ok(())
    }

    /// Language preference changes persist immediately, independent of the
    /// dispatch state machine.
    pub fn set_source_language(&mut self, code: &str) -> AppResult<()> {
        self.prefs.set_source_language(code)?;
        self.source_language = code.to_string();
        Ok(())
    }

    pub fn set_target_language(&mut self, code: &str) -> AppResult<()> {
        self.prefs.set_target_language(code)?;
        self.target_language = code.to_string();
        Ok(())
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Reset the editor. Refused while busy as a safety net; the view is
    /// expected to disable the control anyway.
    pub fn clear(&mut self) -> AppResult<()> {
        if self.is_busy() {
            return Err(AppError::Precondition(
                "Cannot clear the editor while an operation is in progress".to_string(),
            ));
        }
        self.content.clear();
        self.last_error = None;
        self.view_mode = ViewMode::Edit;
        Ok(())
    }

    /// Sanitized HTML for the preview pane.
    pub fn preview_html(&self) -> String {
        render_preview(&self.content)
    }

    pub fn export_markdown(&mut self) -> AppResult<ExportArtifact> {
        self.export(MARKDOWN_FILE_NAME, MARKDOWN_MIME_TYPE)
    }

    pub fn export_text(&mut self) -> AppResult<ExportArtifact> {
        self.export(TEXT_FILE_NAME, TEXT_MIME_TYPE)
    }

    fn export(&mut self, file_name: &str, mime_type: &str) -> AppResult<ExportArtifact> {
        let artifact = export_content(&self.content, file_name, mime_type)?;
        self.last_error = None;
        Ok(artifact)
    }

    /// Run an operation end to end: guard, build the prompt, issue the
    /// completion call, reconcile the result. The returned flag reports
    /// whether the operation succeeded; failures land in `last_error`.
    pub async fn dispatch(
        &mut self,
        operation: Operation,
        provider: &dyn CompletionProvider,
    ) -> bool {
        if self.is_busy() {
            // Concurrent triggers are ignored outright; the running
            // request keeps its state.
            return false;
        }

        let prompt = match self.begin(operation) {
            Ok(prompt) => prompt,
            Err(err) => {
                self.last_error = Some(err.message().to_string());
                return false;
            }
        };

        let outcome = provider.complete(&prompt).await;
        self.settle(outcome)
    }

    /// Guard the transition into `Busy` and produce the prompt. On a guard
    /// failure the phase stays `Idle` and nothing else changes.
    fn begin(&mut self, operation: Operation) -> AppResult<String> {
        if self.content.trim().is_empty() && operation != Operation::GenerateIdeas {
            return Err(AppError::Precondition(
                "Please enter some text in the editor before performing this operation".to_string(),
            ));
        }

        let params = if operation == Operation::Translate {
            Some(self.translate_params()?)
        } else {
            None
        };

        let prompt = build_prompt(operation, &self.content, params.as_ref())?;

        self.last_error = None;
        self.phase = Phase::Busy;
        Ok(prompt)
    }

    /// Resolve the selected language codes to the display names the prompt
    /// embeds. The target must come from the target list, which excludes
    /// the auto-detect pseudo-language; anything else refuses the dispatch.
    fn translate_params(&self) -> AppResult<TranslateParams> {
        if self.target_language.is_empty() {
            return Err(AppError::Precondition(
                "Please select a target language for translation".to_string(),
            ));
        }

        let target_name = target_languages()
            .find(|lang| lang.code == self.target_language)
            .map(|lang| lang.name)
            .ok_or_else(|| {
                AppError::Precondition(
                    "Invalid target language selected for translation".to_string(),
                )
            })?;

        let source_name = language_name(&self.source_language).unwrap_or("Auto-detect");

        Ok(TranslateParams {
            source_language_name: Some(source_name.to_string()),
            target_language_name: Some(target_name.to_string()),
        })
    }

    /// Leave `Busy` and reconcile the outcome of the completion call.
    fn settle(&mut self, outcome: AppResult<String>) -> bool {
        self.phase = Phase::Idle;
        match outcome {
            Ok(result) => {
                self.content = result;
                self.view_mode = ViewMode::Edit;
                self.last_error = None;
                true
            }
            Err(err) => {
                eprintln!("Operation failed: {}", err);
                self.last_error = Some(render_failure(&err));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider: hands back a fixed outcome and records the
    /// prompt it was given.
    struct FakeProvider {
        outcome: AppResult<String>,
        seen_prompt: Mutex<Option<String>>,
    }

    impl FakeProvider {
        fn ok(text: &str) -> Self {
            Self {
                outcome: Ok(text.to_string()),
                seen_prompt: Mutex::new(None),
            }
        }

        fn err(err: AppError) -> Self {
            Self {
                outcome: Err(err),
                seen_prompt: Mutex::new(None),
            }
        }

        fn prompt(&self) -> Option<String> {
            self.seen_prompt.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(&self, prompt: &str) -> AppResult<String> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            self.outcome.clone()
        }
    }

    fn session() -> (tempfile::TempDir, Session) {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = PrefsStore::open(dir.path().join("preferences.redb")).expect("open prefs");
        let session = Session::new(prefs).expect("session");
        (dir, session)
    }

    #[test]
    fn test_starts_with_welcome_document() {
        let (_dir, session) = session();
        assert_eq!(session.content(), WELCOME_DOCUMENT);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.view_mode(), ViewMode::Edit);
        assert_eq!(session.source_language(), "auto");
        assert_eq!(session.target_language(), "en");
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_empty_content_refuses_most_operations() {
        let (_dir, mut session) = session();
        session.set_content("   \n").unwrap();

        let provider = FakeProvider::ok("should not be called");
        for op in [
            Operation::Summarize,
            Operation::RewriteFormal,
            Operation::RewriteCasual,
            Operation::Expand,
            Operation::CheckGrammarPolish,
            Operation::Simplify,
            Operation::Translate,
        ] {
            assert!(!session.dispatch(op, &provider).await, "{} should refuse", op);
            assert_eq!(session.phase(), Phase::Idle);
            assert!(session.last_error().unwrap().contains("enter some text"));
            assert!(provider.prompt().is_none(), "{} reached the provider", op);
        }
    }

    #[tokio::test]
    async fn test_generate_ideas_allowed_on_empty_content() {
        let (_dir, mut session) = session();
        session.set_content("").unwrap();

        let provider = FakeProvider::ok("- idea one\n- idea two");
        assert!(session.dispatch(Operation::GenerateIdeas, &provider).await);
        assert_eq!(session.content(), "- idea one\n- idea two");
        assert!(provider.prompt().is_some());
    }

    #[tokio::test]
    async fn test_success_replaces_content_and_resets_view() {
        let (_dir, mut session) = session();
        session.set_content("draft text").unwrap();
        session.toggle_view();
        assert_eq!(session.view_mode(), ViewMode::Preview);

        let provider = FakeProvider::ok("summary of draft");
        assert!(session.dispatch(Operation::Summarize, &provider).await);

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.content(), "summary of draft");
        assert_eq!(session.view_mode(), ViewMode::Edit);
        assert!(session.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failure_preserves_content_and_records_error() {
        let (_dir, mut session) = session();
        session.set_content("draft text").unwrap();

        let provider = FakeProvider::err(AppError::Provider("quota exceeded".to_string()));
        assert!(!session.dispatch(Operation::Summarize, &provider).await);

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.content(), "draft text");
        assert_eq!(
            session.last_error(),
            Some("Failed to perform operation: quota exceeded.")
        );
    }

    #[tokio::test]
    async fn test_credential_failure_renders_remediation() {
        let (_dir, mut session) = session();
        session.set_content("draft text").unwrap();

        let provider = FakeProvider::err(AppError::Provider("API Key Not Valid".to_string()));
        session.dispatch(Operation::Summarize, &provider).await;

        let message = session.last_error().unwrap();
        assert!(message.contains("GEMINI_API_KEY"));
        assert!(!message.contains("Failed to perform operation"));
    }

    #[tokio::test]
    async fn test_missing_credential_renders_remediation() {
        let (_dir, mut session) = session();
        session.set_content("draft text").unwrap();

        let provider = FakeProvider::err(AppError::Configuration(
            "GEMINI_API_KEY environment variable is not set".to_string(),
        ));
        session.dispatch(Operation::Summarize, &provider).await;

        assert!(session
            .last_error()
            .unwrap()
            .contains("correctly set"));
    }

    #[tokio::test]
    async fn test_translate_requires_selected_target() {
        let (_dir, mut session) = session();
        session.set_content("bonjour").unwrap();
        session.set_target_language("").unwrap();

        let provider = FakeProvider::ok("unused");
        assert!(!session.dispatch(Operation::Translate, &provider).await);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.last_error().unwrap().contains("target language"));
        assert!(provider.prompt().is_none());
    }

    #[tokio::test]
    async fn test_translate_rejects_unknown_target() {
        let (_dir, mut session) = session();
        session.set_content("bonjour").unwrap();
        session.set_target_language("xx").unwrap();

        let provider = FakeProvider::ok("unused");
        assert!(!session.dispatch(Operation::Translate, &provider).await);
        assert!(session
            .last_error()
            .unwrap()
            .contains("Invalid target language"));
    }

    #[tokio::test]
    async fn test_translate_rejects_auto_as_target() {
        let (_dir, mut session) = session();
        session.set_content("bonjour").unwrap();
        session.set_target_language("auto").unwrap();

        let provider = FakeProvider::ok("unused");
        assert!(!session.dispatch(Operation::Translate, &provider).await);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session
            .last_error()
            .unwrap()
            .contains("Invalid target language"));
        assert!(provider.prompt().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_ignored_while_busy() {
        let (_dir, mut session) = session();
        session.set_content("text").unwrap();
        session.begin(Operation::Summarize).unwrap();
        assert_eq!(session.phase(), Phase::Busy);

        let provider = FakeProvider::ok("unused");
        assert!(!session.dispatch(Operation::Expand, &provider).await);
        assert_eq!(session.phase(), Phase::Busy);
        assert_eq!(session.content(), "text");
        assert!(session.last_error().is_none());
        assert!(provider.prompt().is_none());
    }

    #[tokio::test]
    async fn test_translate_auto_source_prompts_for_detection() {
        let (_dir, mut session) = session();
        session.set_content("bonjour le monde").unwrap();
        session.set_target_language("es").unwrap();

        let provider = FakeProvider::ok("hola mundo");
        assert!(session.dispatch(Operation::Translate, &provider).await);

        let prompt = provider.prompt().unwrap();
        assert!(prompt.contains("Detect the language"));
        assert!(!prompt.contains("from Auto-detect"));
    }

    #[tokio::test]
    async fn test_translate_named_source_prompts_with_pair() {
        let (_dir, mut session) = session();
        session.set_content("bonjour le monde").unwrap();
        session.set_source_language("fr").unwrap();
        session.set_target_language("es").unwrap();

        let provider = FakeProvider::ok("hola mundo");
        assert!(session.dispatch(Operation::Translate, &provider).await);

        let prompt = provider.prompt().unwrap();
        assert!(prompt.contains("from French to Spanish"));
        assert!(prompt.contains("Provide only the translated text"));
    }

    #[tokio::test]
    async fn test_guard_failure_after_prior_error_keeps_latest_message() {
        let (_dir, mut session) = session();
        session.set_content("text").unwrap();

        let failing = FakeProvider::err(AppError::Provider("boom".to_string()));
        session.dispatch(Operation::Summarize, &failing).await;
        assert!(session.last_error().is_some());

        // A successful dispatch clears the stale error.
        let provider = FakeProvider::ok("better text");
        assert!(session.dispatch(Operation::Expand, &provider).await);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_clear_resets_everything_when_idle() {
        let (_dir, mut session) = session();
        session.toggle_view();
        session.clear().unwrap();

        assert_eq!(session.content(), "");
        assert!(session.last_error().is_none());
        assert_eq!(session.view_mode(), ViewMode::Edit);
    }

    #[test]
    fn test_clear_rejected_while_busy() {
        let (_dir, mut session) = session();
        session.set_content("text").unwrap();
        session.begin(Operation::Summarize).unwrap();
        assert_eq!(session.phase(), Phase::Busy);

        assert!(matches!(
            session.clear(),
            Err(AppError::Precondition(_))
        ));
        assert_eq!(session.content(), "text");
    }

    #[test]
    fn test_edit_rejected_while_busy() {
        let (_dir, mut session) = session();
        session.set_content("text").unwrap();
        session.begin(Operation::Summarize).unwrap();

        assert!(session.set_content("sneaky edit").is_err());
        assert_eq!(session.content(), "text");
    }

    #[test]
    fn test_toggle_view_twice_is_identity() {
        let (_dir, mut session) = session();
        let before = session.content().to_string();
        session.toggle_view();
        session.toggle_view();
        assert_eq!(session.view_mode(), ViewMode::Edit);
        assert_eq!(session.content(), before);
    }

    #[test]
    fn test_dismiss_error() {
        let (_dir, mut session) = session();
        session.last_error = Some("old error".to_string());
        session.dismiss_error();
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_language_changes_persist_across_sessions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.redb");

        {
            let prefs = PrefsStore::open(&path).unwrap();
            let mut session = Session::new(prefs).unwrap();
            session.set_source_language("fr").unwrap();
            session.set_target_language("ja").unwrap();
        }

        let prefs = PrefsStore::open(&path).unwrap();
        let session = Session::new(prefs).unwrap();
        assert_eq!(session.source_language(), "fr");
        assert_eq!(session.target_language(), "ja");
    }

    #[test]
    fn test_export_helpers_use_fixed_metadata() {
        let (_dir, mut session) = session();
        session.set_content("# hello").unwrap();
        session.last_error = Some("stale".to_string());

        let md = session.export_markdown().unwrap();
        assert_eq!(md.file_name, "content.md");
        assert_eq!(md.mime_type, "text/markdown;charset=utf-8");
        assert_eq!(md.bytes, b"# hello");
        assert!(session.last_error().is_none());

        let txt = session.export_text().unwrap();
        assert_eq!(txt.file_name, "content.txt");
        assert_eq!(txt.mime_type, "text/plain;charset=utf-8");
    }

    #[test]
    fn test_export_empty_editor_fails() {
        let (_dir, mut session) = session();
        session.clear().unwrap();
        let err = session.export_markdown().unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
    }

    #[test]
    fn test_preview_of_welcome_document() {
        let (_dir, session) = session();
        let html = session.preview_html();
        assert!(html.contains("<h2>Example Markdown</h2>"));
        assert!(html.contains("<strong>preview</strong>"));
    }
}
