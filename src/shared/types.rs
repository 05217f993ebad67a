use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of AI operations the editor can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Summarize,
    RewriteFormal,
    RewriteCasual,
    Expand,
    CheckGrammarPolish,
    Simplify,
    GenerateIdeas,
    Translate,
}

impl Operation {
    /// Operations shown on the main toolbar. Translate has its own
    /// dedicated controls and is deliberately absent.
    pub const MAIN_TOOLBAR: &'static [Operation] = &[
        Operation::Summarize,
        Operation::RewriteFormal,
        Operation::RewriteCasual,
        Operation::Expand,
        Operation::CheckGrammarPolish,
        Operation::Simplify,
        Operation::GenerateIdeas,
    ];

    pub const ALL: &'static [Operation] = &[
        Operation::Summarize,
        Operation::RewriteFormal,
        Operation::RewriteCasual,
        Operation::Expand,
        Operation::CheckGrammarPolish,
        Operation::Simplify,
        Operation::GenerateIdeas,
        Operation::Translate,
    ];

    /// Human-readable label, as shown on toolbar buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Summarize => "Summarize",
            Operation::RewriteFormal => "Rewrite (Formal)",
            Operation::RewriteCasual => "Rewrite (Casual)",
            Operation::Expand => "Expand",
            Operation::CheckGrammarPolish => "Check Grammar & Polish",
            Operation::Simplify => "Simplify Language",
            Operation::GenerateIdeas => "Generate Ideas (from topic)",
            Operation::Translate => "Translate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Edit,
    Preview,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Edit => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Edit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
}

/// Full language list. The first entry is the auto-detect pseudo-language,
/// valid as a translation source but never as a target.
pub const LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "auto", name: "Auto-detect" },
    LanguageOption { code: "en", name: "English" },
    LanguageOption { code: "fa", name: "Farsi (Persian)" },
    LanguageOption { code: "es", name: "Spanish" },
    LanguageOption { code: "fr", name: "French" },
    LanguageOption { code: "de", name: "German" },
    LanguageOption { code: "it", name: "Italian" },
    LanguageOption { code: "pt", name: "Portuguese" },
    LanguageOption { code: "nl", name: "Dutch" },
    LanguageOption { code: "ru", name: "Russian" },
    LanguageOption { code: "ja", name: "Japanese" },
    LanguageOption { code: "ko", name: "Korean" },
    LanguageOption { code: "zh", name: "Chinese (Simplified)" },
    LanguageOption { code: "ar", name: "Arabic" },
    LanguageOption { code: "hi", name: "Hindi" },
];

pub const AUTO_DETECT_CODE: &str = "auto";
pub const DEFAULT_SOURCE_LANGUAGE_CODE: &str = "auto";
pub const DEFAULT_TARGET_LANGUAGE_CODE: &str = "en";

/// Languages selectable as a translation target (everything except auto).
pub fn target_languages() -> impl Iterator<Item = &'static LanguageOption> {
    LANGUAGES.iter().filter(|lang| lang.code != AUTO_DETECT_CODE)
}

/// Resolve a language code to its display name.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|lang| lang.code == code)
        .map(|lang| lang.name)
}

/// Parameters for the Translate operation. Names, not codes: the prompt
/// embeds the display name so the model sees "French", not "fr".
#[derive(Debug, Clone, Default)]
pub struct TranslateParams {
    pub source_language_name: Option<String>,
    pub target_language_name: Option<String>,
}
