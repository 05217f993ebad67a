//! Operation catalog and prompt builder
//!
//! One hand-authored instruction per operation. The match is total over
//! `Operation`, so adding a variant without a template fails to compile.

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{Operation, TranslateParams};

/// True for the auto-detect pseudo-language, which must never be named as
/// a translation source in the prompt.
fn is_auto_detect(name: &str) -> bool {
    let lowered = name.to_lowercase();
    lowered == "auto" || lowered == "auto-detect"
}

/// Build the final prompt string for an operation.
///
/// Pure and deterministic. Only `text` (and, for Translate, the resolved
/// language names) is interpolated; the instructions themselves are static.
pub fn build_prompt(
    operation: Operation,
    text: &str,
    params: Option<&TranslateParams>,
) -> AppResult<String> {
    let prompt = match operation {
        Operation::Summarize => format!(
            "Please provide a concise summary of the following text:\n\n---\n{}\n---",
            text
        ),
        Operation::RewriteFormal => format!(
            "Rewrite the following text using a more formal and professional tone. \
             Ensure clarity and precision:\n\n---\n{}\n---",
            text
        ),
        Operation::RewriteCasual => format!(
            "Rewrite the following text in a more casual, friendly, and conversational \
             tone:\n\n---\n{}\n---",
            text
        ),
        Operation::Expand => format!(
            "Expand on the following text. Add relevant details, examples, or \
             explanations to make it more comprehensive:\n\n---\n{}\n---",
            text
        ),
        Operation::CheckGrammarPolish => format!(
            "Review the following text for any grammatical errors, spelling mistakes, \
             punctuation issues, and awkward phrasing. Polish the language for improved \
             clarity, conciseness, and flow. Return only the corrected and polished \
             version of the text:\n\n---\n{}\n---",
            text
        ),
        Operation::Simplify => format!(
            "Simplify the language of the following text. Make it easier to understand \
             for a general audience, avoiding jargon and complex sentence \
             structures:\n\n---\n{}\n---",
            text
        ),
        Operation::GenerateIdeas => format!(
            "Based on the following topic or initial thoughts, generate 3-5 distinct \
             ideas or angles for further exploration. Present them as a bulleted list. \
             If the input is not a topic, ask for a topic.\n\nTopic/Thoughts:\n---\n{}\n---",
            text
        ),
        Operation::Translate => {
            let target = params
                .and_then(|p| p.target_language_name.as_deref())
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Precondition(
                        "Target language not specified for translation".to_string(),
                    )
                })?;

            match params.and_then(|p| p.source_language_name.as_deref()) {
                Some(source) if !is_auto_detect(source) => format!(
                    "Translate the following text from {} to {}. Provide only the \
                     translated text:\n\n---\n{}\n---",
                    source, target, text
                ),
                _ => format!(
                    "Detect the language of the following text and then translate it \
                     to {}. Provide only the translated text:\n\n---\n{}\n---",
                    target, text
                ),
            }
        }
    };

    Ok(prompt)
}
