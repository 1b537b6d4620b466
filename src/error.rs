//! Error types for test generation.
//!
//! Every failure a single generation run can hit falls into one of four
//! terminal kinds. None of them is retried internally.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning a word list into a test document.
#[derive(Debug, Error)]
pub enum WordTestError {
    /// The input document could not be opened or is structurally invalid.
    #[error("cannot read word list {}: {reason}", .path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The document was read but yielded no lessons or no word pairs.
    #[error("no lessons found ({lessons} lessons, {pairs} word pairs)")]
    NoLessonsFound { lessons: usize, pairs: usize },

    /// The template could not be opened.
    #[error("template unavailable {}: {reason}", .path.display())]
    TemplateUnavailable { path: PathBuf, reason: String },

    /// Binding the context into the template or saving the output failed.
    #[error("render failed: {0}")]
    RenderFailure(String),
}

impl WordTestError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        WordTestError::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn template(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        WordTestError::TemplateUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn render(reason: impl ToString) -> Self {
        WordTestError::RenderFailure(reason.to_string())
    }

    /// Generic message suitable for showing to the person who uploaded the file.
    pub fn user_message(&self) -> &'static str {
        match self {
            WordTestError::SourceUnreadable { .. } | WordTestError::NoLessonsFound { .. } => {
                "Could not parse any words from the word list file."
            }
            WordTestError::TemplateUnavailable { .. } => {
                "The test template is missing on the server."
            }
            WordTestError::RenderFailure(_) => "Failed to generate the test document.",
        }
    }

    /// Returns `true` when the problem lies with the uploaded word list.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            WordTestError::SourceUnreadable { .. } | WordTestError::NoLessonsFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WordTestError>;
