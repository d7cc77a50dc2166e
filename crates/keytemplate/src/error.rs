//! Error types for key template evaluation

use miette::Diagnostic;
use thiserror::Error;

/// Error type for template evaluation
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The template text itself is malformed
    #[error("Invalid key template: {message}")]
    #[diagnostic(
        code(savecache::keytemplate::syntax),
        help("Placeholders look like {{{{ .Branch }}}} and must be properly closed")
    )]
    Syntax {
        /// Description of the syntax problem
        message: String,
    },

    /// A placeholder references a field the build context does not have
    #[error("Unknown template field: .{field}")]
    #[diagnostic(
        code(savecache::keytemplate::unknown_field),
        help("Available fields are .Workflow, .Branch and .CommitHash")
    )]
    UnknownField {
        /// The field name as written in the template
        field: String,
    },
}

impl Error {
    /// Create a syntax error
    #[must_use]
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create an unknown-field error
    #[must_use]
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }
}

/// Result type for template evaluation
pub type Result<T> = std::result::Result<T, Error>;
