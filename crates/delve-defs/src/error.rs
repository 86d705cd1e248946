use std::path::PathBuf;

use crate::diagnostics::{Diagnostic, summarize};

/// Alias for `Result<T, DefError>`.
pub type DefResult<T> = Result<T, DefError>;

/// Errors that can occur while registering handlers or loading definitions.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DefError {
    /// A handler was registered for a type name that already has one.
    #[error("definition type \"{0}\" already has a handler")]
    #[diagnostic(code(delve::defs::duplicate_registration))]
    DuplicateRegistration(String),

    /// A definition file or directory could not be read.
    #[error("cannot read {}", .path.display())]
    #[diagnostic(code(delve::defs::io))]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Definition markup is structurally broken.
    #[error("malformed definitions in {origin}: {}", summarize(.diagnostics))]
    #[diagnostic(code(delve::defs::markup))]
    Markup {
        /// Where the markup came from (a path or a caller-chosen label).
        origin: String,
        /// Everything wrong with it.
        diagnostics: Vec<Diagnostic>,
        /// The diagnostics rendered against the source for terminal output.
        #[help]
        report: String,
    },

    /// A handler rejected an element.
    #[error("handler for \"{type_name}\" failed: {message}")]
    #[diagnostic(code(delve::defs::handler))]
    Handler {
        /// The type name the handler is registered under.
        type_name: String,
        /// What went wrong.
        message: String,
    },
}

impl DefError {
    /// Convenience constructor for handler failures.
    pub fn handler(type_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Handler {
            type_name: type_name.into(),
            message: message.to_string(),
        }
    }
}
