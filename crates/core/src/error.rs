use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location used when the engine does not report one.
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while processing a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The markdown engine (or the highlighting pass) rejected the input.
    #[error("Render error at {location}: {message}")]
    Render {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// No blank line separates the front-matter from the body.
    #[error("Malformed document: no blank line between front-matter and body")]
    MalformedDocument,
}

impl PipelineError {
    /// Create a render error with location
    pub fn render_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Render {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Whether this error came from the rendering engine.
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
