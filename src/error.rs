use std::path::PathBuf;

/// Fatal conditions that abort a log parse.
///
/// Anything not listed here (unknown tags, unrecognized sources, malformed
/// skip notices) is logged and absorbed by the parsers instead.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Log resource does not exist: {}", path.display())]
    ResourceUnavailable { path: PathBuf },

    #[error("Failed to read log resource {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log resource {} is not valid UTF-8 at line {line_number}", path.display())]
    InvalidUtf8 { path: PathBuf, line_number: usize },

    #[error("Tag delimiter not found in line {line_number}: {line}")]
    MalformedLine { line_number: usize, line: String },

    #[error("Nested jar not found in {source_text}")]
    MalformedSource { source_text: String },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
