use camino::Utf8PathBuf;
use thiserror::Error;

/// Decode failures of a single line data file.
///
/// These errors carry no file name: decoders work on in-memory buffers and the
/// file-level loaders wrap them into [`LineDataError::FormatError`] with the path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Unsupported binary line format version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unexpected end of data while reading {context}")]
    Truncated { context: String },

    #[error("Invalid line metadata at line {line}: expected 1 or 2 tokens, found {tokens}")]
    InvalidMetadata { line: usize, tokens: usize },

    #[error("Hierarchy data does not match block {block}: expected {expected} lines, found {found}")]
    HierarchyMismatch {
        block: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown file extension: {0}")]
    UnknownExtension(String),

    #[error("Unsupported line data payload: {0}")]
    Unsupported(String),

    #[error("Invalid number '{token}' at line {line}")]
    InvalidNumber { line: usize, token: String },

    #[error("Record at line {line} holds {found} values, expected {expected}")]
    RecordLength {
        line: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Error, Debug)]
pub enum LineDataError {
    #[error("Unable to perform file operation on {path}: {source}")]
    IoError {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid line data in {path}: {source}")]
    FormatError {
        path: Utf8PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("No trajectory file given")]
    NoInputFiles,

    #[error("Invalid load parameter: {0}")]
    InvalidLoadParameter(String),

    #[error("Invalid transform string: {0}")]
    InvalidTransformString(String),

    #[error("Trajectory {trajectory} has {found} attribute channels, expected {expected}")]
    InconsistentAttributeCount {
        trajectory: usize,
        expected: usize,
        found: usize,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unable to build the worker pool: {0}")]
    ThreadPoolError(String),
}

impl LineDataError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        LineDataError::IoError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(path: impl Into<Utf8PathBuf>, source: FormatError) -> Self {
        LineDataError::FormatError {
            path: path.into(),
            source,
        }
    }

    /// Decode failure kind, if this error comes from a decoder.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            LineDataError::FormatError { source, .. } => Some(source),
            _ => None,
        }
    }

    /// File the error refers to, if any.
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            LineDataError::IoError { path, .. } | LineDataError::FormatError { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for LineDataError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        LineDataError::ThreadPoolError(err.to_string())
    }
}

impl PartialEq for LineDataError {
    fn eq(&self, other: &Self) -> bool {
        use LineDataError::*;
        match (self, other) {
            // io::Error is not comparable: same path and same kind is equality
            (IoError { path: a, source: e }, IoError { path: b, source: f }) => {
                a == b && e.kind() == f.kind()
            }
            (FormatError { path: a, source: e }, FormatError { path: b, source: f }) => {
                a == b && e == f
            }
            (InvalidLoadParameter(a), InvalidLoadParameter(b)) => a == b,
            (InvalidTransformString(a), InvalidTransformString(b)) => a == b,
            (
                InconsistentAttributeCount {
                    trajectory: a,
                    expected: b,
                    found: c,
                },
                InconsistentAttributeCount {
                    trajectory: d,
                    expected: e,
                    found: f,
                },
            ) => a == d && b == e && c == f,
            (JsonError(_), JsonError(_)) => true,
            (ThreadPoolError(a), ThreadPoolError(b)) => a == b,

            (NoInputFiles, NoInputFiles) => true,

            _ => false,
        }
    }
}
