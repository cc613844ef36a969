use std::fmt;

/// Error kind for serde errors.
///
/// The engine uses the kind to decide what to do with a failed record
/// (skip the record or fail the stream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bytes do not parse as the expected wire format.
    MalformedPayload,
    /// Structurally invalid object-graph blob.
    Corrupt,
    /// Embedded type identity does not match the expected type.
    UnknownType,
    /// String does not map to a value of a closed enumeration.
    UnknownEnumTag,
    /// Record is missing a required field or holds a value of the wrong type.
    SchemaViolation,
    /// Operation not offered by this serde.
    NotImplemented,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedPayload => f.write_str("malformed payload"),
            ErrorKind::Corrupt => f.write_str("corrupt"),
            ErrorKind::UnknownType => f.write_str("unknown type"),
            ErrorKind::UnknownEnumTag => f.write_str("unknown enum tag"),
            ErrorKind::SchemaViolation => f.write_str("schema violation"),
            ErrorKind::NotImplemented => f.write_str("not implemented"),
        }
    }
}

/// Serde error returned by every codec and plugin operation.
#[derive(Clone, PartialEq, Eq)]
pub struct SerdeError {
    kind: ErrorKind,
    message: String,
}

impl SerdeError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, message: msg.into() }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPayload, msg)
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Corrupt, msg)
    }

    pub fn unknown_type(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType, msg)
    }

    pub fn unknown_enum_tag(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownEnumTag, msg)
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaViolation, msg)
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Debug for SerdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl fmt::Display for SerdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SerdeError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → SerdeError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::str::Utf8Error> for SerdeError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::malformed(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for SerdeError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::malformed(e.to_string())
    }
}
