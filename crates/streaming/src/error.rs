use std::fmt;

/// What went wrong while loading land geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    /// Transport failure or a non-success HTTP status.
    Network,
    /// HTTP 404, a missing local file, or a collection the document lacks.
    NotFound,
    /// The document is not JSON, not a topology, or reports an error itself.
    Malformed,
}

impl LoadErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadErrorKind::Network => "network",
            LoadErrorKind::NotFound => "not-found",
            LoadErrorKind::Malformed => "malformed",
        }
    }
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured load failure. Stored in state, never thrown at the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub kind: LoadErrorKind,
    pub message: String,
}

impl LoadError {
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LoadErrorKind::Network, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(LoadErrorKind::NotFound, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(LoadErrorKind::Malformed, message)
    }

    pub fn kind(&self) -> LoadErrorKind {
        self.kind
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for LoadError {}
