//! Error handling for the lfs-mover crate.
use std::{error::Error as StdError, fmt};

/// Error type for the lfs-mover crate.
#[derive(Debug)]
pub struct LfsMoverError {
    /// Inner error.
    inner: Box<Inner>,
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the lfs-mover crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: LfsMoverErrorKind,

    /// Human-readable detail.
    message: Option<String>,

    /// Source error.
    source: Option<BoxError>,
}

/// Error kinds for the lfs-mover crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfsMoverErrorKind {
    /// An external command exited non-zero or failed to start.
    Command,

    /// Remote-mirror registration against the hosting platform failed.
    MirrorConfiguration,

    /// A required credential or parameter is missing or invalid.
    Configuration,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to URL parsing or rewriting.
    Url,

    /// Error related to filesystem access.
    Io,
}

impl LfsMoverError {
    /// Create a new error.
    pub(crate) fn new(kind: LfsMoverErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                message: None,
                source: None,
            }),
        }
    }

    /// Attach a human-readable detail to the error.
    pub(crate) fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.inner.message = Some(text.into());
        self
    }

    /// Attach a source error.
    pub(crate) fn with_source<E: Into<BoxError>>(mut self, source: E) -> Self {
        self.inner.source = Some(source.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> LfsMoverErrorKind {
        self.inner.kind
    }
}

impl fmt::Display for LfsMoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner.kind {
            LfsMoverErrorKind::Command => "external command failed",
            LfsMoverErrorKind::MirrorConfiguration => "mirror configuration failed",
            LfsMoverErrorKind::Configuration => "configuration error",
            LfsMoverErrorKind::Reqwest => "http error",
            LfsMoverErrorKind::Serde => "deserialization error",
            LfsMoverErrorKind::Url => "url error",
            LfsMoverErrorKind::Io => "io error",
        };
        write!(f, "{kind}")?;
        if let Some(message) = &self.inner.message {
            write!(f, ": {message}")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for LfsMoverError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for LfsMoverError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(LfsMoverErrorKind::Reqwest).with_source(e)
    }
}

impl From<serde_json::Error> for LfsMoverError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(LfsMoverErrorKind::Serde).with_source(e)
    }
}

impl From<std::io::Error> for LfsMoverError {
    fn from(e: std::io::Error) -> Self {
        Self::new(LfsMoverErrorKind::Io).with_source(e)
    }
}

impl From<url::ParseError> for LfsMoverError {
    fn from(e: url::ParseError) -> Self {
        Self::new(LfsMoverErrorKind::Url).with_source(e)
    }
}

impl From<&str> for LfsMoverError {
    fn from(text: &str) -> Self {
        Self::new(LfsMoverErrorKind::Configuration).with_text(text)
    }
}

impl From<String> for LfsMoverError {
    fn from(text: String) -> Self {
        Self::new(LfsMoverErrorKind::Configuration).with_text(text)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = LfsMoverError::new(LfsMoverErrorKind::Configuration)
            .with_text("TARGET_TOKEN is not set");
        let shown = err.to_string();
        assert!(shown.contains("configuration error"));
        assert!(shown.contains("TARGET_TOKEN"));
    }

    #[test]
    fn kind_is_preserved_through_conversions() {
        let err: LfsMoverError = "missing source url".into();
        assert_eq!(err.kind(), LfsMoverErrorKind::Configuration);
    }
}
