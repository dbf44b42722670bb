//! The single error type returned by every fallible operation in this crate.

use std::sync::Arc;

/// Errors produced while resolving a boundary, parsing headers, or streaming
/// a multipart body.
///
/// The parser state machine is cooperative: once any of these errors is
/// produced, the machine transitions to a terminal failed state and every
/// later poll re-raises a clone of the same error rather than silently
/// resuming or producing a different one.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum MultipartError {
    /// The request had no `Content-Type` header, the header was not
    /// `multipart/form-data`, or it carried no usable `boundary` parameter.
    #[error("missing or invalid Content-Type for a multipart/form-data body")]
    MissingOrInvalidContentType,

    /// The `boundary` parameter was present but empty or otherwise unusable
    /// as a delimiter.
    #[error("multipart boundary is missing or empty")]
    MissingBoundary,

    /// A part's header block exceeded `ParserConfig::max_header_size`
    /// before a terminating blank line was found.
    #[error("part header block exceeded the configured maximum size")]
    MaxHeaderSizeExceeded,

    /// A single part's body exceeded `ParserConfig::max_file_size`.
    #[error("part body exceeded the configured maximum size")]
    MaxFileSizeExceeded,

    /// The bytes immediately following a boundary match were neither the
    /// CRLF that introduces the next part's headers nor the `--` that marks
    /// the closing boundary.
    #[error("malformed boundary delimiter in request body")]
    InvalidBoundaryFollower,

    /// A header line, or the body, ended because the underlying stream
    /// ended before a terminating boundary was ever found.
    #[error("multipart body ended unexpectedly before a terminating boundary")]
    UnexpectedEnd,

    /// A header line was present but could not be parsed as `name: value`.
    #[error("malformed part header line")]
    MalformedHeader,

    /// [`crate::Part::text`] was called on a part whose content is not valid
    /// UTF-8. Distinct from [`MultipartError::MalformedHeader`]: this is a
    /// fully-parsed part whose *payload* fails to decode, not a problem with
    /// its headers.
    #[error("part content is not valid UTF-8")]
    ContentNotUtf8,

    /// A `Part`'s content was read again after the parser had already moved
    /// on to the next part.
    #[error("part was read after the parser advanced past it")]
    PartAbandoned,

    /// The underlying chunk stream produced an error.
    ///
    /// Not wired through `#[source]`: `thiserror`'s source-chain support
    /// needs the field itself to implement `std::error::Error`, which an
    /// `Arc<dyn Error>` does not (only `Box<dyn Error>` gets that impl from
    /// `std`). The original error's `Display` output is still folded into
    /// this variant's message below.
    #[error("multipart chunk source failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync + 'static>),

    /// Parsing was cancelled via an [`crate::cancel::AbortSignal`].
    #[error("multipart parsing was cancelled")]
    Cancelled,
}

impl MultipartError {
    /// Wraps an arbitrary chunk-source error as a [`MultipartError::Transport`].
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Arc::new(err))
    }

    /// Returns `true` if this error represents exceeding a configured limit.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(
            self,
            Self::MaxHeaderSizeExceeded | Self::MaxFileSizeExceeded
        )
    }
}
