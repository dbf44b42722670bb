//! High-level streaming multipart sequence.

use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, future::poll_fn};

use crate::cancel::AbortSignal;
use crate::config::ParserConfig;
use crate::error::MultipartError;
use crate::part::{Part, PartBodyReader};
use crate::parser::ParserMachine;

/// Lazily yields each [`Part`] of a `multipart/form-data` body as its bytes
/// arrive, without buffering the body into memory.
///
/// Parts must be consumed (or explicitly drained) before asking for the
/// next one — calling [`Multipart::next_part`] while a previous part's body
/// has not yet been fully read drains it first, mirroring the single-pass
/// contract the underlying chunk source exposes.
#[derive(Debug)]
pub struct Multipart<S> {
    inner: ParserMachine<S>,
    reading_body: bool,
}

impl<S> Multipart<S> {
    /// Creates a multipart sequence from the request's `Content-Type` value
    /// and its chunk source, using default [`ParserConfig`] values.
    ///
    /// Boundary resolution is deferred: an invalid or missing `Content-Type`
    /// only surfaces as an error from the first call to
    /// [`Multipart::next_part`], not from this constructor.
    pub fn new(content_type: Option<impl Into<String>>, source: S) -> Self {
        Self::with_config(content_type, source, ParserConfig::default())
    }

    /// Creates a multipart sequence with an explicit [`ParserConfig`].
    pub fn with_config(content_type: Option<impl Into<String>>, source: S, config: ParserConfig) -> Self {
        Self {
            inner: ParserMachine::new(content_type.map(Into::into), source, config),
            reading_body: false,
        }
    }

    /// Attaches a cancellation signal; tripping it fails the next
    /// suspension point with [`MultipartError::Cancelled`].
    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.inner = self.inner.with_abort_signal(signal);
        self
    }
}

impl<S, E> Multipart<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Returns the next part, or `None` once the terminal boundary and any
    /// epilogue have been consumed.
    pub async fn next_part(&mut self) -> Result<Option<Part<'_>>, MultipartError> {
        if self.reading_body {
            self.drain_current_part().await?;
        }

        let started = poll_fn(|cx| self.inner.poll_next_part(cx)).await?;
        let Some(started) = started else {
            #[cfg(feature = "tracing")]
            tracing::debug!("multipart: reached end of body");
            return Ok(None);
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            field_name = started.headers.field_name.as_deref().unwrap_or("<none>"),
            file_name = started.headers.file_name.as_deref().unwrap_or("<none>"),
            "multipart: yielding part"
        );

        self.reading_body = true;
        Ok(Some(Part::new(started.headers, &mut self.inner)))
    }

    async fn drain_current_part(&mut self) -> Result<(), MultipartError> {
        while poll_fn(|cx| self.inner.poll_next_chunk(cx)).await?.is_some() {}
        self.reading_body = false;
        Ok(())
    }
}

impl<S, E> PartBodyReader for ParserMachine<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    fn poll_next_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Bytes>, MultipartError>> {
        ParserMachine::poll_next_chunk(self, cx)
    }
}
