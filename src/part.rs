//! The part type yielded for each form-data segment.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::HeaderMap;

use crate::error::MultipartError;
use crate::parser::ParsedPartHeaders;

/// Internal seam a [`Part`] reads body chunks through. Implemented by the
/// parser state machine; abstracted so `Part` does not need to know about
/// the chunk source's concrete type.
pub(crate) trait PartBodyReader {
    fn poll_next_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Bytes>, MultipartError>>;
}

/// A single parsed part of a multipart body: its headers plus a one-shot
/// handle to its content.
///
/// The body handle borrows from the parser driving it, so the borrow
/// checker — not a runtime flag — prevents reading a part's content after
/// the parser has advanced to the next part. Re-reading a part's content
/// after it has already been consumed via [`Part::stream`], [`Part::bytes`]
/// or [`Part::text`] instead returns [`MultipartError::PartAbandoned`].
pub struct Part<'a> {
    headers: ParsedPartHeaders,
    body_reader: Option<&'a mut dyn PartBodyReader>,
}

impl fmt::Debug for Part<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("headers", &self.headers)
            .field("consumed", &self.body_reader.is_none())
            .finish()
    }
}

impl<'a> Part<'a> {
    pub(crate) fn new(headers: ParsedPartHeaders, body_reader: &'a mut dyn PartBodyReader) -> Self {
        Self {
            headers,
            body_reader: Some(body_reader),
        }
    }

    /// Returns the logical field name (`Content-Disposition`'s `name`),
    /// absent if the header was missing or malformed.
    pub fn field_name(&self) -> Option<&str> {
        self.headers.field_name.as_deref()
    }

    /// Returns the file name, if this part carries one.
    pub fn file_name(&self) -> Option<&str> {
        self.headers.file_name.as_deref()
    }

    /// Returns the parsed part-level content type, absent if `Content-Type`
    /// was missing or did not parse.
    pub fn content_type(&self) -> Option<&mime::Mime> {
        self.headers.content_type.as_ref()
    }

    /// Returns the raw header map for this part.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers.raw
    }

    /// Returns the normalized content-disposition/content-type view.
    pub fn parsed_headers(&self) -> &ParsedPartHeaders {
        &self.headers
    }

    /// Reads the remaining body into a single contiguous [`Bytes`] buffer.
    pub async fn bytes(&mut self) -> Result<Bytes, MultipartError> {
        let mut stream = self.stream()?;
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(out))
    }

    /// Reads the remaining body and decodes it as UTF-8 text.
    pub async fn text(&mut self) -> Result<String, MultipartError> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| MultipartError::ContentNotUtf8)
    }

    /// Returns a one-shot stream over this part's remaining body bytes.
    ///
    /// Can only be called once per part; a second call returns
    /// [`MultipartError::PartAbandoned`].
    pub fn stream(&mut self) -> Result<PartBodyStream<'_>, MultipartError> {
        let body_reader = self.body_reader.take().ok_or(MultipartError::PartAbandoned)?;
        Ok(PartBodyStream {
            body_reader,
            finished: false,
        })
    }
}

/// One-shot byte stream over a [`Part`]'s remaining content, returned by
/// [`Part::stream`].
pub struct PartBodyStream<'a> {
    body_reader: &'a mut dyn PartBodyReader,
    finished: bool,
}

impl fmt::Debug for PartBodyStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartBodyStream").field("finished", &self.finished).finish()
    }
}

impl Stream for PartBodyStream<'_> {
    type Item = Result<Bytes, MultipartError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.body_reader.poll_next_chunk(cx) {
            Poll::Ready(Ok(Some(bytes))) => Poll::Ready(Some(Ok(bytes))),
            Poll::Ready(Ok(None)) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Ready(Err(err)) => {
                self.finished = true;
                Poll::Ready(Some(Err(err)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
