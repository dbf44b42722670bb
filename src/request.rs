//! A thin request adapter trait standing in for the platform HTTP layer.
//!
//! §1 of the governing spec draws a line between "the parser" (specified in
//! detail) and "a thin adapter that exposes a platform HTTP request as a
//! standard request object" (named as existing, left to the implementer).
//! This module is that seam: [`MultipartRequest`] asks a caller for exactly
//! the two things the parser needs — a `Content-Type` header and a chunked
//! byte body — and nothing about request/response modelling, trust-proxy
//! derivation, or socket handling, all of which stay the host framework's
//! job. See [`crate::hyper`], [`crate::axum`] and [`crate::actix`] for
//! concrete adapters built on this trait.

use bytes::Bytes;
use futures::Stream;
use http::HeaderMap;

use crate::config::ParserConfig;
use crate::error::MultipartError;
use crate::multipart::Multipart;

/// Reads the raw `Content-Type` header value out of a header map, if present
/// and representable as a `str`.
///
/// Returns `None` for both "no such header" and "header present but not
/// valid ASCII/UTF-8" — both collapse to the same
/// [`MultipartError::MissingOrInvalidContentType`] once
/// [`crate::parser::boundary::extract_boundary`] sees them.
pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(http::header::CONTENT_TYPE)?.to_str().ok()
}

/// A request that can supply a `Content-Type` header and an owned, `Unpin`
/// chunked byte body.
///
/// Implement this directly for a custom request type, or reach for one of
/// this crate's feature-gated framework adapters instead.
pub trait MultipartRequest {
    /// The chunk stream type produced by [`MultipartRequest::into_body`].
    type BodyStream: Stream<Item = Result<Bytes, MultipartError>> + Unpin;

    /// Returns the request's header map.
    fn headers(&self) -> &HeaderMap;

    /// Consumes the request, returning its body as a chunk stream.
    fn into_body(self) -> Self::BodyStream;
}

/// Builds a [`Multipart`] sequence from any [`MultipartRequest`], using
/// default [`ParserConfig`] values.
pub fn multipart<R>(request: R) -> Multipart<R::BodyStream>
where
    R: MultipartRequest,
{
    multipart_with_config(request, ParserConfig::default())
}

/// Builds a [`Multipart`] sequence from any [`MultipartRequest`] with an
/// explicit [`ParserConfig`].
pub fn multipart_with_config<R>(request: R, config: ParserConfig) -> Multipart<R::BodyStream>
where
    R: MultipartRequest,
{
    let content_type = content_type(request.headers()).map(str::to_owned);
    Multipart::with_config(content_type, request.into_body(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream::{self, Iter};
    use http::{HeaderValue, header};
    use std::vec::IntoIter;

    struct FakeRequest {
        headers: HeaderMap,
        body: Vec<Bytes>,
    }

    impl MultipartRequest for FakeRequest {
        type BodyStream = Iter<IntoIter<Result<Bytes, MultipartError>>>;

        fn headers(&self) -> &HeaderMap {
            &self.headers
        }

        fn into_body(self) -> Self::BodyStream {
            stream::iter(self.body.into_iter().map(Ok).collect::<Vec<_>>())
        }
    }

    #[tokio::test]
    async fn builds_multipart_from_a_custom_request_type() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=B"),
        );
        let body = b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhi\r\n--B--\r\n";
        let request = FakeRequest {
            headers,
            body: vec![Bytes::from_static(body)],
        };

        let mut parts = multipart(request);
        let mut part = parts.next_part().await.unwrap().expect("one part");
        assert_eq!(part.field_name(), Some("a"));
        assert_eq!(part.text().await.unwrap(), "hi");
    }
}
