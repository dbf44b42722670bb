//! Hyper integration helpers.
//!
//! Thin on purpose: per §1 of the governing spec, HTTP request/response
//! modelling and the server socket integration stay hyper's job. This module
//! only reshapes a `hyper::Request<B>` body into the chunk stream shape
//! [`Multipart`] consumes and reads its `Content-Type` header.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http_body_util::BodyExt;
use hyper::Request;
use hyper::body::Body;

use crate::config::ParserConfig;
use crate::error::MultipartError;
use crate::multipart::Multipart;
use crate::request::content_type;

/// A boxed chunk stream over a Hyper request body, mapped into
/// [`MultipartError`].
pub type HyperBodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, MultipartError>> + Send>>;

/// Extracts the raw `Content-Type` header from a Hyper request.
pub fn content_type_from_request<B>(request: &Request<B>) -> Option<&str> {
    content_type(request.headers())
}

/// Reshapes a Hyper body into the stream shape [`Multipart`] consumes.
pub fn body_stream<B>(body: B) -> HyperBodyStream
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    Box::pin(body.into_data_stream().map(|item| item.map_err(MultipartError::transport)))
}

/// Adapts a `hyper::Request<B>` into a [`Multipart`] stream, using default
/// [`ParserConfig`] values.
///
/// Boundary resolution is deferred, mirroring [`Multipart::new`]: a missing
/// or invalid `Content-Type` surfaces from the first call to
/// [`Multipart::next_part`], not from this constructor.
pub fn into_multipart<B>(request: Request<B>) -> Multipart<HyperBodyStream>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    into_multipart_with_config(request, ParserConfig::default())
}

/// Same as [`into_multipart`] with an explicit [`ParserConfig`].
pub fn into_multipart_with_config<B>(request: Request<B>, config: ParserConfig) -> Multipart<HyperBodyStream>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let content_type = content_type_from_request(&request).map(str::to_owned);
    let stream = body_stream(request.into_body());
    Multipart::with_config(content_type, stream, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[tokio::test]
    async fn adapts_a_hyper_request_body() {
        let body = b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhi\r\n--B--\r\n";
        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=B")
            .body(Full::new(Bytes::from_static(body)))
            .unwrap();

        let mut multipart = into_multipart(request);
        let mut part = multipart.next_part().await.unwrap().expect("one part");
        assert_eq!(part.field_name(), Some("a"));
        assert_eq!(part.text().await.unwrap(), "hi");
    }
}
