//! Axum integration: a `FromRequest` extractor plus the functions it's built
//! from.

use std::pin::Pin;

use axum::{
    body::Bytes,
    extract::FromRequest,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::{Stream, StreamExt};

use crate::config::ParserConfig;
use crate::error::MultipartError;
use crate::multipart::Multipart;

/// A boxed chunk stream over an Axum request body, mapped into
/// [`MultipartError`].
pub type AxumBodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, MultipartError>> + Send>>;

/// Axum [`Multipart`] type produced by [`MultipartExtractor`].
pub type AxumMultipart = Multipart<AxumBodyStream>;

/// Rejection returned when [`MultipartExtractor`] cannot resolve a boundary
/// or the extracted request otherwise fails to become multipart.
#[derive(Debug)]
pub struct MultipartRejection(pub MultipartError);

impl IntoResponse for MultipartRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.0.to_string()).into_response()
    }
}

/// Extracts the raw `Content-Type` header from Axum request headers.
pub fn content_type_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::CONTENT_TYPE)?.to_str().ok()
}

/// Reshapes an Axum body stream into the stream shape [`Multipart`] consumes.
pub fn body_stream<S>(stream: S) -> AxumBodyStream
where
    S: Stream<Item = Result<Bytes, axum::Error>> + Send + 'static,
{
    Box::pin(stream.map(|item| item.map_err(MultipartError::transport)))
}

/// Axum extractor that parses the request body into a [`Multipart`]
/// sequence, deferring boundary resolution to the first
/// [`Multipart::next_part`] call exactly as [`Multipart::new`] does.
pub struct MultipartExtractor(pub AxumMultipart);

impl std::fmt::Debug for MultipartExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MultipartExtractor").field(&"<multipart>").finish()
    }
}

impl<S> FromRequest<S> for MultipartExtractor
where
    S: Send + Sync,
{
    type Rejection = MultipartRejection;

    async fn from_request(request: axum::extract::Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();
        let content_type = content_type_from_headers(&parts.headers).map(str::to_owned);
        let stream = body_stream(body.into_data_stream());
        Ok(Self(Multipart::with_config(content_type, stream, ParserConfig::default())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Request;

    #[tokio::test]
    async fn extracts_multipart_from_an_axum_request() {
        let payload = b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhi\r\n--B--\r\n";
        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=B")
            .body(Body::from(payload.to_vec()))
            .unwrap();

        let MultipartExtractor(mut multipart) = MultipartExtractor::from_request(request, &()).await.unwrap();
        let mut part = multipart.next_part().await.unwrap().expect("one part");
        assert_eq!(part.field_name(), Some("a"));
        assert_eq!(part.text().await.unwrap(), "hi");
    }
}
