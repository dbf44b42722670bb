//! Actix Web integration: a `FromRequest` extractor plus the functions it's
//! built from.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev, error::PayloadError, http::header, web};
use bytes::Bytes;
use futures::stream::Map;

use crate::config::ParserConfig;
use crate::error::MultipartError;
use crate::multipart::Multipart;

/// An Actix payload stream mapped into [`MultipartError`].
pub type ActixBodyStream = Map<web::Payload, fn(Result<Bytes, PayloadError>) -> Result<Bytes, MultipartError>>;

/// Extracts the raw `Content-Type` header from an Actix request.
pub fn content_type_from_request(request: &HttpRequest) -> Option<&str> {
    request.headers().get(header::CONTENT_TYPE)?.to_str().ok()
}

/// Reshapes an Actix payload into the stream shape [`Multipart`] consumes.
pub fn body_stream(payload: web::Payload) -> ActixBodyStream {
    use futures::StreamExt;
    payload.map(map_item)
}

fn map_item(item: Result<Bytes, PayloadError>) -> Result<Bytes, MultipartError> {
    item.map_err(MultipartError::transport)
}

/// Builds a [`Multipart`] sequence from an Actix request and payload, using
/// default [`ParserConfig`] values.
pub fn into_multipart(request: &HttpRequest, payload: web::Payload) -> Multipart<ActixBodyStream> {
    into_multipart_with_config(request, payload, ParserConfig::default())
}

/// Same as [`into_multipart`] with an explicit [`ParserConfig`].
pub fn into_multipart_with_config(
    request: &HttpRequest,
    payload: web::Payload,
    config: ParserConfig,
) -> Multipart<ActixBodyStream> {
    let content_type = content_type_from_request(request).map(str::to_owned);
    Multipart::with_config(content_type, body_stream(payload), config)
}

/// Actix extractor that parses the request payload into a [`Multipart`]
/// sequence, deferring boundary resolution to the first
/// [`Multipart::next_part`] call exactly as [`Multipart::new`] does.
pub struct MultipartExtractor(pub Multipart<ActixBodyStream>);

impl std::fmt::Debug for MultipartExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MultipartExtractor").field(&"<multipart>").finish()
    }
}

impl FromRequest for MultipartExtractor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, payload: &mut dev::Payload) -> Self::Future {
        let body = web::Payload(payload.take());
        ready(Ok(Self(into_multipart(request, body))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn extracts_multipart_from_an_actix_request() {
        let payload = b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nhi\r\n--B--\r\n";
        let (request, mut dev_payload) = TestRequest::default()
            .insert_header(("content-type", "multipart/form-data; boundary=B"))
            .set_payload(&payload[..])
            .to_http_parts();

        let MultipartExtractor(mut multipart) =
            MultipartExtractor::from_request(&request, &mut dev_payload).await.unwrap();
        let mut part = multipart.next_part().await.unwrap().expect("one part");
        assert_eq!(part.field_name(), Some("a"));
        assert_eq!(part.text().await.unwrap(), "hi");
    }
}
