#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![forbid(unsafe_code)]
#![warn(unused_qualifications)]

//! A streaming parser for HTTP `multipart/form-data` bodies (RFC 7578 / RFC
//! 2046).
//!
//! Given a request's `Content-Type` header and an asynchronous byte-chunk
//! body, [`Multipart`] yields each [`Part`] — its headers, then its content
//! — as soon as that part's bytes have arrived, without ever buffering the
//! whole body into memory. The algorithmic core is a growable ring buffer
//! scanned with a Boyer-Moore-Horspool substring search
//! ([`parser::ring_buffer`]); everything else is a state machine driven by
//! it ([`parser::machine`]).
//!
//! ```
//! use bytes::Bytes;
//! use futures::stream;
//! use multipart_stream::Multipart;
//!
//! # async fn run() -> Result<(), multipart_stream::MultipartError> {
//! let body = b"--X-BOUNDARY\r\n\
//!     Content-Disposition: form-data; name=\"field1\"\r\n\r\n\
//!     value1\r\n--X-BOUNDARY--\r\n";
//! let chunks = stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(body))]);
//!
//! let mut multipart = Multipart::new(Some("multipart/form-data; boundary=X-BOUNDARY"), chunks);
//! while let Some(mut part) = multipart.next_part().await? {
//!     println!("{:?} = {}", part.field_name(), part.text().await?);
//! }
//! # Ok(())
//! # }
//! ```

/// Cooperative cancellation for an in-progress parse.
pub mod cancel;
/// Parser configuration (buffer sizing, header/file size limits).
pub mod config;
/// The single error type returned by every fallible operation in this crate.
pub mod error;
/// Raw socket/reader adapter built on [`tokio::io::AsyncRead`].
#[cfg(feature = "tokio-io")]
pub mod io;
/// High-level streaming multipart sequence.
pub mod multipart;
/// The part type yielded for each form-data segment.
pub mod part;
/// Low-level parsing building blocks: boundary resolution, header parsing,
/// the ring buffer scanner, and the state machine that ties them together.
pub mod parser;
/// A thin request adapter trait standing in for the platform HTTP layer
/// this crate does not model.
pub mod request;

/// Actix Web integration: a `FromRequest` extractor and helpers.
#[cfg(feature = "actix")]
pub mod actix;
/// Axum integration: a `FromRequest` extractor and helpers.
#[cfg(feature = "axum")]
pub mod axum;
/// Hyper integration: request/body adapter helpers.
#[cfg(feature = "hyper")]
pub mod hyper;

pub use cancel::AbortSignal;
pub use config::ParserConfig;
pub use error::MultipartError;
pub use multipart::Multipart;
pub use part::{Part, PartBodyStream};
