//! Adapts a raw async byte reader into the chunk stream shape the parser
//! consumes, for callers not going through one of the framework adapters —
//! e.g. a raw TCP/Unix socket, a file, or an in-memory `&[u8]` in tests.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::MultipartError;

/// Wraps an [`AsyncRead`] (a raw socket, a file, anything implementing the
/// trait) into the `Stream<Item = Result<Bytes, MultipartError>>` shape
/// [`crate::Multipart`] consumes.
pub fn reader_stream<R>(reader: R) -> impl Stream<Item = Result<Bytes, MultipartError>> + Unpin
where
    R: AsyncRead + Unpin,
{
    ReaderStream::new(reader).map(|chunk| chunk.map_err(MultipartError::transport))
}
