//! Low-level parsing building blocks: boundary resolution, header parsing,
//! the ring buffer scanner, and the state machine that ties them together.

/// Boundary extraction from `Content-Type` header values.
pub mod boundary;
/// Part header block parsing (`Content-Disposition`, `Content-Type`).
pub mod headers;
/// The cooperative parser state machine.
pub mod machine;
/// Growable ring buffer and Boyer-Moore-Horspool scanner.
pub mod ring_buffer;

pub use boundary::extract_boundary;
pub use headers::{ContentDisposition, ParsedPartHeaders, parse_content_disposition, parse_part_headers};
pub use machine::{ParserMachine, PartStarted};
pub use ring_buffer::{Needle, RingBuffer};
