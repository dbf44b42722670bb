//! The parser state machine: drives a chunk source through boundary
//! resolution, preamble skipping, header parsing, and body scanning.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use crate::cancel::AbortSignal;
use crate::config::ParserConfig;
use crate::error::MultipartError;
use crate::parser::boundary::extract_boundary;
use crate::parser::headers::{ParsedPartHeaders, parse_part_headers};
use crate::parser::ring_buffer::{Needle, RingBuffer};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

#[derive(Debug)]
enum State {
    /// Boundary resolution is deferred to the first poll so a missing or
    /// invalid `Content-Type` surfaces as a parse error, not a construction
    /// error.
    Unresolved { content_type: Option<String> },
    Preamble,
    PartHeaders,
    PartBody,
    Epilogue,
    Done,
    Failed(MultipartError),
}

/// Event produced when the machine reaches the start of a new part.
#[derive(Debug)]
pub struct PartStarted {
    /// Parsed header metadata for the part that just began.
    pub headers: ParsedPartHeaders,
}

#[derive(Debug)]
struct Delimiters {
    start: Needle,
    mid: Needle,
    header_terminator: Needle,
}

/// Drives a byte-chunk stream through the multipart grammar.
///
/// Owns the ring buffer and all parsing state; callers poll for the next
/// part's headers, then poll for that part's body chunks, in strict
/// alternation — mirroring the single-pass, two-suspension-point model the
/// surrounding crate exposes via [`crate::Part`].
#[derive(Debug)]
pub struct ParserMachine<S> {
    source: S,
    state: State,
    config: ParserConfig,
    delimiters: Option<Delimiters>,
    source_exhausted: bool,
    current_part_size: u64,
    abort: Option<AbortSignal>,
    buffer: RingBuffer,
}

impl<S> ParserMachine<S> {
    /// Creates a new machine. Boundary resolution from `content_type` is
    /// deferred until the first poll.
    pub fn new(content_type: Option<String>, source: S, config: ParserConfig) -> Self {
        Self {
            source,
            state: State::Unresolved { content_type },
            buffer: RingBuffer::with_capacity(config.initial_buffer_size),
            config,
            delimiters: None,
            source_exhausted: false,
            current_part_size: 0,
            abort: None,
        }
    }

    /// Attaches a cancellation signal the machine will check at every
    /// suspension point.
    pub fn with_abort_signal(mut self, signal: AbortSignal) -> Self {
        self.abort = Some(signal);
        self
    }
}

impl<S, E> ParserMachine<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    /// Polls until the next part's headers are available, or the body has
    /// been fully consumed (`Ok(None)`).
    pub fn poll_next_part(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<PartStarted>, MultipartError>> {
        loop {
            if let Some(err) = self.check_cancelled() {
                return Poll::Ready(Err(err));
            }

            match &self.state {
                State::Unresolved { content_type } => {
                    let content_type = content_type
                        .clone()
                        .ok_or(MultipartError::MissingOrInvalidContentType)?;
                    match self.resolve_boundary(&content_type) {
                        Ok(()) => {
                            self.state = State::Preamble;
                        }
                        Err(err) => return self.fail(err),
                    }
                }
                State::Preamble => match self.advance_preamble(cx) {
                    Poll::Ready(Ok(())) => self.state = State::PartHeaders,
                    Poll::Ready(Err(Outcome::Terminal)) => self.state = State::Epilogue,
                    Poll::Ready(Err(Outcome::Failed(err))) => return self.fail(err),
                    Poll::Pending => return Poll::Pending,
                },
                State::PartHeaders => match self.advance_headers(cx) {
                    Poll::Ready(Ok(headers)) => {
                        self.current_part_size = 0;
                        self.state = State::PartBody;
                        return Poll::Ready(Ok(Some(PartStarted { headers })));
                    }
                    Poll::Ready(Err(err)) => return self.fail(err),
                    Poll::Pending => return Poll::Pending,
                },
                State::PartBody => {
                    return Poll::Ready(Err(MultipartError::PartAbandoned));
                }
                State::Epilogue => match self.drain_epilogue(cx) {
                    Poll::Ready(()) => {
                        self.state = State::Done;
                        return Poll::Ready(Ok(None));
                    }
                    Poll::Pending => return Poll::Pending,
                },
                State::Done => return Poll::Ready(Ok(None)),
                State::Failed(err) => return Poll::Ready(Err(err.clone())),
            }
        }
    }

    /// Polls the next body chunk of the part currently being read, or
    /// `Ok(None)` once its boundary has been reached.
    pub fn poll_next_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Bytes>, MultipartError>> {
        loop {
            if let Some(err) = self.check_cancelled() {
                return Poll::Ready(Err(err));
            }

            if !matches!(self.state, State::PartBody) {
                if let State::Failed(err) = &self.state {
                    return Poll::Ready(Err(err.clone()));
                }
                return Poll::Ready(Ok(None));
            }

            let mid_len = self.delimiters.as_ref().expect("resolved").mid.len();

            if let Some(split) = self.find_mid_delimiter() {
                match self.emit_through(split, mid_len, cx) {
                    Poll::Ready(Ok(Some(chunk))) => return Poll::Ready(Ok(Some(chunk))),
                    Poll::Ready(Ok(None)) => continue,
                    Poll::Ready(Err(err)) => return self.fail(err),
                    Poll::Pending => return Poll::Pending,
                }
            }

            let safe = self.buffer.safe_prefix_len(mid_len);
            if safe > 0 {
                if let Err(err) = self.charge_body_bytes(safe as u64) {
                    return self.fail(err);
                }
                let chunk = self.buffer.take(safe);
                return Poll::Ready(Ok(Some(chunk)));
            }

            if self.source_exhausted {
                return self.fail(MultipartError::UnexpectedEnd);
            }

            match self.poll_fill(cx) {
                Poll::Ready(Ok(())) => continue,
                Poll::Ready(Err(err)) => return self.fail(err),
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    fn emit_through(
        &mut self,
        split: usize,
        mid_len: usize,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, MultipartError>> {
        let suffix_start = split + mid_len;
        if self.buffer.len() < suffix_start + 2 {
            if self.source_exhausted {
                return Poll::Ready(Err(MultipartError::UnexpectedEnd));
            }
            return match self.poll_fill(cx) {
                Poll::Ready(Ok(())) => Poll::Ready(Ok(None)),
                Poll::Ready(Err(err)) => Poll::Ready(Err(err)),
                Poll::Pending => Poll::Pending,
            };
        }

        let follower = [self.buffer.at(suffix_start), self.buffer.at(suffix_start + 1)];

        if split > 0 {
            if let Err(err) = self.charge_body_bytes(split as u64) {
                return Poll::Ready(Err(err));
            }
        }
        let chunk = if split > 0 {
            Some(self.buffer.take(split))
        } else {
            None
        };

        let (consumed_after_split, next_state) = if follower == *b"--" {
            (mid_len + 2, State::Epilogue)
        } else if follower == *b"\r\n" {
            (mid_len + 2, State::PartHeaders)
        } else {
            return Poll::Ready(Err(MultipartError::InvalidBoundaryFollower));
        };

        self.buffer.advance(consumed_after_split);
        self.state = next_state;

        match chunk {
            Some(chunk) => Poll::Ready(Ok(Some(chunk))),
            None => Poll::Ready(Ok(None)),
        }
    }

    fn advance_headers(&mut self, cx: &mut Context<'_>) -> Poll<Result<ParsedPartHeaders, MultipartError>> {
        loop {
            let terminator_len = self.delimiters.as_ref().expect("resolved").header_terminator.len();
            let needle = &self.delimiters.as_ref().expect("resolved").header_terminator;

            if let Some(split) = self.buffer.find(needle, 0) {
                if split > self.config.max_header_size {
                    return Poll::Ready(Err(MultipartError::MaxHeaderSizeExceeded));
                }
                let raw = self.buffer.take(split);
                self.buffer.advance(terminator_len);
                return Poll::Ready(parse_part_headers(&raw));
            }

            if self.buffer.len() > self.config.max_header_size {
                return Poll::Ready(Err(MultipartError::MaxHeaderSizeExceeded));
            }

            if self.source_exhausted {
                return Poll::Ready(Err(MultipartError::UnexpectedEnd));
            }

            match self.poll_fill(cx) {
                Poll::Ready(Ok(())) => continue,
                Poll::Ready(Err(err)) => return Poll::Ready(Err(err)),
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    fn advance_preamble(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Outcome>> {
        loop {
            let start = self.delimiters.as_ref().expect("resolved").start.clone();
            let start_len = start.len();

            if let Some(pos) = self.buffer.find(&start, 0) {
                let suffix_start = pos + start_len;
                if self.buffer.len() < suffix_start + 2 {
                    if self.source_exhausted {
                        return Poll::Ready(Err(Outcome::Failed(MultipartError::UnexpectedEnd)));
                    }
                    match self.poll_fill(cx) {
                        Poll::Ready(Ok(())) => continue,
                        Poll::Ready(Err(err)) => return Poll::Ready(Err(Outcome::Failed(err))),
                        Poll::Pending => return Poll::Pending,
                    }
                }

                let follower = [self.buffer.at(suffix_start), self.buffer.at(suffix_start + 1)];
                self.buffer.advance(suffix_start);

                if follower == *b"--" {
                    self.buffer.advance(2);
                    return Poll::Ready(Err(Outcome::Terminal));
                }
                if follower == *b"\r\n" {
                    self.buffer.advance(2);
                    return Poll::Ready(Ok(()));
                }
                return Poll::Ready(Err(Outcome::Failed(MultipartError::InvalidBoundaryFollower)));
            }

            // No match yet: keep only the tail that could still complete a
            // match once more bytes arrive, discarding the rest as preamble.
            let safe = self.buffer.safe_prefix_len(start_len);
            if safe > 0 {
                self.buffer.advance(safe);
            }

            if self.source_exhausted {
                return Poll::Ready(Err(Outcome::Failed(MultipartError::UnexpectedEnd)));
            }

            match self.poll_fill(cx) {
                Poll::Ready(Ok(())) => continue,
                Poll::Ready(Err(err)) => return Poll::Ready(Err(Outcome::Failed(err))),
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    fn drain_epilogue(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.buffer.len() > 0 {
                let len = self.buffer.len();
                self.buffer.advance(len);
            }
            if self.source_exhausted {
                return Poll::Ready(());
            }
            match self.poll_fill(cx) {
                Poll::Ready(Ok(())) => continue,
                Poll::Ready(Err(_)) => return Poll::Ready(()),
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    fn resolve_boundary(&mut self, content_type: &str) -> Result<(), MultipartError> {
        let boundary = extract_boundary(content_type)?;
        self.delimiters = Some(Delimiters {
            start: Needle::new(format!("--{boundary}").into_bytes()),
            mid: Needle::new(format!("\r\n--{boundary}").into_bytes()),
            header_terminator: Needle::new(HEADER_TERMINATOR.to_vec()),
        });
        Ok(())
    }

    fn find_mid_delimiter(&self) -> Option<usize> {
        let mid = &self.delimiters.as_ref().expect("resolved").mid;
        self.buffer.find(mid, 0)
    }

    fn charge_body_bytes(&mut self, additional: u64) -> Result<(), MultipartError> {
        let next = self.current_part_size.saturating_add(additional);
        if next > self.config.max_file_size {
            return Err(MultipartError::MaxFileSizeExceeded);
        }
        self.current_part_size = next;
        Ok(())
    }

    fn poll_fill(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), MultipartError>> {
        match Pin::new(&mut self.source).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                if !chunk.is_empty() {
                    self.buffer.write(&chunk);
                }
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Some(Err(err))) => Poll::Ready(Err(MultipartError::transport(err))),
            Poll::Ready(None) => {
                self.source_exhausted = true;
                Poll::Ready(Ok(()))
            }
        }
    }

    fn check_cancelled(&mut self) -> Option<MultipartError> {
        if self.abort.as_ref().is_some_and(AbortSignal::is_cancelled) {
            let err = MultipartError::Cancelled;
            self.state = State::Failed(err.clone());
            return Some(err);
        }
        None
    }

    fn fail<T>(&mut self, err: MultipartError) -> Poll<Result<T, MultipartError>> {
        self.state = State::Failed(err.clone());
        Poll::Ready(Err(err))
    }
}

enum Outcome {
    Terminal,
    Failed(MultipartError),
}
