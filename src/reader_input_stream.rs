//! A byte stream that encodes the characters of a [`CharReader`] as they are
//! read.

use std::io::{self, BufRead, Read};

use derive_more::Debug;
use encoding_rs::Encoding;
use thiserror::Error;

use crate::char_reader::CharReader;
use crate::encoder::{Encoder, Unmappable};
use crate::position::Position;

/// How many bytes of text are encoded at a time, unless configured otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("buffer size must be at least 1, got {0}")]
    InvalidBufferSize(usize),
    #[error("{position} character {character:?} cannot be encoded in {charset}")]
    Unmappable {
        character: char,
        position: Position,
        charset: &'static str,
    },
    #[error("the stream is closed")]
    Closed,
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::InvalidBufferSize(_) => io::ErrorKind::InvalidInput,
            Error::Unmappable { .. } => io::ErrorKind::InvalidData,
            Error::Closed => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[derive(Debug)]
pub struct ReaderInputStream<'a> {
    chars: CharReader<'a>,
    encoder: Encoder,
    unmappable: Unmappable,
    /// The most bytes of text handed to the encoder at once.
    buffer_size: usize,
    /// Encoded bytes that have not been read yet start at `pos`.
    #[debug(skip)]
    buf: Vec<u8>,
    pos: usize,
    /// Whether all of the text was encoded and the encoder flushed.
    exhausted: bool,
    closed: bool,
}

impl<'a> ReaderInputStream<'a> {
    pub fn new(
        chars: CharReader<'a>,
        charset: &'static Encoding,
        buffer_size: usize,
        unmappable: Unmappable,
    ) -> Result<Self, Error> {
        if buffer_size == 0 {
            return Err(Error::InvalidBufferSize(buffer_size));
        }
        let encoder = Encoder::new(charset);
        let capacity = buffer_size.min(chars.remaining().len());
        tracing::debug!(
            charset = encoder.charset().name(),
            text_len = chars.text().len(),
            buffer_size,
            ?unmappable,
            "opened reader input stream"
        );
        Ok(Self {
            chars,
            encoder,
            unmappable,
            buffer_size,
            buf: Vec::with_capacity(capacity),
            pos: 0,
            exhausted: false,
            closed: false,
        })
    }

    /// The charset the bytes are encoded in.
    pub fn charset(&self) -> &'static Encoding {
        self.encoder.charset()
    }

    /// The number of bytes that can be read without encoding more text.
    pub fn available(&self) -> usize {
        if self.closed { 0 } else { self.buf.len() - self.pos }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closes the stream, dropping buffered bytes. Closing twice is fine.
    pub fn close(&mut self) {
        if !self.closed {
            tracing::debug!(offset = self.chars.offset(), "closed reader input stream");
            self.closed = true;
            self.buf = Vec::new();
            self.pos = 0;
        }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Encodes the next chunk of text into the empty buffer. Leaves the buffer
    /// empty only at the end of the stream.
    fn refill(&mut self) -> Result<(), Error> {
        self.buf.clear();
        self.pos = 0;
        while self.buf.is_empty() && !self.exhausted {
            let chunk = self.chars.chunk(self.buffer_size);
            let last = chunk.len() == self.chars.remaining().len();
            let encoded = self
                .encoder
                .encode(chunk, &mut self.buf, last, self.unmappable);
            let chunk_len = chunk.len();
            self.chars.advance(encoded.read);

            if let Some(character) = encoded.unmappable {
                if self.buf.is_empty() {
                    return Err(Error::Unmappable {
                        character,
                        position: self.chars.pos(),
                        charset: self.encoder.charset().name(),
                    });
                }
                // Hand out what was encoded before the character first.
                break;
            }

            tracing::trace!(
                read = encoded.read,
                written = self.buf.len(),
                "encoded chunk"
            );
            if last && encoded.read == chunk_len {
                tracing::debug!(offset = self.chars.offset(), "reached end of text");
                self.exhausted = true;
            }
        }
        Ok(())
    }
}

impl Read for ReaderInputStream<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let available = self.fill_buf()?;
        let len = available.len().min(out.len());
        out[..len].copy_from_slice(&available[..len]);
        self.consume(len);
        Ok(len)
    }
}

impl BufRead for ReaderInputStream<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.check_open()?;
        if self.pos >= self.buf.len() {
            self.refill()?;
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{ISO_2022_JP, UTF_8, UTF_16BE, WINDOWS_1252};

    fn stream<'a>(
        text: &'a str,
        charset: &'static Encoding,
        buffer_size: usize,
        unmappable: Unmappable,
    ) -> ReaderInputStream<'a> {
        ReaderInputStream::new(CharReader::new(text), charset, buffer_size, unmappable).unwrap()
    }

    #[test]
    fn zero_buffer_size() {
        let err = ReaderInputStream::new(CharReader::new("x"), UTF_8, 0, Unmappable::Replace)
            .unwrap_err();
        assert_eq!(err, Error::InvalidBufferSize(0));
    }

    #[test]
    fn huge_buffer_size() {
        let mut s = stream("hi", UTF_16BE, usize::MAX, Unmappable::Replace);
        let mut out = Vec::new();
        s.read_to_end(&mut out).unwrap();
        assert_eq!(out, [0, b'h', 0, b'i']);
    }

    #[test]
    fn reads_in_small_pieces() {
        let mut s = stream("héllo wörld", UTF_8, 3, Unmappable::Replace);
        let mut out = Vec::new();
        let mut piece = [0; 2];
        loop {
            let n = s.read(&mut piece).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&piece[..n]);
        }
        assert_eq!(out, "héllo wörld".as_bytes());
    }

    #[test]
    fn end_of_stream_repeats() {
        let mut s = stream("ab", UTF_8, DEFAULT_BUFFER_SIZE, Unmappable::Replace);
        let mut out = Vec::new();
        s.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"ab");
        assert_eq!(s.read(&mut [0; 4]).unwrap(), 0);
        assert_eq!(s.read(&mut [0; 4]).unwrap(), 0);
    }

    #[test]
    fn empty_text() {
        let mut s = stream("", UTF_16BE, DEFAULT_BUFFER_SIZE, Unmappable::Replace);
        assert_eq!(s.read(&mut [0; 4]).unwrap(), 0);
    }

    #[test]
    fn empty_read_buffer() {
        let mut s = stream("abc", UTF_8, DEFAULT_BUFFER_SIZE, Unmappable::Replace);
        assert_eq!(s.read(&mut []).unwrap(), 0);
        assert_eq!(s.available(), 0);
    }

    #[test]
    fn available_counts_buffered_bytes() {
        let mut s = stream("abcdef", UTF_16BE, 4, Unmappable::Replace);
        assert_eq!(s.available(), 0);
        let mut one = [0; 1];
        s.read_exact(&mut one).unwrap();
        assert_eq!(s.available(), 7);
    }

    #[test]
    fn close() {
        let mut s = stream("abc", UTF_8, DEFAULT_BUFFER_SIZE, Unmappable::Replace);
        s.read_exact(&mut [0; 1]).unwrap();
        s.close();
        s.close();
        assert!(s.is_closed());
        assert_eq!(s.available(), 0);
        let err = s.read(&mut [0; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(err.to_string(), "the stream is closed");
    }

    #[test]
    fn stateful_encoder_flushed_across_chunks() {
        let mut s = stream("世界a", ISO_2022_JP, 3, Unmappable::Replace);
        let mut out = Vec::new();
        s.read_to_end(&mut out).unwrap();
        let (text, had_errors) = ISO_2022_JP.decode_without_bom_handling(&out);
        assert!(!had_errors);
        assert_eq!(text, "世界a");
        assert!(out.ends_with(b"a"));
    }

    #[test]
    fn unmappable_after_good_bytes() {
        let mut s = stream("ab\nc日d", WINDOWS_1252, DEFAULT_BUFFER_SIZE, Unmappable::Report);
        let mut out = [0; 16];
        let n = s.read(&mut out).unwrap();
        assert_eq!(&out[..n], b"ab\nc");

        let err = s.read(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(
            err.to_string(),
            "[2:2] character '日' cannot be encoded in windows-1252"
        );
        // The error does not go away.
        assert!(s.read(&mut out).is_err());
    }

    #[test]
    fn fill_buf_and_consume() {
        let mut s = stream("abc", UTF_8, DEFAULT_BUFFER_SIZE, Unmappable::Replace);
        assert_eq!(s.fill_buf().unwrap(), b"abc");
        s.consume(2);
        assert_eq!(s.fill_buf().unwrap(), b"c");
        s.consume(10);
        assert_eq!(s.fill_buf().unwrap(), b"");
    }
}
