use crate::position::Position;
use crate::source::IntoSource;
use derive_more::Debug;
use std::borrow::Cow;

/// Reads characters out of an in-memory text, one at a time or in chunks that
/// never split a character.
#[derive(Debug)]
#[debug("CharReader {{ offset: {offset:?}, len: {:?}, ... }}", text.len())]
pub struct CharReader<'a> {
    text: Cow<'a, str>,
    /// The byte offset of the next character to read.
    offset: usize,
}

impl<'a, S: IntoSource<'a>> From<S> for CharReader<'a> {
    fn from(value: S) -> Self {
        CharReader::new(value)
    }
}

impl<'a> CharReader<'a> {
    pub fn new(text: impl IntoSource<'a>) -> Self {
        CharReader {
            text: text.into_source(),
            offset: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The position of the next character to read.
    pub fn pos(&self) -> Position {
        Position::locate(&self.text, self.offset)
    }

    /// The part of the text that has not been read yet.
    pub fn remaining(&self) -> &str {
        &self.text[self.offset..]
    }

    pub fn is_done(&self) -> bool {
        self.offset >= self.text.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn pop(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    /// The longest prefix of the remaining text that fits in `max_len` bytes
    /// and ends on a char boundary. Contains at least one character unless
    /// the reader is done, even when that character is longer than `max_len`.
    pub fn chunk(&self, max_len: usize) -> &str {
        let rest = self.remaining();
        if rest.len() <= max_len {
            return rest;
        }
        let mut end = max_len;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(0, char::len_utf8);
        }
        &rest[..end]
    }

    /// Skips `len` bytes. The new offset must fall on a char boundary.
    pub fn advance(&mut self, len: usize) {
        let offset = self.offset + len;
        assert!(
            self.text.is_char_boundary(offset),
            "advancing to offset {offset} splits a character"
        );
        self.offset = offset;
    }
}
