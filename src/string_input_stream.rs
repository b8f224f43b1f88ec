use std::borrow::Cow;
use std::io::{self, BufRead, Read};

use derive_more::{Debug, From};
use encoding_rs::Encoding;
use thiserror::Error;

use crate::char_reader::CharReader;
use crate::charset::{self, default_charset};
use crate::encoder::Unmappable;
use crate::reader_input_stream::{self, DEFAULT_BUFFER_SIZE, ReaderInputStream};
use crate::source::IntoSource;

#[derive(Clone, Debug, From, Error, PartialEq, Eq)]
pub enum Error {
    #[error("no source string was given")]
    MissingSource,
    #[error("{0}")]
    Charset(charset::Error),
    #[error("{0}")]
    Stream(reader_input_stream::Error),
}

/// A byte stream over a string, encoded in some charset as it is read.
///
/// ```
/// use std::io::Read;
/// use string_stream::StringInputStream;
///
/// let mut stream = StringInputStream::builder()
///     .string("Hello 世界")
///     .charset(encoding_rs::SHIFT_JIS)
///     .build()?;
/// let mut bytes = Vec::new();
/// stream.read_to_end(&mut bytes)?;
/// assert_eq!(bytes, [72, 101, 108, 108, 111, 32, 144, 162, 138, 69]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct StringInputStream<'a> {
    inner: ReaderInputStream<'a>,
}

impl<'a> StringInputStream<'a> {
    /// Streams `source` encoded in `charset`, or in the process default
    /// charset when `charset` is `None`.
    pub fn new(source: impl IntoSource<'a>, charset: Option<&'static Encoding>) -> Self {
        let charset = charset.unwrap_or_else(default_charset);
        let chars = CharReader::new(source);
        match ReaderInputStream::new(chars, charset, DEFAULT_BUFFER_SIZE, Unmappable::default()) {
            Ok(inner) => Self { inner },
            Err(err) => unreachable!("the default buffer size is valid: {err}"),
        }
    }

    pub fn builder() -> Builder<'a> {
        Builder::default()
    }

    pub fn charset(&self) -> &'static Encoding {
        self.inner.charset()
    }

    /// The number of bytes that can be read without encoding more of the
    /// string.
    pub fn available(&self) -> usize {
        self.inner.available()
    }

    pub fn close(&mut self) {
        self.inner.close();
    }
}

impl<'a> From<&'a str> for StringInputStream<'a> {
    fn from(source: &'a str) -> Self {
        StringInputStream::new(source, None)
    }
}

impl Read for StringInputStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for StringInputStream<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

#[derive(Clone, Debug)]
enum CharsetChoice {
    Default,
    Given(&'static Encoding),
    Label(String),
}

/// Configures a [`StringInputStream`]. Only the string is required.
#[derive(Clone, Debug)]
pub struct Builder<'a> {
    source: Option<Cow<'a, str>>,
    charset: CharsetChoice,
    buffer_size: usize,
    unmappable: Unmappable,
}

impl Default for Builder<'_> {
    fn default() -> Self {
        Self {
            source: None,
            charset: CharsetChoice::Default,
            buffer_size: DEFAULT_BUFFER_SIZE,
            unmappable: Unmappable::default(),
        }
    }
}

impl<'a> Builder<'a> {
    pub fn string(mut self, source: impl IntoSource<'a>) -> Self {
        self.source = Some(source.into_source());
        self
    }

    pub fn charset(mut self, charset: &'static Encoding) -> Self {
        self.charset = CharsetChoice::Given(charset);
        self
    }

    /// Picks the charset by label. An unknown label fails [`Builder::build`].
    pub fn charset_label(mut self, label: impl Into<String>) -> Self {
        self.charset = CharsetChoice::Label(label.into());
        self
    }

    /// How many bytes of the string are encoded at a time.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn unmappable(mut self, unmappable: Unmappable) -> Self {
        self.unmappable = unmappable;
        self
    }

    pub fn build(self) -> Result<StringInputStream<'a>, Error> {
        let source = self.source.ok_or(Error::MissingSource)?;
        let charset = match self.charset {
            CharsetChoice::Default => default_charset(),
            CharsetChoice::Given(charset) => charset,
            CharsetChoice::Label(label) => charset::for_label(&label)?,
        };
        let inner = ReaderInputStream::new(
            CharReader::new(source),
            charset,
            self.buffer_size,
            self.unmappable,
        )?;
        Ok(StringInputStream { inner })
    }
}
