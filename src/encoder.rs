use derive_more::Debug;
use encoding_rs::{Encoding, EncoderResult, UTF_16BE, UTF_16LE};

/// Room reserved in the output for a single step of the encoder, enough for
/// any escape sequence a stateful encoder emits when flushing.
const MIN_ROOM: usize = 16;

/// What to do with a character the target charset cannot represent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Unmappable {
    /// Write a single `?`.
    #[default]
    Replace,
    /// Write an HTML numeric character reference, e.g. `&#26085;`.
    NumericCharRef,
    /// Stop before the character and let the caller report it.
    Report,
}

/// Turns UTF-8 text into bytes of some charset.
///
/// `encoding_rs` only decodes UTF-16 (its encoders for UTF-16 produce UTF-8),
/// so both byte orders are done here.
#[derive(Debug)]
pub enum Encoder {
    Utf16Be,
    Utf16Le,
    #[debug("Other({})", _0.encoding().name())]
    Other(encoding_rs::Encoder),
}

/// The outcome of [`Encoder::encode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// How many bytes of the source were encoded.
    pub read: usize,
    /// Set when encoding stopped at a character under [`Unmappable::Report`].
    /// The character is not counted in `read`.
    pub unmappable: Option<char>,
}

impl Encoder {
    pub fn new(charset: &'static Encoding) -> Self {
        if charset == UTF_16BE {
            Encoder::Utf16Be
        } else if charset == UTF_16LE {
            Encoder::Utf16Le
        } else {
            Encoder::Other(charset.new_encoder())
        }
    }

    /// The charset bytes are actually produced in. Differs from the one given
    /// to [`Encoder::new`] only for `replacement`, which encodes as UTF-8.
    pub fn charset(&self) -> &'static Encoding {
        match self {
            Encoder::Utf16Be => UTF_16BE,
            Encoder::Utf16Le => UTF_16LE,
            Encoder::Other(encoder) => encoder.encoding(),
        }
    }

    /// Appends the encoding of `src` to `dst`. `last` must be set on the
    /// final call so stateful encoders return to their initial state.
    pub fn encode(
        &mut self,
        src: &str,
        dst: &mut Vec<u8>,
        last: bool,
        unmappable: Unmappable,
    ) -> Encoded {
        match self {
            Encoder::Utf16Be => {
                for unit in src.encode_utf16() {
                    dst.extend_from_slice(&unit.to_be_bytes());
                }
                Encoded::all(src)
            }
            Encoder::Utf16Le => {
                for unit in src.encode_utf16() {
                    dst.extend_from_slice(&unit.to_le_bytes());
                }
                Encoded::all(src)
            }
            Encoder::Other(encoder) => encode_with(encoder, src, dst, last, unmappable),
        }
    }
}

impl Encoded {
    fn all(src: &str) -> Self {
        Encoded {
            read: src.len(),
            unmappable: None,
        }
    }
}

fn encode_with(
    encoder: &mut encoding_rs::Encoder,
    src: &str,
    dst: &mut Vec<u8>,
    last: bool,
    unmappable: Unmappable,
) -> Encoded {
    let mut read = 0;
    loop {
        let rest = &src[read..];
        let room = encoder
            .max_buffer_length_from_utf8_without_replacement(rest.len())
            .unwrap_or(MIN_ROOM)
            .max(MIN_ROOM);
        let start = dst.len();
        dst.resize(start + room, 0);
        let (result, step_read, written) =
            encoder.encode_from_utf8_without_replacement(rest, &mut dst[start..], last);
        dst.truncate(start + written);
        read += step_read;

        match result {
            EncoderResult::InputEmpty => {
                return Encoded {
                    read,
                    unmappable: None,
                };
            }
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(c) => match unmappable {
                Unmappable::Replace => dst.push(b'?'),
                Unmappable::NumericCharRef => {
                    dst.extend_from_slice(format!("&#{};", u32::from(c)).as_bytes())
                }
                Unmappable::Report => {
                    return Encoded {
                        read: read - c.len_utf8(),
                        unmappable: Some(c),
                    };
                }
            },
        }
    }
}
