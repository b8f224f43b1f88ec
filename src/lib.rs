//! Reads a string as a stream of bytes in some charset, encoding the
//! characters as they are read.

pub mod position;
pub mod source;
pub mod char_reader;
/// Charset lookup and the process default charset.
pub mod charset;
pub mod encoder;
pub mod reader_input_stream;
pub mod string_input_stream;

pub use encoding_rs::Encoding;
pub use string_input_stream::{Builder, StringInputStream};


// Re-export
pub mod prelude {
    use super::*;
    pub use charset::{default_charset, for_label};
    pub use encoder::Unmappable;
    pub use source::IntoSource;
    pub use string_input_stream::{Builder, Error, StringInputStream};
}
