//! Looking up charsets, and choosing one when the caller does not.

use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown charset '{0}'")]
    UnknownLabel(String),
}

/// Finds a charset by one of its WHATWG labels, e.g. `"utf-8"`, `"latin1"` or
/// `"shift_jis"`. Case and surrounding whitespace are ignored.
///
/// Labels follow the WHATWG Encoding Standard rather than Java or IANA
/// naming: `"utf-16"` means UTF-16LE, and no byte order mark is written for
/// it. `"latin1"` and `"us-ascii"` both mean windows-1252.
pub fn for_label(label: &str) -> Result<&'static Encoding, Error> {
    Encoding::for_label_no_replacement(label.as_bytes())
        .ok_or_else(|| Error::UnknownLabel(label.to_owned()))
}

/// The charset of the process, taken from the first of `LC_ALL`, `LC_CTYPE`
/// and `LANG` that is set and non-empty. Falls back to UTF-8.
pub fn default_charset() -> &'static Encoding {
    static DEFAULT: OnceLock<&'static Encoding> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.is_empty());
        let charset = locale
            .as_deref()
            .and_then(charset_from_locale)
            .unwrap_or(UTF_8);
        tracing::debug!(?locale, charset = charset.name(), "default charset");
        charset
    })
}

/// Reads the codeset out of a POSIX locale name of the form
/// `language_TERRITORY.codeset@modifier`.
pub fn charset_from_locale(locale: &str) -> Option<&'static Encoding> {
    let (_, rest) = locale.split_once('.')?;
    let codeset = rest.split('@').next().unwrap_or(rest);
    Encoding::for_label_no_replacement(codeset.as_bytes())
}
