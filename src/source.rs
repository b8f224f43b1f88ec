use std::borrow::Cow;

/// A thing that contains characters
pub trait IntoSource<'a> {
    fn into_source(self) -> Cow<'a, str>;
}

impl<'a> IntoSource<'a> for &'a str {
    fn into_source(self) -> Cow<'a, str> {
        Cow::Borrowed(self)
    }
}

impl<'a> IntoSource<'a> for &'a String {
    fn into_source(self) -> Cow<'a, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<'a> IntoSource<'a> for String {
    fn into_source(self) -> Cow<'a, str> {
        Cow::Owned(self)
    }
}

impl<'a> IntoSource<'a> for Box<str> {
    fn into_source(self) -> Cow<'a, str> {
        Cow::Owned(self.into_string())
    }
}

impl<'a> IntoSource<'a> for char {
    fn into_source(self) -> Cow<'a, str> {
        Cow::Owned(self.to_string())
    }
}

impl<'a> IntoSource<'a> for Cow<'a, str> {
    fn into_source(self) -> Cow<'a, str> {
        self
    }
}
