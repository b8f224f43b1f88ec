use derive_more::Display;

/// A location in a text. Lines and columns start at 1, columns count
/// characters.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[display("[{line}:{column}]")]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// Byte offset from the start of the text.
    pub offset: usize,
}

impl Position {
    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };

    /// Finds the line and column of a byte offset. `offset` must be on a char
    /// boundary of `text`.
    pub fn locate(text: &str, offset: usize) -> Self {
        let before = &text[..offset];
        let line = before.chars().filter(|&c| c == '\n').count() + 1;
        let column = before.chars().rev().take_while(|&c| c != '\n').count() + 1;
        Self {
            line,
            column,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn start_of_text() {
        assert_eq!(Position::locate("abc", 0), Position::START);
    }

    #[test]
    fn columns_count_chars() {
        let pos = Position::locate("héllo", "hé".len());
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 3);
    }

    #[test]
    fn after_newlines() {
        let text = indoc! {"
            line 1
            line 2
        "};
        let pos = Position::locate(text, text.find('2').unwrap());
        assert_eq!(pos.to_string(), "[2:6]");
    }
}
