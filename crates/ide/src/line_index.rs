use ropey::Rope;

use syntax::TextSize;

/// Zero-based line and UTF-16 column, as editors count them.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Eq, PartialEq)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn line_col(&self, offset: TextSize) -> Option<LineCol> {
        let char_idx = self.rope.try_byte_to_char(offset.into()).ok()?;
        let line = self.rope.try_char_to_line(char_idx).ok()?;
        let line_start = self.rope.try_line_to_char(line).ok()?;
        let col = self.rope.try_char_to_utf16_cu(char_idx).ok()?
            - self.rope.try_char_to_utf16_cu(line_start).ok()?;
        Some(LineCol {
            line: u32::try_from(line).ok()?,
            col: u32::try_from(col).ok()?,
        })
    }

    /// Byte offset of `line_col`. Columns past the end of a line are clamped
    /// to the line terminator.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line = usize::try_from(line_col.line).ok()?;
        let line_start = self.rope.try_line_to_char(line).ok()?;
        let mut line_end = self
            .rope
            .try_line_to_char(line + 1)
            .unwrap_or_else(|_| self.rope.len_chars());
        while line_end > line_start && matches!(self.rope.get_char(line_end - 1), Some('\n' | '\r'))
        {
            line_end -= 1;
        }
        let start_cu = self.rope.try_char_to_utf16_cu(line_start).ok()?;
        let end_cu = self.rope.try_char_to_utf16_cu(line_end).ok()?;
        let target = (start_cu + usize::try_from(line_col.col).ok()?).min(end_cu);
        let char_idx = self.rope.try_utf16_cu_to_char(target).ok()?;
        let byte = self.rope.try_char_to_byte(char_idx).ok()?;
        TextSize::try_from(byte).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_round_trip() {
        let index = LineIndex::new("a {\n  --x: 1;\n}\n");
        let offset = TextSize::from(6);
        let line_col = index.line_col(offset).unwrap();
        assert_eq!(line_col, LineCol { line: 1, col: 2 });
        assert_eq!(index.offset(line_col), Some(offset));
    }

    #[test]
    fn utf16_columns() {
        // U+1F600 is four bytes and two UTF-16 code units.
        let index = LineIndex::new("/*\u{1F600}*/ --a: é;");
        let byte = TextSize::from(u32::try_from("/*\u{1F600}*/ ".len()).unwrap());
        assert_eq!(index.line_col(byte), Some(LineCol { line: 0, col: 7 }));
        assert_eq!(index.offset(LineCol { line: 0, col: 7 }), Some(byte));
    }

    #[test]
    fn out_of_range() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_col(TextSize::from(42)), None);
        assert_eq!(index.offset(LineCol { line: 7, col: 0 }), None);
        assert_eq!(
            index.offset(LineCol { line: 0, col: 99 }),
            Some(TextSize::from(2))
        );
    }
}
