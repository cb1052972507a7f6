//! Offset / line-column conversion over a source text.

/// One-based line/column location. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// One-based line index.
    pub line: u32,
    /// One-based column index.
    pub column: u32,
}

impl SourceLocation {
    /// Creates a location from one-based line/column.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Precomputed line starts for a source text.
#[derive(Debug)]
pub struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<u32>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = Vec::with_capacity(128);
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((idx + 1) as u32);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    /// Location of a byte offset. Offsets past the end clamp to the end.
    pub fn location(&self, offset: u32) -> SourceLocation {
        let offset = offset.min(self.source.len() as u32);
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts[idx] as usize;
        let column = self.source[line_start..offset as usize].chars().count() as u32 + 1;
        SourceLocation::new(idx as u32 + 1, column)
    }

    /// Byte offset of a one-based line/column, or `None` when the line does
    /// not exist. Columns past the end of the line clamp to the line end.
    pub fn offset(&self, location: SourceLocation) -> Option<u32> {
        if location.line == 0 {
            return None;
        }
        let idx = (location.line - 1) as usize;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.source.len(), |next| *next as usize - 1);
        let line = &self.source[start..end];
        let wanted = location.column.saturating_sub(1) as usize;
        let within = line
            .char_indices()
            .nth(wanted)
            .map_or(line.len(), |(byte, _)| byte);
        Some((start + within) as u32)
    }

    /// Leading whitespace of the line containing `offset`, up to `offset`.
    pub fn indentation(&self, offset: u32) -> &'a str {
        let offset = offset.min(self.source.len() as u32) as usize;
        let start = self.source[..offset].rfind('\n').map_or(0, |idx| idx + 1);
        let line = &self.source[start..offset];
        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        &self.source[start..start + width]
    }
}
