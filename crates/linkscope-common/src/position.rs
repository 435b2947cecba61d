//! Position and location utilities.
//!
//! Two coordinate systems meet here. The Links parser reports positions in
//! its own units (`NativePosition`), shifted by the synthetic wrapper it puts
//! around every document. Editors use 0-indexed lines and UTF-16 columns
//! (`Position`). The conversion between them lives in
//! `linkscope_syntax::reconcile`; keeping the two as distinct types means a
//! range can only be reconciled once.

use std::cmp::Ordering;
use std::fmt;

/// A position in a source file (0-indexed line and column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (UTF-16 code units for LSP compatibility)
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.character).cmp(&(other.line, other.character))
    }
}

/// A range in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Range { start, end }
    }

    /// A single-line range starting at `start` and spanning `length` columns.
    pub fn on_line(line: u32, character: u32, length: u32) -> Self {
        Range {
            start: Position::new(line, character),
            end: Position::new(line, character.saturating_add(length)),
        }
    }

    /// Whether `position` falls inside this range (end inclusive, so a cursor
    /// placed right after an identifier still hits it).
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

/// A location in a source file (document uri + range).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

impl Location {
    pub fn new(uri: String, range: Range) -> Self {
        Location { uri, range }
    }
}

/// A position as reported by the upstream parser.
///
/// Ordered lexicographically by (line, column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NativePosition {
    pub line: u32,
    pub column: u32,
}

impl NativePosition {
    pub const fn new(line: u32, column: u32) -> Self {
        NativePosition { line, column }
    }

    /// Same line, `delta` columns further right.
    pub fn advance(self, delta: u32) -> Self {
        NativePosition {
            line: self.line,
            column: self.column.saturating_add(delta),
        }
    }
}

impl PartialOrd for NativePosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NativePosition {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

impl fmt::Display for NativePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parser-native span: inclusive start, exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NativeSpan {
    pub start: NativePosition,
    pub end: NativePosition,
}

impl NativeSpan {
    pub const fn new(start: NativePosition, end: NativePosition) -> Self {
        NativeSpan { start, end }
    }

    pub fn contains_position(&self, position: NativePosition) -> bool {
        self.start <= position && position < self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains_span(&self, other: &NativeSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether this span ends at or before `other` begins.
    ///
    /// Ends are exclusive, so touching spans count as preceding.
    pub fn precedes(&self, other: &NativeSpan) -> bool {
        self.end <= other.start
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for NativeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Line map for offset <-> position conversion and line access.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text.
    pub fn build(source: &str) -> Self {
        let mut line_starts = vec![0u32];

        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            } else if ch == '\r' {
                // \r followed by \n: the \n creates the line start
                let next_idx = i + 1;
                if source.as_bytes().get(next_idx) != Some(&b'\n') {
                    line_starts.push(next_idx as u32);
                }
            }
        }

        LineMap { line_starts }
    }

    /// Convert a byte offset to a Position (line, character).
    /// Character is counted in UTF-16 code units for LSP compatibility.
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        };

        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let clamped_end = (offset as usize).min(source.len());
        let start = (line_start as usize).min(clamped_end);
        let slice = source.get(start..clamped_end).unwrap_or("");
        let character = slice.chars().map(|ch| ch.len_utf16() as u32).sum();

        Position {
            line: line as u32,
            character,
        }
    }

    /// Convert a Position (line, character) to a byte offset.
    pub fn position_to_offset(&self, position: Position, source: &str) -> Option<u32> {
        let line_start = *self.line_starts.get(position.line as usize)?;
        let text = self.line_text(position.line as usize, source)?;
        let byte = utf16_to_byte_index(text, position.character)?;
        Some(line_start + byte as u32)
    }

    /// The text of a line, without its terminator.
    pub fn line_text<'s>(&self, line: usize, source: &'s str) -> Option<&'s str> {
        let start = *self.line_starts.get(line)? as usize;
        let limit = match self.line_starts.get(line + 1) {
            Some(&next) => next as usize,
            None => source.len(),
        };
        let text = source.get(start..limit)?;
        Some(text.trim_end_matches(['\n', '\r']))
    }

    /// Get the number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the starting offset of a line.
    pub fn line_start(&self, line: usize) -> Option<u32> {
        self.line_starts.get(line).copied()
    }
}

/// UTF-16 column of the byte index `byte` within `line_text`.
pub fn byte_to_utf16_column(line_text: &str, byte: usize) -> u32 {
    let end = byte.min(line_text.len());
    line_text
        .get(..end)
        .unwrap_or("")
        .chars()
        .map(|ch| ch.len_utf16() as u32)
        .sum()
}

/// Byte index of the UTF-16 column `column` within `line_text`.
///
/// Returns `None` when the column lies past the end of the line or inside a
/// surrogate pair.
pub fn utf16_to_byte_index(line_text: &str, column: u32) -> Option<usize> {
    let mut utf16_count = 0u32;
    for (byte, ch) in line_text.char_indices() {
        if utf16_count == column {
            return Some(byte);
        }
        if utf16_count > column {
            return None;
        }
        utf16_count += ch.len_utf16() as u32;
    }
    (utf16_count == column).then_some(line_text.len())
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> u32 {
    text.chars().map(|ch| ch.len_utf16() as u32).sum()
}
