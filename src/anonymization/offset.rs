//! Byte/character offset conversion
//!
//! Spans are byte offsets everywhere inside the pipeline because that is what
//! the regex engines and `str` slicing use. Two boundaries speak characters
//! instead: external models (which count code points) and the client-facing
//! span report. [`OffsetMap`] converts between the two for one text.

/// Precomputed offset table for a single text
///
/// For ASCII text the mapping is the identity and no table is built.
#[derive(Debug, Clone)]
pub struct OffsetMap {
    /// `char_starts[i]` is the byte offset of char `i`; the last entry is `len`
    char_starts: Vec<usize>,
    byte_len: usize,
    ascii: bool,
}

impl OffsetMap {
    /// Build the table for `text`
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                char_starts: Vec::new(),
                byte_len: text.len(),
                ascii: true,
            };
        }

        let mut char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        char_starts.push(text.len());

        Self {
            char_starts,
            byte_len: text.len(),
            ascii: false,
        }
    }

    /// Number of characters in the text
    pub fn char_len(&self) -> usize {
        if self.ascii {
            self.byte_len
        } else {
            self.char_starts.len() - 1
        }
    }

    /// Byte offset of character `char_idx`; `char_len()` maps to the text length
    ///
    /// Returns `None` for indices past the end of the text.
    pub fn char_to_byte(&self, char_idx: usize) -> Option<usize> {
        if self.ascii {
            return (char_idx <= self.byte_len).then_some(char_idx);
        }
        self.char_starts.get(char_idx).copied()
    }

    /// Character index of byte offset `byte_idx`
    ///
    /// Returns `None` when the offset is past the end or falls inside a
    /// multi-byte character.
    pub fn byte_to_char(&self, byte_idx: usize) -> Option<usize> {
        if self.ascii {
            return (byte_idx <= self.byte_len).then_some(byte_idx);
        }
        self.char_starts.binary_search(&byte_idx).ok()
    }

    /// Convert a half-open byte range to a character range
    pub fn bytes_to_chars(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        Some((self.byte_to_char(start)?, self.byte_to_char(end)?))
    }

    /// Convert a half-open character range to a byte range
    pub fn chars_to_bytes(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        Some((self.char_to_byte(start)?, self.char_to_byte(end)?))
    }
}
