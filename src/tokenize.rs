//! Line tokenizer
//!
//! A word is a maximal run of ASCII letters or digits at least two
//! characters long. Everything else, including single-character runs,
//! is a delimiter. Case is left untouched; folding happens in the tracker.

/// Minimum length of a run that counts as a word
pub const MIN_WORD_LEN: usize = 2;

/// Lazy iterator over the words of one line
///
/// Borrows the line, so tokenizing the same input again always yields
/// the same sequence.
#[derive(Debug, Clone)]
pub struct Words<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Words<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.line.as_bytes();

        while self.pos < bytes.len() {
            // Skip delimiters
            while self.pos < bytes.len() && !bytes[self.pos].is_ascii_alphanumeric() {
                self.pos += 1;
            }

            let start = self.pos;
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_alphanumeric() {
                self.pos += 1;
            }

            // ASCII boundaries are always char boundaries
            if self.pos - start >= MIN_WORD_LEN {
                return Some(&self.line[start..self.pos]);
            }
        }

        None
    }
}

impl std::iter::FusedIterator for Words<'_> {}

/// Tokenize a line of text
pub fn words(line: &str) -> Words<'_> {
    Words::new(line)
}
