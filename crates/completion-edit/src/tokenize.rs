//! Word/symbol tokenizer.

use crate::settings::MatchOptions;
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into word and symbol tokens.
pub trait Tokenizer {
    /// Tokenize `text`. Whitespace never appears in the output.
    fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Default tokenizer built on Unicode word boundaries.
///
/// Word segments joined by unifying characters (e.g. `foo-bar`, `snake_case`) form one
/// token; every other symbol character is a token of its own.
#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    options: MatchOptions,
}

impl WordTokenizer {
    /// Create a tokenizer with the given word rules.
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    fn is_word(&self, segment: &str) -> bool {
        !segment.is_empty() && segment.chars().all(|c| self.options.is_word_char(c))
    }
}

impl Tokenizer for WordTokenizer {
    fn tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        // Byte range of the word token being accumulated.
        let mut word: Option<(usize, usize)> = None;

        for (offset, segment) in text.split_word_bound_indices() {
            if self.is_word(segment) {
                word = match word {
                    Some((start, end)) if end == offset => Some((start, offset + segment.len())),
                    Some((start, end)) => {
                        out.push(&text[start..end]);
                        Some((offset, offset + segment.len()))
                    }
                    None => Some((offset, offset + segment.len())),
                };
                continue;
            }

            if let Some((start, end)) = word.take() {
                out.push(&text[start..end]);
            }
            for (idx, c) in segment.char_indices() {
                if !c.is_whitespace() {
                    let at = offset + idx;
                    out.push(&text[at..at + c.len_utf8()]);
                }
            }
        }

        if let Some((start, end)) = word {
            out.push(&text[start..end]);
        }
        out
    }
}
