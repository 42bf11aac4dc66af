//! Snippet expansion.
//!
//! A transaction does not understand snippet templates itself: it hands
//! [`SnippetEdit`]/[`SnippetRangeEdit`] templates to a [`SnippetExpander`] and consumes the
//! resolved edit plus placeholder [`Mark`]s.
//!
//! [`PlaceholderExpander`] is a small expander for LSP-style templates:
//! - `$1` / `${1}` → empty placeholder
//! - `${1:foo}` → `foo` (defaults may nest)
//! - `${1|a,b,c|}` → `a`
//! - `$0` / `${0}` → final cursor position
//! - `$VAR` / `${VAR}` → `` and `${VAR:default}` → `default` (variables are not resolved)
//! - `\$`, `\}`, `\\` → literal character

use crate::error::SnippetError;
use crate::settings::EditSettings;
use crate::text;
use crate::trans::{contextual_from_plain, indent_adjusted};
use crate::{Edit, EditContext, Mark, Position, RangeEdit, SnippetEdit, SnippetRangeEdit};
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

/// Placeholder index → default text.
pub type TextTransforms = BTreeMap<usize, String>;

/// The result of expanding a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The resolved edit: contextual for basic snippets, range (with `new_prefix`) for ranged
    /// snippets.
    pub edit: Edit,
    /// Placeholder regions in buffer coordinates, in jump order (`$0` last).
    pub marks: Vec<Mark>,
    /// Placeholder defaults.
    pub text_transforms: TextTransforms,
}

/// Turns snippet templates into concrete edits.
///
/// Expanders apply indentation themselves when `adjust_indent` is set, so mark columns match
/// the text that is actually inserted.
pub trait SnippetExpander {
    /// Expand a snippet inserted at the cursor.
    fn expand(
        &self,
        ctx: &EditContext,
        settings: &EditSettings,
        snippet: &SnippetEdit,
        adjust_indent: bool,
    ) -> Result<Expansion, SnippetError>;

    /// Expand a snippet over a range. `line_before` is the text of the range's first row
    /// before its start column.
    fn expand_ranged(
        &self,
        ctx: &EditContext,
        settings: &EditSettings,
        snippet: &SnippetRangeEdit,
        line_before: &str,
        adjust_indent: bool,
    ) -> Result<Expansion, SnippetError>;
}

static SNIPPET_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\d|\{|[A-Za-z_])|\\[$\\}]").unwrap_or_else(|err| panic!("invalid regex: {err}"))
});

/// Returns `true` if `text` contains snippet syntax and needs expansion.
pub fn requires_snippet(text: &str) -> bool {
    SNIPPET_SYNTAX.is_match(text)
}

#[derive(Debug, Default)]
struct ParsedSnippet {
    text: String,
    cursor: Option<usize>,
    placeholders: Vec<(usize, Range<usize>)>,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    out: ParsedSnippet,
}

impl<'a> Parser<'a> {
    fn parse(src: &'a str) -> Result<ParsedSnippet, SnippetError> {
        let mut parser = Self {
            src,
            pos: 0,
            out: ParsedSnippet::default(),
        };
        parser.parse_until(None)?;
        Ok(parser.out)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Parse until `closing` (consumed) or end of input.
    fn parse_until(&mut self, closing: Option<(char, usize)>) -> Result<(), SnippetError> {
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some(next) => self.out.text.push(next),
                    None => self.out.text.push('\\'),
                },
                '$' => self.parse_dollar(self.pos - 1)?,
                c if closing.is_some_and(|(close, _)| close == c) => return Ok(()),
                c => self.out.text.push(c),
            }
        }
        match closing {
            Some((_, offset)) => Err(SnippetError::Unterminated { offset }),
            None => Ok(()),
        }
    }

    fn placeholder(&mut self, index: usize, span: Range<usize>) {
        if index == 0 {
            self.out.cursor.get_or_insert(span.start);
        } else {
            self.out.placeholders.push((index, span));
        }
    }

    fn parse_dollar(&mut self, offset: usize) -> Result<(), SnippetError> {
        match self.peek() {
            Some(d) if d.is_ascii_digit() => {
                let index = self.index(offset)?;
                let at = self.out.text.len();
                self.placeholder(index, at..at);
                Ok(())
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                self.eat_while(|c| c == '_' || c.is_ascii_alphanumeric());
                Ok(())
            }
            Some('{') => {
                self.bump();
                self.parse_braced(offset)
            }
            _ => {
                self.out.text.push('$');
                Ok(())
            }
        }
    }

    fn index(&mut self, offset: usize) -> Result<usize, SnippetError> {
        self.eat_while(|c| c.is_ascii_digit())
            .parse()
            .map_err(|_| SnippetError::InvalidPlaceholder { offset })
    }

    fn parse_braced(&mut self, offset: usize) -> Result<(), SnippetError> {
        match self.peek() {
            Some(d) if d.is_ascii_digit() => {
                let index = self.index(offset)?;
                let start = self.out.text.len();
                match self.bump() {
                    Some('}') => {}
                    Some(':') => self.parse_until(Some(('}', offset)))?,
                    Some('|') => {
                        let choices = self.eat_while(|c| c != '|');
                        if self.bump() != Some('|') || self.bump() != Some('}') {
                            return Err(SnippetError::Unterminated { offset });
                        }
                        let first = choices.split(',').next().unwrap_or_default();
                        self.out.text.push_str(first);
                    }
                    Some(_) => return Err(SnippetError::InvalidPlaceholder { offset }),
                    None => return Err(SnippetError::Unterminated { offset }),
                }
                let end = self.out.text.len();
                self.placeholder(index, start..end);
                Ok(())
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                self.eat_while(|c| c == '_' || c.is_ascii_alphanumeric());
                match self.bump() {
                    Some('}') => Ok(()),
                    Some(':') => self.parse_until(Some(('}', offset))),
                    Some(_) => Err(SnippetError::InvalidPlaceholder { offset }),
                    None => Err(SnippetError::Unterminated { offset }),
                }
            }
            Some(_) => Err(SnippetError::InvalidPlaceholder { offset }),
            None => Err(SnippetError::Unterminated { offset }),
        }
    }
}

/// Expanded text laid out into (indented) lines, with a way to map template offsets to
/// line/column pairs in the laid-out text.
struct Layout {
    original: Vec<String>,
    lines: Vec<String>,
}

impl Layout {
    fn new(ctx: &EditContext, settings: &EditSettings, text: &str, line_before: &str, adjust_indent: bool) -> Self {
        let original = ctx.split_lines(text);
        let lines = if adjust_indent {
            indent_adjusted(&settings.indent, line_before, &original)
        } else {
            original.iter().map(|line| line.to_string()).collect()
        };
        Self {
            original: original.into_iter().map(str::to_string).collect(),
            lines,
        }
    }

    /// Map a byte offset in the unindented text to `(line, col)` in the laid-out lines.
    fn locate(&self, offset: usize, linefeed: &str) -> (usize, usize) {
        let mut remaining = offset;
        for (idx, line) in self.original.iter().enumerate() {
            // Offsets inside a multi-byte linefeed clamp to the end of the line.
            if remaining < line.len() + linefeed.len() || idx + 1 == self.original.len() {
                let col = remaining.min(line.len());
                if idx == 0 || line.is_empty() {
                    return (idx, col);
                }
                let adjusted = &self.lines[idx];
                let lead = text::leading_whitespace(line).len();
                let adjusted_lead = text::leading_whitespace(adjusted).len();
                let col = if col < lead {
                    adjusted_lead
                } else {
                    col + adjusted.len() - line.len()
                };
                return (idx, col);
            }
            remaining -= line.len() + linefeed.len();
        }
        (0, 0)
    }

    fn text(&self, linefeed: &str) -> String {
        self.lines.join(linefeed)
    }

    fn prefix(&self, (line, col): (usize, usize), linefeed: &str) -> String {
        let mut parts: Vec<&str> = self.lines[..line].iter().map(String::as_str).collect();
        parts.push(text::before(&self.lines[line], col));
        parts.join(linefeed)
    }
}

/// Default [`SnippetExpander`] for LSP-style templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderExpander;

impl PlaceholderExpander {
    fn marks(parsed: &ParsedSnippet, layout: &Layout, origin: Position, linefeed: &str) -> Vec<Mark> {
        let to_buffer = |(line, col): (usize, usize)| {
            if line == 0 {
                Position::new(origin.row, origin.col + col)
            } else {
                Position::new(origin.row + line, col)
            }
        };

        let mut placeholders = parsed.placeholders.clone();
        placeholders.sort_by_key(|(index, span)| (*index, span.start));

        let mut marks: Vec<Mark> = placeholders
            .into_iter()
            .map(|(index, span)| {
                let begin = layout.locate(span.start, linefeed);
                let end = layout.locate(span.end, linefeed);
                Mark {
                    id: index,
                    begin: to_buffer(begin),
                    end: to_buffer(end),
                    text: parsed.text[span].to_string(),
                }
            })
            .collect();

        if let Some(cursor) = parsed.cursor
            && !marks.is_empty()
        {
            let at = to_buffer(layout.locate(cursor, linefeed));
            marks.push(Mark {
                id: 0,
                begin: at,
                end: at,
                text: String::new(),
            });
        }
        marks
    }

    fn text_transforms(parsed: &ParsedSnippet) -> TextTransforms {
        let mut out = TextTransforms::new();
        for (index, span) in &parsed.placeholders {
            out.entry(*index)
                .or_insert_with(|| parsed.text[span.clone()].to_string());
        }
        out
    }
}

impl SnippetExpander for PlaceholderExpander {
    fn expand(
        &self,
        ctx: &EditContext,
        settings: &EditSettings,
        snippet: &SnippetEdit,
        adjust_indent: bool,
    ) -> Result<Expansion, SnippetError> {
        let parsed = Parser::parse(&snippet.new_text)?;
        let contextual =
            contextual_from_plain(&settings.match_options, &settings.completion, ctx, &parsed.text);

        let begin_col = ctx.col.saturating_sub(contextual.old_prefix.len());
        let line_before = text::before(&ctx.line, begin_col);
        let layout = Layout::new(ctx, settings, &parsed.text, line_before, adjust_indent);
        let cursor = layout.locate(parsed.cursor.unwrap_or(parsed.text.len()), &ctx.linefeed);

        let marks = Self::marks(&parsed, &layout, Position::new(ctx.row, begin_col), &ctx.linefeed);
        let edit = Edit::Contextual(crate::ContextualEdit {
            new_text: layout.text(&ctx.linefeed),
            new_prefix: layout.prefix(cursor, &ctx.linefeed),
            ..contextual
        });

        Ok(Expansion {
            edit,
            marks,
            text_transforms: Self::text_transforms(&parsed),
        })
    }

    fn expand_ranged(
        &self,
        ctx: &EditContext,
        settings: &EditSettings,
        snippet: &SnippetRangeEdit,
        line_before: &str,
        adjust_indent: bool,
    ) -> Result<Expansion, SnippetError> {
        let parsed = Parser::parse(&snippet.range.new_text)?;
        let layout = Layout::new(ctx, settings, &parsed.text, line_before, adjust_indent);
        let cursor = layout.locate(parsed.cursor.unwrap_or(parsed.text.len()), &ctx.linefeed);

        let row = snippet.range.begin.row.min(snippet.range.end.row);
        let marks = Self::marks(&parsed, &layout, Position::new(row, line_before.len()), &ctx.linefeed);
        let edit = Edit::Range(RangeEdit {
            new_text: layout.text(&ctx.linefeed),
            new_prefix: Some(layout.prefix(cursor, &ctx.linefeed)),
            ..snippet.range.clone()
        });

        Ok(Expansion {
            edit,
            marks,
            text_transforms: Self::text_transforms(&parsed),
        })
    }
}
