//! Small sequence helpers shared by the attribute parser, the expression
//! compiler and the driver.

use std::ops::Range;

/// Splits `text` on `sep`, ignoring separators inside quoted literals.
///
/// Both `'` and `"` open a literal; a backslash inside a literal escapes the
/// following character. Segments are trimmed.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    split_where(text, |chars, i| chars[i].1 == sep)
        .into_iter()
        .map(|(start, end)| text[start..end].trim())
        .collect()
}

/// Splits a filter chain on `|`.
///
/// A doubled `||` is a logical or, not a pipe, and is never split. Quoted
/// literals are skipped. Segments are trimmed.
pub fn split_pipes(text: &str) -> Vec<&str> {
    split_where(text, |chars, i| {
        let is_pipe = |j: usize| chars.get(j).map(|&(_, c)| c == '|').unwrap_or(false);
        is_pipe(i) && !is_pipe(i + 1) && (i == 0 || !is_pipe(i - 1))
    })
    .into_iter()
    .map(|(start, end)| text[start..end].trim())
    .collect()
}

/// Removes one pair of matching surrounding quotes, if present.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Splits `text` at its first whitespace outside quoted literals.
///
/// The second half keeps its leading whitespace; it is empty when `text`
/// has no unquoted whitespace.
pub fn split_at_unquoted_whitespace(text: &str) -> (&str, &str) {
    let ranges = split_where(text, |chars, i| chars[i].1.is_whitespace());
    text.split_at(ranges[0].1)
}

/// Rewrites the parts of `text` outside quoted literals, copying literals
/// through untouched.
pub fn map_unquoted<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut run_start = 0;
    for literal in quoted_spans(text) {
        out.push_str(&rewrite(&text[run_start..literal.start]));
        out.push_str(&text[literal.clone()]);
        run_start = literal.end;
    }
    out.push_str(&rewrite(&text[run_start..]));
    out
}

/// Byte ranges of the quoted literals in `text`, quotes included.
///
/// A backslash inside a literal escapes the following character. An
/// unterminated literal runs to the end of `text`.
pub fn quoted_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut quote: Option<(char, usize)> = None;
    let mut escaped = false;

    for (offset, c) in text.char_indices() {
        match quote {
            Some((q, start)) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    spans.push(start..offset + c.len_utf8());
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => quote = Some((c, offset)),
            None => {}
        }
    }
    if let Some((_, start)) = quote {
        spans.push(start..text.len());
    }
    spans
}

/// Returns byte ranges of the segments between separator positions.
fn split_where<F>(text: &str, is_sep: F) -> Vec<(usize, usize)>
where
    F: Fn(&[(usize, char)], usize) -> bool,
{
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        match quote {
            Some(q) => {
                if c == '\\' {
                    i += 1;
                } else if c == q {
                    quote = None;
                }
            }
            None if c == '"' || c == '\'' => quote = Some(c),
            None => {
                if is_sep(&chars, i) {
                    ranges.push((start, offset));
                    start = offset + c.len_utf8();
                }
            }
        }
        i += 1;
    }
    ranges.push((start, text.len()));
    ranges
}
