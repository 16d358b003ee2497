//! Printing of strings and byte strings.
//!
//! The quote character is the one that needs fewer escapes. A string that
//! does not fit the available width is split across physical lines, at
//! whitespace boundaries first, then at non-word boundaries, then at an
//! arbitrary position, producing one independently escaped literal per
//! line. How the resulting lines are framed is decided by the enclosing
//! printer through the context's multiline strategy.

use crate::context::{MultilineStrategy, PrettyContext};
use crate::doc::{
    always_break, annotate, concat, contextual, intersperse, nest, Doc, Width,
};
use crate::printers::{lparen, rparen, type_placeholder};
use crate::syntax::Token;

const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';

pub(crate) fn pretty_str(s: &str, ctx: &PrettyContext) -> Doc {
    if ctx.depth_left == 0 {
        return type_placeholder("String");
    }

    let strategy = ctx.multiline_strategy;
    let printer_indent = ctx.indent;
    let owned = s.to_owned();

    contextual(move |info| {
        let columns_left_in_line = info.page_width - info.column;
        let columns_left_in_ribbon = info.indent + info.ribbon_width - info.column;
        let available_width = columns_left_in_line.min(columns_left_in_ribbon);

        let singleline_chars = owned.chars().count() as Width + 2;
        if singleline_chars <= available_width {
            return single_line_str(&owned, None);
        }

        let max_len = line_budget(info.indent, printer_indent, info.page_width, info.ribbon_width);
        let quote = determine_quote(&owned);
        let parts = str_to_lines(max_len, quote, &owned)
            .iter()
            .map(|line| single_line_str(line, Some(quote)))
            .collect();
        multiline_frame(strategy, printer_indent, parts)
    })
}

pub(crate) fn pretty_bytes(bytes: &[u8], ctx: &PrettyContext) -> Doc {
    if ctx.depth_left == 0 {
        return type_placeholder("Bytes");
    }

    let strategy = ctx.multiline_strategy;
    let printer_indent = ctx.indent;
    let owned = bytes.to_vec();

    contextual(move |info| {
        let columns_left_in_line = info.page_width - info.column;
        let columns_left_in_ribbon = info.indent + info.ribbon_width - info.column;
        let available_width = columns_left_in_line.min(columns_left_in_ribbon);

        let singleline_chars = owned.len() as Width + 2;
        if singleline_chars <= available_width {
            return single_line_bytes(&owned, None);
        }

        let max_len = line_budget(info.indent, printer_indent, info.page_width, info.ribbon_width);
        let quote = determine_quote_bytes(&owned);
        let parts = bytes_to_lines(max_len, quote, &owned)
            .iter()
            .map(|line| single_line_bytes(line, Some(quote)))
            .collect();
        multiline_frame(strategy, printer_indent, parts)
    })
}

/// How many characters of string content fit on one continuation line.
fn line_budget(indent: Width, printer_indent: Width, page_width: Width, ribbon_width: Width) -> usize {
    let each_line_starts_on_col = indent + printer_indent;
    let each_line_ends_on_col = page_width.min(each_line_starts_on_col + ribbon_width);
    // The budget leaves room for the two quotes.
    (each_line_ends_on_col - each_line_starts_on_col - 2).max(1) as usize
}

fn multiline_frame(strategy: MultilineStrategy, indent: Width, parts: Vec<Doc>) -> Doc {
    let parts = intersperse(Doc::hardline(), parts);
    match strategy {
        MultilineStrategy::Plain => always_break(concat(parts)),
        MultilineStrategy::Hang => always_break(nest(indent, concat(parts))),
        MultilineStrategy::Parens => always_break(concat(vec![
            lparen(),
            nest(
                indent,
                concat(std::iter::once(Doc::hardline()).chain(parts)),
            ),
            Doc::hardline(),
            rparen(),
        ])),
        MultilineStrategy::Indented => always_break(nest(
            indent,
            concat(std::iter::once(Doc::hardline()).chain(parts)),
        )),
    }
}

/// Picks the quote that appears fewer times in `s`; a tie goes to the
/// single quote.
pub(crate) fn determine_quote(s: &str) -> char {
    let single_count = s.matches(SINGLE_QUOTE).count();
    if single_count == 0 {
        return SINGLE_QUOTE;
    }
    let double_count = s.matches(DOUBLE_QUOTE).count();
    if double_count == 0 {
        return DOUBLE_QUOTE;
    }
    if single_count <= double_count {
        SINGLE_QUOTE
    } else {
        DOUBLE_QUOTE
    }
}

fn determine_quote_bytes(bytes: &[u8]) -> char {
    let single_count = bytes.iter().filter(|&&b| b == b'\'').count();
    if single_count == 0 {
        return SINGLE_QUOTE;
    }
    let double_count = bytes.iter().filter(|&&b| b == b'"').count();
    if double_count == 0 {
        return DOUBLE_QUOTE;
    }
    if single_count <= double_count {
        SINGLE_QUOTE
    } else {
        DOUBLE_QUOTE
    }
}

fn push_run(runs: &mut Vec<(String, bool)>, piece: &str, escaped: bool) {
    match runs.last_mut() {
        Some((run, e)) if *e == escaped => run.push_str(piece),
        _ => runs.push((piece.to_owned(), escaped)),
    }
}

/// Escapes `s` for the chosen quote, returning maximal runs of literal and
/// escaped text so the escapes can be highlighted separately.
pub(crate) fn escape_runs(s: &str, quote: char) -> Vec<(String, bool)> {
    let mut runs: Vec<(String, bool)> = Vec::new();
    let mut buf = [0u8; 4];
    for c in s.chars() {
        match c {
            '\\' => push_run(&mut runs, "\\\\", true),
            '\n' => push_run(&mut runs, "\\n", true),
            '\r' => push_run(&mut runs, "\\r", true),
            '\t' => push_run(&mut runs, "\\t", true),
            SINGLE_QUOTE if quote == SINGLE_QUOTE => push_run(&mut runs, "\\'", true),
            DOUBLE_QUOTE if quote == DOUBLE_QUOTE => push_run(&mut runs, "\\\"", true),
            c if c.is_control() => {
                push_run(&mut runs, &format!("\\u{{{:x}}}", c as u32), true)
            }
            c => push_run(&mut runs, c.encode_utf8(&mut buf), false),
        }
    }
    runs
}

fn escape_runs_bytes(bytes: &[u8], quote: char) -> Vec<(String, bool)> {
    let mut runs: Vec<(String, bool)> = Vec::new();
    let mut buf = [0u8; 4];
    for &b in bytes {
        match b {
            b'\\' => push_run(&mut runs, "\\\\", true),
            b'\n' => push_run(&mut runs, "\\n", true),
            b'\r' => push_run(&mut runs, "\\r", true),
            b'\t' => push_run(&mut runs, "\\t", true),
            b'\'' if quote == SINGLE_QUOTE => push_run(&mut runs, "\\'", true),
            b'"' if quote == DOUBLE_QUOTE => push_run(&mut runs, "\\\"", true),
            b if (0x20..0x7f).contains(&b) => {
                push_run(&mut runs, (b as char).encode_utf8(&mut buf), false)
            }
            b => push_run(&mut runs, &format!("\\x{:02x}", b), true),
        }
    }
    runs
}

/// The `char` count of the escaped form of `s`, without the quotes.
fn escaped_len(s: &str, quote: char) -> usize {
    s.chars()
        .map(|c| match c {
            '\\' | '\n' | '\r' | '\t' => 2,
            c if c == quote => 2,
            c if c.is_control() => {
                let mut codepoint = c as u32;
                let mut hex_digits = 1;
                while codepoint >= 16 {
                    codepoint /= 16;
                    hex_digits += 1;
                }
                // `\u{…}`
                hex_digits + 4
            }
            _ => 1,
        })
        .sum()
}

fn escaped_len_bytes(bytes: &[u8], quote: char) -> usize {
    bytes
        .iter()
        .map(|&b| match b {
            b'\\' | b'\n' | b'\r' | b'\t' => 2,
            b'\'' if quote == SINGLE_QUOTE => 2,
            b'"' if quote == DOUBLE_QUOTE => 2,
            b if (0x20..0x7f).contains(&b) => 1,
            _ => 4,
        })
        .sum()
}

fn escapes_highlighted(runs: Vec<(String, bool)>) -> Vec<Doc> {
    runs.into_iter()
        .map(|(run, escaped)| {
            let token = if escaped {
                Token::StringEscape
            } else {
                Token::LiteralString
            };
            annotate(token, Doc::text(run))
        })
        .collect()
}

/// A single-line string literal with its escapes highlighted.
pub(crate) fn single_line_str(s: &str, use_quote: Option<char>) -> Doc {
    let quote = use_quote.unwrap_or_else(|| determine_quote(s));
    let runs = escapes_highlighted(escape_runs(s, quote));
    let mut docs = vec![Doc::text(quote.to_string())];
    docs.extend(runs);
    docs.push(Doc::text(quote.to_string()));
    annotate(Token::LiteralString, concat(docs))
}

fn single_line_bytes(bytes: &[u8], use_quote: Option<char>) -> Doc {
    let quote = use_quote.unwrap_or_else(|| determine_quote_bytes(bytes));
    let runs = escapes_highlighted(escape_runs_bytes(bytes, quote));
    let mut docs = vec![Doc::text(quote.to_string())];
    docs.extend(runs);
    docs.push(Doc::text(quote.to_string()));
    concat(vec![
        annotate(Token::StringAffix, Doc::text("b")),
        annotate(Token::LiteralString, concat(docs)),
    ])
}

/// Splits `s` into maximal runs of separator and non-separator characters.
/// Returns the runs and whether the first one is a separator run.
pub(crate) fn split_runs(s: &str, is_sep: impl Fn(char) -> bool) -> (Vec<String>, bool) {
    let mut parts: Vec<String> = Vec::new();
    let mut starts_with_sep = false;
    let mut current = String::new();
    let mut current_is_sep: Option<bool> = None;
    for c in s.chars() {
        let sep = is_sep(c);
        match current_is_sep {
            None => {
                starts_with_sep = sep;
                current_is_sep = Some(sep);
            }
            Some(prev) if prev != sep => {
                parts.push(std::mem::take(&mut current));
                current_is_sep = Some(sep);
            }
            Some(_) => {}
        }
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    (parts, starts_with_sep)
}

fn split_runs_bytes(bytes: &[u8], is_sep: impl Fn(u8) -> bool) -> (Vec<Vec<u8>>, bool) {
    let mut parts: Vec<Vec<u8>> = Vec::new();
    let mut starts_with_sep = false;
    let mut current: Vec<u8> = Vec::new();
    let mut current_is_sep: Option<bool> = None;
    for &b in bytes {
        let sep = is_sep(b);
        match current_is_sep {
            None => {
                starts_with_sep = sep;
                current_is_sep = Some(sep);
            }
            Some(prev) if prev != sep => {
                parts.push(std::mem::take(&mut current));
                current_is_sep = Some(sep);
            }
            Some(_) => {}
        }
        current.push(b);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    (parts, starts_with_sep)
}

fn split_at_chars(s: &str, char_pos: usize) -> (&str, &str) {
    let byte_pos = s
        .char_indices()
        .nth(char_pos)
        .map(|(byte_pos, _)| byte_pos)
        .unwrap_or(s.len());
    s.split_at(byte_pos)
}

/// Splits `s` into lines of at most `max_len` escaped characters each,
/// preferring whitespace boundaries, then non-word boundaries, then
/// splitting anywhere.
pub(crate) fn str_to_lines(max_len: usize, quote: char, s: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if s.chars().count() <= max_len {
        if !s.is_empty() {
            lines.push(s.to_owned());
        }
        return lines;
    }

    let (mut parts, mut starts_with_sep) = split_runs(s, char::is_whitespace);
    if parts.len() <= 1 {
        // No whitespace to split at; fall back to non-word boundaries.
        let (nonword_parts, nonword_start) =
            split_runs(s, |c| !(c.is_alphanumeric() || c == '_'));
        parts = nonword_parts;
        starts_with_sep = nonword_start;
    }

    let mut queue = parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| (part, starts_with_sep != (idx % 2 == 1)));

    let mut next_part: Option<(String, bool)> = None;
    let mut curr_line_parts: Vec<String> = Vec::new();
    let mut curr_line_len = 0usize;

    loop {
        if next_part.is_none() {
            match queue.next() {
                None => break,
                Some(part) => next_part = Some(part),
            }
        }
        let (part, is_sep) = next_part.take().expect("next part present");

        // The current line is thought of as including this part; it is only
        // appended once we know the line is not flushed without it.
        let part_escaped_len = escaped_len(&part, quote);
        curr_line_len += part_escaped_len;

        if curr_line_len == max_len {
            if !is_sep && curr_line_parts.len() > 1 {
                lines.push(curr_line_parts.concat());
                curr_line_parts.clear();
                curr_line_len = 0;
                next_part = Some((part, is_sep));
            } else {
                curr_line_parts.push(part);
                lines.push(curr_line_parts.concat());
                curr_line_parts.clear();
                curr_line_len = 0;
            }
        } else if curr_line_len > max_len {
            if !is_sep && !curr_line_parts.is_empty() {
                lines.push(curr_line_parts.concat());
                curr_line_parts.clear();
                curr_line_len = 0;
                next_part = Some((part, is_sep));
                continue;
            }

            let len_before_part = curr_line_len - part_escaped_len;
            let remaining_len = max_len.saturating_sub(len_before_part);
            let (this_line_part, next_line_part) = split_at_chars(&part, remaining_len);
            if !this_line_part.is_empty() {
                curr_line_parts.push(this_line_part.to_owned());
            }
            if !curr_line_parts.is_empty() {
                lines.push(curr_line_parts.concat());
            }
            curr_line_parts.clear();
            curr_line_len = 0;
            if !next_line_part.is_empty() {
                next_part = Some((next_line_part.to_owned(), is_sep));
            }
        } else {
            curr_line_parts.push(part);
        }
    }

    if !curr_line_parts.is_empty() {
        lines.push(curr_line_parts.concat());
    }
    lines
}

fn bytes_to_lines(max_len: usize, quote: char, bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    if bytes.len() <= max_len {
        if !bytes.is_empty() {
            lines.push(bytes.to_vec());
        }
        return lines;
    }

    let (mut parts, mut starts_with_sep) = split_runs_bytes(bytes, |b| b.is_ascii_whitespace());
    if parts.len() <= 1 {
        let (nonword_parts, nonword_start) =
            split_runs_bytes(bytes, |b| !(b.is_ascii_alphanumeric() || b == b'_'));
        parts = nonword_parts;
        starts_with_sep = nonword_start;
    }

    let mut queue = parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| (part, starts_with_sep != (idx % 2 == 1)));

    let mut next_part: Option<(Vec<u8>, bool)> = None;
    let mut curr_line_parts: Vec<Vec<u8>> = Vec::new();
    let mut curr_line_len = 0usize;

    loop {
        if next_part.is_none() {
            match queue.next() {
                None => break,
                Some(part) => next_part = Some(part),
            }
        }
        let (part, is_sep) = next_part.take().expect("next part present");

        let part_escaped_len = escaped_len_bytes(&part, quote);
        curr_line_len += part_escaped_len;

        if curr_line_len == max_len {
            if !is_sep && curr_line_parts.len() > 1 {
                lines.push(curr_line_parts.concat());
                curr_line_parts.clear();
                curr_line_len = 0;
                next_part = Some((part, is_sep));
            } else {
                curr_line_parts.push(part);
                lines.push(curr_line_parts.concat());
                curr_line_parts.clear();
                curr_line_len = 0;
            }
        } else if curr_line_len > max_len {
            if !is_sep && !curr_line_parts.is_empty() {
                lines.push(curr_line_parts.concat());
                curr_line_parts.clear();
                curr_line_len = 0;
                next_part = Some((part, is_sep));
                continue;
            }

            let len_before_part = curr_line_len - part_escaped_len;
            let remaining_len = max_len.saturating_sub(len_before_part);
            let split = remaining_len.min(part.len());
            let (this_line_part, next_line_part) = part.split_at(split);
            if !this_line_part.is_empty() {
                curr_line_parts.push(this_line_part.to_vec());
            }
            if !curr_line_parts.is_empty() {
                lines.push(curr_line_parts.concat());
            }
            curr_line_parts.clear();
            curr_line_len = 0;
            if !next_line_part.is_empty() {
                next_part = Some((next_line_part.to_vec(), is_sep));
            }
        } else {
            curr_line_parts.push(part);
        }
    }

    if !curr_line_parts.is_empty() {
        lines.push(curr_line_parts.concat());
    }
    lines
}
