//! Plain rendering of an [`SDoc`] stream.

use std::io;
use std::rc::Rc;

use crate::sdoc::SDoc;

/// Groups an SDoc stream into logical lines. Every line after the first
/// starts with the `Line` that introduced it.
pub(crate) struct Lines<I: Iterator<Item = SDoc>> {
    sdocs: I,
    current: Option<Vec<SDoc>>,
}

pub(crate) fn as_lines(sdocs: impl IntoIterator<Item = SDoc>) -> Lines<impl Iterator<Item = SDoc>> {
    Lines {
        sdocs: sdocs.into_iter(),
        current: Some(Vec::new()),
    }
}

impl<I: Iterator<Item = SDoc>> Iterator for Lines<I> {
    type Item = Vec<SDoc>;

    fn next(&mut self) -> Option<Vec<SDoc>> {
        let current = self.current.as_mut()?;
        for sdoc in self.sdocs.by_ref() {
            if let SDoc::Line(_) = sdoc {
                let line = std::mem::replace(current, vec![sdoc]);
                return Some(line);
            }
            current.push(sdoc);
        }
        self.current.take()
    }
}

/// Strips trailing whitespace from the last text chunk of a line.
///
/// Trailing whitespace can reach the renderer, for instance from the space
/// after a mapping colon whose value was broken onto the next line; it is
/// hard to eliminate at the doc level.
pub(crate) fn strip_trailing_whitespace(line: &mut [SDoc]) {
    let last_str = line
        .iter()
        .rposition(|sdoc| matches!(sdoc, SDoc::Str(_)));
    if let Some(idx) = last_str {
        if let SDoc::Str(content) = &line[idx] {
            let stripped = content.trim_end();
            if stripped.len() != content.len() {
                line[idx] = SDoc::Str(Rc::from(stripped));
            }
        }
    }
}

/// Renders an SDoc stream to `out`, ignoring annotations.
///
/// Output is streamed a logical line at a time; the renderer never buffers
/// beyond the current line.
pub fn render_to_stream<W: io::Write>(
    out: &mut W,
    sdocs: impl IntoIterator<Item = SDoc>,
) -> io::Result<()> {
    for mut line in as_lines(sdocs) {
        strip_trailing_whitespace(&mut line);
        for sdoc in line {
            match sdoc {
                SDoc::Str(content) => out.write_all(content.as_bytes())?,
                SDoc::Line(indent) => {
                    out.write_all(b"\n")?;
                    for _ in 0..indent {
                        out.write_all(b" ")?;
                    }
                }
                SDoc::PushAnn(_) | SDoc::PopAnn(_) => {}
            }
        }
    }
    Ok(())
}

/// Renders an SDoc stream to a `String`, ignoring annotations.
pub fn render_to_string(sdocs: impl IntoIterator<Item = SDoc>) -> String {
    let mut out = Vec::new();
    render_to_stream(&mut out, sdocs).expect("writing to a Vec cannot fail");
    String::from_utf8(out).expect("rendered output is valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_split_on_line_markers() {
        let sdocs = vec![
            SDoc::Str("a".into()),
            SDoc::Line(2),
            SDoc::Str("b".into()),
        ];
        let lines: Vec<_> = as_lines(sdocs).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], vec![SDoc::Str("a".into())]);
        assert_eq!(lines[1], vec![SDoc::Line(2), SDoc::Str("b".into())]);
    }

    #[test]
    fn renders_with_indentation() {
        let sdocs = vec![
            SDoc::Str("a".into()),
            SDoc::Line(4),
            SDoc::Str("b".into()),
        ];
        assert_eq!(render_to_string(sdocs), "a\n    b");
    }

    #[test]
    fn strips_trailing_whitespace_per_line() {
        let sdocs = vec![
            SDoc::Str("a".into()),
            SDoc::Str("  ".into()),
            SDoc::Line(0),
            SDoc::Str("b".into()),
        ];
        assert_eq!(render_to_string(sdocs), "a\nb");
    }

    #[test]
    fn empty_stream_renders_empty() {
        assert_eq!(render_to_string(Vec::new()), "");
    }
}
