//! Choosing the best layout for a document.
//!
//! The engine is the stack-and-loop version of the classic recursive
//! algorithm: a single work stack of `(indent, mode, doc)` triples, walked
//! while tracking the current output column. Each `group` runs a bounded
//! lookahead (the fitting predicate) over a copy of the stack to decide
//! whether the group's contents go flat or broken.

use crate::doc::{concat, fill, Annotation, Doc, DocInner, LayoutInfo, Width};
use crate::sdoc::SDoc;

/// Whether the enclosing choice point was resolved to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Break,
    Flat,
}

/// The lookahead strategy used when deciding whether a group fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FittingPredicate {
    /// One-line lookahead. Fast, but not the prettiest: a group is taken to
    /// fit as soon as a mandatory newline is reached.
    Fast,
    /// Lookahead past newlines while the landing indentation stays deeper
    /// than the group's start column. Prettier, but does more work.
    Smart,
}

#[derive(Clone)]
enum Item {
    Doc(Doc),
    /// Sentinel pushed above an annotated doc so the closing marker is
    /// emitted after all of its contents.
    PopAnn(Annotation),
}

#[derive(Clone)]
struct Entry {
    indent: Width,
    mode: Mode,
    item: Item,
}

/// A lazy stream of [`SDoc`]s: the chosen layout of one document.
///
/// Fully consumable once; obtained from [`layout_smart`] or [`layout_fast`].
pub struct BestLayout {
    width: Width,
    ribbon_width: Width,
    predicate: FittingPredicate,
    column: Width,
    stack: Vec<Entry>,
}

/// Lays out `doc` with the smart fitting predicate.
pub fn layout_smart(doc: &Doc, width: Width, ribbon_frac: f64) -> BestLayout {
    BestLayout::new(doc, width, ribbon_frac, FittingPredicate::Smart)
}

/// Lays out `doc` with the fast fitting predicate.
pub fn layout_fast(doc: &Doc, width: Width, ribbon_frac: f64) -> BestLayout {
    BestLayout::new(doc, width, ribbon_frac, FittingPredicate::Fast)
}

fn effective_ribbon(width: Width, ribbon_frac: f64) -> Width {
    let ribbon = (ribbon_frac * width as f64).round() as Width;
    ribbon.max(0).min(width)
}

impl BestLayout {
    fn new(doc: &Doc, width: Width, ribbon_frac: f64, predicate: FittingPredicate) -> BestLayout {
        let normalized = doc.normalize();
        BestLayout {
            width,
            ribbon_width: effective_ribbon(width, ribbon_frac),
            predicate,
            column: 0,
            stack: vec![Entry {
                indent: 0,
                mode: Mode::Break,
                item: Item::Doc(normalized),
            }],
        }
    }

    fn push(&mut self, indent: Width, mode: Mode, doc: Doc) {
        self.stack.push(Entry {
            indent,
            mode,
            item: Item::Doc(doc),
        });
    }

    /// The width budget for content starting at the current column: the
    /// space left on the page, capped by the space left in the ribbon.
    fn available_width(&self, indent: Width) -> Width {
        let columns_left_in_line = self.width - self.column;
        let columns_left_in_ribbon = indent + self.ribbon_width - self.column;
        columns_left_in_line.min(columns_left_in_ribbon)
    }

    /// Bounded lookahead over a candidate stack. Returns true if the next
    /// line, starting with `max_width` columns of budget, can be completed
    /// without overflowing.
    fn fits(
        &self,
        predicate: FittingPredicate,
        min_nesting_level: Width,
        max_width: Width,
        mut stack: Vec<Entry>,
    ) -> bool {
        use DocInner::*;

        let mut chars_left = max_width;

        while chars_left >= 0 {
            let entry = match stack.pop() {
                None => return true,
                Some(entry) => entry,
            };
            let Entry { indent, mode, item } = entry;
            let doc = match item {
                Item::PopAnn(_) => continue,
                Item::Doc(doc) => doc,
            };
            match doc.inner() {
                Nil => {}
                Text { width, .. } => chars_left -= width,
                Concat(docs) | Fill(docs) => {
                    stack.extend(docs.iter().rev().map(|child| Entry {
                        indent,
                        mode,
                        item: Item::Doc(child.clone()),
                    }));
                }
                Annotated(inner, _) => stack.push(Entry {
                    indent,
                    mode,
                    item: Item::Doc(inner.clone()),
                }),
                Nest(extra, inner) => stack.push(Entry {
                    indent: indent + extra,
                    mode,
                    item: Item::Doc(inner.clone()),
                }),
                AlwaysBreak(_) => return false,
                HardLine => match predicate {
                    FittingPredicate::Fast => return true,
                    FittingPredicate::Smart => {
                        // Keep looking as long as the landing indentation is
                        // deeper than where the group started; content there
                        // can still overflow a later line.
                        if indent > min_nesting_level {
                            chars_left = self.width - indent;
                        } else {
                            return true;
                        }
                    }
                },
                FlatChoice(branches) => {
                    let branch = match mode {
                        Mode::Flat => branches.normalized_flat(),
                        Mode::Break => branches.normalized_broken(),
                    };
                    stack.push(Entry {
                        indent,
                        mode,
                        item: Item::Doc(branch),
                    });
                }
                Group(inner) => stack.push(Entry {
                    indent,
                    mode: Mode::Flat,
                    item: Item::Doc(inner.clone()),
                }),
                Contextual(f) => {
                    let info = LayoutInfo {
                        indent,
                        column: max_width - chars_left,
                        page_width: self.width,
                        ribbon_width: self.ribbon_width,
                    };
                    stack.push(Entry {
                        indent,
                        mode,
                        item: Item::Doc(f(&info).normalize()),
                    });
                }
            }
        }

        false
    }
}

impl Iterator for BestLayout {
    type Item = SDoc;

    fn next(&mut self) -> Option<SDoc> {
        use DocInner::*;

        while let Some(entry) = self.stack.pop() {
            let Entry { indent, mode, item } = entry;
            let doc = match item {
                Item::PopAnn(ann) => return Some(SDoc::PopAnn(ann)),
                Item::Doc(doc) => doc,
            };
            match doc.inner() {
                Nil => {}
                HardLine => {
                    self.column = indent;
                    return Some(SDoc::Line(indent));
                }
                Text { content, width } => {
                    self.column += width;
                    return Some(SDoc::Str(content.clone()));
                }
                Concat(docs) => {
                    // The first doc of the concatenation must end up at the
                    // top of the stack.
                    self.stack.extend(docs.iter().rev().map(|child| Entry {
                        indent,
                        mode,
                        item: Item::Doc(child.clone()),
                    }));
                }
                Contextual(f) => {
                    let info = LayoutInfo {
                        indent,
                        column: self.column,
                        page_width: self.width,
                        ribbon_width: self.ribbon_width,
                    };
                    let evaluated = f(&info).normalize();
                    self.push(indent, mode, evaluated);
                }
                Annotated(inner, ann) => {
                    // The matching pop marker goes on the stack below the
                    // contents, so it is emitted once they are done.
                    self.stack.push(Entry {
                        indent,
                        mode,
                        item: Item::PopAnn(ann.clone()),
                    });
                    self.push(indent, mode, inner.clone());
                    return Some(SDoc::PushAnn(ann.clone()));
                }
                FlatChoice(branches) => {
                    let branch = match mode {
                        Mode::Flat => branches.normalized_flat(),
                        Mode::Break => branches.normalized_broken(),
                    };
                    self.push(indent, mode, branch);
                }
                Nest(extra, inner) => self.push(indent + extra, mode, inner.clone()),
                Group(inner) => {
                    let mut probe = self.stack.clone();
                    probe.push(Entry {
                        indent,
                        mode: Mode::Flat,
                        item: Item::Doc(inner.clone()),
                    });
                    let min_nesting_level = self.column.min(indent);
                    let available = self.available_width(indent);
                    let fits = self.fits(self.predicate, min_nesting_level, available, probe);
                    let mode = if fits { Mode::Flat } else { Mode::Break };
                    self.push(indent, mode, inner.clone());
                }
                AlwaysBreak(inner) => self.push(indent, Mode::Break, inner.clone()),
                Fill(docs) => {
                    if docs.is_empty() {
                        continue;
                    }
                    let first = docs[0].clone();
                    let min_nesting_level = self.column.min(indent);
                    let available = self.available_width(indent);

                    // Fill sizing always uses the one-line lookahead.
                    let first_fits = self.fits(
                        FittingPredicate::Fast,
                        min_nesting_level,
                        available,
                        vec![Entry {
                            indent,
                            mode: Mode::Flat,
                            item: Item::Doc(first.clone()),
                        }],
                    );
                    let content_mode = |fits| if fits { Mode::Flat } else { Mode::Break };

                    if docs.len() == 1 {
                        self.push(indent, content_mode(first_fits), first);
                        continue;
                    }

                    let whitespace = docs[1].clone();
                    if docs.len() == 2 {
                        self.push(indent, content_mode(first_fits), whitespace);
                        self.push(indent, content_mode(first_fits), first);
                        continue;
                    }

                    let remaining = fill(docs[2..].to_vec());
                    let pair = concat(vec![first.clone(), whitespace.clone()]);
                    let pair_fits = self.fits(
                        FittingPredicate::Fast,
                        min_nesting_level,
                        available,
                        vec![Entry {
                            indent,
                            mode: Mode::Flat,
                            item: Item::Doc(pair),
                        }],
                    );

                    self.push(indent, mode, remaining);
                    if pair_fits {
                        self.push(indent, Mode::Flat, whitespace);
                        self.push(indent, Mode::Flat, first);
                    } else if first_fits {
                        self.push(indent, Mode::Break, whitespace);
                        self.push(indent, Mode::Flat, first);
                    } else {
                        self.push(indent, Mode::Break, whitespace);
                        self.push(indent, Mode::Break, first);
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{always_break, annotate, group, nest};
    use crate::syntax::Token;

    fn sdocs(doc: &Doc, width: Width) -> Vec<SDoc> {
        layout_smart(doc, width, 1.0).collect()
    }

    #[test]
    fn text_is_emitted_verbatim() {
        let doc = Doc::text("hello");
        assert_eq!(sdocs(&doc, 10), vec![SDoc::Str("hello".into())]);
    }

    #[test]
    fn group_goes_flat_when_it_fits() {
        let doc = group(concat(vec![Doc::text("a"), Doc::line(), Doc::text("b")]));
        assert_eq!(
            sdocs(&doc, 10),
            vec![
                SDoc::Str("a".into()),
                SDoc::Str(" ".into()),
                SDoc::Str("b".into())
            ]
        );
    }

    #[test]
    fn group_breaks_when_it_does_not_fit() {
        let doc = group(concat(vec![
            Doc::text("aaaa"),
            Doc::line(),
            Doc::text("bbbb"),
        ]));
        assert_eq!(
            sdocs(&doc, 6),
            vec![
                SDoc::Str("aaaa".into()),
                SDoc::Line(0),
                SDoc::Str("bbbb".into())
            ]
        );
    }

    #[test]
    fn nest_indents_following_lines() {
        let doc = concat(vec![
            Doc::text("a"),
            nest(3, concat(vec![Doc::hardline(), Doc::text("b")])),
        ]);
        assert_eq!(
            sdocs(&doc, 10),
            vec![
                SDoc::Str("a".into()),
                SDoc::Line(3),
                SDoc::Str("b".into())
            ]
        );
    }

    #[test]
    fn always_break_forces_enclosing_group() {
        let doc = group(concat(vec![
            Doc::text("a"),
            Doc::line(),
            always_break(Doc::text("b")),
        ]));
        assert_eq!(
            sdocs(&doc, 80),
            vec![
                SDoc::Str("a".into()),
                SDoc::Line(0),
                SDoc::Str("b".into())
            ]
        );
    }

    #[test]
    fn annotations_are_balanced_around_content() {
        let ann = Annotation::Token(Token::NumberInt);
        let doc = annotate(Token::NumberInt, Doc::text("1"));
        assert_eq!(
            sdocs(&doc, 10),
            vec![
                SDoc::PushAnn(ann.clone()),
                SDoc::Str("1".into()),
                SDoc::PopAnn(ann)
            ]
        );
    }
}
