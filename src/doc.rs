//! The document algebra.
//!
//! A [`Doc`] is a tree describing the set of all possible layouts of some
//! content. The layout engine narrows that set down to a single layout — a
//! stream of [`SDoc`]s — based on the page width and ribbon width.
//!
//! [`SDoc`]: crate::sdoc::SDoc

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::syntax::Token;

/// A count of columns. Columns are counted as `char`s of the rendered text.
pub type Width = i32;

/// An opaque label attached to a Doc subtree.
///
/// Token annotations are consumed by the colored renderer; comment
/// annotations are consumed by parent printers, which decide where the
/// comment text is placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Token(Token),
    Comment(Rc<str>),
}

impl From<Token> for Annotation {
    fn from(token: Token) -> Annotation {
        Annotation::Token(token)
    }
}

/// The arguments passed to a [`contextual`] callback when the layout engine
/// evaluates it.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInfo {
    /// The current indentation level.
    pub indent: Width,
    /// The current output column.
    pub column: Width,
    /// The requested page width.
    pub page_width: Width,
    /// The requested ribbon width.
    pub ribbon_width: Width,
}

pub(crate) type ContextualFn = Rc<dyn Fn(&LayoutInfo) -> Doc>;

/// A document: a set of possible layouts.
///
/// `Doc`s are cheap to clone (they are reference counted) and are pure
/// values: no printer may observe layout decisions except through
/// [`contextual`].
#[derive(Clone)]
pub struct Doc(Rc<DocInner>);

pub(crate) enum DocInner {
    Nil,
    Text { content: Rc<str>, width: Width },
    HardLine,
    Concat(Vec<Doc>),
    Nest(Width, Doc),
    FlatChoice(Branches),
    Group(Doc),
    AlwaysBreak(Doc),
    Fill(Vec<Doc>),
    Contextual(ContextualFn),
    Annotated(Doc, Annotation),
}

/// The two branches of a `FlatChoice`, with a normalization cache per
/// branch. Only the branch the layout engine actually requests gets
/// normalized.
pub(crate) struct Branches {
    pub(crate) when_broken: Doc,
    pub(crate) when_flat: Doc,
    norm_broken: OnceCell<Doc>,
    norm_flat: OnceCell<Doc>,
}

impl Branches {
    pub(crate) fn normalized_broken(&self) -> Doc {
        self.norm_broken
            .get_or_init(|| self.when_broken.normalize())
            .clone()
    }

    pub(crate) fn normalized_flat(&self) -> Doc {
        self.norm_flat
            .get_or_init(|| self.when_flat.normalize())
            .clone()
    }
}

impl Doc {
    fn new(inner: DocInner) -> Doc {
        Doc(Rc::new(inner))
    }

    pub(crate) fn inner(&self) -> &DocInner {
        &self.0
    }

    /// The empty document.
    pub fn nil() -> Doc {
        Doc::new(DocInner::Nil)
    }

    /// Literal text. Must not contain a newline.
    pub fn text(content: impl Into<String>) -> Doc {
        let content: Rc<str> = Rc::from(content.into());
        let width = content.chars().count() as Width;
        Doc::new(DocInner::Text { content, width })
    }

    /// A mandatory newline. Forces any enclosing group to break.
    pub fn hardline() -> Doc {
        Doc::new(DocInner::HardLine)
    }

    /// A space when flat, a newline when broken.
    pub fn line() -> Doc {
        flat_choice(Doc::hardline(), Doc::text(" "))
    }

    /// Nothing when flat, a newline when broken.
    pub fn softline() -> Doc {
        flat_choice(Doc::hardline(), Doc::nil())
    }

    /// Rewrites this Doc into a canonical form that preserves the set of
    /// legal layouts. Removes empty content, flattens nested concatenations,
    /// and hoists `always_break` outward so the layout engine can check it
    /// near the top of each group. Idempotent.
    ///
    /// The branches of a `flat_choice` are left alone here; each branch is
    /// normalized (and cached) the first time the layout engine requests it.
    pub fn normalize(&self) -> Doc {
        use DocInner::*;

        match self.inner() {
            Nil | HardLine | FlatChoice(_) | Contextual(_) | Annotated(..) => self.clone(),
            Text { content, .. } => {
                if content.is_empty() {
                    Doc::nil()
                } else {
                    self.clone()
                }
            }
            Concat(docs) => {
                let mut normalized: Vec<Doc> = Vec::with_capacity(docs.len());
                let mut propagate_broken = false;
                for child in docs {
                    let child = child.normalize();
                    match child.inner() {
                        Concat(inner) => normalized.extend_from_slice(inner),
                        AlwaysBreak(inner) => {
                            propagate_broken = true;
                            normalized.push(inner.clone());
                        }
                        Nil => {}
                        _ => normalized.push(child.clone()),
                    }
                }
                let res = match normalized.len() {
                    0 => return Doc::nil(),
                    1 => normalized.pop().unwrap(),
                    _ => Doc::new(Concat(normalized)),
                };
                if propagate_broken {
                    Doc::new(AlwaysBreak(res))
                } else {
                    res
                }
            }
            Nest(indent, doc) => {
                let inner = doc.normalize();
                if let AlwaysBreak(broken) = inner.inner() {
                    Doc::new(AlwaysBreak(Doc::new(Nest(*indent, broken.clone()))))
                } else {
                    Doc::new(Nest(*indent, inner))
                }
            }
            Group(doc) => {
                let inner = doc.normalize();
                match inner.inner() {
                    // The flat/broken choice is moot when the contents
                    // always break.
                    AlwaysBreak(_) => inner.clone(),
                    Nil => Doc::nil(),
                    _ => Doc::new(Group(inner)),
                }
            }
            AlwaysBreak(doc) => {
                let inner = doc.normalize();
                if let AlwaysBreak(_) = inner.inner() {
                    inner.clone()
                } else {
                    Doc::new(AlwaysBreak(inner))
                }
            }
            Fill(docs) => {
                let mut normalized: Vec<Doc> = Vec::with_capacity(docs.len());
                let mut propagate_broken = false;
                for child in docs {
                    let child = match child.inner() {
                        AlwaysBreak(inner) => {
                            propagate_broken = true;
                            inner.clone()
                        }
                        _ => child.clone(),
                    };
                    if let Nil = child.inner() {
                        continue;
                    }
                    normalized.push(child);
                }
                if normalized.is_empty() {
                    return Doc::nil();
                }
                let res = Doc::new(Fill(normalized));
                if propagate_broken {
                    Doc::new(AlwaysBreak(res))
                } else {
                    res
                }
            }
        }
    }
}

impl From<&str> for Doc {
    fn from(s: &str) -> Doc {
        Doc::text(s)
    }
}

impl From<String> for Doc {
    fn from(s: String) -> Doc {
        Doc::text(s)
    }
}

/// Concatenation; the docs are laid out one after another.
pub fn concat(docs: impl IntoIterator<Item = Doc>) -> Doc {
    Doc::new(DocInner::Concat(docs.into_iter().collect()))
}

/// Marks a point of layout choice: the contents are attempted on a single
/// line, falling back to broken mode if that does not fit within the layout
/// constraints.
pub fn group(doc: Doc) -> Doc {
    Doc::new(DocInner::Group(doc))
}

/// Adds `indent` to the current indentation for `doc`. Only affects what
/// follows line breaks inside `doc`; the width of the current line is
/// unchanged.
pub fn nest(indent: Width, doc: Doc) -> Doc {
    Doc::new(DocInner::Nest(indent, doc))
}

/// Instructs the layout engine that `doc` must be broken to multiple lines.
/// The instruction propagates to all enclosing groups, but nested docs may
/// still be laid out flat.
pub fn always_break(doc: Doc) -> Doc {
    Doc::new(DocInner::AlwaysBreak(doc))
}

/// Gives the layout engine two options: `when_flat` is used when the
/// enclosing group fits on a single line, `when_broken` otherwise.
pub fn flat_choice(when_broken: Doc, when_flat: Doc) -> Doc {
    Doc::new(DocInner::FlatChoice(Branches {
        when_broken,
        when_flat,
        norm_broken: OnceCell::new(),
        norm_flat: OnceCell::new(),
    }))
}

/// Alternating content and whitespace docs; breaks only the whitespace that
/// will not fit.
pub fn fill(docs: impl IntoIterator<Item = Doc>) -> Doc {
    Doc::new(DocInner::Fill(docs.into_iter().collect()))
}

/// Attaches `annotation` to `doc`.
pub fn annotate(annotation: impl Into<Annotation>, doc: Doc) -> Doc {
    Doc::new(DocInner::Annotated(doc, annotation.into()))
}

/// Attaches a comment to a Doc, to be placed by a parent printer.
pub fn comment_doc(doc: Doc, text: impl Into<String>) -> Doc {
    annotate(Annotation::Comment(Rc::from(text.into())), doc)
}

/// A Doc that is lazily computed when the layout engine reaches it, from the
/// indentation, column, page width and ribbon width at that point.
pub fn contextual(f: impl Fn(&LayoutInfo) -> Doc + 'static) -> Doc {
    Doc::new(DocInner::Contextual(Rc::new(f)))
}

/// Aligns each new line in `doc` with the column the doc starts at.
pub fn align(doc: Doc) -> Doc {
    contextual(move |info| nest(info.column - info.indent, doc.clone()))
}

/// Like [`align`], with an extra `indent` applied to the contents.
pub fn hang(indent: Width, doc: Doc) -> Doc {
    align(nest(indent, doc))
}

/// Returns `docs` with `separator` inserted between each adjacent pair.
pub fn intersperse(separator: Doc, docs: impl IntoIterator<Item = Doc>) -> Vec<Doc> {
    let mut out = Vec::new();
    for doc in docs {
        if !out.is_empty() {
            out.push(separator.clone());
        }
        out.push(doc);
    }
    out
}

impl PartialEq for Doc {
    fn eq(&self, other: &Doc) -> bool {
        use DocInner::*;

        match (self.inner(), other.inner()) {
            (Nil, Nil) | (HardLine, HardLine) => true,
            (Text { content: a, .. }, Text { content: b, .. }) => a == b,
            (Concat(a), Concat(b)) => a == b,
            (Fill(a), Fill(b)) => a == b,
            (Nest(i, a), Nest(j, b)) => i == j && a == b,
            (FlatChoice(a), FlatChoice(b)) => {
                a.when_broken == b.when_broken && a.when_flat == b.when_flat
            }
            (Group(a), Group(b)) => a == b,
            (AlwaysBreak(a), AlwaysBreak(b)) => a == b,
            (Annotated(a, x), Annotated(b, y)) => x == y && a == b,
            (Contextual(f), Contextual(g)) => {
                Rc::as_ptr(f) as *const () == Rc::as_ptr(g) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Doc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DocInner::*;

        match self.inner() {
            Nil => write!(f, "Nil"),
            Text { content, .. } => write!(f, "Text({:?})", content),
            HardLine => write!(f, "HardLine"),
            Concat(docs) => f.debug_tuple("Concat").field(docs).finish(),
            Nest(indent, doc) => f.debug_tuple("Nest").field(indent).field(doc).finish(),
            FlatChoice(branches) => f
                .debug_struct("FlatChoice")
                .field("when_broken", &branches.when_broken)
                .field("when_flat", &branches.when_flat)
                .finish(),
            Group(doc) => f.debug_tuple("Group").field(doc).finish(),
            AlwaysBreak(doc) => f.debug_tuple("AlwaysBreak").field(doc).finish(),
            Fill(docs) => f.debug_tuple("Fill").field(docs).finish(),
            Contextual(_) => write!(f, "Contextual(..)"),
            Annotated(doc, ann) => f.debug_tuple("Annotated").field(doc).field(ann).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_flattens_and_drops_nil() {
        let doc = concat(vec![
            Doc::text("a"),
            Doc::nil(),
            concat(vec![Doc::text("b"), Doc::text("c")]),
        ]);
        let expected = concat(vec![Doc::text("a"), Doc::text("b"), Doc::text("c")]);
        assert_eq!(doc.normalize(), expected);
    }

    #[test]
    fn empty_concat_is_nil() {
        assert_eq!(concat(vec![]).normalize(), Doc::nil());
        assert_eq!(concat(vec![Doc::text("")]).normalize(), Doc::nil());
    }

    #[test]
    fn singleton_concat_unwraps() {
        let doc = concat(vec![Doc::text("a")]);
        assert_eq!(doc.normalize(), Doc::text("a"));
    }

    #[test]
    fn always_break_hoists_through_concat() {
        let doc = group(concat(vec![
            Doc::text("a"),
            always_break(Doc::text("b")),
            Doc::text("c"),
        ]));
        let expected = always_break(concat(vec![
            Doc::text("a"),
            Doc::text("b"),
            Doc::text("c"),
        ]));
        assert_eq!(doc.normalize(), expected);
    }

    #[test]
    fn always_break_hoists_through_nest() {
        let doc = nest(4, always_break(Doc::text("a")));
        assert_eq!(doc.normalize(), always_break(nest(4, Doc::text("a"))));
    }

    #[test]
    fn group_of_always_break_collapses() {
        let doc = group(always_break(Doc::text("a")));
        assert_eq!(doc.normalize(), always_break(Doc::text("a")));
    }

    #[test]
    fn group_of_nil_is_nil() {
        assert_eq!(group(Doc::nil()).normalize(), Doc::nil());
    }

    #[test]
    fn nested_always_break_collapses() {
        let doc = always_break(always_break(Doc::text("a")));
        assert_eq!(doc.normalize(), always_break(Doc::text("a")));
    }

    #[test]
    fn fill_drops_nil_and_hoists_always_break() {
        let doc = fill(vec![
            Doc::text("a"),
            Doc::nil(),
            always_break(Doc::text("b")),
        ]);
        let expected = always_break(fill(vec![Doc::text("a"), Doc::text("b")]));
        assert_eq!(doc.normalize(), expected);
    }

    #[test]
    fn normalize_is_idempotent() {
        let doc = group(concat(vec![
            Doc::text("a"),
            nest(2, always_break(concat(vec![Doc::line(), Doc::text("b")]))),
            Doc::nil(),
        ]));
        let once = doc.normalize();
        let twice = once.normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn annotated_nil_is_preserved() {
        let doc = annotate(Token::Punctuation, Doc::nil());
        assert_eq!(doc.normalize(), doc);
    }
}
