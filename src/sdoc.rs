//! Simple docs: the linearized output of the layout engine.

use std::rc::Rc;

use crate::doc::{Annotation, Width};

/// One element of a chosen layout.
///
/// A stream of `SDoc`s represents a single concrete layout of a [`Doc`]
/// tree. `PushAnn`/`PopAnn` pairs are balanced and properly nested, and only
/// `Str`, `PushAnn` and `PopAnn` appear between two `Line`s.
///
/// [`Doc`]: crate::doc::Doc
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SDoc {
    /// A chunk of literal text on the current line.
    Str(Rc<str>),
    /// Advance to a new line and emit this many spaces of indentation.
    Line(Width),
    /// Open the extent of an annotation.
    PushAnn(Annotation),
    /// Close the extent of an annotation.
    PopAnn(Annotation),
}
