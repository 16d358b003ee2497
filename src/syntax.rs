//! Syntax token classes used to annotate output for highlighting.

/// The kind of syntax a piece of output text represents.
///
/// Renderers map each token class to a display style; everything else treats
/// tokens as opaque labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    KeywordConstant,
    NameBuiltin,
    NameEntity,
    NameFunction,
    NameVariable,
    LiteralString,
    StringAffix,
    StringEscape,
    NumberBinary,
    NumberInt,
    NumberFloat,
    Operator,
    Punctuation,
    CommentSingle,
}
