//! Doc builders and the built-in printers.

use std::cmp::Ordering;

use crate::context::{MultilineStrategy, PrettyContext};
use crate::dispatch::{pretty_value, unwrap_comments};
use crate::doc::{
    always_break, annotate, comment_doc, concat, fill, flat_choice, group, intersperse, nest,
    Annotation, Doc, DocInner,
};
use crate::registry::Registry;
use crate::strings::{pretty_bytes, pretty_str, split_runs};
use crate::syntax::Token;
use crate::value::{Bytes, List, Mapping, Set, Shared, Tuple, Value};

pub(crate) fn comma() -> Doc {
    annotate(Token::Punctuation, Doc::text(","))
}

pub(crate) fn colon() -> Doc {
    annotate(Token::Punctuation, Doc::text(":"))
}

pub(crate) fn ellipsis() -> Doc {
    annotate(Token::Punctuation, Doc::text("..."))
}

pub(crate) fn lparen() -> Doc {
    annotate(Token::Punctuation, Doc::text("("))
}

pub(crate) fn rparen() -> Doc {
    annotate(Token::Punctuation, Doc::text(")"))
}

pub(crate) fn lbracket() -> Doc {
    annotate(Token::Punctuation, Doc::text("["))
}

pub(crate) fn rbracket() -> Doc {
    annotate(Token::Punctuation, Doc::text("]"))
}

pub(crate) fn lbrace() -> Doc {
    annotate(Token::Punctuation, Doc::text("{"))
}

pub(crate) fn rbrace() -> Doc {
    annotate(Token::Punctuation, Doc::text("}"))
}

fn assign_op() -> Doc {
    annotate(Token::Operator, Doc::text("="))
}

/// A function or constructor name.
pub fn identifier(name: impl Into<String>) -> Doc {
    annotate(Token::NameFunction, Doc::text(name))
}

/// A name from the language or standard library.
pub fn builtin_identifier(name: impl Into<String>) -> Doc {
    annotate(Token::NameBuiltin, Doc::text(name))
}

/// A keyword argument name.
pub fn keyword_arg(name: impl Into<String>) -> Doc {
    annotate(Token::NameVariable, Doc::text(name))
}

/// The `TYPE(...)` rendering used when the depth budget is exhausted.
pub(crate) fn type_placeholder(name: &str) -> Doc {
    concat(vec![identifier(name), lparen(), ellipsis(), rparen()])
}

/// The comment text carried by a comment-annotated doc, if any.
pub(crate) fn is_commented(doc: &Doc) -> Option<&str> {
    match doc.inner() {
        DocInner::Annotated(_, Annotation::Comment(text)) => Some(text),
        _ => None,
    }
}

fn commented_inner(doc: &Doc) -> Doc {
    match doc.inner() {
        DocInner::Annotated(inner, Annotation::Comment(_)) => inner.clone(),
        _ => doc.clone(),
    }
}

/// A Doc rendering comment `text`. The text is treated as words; any
/// whitespace may be used to break the comment over multiple lines, each
/// line re-prefixed with `# `.
pub fn commentdoc(text: &str) -> Doc {
    if text.is_empty() {
        return annotate(Token::CommentSingle, Doc::text("#"));
    }

    let mut commentlines = Vec::new();
    for line in text.lines() {
        let (parts, starts_with_whitespace) = split_runs(line, char::is_whitespace);
        let mut words_ws: Vec<String> = parts;

        let prefix = if starts_with_whitespace && !words_ws.is_empty() {
            Doc::text(words_ws.remove(0))
        } else {
            Doc::nil()
        };

        if words_ws.len() % 2 == 0 && !words_ws.is_empty() {
            // Trailing whitespace would dangle at a line end; drop it.
            words_ws.pop();
        }

        let docs: Vec<Doc> = words_ws
            .into_iter()
            .enumerate()
            .map(|(idx, part)| {
                if idx % 2 == 1 {
                    flat_choice(
                        always_break(concat(vec![Doc::hardline(), Doc::text("# ")])),
                        Doc::text(part),
                    )
                } else {
                    Doc::text(part)
                }
            })
            .collect();

        commentlines.push(concat(vec![Doc::text("# "), prefix, fill(docs)]));
    }

    let multiline = commentlines.len() > 1;
    let body = concat(intersperse(Doc::hardline(), commentlines));
    let body = if multiline { always_break(body) } else { body };
    annotate(Token::CommentSingle, body)
}

/// Brackets `child` so that broken mode indents it one level:
/// `left`, soft break, `child`, soft break, `right`.
pub fn bracket(ctx: &PrettyContext, left: Doc, child: Doc, right: Doc) -> Doc {
    concat(vec![
        left,
        nest(ctx.indent, concat(vec![Doc::softline(), child])),
        Doc::softline(),
        right,
    ])
}

/// Joins element docs into a bracketed, comma-separated sequence.
///
/// `dangle` appends a trailing comma in broken mode and flat mode alike.
/// The sequence is forced to break when asked to, when any element carries
/// a comment, or when even the shortest possible flat rendering could not
/// fit a practical ribbon.
pub fn sequence_of_docs(
    ctx: &PrettyContext,
    left: Doc,
    docs: Vec<Doc>,
    right: Doc,
    dangle: bool,
    force_break: bool,
) -> Doc {
    // No layout branching is needed for really long sequences: even at one
    // character per element the flat mode cannot fit.
    const MAX_PRACTICAL_RIBBON_WIDTH: usize = 150;
    let minimum_output_len = 2 + ", ".len() * docs.len().saturating_sub(1) + docs.len();
    let will_break = force_break || minimum_output_len > MAX_PRACTICAL_RIBBON_WIDTH;

    let has_comment = docs.iter().any(|doc| is_commented(doc).is_some());

    let count = docs.len();
    let mut parts = Vec::new();
    for (idx, doc) in docs.into_iter().enumerate() {
        let last = idx + 1 == count;
        let comment_text = is_commented(&doc).map(str::to_owned);

        match comment_text {
            Some(text) => {
                // Prefer the comment at the end of the element's line; if
                // the element breaks, the comment goes on the line above.
                let flat_version = concat(vec![
                    doc.clone(),
                    if last { Doc::nil() } else { comma() },
                    Doc::text("  "),
                    commentdoc(&text),
                    if last { Doc::nil() } else { Doc::hardline() },
                ]);
                let broken_version = concat(vec![
                    commentdoc(&text),
                    Doc::hardline(),
                    doc,
                    if last { Doc::nil() } else { comma() },
                    if last { Doc::nil() } else { Doc::hardline() },
                ]);
                parts.push(group(flat_choice(broken_version, flat_version)));
            }
            None => {
                parts.push(doc);
                if !last {
                    parts.push(concat(vec![comma(), Doc::line()]));
                }
            }
        }
    }

    if dangle {
        parts.push(comma());
    }

    let bracketed = bracket(ctx, left, concat(parts), right);
    if will_break || has_comment {
        always_break(bracketed)
    } else {
        group(bracketed)
    }
}

/// The pieces of a function-call-shaped doc, consumed by [`build_fncall`].
pub struct FnCall {
    /// The doc for the callee, usually an [`identifier`].
    pub name: Doc,
    pub args: Vec<Doc>,
    pub kwargs: Vec<(String, Doc)>,
    /// When the call has a single positional container argument, open the
    /// parenthesis directly against its bracket instead of indenting twice.
    pub hug_sole_arg: bool,
    /// Rendered as a `# …` line before the closing parenthesis; forces the
    /// call to break.
    pub trailing_comment: Option<String>,
}

impl FnCall {
    pub fn new(name: Doc) -> FnCall {
        FnCall {
            name,
            args: Vec::new(),
            kwargs: Vec::new(),
            hug_sole_arg: false,
            trailing_comment: None,
        }
    }
}

/// Builds a doc that looks like a function call from docs for the callee,
/// the arguments and the keyword arguments.
pub fn build_fncall(ctx: &PrettyContext, call: FnCall) -> Doc {
    let FnCall {
        name: fndoc,
        args: argdocs,
        kwargs,
        hug_sole_arg,
        trailing_comment,
    } = call;

    let mut has_comment = trailing_comment.is_some();

    // A comment on a keyword argument's value covers the whole binding.
    let kwargdocs: Vec<Doc> = kwargs
        .into_iter()
        .map(|(binding, doc)| {
            let comment_text = is_commented(&doc).map(str::to_owned);
            match comment_text {
                Some(text) => comment_doc(
                    concat(vec![keyword_arg(binding), assign_op(), commented_inner(&doc)]),
                    text,
                ),
                None => concat(vec![keyword_arg(binding), assign_op(), doc]),
            }
        })
        .collect();

    if argdocs.is_empty() && kwargdocs.is_empty() {
        return concat(vec![fndoc, lparen(), rparen()]);
    }

    if hug_sole_arg
        && kwargdocs.is_empty()
        && argdocs.len() == 1
        && is_commented(&argdocs[0]).is_none()
    {
        let mut docs = vec![fndoc, lparen()];
        docs.extend(argdocs);
        docs.push(rparen());
        return group(concat(docs));
    }

    let mut allarg_docs = argdocs;
    allarg_docs.extend(kwargdocs);
    if let Some(text) = &trailing_comment {
        allarg_docs.push(commentdoc(text));
    }

    let count = allarg_docs.len();
    let mut parts = Vec::new();
    for (idx, doc) in allarg_docs.into_iter().enumerate() {
        let last = idx + 1 == count;

        let comment_text = is_commented(&doc).map(str::to_owned);
        let doc = match &comment_text {
            Some(_) => {
                has_comment = true;
                commented_inner(&doc)
            }
            None => doc,
        };

        let mut part = concat(vec![doc, if last { Doc::nil() } else { comma() }]);

        if let Some(text) = comment_text {
            part = group(flat_choice(
                concat(vec![commentdoc(&text), Doc::hardline(), part.clone()]),
                concat(vec![part, Doc::text("  "), commentdoc(&text)]),
            ));
        }

        if !last {
            let separator = if has_comment {
                Doc::hardline()
            } else {
                Doc::line()
            };
            part = concat(vec![part, separator]);
        }

        parts.push(part);
    }

    let body = concat(vec![
        fndoc,
        lparen(),
        nest(
            ctx.indent,
            concat(vec![Doc::softline(), concat(parts)]),
        ),
        Doc::softline(),
        rparen(),
    ]);

    if has_comment {
        always_break(body)
    } else {
        group(body)
    }
}

/// Builds a canonical call doc: `name(arg, …, kw=value, …)`, with the
/// argument values printed through the registry.
pub fn pretty_call(
    ctx: &PrettyContext,
    name: &str,
    args: &[&dyn Value],
    kwargs: &[(&str, &dyn Value)],
) -> Doc {
    let fndoc = identifier(name);

    if ctx.depth_left == 0 {
        return concat(vec![fndoc, lparen(), ellipsis(), rparen()]);
    }

    if kwargs.is_empty() && args.len() == 1 {
        let (sole_arg, _, _) = unwrap_comments(args[0]);
        let any = sole_arg.as_any();
        if any.is::<List>() || any.is::<Mapping>() || any.is::<Tuple>() {
            let mut call = FnCall::new(fndoc);
            call.args = vec![pretty_value(args[0], ctx)];
            call.hug_sole_arg = true;
            return build_fncall(ctx, call);
        }
    }

    let nested_ctx = ctx
        .nested_call()
        .use_multiline_strategy(MultilineStrategy::Hang);

    let mut call = FnCall::new(fndoc);
    call.args = args
        .iter()
        .map(|arg| pretty_value(*arg, &nested_ctx))
        .collect();
    call.kwargs = kwargs
        .iter()
        .map(|(binding, value)| ((*binding).to_owned(), pretty_value(*value, &nested_ctx)))
        .collect();
    build_fncall(ctx, call)
}

enum SeqKind {
    List,
    Tuple,
    Set,
}

fn pretty_seq(
    kind: SeqKind,
    items: &[Box<dyn Value>],
    ctx: &PrettyContext,
    trailing_comment: Option<&str>,
) -> Doc {
    if items.len() > ctx.max_seq_len {
        let truncated = items.len() - ctx.max_seq_len;
        let truncation_comment = format!("...and {} more elements", truncated);
        let combined = match trailing_comment {
            Some(text) => format!("{}. {}", truncation_comment, text),
            None => truncation_comment,
        };
        return pretty_seq(kind, &items[..ctx.max_seq_len], ctx, Some(&combined));
    }

    let (left, right) = match kind {
        SeqKind::List => (lbracket(), rbracket()),
        SeqKind::Tuple => (lparen(), rparen()),
        SeqKind::Set => (lbrace(), rbrace()),
    };
    let mut dangle = matches!(kind, SeqKind::Tuple) && items.len() == 1;

    if items.is_empty() {
        return match kind {
            SeqKind::List | SeqKind::Tuple => concat(vec![left, right]),
            // An empty set has no literal of its own.
            SeqKind::Set => pretty_call(ctx, "Set", &[], &[]),
        };
    }

    if ctx.depth_left == 0 {
        return concat(vec![left, ellipsis(), right]);
    }

    let mut els: Vec<Doc> = if items.len() == 1 {
        // A single element is not hang-indented; it continues at the
        // sequence's own indentation when it spans lines.
        vec![pretty_value(
            items[0].as_ref(),
            &ctx.nested_call()
                .use_multiline_strategy(MultilineStrategy::Plain),
        )]
    } else {
        items
            .iter()
            .map(|el| {
                pretty_value(
                    el.as_ref(),
                    &ctx.nested_call()
                        .use_multiline_strategy(MultilineStrategy::Hang),
                )
            })
            .collect()
    };

    if let Some(text) = trailing_comment {
        els.push(commentdoc(text));
        dangle = false;
    }

    sequence_of_docs(ctx, left, els, right, dangle, trailing_comment.is_some())
}

fn string_like_key(key: &dyn Value, ctx: &PrettyContext) -> Option<Doc> {
    let parens_ctx = ctx.use_multiline_strategy(MultilineStrategy::Parens);
    let any = key.as_any();
    if let Some(s) = any.downcast_ref::<String>() {
        return Some(pretty_str(s, &parens_ctx));
    }
    if let Some(s) = any.downcast_ref::<&'static str>() {
        return Some(pretty_str(s, &parens_ctx));
    }
    if let Some(bytes) = any.downcast_ref::<Bytes>() {
        return Some(pretty_bytes(&bytes.0, &parens_ctx));
    }
    None
}

fn as_number(value: &dyn Value) -> Option<f64> {
    let any = value.as_any();
    macro_rules! number {
        ($($ty:ty),+) => {
            $(
                if let Some(n) = any.downcast_ref::<$ty>() {
                    return Some(*n as f64);
                }
            )+
        };
    }
    number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
    None
}

fn as_str(value: &dyn Value) -> Option<&str> {
    let any = value.as_any();
    if let Some(s) = any.downcast_ref::<String>() {
        return Some(s.as_str());
    }
    any.downcast_ref::<&'static str>().copied()
}

/// A total order over keys: natural where the values are comparable, with a
/// stable fallback on `(type name, identity)` for incomparable pairs.
fn compare_keys(a: &dyn Value, b: &dyn Value) -> Ordering {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        if let Some(ordering) = x.partial_cmp(&y) {
            return ordering;
        }
    }
    if let (Some(x), Some(y)) = (as_str(a), as_str(b)) {
        return x.cmp(y);
    }
    if let (Some(x), Some(y)) = (
        a.as_any().downcast_ref::<bool>(),
        b.as_any().downcast_ref::<bool>(),
    ) {
        return x.cmp(y);
    }
    (a.short_type_name(), a.identity()).cmp(&(b.short_type_name(), b.identity()))
}

fn pretty_mapping(
    mapping: &Mapping,
    ctx: &PrettyContext,
    trailing_comment: Option<&str>,
) -> Doc {
    if ctx.depth_left == 0 {
        return concat(vec![lbrace(), ellipsis(), rbrace()]);
    }

    let pairs = &mapping.0;
    if pairs.len() > ctx.max_seq_len {
        let truncated = pairs.len() - ctx.max_seq_len;
        let truncation_comment = format!("...and {} more elements", truncated);
        let combined = match trailing_comment {
            Some(text) => format!("{}. {}", truncation_comment, text),
            None => truncation_comment,
        };
        // Render only the leading pairs; the comment names the rest.
        return pretty_mapping_pairs(&pairs[..ctx.max_seq_len], ctx, Some(&combined));
    }

    pretty_mapping_pairs(pairs, ctx, trailing_comment)
}

fn pretty_mapping_pairs(
    pairs: &[(Box<dyn Value>, Box<dyn Value>)],
    ctx: &PrettyContext,
    trailing_comment: Option<&str>,
) -> Doc {
    let mut has_comment = trailing_comment.is_some();

    let mut order: Vec<usize> = (0..pairs.len()).collect();
    if ctx.sort_mapping_keys {
        order.sort_by(|&a, &b| compare_keys(pairs[a].0.as_ref(), pairs[b].0.as_ref()));
    }

    struct Entry {
        kdoc: Doc,
        vdoc: Doc,
        kcomment: Option<String>,
        vcomment: Option<String>,
        pair_idx: usize,
    }

    let mut entries = Vec::with_capacity(order.len());
    for &pair_idx in &order {
        let (key, value) = &pairs[pair_idx];

        let kdoc = match string_like_key(key.as_ref(), ctx) {
            // String keys keep the full depth budget on purpose.
            Some(doc) => doc,
            None => pretty_value(key.as_ref(), &ctx.nested_call()),
        };
        let vdoc = pretty_value(
            value.as_ref(),
            &ctx.nested_call()
                .use_multiline_strategy(MultilineStrategy::Indented),
        );

        let kcomment = is_commented(&kdoc).map(str::to_owned);
        let kdoc = match &kcomment {
            Some(_) => {
                has_comment = true;
                commented_inner(&kdoc)
            }
            None => kdoc,
        };
        let vcomment = is_commented(&vdoc).map(str::to_owned);
        let vdoc = match &vcomment {
            Some(_) => {
                has_comment = true;
                commented_inner(&vdoc)
            }
            None => vdoc,
        };

        entries.push(Entry {
            kdoc,
            vdoc,
            kcomment,
            vcomment,
            pair_idx,
        });
    }

    let count = entries.len();
    let mut parts = Vec::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        let last = idx + 1 == count;
        let Entry {
            kdoc,
            vdoc,
            kcomment,
            vcomment,
            pair_idx,
        } = entry;

        if kcomment.is_none() && vcomment.is_none() {
            parts.push(concat(vec![
                kdoc,
                colon(),
                Doc::text(" "),
                vdoc,
                if last { Doc::nil() } else { comma() },
                if last { Doc::nil() } else { Doc::line() },
            ]));
            continue;
        }

        let kcommented = match kcomment {
            Some(text) => concat(vec![commentdoc(&text), Doc::hardline(), kdoc]),
            None => kdoc,
        };

        let vcommented = match vcomment {
            Some(text) => {
                // Flat: comment at the end of the line. Broken: comment on
                // its own line above the value, which is re-rendered with
                // the plain strategy since the indentation is already there.
                let replay = pretty_value(
                    pairs[pair_idx].1.as_ref(),
                    &ctx.nested_call()
                        .use_multiline_strategy(MultilineStrategy::Plain),
                );
                group(flat_choice(
                    nest(
                        ctx.indent,
                        concat(vec![
                            Doc::hardline(),
                            commentdoc(&text),
                            Doc::hardline(),
                            replay,
                            if last { Doc::nil() } else { comma() },
                            if last { Doc::nil() } else { Doc::hardline() },
                        ]),
                    ),
                    concat(vec![
                        vdoc,
                        if last { Doc::nil() } else { comma() },
                        Doc::text("  "),
                        commentdoc(&text),
                        if last { Doc::nil() } else { Doc::hardline() },
                    ]),
                ))
            }
            None => concat(vec![
                vdoc,
                if last { Doc::nil() } else { comma() },
                if last { Doc::nil() } else { Doc::line() },
            ]),
        };

        parts.push(concat(vec![kcommented, colon(), Doc::text(" "), vcommented]));
    }

    if let Some(text) = trailing_comment {
        parts.push(concat(vec![Doc::hardline(), commentdoc(text)]));
    }

    let body = bracket(ctx, lbrace(), concat(parts), rbrace());
    if count > 2 || has_comment {
        always_break(body)
    } else {
        group(body)
    }
}

/// Registers the built-in printers.
pub(crate) fn install(registry: &mut Registry) {
    macro_rules! int_printers {
        ($($ty:ty),+) => {
            $(
                registry.insert_plain::<$ty, _>(|value, ctx| {
                    if ctx.depth_left == 0 {
                        return Ok(type_placeholder(Value::short_type_name(value)));
                    }
                    Ok(annotate(Token::NumberInt, Doc::text(value.to_string())))
                });
            )+
        };
    }
    int_printers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

    macro_rules! float_printers {
        ($($ty:ty => $name:literal),+) => {
            $(
                registry.insert_plain::<$ty, _>(|value, ctx| {
                    if ctx.depth_left == 0 {
                        return Ok(type_placeholder(Value::short_type_name(value)));
                    }
                    let doc = if value.is_infinite() {
                        if *value > 0.0 {
                            builtin_identifier(concat!($name, "::INFINITY"))
                        } else {
                            builtin_identifier(concat!($name, "::NEG_INFINITY"))
                        }
                    } else if value.is_nan() {
                        builtin_identifier(concat!($name, "::NAN"))
                    } else {
                        annotate(Token::NumberFloat, Doc::text(format!("{:?}", value)))
                    };
                    Ok(doc)
                });
            )+
        };
    }
    float_printers!(f32 => "f32", f64 => "f64");

    registry.insert_plain::<bool, _>(|value, _ctx| {
        Ok(annotate(
            Token::KeywordConstant,
            Doc::text(if *value { "true" } else { "false" }),
        ))
    });

    registry.insert_plain::<(), _>(|_value, _ctx| {
        Ok(annotate(Token::KeywordConstant, Doc::text("()")))
    });

    registry.insert_plain::<String, _>(|value, ctx| Ok(pretty_str(value, ctx)));
    registry.insert_plain::<&'static str, _>(|value, ctx| Ok(pretty_str(value, ctx)));
    registry.insert_plain::<Bytes, _>(|value, ctx| Ok(pretty_bytes(&value.0, ctx)));

    registry.insert_with_trailing::<List, _>(|value, ctx, trailing| {
        Ok(pretty_seq(SeqKind::List, &value.0, ctx, trailing))
    });
    registry.insert_with_trailing::<Tuple, _>(|value, ctx, trailing| {
        Ok(pretty_seq(SeqKind::Tuple, &value.0, ctx, trailing))
    });
    registry.insert_with_trailing::<Set, _>(|value, ctx, trailing| {
        Ok(pretty_seq(SeqKind::Set, &value.0, ctx, trailing))
    });

    registry.insert_with_trailing::<Mapping, _>(|value, ctx, trailing| {
        Ok(pretty_mapping(value, ctx, trailing))
    });

    registry.insert_plain::<Shared, _>(|value, ctx| {
        let inner = value.borrow();
        Ok(pretty_value(inner.as_ref(), ctx))
    });
}
