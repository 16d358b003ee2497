//! Dispatching a value to its printer.

use std::collections::HashSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::context::PrettyContext;
use crate::doc::{comment_doc, concat, flat_choice, group, Doc, Width};
use crate::layout::{layout_smart, BestLayout};
use crate::printers::{commentdoc, is_commented};
use crate::registry::{resolve, Printer};
use crate::value::{Commented, TrailingCommented, Value};

/// Options for the formatting entry points.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Spaces added per nesting level.
    pub indent: Width,
    /// Soft maximum number of columns per output line.
    pub width: Width,
    /// Soft maximum number of columns per line after indentation.
    pub ribbon_width: Width,
    /// Maximum nesting depth to print, `None` for unbounded.
    pub depth: Option<usize>,
    /// Containers longer than this are truncated.
    pub max_seq_len: usize,
    /// Whether mapping keys are sorted.
    pub sort_mapping_keys: bool,
}

impl Default for PrettyConfig {
    fn default() -> PrettyConfig {
        PrettyConfig {
            indent: 4,
            width: 79,
            ribbon_width: 71,
            depth: None,
            max_seq_len: 1000,
            sort_mapping_keys: false,
        }
    }
}

/// Strips comment wrappers off a value, keeping the innermost comment of
/// each kind.
pub(crate) fn unwrap_comments<'a>(
    mut value: &'a dyn Value,
) -> (&'a dyn Value, Option<&'a str>, Option<&'a str>) {
    let mut comment = None;
    let mut trailing_comment = None;

    loop {
        if let Some(commented) = value.as_any().downcast_ref::<Commented>() {
            comment = Some(commented.comment.as_str());
            value = commented.value.as_ref();
        } else if let Some(trailing) = value.as_any().downcast_ref::<TrailingCommented>() {
            trailing_comment = Some(trailing.comment.as_str());
            value = trailing.value.as_ref();
        } else {
            return (value, comment, trailing_comment);
        }
    }
}

static WARNED: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn warn_once(key: String, message: impl FnOnce() -> String) {
    let mut warned = WARNED.lock().expect("warning set poisoned");
    if warned.insert(key) {
        tracing::warn!("{}", message());
    }
}

fn fallback_doc(value: &dyn Value) -> Doc {
    Doc::text(format!("{:?}", value))
}

fn recursion_placeholder(value: &dyn Value) -> Doc {
    Doc::text(format!(
        "<Recursion on {} with id={}>",
        value.short_type_name(),
        value.identity()
    ))
}

/// Produces the Doc for a value: unwraps comment annotations, detects
/// recursion, finds a printer and runs it, and re-attaches any comment as a
/// Doc annotation for the parent printer to place.
///
/// This never fails: a printer error is reported once per type as a warning
/// and replaced by the value's `Debug` representation.
pub fn pretty_value(value: &dyn Value, ctx: &PrettyContext) -> Doc {
    let (value, comment, trailing_comment) = unwrap_comments(value);
    let doc = run_printer(value, ctx, trailing_comment);
    match comment {
        Some(text) => comment_doc(doc, text),
        None => doc,
    }
}

fn run_printer(value: &dyn Value, ctx: &PrettyContext, trailing_comment: Option<&str>) -> Doc {
    if ctx.is_visited(value) {
        return recursion_placeholder(value);
    }
    let _guard = ctx.start_visit(value);

    let result = match resolve(value) {
        Some(Printer::WithTrailing(printer)) => printer(value, ctx, trailing_comment),
        Some(Printer::Plain(printer)) => {
            if trailing_comment.is_some() {
                warn_once(format!("trailing:{}", value.type_name()), || {
                    format!(
                        "the pretty printer for {} does not support rendering trailing \
                         comments; the comment will not show up in output",
                        value.type_name()
                    )
                });
            }
            printer(value, ctx)
        }
        None => Ok(fallback_doc(value)),
    };

    match result {
        Ok(doc) => doc,
        Err(error) => {
            warn_once(format!("failed:{}", value.type_name()), || {
                format!(
                    "the pretty printer for {} failed ({}); falling back to the debug \
                     representation",
                    value.type_name(),
                    error
                )
            });
            fallback_doc(value)
        }
    }
}

/// Converts a value into a lazy stream of [`SDoc`]s, the input to the
/// renderers. Consumable once.
///
/// Out-of-range options are clamped: `width` to at least 1, `ribbon_width`
/// into `[1, width]`, `max_seq_len` to at least 1, `indent` to at least 0.
///
/// [`SDoc`]: crate::sdoc::SDoc
pub fn value_to_sdocs(value: &dyn Value, config: &PrettyConfig) -> BestLayout {
    let width = config.width.max(1);
    let ribbon_width = config.ribbon_width.max(1).min(width);
    let depth = config.depth.unwrap_or(usize::MAX);

    let ctx = PrettyContext::new(
        config.indent.max(0),
        depth,
        config.max_seq_len.max(1),
        config.sort_mapping_keys,
    );
    let doc = pretty_value(value, &ctx);

    // A comment on the top-level value has no parent printer to place it;
    // it goes on the same line if it fits, else on the line above.
    let top_comment = is_commented(&doc).map(str::to_owned);
    let doc = match top_comment {
        Some(text) => group(flat_choice(
            concat(vec![commentdoc(&text), Doc::hardline(), doc.clone()]),
            concat(vec![doc, Doc::text("  "), commentdoc(&text)]),
        )),
        None => doc,
    };

    let ribbon_frac = (ribbon_width as f64 / width as f64).min(1.0);
    layout_smart(&doc, width, ribbon_frac)
}
