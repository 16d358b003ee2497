//! A pretty printer for structured values. Given a value and a width
//! budget, it produces a human-readable, optionally syntax-colored
//! rendering that fits on one line when possible and breaks consistently
//! when it does not.
//!
//! The combinators are in the tradition of Wadler's
//! [prettier printer](http://homepages.inf.ed.ac.uk/wadler/papers/prettier/prettier.pdf)
//! and the strict-evaluation variant from Lindig's *Strictly Pretty*, with
//! extensions for annotations, fill layout, context-dependent docs, and a
//! ribbon width.
//!
//! # Usage
//!
//! Values that implement [`Value`] are printed through a registry of
//! printers, with builtins covering numbers, strings, byte strings, and the
//! container types in this crate:
//!
//! ```
//! use pretty_any::{boxed, pformat, List, Mapping};
//!
//! let value = Mapping(vec![(
//!     boxed("lorem"),
//!     boxed(List(vec![boxed(1i64), boxed(2i64)])),
//! )]);
//! assert_eq!(pformat(&value), "{'lorem': [1, 2]}");
//! ```
//!
//! Printers for your own types are registered with [`register_pretty`]:
//!
//! ```
//! use pretty_any::{pformat, pretty_call, reflect_value, register_pretty};
//!
//! #[derive(Debug)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//! reflect_value!(Point);
//!
//! register_pretty::<Point, _>(|point, ctx| {
//!     Ok(pretty_call(ctx, "Point", &[&point.x, &point.y], &[]))
//! });
//! let point = Point { x: 1, y: 2 };
//! assert_eq!(pformat(&point), "Point(1, 2)");
//! ```
//!
//! # Pipeline
//!
//! Formatting runs in three stages, each usable on its own:
//!
//! - [`value_to_sdocs`] dispatches the value to printers, producing a
//!   [`Doc`] — the set of all legal layouts — and lazily lays it out into a
//!   stream of [`SDoc`]s under the configured width and ribbon budgets;
//! - [`render_to_stream`] writes the stream to a sink, plain;
//! - [`colored_render_to_stream`] writes it with ANSI colors, mapping
//!   syntax tokens to styles through a [`Theme`].
//!
//! [`pformat`] and friends bundle the stages for the common cases.

mod color;
mod context;
mod dispatch;
mod doc;
mod layout;
mod printers;
mod registry;
mod render;
mod sdoc;
mod strings;
mod syntax;
mod value;

pub use color::{colored_render_to_stream, colored_render_to_string, Rgb, Theme, TokenStyle};
pub use context::{MultilineStrategy, PrettyContext};
pub use dispatch::{pretty_value, value_to_sdocs, PrettyConfig};
pub use doc::{
    align, always_break, annotate, comment_doc, concat, contextual, fill, flat_choice, group,
    hang, intersperse, nest, Annotation, Doc, LayoutInfo, Width,
};
pub use layout::{layout_fast, layout_smart, BestLayout};
pub use printers::{
    bracket, build_fncall, builtin_identifier, commentdoc, identifier, keyword_arg, pretty_call,
    sequence_of_docs, FnCall,
};
pub use registry::{
    is_registered, register_pretty, register_pretty_deferred, register_pretty_predicate,
    register_pretty_with_trailing, PrettyError, PrinterResult, RegistryError,
};
pub use render::{render_to_stream, render_to_string};
pub use sdoc::SDoc;
pub use syntax::Token;
pub use value::{
    boxed, Bytes, Commented, List, Mapping, Set, Shared, TrailingCommented, Tuple, Value,
};

/// Formats a value to a string with the default configuration.
pub fn pformat(value: &dyn Value) -> String {
    pformat_with(value, &PrettyConfig::default())
}

/// Formats a value to a string.
pub fn pformat_with(value: &dyn Value, config: &PrettyConfig) -> String {
    render_to_string(value_to_sdocs(value, config))
}

/// Formats a value to a string with ANSI coloring.
pub fn pformat_colored(value: &dyn Value, config: &PrettyConfig, theme: &Theme) -> String {
    colored_render_to_string(value_to_sdocs(value, config), theme)
}
