//! The context threaded through printers.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::doc::Width;
use crate::value::Value;

/// How a value that must span multiple lines is framed, decided by the
/// printer of the enclosing construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultilineStrategy {
    /// Lines at the current indentation. For top level values.
    Plain,
    /// Lines wrapped in parentheses. For mapping keys.
    Parens,
    /// Lines indented one level, no delimiters. For mapping values.
    Indented,
    /// First line in place, following lines indented. For sequence elements.
    Hang,
}

/// Context passed to every printer.
///
/// Treated as an immutable record with functional update: the `use_*` and
/// [`assoc`](PrettyContext::assoc) methods return a modified copy. The one
/// deliberately shared piece of state is the visit set used for recursion
/// detection, which all clones of a context reference together.
#[derive(Clone)]
pub struct PrettyContext {
    /// Spaces added per nesting level.
    pub indent: Width,
    /// Remaining nesting budget; zero means printers must emit a
    /// placeholder instead of recursing. `usize::MAX` means unbounded.
    pub depth_left: usize,
    /// How a multi-line rendering of the current value should be framed.
    pub multiline_strategy: MultilineStrategy,
    /// Containers longer than this are truncated.
    pub max_seq_len: usize,
    /// Whether mapping printers sort their keys.
    pub sort_mapping_keys: bool,
    visited: Rc<RefCell<HashSet<usize>>>,
    user_ctx: Rc<HashMap<String, Rc<dyn Any>>>,
}

impl PrettyContext {
    pub fn new(
        indent: Width,
        depth_left: usize,
        max_seq_len: usize,
        sort_mapping_keys: bool,
    ) -> PrettyContext {
        PrettyContext {
            indent,
            depth_left,
            multiline_strategy: MultilineStrategy::Plain,
            max_seq_len,
            sort_mapping_keys,
            visited: Rc::new(RefCell::new(HashSet::new())),
            user_ctx: Rc::new(HashMap::new()),
        }
    }

    /// The context for printing a nested value: one level of depth budget
    /// is spent.
    pub fn nested_call(&self) -> PrettyContext {
        let mut ctx = self.clone();
        ctx.depth_left = ctx.depth_left.saturating_sub(1);
        ctx
    }

    pub fn use_multiline_strategy(&self, strategy: MultilineStrategy) -> PrettyContext {
        let mut ctx = self.clone();
        ctx.multiline_strategy = strategy;
        ctx
    }

    /// Returns a context with `key` set to `value` in the user map, for
    /// printer-to-printer communication. The map is copied; other clones of
    /// this context are unaffected.
    pub fn assoc(&self, key: impl Into<String>, value: Rc<dyn Any>) -> PrettyContext {
        let mut ctx = self.clone();
        let mut user_ctx: HashMap<String, Rc<dyn Any>> = (*ctx.user_ctx).clone();
        user_ctx.insert(key.into(), value);
        ctx.user_ctx = Rc::new(user_ctx);
        ctx
    }

    /// Looks up a value stored with [`assoc`](PrettyContext::assoc).
    pub fn get<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        let value = self.user_ctx.get(key)?.clone();
        value.downcast::<T>().ok()
    }

    pub(crate) fn is_visited(&self, value: &dyn Value) -> bool {
        self.visited.borrow().contains(&value.identity())
    }

    /// Marks `value` as being on the recursion stack. The returned guard
    /// unmarks it when dropped, on every exit path.
    pub(crate) fn start_visit(&self, value: &dyn Value) -> VisitGuard {
        let id = value.identity();
        self.visited.borrow_mut().insert(id);
        VisitGuard {
            visited: self.visited.clone(),
            id,
        }
    }
}

pub(crate) struct VisitGuard {
    visited: Rc<RefCell<HashSet<usize>>>,
    id: usize,
}

impl Drop for VisitGuard {
    fn drop(&mut self) {
        self.visited.borrow_mut().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_call_spends_depth() {
        let ctx = PrettyContext::new(4, 2, 1000, false);
        assert_eq!(ctx.nested_call().depth_left, 1);
        assert_eq!(ctx.nested_call().nested_call().nested_call().depth_left, 0);
    }

    #[test]
    fn visit_guard_unmarks_on_drop() {
        let ctx = PrettyContext::new(4, usize::MAX, 1000, false);
        let value = 7i64;
        {
            let _guard = ctx.start_visit(&value);
            assert!(ctx.is_visited(&value));
        }
        assert!(!ctx.is_visited(&value));
    }

    #[test]
    fn visited_is_shared_across_clones() {
        let ctx = PrettyContext::new(4, usize::MAX, 1000, false);
        let nested = ctx.nested_call();
        let value = 7i64;
        let _guard = ctx.start_visit(&value);
        assert!(nested.is_visited(&value));
    }

    #[test]
    fn assoc_does_not_leak_into_parent() {
        let ctx = PrettyContext::new(4, usize::MAX, 1000, false);
        let child = ctx.assoc("key", Rc::new(5usize));
        assert_eq!(child.get::<usize>("key").as_deref(), Some(&5));
        assert!(ctx.get::<usize>("key").is_none());
    }
}
