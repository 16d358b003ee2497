//! The process-wide printer registry.
//!
//! Three registries are consulted in order for a value with no exact match:
//! the type-keyed registry, the deferred (name-keyed) registry, and the
//! predicate registry. Deferred entries are promoted into the type-keyed
//! registry the first time a value of the named type is encountered.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::context::PrettyContext;
use crate::doc::Doc;
use crate::value::Value;

/// An error produced by a printer. The dispatcher downgrades these to a
/// warning plus a fallback rendering, so printing never fails the caller.
#[derive(Debug, Error)]
pub enum PrettyError {
    #[error("{0}")]
    Printer(String),
    #[error("printer was invoked with a value of an unexpected type")]
    TypeMismatch,
}

impl PrettyError {
    pub fn new(message: impl Into<String>) -> PrettyError {
        PrettyError::Printer(message.into())
    }
}

/// An error in how the registry was used. Unlike printer errors these fail
/// loudly, at the call that misused the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("register_deferred requires check_deferred")]
    RegisterDeferredWithoutCheck,
}

pub type PrinterResult = Result<Doc, PrettyError>;

type PlainFn = Arc<dyn Fn(&dyn Value, &PrettyContext) -> PrinterResult + Send + Sync>;
type TrailingFn =
    Arc<dyn Fn(&dyn Value, &PrettyContext, Option<&str>) -> PrinterResult + Send + Sync>;
type PredicateFn = Arc<dyn Fn(&dyn Value) -> bool + Send + Sync>;

/// A registered printer, tagged with whether it accepts a trailing comment.
/// The tag is declared at registration; the dispatcher uses it to decide
/// how to call the printer, instead of probing its signature.
#[derive(Clone)]
pub(crate) enum Printer {
    Plain(PlainFn),
    WithTrailing(TrailingFn),
}

struct Registration {
    printer: Printer,
}

pub(crate) struct Registry {
    by_type: HashMap<TypeId, Registration>,
    /// Qualified names of the types in `by_type`, for ancestor lookups.
    by_name: HashMap<&'static str, TypeId>,
    deferred: HashMap<String, Printer>,
    predicates: Vec<(PredicateFn, Printer)>,
}

impl Registry {
    fn new() -> Registry {
        Registry {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            deferred: HashMap::new(),
            predicates: Vec::new(),
        }
    }

    fn with_builtins() -> Registry {
        let mut registry = Registry::new();
        crate::printers::install(&mut registry);
        registry
    }

    pub(crate) fn insert<T: Value>(&mut self, printer: Printer) {
        self.by_type
            .insert(TypeId::of::<T>(), Registration { printer });
        self.by_name
            .insert(std::any::type_name::<T>(), TypeId::of::<T>());
    }

    pub(crate) fn insert_plain<T, F>(&mut self, printer: F)
    where
        T: Value,
        F: Fn(&T, &PrettyContext) -> PrinterResult + Send + Sync + 'static,
    {
        self.insert::<T>(wrap_plain::<T, F>(printer));
    }

    pub(crate) fn insert_with_trailing<T, F>(&mut self, printer: F)
    where
        T: Value,
        F: Fn(&T, &PrettyContext, Option<&str>) -> PrinterResult + Send + Sync + 'static,
    {
        self.insert::<T>(wrap_trailing::<T, F>(printer));
    }
}

fn wrap_plain<T, F>(printer: F) -> Printer
where
    T: Value,
    F: Fn(&T, &PrettyContext) -> PrinterResult + Send + Sync + 'static,
{
    Printer::Plain(Arc::new(move |value, ctx| {
        let concrete = value
            .as_any()
            .downcast_ref::<T>()
            .ok_or(PrettyError::TypeMismatch)?;
        printer(concrete, ctx)
    }))
}

fn wrap_trailing<T, F>(printer: F) -> Printer
where
    T: Value,
    F: Fn(&T, &PrettyContext, Option<&str>) -> PrinterResult + Send + Sync + 'static,
{
    Printer::WithTrailing(Arc::new(move |value, ctx, trailing| {
        let concrete = value
            .as_any()
            .downcast_ref::<T>()
            .ok_or(PrettyError::TypeMismatch)?;
        printer(concrete, ctx, trailing)
    }))
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::with_builtins()));

fn read_registry() -> RwLockReadGuard<'static, Registry> {
    REGISTRY.read().expect("printer registry poisoned")
}

fn write_registry() -> RwLockWriteGuard<'static, Registry> {
    REGISTRY.write().expect("printer registry poisoned")
}

/// Registers `printer` for values of type `T`.
pub fn register_pretty<T, F>(printer: F)
where
    T: Value,
    F: Fn(&T, &PrettyContext) -> PrinterResult + Send + Sync + 'static,
{
    write_registry().insert_plain::<T, F>(printer);
}

/// Registers `printer` for values of type `T`, declaring that it renders a
/// trailing comment when one is passed.
pub fn register_pretty_with_trailing<T, F>(printer: F)
where
    T: Value,
    F: Fn(&T, &PrettyContext, Option<&str>) -> PrinterResult + Send + Sync + 'static,
{
    write_registry().insert_with_trailing::<T, F>(printer);
}

/// Registers `printer` for the type with the given fully qualified name.
/// The entry is resolved against a concrete type the first time a value of
/// that type is encountered.
pub fn register_pretty_deferred<F>(name: impl Into<String>, printer: F)
where
    F: Fn(&dyn Value, &PrettyContext) -> PrinterResult + Send + Sync + 'static,
{
    write_registry()
        .deferred
        .insert(name.into(), Printer::Plain(Arc::new(printer)));
}

/// Registers a `(predicate, printer)` pair, tried in registration order for
/// values whose type has no registered printer.
pub fn register_pretty_predicate<P, F>(predicate: P, printer: F)
where
    P: Fn(&dyn Value) -> bool + Send + Sync + 'static,
    F: Fn(&dyn Value, &PrettyContext) -> PrinterResult + Send + Sync + 'static,
{
    write_registry()
        .predicates
        .push((Arc::new(predicate), Printer::Plain(Arc::new(printer))));
}

/// Reports whether a printer is registered for `T`.
///
/// With `check_deferred`, deferred entries under `T`'s qualified name count;
/// with `register_deferred` as well, such an entry is promoted into the
/// type-keyed registry. With `check_superclasses`, `T`'s ancestor chain is
/// also consulted.
pub fn is_registered<T: Value>(
    check_superclasses: bool,
    check_deferred: bool,
    register_deferred: bool,
) -> Result<bool, RegistryError> {
    if register_deferred && !check_deferred {
        return Err(RegistryError::RegisterDeferredWithoutCheck);
    }

    let type_id = TypeId::of::<T>();
    let name = std::any::type_name::<T>();

    if read_registry().by_type.contains_key(&type_id) {
        return Ok(true);
    }

    if check_deferred {
        let mut registry = write_registry();
        if registry.deferred.contains_key(name) {
            if register_deferred {
                let printer = registry.deferred.remove(name).unwrap();
                registry.insert::<T>(printer);
            }
            return Ok(true);
        }
    }

    if !check_superclasses {
        return Ok(false);
    }

    for ancestor in T::ancestor_names() {
        let registry = read_registry();
        if registry.by_name.contains_key(ancestor) {
            return Ok(true);
        }
        if check_deferred {
            if let Some(printer) = registry.deferred.get(*ancestor) {
                let printer = printer.clone();
                drop(registry);
                if register_deferred {
                    // Cached under the concrete type; the named entry stays
                    // for sibling types.
                    write_registry().insert::<T>(printer);
                }
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Finds the printer for `value`: exact type, then deferred entry under its
/// qualified name, then its ancestor chain, then the predicate registry.
/// `None` means the caller falls back to the default representation.
pub(crate) fn resolve(value: &dyn Value) -> Option<Printer> {
    let type_id = value.as_any().type_id();

    if let Some(registration) = read_registry().by_type.get(&type_id) {
        return Some(registration.printer.clone());
    }

    if read_registry().deferred.contains_key(value.type_name()) {
        let mut registry = write_registry();
        if let Some(printer) = registry.deferred.remove(value.type_name()) {
            registry.by_type.insert(
                type_id,
                Registration {
                    printer: printer.clone(),
                },
            );
            registry.by_name.insert(value.type_name(), type_id);
            return Some(printer);
        }
        // Promoted by another thread between the two lock acquisitions.
        if let Some(registration) = registry.by_type.get(&type_id) {
            return Some(registration.printer.clone());
        }
    }

    for ancestor in value.ancestors() {
        let registry = read_registry();
        if let Some(ancestor_id) = registry.by_name.get(ancestor) {
            if let Some(registration) = registry.by_type.get(ancestor_id) {
                return Some(registration.printer.clone());
            }
        }
        if let Some(printer) = registry.deferred.get(*ancestor) {
            let printer = printer.clone();
            drop(registry);
            write_registry().by_type.insert(
                type_id,
                Registration {
                    printer: printer.clone(),
                },
            );
            return Some(printer);
        }
    }

    let registry = read_registry();
    for (predicate, printer) in &registry.predicates {
        if predicate(value) {
            return Some(printer.clone());
        }
    }

    None
}
