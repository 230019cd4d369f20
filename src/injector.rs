//! Type-keyed dependency injection registry.
//!
//! Maps a type identity to a factory that produces a value from server-side
//! context rather than from client input. The registry is populated during
//! single-threaded setup, before any request is dispatched, and read-only
//! afterwards; each binder snapshots the factory handles it needs at build
//! time, so late additions only affect handlers registered afterwards. This
//! ordering requirement is deliberate: injector registration is setup-time
//! configuration, not a runtime facility.

use crate::context::RequestContext;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased dependency factory: `(request context) -> value`.
///
/// Factories are infallible by contract. A panicking factory is a
/// programming error and surfaces through the dispatch adapter's panic
/// recovery, not as a client-visible validation failure.
pub type InjectorFn = Arc<dyn Fn(&RequestContext) -> Box<dyn Any + Send> + Send + Sync>;

struct Entry {
    type_name: &'static str,
    factory: InjectorFn,
}

/// Registry of dependency factories keyed by `TypeId`.
///
/// Carries one builtin entry: [`RequestContext`] itself maps to an identity
/// (clone) factory, so a handler can declare the raw context as a parameter
/// and receive it unchanged.
pub struct TypeInjectorRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl TypeInjectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
        };
        registry.add::<RequestContext>(|ctx| ctx.clone());
        registry
    }

    /// Register a factory for type `T`. Replaces any previous entry for `T`.
    pub fn add<T: Send + 'static>(
        &mut self,
        factory: impl Fn(&RequestContext) -> T + Send + Sync + 'static,
    ) {
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: std::any::type_name::<T>(),
                factory: Arc::new(move |ctx| Box::new(factory(ctx))),
            },
        );
    }

    /// Look up the factory for a type identity, if one is registered.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<InjectorFn> {
        self.entries.get(&id).map(|e| Arc::clone(&e.factory))
    }

    #[must_use]
    pub fn contains(&self, id: TypeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Registered type name for diagnostics.
    #[must_use]
    pub fn type_name(&self, id: TypeId) -> Option<&'static str> {
        self.entries.get(&id).map(|e| e.type_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeInjectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
