//! Resolved argument set handed to a handler.

use serde_json::Value;
use std::any::Any;
use std::fmt;

/// One resolved argument value: either a coerced scalar extracted from the
/// request, or a type-erased value produced by a dependency injector.
pub enum ArgValue {
    Extracted(Value),
    Injected(Box<dyn Any + Send>),
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Extracted(v) => f.debug_tuple("Extracted").field(v).finish(),
            ArgValue::Injected(_) => f.write_str("Injected(..)"),
        }
    }
}

/// Ordered name → value mapping produced by one `resolve` pass.
///
/// Preserves the declaration order of the handler signature. Optional
/// parameters that resolved to nothing are present with a `null` value, so
/// a handler always sees every declared name.
#[derive(Debug, Default)]
pub struct ResolvedArgs {
    values: Vec<(String, ArgValue)>,
}

impl ResolvedArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String, value: ArgValue) {
        self.values.push((name, value));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Declared parameter names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The extracted scalar for `name`, if it was an extracted parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            ArgValue::Extracted(v) => Some(v),
            ArgValue::Injected(_) => None,
        }
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.value(name)?.as_str()
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.value(name)?.as_i64()
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.value(name)?.as_f64()
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.value(name)?.as_bool()
    }

    /// True if `name` resolved to `null` (an optional parameter with no
    /// source value and no default).
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.value(name), Some(Value::Null))
    }

    /// Borrow an injected dependency of type `T`.
    #[must_use]
    pub fn injected<T: 'static>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            ArgValue::Injected(boxed) => boxed.downcast_ref::<T>(),
            ArgValue::Extracted(_) => None,
        }
    }

    /// Remove and return an injected dependency of type `T` by value.
    pub fn take_injected<T: 'static>(&mut self, name: &str) -> Option<T> {
        let idx = self.values.iter().position(|(n, v)| {
            n == name && matches!(v, ArgValue::Injected(b) if b.is::<T>())
        })?;
        match self.values.remove(idx).1 {
            ArgValue::Injected(boxed) => boxed.downcast::<T>().ok().map(|b| *b),
            ArgValue::Extracted(_) => None,
        }
    }

    /// Snapshot of all extracted scalars, keyed by name. Injected values are
    /// skipped. Useful for comparing two resolution passes.
    #[must_use]
    pub fn extracted_map(&self) -> serde_json::Map<String, Value> {
        self.values
            .iter()
            .filter_map(|(n, v)| match v {
                ArgValue::Extracted(val) => Some((n.clone(), val.clone())),
                ArgValue::Injected(_) => None,
            })
            .collect()
    }
}
