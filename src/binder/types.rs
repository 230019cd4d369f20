//! Statically-described handler signatures.
//!
//! Instead of inspecting a live callable at runtime, the handler author
//! declares the parameter list through [`HandlerSignature`] at registration
//! time. The declaration is deliberately loose enough to express malformed
//! shapes (bare types, doubly wrapped optionals): the binder validates the
//! whole signature eagerly and reports every problem at once.

use serde_json::Value;
use std::any::TypeId;

/// The scalar (or injected) type a parameter's value must end up as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// UTF-8 string, passed through unchanged
    Str,
    /// Signed 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// Boolean (`true`/`false`)
    Bool,
    /// A server-side type supplied by a dependency injector, never by
    /// client input
    Injected {
        id: TypeId,
        name: &'static str,
    },
}

impl TargetType {
    /// Declare a dependency-injected target of type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        TargetType::Injected {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Stable type identity used for injector registry lookups. Scalars map
    /// to their Rust carrier types so an injector registered for e.g.
    /// `String` takes precedence over extraction, uniformly with custom
    /// types.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        match self {
            TargetType::Str => TypeId::of::<String>(),
            TargetType::Int => TypeId::of::<i64>(),
            TargetType::Float => TypeId::of::<f64>(),
            TargetType::Bool => TypeId::of::<bool>(),
            TargetType::Injected { id, .. } => *id,
        }
    }

    /// Human-readable name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TargetType::Str => "str",
            TargetType::Int => "int",
            TargetType::Float => "float",
            TargetType::Bool => "bool",
            TargetType::Injected { name, .. } => name,
        }
    }

    /// True for targets a raw request string can be coerced into.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, TargetType::Injected { .. })
    }
}

/// Validation/description metadata attached to a type. Opaque to the binder:
/// it is carried on the built parameter spec but never interpreted by the
/// resolution machinery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintMeta {
    pub description: Option<String>,
}

impl ConstraintMeta {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn describe(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }
}

/// A declared type expression, resolved exactly once at registration time
/// into a tagged direct/optional decision (never re-interpreted per
/// request).
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A bare type with no attached metadata. Only acceptable when the type
    /// has an injector registry entry.
    Named(TargetType),
    /// A type paired with validation metadata.
    Annotated(TargetType, ConstraintMeta),
    /// Optional wrapper; at most one level is accepted.
    Optional(Box<TypeExpr>),
}

impl TypeExpr {
    #[must_use]
    pub fn named(target: TargetType) -> Self {
        TypeExpr::Named(target)
    }

    #[must_use]
    pub fn annotated(target: TargetType, meta: ConstraintMeta) -> Self {
        TypeExpr::Annotated(target, meta)
    }

    #[must_use]
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Optional(Box::new(inner))
    }
}

/// One declared handler parameter: name, type expression, optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub default: Option<Value>,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    /// Attach a declared default, used when no extraction source yields a
    /// value. Checked against the target type when the binder is built.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A handler's declared parameter list, built once and handed to
/// registration.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerSignature {
    pub name: String,
    pub params: Vec<ParamDecl>,
}

impl HandlerSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, decl: ParamDecl) -> Self {
        self.params.push(decl);
        self
    }
}
