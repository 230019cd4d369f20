//! Argument binder core: registration-time structural validation,
//! request-time value resolution.
//!
//! The binder is the two-checkpoint half of this crate's central design:
//! every structural problem in a handler signature surfaces once at build
//! time, and every per-request value problem surfaces once at resolve time.
//! Both checkpoints run all parameters to completion and aggregate their
//! failures instead of stopping at the first.

use crate::binder::args::{ArgValue, ResolvedArgs};
use crate::binder::types::{ConstraintMeta, HandlerSignature, ParamDecl, TargetType, TypeExpr};
use crate::context::RequestContext;
use crate::error::{ParamError, SignatureError, ValidationErrors};
use crate::injector::{InjectorFn, TypeInjectorRegistry};
use serde_json::Value;
use std::fmt;

/// An ordered extraction source consulted for a parameter's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Path-captured value from the external matcher
    Path,
    /// Query string value
    Query,
}

impl Source {
    #[inline]
    fn lookup<'a>(&self, ctx: &'a RequestContext, name: &str) -> Option<&'a str> {
        match self {
            Source::Path => ctx.get_path_param(name),
            Source::Query => ctx.get_query_param(name),
        }
    }
}

/// Fixed source precedence for extracted parameters: path first, query
/// second.
const EXTRACT_SOURCES: [Source; 2] = [Source::Path, Source::Query];

/// Per-parameter resolution strategy, decided exactly once at build time.
#[derive(Clone)]
pub enum Resolution {
    /// Value comes from a dependency factory; request sources and coercion
    /// are bypassed entirely.
    Inject(InjectorFn),
    /// Value is extracted from the request and coerced to the target type.
    Extract { sources: Vec<Source> },
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Inject(_) => f.write_str("Inject(..)"),
            Resolution::Extract { sources } => {
                f.debug_struct("Extract").field("sources", sources).finish()
            }
        }
    }
}

/// One handler parameter with its frozen resolution strategy. Built once,
/// immutable thereafter, owned by the binder that created it.
pub struct ParamSpec {
    pub name: String,
    pub target: TargetType,
    pub optional: bool,
    pub default: Option<Value>,
    pub meta: Option<ConstraintMeta>,
    pub resolution: Resolution,
}

/// Per-handler resolver mapping parameter names to resolution strategies.
///
/// One binder per registered handler; it is built once at registration and
/// reused, immutably, for every subsequent request to that handler.
pub struct ArgBinder {
    handler: String,
    specs: Vec<ParamSpec>,
}

impl ArgBinder {
    /// Build a binder from a declared signature and the current injector
    /// registry snapshot.
    ///
    /// Validates every parameter eagerly; if any are malformed the build
    /// fails once with the full list of offending parameters.
    pub fn build(
        signature: &HandlerSignature,
        registry: &TypeInjectorRegistry,
    ) -> Result<ArgBinder, SignatureError> {
        let mut specs = Vec::with_capacity(signature.params.len());
        let mut errors = Vec::new();

        for decl in &signature.params {
            if specs.iter().any(|s: &ParamSpec| s.name == decl.name) {
                errors.push(ParamError::new(&decl.name, "duplicate parameter name"));
                continue;
            }
            match Self::build_spec(decl, registry) {
                Ok(spec) => specs.push(spec),
                Err(message) => errors.push(ParamError::new(&decl.name, message)),
            }
        }

        if !errors.is_empty() {
            return Err(SignatureError::new(&signature.name, errors));
        }

        Ok(ArgBinder {
            handler: signature.name.clone(),
            specs,
        })
    }

    fn build_spec(decl: &ParamDecl, registry: &TypeInjectorRegistry) -> Result<ParamSpec, String> {
        let (target, meta, optional) = match &decl.ty {
            TypeExpr::Optional(inner) => match inner.as_ref() {
                TypeExpr::Optional(_) => return Err("doubly wrapped optional".to_string()),
                TypeExpr::Annotated(t, m) => (t.clone(), Some(m.clone()), true),
                TypeExpr::Named(t) => (t.clone(), None, true),
            },
            TypeExpr::Annotated(t, m) => (t.clone(), Some(m.clone()), false),
            TypeExpr::Named(t) => (t.clone(), None, false),
        };

        // A registry match always wins: injected parameters are exempt from
        // the annotation, default and coercion rules because their value
        // comes from server-side context, not client input.
        if let Some(factory) = registry.get(target.type_id()) {
            return Ok(ParamSpec {
                name: decl.name.clone(),
                target,
                optional,
                default: decl.default.clone(),
                meta,
                resolution: Resolution::Inject(factory),
            });
        }

        if meta.is_none() {
            return Err("not an annotated type with validation metadata".to_string());
        }

        if let TargetType::Injected { name, .. } = &target {
            return Err(format!("no injector registered for type `{name}`"));
        }

        if let Some(default) = &decl.default {
            check_default(&target, default)?;
        }

        Ok(ParamSpec {
            name: decl.name.clone(),
            target,
            optional,
            default: decl.default.clone(),
            meta,
            resolution: Resolution::Extract {
                sources: EXTRACT_SOURCES.to_vec(),
            },
        })
    }

    /// Handler name this binder was built for.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler
    }

    /// Built parameter specs, in declaration order.
    #[must_use]
    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    /// Resolve every parameter from the request context.
    ///
    /// All parameters are attempted independently and run to completion;
    /// failures are combined into one [`ValidationErrors`]. Synchronous and
    /// idempotent: resolving the same request state twice yields the same
    /// mapping.
    pub fn resolve(&self, ctx: &RequestContext) -> Result<ResolvedArgs, ValidationErrors> {
        let mut args = ResolvedArgs::new();
        let mut errors = Vec::new();

        for spec in &self.specs {
            match &spec.resolution {
                Resolution::Inject(factory) => {
                    // Factory failures are programmer error, not client
                    // input error: a panic here propagates to the caller's
                    // runtime handling.
                    let value = factory.as_ref()(ctx);
                    args.push(spec.name.clone(), ArgValue::Injected(value));
                }
                Resolution::Extract { sources } => {
                    match Self::extract(spec, sources, ctx) {
                        Ok(value) => args.push(spec.name.clone(), ArgValue::Extracted(value)),
                        Err(message) => errors.push(ParamError::new(&spec.name, message)),
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(ValidationErrors::new(errors));
        }

        Ok(args)
    }

    fn extract(spec: &ParamSpec, sources: &[Source], ctx: &RequestContext) -> Result<Value, String> {
        // First source yielding a present, non-empty value wins. A
        // present-but-empty value is deliberately treated as absent,
        // matching the long-standing fallback behavior.
        let raw = sources
            .iter()
            .find_map(|source| source.lookup(ctx, &spec.name).filter(|v| !v.is_empty()));

        if let Some(raw) = raw {
            return coerce(&spec.target, raw);
        }

        match &spec.default {
            Some(default) if !default.is_null() => Ok(default.clone()),
            _ if spec.optional => Ok(Value::Null),
            _ => Err(format!("missing required value {}", spec.name)),
        }
    }
}

impl fmt::Debug for ArgBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgBinder")
            .field("handler", &self.handler)
            .field("params", &self.specs.iter().map(|s| &s.name).collect::<Vec<_>>())
            .finish()
    }
}

/// Coerce a raw request string into the target scalar type.
fn coerce(target: &TargetType, raw: &str) -> Result<Value, String> {
    match target {
        TargetType::Str => Ok(Value::String(raw.to_string())),
        TargetType::Int => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("invalid int value \"{raw}\"")),
        TargetType::Float => raw
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| format!("invalid float value \"{raw}\"")),
        TargetType::Bool => raw
            .parse::<bool>()
            .map(Value::from)
            .map_err(|_| format!("invalid bool value \"{raw}\"")),
        TargetType::Injected { name, .. } => {
            // Build-time checks guarantee injected targets never reach
            // extraction.
            Err(format!("type `{name}` cannot be coerced from request input"))
        }
    }
}

/// Eager check that a declared default fits the target type. A `null`
/// default is accepted for any target and behaves like no default at all.
fn check_default(target: &TargetType, default: &Value) -> Result<(), String> {
    let ok = match target {
        TargetType::Str => default.is_string(),
        TargetType::Int => default.is_i64() || default.is_u64(),
        TargetType::Float => default.is_number(),
        TargetType::Bool => default.is_boolean(),
        TargetType::Injected { .. } => false,
    };
    if ok || default.is_null() {
        Ok(())
    } else {
        Err(format!(
            "default value {default} does not match target type {}",
            target.name()
        ))
    }
}
