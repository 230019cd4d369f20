//! # Binder Module
//!
//! The argument binder is the dependency leaf of this crate. Given a
//! handler's declared parameter list and the injector registry, it builds
//! one [`ParamSpec`] per parameter, deciding once whether that parameter
//! is supplied by a dependency factory or extracted from the request and
//! coerced, and resolves all of them per request.
//!
//! ## Two checkpoints
//!
//! 1. **Build time** ([`ArgBinder::build`]): structural validation of every
//!    declared parameter. Optional unwrapping, annotation checks, injector
//!    lookup, default/target agreement. All failures for a signature are
//!    collected into a single [`SignatureError`](crate::error::SignatureError).
//! 2. **Resolve time** ([`ArgBinder::resolve`]): value validation of every
//!    parameter, independently, to completion. All failures are collected
//!    into a single [`ValidationErrors`](crate::error::ValidationErrors).
//!
//! The binder and its specs are immutable after build and safely shared,
//! without locking, across concurrent resolve calls.

mod args;
mod core;
mod types;

pub use args::{ArgValue, ResolvedArgs};
pub use core::{ArgBinder, ParamSpec, Resolution, Source};
pub use types::{ConstraintMeta, HandlerSignature, ParamDecl, TargetType, TypeExpr};
