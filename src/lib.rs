//! # bindrouter
//!
//! A typed request-argument binder with dependency injection for
//! request-handling functions, powered by the `may` coroutine runtime.
//!
//! Given a handler's declared parameter list (each parameter carrying a
//! target type and validation metadata), the crate derives a binding
//! plan once, at registration time, that extracts and validates each
//! argument from an inbound request, or supplies it from a type-keyed
//! dependency factory, then invokes the handler and encodes its return
//! value as a response envelope.
//!
//! ## Architecture
//!
//! - **[`binder`]** - Per-handler argument binder: build-time structural
//!   validation, request-time value resolution, aggregated errors at both
//!   checkpoints
//! - **[`injector`]** - Type-keyed dependency factory registry
//! - **[`router`]** - Per-verb registration, ordered route table, and
//!   coroutine dispatch adapters
//! - **[`context`]** - The request view consumed from the transport layer
//! - **[`response`]** - Response envelope and the encoding seam
//! - **[`error`]** - The two-checkpoint error taxonomy
//! - **[`logging`]** - Tracing subscriber setup
//!
//! ## Two-phase validation
//!
//! The central design idea is eager-then-aggregate validation: malformed
//! handler signatures are caught at registration (fail fast, before
//! serving traffic, every offending parameter named together), and
//! malformed requests produce one response enumerating every problem
//! found, not just the first.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bindrouter::{
//!     handler_fn, ConstraintMeta, HandlerSignature, ParamDecl, TargetType, TypeExpr,
//!     TypedRouter,
//! };
//!
//! let mut router = TypedRouter::new();
//! let sig = HandlerSignature::new("hello").param(ParamDecl::new(
//!     "who",
//!     TypeExpr::annotated(TargetType::Str, ConstraintMeta::describe("greeting target")),
//! ));
//! unsafe {
//!     router.get("/hello/{who}", sig, handler_fn(|args| {
//!         let who = args.get_str("who").unwrap_or("world");
//!         Ok(format!("Hello, {who}"))
//!     }))?;
//! }
//! ```
//!
//! Routing-table path matching, the HTTP transport, and server lifecycle
//! are external collaborators: the transport matches a path against
//! [`TypedRouter::routes`], builds a [`RequestContext`], and calls
//! [`RouteEntry::dispatch`](router::RouteEntry::dispatch).

pub mod binder;
pub mod context;
pub mod error;
pub mod ids;
pub mod injector;
pub mod logging;
pub mod response;
pub mod router;

pub use binder::{
    ArgBinder, ArgValue, ConstraintMeta, HandlerSignature, ParamDecl, ParamSpec, ResolvedArgs,
    Resolution, Source, TargetType, TypeExpr,
};
pub use context::{ParamVec, RequestContext, MAX_INLINE_PARAMS};
pub use error::{ParamError, SignatureError, ValidationErrors};
pub use ids::RequestId;
pub use injector::{InjectorFn, TypeInjectorRegistry};
pub use response::{
    HandlerResponse, HeaderVec, ResponseEncoder, TextOrJsonEncoder, MAX_INLINE_HEADERS,
};
pub use router::{
    handler_fn, FnHandler, Handler, MethodFilter, RouteEntry, RouteOptions, TypedRouter,
};
