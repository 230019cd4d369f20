//! # Router Module
//!
//! Typed per-method registration and coroutine-based dispatch adapters.
//!
//! ## Registration flow
//!
//! 1. `register` (or a verb helper) receives the handler plus its declared
//!    [`HandlerSignature`](crate::binder::HandlerSignature).
//! 2. An [`ArgBinder`](crate::binder::ArgBinder) is built from the current
//!    injector registry snapshot. A malformed signature rejects the
//!    registration terminally; the route never enters the table.
//! 3. A dispatch adapter is spawned as a `may` coroutine, closed over the
//!    binder, the handler, and the response encoder.
//! 4. A [`RouteEntry`] is appended to the ordered route table.
//!
//! ## Request flow
//!
//! The external matcher picks an entry and calls [`RouteEntry::dispatch`]
//! with a populated [`RequestContext`](crate::context::RequestContext). The
//! job travels over the adapter's channel; the adapter resolves arguments
//! (400 on aggregated validation failure, handler never invoked), invokes
//! the handler (500 on error or panic), encodes the return value, and
//! replies over the per-request channel.

mod core;

pub use core::{
    handler_fn, DispatchJob, FnHandler, Handler, HandlerSender, MethodFilter, RouteEntry,
    RouteOptions, TypedRouter,
};
