//! Typed router core: registration entry points and the per-handler
//! dispatch adapter coroutine.

use crate::binder::{ArgBinder, HandlerSignature, ResolvedArgs};
use crate::context::RequestContext;
use crate::error::SignatureError;
use crate::injector::TypeInjectorRegistry;
use crate::response::{HandlerResponse, ResponseEncoder, TextOrJsonEncoder};
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Trait implemented by typed handlers.
///
/// A handler receives the resolved argument set and returns a serializable
/// response value. Errors are programmer/downstream faults and surface as
/// 500 responses; client input problems never reach the handler.
pub trait Handler: Send + 'static {
    type Response: Serialize + Send + 'static;

    fn handle(&self, args: ResolvedArgs) -> anyhow::Result<Self::Response>;
}

/// Adapter turning a plain closure into a [`Handler`].
pub struct FnHandler<F, R> {
    f: F,
    _marker: PhantomData<fn() -> R>,
}

/// Wrap a closure `Fn(ResolvedArgs) -> anyhow::Result<R>` as a [`Handler`].
pub fn handler_fn<F, R>(f: F) -> FnHandler<F, R>
where
    F: Fn(ResolvedArgs) -> anyhow::Result<R> + Send + 'static,
    R: Serialize + Send + 'static,
{
    FnHandler {
        f,
        _marker: PhantomData,
    }
}

impl<F, R> Handler for FnHandler<F, R>
where
    F: Fn(ResolvedArgs) -> anyhow::Result<R> + Send + 'static,
    R: Serialize + Send + 'static,
{
    type Response = R;

    fn handle(&self, args: ResolvedArgs) -> anyhow::Result<R> {
        (self.f)(args)
    }
}

/// Method selector for a route entry. `http::Method` has no wildcard value,
/// so the catch-all registration gets its own variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    Any,
    Only(Method),
}

impl MethodFilter {
    #[must_use]
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(m) => m == method,
        }
    }
}

impl fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("*"),
            MethodFilter::Only(m) => write!(f, "{m}"),
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        MethodFilter::Only(method)
    }
}

/// Extra options carried on a route entry, opaque to this crate. The
/// external matcher may use them (display name, matcher hints, docs).
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub name: Option<String>,
    pub extra: serde_json::Map<String, Value>,
}

/// One dispatch job: the request context plus a reply channel for the
/// response envelope.
pub struct DispatchJob {
    pub ctx: RequestContext,
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

/// Channel sender feeding a handler's adapter coroutine.
pub type HandlerSender = mpsc::Sender<DispatchJob>;

/// One registered route: method selector, path pattern, options, and the
/// channel into the adapter coroutine. Entries live in the router's table in
/// registration order; the external matcher picks one and calls
/// [`RouteEntry::dispatch`].
pub struct RouteEntry {
    pub method: MethodFilter,
    pub path: String,
    pub handler_name: String,
    pub options: RouteOptions,
    sender: HandlerSender,
}

impl RouteEntry {
    /// Send a request to this route's adapter and wait for the response.
    ///
    /// The adapter resolves arguments, invokes the handler, and encodes the
    /// result; validation failures come back as 400 without the handler ever
    /// running. If the adapter coroutine is gone (crashed or replaced), a
    /// 503 envelope is returned instead of dropping the request.
    #[must_use]
    pub fn dispatch(&self, ctx: RequestContext) -> HandlerResponse {
        let request_id = ctx.request_id;
        let (reply_tx, reply_rx) = mpsc::channel();
        let start = Instant::now();

        info!(
            request_id = %request_id,
            handler_name = %self.handler_name,
            method = %ctx.method,
            path = %ctx.path,
            "Request dispatched to handler"
        );

        if let Err(e) = self.sender.send(DispatchJob { ctx, reply_tx }) {
            error!(
                request_id = %request_id,
                handler_name = %self.handler_name,
                error = %e,
                "Failed to send request to handler"
            );
            return HandlerResponse::error(
                503,
                &format!("handler '{}' is not responding", self.handler_name),
            );
        }

        match reply_rx.recv() {
            Ok(response) => {
                info!(
                    request_id = %request_id,
                    handler_name = %self.handler_name,
                    latency_ms = start.elapsed().as_millis() as u64,
                    status = response.status,
                    "Handler response received"
                );
                response
            }
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %self.handler_name,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "Handler channel closed - handler may have crashed"
                );
                HandlerResponse::error(
                    503,
                    &format!("handler '{}' is not responding", self.handler_name),
                )
            }
        }
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler_name", &self.handler_name)
            .finish()
    }
}

/// Router with typed per-method registration.
///
/// For each registered handler the router builds one [`ArgBinder`] from the
/// current injector registry snapshot, spawns a dispatch adapter coroutine
/// closed over binder + handler + encoder, and appends a [`RouteEntry`] to
/// the ordered route table. A registration whose signature fails to bind is
/// rejected terminally: the route never enters the table.
pub struct TypedRouter {
    injectors: TypeInjectorRegistry,
    encoder: Arc<dyn ResponseEncoder>,
    routes: Vec<RouteEntry>,
}

impl TypedRouter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            injectors: TypeInjectorRegistry::new(),
            encoder: Arc::new(TextOrJsonEncoder),
            routes: Vec::new(),
        }
    }

    /// Register a dependency factory for type `T`.
    ///
    /// Setup-time configuration: each binder snapshots its resolution
    /// decisions at build time, so an injector added here only affects
    /// handlers registered afterwards. Call before the routes that need it.
    pub fn add_type_injector<T: Send + 'static>(
        &mut self,
        factory: impl Fn(&RequestContext) -> T + Send + Sync + 'static,
    ) {
        self.injectors.add(factory);
    }

    /// Replace the response encoder used by adapters spawned after this
    /// call.
    pub fn set_encoder(&mut self, encoder: Arc<dyn ResponseEncoder>) {
        self.encoder = encoder;
    }

    /// The injector registry (read-only view).
    #[must_use]
    pub fn injectors(&self) -> &TypeInjectorRegistry {
        &self.injectors
    }

    /// Ordered route table, in registration order. Order is preserved
    /// because the external matcher may rely on it for overlapping
    /// patterns.
    #[must_use]
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Register a handler under an explicit method filter.
    ///
    /// Builds the binder eagerly; a malformed signature fails the
    /// registration with a [`SignatureError`] naming every offending
    /// parameter, and the route table is left unchanged.
    ///
    /// # Safety
    ///
    /// Spawns the adapter via `may::coroutine::Builder::spawn()`, which is
    /// unsafe in the `may` runtime. The caller must ensure the may runtime
    /// is initialized (stack size configured) before registering handlers.
    pub unsafe fn register<H: Handler>(
        &mut self,
        method: MethodFilter,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register_with_options(method, path, signature, handler, RouteOptions::default())
    }

    /// [`register`](Self::register) with explicit route options.
    ///
    /// # Safety
    ///
    /// Same requirements as [`register`](Self::register).
    pub unsafe fn register_with_options<H: Handler>(
        &mut self,
        method: MethodFilter,
        path: &str,
        signature: HandlerSignature,
        handler: H,
        options: RouteOptions,
    ) -> Result<&RouteEntry, SignatureError> {
        let handler_name = signature.name.clone();

        let binder = match ArgBinder::build(&signature, &self.injectors) {
            Ok(binder) => binder,
            Err(err) => {
                warn!(
                    handler_name = %handler_name,
                    method = %method,
                    path = %path,
                    error_count = err.errors.len(),
                    "Handler signature rejected"
                );
                return Err(err);
            }
        };

        let sender = spawn_adapter(binder, handler, Arc::clone(&self.encoder));

        info!(
            handler_name = %handler_name,
            method = %method,
            path = %path,
            total_routes = self.routes.len() + 1,
            "Route registered"
        );

        let idx = self.routes.len();
        self.routes.push(RouteEntry {
            method,
            path: path.to_string(),
            handler_name,
            options,
            sender,
        });
        Ok(&self.routes[idx])
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn get<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::GET), path, signature, handler)
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn post<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::POST), path, signature, handler)
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn put<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::PUT), path, signature, handler)
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn patch<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::PATCH), path, signature, handler)
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn delete<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::DELETE), path, signature, handler)
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn head<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::HEAD), path, signature, handler)
    }

    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn options<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Only(Method::OPTIONS), path, signature, handler)
    }

    /// Register under every method.
    ///
    /// # Safety
    /// See [`register`](Self::register).
    pub unsafe fn any<H: Handler>(
        &mut self,
        path: &str,
        signature: HandlerSignature,
        handler: H,
    ) -> Result<&RouteEntry, SignatureError> {
        self.register(MethodFilter::Any, path, signature, handler)
    }
}

impl Default for TypedRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Adapter coroutine stack size: `BINDR_STACK_SIZE` env var (hex with `0x`
/// prefix, or decimal), default 64KB.
fn adapter_stack_size() -> usize {
    std::env::var("BINDR_STACK_SIZE")
        .ok()
        .and_then(|s| {
            if let Some(hex) = s.strip_prefix("0x") {
                usize::from_str_radix(hex, 16).ok()
            } else {
                s.parse().ok()
            }
        })
        .unwrap_or(0x10000)
}

/// Spawn the dispatch adapter coroutine for one registered handler.
///
/// The adapter runs `resolve → invoke → encode` per job. Argument resolution
/// is synchronous and never suspends; the handler body may block at
/// coroutine suspension points. Handler panics are caught and converted to
/// 500 envelopes so one failing handler cannot take down the runtime.
unsafe fn spawn_adapter<H: Handler>(
    binder: ArgBinder,
    handler: H,
    encoder: Arc<dyn ResponseEncoder>,
) -> HandlerSender {
    let (tx, rx) = mpsc::channel::<DispatchJob>();
    let stack_size = adapter_stack_size();
    let handler_name = binder.handler_name().to_string();
    let spawn_name = handler_name.clone();

    // SAFETY: may::coroutine::Builder::spawn() is unsafe by the may runtime's
    // contract. The adapter closure is Send + 'static, owns everything it
    // touches, and replies through the per-job channel rather than
    // panicking across the coroutine boundary.
    let spawn_result = coroutine::Builder::new()
        .stack_size(stack_size)
        .spawn(move || {
            debug!(
                handler_name = %spawn_name,
                stack_size = stack_size,
                "Adapter coroutine start"
            );

            for job in rx.iter() {
                let DispatchJob { ctx, reply_tx } = job;
                let request_id = ctx.request_id;
                let start = Instant::now();

                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    run_one(&binder, &handler, encoder.as_ref(), ctx)
                }));

                let response = match outcome {
                    Ok(response) => response,
                    Err(panic) => {
                        let panic_message = format!("{panic:?}");
                        error!(
                            request_id = %request_id,
                            handler_name = %spawn_name,
                            panic_message = %panic_message,
                            "Handler panicked"
                        );
                        HandlerResponse::error(
                            500,
                            &format!("handler panicked: {panic_message}"),
                        )
                    }
                };

                debug!(
                    request_id = %request_id,
                    handler_name = %spawn_name,
                    execution_time_ms = start.elapsed().as_millis() as u64,
                    status = response.status,
                    "Adapter cycle complete"
                );

                let _ = reply_tx.send(response);
            }
        });

    if let Err(e) = spawn_result {
        // The sender is still returned: with no consumer, dispatch observes
        // a closed channel and answers 503 instead of crashing registration.
        error!(
            handler_name = %handler_name,
            error = %e,
            stack_size = stack_size,
            "Failed to spawn adapter coroutine"
        );
    }

    tx
}

/// One resolve/invoke/encode cycle.
fn run_one<H: Handler>(
    binder: &ArgBinder,
    handler: &H,
    encoder: &dyn ResponseEncoder,
    ctx: RequestContext,
) -> HandlerResponse {
    let request_id = ctx.request_id;

    let args = match binder.resolve(&ctx) {
        Ok(args) => args,
        Err(errors) => {
            warn!(
                request_id = %request_id,
                handler_name = %binder.handler_name(),
                error_count = errors.len(),
                "Argument resolution failed"
            );
            return HandlerResponse::json(400, errors.to_body());
        }
    };

    match handler.handle(args) {
        Ok(value) => match serde_json::to_value(value) {
            Ok(encoded) => encoder.encode(encoded),
            Err(e) => {
                error!(
                    request_id = %request_id,
                    handler_name = %binder.handler_name(),
                    error = %e,
                    "Failed to serialize handler response"
                );
                HandlerResponse::error(500, "failed to serialize response")
            }
        },
        Err(e) => {
            error!(
                request_id = %request_id,
                handler_name = %binder.handler_name(),
                error = %e,
                "Handler returned error"
            );
            HandlerResponse::error(500, &e.to_string())
        }
    }
}
