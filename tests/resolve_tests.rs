//! Request-time value resolution: source precedence, defaults, coercion,
//! injection, and aggregated validation failures.

use bindrouter::{
    ArgBinder, ConstraintMeta, HandlerSignature, ParamDecl, RequestContext, TargetType,
    TypeInjectorRegistry, TypeExpr,
};
use http::Method;
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
struct RemoteClient {
    host: String,
}

fn annotated(target: TargetType) -> TypeExpr {
    TypeExpr::annotated(target, ConstraintMeta::describe("test param"))
}

fn build(sig: HandlerSignature) -> ArgBinder {
    ArgBinder::build(&sig, &TypeInjectorRegistry::new()).expect("build failed")
}

#[test]
fn path_value_resolves_string_param() {
    let binder = build(HandlerSignature::new("greet").param(ParamDecl::new(
        "who",
        annotated(TargetType::Str),
    )));
    let ctx = RequestContext::new(Method::GET, "/hello/Ada").with_path_param("who", "Ada");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(args.get_str("who"), Some("Ada"));
}

#[test]
fn missing_required_value_names_the_parameter() {
    let binder = build(HandlerSignature::new("greet").param(ParamDecl::new(
        "who",
        annotated(TargetType::Str),
    )));
    let ctx = RequestContext::new(Method::GET, "/hello");

    let err = binder.resolve(&ctx).expect_err("resolve should fail");
    assert_eq!(err.len(), 1);
    assert_eq!(err.errors[0].name, "who");
    assert_eq!(err.errors[0].message, "missing required value who");
}

#[test]
fn resolve_collects_all_failures() {
    // Two missing required parameters produce one error value naming both.
    let binder = build(
        HandlerSignature::new("greet")
            .param(ParamDecl::new("who", annotated(TargetType::Str)))
            .param(ParamDecl::new("age", annotated(TargetType::Int))),
    );
    let ctx = RequestContext::new(Method::GET, "/hello");

    let err = binder.resolve(&ctx).expect_err("resolve should fail");
    assert_eq!(err.len(), 2);
    assert!(err.names("who"));
    assert!(err.names("age"));
}

#[test]
fn coercion_failure_and_missing_value_aggregate() {
    let binder = build(
        HandlerSignature::new("greet")
            .param(ParamDecl::new("age", annotated(TargetType::Int)))
            .param(ParamDecl::new("who", annotated(TargetType::Str))),
    );
    let ctx = RequestContext::new(Method::GET, "/hello").with_query_param("age", "abc");

    let err = binder.resolve(&ctx).expect_err("resolve should fail");
    assert_eq!(err.len(), 2);
    assert!(err.errors.iter().any(|e| e.name == "age" && e.message.contains("invalid int")));
    assert!(err.names("who"));
}

#[test]
fn path_source_takes_precedence_over_query() {
    let binder = build(HandlerSignature::new("greet").param(ParamDecl::new(
        "who",
        annotated(TargetType::Str),
    )));
    let ctx = RequestContext::new(Method::GET, "/hello/Ada")
        .with_path_param("who", "Ada")
        .with_query_param("who", "Grace");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(args.get_str("who"), Some("Ada"));
}

#[test]
fn empty_path_value_falls_through_to_query() {
    // A present-but-empty source value is treated as absent; the scan moves
    // on to the next source.
    let binder = build(HandlerSignature::new("greet").param(ParamDecl::new(
        "who",
        annotated(TargetType::Str),
    )));
    let ctx = RequestContext::new(Method::GET, "/hello/")
        .with_path_param("who", "")
        .with_query_param("who", "Grace");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(args.get_str("who"), Some("Grace"));
}

#[test]
fn empty_query_value_falls_back_to_default() {
    let binder = build(HandlerSignature::new("greet").param(
        ParamDecl::new(
            "who",
            TypeExpr::optional(annotated(TargetType::Str)),
        )
        .with_default(json!("Nobody")),
    ));
    let ctx = RequestContext::new(Method::GET, "/hello").with_query_param("who", "");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(args.get_str("who"), Some("Nobody"));
}

#[test]
fn default_used_when_absent_everywhere() {
    let binder = build(HandlerSignature::new("greet").param(
        ParamDecl::new(
            "who",
            TypeExpr::optional(annotated(TargetType::Str)),
        )
        .with_default(json!("Nobody")),
    ));
    let ctx = RequestContext::new(Method::GET, "/hello");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(args.get_str("who"), Some("Nobody"));
}

#[test]
fn optional_without_default_resolves_to_null() {
    let binder = build(HandlerSignature::new("greet").param(ParamDecl::new(
        "who",
        TypeExpr::optional(annotated(TargetType::Str)),
    )));
    let ctx = RequestContext::new(Method::GET, "/hello");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert!(args.is_null("who"));
}

#[test]
fn scalar_coercion_produces_typed_values() {
    let binder = build(
        HandlerSignature::new("filters")
            .param(ParamDecl::new("limit", annotated(TargetType::Int)))
            .param(ParamDecl::new("ratio", annotated(TargetType::Float)))
            .param(ParamDecl::new("debug", annotated(TargetType::Bool))),
    );
    let ctx = RequestContext::new(Method::GET, "/items")
        .with_query_param("limit", "25")
        .with_query_param("ratio", "0.75")
        .with_query_param("debug", "true");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(args.get_i64("limit"), Some(25));
    assert_eq!(args.get_f64("ratio"), Some(0.75));
    assert_eq!(args.get_bool("debug"), Some(true));
}

#[test]
fn injected_parameter_never_consults_sources() {
    let mut registry = TypeInjectorRegistry::new();
    registry.add::<RemoteClient>(|ctx| RemoteClient {
        host: ctx.path.clone(),
    });

    let sig = HandlerSignature::new("greet").param(ParamDecl::new(
        "client",
        annotated(TargetType::of::<RemoteClient>()),
    ));
    let binder = ArgBinder::build(&sig, &registry).expect("build failed");

    // A same-named source value that could never coerce into the target
    // type: if extraction ran, resolution would fail. It must not.
    let ctx = RequestContext::new(Method::GET, "/hello").with_path_param("client", "boom");

    let args = binder.resolve(&ctx).expect("resolve failed");
    assert_eq!(
        args.injected::<RemoteClient>("client"),
        Some(&RemoteClient {
            host: "/hello".to_string()
        })
    );
}

#[test]
fn take_injected_moves_the_dependency_out() {
    let mut registry = TypeInjectorRegistry::new();
    registry.add::<RemoteClient>(|ctx| RemoteClient {
        host: ctx.path.clone(),
    });

    let sig = HandlerSignature::new("greet").param(ParamDecl::new(
        "client",
        annotated(TargetType::of::<RemoteClient>()),
    ));
    let binder = ArgBinder::build(&sig, &registry).expect("build failed");

    let ctx = RequestContext::new(Method::GET, "/hosts");
    let mut args = binder.resolve(&ctx).expect("resolve failed");

    let client = args
        .take_injected::<RemoteClient>("client")
        .expect("no client");
    assert_eq!(client.host, "/hosts");

    // Taken by value: the entry is gone from the mapping.
    assert!(args.injected::<RemoteClient>("client").is_none());
    assert!(args.is_empty());
}

#[test]
fn builtin_injector_supplies_the_context_itself() {
    let registry = TypeInjectorRegistry::new();
    let sig = HandlerSignature::new("echo").param(ParamDecl::new(
        "ctx",
        TypeExpr::named(TargetType::of::<RequestContext>()),
    ));
    let binder = ArgBinder::build(&sig, &registry).expect("build failed");

    let ctx = RequestContext::new(Method::GET, "/echo/42").with_path_param("id", "42");
    let args = binder.resolve(&ctx).expect("resolve failed");

    let injected = args.injected::<RequestContext>("ctx").expect("no context");
    assert_eq!(injected.path, "/echo/42");
    assert_eq!(injected.get_path_param("id"), Some("42"));
    assert_eq!(injected.request_id, ctx.request_id);
}

#[test]
fn resolve_is_idempotent() {
    let binder = build(
        HandlerSignature::new("greet")
            .param(ParamDecl::new("who", annotated(TargetType::Str)))
            .param(
                ParamDecl::new("limit", TypeExpr::optional(annotated(TargetType::Int)))
                    .with_default(json!(10)),
            ),
    );
    let ctx = RequestContext::new(Method::GET, "/hello/Ada").with_path_param("who", "Ada");

    let first = binder.resolve(&ctx).expect("first resolve failed");
    let second = binder.resolve(&ctx).expect("second resolve failed");
    assert_eq!(first.extracted_map(), second.extracted_map());
}

#[test]
fn mapping_preserves_declaration_order() {
    let binder = build(
        HandlerSignature::new("greet")
            .param(ParamDecl::new("b", annotated(TargetType::Str)))
            .param(ParamDecl::new("a", annotated(TargetType::Str))),
    );
    let ctx = RequestContext::new(Method::GET, "/x")
        .with_query_param("a", "1")
        .with_query_param("b", "2");

    let args = binder.resolve(&ctx).expect("resolve failed");
    let names: Vec<&str> = args.names().collect();
    assert_eq!(names, vec!["b", "a"]);
}
