use super::*;
use crate::{
    adapter::Adapter,
    context::Context,
    model::Param,
    path::PathError,
    test_support::SpyAdapter,
    validate::{PipelineError, Validatable, Validator},
    value::Value,
};
use futures::FutureExt;
use serde_json::json;
use std::{
    ops::ControlFlow,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

fn context_with(adapter: Arc<SpyAdapter>) -> Context {
    let mut ctx = Context::new();
    ctx.use_adapter(adapter);

    ctx
}

fn users() -> Query {
    Query::new().start("user").expect("start should resolve")
}

//
// Building
//

#[test]
fn where_then_eq_records_resolved_constraint() {
    let query = users()
        .where_attr("email")
        .eq("x@y.com")
        .expect("comparison should resolve");

    assert_eq!(query.size(), 2);
    assert_eq!(query.active_attribute(), Some("email"));

    let constraint = query
        .criteria()
        .constraints()
        .next()
        .expect("constraint should be recorded");
    assert_eq!(constraint.left.path, "user.email");
    assert_eq!(constraint.operator, Operator::Eq);
    assert_eq!(constraint.right.value, Value::from("x@y.com"));
}

#[test]
fn comparison_without_where_is_rejected() {
    let err = users().gte(3).expect_err("gte without where should fail");

    assert_eq!(
        err,
        QueryError::NoActiveAttribute {
            operator: "gte".to_string()
        }
    );
}

#[test]
fn malformed_path_fails_at_the_step() {
    let err = users()
        .where_attr("a.b.c.d")
        .eq(1)
        .expect_err("four segments should fail");
    assert!(matches!(err, QueryError::Path(PathError::InvalidPath { .. })));

    let err = Query::new()
        .asc("createdAt")
        .expect_err("bare attribute without start should fail");
    assert!(matches!(
        err,
        QueryError::Path(PathError::MissingStartModel { .. })
    ));
}

#[test]
fn contains_is_recorded_as_in() {
    let query = users()
        .where_attr("role")
        .contains(vec!["admin", "editor"])
        .expect("contains should resolve");

    let constraint = query.criteria().constraints().next().expect("constraint");
    assert_eq!(constraint.operator.name(), "in");
    assert_eq!(constraint.right.tag, crate::value::ValueTag::List);
}

#[test]
fn every_comparison_uses_its_operator() {
    let query = users()
        .where_attr("age")
        .neq(1)
        .and_then(|q| q.gte(2))
        .and_then(|q| q.gt(3))
        .and_then(|q| q.lte(4))
        .and_then(|q| q.lt(5))
        .and_then(|q| q.nin(vec![6]))
        .and_then(|q| q.matches("^7"))
        .expect("comparisons should resolve");

    let names: Vec<_> = query
        .criteria()
        .constraints()
        .map(|c| c.operator.name().to_string())
        .collect();
    assert_eq!(names, ["neq", "gte", "gt", "lte", "lt", "nin", "match"]);
}

#[test]
fn select_sets_start_when_missing() {
    let query = Query::new()
        .select("post.title")
        .expect("select should resolve");
    assert_eq!(query.start_model(), Some("post"));

    let query = query
        .where_attr("published")
        .eq(true)
        .expect("bare attribute should use the select model");
    let constraint = query.criteria().constraints().next().expect("constraint");
    assert_eq!(constraint.left.path, "post.published");
}

#[test]
fn qualified_start_scopes_bare_attributes() {
    let query = Query::new()
        .start("facebook.user")
        .and_then(|q| q.where_attr("email").eq("x@y.com"))
        .expect("query should build");

    let constraint = query.criteria().constraints().next().expect("constraint");
    assert_eq!(constraint.left.adapter, "facebook");
    assert_eq!(constraint.left.path, "facebook.user.email");
}

#[test]
fn relations_order_and_shaping_serialize_in_order() {
    let query = users()
        .incoming("friends")
        .and_then(|q| q.outgoing("post.author"))
        .and_then(|q| q.asc("createdAt"))
        .and_then(|q| q.desc("name"))
        .expect("steps should resolve")
        .alias("people")
        .returns("people")
        .limit(10);

    let json = query.criteria().to_json();
    let kinds: Vec<_> = json
        .as_array()
        .expect("criteria should be an array")
        .iter()
        .map(|entry| entry[0].clone())
        .collect();

    assert_eq!(
        kinds,
        [
            "start", "relation", "relation", "order", "order", "as", "return", "limit"
        ]
    );
    assert_eq!(json[1][1]["direction"], "incoming");
    assert_eq!(json[2][1]["direction"], "outgoing");
    assert_eq!(json[2][1]["path"], "post.author");
    assert_eq!(json[3][1]["direction"], 1);
    assert_eq!(json[4][1]["direction"], -1);
    assert_eq!(json[5][1], "people");
    assert_eq!(json[7][1], 10);
}

#[test]
fn action_wraps_single_record() {
    let query = users().action("create", Some(Value::map([("email", "x@y.com")])));
    let json = query.criteria().to_json();

    assert_eq!(json[1][0], "action");
    assert_eq!(json[1][1]["type"], "create");
    assert_eq!(json[1][1]["data"], json!([{ "email": "x@y.com" }]));
}

#[test]
fn clone_copies_criteria_shallowly() {
    let original = users().limit(5);
    let copy = original.clone().limit(6);

    assert_eq!(original.size(), 2);
    assert_eq!(copy.size(), 3);
    assert!(Arc::ptr_eq(&original.criteria()[0], &copy.criteria()[0]));
}

#[test]
fn fork_drops_chain_local_attribute() {
    let original = Query::named("adults", crate::path::PathResolver::default())
        .start("user")
        .and_then(|q| q.where_attr("age").gte(18))
        .expect("query should build");
    assert_eq!(original.active_attribute(), Some("age"));

    let fork = original.fork();
    assert_eq!(fork.name(), Some("adults"));
    assert_eq!(fork.start_model(), Some("user"));
    assert_eq!(fork.active_attribute(), None);
    assert!(fork.criteria().shares_entries_with(original.criteria()));

    assert!(matches!(
        fork.lt(60),
        Err(QueryError::NoActiveAttribute { .. })
    ));
}

#[test]
fn reset_clears_criteria_only() {
    let query = Query::named("q", crate::path::PathResolver::default())
        .start("user")
        .expect("start should resolve")
        .reset();

    assert_eq!(query.size(), 0);
    assert_eq!(query.name(), Some("q"));
    assert_eq!(query.start_model(), Some("user"));
}

//
// Executing
//

#[tokio::test]
async fn end_to_end_find_dispatches_criteria() {
    let spy = SpyAdapter::new("A")
        .returning(vec![Value::map([("email", "x@y.com")])])
        .shared();
    let ctx = context_with(spy.clone());

    let records = users()
        .where_attr("email")
        .eq("x@y.com")
        .expect("query should build")
        .find(&ctx)
        .await
        .expect("find should succeed");

    assert_eq!(records, vec![Value::map([("email", "x@y.com")])]);
    assert_eq!(spy.calls(), 1);
    assert_eq!(
        spy.last_criteria().expect("adapter should see criteria"),
        json!([
            ["start", { "model": "user", "namespace": "user" }],
            ["constraint", {
                "left": {
                    "adapter": "memory",
                    "model": "user",
                    "attr": "email",
                    "namespace": "user",
                    "path": "user.email"
                },
                "operator": "eq",
                "right": { "value": "x@y.com", "type": "text" }
            }],
            ["action", { "type": "find" }]
        ])
    );
}

#[tokio::test]
async fn exec_clears_chain_scope_before_validation() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy);
    let cleared = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&cleared);

    users()
        .where_attr("email")
        .validator(Validator::check(move |q: &mut Query| {
            seen.store(
                q.start_model().is_none() && q.active_attribute().is_none(),
                Ordering::SeqCst,
            );
        }))
        .find(&ctx)
        .await
        .expect("find should succeed");

    assert!(cleared.load(Ordering::SeqCst));
}

#[tokio::test]
async fn validation_messages_replace_results() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());

    let err = users()
        .validator(Validator::check(|q: &mut Query| q.report("first")))
        .validator(Validator::check(|q: &mut Query| q.report("second")))
        .find(&ctx)
        .await
        .expect_err("validation should reject the query");

    match err {
        ExecError::Validation(messages) => assert_eq!(messages, ["first", "second"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn halted_pipeline_skips_later_validators_and_adapter() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());
    let later = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&later);

    let err = users()
        .validator(Validator::sync(|_: &mut Query| ControlFlow::Break(())))
        .validator(Validator::check(move |_: &mut Query| {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .find(&ctx)
        .await
        .expect_err("halted pipeline should fail");

    assert!(matches!(
        err,
        ExecError::Pipeline(PipelineError::Halted { index: 0 })
    ));
    assert_eq!(later.load(Ordering::SeqCst), 0);
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn async_validator_gates_dispatch() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());

    users()
        .validator(Validator::from_async(|_: &mut Query| async { Ok(()) }.boxed()))
        .find(&ctx)
        .await
        .expect("passing async validator should dispatch");
    assert_eq!(spy.calls(), 1);

    let err = users()
        .validator(Validator::from_async(|_: &mut Query| {
            async { Err(crate::error::BoxError::from("quota exceeded")) }.boxed()
        }))
        .find(&ctx)
        .await
        .expect_err("failing async validator should abort");

    assert!(matches!(err, ExecError::Pipeline(PipelineError::Failed { .. })));
    assert!(err.to_string().contains("quota exceeded"));
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn adapter_params_validate_constraints() {
    let spy = SpyAdapter::new("memory")
        .with_param(
            "user.age",
            Param::new("age")
                .type_name("integer")
                .operator("gte")
                .operator("eq")
                .validate("gte", 0),
        )
        .shared();
    let ctx = context_with(spy.clone());

    users()
        .where_attr("age")
        .gte(18)
        .expect("query should build")
        .find(&ctx)
        .await
        .expect("valid constraint should dispatch");

    let err = users()
        .where_attr("age")
        .matches("^1")
        .and_then(|q| q.where_attr("age").eq(-1))
        .expect("query should build")
        .find(&ctx)
        .await
        .expect_err("invalid constraints should be rejected");

    match err {
        ExecError::Validation(messages) => assert_eq!(
            messages,
            [
                "Invalid operator match",
                "Invalid constraint: user.age",
                "Invalid constraint: user.age",
            ]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn validate_reports_without_dispatching() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());
    let mut query = users().validator(Validator::check(|q: &mut Query| q.report("nope")));

    let valid = query.validate(&ctx).await.expect("pipeline should complete");

    assert!(!valid);
    assert_eq!(query.errors(), ["nope"]);
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn explain_sees_final_criteria_before_dispatch() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());
    let explained = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&explained);

    users()
        .explain(move |criteria| {
            *sink.lock().expect("explain lock") = Some(criteria.to_json());
        })
        .count(&ctx)
        .await
        .expect("count should succeed");

    let explained = explained.lock().expect("explain lock").clone();
    assert_eq!(explained, spy.last_criteria());
    assert_eq!(
        explained.expect("explain should run")[1],
        json!(["action", { "type": "count" }])
    );
}

#[tokio::test]
async fn adapter_selection() {
    let memory = SpyAdapter::new("memory").shared();
    let rest = SpyAdapter::new("rest").shared();
    let mut ctx = context_with(memory.clone());
    ctx.use_adapter(rest.clone());

    users().find(&ctx).await.expect("default adapter should run");
    users()
        .using("rest")
        .using("memory")
        .find(&ctx)
        .await
        .expect("first explicit adapter should run");
    assert_eq!((memory.calls(), rest.calls()), (1, 1));

    let direct = SpyAdapter::new("direct").shared();
    let instance: Arc<dyn Adapter> = direct.clone();
    users()
        .using(instance)
        .exists(&ctx)
        .await
        .expect("instance adapter should run");
    assert_eq!(direct.calls(), 1);

    let err = users()
        .using("graph")
        .find(&ctx)
        .await
        .expect_err("unknown adapter should fail");
    assert!(matches!(err, ExecError::UnknownAdapter(name) if name == "graph"));

    let err = users()
        .find(&Context::new())
        .await
        .expect_err("no adapter should fail");
    assert!(matches!(err, ExecError::NoAdapter));
}

#[tokio::test]
async fn adapter_errors_pass_through() {
    let spy = SpyAdapter::new("memory").failing("connection refused").shared();
    let ctx = context_with(spy);

    let err = users().remove(&ctx).await.expect_err("adapter error should surface");

    assert!(matches!(err, ExecError::Adapter(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn first_and_last_unwrap_single_record() {
    let spy = SpyAdapter::new("memory")
        .returning(vec![Value::from("a"), Value::from("b")])
        .shared();
    let ctx = context_with(spy.clone());

    let first = users().first(&ctx).await.expect("first should succeed");
    assert_eq!(first, Some(Value::from("a")));

    let criteria = spy.last_criteria().expect("criteria");
    assert_eq!(criteria[1], json!(["limit", 1]));
    assert_eq!(criteria[2], json!(["action", { "type": "find" }]));

    let last = users().last(&ctx).await.expect("last should succeed");
    assert_eq!(last, Some(Value::from("b")));

    let empty = context_with(SpyAdapter::new("memory").shared());
    assert_eq!(users().first(&empty).await.expect("first should succeed"), None);
}

#[tokio::test]
async fn create_and_update_carry_data() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());

    users()
        .create(vec![Value::map([("email", "a")]), Value::map([("email", "b")])], &ctx)
        .await
        .expect("create should succeed");
    let criteria = spy.last_criteria().expect("criteria");
    assert_eq!(criteria[1][1]["type"], "create");
    assert_eq!(criteria[1][1]["data"].as_array().map(Vec::len), Some(2));

    users()
        .update(Value::map([("email", "c")]), &ctx)
        .await
        .expect("update should succeed");
    let criteria = spy.last_criteria().expect("criteria");
    assert_eq!(criteria[1][1]["type"], "update");
    assert_eq!(criteria[1][1]["data"], json!([{ "email": "c" }]));
}

#[tokio::test]
async fn named_queries_come_from_context() {
    let spy = SpyAdapter::new("memory").shared();
    let ctx = context_with(spy.clone());

    ctx.define_query("active", users().where_attr("active").eq(true).expect("build"));
    let records = ctx.query("active").all(&ctx).await.expect("named query should run");

    assert!(records.is_empty());
    let criteria = spy.last_criteria().expect("criteria");
    assert_eq!(criteria[1][0], "constraint");
    assert_eq!(criteria[2], json!(["action", { "type": "find" }]));
    assert_eq!(ctx.query("active").size(), 2);
}
