use restplus_core::http::Router;
use restplus_core::{
    Api, ApiDoc, ApiError, Field, Model, Namespace, Operation, Resource, SpecsError,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn ping() -> Resource<()> {
    Resource::new("Ping").get(Operation::new(|_call| async { Ok::<_, ApiError>(json!("pong")) }))
}

/// Build `api` and return the documentation it publishes.
fn doc_of(api: Api<()>) -> ApiDoc {
    let slot: Arc<Mutex<Option<ApiDoc>>> = Arc::new(Mutex::new(None));
    let captured = slot.clone();
    api.with_meta_consumer::<ApiDoc, _>(move |docs| {
        *captured.lock().unwrap() = docs.first().cloned();
        Router::new()
    })
    .build();
    let doc = slot.lock().unwrap().take();
    doc.expect("no ApiDoc published")
}

#[test]
fn duplicate_pattern_in_namespace() {
    let ns = Namespace::new("things").route("/a", ping()).route("/a/", ping());
    let err = Api::new(()).namespace(ns).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::DuplicateRoute { ref namespace, .. } if namespace == "things"));
}

#[test]
fn same_full_path_across_namespaces() {
    let a = Namespace::new("a").path("/shared").route("/x", ping());
    let b = Namespace::new("b").path("/shared").route("/x", ping());
    let err = Api::new(()).namespace(a).namespace(b).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::PathConflict { ref path } if path == "/shared/x"));
}

#[test]
fn invalid_pattern_is_reported() {
    let err = Api::new(()).route("/<id:[>", ping()).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::InvalidPattern { .. }));
}

#[test]
fn unknown_default_mediatype() {
    let err = Api::new(())
        .default_mediatype(Some("application/xml"))
        .route("/ping", ping())
        .try_build()
        .unwrap_err();
    assert!(matches!(err, SpecsError::UnknownMediaType(ref m) if m == "application/xml"));
    assert!(Api::new(()).default_mediatype(Some("text/plain")).try_build().is_ok());
}

#[test]
#[should_panic(expected = "invalid API declaration")]
fn build_panics_on_invalid_declaration() {
    let ns = Namespace::new("dup").route("/a", ping()).route("/a", ping());
    Api::new(()).namespace(ns).build();
}

#[test]
fn prefix_is_normalised() {
    assert_eq!(Api::<()>::new(()).prefix("api/v1/").get_prefix(), "/api/v1");
    assert_eq!(Api::<()>::new(()).prefix("/").get_prefix(), "");
}

#[test]
fn default_namespace_comes_first_when_used() {
    let ns = Namespace::new("todos").description("TODO operations").route("/", ping());
    let doc = doc_of(Api::new(()).namespace(ns).route("/health", ping()));
    let names: Vec<&str> = doc.namespaces.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["default", "todos"]);
    assert_eq!(doc.namespaces[0].description.as_deref(), Some("Default namespace"));

    let doc = doc_of(Api::new(()).namespace(Namespace::new("only").route("/", ping())));
    let names: Vec<&str> = doc.namespaces.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["only"]);
}

#[test]
fn documentation_records_paths_and_operations() {
    let item = Resource::new("TodoItem")
        .param("todo_id", "The todo identifier")
        .get(
            Operation::new(|_call| async { Ok::<_, ApiError>(json!({})) })
                .doc("Fetch a todo\nReturns the task and its id."),
        )
        .delete(Operation::new(|_call| async { Ok::<_, ApiError>(json!({})) }).deprecated());
    let ns = Namespace::new("todos").route("/<todo_id:int>", item);
    let doc = doc_of(Api::new(()).prefix("/api").namespace(ns));

    let route = &doc.namespaces[0].routes[0];
    assert_eq!(route.path, "/api/todos/{todo_id}");
    assert_eq!(route.resource, "TodoItem");
    let get = &route.operations[0];
    assert_eq!(get.method, "get");
    assert_eq!(get.operation_id, "get_todo_item");
    assert_eq!(get.summary.as_deref(), Some("Fetch a todo"));
    assert_eq!(get.description.as_deref(), Some("Returns the task and its id."));
    assert_eq!(get.params[0].description.as_deref(), Some("The todo identifier"));
    assert_eq!(get.responses[0].code, 200);
    assert!(route.operations[1].deprecated);
    assert_eq!(route.operations[1].responses[0].code, 204);
    assert_eq!(doc.paths().collect::<Vec<_>>(), ["/api/todos/{todo_id}"]);
}

#[test]
fn explicit_operation_id_and_dedup() {
    let a = Resource::new("A").get(
        Operation::new(|_call| async { Ok::<_, ApiError>(json!(1)) }).operation_id("list"),
    );
    let b = Resource::new("B").get(
        Operation::new(|_call| async { Ok::<_, ApiError>(json!(1)) }).operation_id("list"),
    );
    let doc = doc_of(Api::new(()).route("/a", a).route("/b", b));
    let ids: Vec<&str> = doc.namespaces[0]
        .routes
        .iter()
        .map(|r| r.operations[0].operation_id.as_str())
        .collect();
    assert_eq!(ids, ["list", "list_2"]);
}

#[test]
fn models_collected_once() {
    let todo = Model::builder("Todo").field("task", Field::string()).build().unwrap();
    let res = Resource::new("Todos")
        .get(Operation::new(|_call| async { Ok::<_, ApiError>(json!([])) }).marshal_list_with(&todo))
        .post(
            Operation::new(|_call| async { Ok::<_, ApiError>(json!({})) })
                .expect(&todo)
                .marshal_with(&todo),
        );
    let extra = Model::builder("Extra").field("x", Field::integer()).build().unwrap();
    let doc = doc_of(
        Api::new(())
            .model(&extra)
            .namespace(Namespace::new("todos").model(&todo).route("/", res)),
    );
    let names: Vec<&str> = doc.models.iter().map(|m| m.name()).collect();
    assert_eq!(names, ["Extra", "Todo"]);
}

#[test]
fn mask_header_documented_only_when_enabled() {
    let todo = Model::builder("Todo").field("task", Field::string()).build().unwrap();
    let res = || {
        Resource::new("Todo").get(
            Operation::new(|_call| async { Ok::<_, ApiError>(json!({})) }).marshal_with(&todo),
        )
    };
    let doc = doc_of(Api::new(()).route("/t", res()));
    assert!(doc.namespaces[0].routes[0].operations[0]
        .params
        .iter()
        .any(|p| p.name == "X-Fields"));

    let settings = restplus_core::ApiSettings {
        mask_swagger: false,
        ..Default::default()
    };
    let doc = doc_of(Api::new(()).settings(settings).route("/t", res()));
    assert!(doc.namespaces[0].routes[0].operations[0].params.is_empty());
}

#[test]
fn patterns_differing_only_in_parameter_names_clash() {
    let ns = Namespace::new("todos").route("/<id>", ping()).route("/<todo_id>", ping());
    let err = Api::new(()).namespace(ns).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::DuplicateRoute { ref pattern, .. } if pattern == "/<todo_id>"));

    let ns = Namespace::new("todos").route("/<id>", ping()).route("/<id:int>", ping());
    let err = Api::new(()).namespace(ns).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::DuplicateRoute { .. }));

    let ns = Namespace::new("things").route("x", ping()).route("/x", ping());
    let err = Api::new(()).namespace(ns).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::DuplicateRoute { .. }));
}

#[test]
fn same_shape_across_namespaces_is_a_path_conflict() {
    let a = Namespace::new("a").path("/items").route("/<id>", ping());
    let b = Namespace::new("b").path("/items").route("/<item_id:int>", ping());
    let err = Api::new(()).namespace(a).namespace(b).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::PathConflict { ref path } if path == "/items/{item_id}"));
}

#[test]
fn colon_segments_are_invalid_patterns() {
    let err = Api::new(()).route("/todos/:id", ping()).try_build().unwrap_err();
    assert!(matches!(err, SpecsError::InvalidPattern { .. }));
}
