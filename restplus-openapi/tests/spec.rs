use http::Request;
use http_body_util::BodyExt;
use restplus_core::http::{Body, Router};
use restplus_core::{
    Api, ApiInfo, Field, Model, Namespace, Operation, Reply, Resource, Argument, ArgKind,
    Location, RequestParser,
};
use restplus_openapi::{SwaggerConfig, SwaggerPlugin};
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn todo_model() -> Model {
    Model::builder("Todo")
        .field("id", Field::integer().read_only().description("The task unique identifier"))
        .field("task", Field::string().required().description("The task details"))
        .build()
        .unwrap()
}

fn todo_api(prefix: &str) -> Api<()> {
    let todo = todo_model();
    let list = Resource::new("TodoList")
        .doc("Shows a list of all todos")
        .get(
            Operation::new(|_call| async { Ok::<_, restplus_core::ApiError>(json!([])) })
                .doc("List all tasks")
                .marshal_list_with(&todo),
        )
        .post(
            Operation::new(|call| async move { Ok::<_, restplus_core::ApiError>(call.payload().cloned().unwrap_or_default()) })
                .doc("Create a new task")
                .expect(&todo)
                .marshal_with(&todo),
        );
    let item = Resource::new("Todo")
        .param("todo_id", "The task identifier")
        .response(404, "Todo not found", None)
        .get(Operation::new(|_call| async { Ok::<_, restplus_core::ApiError>(json!({})) }).marshal_with(&todo))
        .delete(
            Operation::new(|_call| async { Ok::<_, restplus_core::ApiError>(Reply::no_content()) })
                .response(204, "Todo deleted", None),
        );
    let ns = Namespace::new("todos")
        .description("TODO operations")
        .route("/", list)
        .route("/<todo_id:int>", item);

    Api::new(())
        .info(ApiInfo::new("TodoMVC API", "1.0").description("A simple TodoMVC API"))
        .prefix(prefix)
        .namespace(ns)
}

async fn get_json(router: Router, path: &str) -> (http::StatusCode, Value) {
    let req = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

async fn spec_of(api: Api<()>, path: &str) -> Value {
    let router = api.with(SwaggerPlugin::default()).build();
    let (status, spec) = get_json(router, path).await;
    assert_eq!(status, http::StatusCode::OK);
    spec
}

// ── Document ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn document_header() {
    let spec = spec_of(todo_api(""), "/swagger.json").await;
    assert_eq!(spec["swagger"], "2.0");
    assert_eq!(spec["basePath"], "/");
    assert_eq!(spec["info"]["title"], "TodoMVC API");
    assert_eq!(spec["info"]["version"], "1.0");
    assert_eq!(spec["info"]["description"], "A simple TodoMVC API");
    assert_eq!(spec["produces"], json!(["application/json"]));
    assert_eq!(spec["consumes"], json!(["application/json"]));
    assert!(spec["responses"]["ParseError"].is_object());
    assert!(spec["responses"]["MaskError"].is_object());
    assert!(spec.get("host").is_none());
}

#[tokio::test]
async fn prefix_becomes_base_path() {
    let spec = spec_of(todo_api("/api"), "/api/swagger.json").await;
    assert_eq!(spec["basePath"], "/api");
    assert!(spec["paths"]["/todos"].is_object());
    assert!(spec["paths"]["/todos/{todo_id}"].is_object());
}

#[tokio::test]
async fn operations_are_documented() {
    let spec = spec_of(todo_api(""), "/swagger.json").await;
    let list = &spec["paths"]["/todos"];
    assert_eq!(list["get"]["operationId"], "get_todo_list");
    assert_eq!(list["get"]["summary"], "List all tasks");
    assert_eq!(list["get"]["tags"], json!(["todos"]));
    assert_eq!(
        list["get"]["responses"]["200"]["schema"],
        json!({"type": "array", "items": {"$ref": "#/definitions/Todo"}})
    );

    let post = &list["post"];
    assert_eq!(post["operationId"], "post_todo_list");
    let body = post["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["in"] == "body")
        .unwrap();
    assert_eq!(body["name"], "payload");
    assert_eq!(body["schema"], json!({"$ref": "#/definitions/Todo"}));
    assert!(post["responses"]["201"].is_object());
}

#[tokio::test]
async fn path_params_and_resource_responses() {
    let spec = spec_of(todo_api(""), "/swagger.json").await;
    let item = &spec["paths"]["/todos/{todo_id}"];
    let params = item["get"]["parameters"].as_array().unwrap();
    let id = params.iter().find(|p| p["name"] == "todo_id").unwrap();
    assert_eq!(id["in"], "path");
    assert_eq!(id["type"], "integer");
    assert_eq!(id["required"], true);
    assert_eq!(id["description"], "The task identifier");

    assert_eq!(item["get"]["responses"]["404"]["description"], "Todo not found");
    assert_eq!(item["delete"]["responses"]["204"]["description"], "Todo deleted");
    assert!(item["delete"]["responses"]["204"].get("schema").is_none());
}

#[tokio::test]
async fn mask_header_is_documented() {
    let spec = spec_of(todo_api(""), "/swagger.json").await;
    let params = spec["paths"]["/todos/{todo_id}"]["get"]["parameters"]
        .as_array()
        .unwrap()
        .clone();
    let mask = params.iter().find(|p| p["name"] == "X-Fields").unwrap();
    assert_eq!(mask["in"], "header");
    assert_eq!(mask["format"], "mask");

    let delete_params = &spec["paths"]["/todos/{todo_id}"]["delete"]["parameters"];
    let has_mask = delete_params
        .as_array()
        .is_some_and(|ps| ps.iter().any(|p| p["name"] == "X-Fields"));
    assert!(!has_mask);
}

#[tokio::test]
async fn definitions_include_nested_models() {
    let address = Model::builder("Address")
        .field("city", Field::string())
        .build()
        .unwrap();
    let person = Model::builder("Person")
        .field("name", Field::string().required())
        .field("address", Field::nested(&address))
        .build()
        .unwrap();
    let api = Api::new(()).route(
        "/people",
        Resource::new("People").get(
            Operation::new(|_call| async { Ok::<_, restplus_core::ApiError>(json!([])) })
                .marshal_list_with(&person),
        ),
    );
    let spec = spec_of(api, "/swagger.json").await;
    assert_eq!(spec["definitions"]["Person"]["required"], json!(["name"]));
    assert_eq!(
        spec["definitions"]["Person"]["properties"]["address"],
        json!({"$ref": "#/definitions/Address"})
    );
    assert!(spec["definitions"]["Address"].is_object());
}

#[tokio::test]
async fn definitions_omitted_without_models() {
    let api = Api::new(()).route(
        "/ping",
        Resource::new("Ping").get(Operation::new(|_call| async {
            Ok::<_, restplus_core::ApiError>(json!("pong"))
        })),
    );
    let spec = spec_of(api, "/swagger.json").await;
    assert!(spec.get("definitions").is_none());
}

#[tokio::test]
async fn tags_list_configured_then_namespaces() {
    let api = todo_api("")
        .tag("admin", Some("Administration"))
        .namespace(Namespace::new("empty"));
    let spec = spec_of(api, "/swagger.json").await;
    assert_eq!(
        spec["tags"],
        json!([
            {"name": "admin", "description": "Administration"},
            {"name": "todos", "description": "TODO operations"}
        ])
    );
}

#[tokio::test]
async fn default_namespace_listed_first() {
    let api = todo_api("").route(
        "/health",
        Resource::new("Health").get(Operation::new(|_call| async {
            Ok::<_, restplus_core::ApiError>(json!("ok"))
        })),
    );
    let spec = spec_of(api, "/swagger.json").await;
    assert_eq!(spec["tags"][0]["name"], "default");
    assert_eq!(spec["tags"][0]["description"], "Default namespace");
    assert_eq!(spec["paths"]["/health"]["get"]["tags"], json!(["default"]));
}

#[tokio::test]
async fn duplicate_operation_ids_get_suffixes() {
    let api = Api::new(())
        .route(
            "/a",
            Resource::new("Thing").get(Operation::new(|_call| async {
                Ok::<_, restplus_core::ApiError>(json!(1))
            })),
        )
        .route(
            "/b",
            Resource::new("Thing").get(Operation::new(|_call| async {
                Ok::<_, restplus_core::ApiError>(json!(2))
            })),
        );
    let spec = spec_of(api, "/swagger.json").await;
    assert_eq!(spec["paths"]["/a"]["get"]["operationId"], "get_thing");
    assert_eq!(spec["paths"]["/b"]["get"]["operationId"], "get_thing_2");
}

#[tokio::test]
async fn parser_arguments_are_documented() {
    let parser = RequestParser::new()
        .arg(
            Argument::new("page")
                .kind(ArgKind::Integer)
                .location(Location::Query)
                .default(1)
                .help("Page number"),
        )
        .arg(Argument::new("rate").kind(ArgKind::Float).location(Location::Json).required());
    let api = Api::new(()).route(
        "/items",
        Resource::new("Items").post(
            Operation::new(|_call| async { Ok::<_, restplus_core::ApiError>(json!({})) })
                .parser(parser),
        ),
    );
    let spec = spec_of(api, "/swagger.json").await;
    let params = spec["paths"]["/items"]["post"]["parameters"].as_array().unwrap().clone();
    let page = params.iter().find(|p| p["name"] == "page").unwrap();
    assert_eq!(page["in"], "query");
    assert_eq!(page["type"], "integer");
    assert_eq!(page["default"], 1);
    assert_eq!(page["description"], "Page number");

    let body = params.iter().find(|p| p["in"] == "body").unwrap();
    assert_eq!(body["schema"]["properties"]["rate"]["type"], "number");
    assert_eq!(body["schema"]["required"], json!(["rate"]));
}

#[tokio::test]
async fn host_is_emitted_when_configured() {
    let router = todo_api("")
        .with(SwaggerPlugin::new(SwaggerConfig::new().host("api.example.com")))
        .build();
    let (_, spec) = get_json(router, "/swagger.json").await;
    assert_eq!(spec["host"], "api.example.com");
}

#[tokio::test]
async fn license_and_contact_in_info() {
    let api = todo_api("").info(
        ApiInfo::new("API", "2.0")
            .terms_url("http://example.com/terms")
            .license("MIT", Some("http://opensource.org/licenses/MIT")),
    );
    let spec = spec_of(api, "/swagger.json").await;
    assert_eq!(spec["info"]["termsOfService"], "http://example.com/terms");
    assert_eq!(spec["info"]["license"]["name"], "MIT");
    assert_eq!(spec["info"]["license"]["url"], "http://opensource.org/licenses/MIT");
}
