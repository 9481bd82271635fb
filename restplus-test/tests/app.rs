use restplus_core::{abort, Api, ApiError, Field, Model, Operation, Reply, Resource};
use restplus_openapi::SwaggerPlugin;
use restplus_test::TestApp;
use serde_json::json;

fn app() -> TestApp {
    let item = Model::builder("Item")
        .field("id", Field::integer())
        .field("name", Field::string().required())
        .build()
        .unwrap();
    let items = Resource::new("Items")
        .get(
            Operation::new(|_call| async {
                Ok::<_, ApiError>(json!([{"id": 1, "name": "one"}, {"id": 2, "name": "two"}]))
            })
            .marshal_list_with(&item),
        )
        .post(
            Operation::new(|call| async move {
                let name = call
                    .payload()
                    .and_then(|p| p.get("name"))
                    .cloned()
                    .or_else(|| call.form("name").map(|n| json!(n)))
                    .ok_or_else(|| abort(400, "name missing"))?;
                Ok::<_, ApiError>(json!({"id": 3, "name": name}))
            })
            .marshal_with(&item),
        );
    let one = Resource::new("Item").delete(Operation::new(|_call| async {
        Ok::<_, ApiError>(Reply::no_content())
    }));
    TestApp::from_api(
        Api::new(())
            .route("/items", items)
            .route("/items/<id:int>", one)
            .with(SwaggerPlugin::default()),
    )
}

#[tokio::test]
async fn get_with_json_path() {
    app()
        .get("/items")
        .send()
        .await
        .assert_ok()
        .assert_header("content-type", "application/json")
        .assert_json_path("len()", 2)
        .assert_json_path("[1].name", "two");
}

#[tokio::test]
async fn post_json_and_form() {
    let app = app();
    app.post("/items")
        .json(&json!({"name": "three"}))
        .send()
        .await
        .assert_created()
        .assert_json(json!({"id": 3, "name": "three"}));
    app.post("/items")
        .form(&[("name", "form")])
        .send()
        .await
        .assert_created()
        .assert_json_path("name", "form");
}

#[tokio::test]
async fn mask_header() {
    app()
        .get("/items")
        .mask("name")
        .send()
        .await
        .assert_ok()
        .assert_json(json!([{"name": "one"}, {"name": "two"}]));
}

#[tokio::test]
async fn errors_and_allow() {
    let app = app();
    let resp = app.post("/items").json(&json!({})).send().await.assert_bad_request();
    assert_eq!(resp.message(), "name missing");

    app.delete("/items/1").send().await.assert_no_content().assert_empty();
    app.put("/items/1")
        .send()
        .await
        .assert_method_not_allowed()
        .assert_allow(&["DELETE", "OPTIONS"]);
    app.get("/items")
        .accept("application/json;q=0")
        .send()
        .await
        .assert_not_acceptable();
}

#[tokio::test]
async fn swagger_through_test_app() {
    let spec: serde_json::Value = app().get("/swagger.json").send().await.assert_ok().json();
    assert_eq!(spec["paths"]["/items"]["get"]["operationId"], "get_items");
    assert_eq!(
        app().get("/swagger.json").send().await.json_path::<String>("swagger"),
        "2.0"
    );
}
