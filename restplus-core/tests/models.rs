use restplus_core::{marshal, marshal_serialize, Field, MarshalError, Model, SpecsError};
use serde::Serialize;
use serde_json::json;

fn todo() -> Model {
    Model::builder("Todo")
        .field("id", Field::integer().read_only())
        .field("task", Field::string().required().description("The task details"))
        .field("done", Field::boolean().default(false))
        .build()
        .unwrap()
}

// ── Marshaling ──────────────────────────────────────────────────────────────

#[test]
fn marshal_keeps_declared_fields_in_order() {
    let out = marshal(&json!({"task": "x", "secret": 1, "id": 7}), &todo()).unwrap();
    assert_eq!(out, json!({"id": 7, "task": "x", "done": false}));
    let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["id", "task", "done"]);
}

#[test]
fn marshal_missing_fields_become_null() {
    let out = marshal(&json!({}), &todo()).unwrap();
    assert_eq!(out, json!({"id": null, "task": null, "done": false}));
}

#[test]
fn marshal_lists_and_null() {
    let out = marshal(&json!([{"task": "a"}, {"task": "b"}]), &todo()).unwrap();
    assert_eq!(out[1]["task"], "b");
    assert_eq!(marshal(&json!(null), &todo()).unwrap(), json!(null));
}

#[test]
fn marshal_is_idempotent() {
    let once = marshal(&json!({"id": "3", "task": 12}), &todo()).unwrap();
    assert_eq!(once, json!({"id": 3, "task": "12", "done": false}));
    assert_eq!(marshal(&once, &todo()).unwrap(), once);
}

#[test]
fn marshal_reads_attribute() {
    let model = Model::builder("User")
        .field("name", Field::string().attribute("full_name"))
        .build()
        .unwrap();
    let out = marshal(&json!({"full_name": "Ada"}), &model).unwrap();
    assert_eq!(out, json!({"name": "Ada"}));
}

#[test]
fn marshal_nested_and_list_fields() {
    let todo = todo();
    let listed = Model::builder("ListedTodo")
        .field("id", Field::string())
        .field("todo", Field::nested(&todo))
        .field("tags", Field::list(Field::string()))
        .build()
        .unwrap();
    let out = marshal(
        &json!({"id": "todo1", "todo": {"task": "x", "extra": true}, "tags": ["a", 1]}),
        &listed,
    )
    .unwrap();
    assert_eq!(
        out,
        json!({"id": "todo1", "todo": {"id": null, "task": "x", "done": false}, "tags": ["a", "1"]})
    );
}

#[test]
fn marshal_rejects_wrong_types() {
    let err = marshal(&json!({"id": "seven"}), &todo()).unwrap_err();
    assert!(matches!(err, MarshalError::InvalidValue { ref field, .. } if field == "id"));
    assert!(matches!(
        marshal(&json!("text"), &todo()),
        Err(MarshalError::NotAnObject { .. })
    ));
}

#[test]
fn marshal_serializable_structs() {
    #[derive(Serialize)]
    struct Todo {
        id: u32,
        task: String,
        owner: String,
    }
    let out = marshal_serialize(
        &Todo {
            id: 1,
            task: "write".into(),
            owner: "me".into(),
        },
        &todo(),
    )
    .unwrap();
    assert_eq!(out, json!({"id": 1, "task": "write", "done": false}));
}

// ── Declaration ─────────────────────────────────────────────────────────────

#[test]
fn duplicate_field_is_rejected() {
    let err = Model::builder("Dup")
        .field("a", Field::string())
        .field("a", Field::integer())
        .build()
        .unwrap_err();
    assert!(matches!(err, SpecsError::DuplicateField { ref field, .. } if field == "a"));
}

#[test]
fn extend_inherits_and_overrides() {
    let base = todo();
    let child = base
        .extend("TodoWithOwner")
        .field("owner", Field::string())
        .override_field("done", Field::boolean().default(true))
        .build()
        .unwrap();
    assert_eq!(child.field_names(), ["id", "task", "done", "owner"]);
    assert_eq!(marshal(&json!({}), &child).unwrap()["done"], true);
    assert_eq!(base.len(), 3);
}

#[test]
fn schema_lists_required_and_read_only() {
    let schema = todo().schema();
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["task"]));
    assert_eq!(schema["properties"]["id"]["readOnly"], true);
    assert_eq!(schema["properties"]["task"]["description"], "The task details");
    assert_eq!(schema["properties"]["done"]["default"], false);
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn validate_accepts_valid_payload() {
    assert!(todo().validate(&json!({"task": "x", "done": true})).is_ok());
}

#[test]
fn validate_collects_every_error() {
    let err = todo().validate(&json!({"id": "x", "done": "yes"})).unwrap_err();
    let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["id", "task", "done"]);
    assert_eq!(err.errors[1].message, "'task' is a required property");
    assert_eq!(err.errors[0].message, "\"x\" is not of type 'integer'");
}

#[test]
fn validate_nested_uses_dotted_names() {
    let wrapper = Model::builder("Wrapper")
        .field("todo", Field::nested(&todo()).required())
        .field("todos", Field::list(Field::nested(&todo())))
        .build()
        .unwrap();
    let err = wrapper
        .validate(&json!({"todo": {}, "todos": [{"task": "ok"}, {"task": 3}]}))
        .unwrap_err();
    let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, ["todo.task", "todos.1.task"]);
}

#[test]
fn validate_non_object_payload() {
    let err = todo().validate(&json!([1, 2])).unwrap_err();
    assert_eq!(err.errors[0].field, "payload");
    assert!(todo().validate_list(&json!([{"task": "a"}, {"task": "b"}])).is_ok());
    let err = todo().validate_list(&json!([{"task": "a"}, {}])).unwrap_err();
    assert_eq!(err.errors[0].field, "1.task");
}
