use restplus_core::http::{Bytes, HeaderMap, HeaderValue, Method, Uri, CONTENT_TYPE};
use restplus_core::{ApiError, ArgKind, Argument, Call, Location, ParamLocation, RequestParser};
use serde_json::json;
use std::collections::HashMap;

fn call(uri: &str, content_type: Option<&str>, body: &str) -> Call<()> {
    let mut headers = HeaderMap::new();
    if let Some(ct) = content_type {
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
    }
    Call::new(
        (),
        Method::POST,
        uri.parse::<Uri>().unwrap(),
        headers,
        Bytes::from(body.to_string()),
    )
}

fn field_errors(err: ApiError) -> Vec<(String, String)> {
    match err {
        ApiError::Validation(v) => v.errors.into_iter().map(|e| (e.field, e.message)).collect(),
        other => panic!("expected a validation error, got {other}"),
    }
}

#[test]
fn reads_query_form_and_json() {
    let parser = RequestParser::new()
        .arg(Argument::new("page").kind(ArgKind::Integer).location(Location::Query))
        .arg(Argument::new("name"));
    let args = parser
        .parse(&call("/items?page=2", Some("application/json"), r#"{"name": "x"}"#))
        .unwrap();
    assert_eq!(args["page"], 2);
    assert_eq!(args["name"], "x");

    let args = parser
        .parse(&call("/items", Some("application/x-www-form-urlencoded"), "name=form+value"))
        .unwrap();
    assert_eq!(args["name"], "form value");
    assert_eq!(args["page"], json!(null));
}

#[test]
fn defaults_fill_missing_values() {
    let parser = RequestParser::new().arg(Argument::new("limit").kind(ArgKind::Integer).default(20));
    let args = parser.parse(&call("/", None, "")).unwrap();
    assert_eq!(args["limit"], 20);
}

#[test]
fn required_reports_every_location() {
    let parser = RequestParser::new()
        .arg(Argument::new("task").location(Location::Form).required().help("The task details"))
        .arg(Argument::new("token").location(Location::Headers).required());
    let errors = field_errors(parser.parse(&call("/", None, "")).unwrap_err());
    assert_eq!(
        errors,
        vec![
            (
                "task".to_string(),
                "The task details Missing required parameter in the post body".to_string()
            ),
            (
                "token".to_string(),
                "Missing required parameter in the HTTP headers".to_string()
            ),
        ]
    );
}

#[test]
fn conversion_and_choice_errors() {
    let parser = RequestParser::new()
        .arg(Argument::new("count").kind(ArgKind::Integer).location(Location::Query))
        .arg(
            Argument::new("order")
                .location(Location::Query)
                .choices(["asc", "desc"]),
        );
    let errors = field_errors(parser.parse(&call("/?count=many&order=up", None, "")).unwrap_err());
    assert_eq!(errors[0].1, "invalid literal for integer: \"many\"");
    assert_eq!(errors[1].1, "\"up\" is not a valid choice");
}

#[test]
fn booleans_and_floats_from_strings() {
    let parser = RequestParser::new()
        .arg(Argument::new("flag").kind(ArgKind::Boolean).location(Location::Query))
        .arg(Argument::new("ratio").kind(ArgKind::Float).location(Location::Query));
    let args = parser.parse(&call("/?flag=yes&ratio=0.5", None, "")).unwrap();
    assert_eq!(args["flag"], true);
    assert_eq!(args["ratio"], 0.5);
}

#[test]
fn path_arguments() {
    let parser = RequestParser::new().arg(
        Argument::new("id")
            .kind(ArgKind::Integer)
            .location(Location::Path),
    );
    let call = call("/items/7", None, "")
        .with_params(HashMap::from([("id".to_string(), "7".to_string())]));
    assert_eq!(parser.parse(&call).unwrap()["id"], 7);
}

#[test]
fn redeclaring_replaces_argument() {
    let parser = RequestParser::new()
        .arg(Argument::new("q").required())
        .arg(Argument::new("q").default("all"));
    assert_eq!(parser.args().len(), 1);
    assert_eq!(parser.parse(&call("/", None, "")).unwrap()["q"], "all");
}

#[test]
fn documentation_splits_params_and_body() {
    let parser = RequestParser::new()
        .arg(Argument::new("page").kind(ArgKind::Integer).location(Location::Query))
        .arg(Argument::new("task").location(Location::Form).required())
        .arg(Argument::new("meta").location(Location::Json));
    let params = parser.documented_params();
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].location, ParamLocation::Query);
    assert_eq!(params[0].param_type, "integer");
    assert_eq!(params[1].location, ParamLocation::FormData);
    assert!(params[1].required);

    let schema = parser.body_schema().unwrap();
    assert_eq!(schema["properties"]["meta"]["type"], "string");
    assert!(schema.get("required").is_none());
}
