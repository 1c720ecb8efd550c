//! Tests for the pagination schema

use super::*;
use crate::cursor::{compose, ComposeOptions, Cursor, PageType, PagingParameters};
use crate::error::{Bound, DecodeError, Error, ValidationError};
use crate::token::{encode, EncodeOptions};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use test_case::test_case;

fn raw(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn schema() -> PaginationSchema {
    PaginationSchema::new(SchemaConfig::new()).unwrap()
}

fn list(schema: &PaginationSchema, value: Value) -> PagingParameters {
    match schema.validate(&raw(value)).unwrap() {
        PageRequest::List(params) => params,
        PageRequest::Count => panic!("Expected list request"),
    }
}

fn invalid(schema: &PaginationSchema, value: Value) -> ValidationError {
    match schema.validate(&raw(value)) {
        Err(Error::Validation(e)) => e,
        other => panic!("Expected validation error, got {other:?}"),
    }
}

fn unsigned(payload: Value) -> String {
    encode(&payload, &EncodeOptions::new()).unwrap()
}

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_defaults_for_empty_request() {
    let params = list(&schema(), json!({}));
    assert_eq!(
        params,
        PagingParameters::new(25, vec!["id".to_string()], Map::new())
    );
}

#[test]
fn test_serialized_defaults() {
    let request = schema().validate(&Map::new()).unwrap();
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"limit": 25, "sort": ["id"], "filter": {}, "cursors": []})
    );
}

// ============================================================================
// Limit
// ============================================================================

#[test_case(json!("1"), 1 ; "lower bound")]
#[test_case(json!("15"), 15 ; "string")]
#[test_case(json!(25), 25 ; "max")]
fn test_limit_in_range(limit: Value, expected: u32) {
    assert_eq!(list(&schema(), json!({ "limit": limit })).limit, expected);
}

#[test]
fn test_limit_out_of_range() {
    assert_eq!(
        invalid(&schema(), json!({"limit": "0"})),
        ValidationError::out_of_range("limit", Bound::Min(1))
    );

    let err = invalid(&schema(), json!({"limit": "26"}));
    assert_eq!(err, ValidationError::out_of_range("limit", Bound::Max(25)));
    assert_eq!(err.to_string(), "\"limit\" must be less than or equal to 25");
}

#[test]
fn test_limit_not_a_number() {
    assert_eq!(
        invalid(&schema(), json!({"limit": "many"})),
        ValidationError::shape("limit", "must be a number")
    );
}

#[test]
fn test_custom_max() {
    let schema = PaginationSchema::new(SchemaConfig::new().max(5)).unwrap();
    assert_eq!(list(&schema, json!({"limit": "5"})).limit, 5);
    assert_eq!(
        invalid(&schema, json!({"limit": "6"})),
        ValidationError::out_of_range("limit", Bound::Max(5))
    );
    assert_eq!(list(&schema, json!({})).limit, 5);
}

// ============================================================================
// Sort
// ============================================================================

#[test]
fn test_sort_any_field_by_default() {
    assert_eq!(list(&schema(), json!({"sort": "foo"})).sort, vec!["foo", "id"]);
    assert_eq!(
        list(&schema(), json!({"sort": ["-foo", "bar"]})).sort,
        vec!["-foo", "bar", "id"]
    );
}

#[test]
fn test_sort_rejects_id_field() {
    let err = invalid(&schema(), json!({"sort": ["id"]}));
    assert_eq!(
        err,
        ValidationError::DuplicateIncludedValue {
            field: "sort".to_string(),
            index: 0,
            value: "id".to_string(),
        }
    );

    let err = invalid(&schema(), json!({"sort": ["foo", "-id"]}));
    assert!(matches!(
        err,
        ValidationError::DuplicateIncludedValue { index: 1, .. }
    ));
}

#[test]
fn test_sort_only_one_direction_marks_id() {
    // A doubled prefix names some other field, not the id
    assert_eq!(list(&schema(), json!({"sort": "--id"})).sort, vec!["--id", "id"]);
    assert_eq!(
        list(&schema(), json!({"sort": ["+-id"]})).sort,
        vec!["+-id", "id"]
    );
}

#[test]
fn test_sort_rejects_duplicates() {
    let err = invalid(&schema(), json!({"sort": ["foo", "foo"]}));
    assert_eq!(err.field(), "sort[1]");
}

#[test]
fn test_sort_valid_restricts_fields() {
    let schema = PaginationSchema::new(SchemaConfig::new().sort_valid(["foo", "bar"])).unwrap();

    assert_eq!(list(&schema, json!({"sort": "foo"})).sort, vec!["foo", "id"]);
    assert_eq!(
        list(&schema, json!({"sort": ["foo", "-BAR"]})).sort,
        vec!["foo", "-BAR", "id"]
    );
    assert_eq!(
        invalid(&schema, json!({"sort": "far"})),
        ValidationError::not_allowed("sort[0]", "far")
    );
    assert_eq!(
        invalid(&schema, json!({"sort": ["foo", "foobar"]})),
        ValidationError::not_allowed("sort[1]", "foobar")
    );
}

#[test]
fn test_default_sort_fields() {
    let schema =
        PaginationSchema::new(SchemaConfig::new().sort(["foo"]).sort_valid(["foo"])).unwrap();
    assert_eq!(list(&schema, json!({})).sort, vec!["foo", "id"]);
}

#[test]
fn test_default_sort_deduplicates_id() {
    let schema = PaginationSchema::new(SchemaConfig::new().sort(["name", "id"])).unwrap();
    assert_eq!(schema.default_sort(), ["name", "id"]);
}

#[test]
fn test_custom_uuid_key() {
    let schema = PaginationSchema::new(SchemaConfig::new().uuid_key("uuid")).unwrap();
    assert_eq!(list(&schema, json!({"sort": "id"})).sort, vec!["id", "uuid"]);
    assert!(matches!(
        invalid(&schema, json!({"sort": "uuid"})),
        ValidationError::DuplicateIncludedValue { .. }
    ));
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_filter_any_object_by_default() {
    let params = list(&schema(), json!({"filter": {"foo": "bar"}}));
    assert_eq!(params.filter["foo"], "bar");

    assert_eq!(
        invalid(&schema(), json!({"filter": "foo"})),
        ValidationError::shape("filter", "must be an object")
    );
}

#[test]
fn test_filter_schema() {
    let filter_schema = FilterSchema::new()
        .field("foo", FieldRule::string().default_value("abc"))
        .field("bar", FieldRule::number());
    let schema = PaginationSchema::new(SchemaConfig::new().filter_schema(filter_schema)).unwrap();

    let params = list(&schema, json!({"filter": {"foo": "xyz", "bar": "123"}}));
    assert_eq!(Value::Object(params.filter), json!({"foo": "xyz", "bar": 123}));

    let params = list(&schema, json!({}));
    assert_eq!(Value::Object(params.filter), json!({"foo": "abc"}));

    assert_eq!(
        invalid(&schema, json!({"filter": {"foo": 123}})),
        ValidationError::shape("filter.foo", "must be a string")
    );
    assert_eq!(
        invalid(&schema, json!({"filter": {"baz": 1}})),
        ValidationError::shape("filter.baz", "is not allowed")
    );
}

#[test]
fn test_filter_schema_rules() {
    let filter_schema = FilterSchema::new()
        .field("status", FieldRule::string().valid(vec![json!("open"), json!("closed")]))
        .field("age", FieldRule::integer().range(Some(0), Some(120)))
        .field("owner", FieldRule::string().required())
        .allow_unknown();
    let schema = PaginationSchema::new(SchemaConfig::new().filter_schema(filter_schema)).unwrap();

    let params = list(
        &schema,
        json!({"filter": {"owner": "me", "age": "30", "extra": true}}),
    );
    assert_eq!(params.filter["age"], 30);
    assert_eq!(params.filter["extra"], true);

    assert_eq!(
        invalid(&schema, json!({"filter": {}})),
        ValidationError::shape("filter.owner", "is required")
    );
    assert_eq!(
        invalid(&schema, json!({"filter": {"owner": "me", "status": "lost"}})),
        ValidationError::not_allowed("filter.status", json!("lost"))
    );
    assert_eq!(
        invalid(&schema, json!({"filter": {"owner": "me", "age": 121}})),
        ValidationError::out_of_range("filter.age", Bound::Max(120))
    );
}

// ============================================================================
// Count
// ============================================================================

#[test]
fn test_count_truthy_values() {
    for value in [json!("true"), json!("1"), json!(true)] {
        assert_eq!(
            schema().validate(&raw(json!({ "count": value }))).unwrap(),
            PageRequest::Count
        );
    }
}

#[test]
fn test_count_falsy_values() {
    assert!(matches!(
        invalid(&schema(), json!({"count": "false"})),
        ValidationError::NotAllowedValue { .. }
    ));
    assert_eq!(
        invalid(&schema(), json!({"count": 1})),
        ValidationError::shape("count", "must be a boolean")
    );
}

#[test]
fn test_count_valid_option() {
    let schema =
        PaginationSchema::new(SchemaConfig::new().count_valid(vec![json!("foo"), json!(-1)]))
            .unwrap();

    assert!(schema.validate(&raw(json!({"count": "foo"}))).unwrap().is_count());
    assert!(schema.validate(&raw(json!({"count": -1}))).unwrap().is_count());
    assert_eq!(
        invalid(&schema, json!({"count": "1"})),
        ValidationError::shape("count", "must be a boolean")
    );
}

#[test]
fn test_count_serializes_alone() {
    let request = schema().validate(&raw(json!({"count": "1"}))).unwrap();
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({"count": true}));
    assert!(request.parameters().is_none());
}

// ============================================================================
// Mutual Exclusivity
// ============================================================================

#[test_case(json!({"count": true, "limit": 1}), "limit" ; "count with limit")]
#[test_case(json!({"count": true, "sort": "foo"}), "sort" ; "count with sort")]
#[test_case(json!({"count": true, "page": "foo"}), "page" ; "count with page")]
fn test_count_is_exclusive(request: Value, conflict: &str) {
    assert_eq!(
        invalid(&schema(), request),
        ValidationError::MutuallyExclusiveFields {
            field: "count".to_string(),
            conflict: conflict.to_string(),
        }
    );
}

#[test_case(json!({"page": "foo", "limit": 1}), "limit" ; "page with limit")]
#[test_case(json!({"page": "foo", "sort": "foo"}), "sort" ; "page with sort")]
#[test_case(json!({"page": "foo", "filter": {}}), "filter" ; "page with filter")]
fn test_page_is_exclusive(request: Value, conflict: &str) {
    assert_eq!(
        invalid(&schema(), request),
        ValidationError::MutuallyExclusiveFields {
            field: "page".to_string(),
            conflict: conflict.to_string(),
        }
    );
}

#[test]
fn test_unknown_plain_field() {
    assert_eq!(
        invalid(&schema(), json!({"offset": 10})),
        ValidationError::shape("offset", "is not allowed")
    );
}

// ============================================================================
// Page
// ============================================================================

#[test]
fn test_page_first_token() {
    let token = unsigned(json!({
        "limit": 1,
        "sort": "id",
        "filter": {},
        "cursors": [],
        "type": "first"
    }));
    let params = list(&schema(), json!({ "page": token }));

    assert_eq!(params.limit, 1);
    assert_eq!(params.sort, vec!["id"]);
    assert_eq!(params.page_type, Some(PageType::First));
    assert!(params.cursors.is_empty());
    assert!(params.iat.is_some());
    assert!(params.exp.is_none());
}

#[test_case("next" ; "next token")]
#[test_case("prev" ; "prev token")]
fn test_page_with_cursors(page_type: &str) {
    let token = unsigned(json!({
        "limit": 1,
        "sort": ["id"],
        "filter": {},
        "cursors": [1],
        "type": page_type
    }));
    let params = list(&schema(), json!({ "page": token }));

    assert_eq!(params.page_type.map(|t| t.as_str()), Some(page_type));
    assert_eq!(params.cursors, vec![Cursor::from(1)]);
}

#[test]
fn test_page_pattern_mismatch() {
    assert_eq!(
        invalid(&schema(), json!({"page": "😈"})),
        ValidationError::shape("page", "fails to match the token pattern")
    );
    assert_eq!(
        invalid(&schema(), json!({"page": 42})),
        ValidationError::shape("page", "fails to match the token pattern")
    );
}

#[test]
fn test_page_first_with_cursors() {
    let token = unsigned(json!({
        "limit": 1, "sort": "id", "filter": {}, "cursors": [1], "type": "first"
    }));
    let err = invalid(&schema(), json!({ "page": token }));
    assert_eq!(
        err,
        ValidationError::out_of_range("page.cursors", Bound::Length(0))
    );
    assert_eq!(err.to_string(), "\"page.cursors\" must contain 0 items");
}

#[test]
fn test_page_next_without_cursors() {
    let token = unsigned(json!({
        "limit": 1, "sort": "id", "filter": {}, "cursors": [], "type": "next"
    }));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })),
        ValidationError::out_of_range("page.cursors", Bound::MinLength(1))
    );
}

#[test]
fn test_page_self_type_not_allowed() {
    let token = unsigned(json!({
        "limit": 1, "sort": "id", "filter": {}, "cursors": [1], "type": "self"
    }));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })),
        ValidationError::not_allowed("page.type", "self")
    );
}

#[test]
fn test_page_payload_shape() {
    let token = unsigned(json!({"sort": "id", "filter": {}, "cursors": [], "type": "first"}));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })),
        ValidationError::shape("page.limit", "is required")
    );

    let token = unsigned(json!({
        "limit": 26, "sort": "id", "filter": {}, "cursors": [], "type": "first"
    }));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })),
        ValidationError::out_of_range("page.limit", Bound::Max(25))
    );

    let token = unsigned(json!({
        "limit": 1, "sort": "name", "filter": {}, "cursors": [], "type": "first"
    }));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })),
        ValidationError::shape("page.sort", "must include \"id\"")
    );

    let token = unsigned(json!({
        "limit": 1, "sort": "id", "filter": {}, "cursors": [{"x": 1}], "type": "next"
    }));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })).field(),
        "page.cursors[0]"
    );

    let token = unsigned(json!({
        "limit": 1, "sort": "id", "filter": {}, "cursors": [], "type": "first", "admin": true
    }));
    assert_eq!(
        invalid(&schema(), json!({ "page": token })),
        ValidationError::shape("page.admin", "is not allowed")
    );
}

#[test]
fn test_page_decode_errors_propagate() {
    let token = encode(
        &json!({"limit": 1, "sort": "id", "filter": {}, "cursors": [], "type": "first"}),
        &EncodeOptions::new().expires_in(chrono::Duration::seconds(-1)),
    )
    .unwrap();
    let err = schema().validate(&raw(json!({ "page": token }))).unwrap_err();
    assert_eq!(err.as_decode(), Some(&DecodeError::Expired));
    assert_eq!(err.field(), Some("page"));
    assert_eq!(err.to_string(), "Decoding failed: \"page\" token expired");
}

#[test]
fn test_page_undecodable_token_names_page() {
    let err = schema()
        .validate(&raw(json!({ "page": "abc.def." })))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::PageToken {
            ref field,
            source: DecodeError::MalformedToken { .. },
        } if field == "page"
    ));
    assert!(err.is_client_error());
}

#[test]
fn test_page_signed_tokens() {
    let payload = json!({"limit": 2, "sort": "id", "filter": {}, "cursors": [], "type": "first"});
    let signed = encode(&payload, &EncodeOptions::new().secret(Some("s3cret"))).unwrap();

    let schema = PaginationSchema::new(SchemaConfig::new().secret("s3cret")).unwrap();
    assert_eq!(list(&schema, json!({ "page": signed.clone() })).limit, 2);

    // Unsigned tokens are refused once a secret is configured
    let err = schema
        .validate(&raw(json!({ "page": unsigned(payload) })))
        .unwrap_err();
    assert!(matches!(
        err.as_decode(),
        Some(DecodeError::VerificationFailed { .. })
    ));
    assert_eq!(err.field(), Some("page"));

    let other = PaginationSchema::new(SchemaConfig::new().secret("other")).unwrap();
    let err = other.validate(&raw(json!({ "page": signed }))).unwrap_err();
    assert_eq!(err.as_decode(), Some(&DecodeError::InvalidSignature));
    assert_eq!(err.field(), Some("page"));
}

#[test]
fn test_page_filter_schema_applies() {
    let filter_schema = FilterSchema::new().field("foo", FieldRule::string());
    let schema = PaginationSchema::new(SchemaConfig::new().filter_schema(filter_schema)).unwrap();

    let token = unsigned(json!({
        "limit": 1, "sort": "id", "filter": {"foo": 1}, "cursors": [], "type": "first"
    }));
    assert_eq!(
        invalid(&schema, json!({ "page": token })),
        ValidationError::shape("page.filter.foo", "must be a string")
    );
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_composed_tokens_validate() {
    let schema = PaginationSchema::new(SchemaConfig::new().max(3).secret("k")).unwrap();
    let query = list(&schema, json!({"limit": 3, "filter": {"foo": "bar"}}));
    let page = vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})];

    let tokens = compose(&query, &page, &schema.compose_options()).unwrap();

    let next = list(&schema, json!({ "page": tokens.next.unwrap() }));
    assert_eq!(next.page_type, Some(PageType::Next));
    assert_eq!(next.cursors, vec![Cursor::from(3)]);
    assert_eq!(next.filter["foo"], "bar");
    assert_eq!(next.sort, vec!["id"]);

    let first = list(&schema, json!({ "page": tokens.first }));
    assert_eq!(first.page_type, Some(PageType::First));
}

#[test]
fn test_resolve_prefers_token() {
    let token = PagingParameters::new(2, vec!["id".to_string()], Map::new())
        .with_type(PageType::Next)
        .with_cursors(vec![Cursor::from(5)]);

    let resolved = resolve(Some(token.clone()), || panic!("plain request consulted")).unwrap();
    assert_eq!(resolved, token);

    let plain = PagingParameters::new(25, vec!["id".to_string()], Map::new());
    let resolved = resolve(None, || Ok(plain.clone())).unwrap();
    assert_eq!(resolved, plain);
}

#[test]
fn test_validate_request_one_shot() {
    let request = validate_request(&raw(json!({"limit": 3})), &SchemaConfig::new()).unwrap();
    assert_eq!(request.parameters().unwrap().limit, 3);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_invalid_config() {
    assert!(PaginationSchema::new(SchemaConfig::new().max(0)).is_err());
    assert!(PaginationSchema::new(SchemaConfig::new().uuid_key("")).is_err());
    assert!(PaginationSchema::new(SchemaConfig::new().uuid_key("-id")).is_err());
    assert!(PaginationSchema::new(SchemaConfig::new().sort_valid(["("])).is_err());
    assert!(PaginationSchema::new(SchemaConfig::new().sort(["name"]).sort_valid(["date"])).is_err());
    assert!(PaginationSchema::new(SchemaConfig::new().expires_in("soon")).is_err());
    assert!(PaginationSchema::new(SchemaConfig::new().count_valid(vec![json!(null)])).is_err());

    let filter_schema = FilterSchema::new().field("n", FieldRule::integer().default_value("x"));
    assert!(PaginationSchema::new(SchemaConfig::new().filter_schema(filter_schema)).is_err());
}

#[test]
fn test_compose_options_from_config() {
    let schema = PaginationSchema::new(
        SchemaConfig::new()
            .uuid_key("uuid")
            .secret("k")
            .expires_in("15m"),
    )
    .unwrap();
    let options: ComposeOptions = schema.compose_options();

    assert_eq!(options.uuid_key, "uuid");
    assert_eq!(options.secret.as_deref(), Some("k"));
    assert_eq!(options.expires_in, Some(chrono::Duration::minutes(15)));
}
