use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Request-body matching semantics understood by the mock server: the actual
/// request body must contain every specified field with a matching value, but
/// may carry additional fields.
const ONLY_MATCHING_FIELDS: &str = "ONLY_MATCHING_FIELDS";

/// The criteria an incoming request must satisfy for a later
/// [`verify`](crate::MockServerFixture::verify) call to count it.
///
/// Both the JSON body and the headers are optional; an empty matcher accepts
/// any request on the expectation's path and method.
///
/// ### Example:
/// ```rust
/// use mockserver_fixture::RequestMatcher;
/// use serde_json::json;
///
/// let matcher = RequestMatcher::new()
///     .body(json!({"id": 1}))
///     .header("Content-Type", "application/json");
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestMatcher {
    pub(crate) body: Option<Value>,
    pub(crate) headers: Option<BTreeMap<String, Vec<String>>>,
}

impl RequestMatcher {
    /// A matcher with no constraints on body or headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the request body to contain the fields of `body`.
    ///
    /// Matching is partial: extra fields in the actual request body do not
    /// prevent a match.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Require a header `value` under `name`. Calling this twice with the same
    /// `name` appends to the list of required values for that header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

/// The blueprint for the response the mock server returns when the registered
/// expectation matches an incoming request.
///
/// The response body is always served as `application/json; charset=utf-8`.
/// The method defaults to `POST` and the status code to `200`.
///
/// ### Example:
/// ```rust
/// use mockserver_fixture::MockResponse;
/// use serde_json::json;
///
/// let response = MockResponse::new(json!({"ok": true}))
///     .method("PUT")
///     .status(201);
/// ```
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub(crate) method: String,
    pub(crate) status_code: u16,
    pub(crate) body: Value,
}

impl MockResponse {
    /// Start building a `MockResponse` specifying the JSON body to serve.
    pub fn new(body: Value) -> Self {
        Self {
            method: "POST".into(),
            status_code: 200,
            body,
        }
    }

    /// Override the HTTP method the expectation matches on.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Override the status code of the served response.
    pub fn status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }
}

/// A descriptor of a registered expectation, returned by
/// [`mock`](crate::MockServerFixture::mock) and consumed by
/// [`verify`](crate::MockServerFixture::verify).
///
/// The descriptor is a client-side echo of the matcher inputs - the mock
/// server does not hand out identifiers for registered expectations, so this
/// record is the only key verification has. It is immutable and single-use:
/// construct it by registering, pass it to `verify`, drop it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expectation {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonBodyMatcher>,
}

impl Expectation {
    pub(crate) fn new(path: &str, matcher: RequestMatcher, response: &MockResponse) -> Self {
        Self {
            method: response.method.clone(),
            path: path.into(),
            headers: matcher.headers,
            body: matcher.body.as_ref().map(JsonBodyMatcher::partial),
        }
    }
}

/// The body criterion embedded in an [`Expectation`]: a compact-serialized
/// JSON document matched as a subset of the actual request body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JsonBodyMatcher {
    #[serde(rename = "type")]
    pub kind: String,
    pub json: String,
    #[serde(rename = "matchType")]
    pub match_type: String,
}

impl JsonBodyMatcher {
    fn partial(body: &Value) -> Self {
        Self {
            kind: "JSON".into(),
            json: body.to_string(),
            match_type: ONLY_MATCHING_FIELDS.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_defaults_to_post_and_200() {
        let response = MockResponse::new(json!({"ok": true}));

        assert_eq!(response.method, "POST");
        assert_eq!(response.status_code, 200);
    }

    #[test]
    fn descriptor_echoes_the_matcher_inputs() {
        let matcher = RequestMatcher::new()
            .body(json!({"id": 1}))
            .header("Accept", "application/json");
        let response = MockResponse::new(json!({"ok": true})).method("PUT").status(201);

        let expectation = Expectation::new("/orders", matcher, &response);

        assert_eq!(expectation.method, "PUT");
        assert_eq!(expectation.path, "/orders");
        assert_eq!(
            expectation.headers.as_ref().unwrap()["Accept"],
            vec!["application/json".to_string()]
        );
        let body = expectation.body.unwrap();
        assert_eq!(body.kind, "JSON");
        assert_eq!(body.json, json!({"id": 1}).to_string());
        assert_eq!(body.match_type, "ONLY_MATCHING_FIELDS");
    }

    #[test]
    fn descriptor_omits_the_body_criterion_when_no_body_was_given() {
        let expectation = Expectation::new(
            "/orders",
            RequestMatcher::new(),
            &MockResponse::new(json!({"ok": true})),
        );

        assert!(expectation.body.is_none());
        let serialized = serde_json::to_value(&expectation).unwrap();
        assert_eq!(serialized, json!({"method": "POST", "path": "/orders"}));
    }

    #[test]
    fn body_criterion_serializes_with_the_mock_server_field_names() {
        let expectation = Expectation::new(
            "/orders",
            RequestMatcher::new().body(json!({"id": 1})),
            &MockResponse::new(json!({"ok": true})),
        );

        let serialized = serde_json::to_value(&expectation).unwrap();
        assert_eq!(
            serialized["body"],
            json!({
                "type": "JSON",
                "json": "{\"id\":1}",
                "matchType": "ONLY_MATCHING_FIELDS",
            })
        );
    }

    #[test]
    fn repeated_header_values_accumulate() {
        let matcher = RequestMatcher::new()
            .header("Accept", "application/json")
            .header("Accept", "text/plain");

        let headers = matcher.headers.unwrap();
        assert_eq!(headers["Accept"], vec!["application/json", "text/plain"]);
    }
}
