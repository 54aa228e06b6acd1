//! Stateless request builder and response parser.
//!
//! # Design
//! `ApiClient` holds the base URL and the credential mode and carries no
//! mutable state between calls. `build` turns a route, query, body and
//! optional token into an `HttpRequest`; `parse` folds an `HttpResponse` into
//! an `Envelope`. Whoever executes the round-trip in between is free to be a
//! `Transport`, a blocking agent, or a test double.

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::credential::CredentialMode;
use crate::envelope::{Envelope, ErrorCode};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Query parameters for `GET` calls, as a JSON object.
pub type Query = Map<String, Value>;

/// Synchronous, stateless client core.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    credential_mode: CredentialMode,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential_mode: CredentialMode::default(),
        }
    }

    pub fn with_credential_mode(mut self, mode: CredentialMode) -> Self {
        self.credential_mode = mode;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential_mode(&self) -> &CredentialMode {
        &self.credential_mode
    }

    /// Absolute URL for `path`, with `query` appended when present.
    pub fn url(&self, path: &str, query: Option<&Query>) -> String {
        let mut url = self.base_url.clone();
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);

        if let Some(encoded) = query.map(encode_query).filter(|q| !q.is_empty()) {
            url.push(if path.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }
        url
    }

    pub fn build(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&Query>,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = token {
            headers.push(self.credential_mode.header(token));
        }

        HttpRequest {
            method,
            url: self.url(path, query),
            headers,
            body: body.map(Value::to_string),
        }
    }

    pub fn build_get(&self, path: &str, query: Option<&Query>, token: Option<&str>) -> HttpRequest {
        self.build(HttpMethod::Get, path, query, None, token)
    }

    pub fn build_post(&self, path: &str, body: Option<&Value>, token: Option<&str>) -> HttpRequest {
        self.build(HttpMethod::Post, path, None, body, token)
    }

    pub fn build_put(&self, path: &str, body: Option<&Value>, token: Option<&str>) -> HttpRequest {
        self.build(HttpMethod::Put, path, None, body, token)
    }

    pub fn build_delete(&self, path: &str, token: Option<&str>) -> HttpRequest {
        self.build(HttpMethod::Delete, path, None, None, token)
    }

    /// Fold a received response into an `Envelope`.
    ///
    /// Status takes precedence over the body: an error status with a body
    /// that is not JSON still reports the status-derived code, with `null`
    /// data.
    pub fn parse(&self, response: HttpResponse) -> Envelope {
        let parsed = parse_body(response.status, &response.body);

        if response.is_success() {
            return match parsed {
                Ok(data) => Envelope::success(data),
                Err(e) => {
                    tracing::debug!(status = response.status, error = %e, "response body is not JSON");
                    Envelope::failure(ErrorCode::ParseError, None)
                }
            };
        }

        Envelope::failure(ErrorCode::from_status(response.status), parsed.ok())
    }
}

/// Only statuses that never carry content may come back empty; for them
/// the body reads as `null`.
fn parse_body(status: u16, body: &str) -> Result<Value, serde_json::Error> {
    if matches!(status, 204 | 205) && body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
}

fn encode_query(query: &Query) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    serializer.append_pair(key, &scalar_text(item));
                }
            }
            other => {
                serializer.append_pair(key, &scalar_text(other));
            }
        }
    }
    serializer.finish()
}

/// Strings go out verbatim; everything else as its JSON text.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080")
    }

    fn query(value: Value) -> Query {
        match value {
            Value::Object(map) => map,
            _ => panic!("query must be an object"),
        }
    }

    #[test]
    fn build_get_produces_correct_request() {
        let req = client().build_get("/user/1", None, None);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/user/1");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_get_encodes_query() {
        let q = query(json!({"status": "in-progress", "page": 2, "done": false, "skip": null}));
        let req = client().build_get("/tasks", Some(&q), None);
        assert_eq!(
            req.url,
            "http://localhost:8080/tasks?done=false&page=2&status=in-progress"
        );
    }

    #[test]
    fn query_arrays_repeat_the_key() {
        let q = query(json!({"tag": ["a b", "c&d"]}));
        assert_eq!(
            client().url("/tasks", Some(&q)),
            "http://localhost:8080/tasks?tag=a+b&tag=c%26d"
        );
    }

    #[test]
    fn empty_query_adds_nothing() {
        let q = query(json!({"only": null}));
        assert_eq!(client().url("/tasks", Some(&q)), "http://localhost:8080/tasks");
    }

    #[test]
    fn query_extends_existing_query_string() {
        let q = query(json!({"b": "2"}));
        assert_eq!(
            client().url("/tasks?a=1", Some(&q)),
            "http://localhost:8080/tasks?a=1&b=2"
        );
    }

    #[test]
    fn build_post_sets_json_content_type() {
        let body = json!({"email": "a@b.com", "password": "x"});
        let req = client().build_post("/user/signin", Some(&body), None);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/user/signin");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[test]
    fn build_post_without_body_has_no_content_type() {
        let req = client().build_post("/user/logout", None, None);
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn build_put_and_delete() {
        let body = json!({"status": "completed"});
        let put = client().build_put("/tasks/7", Some(&body), None);
        assert_eq!(put.method, HttpMethod::Put);
        assert!(put.body.is_some());

        let delete = client().build_delete("/tasks/7", None);
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.url, "http://localhost:8080/tasks/7");
        assert!(delete.body.is_none());
    }

    #[test]
    fn token_attached_as_bearer() {
        let req = client().build_get("/user/1", None, Some("t1"));
        assert_eq!(req.header("authorization"), Some("Bearer t1"));
        assert_eq!(req.header("cookie"), None);
    }

    #[test]
    fn token_attached_as_cookie() {
        let client = client().with_credential_mode(CredentialMode::cookie());
        let req = client.build_delete("/tasks/1", Some("t1"));
        assert_eq!(req.header("cookie"), Some("jwt=t1"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn no_token_no_credential_header() {
        let req = client().build_put("/tasks/1", None, None);
        assert_eq!(req.header("authorization"), None);
        assert_eq!(req.header("cookie"), None);
    }

    #[test]
    fn trailing_slash_is_stripped_and_leading_slash_added() {
        let client = ApiClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("health", None), "http://localhost:8080/api/health");
        assert_eq!(client.url("/health", None), "http://localhost:8080/api/health");
    }

    #[test]
    fn parse_success() {
        let envelope = client().parse(HttpResponse::new(200, r#"{"token":"t1","user":{"id":1}}"#));
        assert_eq!(
            envelope,
            Envelope::success(json!({"token": "t1", "user": {"id": 1}}))
        );
    }

    #[test]
    fn parse_created_with_array() {
        let envelope = client().parse(HttpResponse::new(201, "[1,2]"));
        assert_eq!(envelope, Envelope::success(json!([1, 2])));
    }

    #[test]
    fn parse_no_content_is_null() {
        let envelope = client().parse(HttpResponse::new(204, ""));
        assert_eq!(envelope, Envelope::success(Value::Null));
    }

    #[test]
    fn parse_empty_ok_body_is_parse_error() {
        for body in ["", "   \n"] {
            let envelope = client().parse(HttpResponse::new(200, body));
            assert_eq!(envelope, Envelope::failure(ErrorCode::ParseError, None), "{body:?}");
        }
        let envelope = client().parse(HttpResponse::new(205, ""));
        assert_eq!(envelope, Envelope::success(Value::Null));
    }

    #[test]
    fn parse_bad_json_is_parse_error() {
        let envelope = client().parse(HttpResponse::new(200, "<html>oops</html>"));
        assert_eq!(envelope, Envelope::failure(ErrorCode::ParseError, None));
    }

    #[test]
    fn parse_error_status_keeps_body() {
        let envelope = client().parse(HttpResponse::new(
            401,
            r#"{"ok":false,"code":"EMAIL_OR_PASSWORD_INVALID"}"#,
        ));
        assert_eq!(envelope.code(), Some(ErrorCode::Unauthorized));
        assert_eq!(envelope.data()["code"], "EMAIL_OR_PASSWORD_INVALID");
    }

    #[test]
    fn parse_error_status_with_text_body_has_null_data() {
        let envelope = client().parse(HttpResponse::new(500, "internal error"));
        assert_eq!(envelope, Envelope::failure(ErrorCode::ServerError, None));
    }

    #[test]
    fn parse_not_found() {
        let envelope = client().parse(HttpResponse::new(404, ""));
        assert_eq!(envelope, Envelope::failure(ErrorCode::NotFound, None));
    }

    #[test]
    fn parse_redirect_is_server_error() {
        let envelope = client().parse(HttpResponse::new(302, ""));
        assert_eq!(envelope.code(), Some(ErrorCode::ServerError));
    }
}
