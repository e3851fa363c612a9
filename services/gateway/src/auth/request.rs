//! Request view used by the authentication path.
//!
//! Handlers hand the authenticator their headers plus whichever path and
//! query parameters they parsed. Resource id extractors read from the same
//! view.
use axum::extract::Query;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use eventhub_authz::Identity;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
    path_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Headers and query parameters of `request`. Path parameters are only
    /// known after routing, so callers add them with [`Self::with_path_params`].
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
            .map(|Query(params)| params)
            .unwrap_or_default();
        Self::new(request.headers().clone()).with_query_params(query)
    }

    pub fn with_path_params(mut self, params: HashMap<String, String>) -> Self {
        self.path_params = params;
        self
    }

    pub fn with_query_params(mut self, params: HashMap<String, String>) -> Self {
        self.query_params = params;
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }
}

/// Derives the target resource id once the caller's identity is known.
pub type ResourceIdExtractor = dyn Fn(&RequestContext, &Identity) -> Option<String> + Send + Sync;

/// Strips a case-insensitive `Bearer ` prefix. Returns `None` for an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => &header[7..],
        _ => header,
    };
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// `userId` path parameter, falling back to `id`.
pub fn extract_user_id_from_path(request: &RequestContext) -> Option<String> {
    request
        .path_param("userId")
        .or_else(|| request.path_param("id"))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Named path parameter, falling back to `id`.
pub fn extract_resource_id(request: &RequestContext, param: &str) -> Option<String> {
    request
        .path_param(param)
        .or_else(|| request.path_param("id"))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn user_id_from_path() -> Box<ResourceIdExtractor> {
    Box::new(|request, _identity| extract_user_id_from_path(request))
}

pub fn path_param(name: &'static str) -> Box<ResourceIdExtractor> {
    Box::new(move |request, _identity| extract_resource_id(request, name))
}

pub fn query_param(name: &'static str) -> Box<ResourceIdExtractor> {
    Box::new(move |request, _identity| {
        request
            .query_param(name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_prefix_is_case_insensitive() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc"), Some("abc"));
    }

    #[test]
    fn bare_token_is_accepted() {
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn empty_token_is_none() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn authorization_header_lookup_ignores_case() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer t"));
        let request = RequestContext::new(headers);
        assert_eq!(request.authorization(), Some("Bearer t"));
        assert_eq!(request.header("Authorization"), Some("Bearer t"));
    }

    #[test]
    fn from_request_reads_headers_and_query() {
        let request = Request::builder()
            .uri("/v1/volunteer-tasks?resourceId=u1&page=2")
            .header("Authorization", "Bearer t")
            .body(())
            .expect("request");
        let context = RequestContext::from_request(&request);
        assert_eq!(context.authorization(), Some("Bearer t"));
        assert_eq!(context.query_param("resourceId"), Some("u1"));
        assert_eq!(context.query_param("page"), Some("2"));
        assert_eq!(context.path_param("id"), None);
    }

    #[test]
    fn user_id_prefers_user_id_param() {
        let request = RequestContext::default()
            .with_path_param("userId", "u1")
            .with_path_param("id", "x");
        assert_eq!(extract_user_id_from_path(&request).as_deref(), Some("u1"));

        let request = RequestContext::default().with_path_param("id", "x");
        assert_eq!(extract_user_id_from_path(&request).as_deref(), Some("x"));

        assert_eq!(extract_user_id_from_path(&RequestContext::default()), None);
    }

    #[test]
    fn resource_id_falls_back_to_id() {
        let request = RequestContext::default().with_path_param("taskId", "t-9");
        assert_eq!(extract_resource_id(&request, "taskId").as_deref(), Some("t-9"));

        let request = RequestContext::default().with_path_param("id", "c-1");
        assert_eq!(extract_resource_id(&request, "courseId").as_deref(), Some("c-1"));
    }

    #[test]
    fn boxed_extractors_read_request() {
        let identity = Identity::new("u1", Vec::new());
        let request = RequestContext::default()
            .with_path_param("volunteerId", "u1")
            .with_query_param("resourceId", "r-2");
        assert_eq!(path_param("volunteerId")(&request, &identity).as_deref(), Some("u1"));
        assert_eq!(query_param("resourceId")(&request, &identity).as_deref(), Some("r-2"));
        assert_eq!(user_id_from_path()(&request, &identity), None);
    }
}
