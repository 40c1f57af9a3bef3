//! Description of one logical request.

use reqwest::Method;
use serde::Serialize;
use stockpile_core::GroupId;
use url::Url;

use super::ApiError;

/// Query parameter that scopes list endpoints to a group.
pub const GROUP_SCOPE_PARAM: &str = "groupId";

/// Request payload.
///
/// Kept as owned data rather than a built `reqwest` body so the pipeline
/// can rebuild it for the single retry after a refresh.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// Multipart upload with a single `image` field.
    Image {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// Everything the pipeline needs to execute one request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path relative to the configured base URL.
    pub path: String,
    /// Extra path segments, percent-encoded when the URL is built.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Attach the bearer credential.
    pub requires_auth: bool,
    /// Allow one refresh-and-retry on a 401.
    pub allow_refresh_retry: bool,
}

impl RequestSpec {
    /// Authenticated request with refresh-retry enabled.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            body: None,
            requires_auth: true,
            allow_refresh_retry: true,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a path segment such as an entity id.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Scope to a group; `None` requests the default population.
    #[must_use]
    pub fn group_scope(self, group_id: Option<&GroupId>) -> Self {
        match group_id {
            Some(id) => self.query(GROUP_SCOPE_PARAM, id.as_str()),
            None => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the body cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Attach an image as a multipart body.
    #[must_use]
    pub fn image(
        mut self,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.body = Some(RequestBody::Image {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    /// No bearer credential and no refresh-retry.
    #[must_use]
    pub const fn unauthenticated(mut self) -> Self {
        self.requires_auth = false;
        self.allow_refresh_retry = false;
        self
    }

    /// Keep the credential but never refresh on 401.
    #[must_use]
    pub const fn without_refresh_retry(mut self) -> Self {
        self.allow_refresh_retry = false;
        self
    }

    /// Resolve the full URL against `base`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for a malformed target.
    pub fn url(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = base.join(self.path.trim_start_matches('/'))?;

        if !self.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| {
                    ApiError::InvalidRequest(format!("{base} cannot carry path segments"))
                })?
                .pop_if_empty()
                .extend(&self.segments);
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.com/v1/").unwrap()
    }

    #[test]
    fn test_defaults_require_auth_and_allow_retry() {
        let spec = RequestSpec::get("groups");
        assert!(spec.requires_auth);
        assert!(spec.allow_refresh_retry);

        let spec = spec.unauthenticated();
        assert!(!spec.requires_auth);
        assert!(!spec.allow_refresh_retry);
    }

    #[test]
    fn test_url_with_segments_and_scope() {
        let group = GroupId::new("g 1");
        let url = RequestSpec::delete("/categories")
            .segment("c/7")
            .group_scope(Some(&group))
            .url(&base())
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/categories/c%2F7?groupId=g+1"
        );
    }

    #[test]
    fn test_url_without_scope_has_no_query() {
        let url = RequestSpec::get("categories")
            .group_scope(None)
            .url(&base())
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/categories");
    }

    #[test]
    fn test_json_body() {
        let spec = RequestSpec::post("groups")
            .json(&serde_json::json!({"name": "Home"}))
            .unwrap();
        assert!(matches!(spec.body, Some(RequestBody::Json(ref v)) if v["name"] == "Home"));
    }
}
