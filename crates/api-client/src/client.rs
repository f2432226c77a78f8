//! HTTP transport shared by every service.

use crate::envelope::{decode, error_detail};
use crate::{ApiError, ApiResult};
use inder_core::{ClientConfig, Session};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A binary body returned by a download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Filename from `Content-Disposition`, when the server sent one.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for the INDER REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    server_root: String,
}

impl ApiClient {
    /// Builds a client from the resolved configuration.
    ///
    /// When the session holds a token every request carries `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the token cannot be used as a header value and
    /// `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: &Session) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = session.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidInput("session token is not a valid header".into()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url().to_string(),
            server_root: config.server_root().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    pub(crate) fn root_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.server_root, path))
    }

    /// Sends `request` and turns any non-success status into an `ApiError`.
    pub(crate) async fn execute(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(endpoint, "request failed: {err}");
                return Err(ApiError::Network(err));
            }
        };

        let status = response.status();
        tracing::debug!(endpoint, status = status.as_u16(), "response received");

        if status.is_success() {
            return Ok(response);
        }

        let fallback = status.canonical_reason().unwrap_or("error").to_string();
        let body = response.bytes().await.unwrap_or_default();
        let detail = error_detail(&body, &fallback);
        tracing::info!(endpoint, status = status.as_u16(), "server rejected request: {detail}");

        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound { detail },
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { detail },
            other => ApiError::Status {
                status: other.as_u16(),
                detail,
            },
        })
    }

    /// Sends `request` and decodes the body strictly as `T`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.execute(endpoint, request).await?;
        let bytes = response.bytes().await?;
        decode(endpoint, &bytes)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let endpoint = format!("GET {path}");
        self.fetch(&endpoint, self.request(Method::GET, path)).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let endpoint = format!("GET {path}");
        self.fetch(&endpoint, self.request(Method::GET, path).query(query))
            .await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = format!("POST {path}");
        self.fetch(&endpoint, self.request(Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = format!("PUT {path}");
        self.fetch(&endpoint, self.request(Method::PUT, path).json(body))
            .await
    }

    /// Deletes a resource. Any response body is ignored.
    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        let endpoint = format!("DELETE {path}");
        self.execute(&endpoint, self.request(Method::DELETE, path))
            .await?;
        Ok(())
    }

    pub(crate) async fn download(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<Download> {
        let response = self.execute(endpoint, request).await?;
        let headers = response.headers();
        let filename = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_disposition);
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(Download {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Pulls the filename out of a `Content-Disposition` header value.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Reduces a server-provided filename to its last path component.
///
/// Returns `None` for names that would leave the target directory.
pub fn sanitise_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=historia_clinica_1098.pdf"),
            Some("historia_clinica_1098.pdf".into())
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="informe final.pdf""#),
            Some("informe final.pdf".into())
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn test_sanitise_filename() {
        assert_eq!(
            sanitise_filename("../../etc/passwd"),
            Some("passwd".into())
        );
        assert_eq!(sanitise_filename("a\\b\\c.pdf"), Some("c.pdf".into()));
        assert_eq!(sanitise_filename(".."), None);
        assert_eq!(sanitise_filename("dir/"), None);
    }

    #[test]
    fn test_client_builds_with_and_without_token() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut session = Session::empty(temp.path().join("session.json"));
        let client = ApiClient::new(&ClientConfig::default(), &session).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api/v1");

        session.sign_in("abc".into(), None).unwrap();
        assert!(ApiClient::new(&ClientConfig::default(), &session).is_ok());
    }
}
