//! Response envelope and strict decoding.
//!
//! A successful response body is the resource itself: an object, or an array for list
//! endpoints. The one exception is [`Page`], which the client builds for the athlete list
//! because the backend returns it unpaginated.
//!
//! Error bodies follow the backend's `{"detail": ...}` convention, where `detail` is either
//! a message or a list of field validation errors.

use crate::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cuts page `page` (1-based) of size `page_size` out of the full list.
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = all.len();
        let total_pages = total.div_ceil(page_size);
        let items = all
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// Decodes `bytes` as `T`, reporting the JSON path of the first mismatch.
pub fn decode<T: DeserializeOwned>(endpoint: &str, bytes: &[u8]) -> ApiResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| ApiError::Decode {
        endpoint: endpoint.to_string(),
        path: err.path().to_string(),
        message: err.inner().to_string(),
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Deserialize)]
struct FieldError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

/// Extracts a readable message from an error body.
///
/// Falls back to the raw text, or to `fallback` when the body is empty.
pub fn error_detail(bytes: &[u8], fallback: &str) -> String {
    if let Ok(body) = serde_json::from_slice::<ErrorBody>(bytes) {
        return match body.detail {
            Detail::Message(message) => message,
            Detail::Fields(errors) => errors
                .into_iter()
                .map(|e| {
                    let loc: Vec<String> = e
                        .loc
                        .iter()
                        .filter(|part| part.as_str() != Some("body"))
                        .map(|part| match part {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect();
                    if loc.is_empty() {
                        e.msg
                    } else {
                        format!("{}: {}", loc.join("."), e.msg)
                    }
                })
                .collect::<Vec<_>>()
                .join("; "),
        };
    }

    let text = String::from_utf8_lossy(bytes).trim().to_string();
    if text.is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let page = Page::paginate((1..=25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);

        let empty = Page::paginate(Vec::<u8>::new(), 0, 0);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_paginate_page_far_past_the_end() {
        let page = Page::paginate(vec![1, 2, 3], usize::MAX, 20);
        assert!(page.items.is_empty());
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_decode_reports_path() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Item {
            id: u32,
        }

        let err = decode::<Vec<Item>>("GET /x", br#"[{"id": 1}, {"id": "dos"}]"#)
            .expect_err("second id is a string");
        match err {
            ApiError::Decode { endpoint, path, .. } => {
                assert_eq!(endpoint, "GET /x");
                assert_eq!(path, "[1].id");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_detail_message() {
        assert_eq!(
            error_detail(r#"{"detail": "Enlace no válido o expirado"}"#.as_bytes(), "x"),
            "Enlace no válido o expirado"
        );
    }

    #[test]
    fn test_error_detail_validation_list() {
        let body = br#"{"detail": [{"loc": ["body", "cedula"], "msg": "field required", "type": "missing"}]}"#;
        assert_eq!(error_detail(body, "x"), "cedula: field required");
    }

    #[test]
    fn test_error_detail_fallbacks() {
        assert_eq!(error_detail(b"Bad Gateway", "502"), "Bad Gateway");
        assert_eq!(error_detail(b"", "Internal Server Error"), "Internal Server Error");
    }
}
