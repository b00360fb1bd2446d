use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Adds CORS headers to every response and answers preflight requests itself.
///
/// An origin on the allow-list is echoed back. Anything else gets the first
/// allow-listed origin, so browsers on other origins are refused client-side.
pub async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = allowed_origin(request.headers(), &state.config.security.cors_origins);

    let mut response = if request.method() == Method::OPTIONS {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::OK;
        preflight
    } else {
        next.run(request).await
    };

    apply_headers(response.headers_mut(), origin);
    response
}

fn allowed_origin<'a>(headers: &HeaderMap, allow_list: &'a [String]) -> Option<&'a str> {
    let requested = headers.get(ORIGIN).and_then(|v| v.to_str().ok());

    match requested {
        Some(origin) => allow_list
            .iter()
            .find(|allowed| allowed.as_str() == origin)
            .or_else(|| allow_list.first())
            .map(String::as_str),
        None => allow_list.first().map(String::as_str),
    }
}

fn apply_headers(headers: &mut HeaderMap, origin: Option<&str>) {
    if let Some(value) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.append(VARY, HeaderValue::from_static("Origin"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> Vec<String> {
        vec!["http://localhost:3000".to_string(), "https://panel.example".to_string()]
    }

    fn with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers
    }

    #[test]
    fn listed_origin_is_echoed() {
        let list = allow_list();
        assert_eq!(
            allowed_origin(&with_origin("https://panel.example"), &list),
            Some("https://panel.example")
        );
    }

    #[test]
    fn unknown_or_missing_origin_falls_back_to_first() {
        let list = allow_list();
        assert_eq!(
            allowed_origin(&with_origin("https://evil.example"), &list),
            Some("http://localhost:3000")
        );
        assert_eq!(allowed_origin(&HeaderMap::new(), &list), Some("http://localhost:3000"));
    }
}
