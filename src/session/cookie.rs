use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};

/// Session id carried by the request's `Cookie` headers, if any.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

pub fn build_session_cookie(
    cookie_name: &str,
    session_id: &str,
    max_age: Option<Duration>,
) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        cookie_name, session_id
    );
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", max_age.as_secs()));
    }
    HeaderValue::from_str(&cookie).ok()
}

pub fn expired_session_cookie(cookie_name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        cookie_name
    ))
    .ok()
}
