//! One-shot notices carried across a redirect in a cookie.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};

pub const FLASH_COOKIE: &str = "flash";

/// Notices currently queued in the request's cookie.
pub fn read(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == FLASH_COOKIE)
        .filter_map(|(_, value)| urlencoding::decode(value).ok())
        .flat_map(|decoded| {
            decoded
                .split('\n')
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// `Set-Cookie` value queueing `notices`.
pub fn set_cookie(notices: &[String]) -> HeaderValue {
    let encoded = urlencoding::encode(&notices.join("\n")).into_owned();
    // Percent-encoding leaves only visible ASCII, which is always a valid header value.
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE, encoded
    ))
    .unwrap_or_else(|_| clear_cookie())
}

/// `Set-Cookie` value removing the flash cookie.
pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Whether the request carries a flash cookie at all.
pub fn present(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .any(|pair| pair.trim().starts_with("flash="))
}

/// Append a `Set-Cookie` header to a response header map.
pub fn append(headers: &mut HeaderMap, value: HeaderValue) {
    headers.append(SET_COOKIE, value);
}
