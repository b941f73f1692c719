//! Client context extraction from request headers.

use axum::http::HeaderMap;
use habita_auth::signin::RequestContext;

const H_APP_VERSION: &str = "x-app-version";
const H_PLATFORM: &str = "x-platform";
const H_FORWARDED_FOR: &str = "x-forwarded-for";
const H_GEO: &str = "x-geo";

/// Build a [`RequestContext`] from the session headers. Missing or
/// unparseable values fall back to the context defaults rather than
/// failing the request.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let mut ctx = RequestContext::default();
    if let Some(v) = header_str(headers, H_APP_VERSION) {
        ctx.app_version = v.to_string();
    }
    if let Some(v) = header_str(headers, H_PLATFORM) {
        ctx.platform = v.to_string();
    }
    // Behind a proxy the first entry is the client address.
    if let Some(v) = header_str(headers, H_FORWARDED_FOR) {
        if let Some(first) = v.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                ctx.ip = first.to_string();
            }
        }
    }
    if let Some(v) = header_str(headers, H_GEO) {
        if let Ok(geo) = serde_json::from_str(v) {
            ctx.geo = geo;
        }
    }
    ctx
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn defaults_when_headers_absent() {
        let ctx = request_context(&HeaderMap::new());
        assert_eq!(ctx.app_version, "unknown");
        assert_eq!(ctx.platform, "unknown");
        assert_eq!(ctx.ip, "unknown");
        assert_eq!(ctx.geo, serde_json::json!({}));
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            H_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        let ctx = request_context(&headers);
        assert_eq!(ctx.ip, "203.0.113.9");
    }

    #[test]
    fn bad_geo_json_falls_back_to_empty_object() {
        let mut headers = HeaderMap::new();
        headers.insert(H_GEO, HeaderValue::from_static("not json"));
        headers.insert(H_PLATFORM, HeaderValue::from_static("android"));
        let ctx = request_context(&headers);
        assert_eq!(ctx.geo, serde_json::json!({}));
        assert_eq!(ctx.platform, "android");
    }
}
