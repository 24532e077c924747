//! Security headers middleware.
//!
//! Adds restrictive headers to every response. Images may come from the
//! hosted storage bucket, so `img-src` allows any https origin.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the CSP for a request, allowing inline scripts carrying `nonce`.
fn content_security_policy(nonce: Option<&str>) -> String {
    let script_src = nonce.filter(|n| !n.is_empty()).map_or_else(
        || "script-src 'self'".to_string(),
        |n| format!("script-src 'self' 'nonce-{n}'"),
    );
    format!(
        "default-src 'none'; \
         {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (analytics records referrers)
/// - `Content-Security-Policy` with the request's nonce
/// - `Cache-Control: no-store` everywhere except `/static`
/// - `Cross-Origin-Opener-Policy: same-origin`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let nonce = request.extensions().get::<CspNonce>().cloned();
    let is_static = request.uri().path().starts_with("/static/");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&content_security_policy(nonce.as_ref().map(CspNonce::value))) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    if !is_static {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}
