//! Session middleware: opens the caller's session and issues its cookie.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use portcullis_core::config::SessionConfig;

use crate::state::AppState;

/// Load the session named by the cookie and expose it to the request.
///
/// Never rejects. Whenever a handler saved the session, the response gets a
/// `Set-Cookie` header carrying its id with a fresh `Max-Age`, matching the
/// lifetime the backend just granted.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let config = &state.config.session;
    let cookie_id = jar.get(&config.cookie_name).map(|c| c.value().to_string());

    let session = state.sessions.load(cookie_id.as_deref()).await;
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if let Some(id) = session.saved_id().await {
        match session_cookie(config, &id) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Failed to build session cookie"),
        }
    }
    response
}

/// `Set-Cookie` value for a session id.
pub fn session_cookie(
    config: &SessionConfig,
    id: &str,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let max_age = config.ttl().as_secs();
    let mut cookie = format!(
        "{}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        config.cookie_name
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        let config = SessionConfig {
            ttl_minutes: 2,
            ..SessionConfig::default()
        };
        let value = session_cookie(&config, "abc").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "portcullis_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=120"
        );

        let secure = SessionConfig {
            secure_cookie: true,
            ..SessionConfig::default()
        };
        assert!(
            session_cookie(&secure, "abc")
                .unwrap()
                .to_str()
                .unwrap()
                .ends_with("; Secure")
        );
    }
}
