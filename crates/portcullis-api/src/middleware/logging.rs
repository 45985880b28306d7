//! Access log with session cookie activity.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use tracing::{Level, debug, error, info, warn};

use crate::state::AppState;

/// Logs method, path, status and duration, plus whether the caller sent a
/// session cookie and whether the response set one.
///
/// Server errors log at `ERROR`, client errors at `WARN`, health checks at
/// `DEBUG` and everything else at `INFO`.
pub async fn request_logging(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session.cookie_name.as_str();
    let had_session = jar.get(cookie_name).is_some();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();
    let cookie_set = sets_cookie(response.headers(), cookie_name);
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    macro_rules! access {
        ($log:ident) => {
            $log!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                duration_ms,
                had_session,
                cookie_set,
                location,
                "HTTP request"
            )
        };
    }

    let level = level_for(&path, status);
    if level == Level::ERROR {
        access!(error);
    } else if level == Level::WARN {
        access!(warn);
    } else if level == Level::DEBUG {
        access!(debug);
    } else {
        access!(info);
    }

    response
}

fn level_for(path: &str, status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else if path == "/health" {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Whether any `Set-Cookie` header names `cookie_name`.
fn sets_cookie(headers: &HeaderMap, cookie_name: &str) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| {
            v.strip_prefix(cookie_name)
                .is_some_and(|rest| rest.starts_with('='))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_level_follows_status_and_path() {
        assert_eq!(level_for("/auth/login", StatusCode::INTERNAL_SERVER_ERROR), Level::ERROR);
        assert_eq!(level_for("/health", StatusCode::SERVICE_UNAVAILABLE), Level::ERROR);
        assert_eq!(level_for("/auth/signup", StatusCode::UNPROCESSABLE_ENTITY), Level::WARN);
        assert_eq!(level_for("/health", StatusCode::OK), Level::DEBUG);
        assert_eq!(level_for("/auth/me", StatusCode::FOUND), Level::INFO);
    }

    #[test]
    fn test_sets_cookie_matches_exact_name() {
        let mut headers = HeaderMap::new();
        assert!(!sets_cookie(&headers, "portcullis_session"));

        headers.append(SET_COOKIE, HeaderValue::from_static("portcullis_session_hint=1"));
        assert!(!sets_cookie(&headers, "portcullis_session"));

        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("portcullis_session=abc; Path=/; HttpOnly"),
        );
        assert!(sets_cookie(&headers, "portcullis_session"));
    }
}
