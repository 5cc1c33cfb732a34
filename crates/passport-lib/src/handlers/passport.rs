// ============================
// passport-lib/src/handlers/passport.rs
// ============================
//! Registration, login and session handlers.
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use homestay_common::{ApiResponse, Empty, LoginPayload, RegisterPayload, SessionUser};
use tracing::warn;

use crate::auth::{SessionHandle, SessionStore};
use crate::AppState;

/// Pull the session token out of the `Cookie` header, minting a fresh one
/// when the client has none yet
fn session_token(state: &AppState, headers: &HeaderMap) -> String {
    let cookie_name = &state.settings.session.cookie_name;
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, token) = pair.trim().split_once('=')?;
                (name == cookie_name.as_str()).then(|| token.to_string())
            })
        })
        .unwrap_or_else(SessionStore::mint_token)
}

fn session_handle(state: &AppState, headers: &HeaderMap) -> SessionHandle {
    state.sessions.handle(session_token(state, headers))
}

/// Client IP as reported by the reverse proxy
fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
}

/// Attach the session cookie to a success response
fn with_session_cookie(state: &AppState, handle: &SessionHandle, response: Response) -> Response {
    let mut response = response;
    let cookie = format!(
        "{}={}; Path=/; HttpOnly",
        state.settings.session.cookie_name,
        handle.token()
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(err) => {
            warn!(error = %err, "session cookie not representable as a header");
        }
    }
    response
}

/// `POST /api/v1.0/users` - register a new account
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterPayload>,
) -> Response {
    let handle = session_handle(&state, &headers);

    match state
        .auth
        .register(
            &payload.mobile,
            &payload.sms_code,
            &payload.password,
            &payload.password2,
            &handle,
        )
        .await
    {
        Ok(()) => {
            let body: ApiResponse<Empty> = ApiResponse::ok("registered");
            with_session_cookie(&state, &handle, Json(body).into_response())
        }
        Err(err) => err.into_response(),
    }
}

/// `POST /api/v1.0/session` - log in
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let handle = session_handle(&state, &headers);
    let ip = client_ip(&headers).to_string();

    match state
        .auth
        .login(&payload.mobile, &payload.password, &ip, &handle)
        .await
    {
        Ok(()) => {
            let body: ApiResponse<Empty> = ApiResponse::ok("logged in");
            with_session_cookie(&state, &handle, Json(body).into_response())
        }
        Err(err) => err.into_response(),
    }
}

/// `GET /api/v1.0/session` - report the logged-in user
pub async fn check_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = session_handle(&state, &headers);

    match state.auth.check_session(&handle).await {
        Ok(name) => Json(ApiResponse::ok_with("true", SessionUser { name })).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `DELETE /api/v1.0/session` - log out; always succeeds
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let handle = session_handle(&state, &headers);
    state.auth.logout(&handle).await;

    let body: ApiResponse<Empty> = ApiResponse::ok("OK");
    Json(body).into_response()
}
