// SPDX-License-Identifier: MIT

//! Signed session cookie handling.
//!
//! The whole session (identity, tokens, selected calendar view, map
//! bounds) is carried in an HS256-signed JWT cookie. Handlers get the
//! decoded [`Session`] as a request extension and write back an updated
//! cookie when they change anything.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Session;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "rt_session";

/// Session lifetime: 30 days.
const SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// JWT claims wrapping the session payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (Strava athlete ID)
    sub: String,
    /// Expiration time (Unix timestamp)
    exp: usize,
    /// Issued at (Unix timestamp)
    iat: usize,
    /// The session itself
    session: Session,
}

/// Middleware that requires a valid session cookie.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthorized)?;

    let session = decode_session(cookie.value(), &state.config.session_signing_key)
        .map_err(|_| AppError::InvalidSession)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Sign a session into a JWT.
pub fn encode_session(session: &Session, signing_key: &[u8]) -> anyhow::Result<String> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;
    let claims = Claims {
        sub: session.athlete_id.to_string(),
        iat: now,
        exp: now + SESSION_TTL_SECS as usize,
        session: session.clone(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify and decode a session JWT.
pub fn decode_session(token: &str, signing_key: &[u8]) -> anyhow::Result<Session> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(token, &key, &validation)?;
    Ok(data.claims.session)
}

/// Build the session cookie for a (possibly updated) session.
pub fn session_cookie(session: &Session, signing_key: &[u8]) -> anyhow::Result<Cookie<'static>> {
    let jwt = encode_session(session, signing_key)?;
    let mut cookie = Cookie::new(SESSION_COOKIE, jwt);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(SESSION_TTL_SECS as i64));
    Ok(cookie)
}

/// Cookie that clears the session on logout.
pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CalendarView, SessionTokens};

    fn test_session() -> Session {
        Session::new(
            42,
            "Ada".to_string(),
            None,
            SessionTokens {
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
                expires_at: 1_900_000_000,
            },
        )
    }

    #[test]
    fn test_session_jwt_roundtrip() {
        let key = b"test_session_key_32_bytes_min!!";
        let session = test_session();

        let jwt = encode_session(&session, key).unwrap();
        let decoded = decode_session(&jwt, key).unwrap();

        assert_eq!(decoded.athlete_id, 42);
        assert_eq!(decoded.tokens, session.tokens);
        assert_eq!(decoded.view, CalendarView::current_year());
    }

    #[test]
    fn test_session_jwt_rejects_wrong_key() {
        let session = test_session();
        let jwt = encode_session(&session, b"correct_key_with_enough_bytes!").unwrap();
        assert!(decode_session(&jwt, b"wrong_key_with_enough_bytes!!!").is_err());
    }

    #[test]
    fn test_session_jwt_rejects_garbage() {
        assert!(decode_session("not.a.jwt", b"some_key").is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let session = test_session();
        let cookie = session_cookie(&session, b"test_key_for_cookie_building!!").unwrap();

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
