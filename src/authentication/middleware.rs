use std::convert::Infallible;

use warp::{reject::Rejection, Filter};

use crate::constants::SESSION_COOKIE;

use super::jwt::{verify_jwt_session, SessionData, SessionKey};

/// Extracts the verified caller from the `session` cookie.
pub fn with_session(
    key: SessionKey,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::cookie::<String>(SESSION_COOKIE).and_then(move |session: String| {
        let key = key.clone();
        async move { verify_jwt_session(&key, &session).map_err(Rejection::from) }
    })
}

/// Like [`with_session`] but anonymous callers pass through as `None`.
pub fn with_possible_session(
    key: SessionKey,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE).map(move |session: Option<String>| {
        session.and_then(|session| verify_jwt_session(&key, &session).ok())
    })
}
