use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::cookie::get_session_token;
use crate::repositories::LoginRepository;

/// The logged-in user behind the request's `session` cookie.
///
/// Resolved against the `logins` table through the [`LoginRepository`]
/// installed as a request extension by the router.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

impl AuthUser {
    async fn from_parts(parts: &Parts) -> Option<Self> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = get_session_token(&jar)?;
        let logins = parts.extensions.get::<LoginRepository>()?.clone();

        match logins.find_valid(&token).await {
            Ok(Some((id, username))) => Some(Self { id, username }),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Failed to resolve login: {}", e);
                None
            }
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AuthUser::from_parts(parts).await.ok_or(AuthRedirect)
    }
}

pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/auth/login").into_response()
    }
}

// Optional auth - doesn't redirect, just returns None if not logged in
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(AuthUser::from_parts(parts).await))
    }
}
