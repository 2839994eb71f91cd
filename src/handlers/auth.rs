use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;

use crate::cookie::{create_session_cookie, get_session_token, remove_session_cookie};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuthUser;
use crate::models::{CreateUser, LoginCredentials, User};
use crate::repositories::{LoginRepository, UserRepository};

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub login_repo: LoginRepository,
}

// Templates
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/setup.html")]
struct SetupTemplate {
    error: Option<String>,
}

fn render_login(error: Option<&str>) -> Result<Html<String>> {
    let template = LoginTemplate {
        error: error.map(str::to_string),
    };
    Ok(Html(template.render()?))
}

fn render_setup(error: Option<&str>) -> Result<Html<String>> {
    let template = SetupTemplate {
        error: error.map(str::to_string),
    };
    Ok(Html(template.render()?))
}

/// Resolve the submitted credentials to a user, or `Unauthorized`.
async fn authenticate(state: &AuthState, credentials: &LoginCredentials) -> Result<User> {
    state
        .user_repo
        .verify_password(credentials.username.trim(), &credentials.password)
        .await?
        .ok_or(AppError::Unauthorized)
}

// Handlers
pub async fn login_page(
    State(state): State<AuthState>,
    OptionalAuthUser(auth_user): OptionalAuthUser,
) -> Result<Response> {
    // A live login skips the form
    if auth_user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if state.user_repo.count().await? == 0 {
        return Ok(Redirect::to("/auth/setup").into_response());
    }

    Ok(render_login(None)?.into_response())
}

pub async fn login_submit(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(credentials): Form<LoginCredentials>,
) -> Result<Response> {
    match authenticate(&state, &credentials).await {
        Ok(user) => {
            let token = state.login_repo.create(&user.id).await?;
            tracing::info!("User {} logged in", user.username);
            let jar = jar.add(create_session_cookie(&token));
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AppError::Unauthorized) => {
            tracing::debug!("Rejected login for {}", credentials.username);
            Ok(render_login(Some("Invalid username or password"))?.into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn setup_page(State(state): State<AuthState>) -> Result<Response> {
    // Only allow setup if no users exist
    if state.user_repo.count().await? > 0 {
        return Ok(Redirect::to("/auth/login").into_response());
    }

    Ok(render_setup(None)?.into_response())
}

pub async fn setup_submit(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(form): Form<CreateUser>,
) -> Result<Response> {
    // Only allow setup if no users exist
    if state.user_repo.count().await? > 0 {
        return Ok(Redirect::to("/auth/login").into_response());
    }

    let username = form.username.trim();
    if username.is_empty() {
        return Ok(render_setup(Some("Username is required"))?.into_response());
    }

    if form.password.len() < 6 {
        return Ok(render_setup(Some("Password must be at least 6 characters"))?.into_response());
    }

    let user = state.user_repo.create(username, &form.password).await?;
    tracing::info!("Created first account {}", user.username);

    // Auto login
    let token = state.login_repo.create(&user.id).await?;
    let jar = jar.add(create_session_cookie(&token));

    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> Result<Response> {
    if let Some(token) = get_session_token(&jar) {
        state.login_repo.delete(&token).await?;
    }
    let jar = jar.add(remove_session_cookie());
    Ok((jar, Redirect::to("/auth/login")).into_response())
}
