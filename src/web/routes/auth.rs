//! Authentication routes
//!
//! - GET /login, POST /login - Sign in or sign up
//! - GET /login/oauth - Start the OAuth flow
//! - GET /oauth/callback - Finish the OAuth flow
//! - POST /logout - Sign out
//! - GET /forgot-password, POST /forgot-password - Password recovery

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde_json::json;
use std::sync::Arc;

use super::render_page;
use crate::forms::{validate_email, CredentialsForm, FormErrors, FormMode, RecoveryForm};
use crate::session::redirect_authenticated;
use crate::web::dto::{LoginQuery, OAuthCallbackQuery};
use crate::web::error::WebResult;
use crate::web::state::AppState;

async fn render_login(
    state: &Arc<AppState>,
    mode: FormMode,
    form: &CredentialsForm,
    errors: &FormErrors,
) -> WebResult<Response> {
    let snapshot = state.session.snapshot().await;
    let title = if mode.is_signup() { "Sign up" } else { "Sign in" };

    let page = render_page(
        state,
        "login",
        title,
        None,
        &json!({
            "signup": mode.is_signup(),
            "loading": snapshot.loading,
            // Passwords are never echoed back
            "form": { "email": form.email, "name": form.name },
            "errors": errors,
        }),
    )
    .await?;
    Ok(page.into_response())
}

/// GET /login
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginQuery>,
) -> WebResult<Response> {
    if redirect_authenticated(&state.session.snapshot().await) {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let mode = if query.is_signup() {
        FormMode::Signup
    } else {
        FormMode::Login
    };
    render_login(&state, mode, &CredentialsForm::default(), &FormErrors::default()).await
}

/// POST /login
pub async fn submit_login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> WebResult<Response> {
    if let Err(errors) = form.validate() {
        return render_login(&state, form.mode, &form, &errors).await;
    }

    let result = match form.mode {
        FormMode::Login => state.session.login(&form.email, &form.password).await,
        FormMode::Signup => {
            state
                .session
                .sign_up(&form.email, &form.password, form.display_name())
                .await
        }
    };

    match result {
        Ok(identity) => {
            let greeting = match form.mode {
                FormMode::Login => format!("Welcome back, {}", identity.display_name()),
                FormMode::Signup => "Account created successfully".to_string(),
            };
            state.flash.success(greeting).await;
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => render_login(&state, form.mode, &form, &FormErrors::submit(e.message)).await,
    }
}

/// GET /login/oauth
pub async fn start_oauth(State(state): State<Arc<AppState>>) -> Redirect {
    match state.session.login_with_oauth().await {
        Ok(url) => Redirect::to(&url),
        Err(e) => {
            state.flash.error(e.message).await;
            Redirect::to("/login")
        }
    }
}

/// GET /oauth/callback
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Redirect {
    match state
        .session
        .complete_oauth(&query.user_id, &query.secret)
        .await
    {
        Ok(identity) => {
            state
                .flash
                .success(format!("Welcome, {}", identity.display_name()))
                .await;
            Redirect::to("/dashboard")
        }
        Err(e) => {
            tracing::warn!(code = %e.code, "OAuth callback failed");
            state.flash.error(e.message).await;
            Redirect::to("/login")
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<Arc<AppState>>) -> Redirect {
    match state.session.logout().await {
        Ok(()) => {
            state.clear_analytics().await;
            state.flash.success("Signed out").await;
            Redirect::to("/")
        }
        Err(e) => {
            state.flash.error(e.message).await;
            Redirect::to("/dashboard")
        }
    }
}

/// GET /forgot-password
pub async fn forgot_password_page(State(state): State<Arc<AppState>>) -> WebResult<Response> {
    let page = render_page(&state, "forgot_password", "Reset password", None, &json!({})).await?;
    Ok(page.into_response())
}

/// POST /forgot-password
pub async fn submit_forgot_password(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RecoveryForm>,
) -> WebResult<Response> {
    let error = match validate_email(&form.email) {
        Some(message) => Some(message),
        None => state
            .session
            .reset_password(&form.email)
            .await
            .err()
            .map(|e| e.message),
    };

    if let Some(error) = error {
        let page = render_page(
            &state,
            "forgot_password",
            "Reset password",
            None,
            &json!({ "email": form.email, "error": error }),
        )
        .await?;
        return Ok(page.into_response());
    }

    state
        .flash
        .success("Recovery email sent. Check your inbox.")
        .await;
    Ok(Redirect::to("/login").into_response())
}
