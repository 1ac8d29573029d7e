//! Admin authentication route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::services::admin_login;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Display the login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

/// Handle login form submission.
///
/// Runs the credentials and privilege checks; a non-admin is rejected
/// with the same terse banner regardless of which check failed them.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let admin = match admin_login(state.supabase(), &form.email, &form.password).await {
        Ok(admin) => admin,
        Err(e) => {
            return LoginTemplate {
                error: Some(e.to_string()),
            }
            .into_response();
        }
    };

    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!("Failed to set admin session: {e}");
        return LoginTemplate {
            error: Some("Une erreur est survenue. Veuillez réessayer.".to_string()),
        }
        .into_response();
    }

    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin.id.to_string()),
            email: Some(admin.email.as_str().to_string()),
            ..Default::default()
        }));
    });

    Redirect::to("/").into_response()
}

/// Handle logout.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(admin)) = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        && let Err(e) = state.supabase().sign_out(&admin.access_token).await
    {
        tracing::warn!("Failed to invalidate Supabase session: {e}");
    }

    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    sentry::configure_scope(|scope| scope.set_user(None));

    Redirect::to("/auth/login").into_response()
}
