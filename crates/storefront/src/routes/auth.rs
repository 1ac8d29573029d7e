//! Authentication route handlers.
//!
//! Handles login, registration and logout via Supabase GoTrue. A
//! successful login also pulls the user's mirrored cart into the session
//! (remote copy wins), which is the one moment the remote tier is read.

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

use crate::cart::{CartStore, ProfileMirror, SessionCartStorage};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;
use crate::supabase::{AuthSession, SupabaseError};

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

/// Handle login form submission.
///
/// Authenticates against GoTrue, stores the identity in the session and
/// syncs the mirrored cart (remote wins, once per sign-in).
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = match state.supabase().sign_in(&form.email, &form.password).await {
        Ok(auth) => auth,
        Err(SupabaseError::InvalidCredentials) => {
            return LoginTemplate {
                error: Some("Email ou mot de passe incorrect".to_string()),
            }
            .into_response();
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            return LoginTemplate {
                error: Some("Une erreur est survenue. Veuillez réessayer.".to_string()),
            }
            .into_response();
        }
    };

    establish_session(&state, &session, auth).await
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate { error: None }
}

/// Handle registration form submission.
///
/// Email confirmation is disabled on the project, so a successful signup
/// returns a usable session and the user is logged in straight away.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return RegisterTemplate {
            error: Some("Les mots de passe ne correspondent pas".to_string()),
        }
        .into_response();
    }

    if form.password.len() < 8 {
        return RegisterTemplate {
            error: Some("Le mot de passe doit contenir au moins 8 caractères".to_string()),
        }
        .into_response();
    }

    let auth = match state.supabase().sign_up(&form.email, &form.password).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            return RegisterTemplate {
                error: Some("Impossible de créer le compte. Cet email est peut-être déjà utilisé.".to_string()),
            }
            .into_response();
        }
    };

    establish_session(&state, &session, auth).await
}

/// Store the authenticated identity in the session and sync the cart.
async fn establish_session(state: &AppState, session: &Session, auth: AuthSession) -> Response {
    let user = CurrentUser {
        id: auth.user.id,
        email: auth.user.email,
        access_token: auth.access_token,
        refresh_token: auth.refresh_token,
    };

    if let Err(e) = set_current_user(session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return LoginTemplate {
            error: Some("Une erreur est survenue. Veuillez réessayer.".to_string()),
        }
        .into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    // Pull the mirrored cart into the session; the remote copy wins. A
    // failed sync keeps whatever the guest cart held.
    let mirror = ProfileMirror::new(
        state.supabase().clone(),
        user.id,
        user.access_token.clone(),
    );
    let mut store = CartStore::load(SessionCartStorage::new(session.clone()), Some(mirror)).await;
    if let Err(e) = store.sync().await {
        tracing::warn!("Cart sync after login failed: {e}");
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Invalidates the GoTrue session (best effort) and clears the stored
/// identity. The local cart stays in the session so the visitor keeps it
/// as a guest.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        && let Err(e) = state.supabase().sign_out(&user.access_token).await
    {
        tracing::warn!("Failed to invalidate Supabase session: {e}");
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}
