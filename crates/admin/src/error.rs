//! Error handling for admin routes.
//!
//! Server-side failures are captured to Sentry before being rendered as
//! terse HTTP responses; operator-facing detail stays in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::supabase::SupabaseError;

/// Application-level errors for admin handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Supabase(#[from] SupabaseError),

    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Supabase(err) => match err {
                SupabaseError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                SupabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Supabase(err) => match err {
                SupabaseError::InvalidCredentials => {
                    "Email ou mot de passe incorrect".to_string()
                }
                SupabaseError::NotFound(_) => "Introuvable".to_string(),
                _ => "External service error".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            sentry::capture_error(&self);
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, self.public_message()).into_response()
    }
}

/// Convenience result alias for admin handlers.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        let err = AppError::Supabase(SupabaseError::InvalidCredentials);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.public_message(), "Email ou mot de passe incorrect");
    }

    #[test]
    fn test_internal_error_message_is_generic() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }
}
