//! Local cart persistence tier.
//!
//! The cart payload lives under a single session key with an enforced byte
//! budget, mimicking the small per-key quota of browser local storage. The
//! quota is what makes the save ladder in [`super::CartStore`] meaningful:
//! a cart of three items with file references can exceed it, at which point
//! progressively reduced encodings are attempted.

use thiserror::Error;
use tower_sessions::Session;

use crate::models::session_keys;

/// Byte budget for the stored cart payload.
pub const CART_STORAGE_QUOTA_BYTES: usize = 4096;

/// Errors from the local storage tier.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The payload exceeds the per-key byte budget.
    #[error("payload of {size} bytes exceeds quota of {quota} bytes")]
    QuotaExceeded { size: usize, quota: usize },

    /// The session layer failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Local persistence for the serialized cart payload.
///
/// Reads and writes are infallible in the happy path; the only interesting
/// failure is [`StorageError::QuotaExceeded`], which the store recovers from
/// via its fallback ladder.
pub trait CartStorage {
    /// Read the stored payload, if any.
    fn read(&self) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a payload, enforcing the byte budget.
    fn write(&self, payload: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Wipe the entire key-space this storage belongs to.
    ///
    /// Last-resort recovery: everything stored alongside the cart is lost.
    fn clear_all(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Session-backed cart storage with an enforced quota.
#[derive(Clone)]
pub struct SessionCartStorage {
    session: Session,
    quota: usize,
}

impl SessionCartStorage {
    /// Wrap a request session with the default quota.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            quota: CART_STORAGE_QUOTA_BYTES,
        }
    }
}

impl CartStorage for SessionCartStorage {
    async fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.session.get::<String>(session_keys::CART).await?)
    }

    async fn write(&self, payload: &str) -> Result<(), StorageError> {
        if payload.len() > self.quota {
            return Err(StorageError::QuotaExceeded {
                size: payload.len(),
                quota: self.quota,
            });
        }
        self.session.insert(session_keys::CART, payload).await?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        self.session.clear().await;
        Ok(())
    }
}
