//! Remote cart mirror tier.
//!
//! While a customer is signed in, every cart mutation rewrites the full item
//! list into their `user_profiles` row. The remote copy is a best-effort
//! backup; local state stays authoritative for the session.

use starterprint_core::{CartItem, UserId};

use crate::supabase::{SupabaseClient, SupabaseError};

/// Remote, best-effort mirror of the cart.
pub trait CartMirror {
    /// Overwrite the remote item list wholesale.
    fn save(&self, items: &[CartItem]) -> impl Future<Output = Result<(), SupabaseError>> + Send;

    /// Fetch the remote item list, if the profile has one.
    fn load(&self) -> impl Future<Output = Result<Option<Vec<CartItem>>, SupabaseError>> + Send;

    /// Delete an uploaded design file from remote object storage.
    fn delete_file(&self, path: &str) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

/// [`CartMirror`] backed by the logged-in user's Supabase profile.
#[derive(Clone)]
pub struct ProfileMirror {
    client: SupabaseClient,
    user_id: UserId,
    access_token: String,
}

impl ProfileMirror {
    #[must_use]
    pub const fn new(client: SupabaseClient, user_id: UserId, access_token: String) -> Self {
        Self {
            client,
            user_id,
            access_token,
        }
    }
}

impl CartMirror for ProfileMirror {
    async fn save(&self, items: &[CartItem]) -> Result<(), SupabaseError> {
        self.client
            .upsert_cart(self.user_id, &self.access_token, items)
            .await
    }

    async fn load(&self) -> Result<Option<Vec<CartItem>>, SupabaseError> {
        let profile = self
            .client
            .get_profile(self.user_id, &self.access_token)
            .await?;
        Ok(profile.and_then(|p| p.cart_items))
    }

    async fn delete_file(&self, path: &str) -> Result<(), SupabaseError> {
        self.client.remove_object(&self.access_token, path).await
    }
}
