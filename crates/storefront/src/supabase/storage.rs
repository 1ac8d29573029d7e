//! Storage uploads for customer photos.

use reqwest::Method;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use starterprint_core::{UploadedFile, UserId};

use super::{SupabaseClient, SupabaseError};

/// Maximum accepted upload size (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Errors surfaced to the customer during an upload.
///
/// Messages are French because they render directly in the upload form.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Veuillez sélectionner un fichier image valide")]
    NotAnImage,
    #[error("La taille du fichier ne doit pas dépasser 10MB")]
    TooLarge,
    #[error("Erreur lors de l'upload du fichier")]
    Api(#[from] SupabaseError),
}

impl SupabaseClient {
    /// Upload a customer image to the starter pack bucket.
    ///
    /// Objects are stored under `{user_id}/{uuid}.{ext}` so each user's
    /// files stay in their own folder as required by the bucket policy.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotAnImage` unless the content type is
    /// `image/*`, `UploadError::TooLarge` above 10 MB, and
    /// `UploadError::Api` when the Storage API rejects the upload.
    #[instrument(skip(self, access_token, bytes), fields(size = bytes.len()))]
    pub async fn upload_file(
        &self,
        access_token: &str,
        user_id: UserId,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, UploadError> {
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }

        let size = bytes.len() as u64;
        let extension = file_name.rsplit('.').next().unwrap_or("png");
        let object_path = format!("{user_id}/{}.{extension}", Uuid::new_v4());
        let path = format!("/storage/v1/object/{}/{object_path}", self.storage_bucket());

        let response = self
            .authed(Method::POST, &path, access_token)
            .header("Content-Type", content_type.to_string())
            .header("Cache-Control", "max-age=3600")
            .body(bytes)
            .send()
            .await
            .map_err(SupabaseError::from)?;

        Self::check(response).await?;

        Ok(UploadedFile {
            path: object_path,
            name: file_name.to_string(),
            mime_type: content_type.to_string(),
            size,
        })
    }

    /// Delete an object from the starter pack bucket.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the Storage API rejects the deletion.
    #[instrument(skip(self, access_token))]
    pub async fn remove_object(
        &self,
        access_token: &str,
        object_path: &str,
    ) -> Result<(), SupabaseError> {
        let path = format!("/storage/v1/object/{}/{object_path}", self.storage_bucket());
        let response = self
            .authed(Method::DELETE, &path, access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_messages_are_french() {
        assert_eq!(
            UploadError::NotAnImage.to_string(),
            "Veuillez sélectionner un fichier image valide"
        );
        assert_eq!(
            UploadError::TooLarge.to_string(),
            "La taille du fichier ne doit pas dépasser 10MB"
        );
    }
}
