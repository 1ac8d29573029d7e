//! Customization flow route handlers.
//!
//! Three-step stepper: figurine details, generated design prompt, image
//! upload. The in-progress form is kept in the session between steps so
//! the customer can navigate back and forth without losing input.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use starterprint_core::{CartItem, CartItemId, PriceTier};

use crate::cart::{CartStore, MAX_QUANTITY, ProfileMirror, SessionCartStorage};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, CustomizationForm, session_keys};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Step 1: figurine details form.
#[derive(Template, WebTemplate)]
#[template(path = "customize/form.html")]
pub struct CustomizeFormTemplate {
    pub form: CustomizationForm,
    pub user: Option<CurrentUser>,
}

/// Step 2: generated design prompt.
#[derive(Template, WebTemplate)]
#[template(path = "customize/prompt.html")]
pub struct CustomizePromptTemplate {
    pub prompt: String,
    pub user: Option<CurrentUser>,
}

/// Step 3: image upload.
#[derive(Template, WebTemplate)]
#[template(path = "customize/upload.html")]
pub struct CustomizeUploadTemplate {
    pub error: Option<String>,
    pub user: Option<CurrentUser>,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the in-progress customization form from the session.
async fn get_form(session: &Session) -> Option<CustomizationForm> {
    session
        .get::<CustomizationForm>(session_keys::CUSTOMIZE_FORM)
        .await
        .ok()
        .flatten()
}

// =============================================================================
// Step 1: Details
// =============================================================================

/// Display the figurine details form, prefilled from the session.
#[instrument(skip(session, user))]
pub async fn form_page(session: Session, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let form = get_form(&session).await.unwrap_or_default();
    CustomizeFormTemplate { form, user }
}

/// Save the figurine details and move on to the prompt step.
#[instrument(skip(session, form))]
pub async fn save_form(session: Session, Form(form): Form<CustomizationForm>) -> Response {
    if let Err(e) = session.insert(session_keys::CUSTOMIZE_FORM, &form).await {
        tracing::error!("Failed to save customization form: {e}");
    }
    Redirect::to("/personnaliser/prompt").into_response()
}

// =============================================================================
// Step 2: Prompt
// =============================================================================

/// Display the generated design prompt.
///
/// Redirects back to step 1 if no form has been saved yet.
#[instrument(skip(session, user))]
pub async fn prompt_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    let Some(form) = get_form(&session).await else {
        return Redirect::to("/personnaliser").into_response();
    };

    CustomizePromptTemplate {
        prompt: form.generate_prompt(),
        user,
    }
    .into_response()
}

// =============================================================================
// Step 3: Upload
// =============================================================================

/// Display the upload form.
#[instrument(skip(session, user))]
pub async fn upload_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    if get_form(&session).await.is_none() {
        return Redirect::to("/personnaliser").into_response();
    }

    CustomizeUploadTemplate { error: None, user }.into_response()
}

/// Multipart fields extracted from the upload form.
#[derive(Default)]
struct UploadFields {
    quantity: u32,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Read the multipart body into memory.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadFields, axum::Error> {
    let mut fields = UploadFields {
        quantity: 1,
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(axum::Error::new)? {
        match field.name() {
            Some("quantity") => {
                // The select offers 1-3, but the value is attacker-controlled
                let text = field.text().await.map_err(axum::Error::new)?;
                fields.quantity = text
                    .trim()
                    .parse()
                    .map_or(1, |q: u32| q.clamp(1, MAX_QUANTITY));
            }
            Some("file") => {
                let name = field.file_name().map(ToString::to_string);
                if name.as_deref().is_none_or(str::is_empty) {
                    // Empty file input: the customer skipped the upload
                    continue;
                }
                fields.file_name = name;
                fields.content_type = field.content_type().map(ToString::to_string);
                fields.bytes = field.bytes().await.map_err(axum::Error::new)?.to_vec();
            }
            _ => {}
        }
    }

    Ok(fields)
}

/// Handle the upload form: store the image (if any) and add the item to
/// the cart.
///
/// Uploading a design requires a logged-in user because objects are
/// stored under the user's own folder. Guests can still add the item
/// without a file.
#[instrument(skip(state, session, user, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    mut multipart: Multipart,
) -> Response {
    let Some(form) = get_form(&session).await else {
        return Redirect::to("/personnaliser").into_response();
    };

    let fields = match read_upload(&mut multipart).await {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!("Failed to read upload body: {e}");
            return CustomizeUploadTemplate {
                error: Some("Erreur lors de l'upload du fichier".to_string()),
                user,
            }
            .into_response();
        }
    };

    let mut uploaded_file = None;
    if let Some(file_name) = &fields.file_name {
        let Some(current) = &user else {
            return CustomizeUploadTemplate {
                error: Some("Vous devez être connecté pour uploader un fichier".to_string()),
                user,
            }
            .into_response();
        };

        let content_type = fields
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        match state
            .supabase()
            .upload_file(
                &current.access_token,
                current.id,
                file_name,
                &content_type,
                fields.bytes,
            )
            .await
        {
            Ok(file) => uploaded_file = Some(file),
            Err(e) => {
                tracing::warn!("Upload failed: {e}");
                return CustomizeUploadTemplate {
                    error: Some(e.to_string()),
                    user,
                }
                .into_response();
            }
        }
    }

    let tier = PriceTier::for_quantity(fields.quantity);
    let image_url = uploaded_file
        .as_ref()
        .map(|file| state.supabase().public_object_url(&file.path))
        .unwrap_or_default();

    let item = CartItem {
        id: CartItemId::new(Uuid::new_v4()),
        title: form.item_title(),
        image_url,
        quantity: fields.quantity,
        price: tier.price(),
        price_id: tier.price_id().to_string(),
        form_data: form.to_form_data(),
        uploaded_file,
    };

    let quantity = fields.quantity.to_string();
    crate::error::add_breadcrumb(
        "cart",
        "Item added to cart",
        Some(&[("quantity", quantity.as_str())]),
    );

    let mirror = user.as_ref().map(|u| {
        ProfileMirror::new(state.supabase().clone(), u.id, u.access_token.clone())
    });
    let mut store = CartStore::load(SessionCartStorage::new(session.clone()), mirror).await;
    if let Err(e) = store.add_item(item).await {
        // Local state is persisted; the remote mirror will catch up on the
        // next mutation.
        tracing::warn!("Cart mirror update failed: {e}");
    }

    // The flow is done; next visit starts from a blank form
    if let Err(e) = session
        .remove::<CustomizationForm>(session_keys::CUSTOMIZE_FORM)
        .await
    {
        tracing::warn!("Failed to clear customization form: {e}");
    }

    Redirect::to("/panier").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    async fn multipart_with_quantity(value: &str) -> Multipart {
        let body = format!(
            "--BOUNDARY\r\nContent-Disposition: form-data; name=\"quantity\"\r\n\r\n{value}\r\n--BOUNDARY--\r\n"
        );
        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_upload_quantity_clamped_to_supported_range() {
        for (raw, expected) in [("9", 3), ("4000000000", 3), ("0", 1), ("2", 2), ("abc", 1)] {
            let mut multipart = multipart_with_quantity(raw).await;
            let fields = read_upload(&mut multipart).await.unwrap();
            assert_eq!(fields.quantity, expected, "raw quantity {raw}");
        }
    }
}
