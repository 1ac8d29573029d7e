//! Payment initiation.
//!
//! Takes the current cart and a shipping address, resolves uploaded-file
//! paths to public URLs, and asks the payment edge function for a hosted
//! checkout URL to redirect the customer to. No retries: a failed call
//! surfaces as a single French error banner.

use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;

use starterprint_core::{CartItem, ShippingAddress};

use crate::supabase::{
    CheckoutLineItem, CheckoutMetadata, CheckoutSessionRequest, ShippingAddressCollection,
    SupabaseClient, SupabaseError,
};

/// Errors surfaced to the customer during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Votre panier est vide")]
    EmptyCart,
    #[error("Erreur lors de la création de la session de paiement. Veuillez réessayer plus tard.")]
    Payment(#[from] SupabaseError),
}

/// Create a payment session and return the URL to redirect the customer to.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart and
/// `CheckoutError::Payment` when the edge function call fails.
#[instrument(skip(client, access_token, items, address), fields(items = items.len()))]
pub async fn start_checkout(
    client: &SupabaseClient,
    access_token: &str,
    items: &[CartItem],
    address: &ShippingAddress,
    base_url: &str,
) -> Result<String, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let request = build_checkout_request(items, address, base_url, |path| {
        client.public_object_url(path)
    })
    .map_err(SupabaseError::from)?;

    let response = client.create_checkout_session(access_token, &request).await?;
    Ok(response.url)
}

/// Build the payment-session request body.
///
/// `public_url` resolves a storage object path to a publicly fetchable URL;
/// injected so the request shape is testable without a client.
fn build_checkout_request(
    items: &[CartItem],
    address: &ShippingAddress,
    base_url: &str,
    public_url: impl Fn(&str) -> String,
) -> Result<CheckoutSessionRequest, serde_json::Error> {
    let line_items = items
        .iter()
        .map(|item| CheckoutLineItem {
            price: item.price_id.clone(),
            quantity: item.quantity,
        })
        .collect();

    // File descriptors with resolved URLs, one entry per item (null when the
    // item carries no file), serialized into the metadata bag for the
    // fulfilment webhook.
    let uploaded_files: Vec<Value> = items
        .iter()
        .map(|item| {
            item.uploaded_file.as_ref().map_or(Value::Null, |file| {
                json!({
                    "path": file.path,
                    "name": file.name,
                    "type": file.mime_type,
                    "url": public_url(&file.path),
                })
            })
        })
        .collect();

    let base = base_url.trim_end_matches('/');
    Ok(CheckoutSessionRequest {
        line_items,
        mode: "payment".to_string(),
        success_url: format!("{base}/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{base}/cancel"),
        shipping_address_collection: ShippingAddressCollection {
            allowed_countries: vec!["FR".to_string()],
        },
        metadata: CheckoutMetadata {
            shipping_address: serde_json::to_string(address)?,
            uploaded_files: serde_json::to_string(&uploaded_files)?,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use serde_json::Map;
    use uuid::Uuid;

    use starterprint_core::{CartItemId, PriceTier, UploadedFile};

    fn address() -> ShippingAddress {
        ShippingAddress {
            company_name: None,
            line1: "12 rue de la Paix".to_string(),
            line2: None,
            postal_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: "France".to_string(),
        }
    }

    fn item(quantity: u32, file: Option<UploadedFile>) -> CartItem {
        let tier = PriceTier::for_quantity(quantity);
        CartItem {
            id: CartItemId::new(Uuid::new_v4()),
            title: "Starter Pack Personnalisé".to_string(),
            image_url: String::new(),
            quantity,
            price: tier.price(),
            price_id: tier.price_id().to_string(),
            form_data: Map::new(),
            uploaded_file: file,
        }
    }

    #[test]
    fn test_request_shape() {
        let items = vec![
            item(
                2,
                Some(UploadedFile {
                    path: "u1/design.png".to_string(),
                    name: "design.png".to_string(),
                    mime_type: "image/png".to_string(),
                    size: 1024,
                }),
            ),
            item(1, None),
        ];

        let request = build_checkout_request(&items, &address(), "https://shop.test/", |path| {
            format!("https://cdn.test/{path}")
        })
        .unwrap();

        assert_eq!(request.mode, "payment");
        assert_eq!(request.line_items.len(), 2);
        assert_eq!(request.line_items[0].price, PriceTier::Duo.price_id());
        assert_eq!(request.line_items[0].quantity, 2);
        assert_eq!(
            request.success_url,
            "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(request.cancel_url, "https://shop.test/cancel");
        assert_eq!(
            request.shipping_address_collection.allowed_countries,
            vec!["FR".to_string()]
        );

        // Metadata values are JSON documents serialized to strings
        let files: Vec<Value> =
            serde_json::from_str(&request.metadata.uploaded_files).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["url"], "https://cdn.test/u1/design.png");
        assert!(files[1].is_null());

        let addr: Value = serde_json::from_str(&request.metadata.shipping_address).unwrap();
        assert_eq!(addr["city"], "Paris");
    }

    #[test]
    fn test_checkout_error_messages_are_french() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "Votre panier est vide");
        let err = CheckoutError::Payment(SupabaseError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Erreur lors de la création de la session de paiement. Veuillez réessayer plus tard."
        );
    }
}
