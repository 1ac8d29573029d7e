//! StarterPrint3D Core - Shared types library.
//!
//! This crate provides common types used across all StarterPrint3D components:
//! - `storefront` - Public-facing e-commerce site
//! - `admin` - Internal back-office panel
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no session access. Everything stateful (the cart store, the
//! Supabase clients) lives in the binaries and injects these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses
//! - [`tier`] - The fixed 1/2/3-pack price-tier table
//! - [`cart`] - Cart line items and their storage-reduced snapshots
//! - [`address`] - Shipping addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod tier;
pub mod types;

pub use address::{AddressError, ShippingAddress};
pub use cart::{
    CART_SCHEMA_VERSION, CartItem, CartSnapshot, MAX_CART_ITEMS, PersistedCart, SnapshotFile,
    SnapshotFormData, UploadedFile,
};
pub use tier::PriceTier;
pub use types::*;
