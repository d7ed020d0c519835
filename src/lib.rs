//! An inventory and checkout web service with axum.
//!
//! Items are kept in an [`ItemStore`](api::inventory::item_store::ItemStore),
//! served as JSON under `/api` and as HTML pages at the root.

pub mod api;
pub mod app;
pub mod infra;
pub mod views;
