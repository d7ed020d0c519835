//! Inventory items, the stores that keep them, and their API.

pub mod inventory_api;
pub mod inventory_service;
pub mod item;
pub mod item_store;
pub mod memory_store;
pub mod pg_store;
