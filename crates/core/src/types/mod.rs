//! Core types for Stockpile.
//!
//! This module provides type-safe wrappers and records for the synchronized
//! domain: groups, the category/location catalogs, and the three mutable
//! list entities (inventory, shopping, wishes).

pub mod auth;
pub mod catalog;
pub mod group;
pub mod id;
pub mod item;
pub mod shopping;
pub mod wish;

pub use auth::{AuthInputError, LoginRequest, RegisterRequest, TokenPair};
pub use catalog::{
    CatalogEntry, Category, CategoryInput, Location, LocationInput, merge_catalog, sort_catalog,
};
pub use group::{Group, GroupInput};
pub use id::*;
pub use item::{InventoryItem, InventoryItemInput};
pub use shopping::{ShoppingItem, ShoppingItemInput};
pub use wish::{WishItem, WishItemInput};

/// An entity addressable by a typed identifier.
///
/// Implemented by every synchronized record so the store can replace or
/// remove entries by id without knowing the concrete kind.
pub trait Entity {
    /// The typed identifier for this entity kind.
    type Id: Clone + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Human-readable kind name used in errors and logs.
    const KIND: &'static str;

    /// The entity's identifier.
    fn id(&self) -> &Self::Id;

    /// The owning group, or `None` for default/global entities.
    fn group_id(&self) -> Option<&GroupId>;
}
