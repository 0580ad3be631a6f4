//! Foundation types for the Unlock Registry (ULK).
//!
//! This crate provides the identity and catalog types shared by every other
//! ULK crate.
//!
//! # Key Types
//!
//! - [`AccountId`] — Caller identity derived from an account name (BLAKE3)
//! - [`ItemId`] — Dense, zero-based catalog identifier
//! - [`Amount`] — Value in the smallest currency unit
//! - [`Item`] — A catalog entry including its gated reference
//! - [`Listing`] — The publicly visible part of an [`Item`]

pub mod error;
pub mod identity;
pub mod item;

pub use error::TypeError;
pub use identity::AccountId;
pub use item::{Amount, Item, ItemId, Listing};
