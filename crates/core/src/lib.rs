//! Stockpile Core - Shared domain types.
//!
//! This crate provides the types shared by every Stockpile component:
//! - `client` - Session handling, request pipeline and the synchronized store
//! - `cli` - Command-line front end over the synchronized store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no persistence. The default/custom catalog merge lives here
//! because it is a pure function of two entity lists.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, entity records, write payloads and auth payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
