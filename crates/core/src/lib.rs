//! Tradecart Core - Shared types library.
//!
//! This crate provides common types used across all Tradecart components:
//! - `server` - Order lifecycle & pricing engine (JSON API)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, roles, statuses, and
//!   order numbers
//! - [`pricing`] - Per-account price adjustment and total arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use types::*;
