//! Core types for Tradecart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod id;
pub mod order_number;
pub mod status;

pub use account::{AccountRole, AccountSnapshot};
pub use id::*;
pub use order_number::{OrderNumber, OrderNumberError};
pub use status::OrderStatus;
