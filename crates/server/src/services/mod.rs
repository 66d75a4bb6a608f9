//! Engine services: the operations of the order lifecycle.
//!
//! Services orchestrate repositories and hold the operation contracts
//! (validation before persistence, ownership checks, state-transition
//! rules). Route handlers stay thin and map service results to HTTP.

mod error;

pub mod accounts;
pub mod admin;
pub mod cart;
pub mod checkout;

pub use accounts::{CurrentAccountProvider, PgAccountProvider};
pub use admin::AdminOrderService;
pub use cart::CartService;
pub use checkout::CheckoutService;
pub use error::EngineError;
