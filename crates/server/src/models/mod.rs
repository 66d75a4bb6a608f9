//! Domain models and response views for the order engine.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;

pub use address::{Address, AddressPatch, NewAddress};
pub use cart::{CartLineData, CartLineView, CartView};
pub use catalog::CatalogItem;
pub use order::{Order, OrderLine, OrderWithLines};
