//! Sales domain module: the demand side of stock reservation.
//!
//! A sale commits quantities of subjects to a customer; each sale item's
//! committed quantity is what the stock core reserves against stock units.

pub mod sale;

pub use sale::{Sale, SaleId, SaleItem, SaleItemId};
