//! Supply domain module: the sources that back stock units.
//!
//! A stock unit is guaranteed by at most one supply source: a supplier order
//! item (purchased stock) or a production order (manufactured stock).
//! Supplier products carry quoted availability used as a fallback when no
//! internal supply is underway.

pub mod production_order;
pub mod supplier_order;
pub mod supplier_product;

pub use production_order::{ProductionOrder, ProductionOrderId};
pub use supplier_order::{SupplierOrder, SupplierOrderId, SupplierOrderItem, SupplierOrderItemId};
pub use supplier_product::SupplierProduct;
