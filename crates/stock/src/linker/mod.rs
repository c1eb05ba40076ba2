//! Linking supply sources to stock units and redistributing reservations.
//!
//! [`StockUnitLinker`] carries the general three-phase protocol
//! (link/apply/unlink) including cross-unit redistribution;
//! [`SupplierOrderLinker`] and [`ProductionOrderLinker`] scope it to one
//! supply line and keep the unit's derived data (pricing, ETA) in step.

pub mod production;
pub mod supplier;
pub mod unit;

pub use production::ProductionOrderLinker;
pub use supplier::SupplierOrderLinker;
pub use unit::StockUnitLinker;
