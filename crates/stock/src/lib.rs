//! `merx-stock` — the stock reservation core.
//!
//! Reconciles supply (supplier order items, production orders) against
//! demand (sale items) through stock units and stock assignments:
//!
//! - [`updater`] enforces quantity invariants on a single unit or
//!   assignment;
//! - [`linker`] links supply sources to units and redistributes
//!   assignments across units when promised quantities change, oldest
//!   sales keeping their stock;
//! - [`subject_updater`] rolls units up into subject-level quantities and
//!   derives the stock state;
//! - [`composition`] picks the best-ranked components of a bundle.
//!
//! All of it is single-threaded and request-scoped: a [`store::StockStore`]
//! is bound to one persistence transaction, operations either complete or
//! fail with a fatal [`merx_core::DomainError`], and the caller rolls back
//! on failure.

pub mod assignment;
pub mod composition;
pub mod linker;
pub mod prices;
pub mod store;
pub mod subject_updater;
pub mod unit;
pub mod updater;

pub use assignment::{StockAssignment, StockAssignmentId};
pub use composition::StockCompositionSorter;
pub use linker::{ProductionOrderLinker, StockUnitLinker, SupplierOrderLinker};
pub use prices::{SupplyPriceCalculator, WeightedPriceCalculator};
pub use store::{EventSchedule, StockEvent, StockStore, SupplyItem};
pub use subject_updater::{
    NoSupplierAvailability, StockSubjectUpdater, SupplierAvailability,
    SupplierProductAvailability,
};
pub use unit::{StockUnit, StockUnitId, StockUnitState, SupplySource, WarehouseId};
pub use updater::{
    DefaultOverflowResolver, OverflowResolver, StockAssignmentUpdater, StockUnitUpdater,
};
