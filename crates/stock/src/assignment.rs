use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_core::{Entity, entity_id};
use merx_sales::SaleItemId;

use crate::unit::StockUnitId;

entity_id!(
    /// Stock assignment identifier.
    StockAssignmentId
);

/// A reservation linking one sale item's demand to one stock unit's supply.
///
/// In steady state there is at most one assignment per `(sale item, unit)`
/// pair; the linker merges rather than duplicating when it redistributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAssignment {
    id: StockAssignmentId,
    sale_item: SaleItemId,
    /// `None` means detached: the assignment is pending removal.
    unit: Option<StockUnitId>,
    sold: Decimal,
    shipped: Decimal,
    locked: Decimal,
}

impl StockAssignment {
    pub fn new(id: StockAssignmentId, sale_item: SaleItemId, unit: StockUnitId) -> Self {
        Self {
            id,
            sale_item,
            unit: Some(unit),
            sold: Decimal::ZERO,
            shipped: Decimal::ZERO,
            locked: Decimal::ZERO,
        }
    }

    pub fn sale_item(&self) -> SaleItemId {
        self.sale_item
    }

    pub fn unit(&self) -> Option<StockUnitId> {
        self.unit
    }

    pub(crate) fn set_unit(&mut self, unit: Option<StockUnitId>) {
        self.unit = unit;
    }

    pub fn sold(&self) -> Decimal {
        self.sold
    }

    pub(crate) fn set_sold(&mut self, quantity: Decimal) {
        self.sold = quantity;
    }

    pub fn shipped(&self) -> Decimal {
        self.shipped
    }

    pub(crate) fn set_shipped(&mut self, quantity: Decimal) {
        self.shipped = quantity;
    }

    pub fn locked(&self) -> Decimal {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, quantity: Decimal) {
        self.locked = quantity;
    }

    /// Sold quantity not yet shipped or locked: what redistribution may
    /// move to another unit.
    pub fn releasable(&self) -> Decimal {
        (self.sold - self.shipped - self.locked).max(Decimal::ZERO)
    }
}

impl Entity for StockAssignment {
    type Id = StockAssignmentId;

    fn id(&self) -> StockAssignmentId {
        self.id
    }
}
