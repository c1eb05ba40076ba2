use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_catalog::SubjectId;
use merx_core::{Entity, entity_id};
use merx_supply::{ProductionOrderId, SupplierOrderItemId};

entity_id!(
    /// Stock unit identifier.
    StockUnitId
);

entity_id!(
    /// Warehouse identifier.
    WarehouseId
);

/// Supply source of a stock unit.
///
/// A unit is guaranteed by at most one source; the variants make that
/// mutual exclusivity structural.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplySource {
    #[default]
    None,
    SupplierItem(SupplierOrderItemId),
    Production(ProductionOrderId),
}

impl SupplySource {
    pub fn is_none(self) -> bool {
        matches!(self, SupplySource::None)
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// Stock unit lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockUnitState {
    New,
    Pending,
    Ready,
    Closed,
}

impl StockUnitState {
    pub fn is_closed(self) -> bool {
        matches!(self, StockUnitState::Closed)
    }
}

/// A trackable batch of inventory tied to zero or one supply source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUnit {
    id: StockUnitId,
    subject: SubjectId,
    warehouse: Option<WarehouseId>,
    state: StockUnitState,
    supply: SupplySource,
    ordered: Decimal,
    received: Decimal,
    adjusted: Decimal,
    sold: Decimal,
    shipped: Decimal,
    locked: Decimal,
    net_price: Decimal,
    shipping_price: Decimal,
    estimated_date_of_arrival: Option<DateTime<Utc>>,
    version: u64,
}

impl StockUnit {
    pub fn new(id: StockUnitId, subject: SubjectId) -> Self {
        Self {
            id,
            subject,
            warehouse: None,
            state: StockUnitState::New,
            supply: SupplySource::None,
            ordered: Decimal::ZERO,
            received: Decimal::ZERO,
            adjusted: Decimal::ZERO,
            sold: Decimal::ZERO,
            shipped: Decimal::ZERO,
            locked: Decimal::ZERO,
            net_price: Decimal::ZERO,
            shipping_price: Decimal::ZERO,
            estimated_date_of_arrival: None,
            version: 0,
        }
    }

    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    pub fn warehouse(&self) -> Option<WarehouseId> {
        self.warehouse
    }

    pub fn set_warehouse(&mut self, warehouse: Option<WarehouseId>) {
        self.warehouse = warehouse;
    }

    pub fn state(&self) -> StockUnitState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: StockUnitState) {
        self.state = state;
    }

    pub fn supply(&self) -> SupplySource {
        self.supply
    }

    pub(crate) fn set_supply(&mut self, supply: SupplySource) {
        self.supply = supply;
    }

    pub fn ordered(&self) -> Decimal {
        self.ordered
    }

    pub(crate) fn set_ordered(&mut self, quantity: Decimal) {
        self.ordered = quantity;
    }

    pub fn received(&self) -> Decimal {
        self.received
    }

    pub(crate) fn set_received(&mut self, quantity: Decimal) {
        self.received = quantity;
    }

    pub fn adjusted(&self) -> Decimal {
        self.adjusted
    }

    pub(crate) fn set_adjusted(&mut self, quantity: Decimal) {
        self.adjusted = quantity;
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

    pub fn net_price(&self) -> Decimal {
        self.net_price
    }

    pub(crate) fn set_net_price(&mut self, price: Decimal) {
        self.net_price = price;
    }

    pub fn shipping_price(&self) -> Decimal {
        self.shipping_price
    }

    pub(crate) fn set_shipping_price(&mut self, price: Decimal) {
        self.shipping_price = price;
    }

    pub fn estimated_date_of_arrival(&self) -> Option<DateTime<Utc>> {
        self.estimated_date_of_arrival
    }

    pub(crate) fn set_estimated_date_of_arrival(&mut self, eta: Option<DateTime<Utc>>) {
        self.estimated_date_of_arrival = eta;
    }

    /// Monotonic persistence version, the hook for optimistic concurrency
    /// checks at the storage boundary.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Received plus adjusted: what is physically on hand.
    pub fn on_hand(&self) -> Decimal {
        self.received + self.adjusted
    }

    /// Ceiling on how much of this unit can still be reserved.
    ///
    /// `None` means unbounded: an unlinked unit with no ordered quantity
    /// absorbs overflow reservations and has no guaranteed supply to cap
    /// against.
    pub fn reservable(&self) -> Option<Decimal> {
        if self.supply.is_none() && self.ordered.is_zero() {
            return None;
        }
        Some((self.ordered + self.adjusted - self.sold).max(Decimal::ZERO))
    }

    /// Quantity that can still be shipped from this unit.
    pub fn shippable(&self) -> Decimal {
        (self.sold.min(self.on_hand()) - self.shipped - self.locked).max(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_zero()
            && self.received.is_zero()
            && self.adjusted.is_zero()
            && self.sold.is_zero()
            && self.shipped.is_zero()
            && self.locked.is_zero()
    }

    /// State implied by the current supply link and quantities.
    ///
    /// New: nothing on hand, no supply. Pending: supplied, nothing on hand.
    /// Ready: something on hand. Closed: fully consumed.
    pub fn resolved_state(&self) -> StockUnitState {
        let on_hand = self.on_hand();
        if on_hand.is_zero() {
            if self.supply.is_some() || !self.ordered.is_zero() {
                StockUnitState::Pending
            } else {
                StockUnitState::New
            }
        } else if self.shipped == self.sold
            && self.sold == self.ordered + self.adjusted
            && self.shipped == on_hand
        {
            StockUnitState::Closed
        } else {
            StockUnitState::Ready
        }
    }
}

impl Entity for StockUnit {
    type Id = StockUnitId;

    fn id(&self) -> StockUnitId {
        self.id
    }
}
