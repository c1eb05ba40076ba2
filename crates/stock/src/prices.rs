//! Derived pricing for supply lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use merx_core::{DomainError, DomainResult};
use merx_supply::SupplierOrderItem;

use crate::store::StockStore;
use crate::unit::SupplySource;

/// Computes what a stock unit should carry for a given supply line.
pub trait SupplyPriceCalculator {
    fn unit_net_price(&self, store: &StockStore, source: SupplySource) -> DomainResult<Decimal>;

    fn unit_shipping_price(&self, store: &StockStore, source: SupplySource)
    -> DomainResult<Decimal>;

    fn estimated_date_of_arrival(
        &self,
        store: &StockStore,
        source: SupplySource,
    ) -> DomainResult<Option<DateTime<Utc>>>;
}

/// Allocates a supplier order's shipping cost across its items
/// proportionally: by weight, falling back to price, falling back to
/// quantity when sibling weight or price data is missing. Production
/// orders carry no shipping cost.
#[derive(Debug, Default)]
pub struct WeightedPriceCalculator;

impl WeightedPriceCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl SupplyPriceCalculator for WeightedPriceCalculator {
    fn unit_net_price(&self, store: &StockStore, source: SupplySource) -> DomainResult<Decimal> {
        Ok(store.supply_item(source)?.net_price)
    }

    fn unit_shipping_price(
        &self,
        store: &StockStore,
        source: SupplySource,
    ) -> DomainResult<Decimal> {
        let item = match source {
            SupplySource::SupplierItem(id) => id,
            SupplySource::Production(_) => return Ok(Decimal::ZERO),
            SupplySource::None => {
                return Err(DomainError::validation("supply source is required"));
            }
        };
        let item = store.supplier_order_item(item)?;
        let order = store.supplier_order(item.order())?;
        let cost = order.shipping_cost();
        if cost.is_zero() || item.quantity().is_zero() {
            return Ok(Decimal::ZERO);
        }

        let siblings = store.supplier_order_items(item.order());
        let by_weight = siblings.iter().all(|i| i.weight() > Decimal::ZERO);
        let by_price = siblings.iter().all(|i| i.net_price() > Decimal::ZERO);
        let line_basis = |i: &SupplierOrderItem| {
            if by_weight {
                i.weight() * i.quantity()
            } else if by_price {
                i.net_price() * i.quantity()
            } else {
                i.quantity()
            }
        };
        let total: Decimal = siblings.iter().map(|i| line_basis(*i)).sum();
        if total.is_zero() {
            return Ok(Decimal::ZERO);
        }
        Ok(cost * line_basis(item) / total / item.quantity())
    }

    fn estimated_date_of_arrival(
        &self,
        store: &StockStore,
        source: SupplySource,
    ) -> DomainResult<Option<DateTime<Utc>>> {
        Ok(store.supply_item(source)?.estimated_date_of_arrival)
    }
}
