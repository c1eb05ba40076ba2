use tracing::debug;

use merx_core::DomainResult;
use merx_supply::SupplierOrderItemId;

use crate::linker::unit::StockUnitLinker;
use crate::prices::SupplyPriceCalculator;
use crate::store::{EventSchedule, StockStore};
use crate::unit::{StockUnitId, SupplySource};
use crate::updater::unit::StockUnitUpdater;

/// Three-phase linking scoped to one supplier order item.
///
/// Delegates the redistribution-aware protocol to [`StockUnitLinker`] and
/// keeps the unit's derived data (ordered quantity, pricing, ETA) in step
/// through [`SupplierOrderLinker::update_data`], which is idempotent and
/// safe to call redundantly after any phase.
pub struct SupplierOrderLinker<'a> {
    linker: &'a StockUnitLinker,
    units: StockUnitUpdater<'a>,
    calculator: &'a dyn SupplyPriceCalculator,
}

impl<'a> SupplierOrderLinker<'a> {
    pub fn new(
        linker: &'a StockUnitLinker,
        units: StockUnitUpdater<'a>,
        calculator: &'a dyn SupplyPriceCalculator,
    ) -> Self {
        Self {
            linker,
            units,
            calculator,
        }
    }

    pub fn link(
        &self,
        store: &mut StockStore,
        item: SupplierOrderItemId,
    ) -> DomainResult<StockUnitId> {
        let unit = self
            .linker
            .link_item(store, SupplySource::SupplierItem(item))?;
        self.update_data(store, item)?;
        Ok(unit)
    }

    pub fn apply(&self, store: &mut StockStore, item: SupplierOrderItemId) -> DomainResult<bool> {
        let applied = self
            .linker
            .apply_item(store, SupplySource::SupplierItem(item))?;
        let refreshed = self.update_data(store, item)?;
        Ok(applied || refreshed)
    }

    pub fn unlink(&self, store: &mut StockStore, item: SupplierOrderItemId) -> DomainResult<()> {
        self.linker
            .unlink_item(store, SupplySource::SupplierItem(item))
    }

    /// Re-derive the linked unit's ordered quantity, pricing and ETA from
    /// the item. Nothing is persisted when the data already matches.
    pub fn update_data(
        &self,
        store: &mut StockStore,
        item: SupplierOrderItemId,
    ) -> DomainResult<bool> {
        let source = SupplySource::SupplierItem(item);
        let Some(unit) = store.find_linked(source) else {
            return Ok(false);
        };
        let supply = store.supply_item(source)?;
        let mut changed = false;

        if store.unit(unit)?.ordered() != supply.quantity {
            self.units
                .update_ordered(store, unit, supply.quantity, false)?;
            changed = true;
        }

        let net_price = self.calculator.unit_net_price(store, source)?;
        let shipping_price = self.calculator.unit_shipping_price(store, source)?;
        let eta = self.calculator.estimated_date_of_arrival(store, source)?;
        let record = store.unit(unit)?;
        if record.net_price() != net_price
            || record.shipping_price() != shipping_price
            || record.estimated_date_of_arrival() != eta
        {
            let record = store.unit_mut(unit)?;
            record.set_net_price(net_price);
            record.set_shipping_price(shipping_price);
            record.set_estimated_date_of_arrival(eta);
            store.persist_unit(unit, EventSchedule::Scheduled)?;
            debug!(unit = %unit, "supply pricing data refreshed");
            changed = true;
        }
        Ok(changed)
    }
}
