use tracing::debug;

use merx_core::DomainResult;
use merx_supply::ProductionOrderId;

use crate::linker::unit::StockUnitLinker;
use crate::prices::SupplyPriceCalculator;
use crate::store::{EventSchedule, StockStore};
use crate::unit::{StockUnitId, SupplySource};
use crate::updater::unit::StockUnitUpdater;

/// Three-phase linking scoped to one production order.
///
/// The manufactured counterpart of [`crate::linker::SupplierOrderLinker`]:
/// same protocol, no sibling items to share shipping cost with.
pub struct ProductionOrderLinker<'a> {
    linker: &'a StockUnitLinker,
    units: StockUnitUpdater<'a>,
    calculator: &'a dyn SupplyPriceCalculator,
}

impl<'a> ProductionOrderLinker<'a> {
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
        order: ProductionOrderId,
    ) -> DomainResult<StockUnitId> {
        let unit = self
            .linker
            .link_item(store, SupplySource::Production(order))?;
        self.update_data(store, order)?;
        Ok(unit)
    }

    pub fn apply(&self, store: &mut StockStore, order: ProductionOrderId) -> DomainResult<bool> {
        let applied = self
            .linker
            .apply_item(store, SupplySource::Production(order))?;
        let refreshed = self.update_data(store, order)?;
        Ok(applied || refreshed)
    }

    pub fn unlink(&self, store: &mut StockStore, order: ProductionOrderId) -> DomainResult<()> {
        self.linker
            .unlink_item(store, SupplySource::Production(order))
    }

    /// Re-derive the linked unit's ordered quantity, pricing and ETA from
    /// the order. Nothing is persisted when the data already matches.
    pub fn update_data(
        &self,
        store: &mut StockStore,
        order: ProductionOrderId,
    ) -> DomainResult<bool> {
        let source = SupplySource::Production(order);
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
            debug!(unit = %unit, "production data refreshed");
            changed = true;
        }
        Ok(changed)
    }
}
