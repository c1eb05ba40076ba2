use rust_decimal::Decimal;
use tracing::debug;

use merx_core::{DomainError, DomainResult};

use crate::store::{EventSchedule, StockStore};
use crate::unit::StockUnitId;

/// Decides what happens to a unit once its quantities have changed.
///
/// Returns `true` when the resolver persisted or removed the unit itself,
/// in which case the updater must not persist it again.
pub trait OverflowResolver {
    fn resolve(&self, store: &mut StockStore, unit: StockUnitId) -> DomainResult<bool>;
}

/// Removes drained, unsupplied units; leaves cross-unit redistribution to
/// the linkers.
#[derive(Debug, Default)]
pub struct DefaultOverflowResolver;

impl OverflowResolver for DefaultOverflowResolver {
    fn resolve(&self, store: &mut StockStore, unit: StockUnitId) -> DomainResult<bool> {
        let record = store.unit(unit)?;
        if record.is_empty() && record.supply().is_none() && store.unit_assignments(unit).is_empty()
        {
            store.remove_unit(unit, EventSchedule::Scheduled)?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Mutates one stock unit's quantities under its ordering invariants.
///
/// Every operation takes an absolute quantity or a relative delta
/// (`relative`), validates the resulting absolute value, persists the unit
/// and returns the delta actually applied. Violations raise
/// [`DomainError::StockLogic`]; nothing is silently corrected at the unit
/// level.
pub struct StockUnitUpdater<'a> {
    overflow: &'a dyn OverflowResolver,
}

impl<'a> StockUnitUpdater<'a> {
    pub fn new(overflow: &'a dyn OverflowResolver) -> Self {
        Self { overflow }
    }

    pub fn update_ordered(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        let record = store.unit(unit)?;
        let delta = if relative {
            quantity
        } else {
            quantity - record.ordered()
        };
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let next = record.ordered() + delta;
        if next < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "ordered quantity cannot be negative",
            ));
        }
        if next < record.received() {
            return Err(DomainError::stock_logic(format!(
                "ordered quantity {next} cannot fall below received {}",
                record.received()
            )));
        }
        store.unit_mut(unit)?.set_ordered(next);
        debug!(unit = %unit, field = "ordered", delta = %delta, "stock unit updated");
        self.finalize(store, unit)?;
        Ok(delta)
    }

    pub fn update_received(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        let record = store.unit(unit)?;
        let delta = if relative {
            quantity
        } else {
            quantity - record.received()
        };
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let next = record.received() + delta;
        if next < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "received quantity cannot be negative",
            ));
        }
        if next > record.ordered() {
            return Err(DomainError::stock_logic(format!(
                "received quantity {next} cannot exceed ordered {}",
                record.ordered()
            )));
        }
        if next + record.adjusted() < record.shipped() + record.locked() {
            return Err(DomainError::stock_logic(
                "received quantity cannot fall below shipped and locked",
            ));
        }
        store.unit_mut(unit)?.set_received(next);
        debug!(unit = %unit, field = "received", delta = %delta, "stock unit updated");
        self.finalize(store, unit)?;
        Ok(delta)
    }

    pub fn update_adjusted(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        let record = store.unit(unit)?;
        let delta = if relative {
            quantity
        } else {
            quantity - record.adjusted()
        };
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let next = record.adjusted() + delta;
        if next < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "adjusted quantity cannot be negative",
            ));
        }
        if record.received() + next < record.shipped() + record.locked() {
            return Err(DomainError::stock_logic(
                "adjusted quantity cannot fall below shipped and locked",
            ));
        }
        store.unit_mut(unit)?.set_adjusted(next);
        debug!(unit = %unit, field = "adjusted", delta = %delta, "stock unit updated");
        self.finalize(store, unit)?;
        Ok(delta)
    }

    pub fn update_sold(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        let record = store.unit(unit)?;
        let delta = if relative {
            quantity
        } else {
            quantity - record.sold()
        };
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let next = record.sold() + delta;
        if next < Decimal::ZERO {
            return Err(DomainError::stock_logic("sold quantity cannot be negative"));
        }
        if next < record.shipped() + record.locked() {
            return Err(DomainError::stock_logic(format!(
                "sold quantity {next} cannot fall below shipped and locked {}",
                record.shipped() + record.locked()
            )));
        }
        store.unit_mut(unit)?.set_sold(next);
        debug!(unit = %unit, field = "sold", delta = %delta, "stock unit updated");
        self.finalize(store, unit)?;
        Ok(delta)
    }

    pub fn update_shipped(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        let record = store.unit(unit)?;
        let delta = if relative {
            quantity
        } else {
            quantity - record.shipped()
        };
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let next = record.shipped() + delta;
        if next < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "shipped quantity cannot be negative",
            ));
        }
        if next > record.sold() {
            return Err(DomainError::stock_logic(format!(
                "shipped quantity {next} cannot exceed sold {}",
                record.sold()
            )));
        }
        if next + record.locked() > record.on_hand() {
            return Err(DomainError::stock_logic(format!(
                "shipped quantity {next} cannot exceed on-hand {}",
                record.on_hand()
            )));
        }
        store.unit_mut(unit)?.set_shipped(next);
        debug!(unit = %unit, field = "shipped", delta = %delta, "stock unit updated");
        self.finalize(store, unit)?;
        Ok(delta)
    }

    pub fn update_locked(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        let record = store.unit(unit)?;
        let delta = if relative {
            quantity
        } else {
            quantity - record.locked()
        };
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let next = record.locked() + delta;
        if next < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "locked quantity cannot be negative",
            ));
        }
        if record.shipped() + next > record.sold() {
            return Err(DomainError::stock_logic(
                "locked quantity cannot exceed unshipped sold quantity",
            ));
        }
        if record.shipped() + next > record.on_hand() {
            return Err(DomainError::stock_logic(
                "locked quantity cannot exceed on-hand quantity",
            ));
        }
        store.unit_mut(unit)?.set_locked(next);
        debug!(unit = %unit, field = "locked", delta = %delta, "stock unit updated");
        self.finalize(store, unit)?;
        Ok(delta)
    }

    /// Refresh the unit's state, give the overflow resolver its say, then
    /// persist unless the resolver already did.
    fn finalize(&self, store: &mut StockStore, unit: StockUnitId) -> DomainResult<()> {
        store.refresh_unit_state(unit)?;
        if self.overflow.resolve(store, unit)? {
            return Ok(());
        }
        store.persist_unit(unit, EventSchedule::Scheduled)
    }
}
