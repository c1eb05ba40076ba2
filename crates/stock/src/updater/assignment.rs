use rust_decimal::Decimal;
use tracing::debug;

use merx_core::{DomainError, DomainResult};

use crate::assignment::StockAssignmentId;
use crate::store::{EventSchedule, StockStore};
use crate::updater::unit::StockUnitUpdater;

/// Mutates one assignment's quantities, delegating unit-level effects to
/// [`StockUnitUpdater`].
///
/// Positive deltas are capped at the stock unit's headroom and negative
/// deltas floored at what is already shipped or locked: a feasible-but-
/// smaller delta is applied, not rejected. Callers must consult the
/// returned quantity, which is what was actually applied.
pub struct StockAssignmentUpdater<'a> {
    units: StockUnitUpdater<'a>,
}

impl<'a> StockAssignmentUpdater<'a> {
    pub fn new(units: StockUnitUpdater<'a>) -> Self {
        Self { units }
    }

    pub fn update_sold(
        &self,
        store: &mut StockStore,
        assignment: StockAssignmentId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        if !relative && quantity < Decimal::ZERO {
            return Err(DomainError::stock_logic("sold quantity cannot be negative"));
        }
        let record = store.assignment(assignment)?;
        let unit = record.unit();
        let mut delta = if relative {
            quantity
        } else {
            quantity - record.sold()
        };
        if delta > Decimal::ZERO {
            if let Some(unit) = unit {
                if let Some(headroom) = store.unit(unit)?.reservable() {
                    delta = delta.min(headroom);
                }
            }
        } else {
            delta = delta.max(-record.releasable());
        }
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }

        if let Some(unit) = unit {
            self.units.update_sold(store, unit, delta, true)?;
        }
        let record = store.assignment_mut(assignment)?;
        let next = record.sold() + delta;
        record.set_sold(next);
        debug!(assignment = %assignment, delta = %delta, "assignment sold quantity updated");
        if next.is_zero() {
            store.remove_assignment(assignment, EventSchedule::Scheduled)?;
        } else {
            store.persist_assignment(assignment, EventSchedule::Scheduled)?;
        }
        Ok(delta)
    }

    pub fn update_shipped(
        &self,
        store: &mut StockStore,
        assignment: StockAssignmentId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        if !relative && quantity < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "shipped quantity cannot be negative",
            ));
        }
        let record = store.assignment(assignment)?;
        let unit = record.unit();
        let mut delta = if relative {
            quantity
        } else {
            quantity - record.shipped()
        };
        if delta > Decimal::ZERO {
            let mut cap = record.releasable();
            if let Some(unit) = unit {
                cap = cap.min(store.unit(unit)?.shippable());
            }
            delta = delta.min(cap);
        } else {
            delta = delta.max(-record.shipped());
        }
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }

        if let Some(unit) = unit {
            self.units.update_shipped(store, unit, delta, true)?;
        }
        let record = store.assignment_mut(assignment)?;
        record.set_shipped(record.shipped() + delta);
        debug!(assignment = %assignment, delta = %delta, "assignment shipped quantity updated");
        store.persist_assignment(assignment, EventSchedule::Scheduled)?;
        Ok(delta)
    }

    pub fn update_locked(
        &self,
        store: &mut StockStore,
        assignment: StockAssignmentId,
        quantity: Decimal,
        relative: bool,
    ) -> DomainResult<Decimal> {
        if !relative && quantity < Decimal::ZERO {
            return Err(DomainError::stock_logic(
                "locked quantity cannot be negative",
            ));
        }
        let record = store.assignment(assignment)?;
        let unit = record.unit();
        let mut delta = if relative {
            quantity
        } else {
            quantity - record.locked()
        };
        if delta > Decimal::ZERO {
            let mut cap = record.releasable();
            if let Some(unit) = unit {
                cap = cap.min(store.unit(unit)?.shippable());
            }
            delta = delta.min(cap);
        } else {
            delta = delta.max(-record.locked());
        }
        if delta.is_zero() {
            return Ok(Decimal::ZERO);
        }

        if let Some(unit) = unit {
            self.units.update_locked(store, unit, delta, true)?;
        }
        let record = store.assignment_mut(assignment)?;
        record.set_locked(record.locked() + delta);
        debug!(assignment = %assignment, delta = %delta, "assignment locked quantity updated");
        store.persist_assignment(assignment, EventSchedule::Scheduled)?;
        Ok(delta)
    }
}
