use rust_decimal::Decimal;
use tracing::{debug, warn};

use merx_catalog::SubjectId;
use merx_core::{DomainError, DomainResult};

use crate::assignment::StockAssignmentId;
use crate::store::{EventSchedule, StockStore};
use crate::unit::{StockUnitId, SupplySource};

/// Orchestrates linking a supply source to a stock unit and redistributing
/// assignments across units when promised quantities change.
///
/// Every redistribution walk visits a unit's assignments sorted by the
/// owning sale's creation date and moves the most recent sales first:
/// when capacity shrinks, the oldest customers keep their stock.
#[derive(Debug, Default)]
pub struct StockUnitLinker;

impl StockUnitLinker {
    pub fn new() -> Self {
        Self
    }

    /// Link a supply source to a stock unit.
    ///
    /// Reuses the subject's linkable unit or creates one, copies the
    /// promised quantity, net price and ETA onto it, then absorbs any
    /// reservation overflow (sold beyond ordered) into a fresh, unlinked
    /// unit by splitting or moving assignments, newest sales first.
    pub fn link_item(
        &self,
        store: &mut StockStore,
        source: SupplySource,
    ) -> DomainResult<StockUnitId> {
        let item = store.supply_item(source)?;
        let unit = match store.find_linkable(item.subject, None) {
            Some(unit) => unit,
            None => store.create_unit_for(item.subject),
        };
        {
            let record = store.unit_mut(unit)?;
            record.set_supply(source);
            record.set_ordered(item.quantity);
            record.set_net_price(item.net_price);
            record.set_estimated_date_of_arrival(item.estimated_date_of_arrival);
        }
        store.refresh_unit_state(unit)?;
        store.persist_unit(unit, EventSchedule::Suppressed)?;
        store.purge(unit);
        store.commit_supply_item(source)?;
        debug!(unit = %unit, quantity = %item.quantity, "supply source linked");

        let record = store.unit(unit)?;
        let overflow = record.sold() - record.ordered();
        if overflow > Decimal::ZERO {
            debug!(unit = %unit, overflow = %overflow, "absorbing reservation overflow");
            let overflow_unit = store.create_unit_for(item.subject);
            let mut remaining = overflow;
            for assignment in store.assignments_by_sale_age(unit)?.into_iter().rev() {
                if remaining <= Decimal::ZERO {
                    break;
                }
                let movable = store.assignment(assignment)?.releasable();
                if movable <= Decimal::ZERO {
                    continue;
                }
                let quantity = movable.min(remaining);
                self.move_quantity(store, assignment, overflow_unit, quantity)?;
                remaining -= quantity;
            }
            if remaining > Decimal::ZERO {
                warn!(unit = %unit, remaining = %remaining, "overflow absorption exhausted assignments");
                return Err(DomainError::logic(format!(
                    "failed to absorb reservation overflow on stock unit {unit}: {remaining} left"
                )));
            }
        }

        store.persist_unit(unit, EventSchedule::Scheduled)?;
        Ok(unit)
    }

    /// Propagate a change of the supply item's promised quantity to its
    /// linked unit, relocating reservations the shrunk unit can no longer
    /// guarantee onto sibling units with spare headroom.
    ///
    /// Returns `false` when the tracked quantity has not changed.
    pub fn apply_item(&self, store: &mut StockStore, source: SupplySource) -> DomainResult<bool> {
        let item = store.supply_item(source)?;
        let Some((old, new)) = store.quantity_change_set(source) else {
            return Ok(false);
        };
        let unit = store
            .find_linked(source)
            .ok_or_else(|| DomainError::logic("supply item is not linked to a stock unit"))?;

        let delta = new - old;
        let record = store.unit(unit)?;
        let next = record.ordered() + delta;
        if next < record.received() {
            return Err(DomainError::logic(format!(
                "cannot un-receive stock: ordered {next} would fall below received {}",
                record.received()
            )));
        }
        store.unit_mut(unit)?.set_ordered(next);
        store.refresh_unit_state(unit)?;
        debug!(unit = %unit, delta = %delta, "supply quantity change applied");

        let record = store.unit(unit)?;
        let overflow = record.sold() - record.ordered();
        if overflow > Decimal::ZERO {
            let remaining = self.relocate(store, unit, item.subject, overflow)?;
            if remaining > Decimal::ZERO {
                warn!(unit = %unit, remaining = %remaining, "reservation relocation failed");
                return Err(DomainError::logic(format!(
                    "failed to relocate reservations from stock unit {unit}: {remaining} left"
                )));
            }
        }
        // overflow < 0 means the supply grew. Pulling reservations back in
        // from sibling units is not implemented; the headroom is consumed
        // by future linking instead.

        store.commit_supply_item(source)?;
        store.persist_unit(unit, EventSchedule::Scheduled)?;
        Ok(true)
    }

    /// Detach a supply source from its unit.
    ///
    /// Refused once stock has been received or shipped. A unit without
    /// reservations is removed outright; otherwise its assignments are
    /// relocated onto sibling units, any remainder merged into the
    /// subject's linkable unit, and the emptied unit removed.
    pub fn unlink_item(&self, store: &mut StockStore, source: SupplySource) -> DomainResult<()> {
        let item = store.supply_item(source)?;
        let unit = store
            .find_linked(source)
            .ok_or_else(|| DomainError::logic("supply item is not linked to a stock unit"))?;

        let record = store.unit(unit)?;
        if record.received() > Decimal::ZERO || record.shipped() > Decimal::ZERO {
            return Err(DomainError::logic(format!(
                "cannot unlink stock unit {unit}: stock has been received or shipped"
            )));
        }
        {
            let record = store.unit_mut(unit)?;
            record.set_supply(SupplySource::None);
            record.set_ordered(Decimal::ZERO);
            record.set_estimated_date_of_arrival(None);
        }
        store.refresh_unit_state(unit)?;
        debug!(unit = %unit, "supply source unlinked");

        if store.unit_assignments(unit).is_empty() {
            store.remove_unit(unit, EventSchedule::Scheduled)?;
            return Ok(());
        }

        let sold = store.unit(unit)?.sold();
        let remaining = self.relocate(store, unit, item.subject, sold)?;
        if remaining > Decimal::ZERO {
            if let Some(linkable) = store.find_linkable(item.subject, Some(unit)) {
                for assignment in store.assignments_by_sale_age(unit)?.into_iter().rev() {
                    let movable = store.assignment(assignment)?.releasable();
                    if movable <= Decimal::ZERO {
                        continue;
                    }
                    self.move_quantity(store, assignment, linkable, movable)?;
                }
            }
        }

        if !store.unit_assignments(unit).is_empty() {
            warn!(unit = %unit, "unlink left reservations without a unit");
            return Err(DomainError::logic(format!(
                "cannot unlink stock unit {unit}: reservations cannot be relocated"
            )));
        }
        store.remove_unit(unit, EventSchedule::Scheduled)?;
        Ok(())
    }

    /// Move up to `overflow` of the unit's reservations onto other pending
    /// or ready units of the subject with spare headroom, newest sales
    /// first. Returns the quantity that found no place.
    fn relocate(
        &self,
        store: &mut StockStore,
        unit: StockUnitId,
        subject: SubjectId,
        overflow: Decimal,
    ) -> DomainResult<Decimal> {
        let mut remaining = overflow;
        'assignments: for assignment in store.assignments_by_sale_age(unit)?.into_iter().rev() {
            if remaining <= Decimal::ZERO {
                break;
            }
            let mut movable = store.assignment(assignment)?.releasable().min(remaining);
            if movable <= Decimal::ZERO {
                continue;
            }
            for target in store.find_pending_or_ready(subject, Some(unit)) {
                let Some(headroom) = store.unit(target)?.reservable() else {
                    continue;
                };
                let quantity = movable.min(headroom);
                if quantity <= Decimal::ZERO {
                    continue;
                }
                self.move_quantity(store, assignment, target, quantity)?;
                remaining -= quantity;
                movable -= quantity;
                if movable <= Decimal::ZERO {
                    continue 'assignments;
                }
            }
        }
        Ok(remaining)
    }

    /// Move `quantity` of a reservation onto `target`, splitting or
    /// re-pointing the assignment and keeping both units' sold totals in
    /// step. Merges into the target's existing assignment for the same
    /// sale item when there is one.
    fn move_quantity(
        &self,
        store: &mut StockStore,
        assignment: StockAssignmentId,
        target: StockUnitId,
        quantity: Decimal,
    ) -> DomainResult<()> {
        if quantity <= Decimal::ZERO {
            return Ok(());
        }
        let record = store.assignment(assignment)?;
        let sale_item = record.sale_item();
        let source = record
            .unit()
            .ok_or_else(|| DomainError::logic("cannot move a detached assignment"))?;
        if quantity > record.releasable() {
            return Err(DomainError::logic(
                "cannot move shipped or locked reservation quantity",
            ));
        }
        let whole = quantity == record.sold();

        {
            let unit = store.unit_mut(source)?;
            unit.set_sold(unit.sold() - quantity);
        }
        store.refresh_unit_state(source)?;
        {
            let unit = store.unit_mut(target)?;
            unit.set_sold(unit.sold() + quantity);
        }
        store.refresh_unit_state(target)?;

        match (whole, store.find_assignment(sale_item, target)) {
            (true, None) => {
                store.assignment_mut(assignment)?.set_unit(Some(target));
                store.persist_assignment(assignment, EventSchedule::Suppressed)?;
            }
            (true, Some(existing)) => {
                let merged = store.assignment_mut(existing)?;
                merged.set_sold(merged.sold() + quantity);
                store.persist_assignment(existing, EventSchedule::Suppressed)?;
                store.remove_assignment(assignment, EventSchedule::Suppressed)?;
            }
            (false, Some(existing)) => {
                let split = store.assignment_mut(assignment)?;
                split.set_sold(split.sold() - quantity);
                store.persist_assignment(assignment, EventSchedule::Suppressed)?;
                let merged = store.assignment_mut(existing)?;
                merged.set_sold(merged.sold() + quantity);
                store.persist_assignment(existing, EventSchedule::Suppressed)?;
            }
            (false, None) => {
                let split = store.assignment_mut(assignment)?;
                split.set_sold(split.sold() - quantity);
                store.persist_assignment(assignment, EventSchedule::Suppressed)?;
                let created = store.create_assignment_for(sale_item, target)?;
                store.assignment_mut(created)?.set_sold(quantity);
                store.persist_assignment(created, EventSchedule::Suppressed)?;
            }
        }

        store.persist_unit(source, EventSchedule::Suppressed)?;
        store.persist_unit(target, EventSchedule::Suppressed)?;
        debug!(
            assignment = %assignment,
            target = %target,
            quantity = %quantity,
            "reservation quantity moved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use merx_catalog::{StockSubject, StockSubjectMode, SubjectId};
    use merx_sales::{Sale, SaleId, SaleItem, SaleItemId};
    use merx_supply::{SupplierOrder, SupplierOrderId, SupplierOrderItem, SupplierOrderItemId};

    use crate::unit::StockUnitState;

    use super::*;

    fn subject(store: &mut StockStore) -> SubjectId {
        store.insert_subject(StockSubject::new(
            SubjectId::new(),
            "Shelf",
            StockSubjectMode::Auto,
        ))
    }

    fn sale_item(store: &mut StockStore, subject: SubjectId, days_ago: i64) -> SaleItemId {
        let sale = store.insert_sale(Sale::new(
            SaleId::new(),
            format!("S-{days_ago}"),
            Utc::now() - Duration::days(days_ago),
        ));
        store
            .insert_sale_item(SaleItem::new(SaleItemId::new(), sale, subject, dec!(100)))
            .unwrap()
    }

    fn supplier_item(
        store: &mut StockStore,
        subject: SubjectId,
        quantity: Decimal,
    ) -> SupplySource {
        let order = store.insert_supplier_order(SupplierOrder::new(SupplierOrderId::new(), "SO"));
        let id = store
            .insert_supplier_order_item(SupplierOrderItem::new(
                SupplierOrderItemId::new(),
                order,
                subject,
                quantity,
                dec!(10),
            ))
            .unwrap();
        SupplySource::SupplierItem(id)
    }

    /// An unlinked unit carrying `sold` through one assignment.
    fn reserved_unit(
        store: &mut StockStore,
        subject: SubjectId,
        item: SaleItemId,
        sold: Decimal,
    ) -> StockUnitId {
        let unit = store.create_unit_for(subject);
        store.unit_mut(unit).unwrap().set_sold(sold);
        let assignment = store.create_assignment_for(item, unit).unwrap();
        store.assignment_mut(assignment).unwrap().set_sold(sold);
        unit
    }

    #[test]
    fn link_item_reuses_the_reserved_unit_when_demand_fits() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);
        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(5));

        let source = supplier_item(&mut store, subject, dec!(10));
        let linked = linker.link_item(&mut store, source).unwrap();

        assert_eq!(linked, unit);
        let record = store.unit(linked).unwrap();
        assert_eq!(record.ordered(), dec!(10));
        assert_eq!(record.sold(), dec!(5));
        assert_eq!(record.supply(), source);
        assert_eq!(record.state(), StockUnitState::Pending);
    }

    #[test]
    fn link_item_splits_overflow_onto_a_new_unit() {
        // Scenario: supply of 5 against an existing reservation of 8.
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);
        let item = sale_item(&mut store, subject, 0);
        let unit = reserved_unit(&mut store, subject, item, dec!(8));

        let source = supplier_item(&mut store, subject, dec!(5));
        let linked = linker.link_item(&mut store, source).unwrap();
        assert_eq!(linked, unit);

        let record = store.unit(linked).unwrap();
        assert_eq!(record.ordered(), dec!(5));
        assert_eq!(record.sold(), dec!(5));

        let assignments = store.unit_assignments(linked);
        assert_eq!(assignments.len(), 1);
        assert_eq!(store.assignment(assignments[0]).unwrap().sold(), dec!(5));

        // The overflow landed on a fresh, still-linkable unit.
        let overflow_unit = store.find_linkable(subject, None).unwrap();
        let record = store.unit(overflow_unit).unwrap();
        assert_eq!(record.sold(), dec!(3));
        assert_eq!(record.supply(), SupplySource::None);
        let assignments = store.unit_assignments(overflow_unit);
        assert_eq!(assignments.len(), 1);
        assert_eq!(store.assignment(assignments[0]).unwrap().sold(), dec!(3));
    }

    #[test]
    fn link_item_moves_newest_sales_first() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let unit = store.create_unit_for(subject);
        let older = sale_item(&mut store, subject, 30);
        let newer = sale_item(&mut store, subject, 1);
        for (item, sold) in [(older, dec!(6)), (newer, dec!(4))] {
            let assignment = store.create_assignment_for(item, unit).unwrap();
            store.assignment_mut(assignment).unwrap().set_sold(sold);
        }
        store.unit_mut(unit).unwrap().set_sold(dec!(10));

        // Supply covers 5: the newer sale's reservation moves wholesale
        // (4), then the older one is split (1); the older sale keeps 5 on
        // the linked unit.
        let source = supplier_item(&mut store, subject, dec!(5));
        linker.link_item(&mut store, source).unwrap();

        let record = store.unit(unit).unwrap();
        assert_eq!(record.sold(), dec!(5));
        let kept = store.unit_assignments(unit);
        assert_eq!(kept.len(), 1);
        let kept = store.assignment(kept[0]).unwrap();
        assert_eq!(kept.sale_item(), older);
        assert_eq!(kept.sold(), dec!(5));

        let overflow_unit = store.find_linkable(subject, None).unwrap();
        let moved = store.unit_assignments(overflow_unit);
        assert_eq!(moved.len(), 2);
        let total: Decimal = moved
            .iter()
            .map(|id| store.assignment(*id).unwrap().sold())
            .sum();
        assert_eq!(total, dec!(5));
        assert_eq!(store.unit(overflow_unit).unwrap().sold(), dec!(5));
    }

    #[test]
    fn link_item_conserves_sold_quantity_across_the_split() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);
        let item = sale_item(&mut store, subject, 2);
        let unit = reserved_unit(&mut store, subject, item, dec!(9));

        let source = supplier_item(&mut store, subject, dec!(4));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        let total: Decimal = store
            .find_not_closed(subject)
            .into_iter()
            .map(|id| store.unit(id).unwrap().sold())
            .sum();
        assert_eq!(total, dec!(9));
    }

    #[test]
    fn apply_item_without_quantity_change_is_a_no_op() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);
        let source = supplier_item(&mut store, subject, dec!(10));
        linker.link_item(&mut store, source).unwrap();
        store.take_events();

        assert!(!linker.apply_item(&mut store, source).unwrap());
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn apply_item_relocates_to_a_unit_with_headroom() {
        // Scenario: ordered 10 -> 6 with sold 10; a sibling unit has
        // headroom 6, so 4 relocate and the shrunk unit keeps 6.
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let shrinking_sale = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, shrinking_sale, dec!(10));
        let source = supplier_item(&mut store, subject, dec!(10));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        let other_sale = sale_item(&mut store, subject, 3);
        let sibling_source = supplier_item(&mut store, subject, dec!(10));
        let sibling = linker.link_item(&mut store, sibling_source).unwrap();
        assert_ne!(sibling, unit);
        let assignment = store.create_assignment_for(other_sale, sibling).unwrap();
        store.assignment_mut(assignment).unwrap().set_sold(dec!(4));
        store.unit_mut(sibling).unwrap().set_sold(dec!(4));

        store.set_supply_quantity(source, dec!(6)).unwrap();
        assert!(linker.apply_item(&mut store, source).unwrap());

        let record = store.unit(unit).unwrap();
        assert_eq!(record.ordered(), dec!(6));
        assert_eq!(record.sold(), dec!(6));

        let record = store.unit(sibling).unwrap();
        assert_eq!(record.sold(), dec!(8));
        // The relocated quantity created its own assignment on the sibling.
        assert_eq!(store.unit_assignments(sibling).len(), 2);
    }

    #[test]
    fn apply_item_fails_when_nothing_can_absorb_the_overflow() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(10));
        let source = supplier_item(&mut store, subject, dec!(10));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        store.set_supply_quantity(source, dec!(6)).unwrap();
        let err = linker.apply_item(&mut store, source).unwrap_err();
        assert!(matches!(err, DomainError::Logic(_)));
    }

    #[test]
    fn apply_item_refuses_to_un_receive_stock() {
        // Scenario: ordered 10, received 10, sold 10; shrinking the order
        // to 6 would leave more received than ordered.
        let resolver = crate::updater::DefaultOverflowResolver;
        let updater = crate::updater::StockUnitUpdater::new(&resolver);
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(10));
        let source = supplier_item(&mut store, subject, dec!(10));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);
        updater
            .update_received(&mut store, unit, dec!(10), false)
            .unwrap();

        store.set_supply_quantity(source, dec!(6)).unwrap();
        let err = linker.apply_item(&mut store, source).unwrap_err();
        assert!(matches!(err, DomainError::Logic(_)));
    }

    #[test]
    fn apply_item_merges_into_the_existing_assignment_on_the_target() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        // One sale reserved on two units; shrinking the first merges the
        // relocated quantity into the sale's assignment on the second.
        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(10));
        let source = supplier_item(&mut store, subject, dec!(10));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        let sibling_source = supplier_item(&mut store, subject, dec!(10));
        let sibling = linker.link_item(&mut store, sibling_source).unwrap();
        let existing = store.create_assignment_for(item, sibling).unwrap();
        store.assignment_mut(existing).unwrap().set_sold(dec!(2));
        store.unit_mut(sibling).unwrap().set_sold(dec!(2));

        store.set_supply_quantity(source, dec!(7)).unwrap();
        assert!(linker.apply_item(&mut store, source).unwrap());

        assert_eq!(store.unit_assignments(sibling).len(), 1);
        assert_eq!(store.assignment(existing).unwrap().sold(), dec!(5));
        assert_eq!(store.unit(sibling).unwrap().sold(), dec!(5));
    }

    #[test]
    fn unlink_item_refuses_received_stock() {
        // Scenario: any received quantity blocks unlinking.
        let resolver = crate::updater::DefaultOverflowResolver;
        let updater = crate::updater::StockUnitUpdater::new(&resolver);
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let source = supplier_item(&mut store, subject, dec!(10));
        let unit = linker.link_item(&mut store, source).unwrap();
        updater
            .update_received(&mut store, unit, dec!(1), false)
            .unwrap();

        let err = linker.unlink_item(&mut store, source).unwrap_err();
        assert!(matches!(err, DomainError::Logic(_)));
        assert!(store.unit(unit).is_ok());
    }

    #[test]
    fn unlink_item_removes_a_unit_without_reservations() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let source = supplier_item(&mut store, subject, dec!(10));
        let unit = linker.link_item(&mut store, source).unwrap();

        linker.unlink_item(&mut store, source).unwrap();
        assert!(store.unit(unit).is_err());
    }

    #[test]
    fn unlink_item_relocates_reservations_to_sibling_units() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(4));
        let source = supplier_item(&mut store, subject, dec!(4));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        let sibling_source = supplier_item(&mut store, subject, dec!(10));
        let sibling = linker.link_item(&mut store, sibling_source).unwrap();

        linker.unlink_item(&mut store, source).unwrap();
        assert!(store.unit(unit).is_err());
        let record = store.unit(sibling).unwrap();
        assert_eq!(record.sold(), dec!(4));
        assert_eq!(store.unit_assignments(sibling).len(), 1);
    }

    #[test]
    fn unlink_item_falls_back_to_the_linkable_unit() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(4));
        let source = supplier_item(&mut store, subject, dec!(4));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        // No pending/ready sibling, but an unlinked unit can take over.
        let spare = store.create_unit_for(subject);

        linker.unlink_item(&mut store, source).unwrap();
        assert!(store.unit(unit).is_err());
        let record = store.unit(spare).unwrap();
        assert_eq!(record.sold(), dec!(4));
        assert_eq!(store.unit_assignments(spare).len(), 1);
    }

    #[test]
    fn unlink_item_fails_when_reservations_have_nowhere_to_go() {
        let linker = StockUnitLinker::new();
        let mut store = StockStore::new();
        let subject = subject(&mut store);

        let item = sale_item(&mut store, subject, 1);
        let unit = reserved_unit(&mut store, subject, item, dec!(4));
        let source = supplier_item(&mut store, subject, dec!(4));
        assert_eq!(linker.link_item(&mut store, source).unwrap(), unit);

        // No sibling with headroom and no linkable unit to merge into.
        let err = linker.unlink_item(&mut store, source).unwrap_err();
        assert!(matches!(err, DomainError::Logic(_)));
        assert_eq!(store.unit_assignments(unit).len(), 1);
    }
}
