//! Subject-level stock aggregation and state derivation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use merx_catalog::{StockState, StockSubject, StockSubjectMode, SubjectId};
use merx_core::{DomainResult, Entity};
use merx_supply::SupplierProduct;

use crate::store::{EventSchedule, StockStore};
use crate::unit::StockUnitState;

/// Supplier-quoted availability, the fallback when no internal supply
/// answers for a subject.
pub trait SupplierAvailability {
    /// Stock suppliers quote as immediately available for the subject.
    fn available_quantity(&self, subject: SubjectId) -> Decimal;

    /// Earliest restock date suppliers quote for the subject.
    fn earliest_eta(&self, subject: SubjectId) -> Option<DateTime<Utc>>;
}

/// No quotes at all.
#[derive(Debug, Default)]
pub struct NoSupplierAvailability;

impl SupplierAvailability for NoSupplierAvailability {
    fn available_quantity(&self, _subject: SubjectId) -> Decimal {
        Decimal::ZERO
    }

    fn earliest_eta(&self, _subject: SubjectId) -> Option<DateTime<Utc>> {
        None
    }
}

/// Quotes backed by supplier products.
#[derive(Debug, Default)]
pub struct SupplierProductAvailability {
    products: Vec<SupplierProduct>,
}

impl SupplierProductAvailability {
    pub fn new(products: Vec<SupplierProduct>) -> Self {
        Self { products }
    }

    pub fn push(&mut self, product: SupplierProduct) {
        self.products.push(product);
    }
}

impl SupplierAvailability for SupplierProductAvailability {
    fn available_quantity(&self, subject: SubjectId) -> Decimal {
        self.products
            .iter()
            .filter(|product| product.subject() == subject)
            .map(|product| product.available_stock())
            .sum()
    }

    fn earliest_eta(&self, subject: SubjectId) -> Option<DateTime<Utc>> {
        self.products
            .iter()
            .filter(|product| product.subject() == subject)
            .filter_map(|product| product.estimated_date_of_arrival())
            .min()
    }
}

/// Rolls a subject's stock units up into subject-level quantities and
/// derives its stock state.
pub struct StockSubjectUpdater<'a> {
    supplier: &'a dyn SupplierAvailability,
}

impl<'a> StockSubjectUpdater<'a> {
    pub fn new(supplier: &'a dyn SupplierAvailability) -> Self {
        Self { supplier }
    }

    /// Recompute the subject's quantity rollups from its not-closed units.
    ///
    /// Sold counts from every unit; ordered, received, shipped and the
    /// minimum ETA only from units past `New`. Returns whether anything
    /// changed (nothing is persisted otherwise).
    pub fn update(&self, store: &mut StockStore, subject: SubjectId) -> DomainResult<bool> {
        let mode = store.subject(subject)?.mode();

        let mut ordered = Decimal::ZERO;
        let mut received = Decimal::ZERO;
        let mut sold = Decimal::ZERO;
        let mut shipped = Decimal::ZERO;
        let mut eta: Option<DateTime<Utc>> = None;
        for unit in store.find_not_closed(subject) {
            let record = store.unit(unit)?;
            sold += record.sold();
            if record.state() == StockUnitState::New {
                continue;
            }
            ordered += record.ordered();
            received += record.received();
            shipped += record.shipped();
            if let Some(unit_eta) = record.estimated_date_of_arrival() {
                eta = Some(match eta {
                    Some(current) => current.min(unit_eta),
                    None => unit_eta,
                });
            }
        }

        let in_stock = (received - shipped).max(Decimal::ZERO);
        let available_stock = (received - sold).max(Decimal::ZERO);
        let virtual_stock = ordered - sold;
        let eta = if ordered <= received {
            // Nothing more is expected to arrive.
            None
        } else if eta.is_some() || mode.is_manual() {
            eta
        } else {
            self.supplier.earliest_eta(subject)
        };

        let record = store.subject(subject)?;
        if record.in_stock() == in_stock
            && record.available_stock() == available_stock
            && record.virtual_stock() == virtual_stock
            && record.estimated_date_of_arrival() == eta
        {
            return Ok(false);
        }
        let record = store.subject_mut(subject)?;
        record.set_in_stock(in_stock);
        record.set_available_stock(available_stock);
        record.set_virtual_stock(virtual_stock);
        record.set_estimated_date_of_arrival(eta);
        store.persist_subject(subject, EventSchedule::Scheduled)?;
        debug!(
            subject = %subject,
            in_stock = %in_stock,
            available = %available_stock,
            virtual_stock = %virtual_stock,
            "subject stock rollups updated"
        );
        Ok(true)
    }

    /// Re-derive the subject's stock state from its rollups; returns
    /// whether the state changed.
    pub fn update_stock_state(
        &self,
        store: &mut StockStore,
        subject: SubjectId,
    ) -> DomainResult<bool> {
        let record = store.subject(subject)?;
        let next = self.resolve_state(record);
        if next == record.state() {
            return Ok(false);
        }
        store.subject_mut(subject)?.set_state(next);
        store.persist_subject(subject, EventSchedule::Scheduled)?;
        debug!(subject = %subject, state = ?next, "subject stock state changed");
        Ok(true)
    }

    fn resolve_state(&self, subject: &StockSubject) -> StockState {
        if subject.available_stock() > Decimal::ZERO {
            return StockState::InStock;
        }
        if subject.virtual_stock() > Decimal::ZERO
            || subject.estimated_date_of_arrival().is_some()
        {
            return StockState::PreOrder;
        }
        let mode = subject.mode();
        if !mode.is_manual() {
            if self.supplier.available_quantity(subject.id()) > Decimal::ZERO {
                return match mode {
                    StockSubjectMode::JustInTime => StockState::InStock,
                    _ => StockState::PreOrder,
                };
            }
            if mode == StockSubjectMode::Auto && self.supplier.earliest_eta(subject.id()).is_some()
            {
                return StockState::PreOrder;
            }
        }
        if mode == StockSubjectMode::JustInTime {
            StockState::PreOrder
        } else {
            StockState::OutOfStock
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    use merx_supply::ProductionOrderId;

    use crate::unit::{StockUnitId, SupplySource};

    use super::*;

    fn store_with_subject(mode: StockSubjectMode) -> (StockStore, SubjectId) {
        let mut store = StockStore::new();
        let subject =
            store.insert_subject(StockSubject::new(SubjectId::new(), "Stool", mode));
        (store, subject)
    }

    fn seeded_unit(
        store: &mut StockStore,
        subject: SubjectId,
        ordered: Decimal,
        received: Decimal,
        sold: Decimal,
        shipped: Decimal,
    ) -> StockUnitId {
        let unit = store.create_unit_for(subject);
        let record = store.unit_mut(unit).unwrap();
        record.set_supply(SupplySource::Production(ProductionOrderId::new()));
        record.set_ordered(ordered);
        record.set_received(received);
        record.set_sold(sold);
        record.set_shipped(shipped);
        let state = record.resolved_state();
        record.set_state(state);
        unit
    }

    #[test]
    fn rollups_follow_the_aggregation_formulas() {
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);

        seeded_unit(&mut store, subject, dec!(10), dec!(6), dec!(4), dec!(2));
        seeded_unit(&mut store, subject, dec!(5), dec!(0), dec!(3), dec!(0));

        assert!(updater.update(&mut store, subject).unwrap());
        let record = store.subject(subject).unwrap();
        assert_eq!(record.in_stock(), dec!(4));
        assert_eq!(record.available_stock(), dec!(0));
        assert_eq!(record.virtual_stock(), dec!(8));
    }

    #[test]
    fn sold_on_new_units_still_counts() {
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);

        // An unlinked overflow unit: nothing ordered, three reserved.
        let unit = store.create_unit_for(subject);
        store.unit_mut(unit).unwrap().set_sold(dec!(3));

        assert!(updater.update(&mut store, subject).unwrap());
        let record = store.subject(subject).unwrap();
        assert_eq!(record.virtual_stock(), dec!(-3));
        assert_eq!(record.available_stock(), dec!(0));
    }

    #[test]
    fn eta_is_cleared_once_everything_arrived() {
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);

        let unit = seeded_unit(&mut store, subject, dec!(5), dec!(5), dec!(1), dec!(0));
        store
            .unit_mut(unit)
            .unwrap()
            .set_estimated_date_of_arrival(Some(Utc::now() + Duration::days(7)));

        updater.update(&mut store, subject).unwrap();
        assert_eq!(
            store.subject(subject).unwrap().estimated_date_of_arrival(),
            None
        );
    }

    #[test]
    fn eta_falls_back_to_supplier_quotes_for_non_manual_modes() {
        let quoted = Utc::now() + Duration::days(21);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);
        let supplier = SupplierProductAvailability::new(vec![SupplierProduct::new(
            subject,
            Decimal::ZERO,
            Some(quoted),
        )]);
        let updater = StockSubjectUpdater::new(&supplier);

        seeded_unit(&mut store, subject, dec!(5), dec!(0), dec!(0), dec!(0));

        updater.update(&mut store, subject).unwrap();
        assert_eq!(
            store.subject(subject).unwrap().estimated_date_of_arrival(),
            Some(quoted)
        );
    }

    #[test]
    fn update_is_idempotent() {
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);
        seeded_unit(&mut store, subject, dec!(10), dec!(6), dec!(4), dec!(2));

        assert!(updater.update(&mut store, subject).unwrap());
        store.take_events();
        assert!(!updater.update(&mut store, subject).unwrap());
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn available_stock_wins_over_everything() {
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Manual);
        seeded_unit(&mut store, subject, dec!(10), dec!(6), dec!(2), dec!(0));

        updater.update(&mut store, subject).unwrap();
        assert!(updater.update_stock_state(&mut store, subject).unwrap());
        assert_eq!(store.subject(subject).unwrap().state(), StockState::InStock);
    }

    #[test]
    fn virtual_stock_or_eta_mean_pre_order() {
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Manual);
        seeded_unit(&mut store, subject, dec!(10), dec!(0), dec!(4), dec!(0));

        updater.update(&mut store, subject).unwrap();
        updater.update_stock_state(&mut store, subject).unwrap();
        assert_eq!(
            store.subject(subject).unwrap().state(),
            StockState::PreOrder
        );
    }

    #[test]
    fn manual_mode_without_stock_is_out_of_stock() {
        // Scenario: available 0, virtual 0, no ETA.
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::Manual);

        updater.update(&mut store, subject).unwrap();
        assert!(!updater.update_stock_state(&mut store, subject).unwrap());
        assert_eq!(
            store.subject(subject).unwrap().state(),
            StockState::OutOfStock
        );
    }

    #[test]
    fn just_in_time_mode_falls_back_to_pre_order() {
        // Scenario: identical quantities, just-in-time mode.
        let supplier = NoSupplierAvailability;
        let updater = StockSubjectUpdater::new(&supplier);
        let (mut store, subject) = store_with_subject(StockSubjectMode::JustInTime);

        updater.update(&mut store, subject).unwrap();
        assert!(updater.update_stock_state(&mut store, subject).unwrap());
        assert_eq!(
            store.subject(subject).unwrap().state(),
            StockState::PreOrder
        );
    }

    #[test]
    fn supplier_quotes_drive_the_state_for_tracked_modes() {
        let (mut store, subject) = store_with_subject(StockSubjectMode::JustInTime);
        let supplier = SupplierProductAvailability::new(vec![SupplierProduct::new(
            subject,
            dec!(50),
            None,
        )]);
        let updater = StockSubjectUpdater::new(&supplier);

        updater.update_stock_state(&mut store, subject).unwrap();
        assert_eq!(store.subject(subject).unwrap().state(), StockState::InStock);

        // Auto mode treats quoted stock as pre-orderable, not sellable.
        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);
        let supplier = SupplierProductAvailability::new(vec![SupplierProduct::new(
            subject,
            dec!(50),
            None,
        )]);
        let updater = StockSubjectUpdater::new(&supplier);
        updater.update_stock_state(&mut store, subject).unwrap();
        assert_eq!(
            store.subject(subject).unwrap().state(),
            StockState::PreOrder
        );
    }

    #[test]
    fn quoted_eta_without_stock_is_pre_order_in_auto_mode_only() {
        let quoted = Utc::now() + Duration::days(10);

        let (mut store, subject) = store_with_subject(StockSubjectMode::Auto);
        let supplier = SupplierProductAvailability::new(vec![SupplierProduct::new(
            subject,
            Decimal::ZERO,
            Some(quoted),
        )]);
        let updater = StockSubjectUpdater::new(&supplier);
        updater.update_stock_state(&mut store, subject).unwrap();
        assert_eq!(
            store.subject(subject).unwrap().state(),
            StockState::PreOrder
        );

        let (mut store, subject) = store_with_subject(StockSubjectMode::Manual);
        let supplier = SupplierProductAvailability::new(vec![SupplierProduct::new(
            subject,
            Decimal::ZERO,
            Some(quoted),
        )]);
        let updater = StockSubjectUpdater::new(&supplier);
        assert!(!updater.update_stock_state(&mut store, subject).unwrap());
        assert_eq!(
            store.subject(subject).unwrap().state(),
            StockState::OutOfStock
        );
    }
}
