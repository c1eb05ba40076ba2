//! In-memory unit of work over the stock graph.
//!
//! Owns the records (subjects, sales, supply orders, stock units,
//! assignments) behind typed identifiers and provides the collaborator
//! contracts the updaters and linkers are written against: persistence with
//! event staging, unit resolution, assignment creation and supply-item
//! change tracking. A host application binds one store to one persistence
//! transaction; everything staged here becomes durable (and the staged
//! events visible) only when that transaction commits.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_catalog::{StockSubject, SubjectId};
use merx_core::{DomainError, DomainResult, Entity};
use merx_sales::{Sale, SaleId, SaleItem, SaleItemId};
use merx_supply::{
    ProductionOrder, ProductionOrderId, SupplierOrder, SupplierOrderId, SupplierOrderItem,
    SupplierOrderItemId,
};

use crate::assignment::{StockAssignment, StockAssignmentId};
use crate::unit::{StockUnit, StockUnitId, StockUnitState, SupplySource};

/// Whether a persist/remove should surface as a domain event at commit.
///
/// Multi-step redistribution persists intermediate entities `Suppressed`;
/// only the final, caller-visible write of a top-level operation is
/// `Scheduled`. This replaces a boolean flag threaded through every call
/// with an explicit staging batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSchedule {
    Scheduled,
    Suppressed,
}

/// Domain event staged for dispatch at transaction commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockEvent {
    UnitChanged(StockUnitId),
    UnitRemoved(StockUnitId),
    AssignmentChanged(StockAssignmentId),
    AssignmentRemoved(StockAssignmentId),
    SubjectChanged(SubjectId),
}

impl StockEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            StockEvent::UnitChanged(_) => "stock.unit.changed",
            StockEvent::UnitRemoved(_) => "stock.unit.removed",
            StockEvent::AssignmentChanged(_) => "stock.assignment.changed",
            StockEvent::AssignmentRemoved(_) => "stock.assignment.removed",
            StockEvent::SubjectChanged(_) => "stock.subject.changed",
        }
    }
}

/// Flattened view of a supply line, common to supplier order items and
/// production orders. What the linker reads; never written back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyItem {
    pub source: SupplySource,
    pub subject: SubjectId,
    pub quantity: Decimal,
    pub net_price: Decimal,
    pub estimated_date_of_arrival: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct StockStore {
    subjects: BTreeMap<SubjectId, StockSubject>,
    sales: BTreeMap<SaleId, Sale>,
    sale_items: BTreeMap<SaleItemId, SaleItem>,
    supplier_orders: BTreeMap<SupplierOrderId, SupplierOrder>,
    supplier_items: BTreeMap<SupplierOrderItemId, SupplierOrderItem>,
    production_orders: BTreeMap<ProductionOrderId, ProductionOrder>,
    units: BTreeMap<StockUnitId, StockUnit>,
    assignments: BTreeMap<StockAssignmentId, StockAssignment>,
    /// Supply quantity as last persisted, keyed by source.
    quantity_baselines: HashMap<SupplySource, Decimal>,
    /// Units created in this transaction, per subject, newest last.
    fresh_units: HashMap<SubjectId, Vec<StockUnitId>>,
    events: Vec<StockEvent>,
}

impl StockStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- subjects ----------------------------------------------------------

    pub fn insert_subject(&mut self, subject: StockSubject) -> SubjectId {
        let id = subject.id();
        self.subjects.insert(id, subject);
        id
    }

    pub fn subject(&self, id: SubjectId) -> DomainResult<&StockSubject> {
        self.subjects
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("subject {id}")))
    }

    pub(crate) fn subject_mut(&mut self, id: SubjectId) -> DomainResult<&mut StockSubject> {
        self.subjects
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("subject {id}")))
    }

    pub fn persist_subject(&mut self, id: SubjectId, schedule: EventSchedule) -> DomainResult<()> {
        self.subject(id)?;
        self.push_event(StockEvent::SubjectChanged(id), schedule);
        Ok(())
    }

    // -- sales -------------------------------------------------------------

    pub fn insert_sale(&mut self, sale: Sale) -> SaleId {
        let id = sale.id();
        self.sales.insert(id, sale);
        id
    }

    pub fn sale(&self, id: SaleId) -> DomainResult<&Sale> {
        self.sales
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("sale {id}")))
    }

    pub fn insert_sale_item(&mut self, item: SaleItem) -> DomainResult<SaleItemId> {
        self.sale(item.sale())?;
        let id = item.id();
        self.sale_items.insert(id, item);
        Ok(id)
    }

    pub fn sale_item(&self, id: SaleItemId) -> DomainResult<&SaleItem> {
        self.sale_items
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("sale item {id}")))
    }

    // -- supply ------------------------------------------------------------

    pub fn insert_supplier_order(&mut self, order: SupplierOrder) -> SupplierOrderId {
        let id = order.id();
        self.supplier_orders.insert(id, order);
        id
    }

    pub fn supplier_order(&self, id: SupplierOrderId) -> DomainResult<&SupplierOrder> {
        self.supplier_orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("supplier order {id}")))
    }

    pub fn insert_supplier_order_item(
        &mut self,
        item: SupplierOrderItem,
    ) -> DomainResult<SupplierOrderItemId> {
        self.supplier_order(item.order())?;
        let id = item.id();
        self.quantity_baselines
            .insert(SupplySource::SupplierItem(id), item.quantity());
        self.supplier_items.insert(id, item);
        Ok(id)
    }

    pub fn supplier_order_item(&self, id: SupplierOrderItemId) -> DomainResult<&SupplierOrderItem> {
        self.supplier_items
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("supplier order item {id}")))
    }

    pub fn supplier_order_mut(&mut self, id: SupplierOrderId) -> DomainResult<&mut SupplierOrder> {
        self.supplier_orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("supplier order {id}")))
    }

    pub fn supplier_order_item_mut(
        &mut self,
        id: SupplierOrderItemId,
    ) -> DomainResult<&mut SupplierOrderItem> {
        self.supplier_items
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("supplier order item {id}")))
    }

    /// Items belonging to one supplier order, the siblings the shipping
    /// cost is allocated across.
    pub fn supplier_order_items(&self, order: SupplierOrderId) -> Vec<&SupplierOrderItem> {
        self.supplier_items
            .values()
            .filter(|item| item.order() == order)
            .collect()
    }

    pub fn insert_production_order(&mut self, order: ProductionOrder) -> ProductionOrderId {
        let id = order.id();
        self.quantity_baselines
            .insert(SupplySource::Production(id), order.quantity());
        self.production_orders.insert(id, order);
        id
    }

    pub fn production_order(&self, id: ProductionOrderId) -> DomainResult<&ProductionOrder> {
        self.production_orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("production order {id}")))
    }

    /// Change the promised quantity of a supply line. The previous persisted
    /// value stays in the change set until [`StockStore::commit_supply_item`].
    pub fn set_supply_quantity(
        &mut self,
        source: SupplySource,
        quantity: Decimal,
    ) -> DomainResult<()> {
        if quantity < Decimal::ZERO {
            return Err(DomainError::validation("supply quantity cannot be negative"));
        }
        match source {
            SupplySource::SupplierItem(id) => {
                self.supplier_items
                    .get_mut(&id)
                    .ok_or_else(|| DomainError::not_found(format!("supplier order item {id}")))?
                    .set_quantity(quantity);
            }
            SupplySource::Production(id) => {
                self.production_orders
                    .get_mut(&id)
                    .ok_or_else(|| DomainError::not_found(format!("production order {id}")))?
                    .set_quantity(quantity);
            }
            SupplySource::None => {
                return Err(DomainError::validation("supply source is required"));
            }
        }
        Ok(())
    }

    /// `[old, new]` of the supply quantity, `None` when unchanged.
    pub fn quantity_change_set(&self, source: SupplySource) -> Option<(Decimal, Decimal)> {
        let baseline = *self.quantity_baselines.get(&source)?;
        let current = self.supply_item(source).ok()?.quantity;
        if baseline == current {
            None
        } else {
            Some((baseline, current))
        }
    }

    pub fn is_supply_quantity_changed(&self, source: SupplySource) -> bool {
        self.quantity_change_set(source).is_some()
    }

    /// Mark the supply line's current quantity as persisted.
    pub fn commit_supply_item(&mut self, source: SupplySource) -> DomainResult<()> {
        let current = self.supply_item(source)?.quantity;
        self.quantity_baselines.insert(source, current);
        Ok(())
    }

    /// Resolve a supply source into the flat view consumed by the linker.
    pub fn supply_item(&self, source: SupplySource) -> DomainResult<SupplyItem> {
        match source {
            SupplySource::SupplierItem(id) => {
                let item = self.supplier_order_item(id)?;
                let order = self.supplier_order(item.order())?;
                Ok(SupplyItem {
                    source,
                    subject: item.subject(),
                    quantity: item.quantity(),
                    net_price: item.net_price(),
                    estimated_date_of_arrival: order.estimated_date_of_arrival(),
                })
            }
            SupplySource::Production(id) => {
                let order = self.production_order(id)?;
                Ok(SupplyItem {
                    source,
                    subject: order.subject(),
                    quantity: order.quantity(),
                    net_price: order.net_price(),
                    estimated_date_of_arrival: order.estimated_date_of_arrival(),
                })
            }
            SupplySource::None => Err(DomainError::validation("supply source is required")),
        }
    }

    // -- stock units -------------------------------------------------------

    pub fn unit(&self, id: StockUnitId) -> DomainResult<&StockUnit> {
        self.units
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("stock unit {id}")))
    }

    pub(crate) fn unit_mut(&mut self, id: StockUnitId) -> DomainResult<&mut StockUnit> {
        self.units
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("stock unit {id}")))
    }

    /// Create a new, unlinked unit for a subject and remember it as fresh.
    pub fn create_unit_for(&mut self, subject: SubjectId) -> StockUnitId {
        let id = StockUnitId::new();
        self.units.insert(id, StockUnit::new(id, subject));
        self.fresh_units.entry(subject).or_default().push(id);
        id
    }

    /// A unit not yet tied to any supply source, reusable for linking.
    /// Fresh units (created this transaction) are preferred, newest first.
    pub fn find_linkable(
        &self,
        subject: SubjectId,
        exclude: Option<StockUnitId>,
    ) -> Option<StockUnitId> {
        let linkable = |unit: &StockUnit| {
            unit.state() == StockUnitState::New
                && unit.supply().is_none()
                && Some(unit.id()) != exclude
        };
        if let Some(ids) = self.fresh_units.get(&subject) {
            for id in ids.iter().rev() {
                if self.units.get(id).is_some_and(|unit| linkable(unit)) {
                    return Some(*id);
                }
            }
        }
        self.units
            .values()
            .find(|unit| unit.subject() == subject && linkable(*unit))
            .map(|unit| unit.id())
    }

    /// Evict a unit from the fresh lookup once persisted with a supply link.
    pub fn purge(&mut self, id: StockUnitId) {
        for ids in self.fresh_units.values_mut() {
            ids.retain(|candidate| *candidate != id);
        }
    }

    pub fn find_pending_or_ready(
        &self,
        subject: SubjectId,
        exclude: Option<StockUnitId>,
    ) -> Vec<StockUnitId> {
        self.units
            .values()
            .filter(|unit| {
                unit.subject() == subject
                    && Some(unit.id()) != exclude
                    && matches!(
                        unit.state(),
                        StockUnitState::Pending | StockUnitState::Ready
                    )
            })
            .map(|unit| unit.id())
            .collect()
    }

    pub fn find_not_closed(&self, subject: SubjectId) -> Vec<StockUnitId> {
        self.units
            .values()
            .filter(|unit| unit.subject() == subject && !unit.state().is_closed())
            .map(|unit| unit.id())
            .collect()
    }

    /// The unit currently backed by the given supply source.
    pub fn find_linked(&self, source: SupplySource) -> Option<StockUnitId> {
        if source.is_none() {
            return None;
        }
        self.units
            .values()
            .find(|unit| unit.supply() == source)
            .map(|unit| unit.id())
    }

    /// Re-resolve the unit's lifecycle state from its quantities.
    pub(crate) fn refresh_unit_state(&mut self, id: StockUnitId) -> DomainResult<()> {
        let record = self.unit_mut(id)?;
        let state = record.resolved_state();
        if state != record.state() {
            record.set_state(state);
        }
        Ok(())
    }

    pub fn persist_unit(&mut self, id: StockUnitId, schedule: EventSchedule) -> DomainResult<()> {
        self.unit_mut(id)?.bump_version();
        self.push_event(StockEvent::UnitChanged(id), schedule);
        Ok(())
    }

    pub fn remove_unit(&mut self, id: StockUnitId, schedule: EventSchedule) -> DomainResult<()> {
        self.unit(id)?;
        if !self.unit_assignments(id).is_empty() {
            return Err(DomainError::logic(format!(
                "stock unit {id} still has assignments"
            )));
        }
        self.units.remove(&id);
        self.purge(id);
        self.push_event(StockEvent::UnitRemoved(id), schedule);
        Ok(())
    }

    // -- assignments -------------------------------------------------------

    pub fn assignment(&self, id: StockAssignmentId) -> DomainResult<&StockAssignment> {
        self.assignments
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("stock assignment {id}")))
    }

    pub(crate) fn assignment_mut(
        &mut self,
        id: StockAssignmentId,
    ) -> DomainResult<&mut StockAssignment> {
        self.assignments
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("stock assignment {id}")))
    }

    /// Create an empty assignment reserving `unit` for `sale_item`.
    pub fn create_assignment_for(
        &mut self,
        sale_item: SaleItemId,
        unit: StockUnitId,
    ) -> DomainResult<StockAssignmentId> {
        self.sale_item(sale_item)?;
        self.unit(unit)?;
        let id = StockAssignmentId::new();
        self.assignments
            .insert(id, StockAssignment::new(id, sale_item, unit));
        Ok(id)
    }

    pub fn unit_assignments(&self, unit: StockUnitId) -> Vec<StockAssignmentId> {
        self.assignments
            .values()
            .filter(|assignment| assignment.unit() == Some(unit))
            .map(|assignment| assignment.id())
            .collect()
    }

    /// The merge lookup: the unit's existing assignment for a sale item.
    pub fn find_assignment(
        &self,
        sale_item: SaleItemId,
        unit: StockUnitId,
    ) -> Option<StockAssignmentId> {
        self.assignments
            .values()
            .find(|assignment| {
                assignment.sale_item() == sale_item && assignment.unit() == Some(unit)
            })
            .map(|assignment| assignment.id())
    }

    /// A unit's assignments sorted ascending by the owning sale's creation
    /// date; ties keep a stable order. Redistribution walks this in reverse
    /// so the oldest sale keeps its stock.
    pub fn assignments_by_sale_age(
        &self,
        unit: StockUnitId,
    ) -> DomainResult<Vec<StockAssignmentId>> {
        let mut dated: Vec<(DateTime<Utc>, StockAssignmentId)> = Vec::new();
        for assignment in self.assignments.values() {
            if assignment.unit() == Some(unit) {
                let item = self.sale_item(assignment.sale_item())?;
                let sale = self.sale(item.sale())?;
                dated.push((sale.created_at(), assignment.id()));
            }
        }
        dated.sort_by_key(|(created_at, _)| *created_at);
        Ok(dated.into_iter().map(|(_, id)| id).collect())
    }

    pub fn persist_assignment(
        &mut self,
        id: StockAssignmentId,
        schedule: EventSchedule,
    ) -> DomainResult<()> {
        self.assignment(id)?;
        self.push_event(StockEvent::AssignmentChanged(id), schedule);
        Ok(())
    }

    pub fn remove_assignment(
        &mut self,
        id: StockAssignmentId,
        schedule: EventSchedule,
    ) -> DomainResult<()> {
        let assignment = self.assignment_mut(id)?;
        assignment.set_unit(None);
        self.assignments.remove(&id);
        self.push_event(StockEvent::AssignmentRemoved(id), schedule);
        Ok(())
    }

    // -- events ------------------------------------------------------------

    fn push_event(&mut self, event: StockEvent, schedule: EventSchedule) {
        if schedule == EventSchedule::Suppressed {
            return;
        }
        if self.events.last() == Some(&event) {
            return;
        }
        self.events.push(event);
    }

    /// Drain the staged events; the host dispatches them at commit.
    pub fn take_events(&mut self) -> Vec<StockEvent> {
        std::mem::take(&mut self.events)
    }
}
