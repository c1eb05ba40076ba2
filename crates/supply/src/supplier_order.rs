use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_catalog::SubjectId;
use merx_core::{Entity, entity_id};

entity_id!(
    /// Supplier order identifier.
    SupplierOrderId
);

entity_id!(
    /// Supplier order item identifier.
    SupplierOrderItemId
);

/// An order placed with a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrder {
    id: SupplierOrderId,
    number: String,
    estimated_date_of_arrival: Option<DateTime<Utc>>,
    /// Order-level shipping cost, allocated across items by the price
    /// calculator.
    shipping_cost: Decimal,
}

impl SupplierOrder {
    pub fn new(id: SupplierOrderId, number: impl Into<String>) -> Self {
        Self {
            id,
            number: number.into(),
            estimated_date_of_arrival: None,
            shipping_cost: Decimal::ZERO,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn estimated_date_of_arrival(&self) -> Option<DateTime<Utc>> {
        self.estimated_date_of_arrival
    }

    pub fn set_estimated_date_of_arrival(&mut self, eta: Option<DateTime<Utc>>) {
        self.estimated_date_of_arrival = eta;
    }

    pub fn shipping_cost(&self) -> Decimal {
        self.shipping_cost
    }

    pub fn set_shipping_cost(&mut self, cost: Decimal) {
        self.shipping_cost = cost;
    }
}

impl Entity for SupplierOrder {
    type Id = SupplierOrderId;

    fn id(&self) -> SupplierOrderId {
        self.id
    }
}

/// One line of a supplier order: a promised quantity of a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrderItem {
    id: SupplierOrderItemId,
    order: SupplierOrderId,
    subject: SubjectId,
    quantity: Decimal,
    /// Net purchase price per unit.
    net_price: Decimal,
    /// Unit weight, used for shipping cost allocation.
    weight: Decimal,
}

impl SupplierOrderItem {
    pub fn new(
        id: SupplierOrderItemId,
        order: SupplierOrderId,
        subject: SubjectId,
        quantity: Decimal,
        net_price: Decimal,
    ) -> Self {
        Self {
            id,
            order,
            subject,
            quantity,
            net_price,
            weight: Decimal::ZERO,
        }
    }

    pub fn order(&self) -> SupplierOrderId {
        self.order
    }

    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
    }

    pub fn net_price(&self) -> Decimal {
        self.net_price
    }

    pub fn set_net_price(&mut self, price: Decimal) {
        self.net_price = price;
    }

    pub fn weight(&self) -> Decimal {
        self.weight
    }

    pub fn set_weight(&mut self, weight: Decimal) {
        self.weight = weight;
    }
}

impl Entity for SupplierOrderItem {
    type Id = SupplierOrderItemId;

    fn id(&self) -> SupplierOrderItemId {
        self.id
    }
}
