use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_catalog::SubjectId;
use merx_core::{Entity, entity_id};

entity_id!(
    /// Production order identifier.
    ProductionOrderId
);

/// An internal manufacturing order producing stock of one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionOrder {
    id: ProductionOrderId,
    subject: SubjectId,
    quantity: Decimal,
    /// Net production cost per unit.
    net_price: Decimal,
    estimated_date_of_arrival: Option<DateTime<Utc>>,
}

impl ProductionOrder {
    pub fn new(
        id: ProductionOrderId,
        subject: SubjectId,
        quantity: Decimal,
        net_price: Decimal,
    ) -> Self {
        Self {
            id,
            subject,
            quantity,
            net_price,
            estimated_date_of_arrival: None,
        }
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

    pub fn estimated_date_of_arrival(&self) -> Option<DateTime<Utc>> {
        self.estimated_date_of_arrival
    }

    pub fn set_estimated_date_of_arrival(&mut self, eta: Option<DateTime<Utc>>) {
        self.estimated_date_of_arrival = eta;
    }
}

impl Entity for ProductionOrder {
    type Id = ProductionOrderId;

    fn id(&self) -> ProductionOrderId {
        self.id
    }
}
