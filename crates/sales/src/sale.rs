use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_catalog::SubjectId;
use merx_core::{Entity, entity_id};

entity_id!(
    /// Sale identifier.
    SaleId
);

entity_id!(
    /// Sale item identifier.
    SaleItemId
);

/// A customer sale.
///
/// The creation timestamp is load-bearing: stock redistribution walks
/// assignments by the owning sale's age, so older sales keep their stock
/// when capacity shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,
    number: String,
    created_at: DateTime<Utc>,
}

impl Sale {
    pub fn new(id: SaleId, number: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            number: number.into(),
            created_at,
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> SaleId {
        self.id
    }
}

/// One line of a sale: a committed quantity of a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    id: SaleItemId,
    sale: SaleId,
    subject: SubjectId,
    quantity: Decimal,
}

impl SaleItem {
    pub fn new(id: SaleItemId, sale: SaleId, subject: SubjectId, quantity: Decimal) -> Self {
        Self {
            id,
            sale,
            subject,
            quantity,
        }
    }

    pub fn sale(&self) -> SaleId {
        self.sale
    }

    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    /// Quantity committed to the customer.
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
    }
}

impl Entity for SaleItem {
    type Id = SaleItemId;

    fn id(&self) -> SaleItemId {
        self.id
    }
}
