use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_catalog::SubjectId;

/// A supplier's quote for a subject: stock they report as available and
/// when more is expected. Consulted by the subject updater when no internal
/// supply answers for availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierProduct {
    subject: SubjectId,
    available_stock: Decimal,
    estimated_date_of_arrival: Option<DateTime<Utc>>,
}

impl SupplierProduct {
    pub fn new(
        subject: SubjectId,
        available_stock: Decimal,
        estimated_date_of_arrival: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            subject,
            available_stock,
            estimated_date_of_arrival,
        }
    }

    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    pub fn available_stock(&self) -> Decimal {
        self.available_stock
    }

    pub fn estimated_date_of_arrival(&self) -> Option<DateTime<Utc>> {
        self.estimated_date_of_arrival
    }
}
