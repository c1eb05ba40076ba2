use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use merx_core::{Entity, entity_id};

use crate::composition::CompositionSlot;

entity_id!(
    /// Sellable subject identifier.
    SubjectId
);

/// How a subject's stock is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSubjectMode {
    /// Quantities maintained by hand; supplier quotes are never consulted.
    Manual,
    /// Stock tracked from supply orders, supplier quotes as fallback.
    Auto,
    /// Sourced on demand; never reported out of stock.
    JustInTime,
}

impl StockSubjectMode {
    /// Ranking used when choosing between interchangeable bundle components.
    pub fn rank(self) -> u8 {
        match self {
            StockSubjectMode::Manual => 0,
            StockSubjectMode::JustInTime => 1,
            StockSubjectMode::Auto => 2,
        }
    }

    pub fn is_manual(self) -> bool {
        matches!(self, StockSubjectMode::Manual)
    }
}

/// Subject-level derived stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockState {
    OutOfStock,
    PreOrder,
    InStock,
}

impl StockState {
    pub fn rank(self) -> u8 {
        match self {
            StockState::OutOfStock => 0,
            StockState::PreOrder => 1,
            StockState::InStock => 2,
        }
    }
}

/// Aggregated stock view of a sellable subject.
///
/// The quantity rollups and the state are derived values, written by the
/// stock subject updater; everything else is master data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSubject {
    id: SubjectId,
    designation: String,
    mode: StockSubjectMode,
    state: StockState,
    in_stock: Decimal,
    available_stock: Decimal,
    virtual_stock: Decimal,
    estimated_date_of_arrival: Option<DateTime<Utc>>,
    composition: Vec<CompositionSlot>,
}

impl StockSubject {
    pub fn new(id: SubjectId, designation: impl Into<String>, mode: StockSubjectMode) -> Self {
        Self {
            id,
            designation: designation.into(),
            mode,
            state: StockState::OutOfStock,
            in_stock: Decimal::ZERO,
            available_stock: Decimal::ZERO,
            virtual_stock: Decimal::ZERO,
            estimated_date_of_arrival: None,
            composition: Vec::new(),
        }
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    pub fn mode(&self) -> StockSubjectMode {
        self.mode
    }

    pub fn state(&self) -> StockState {
        self.state
    }

    pub fn set_state(&mut self, state: StockState) {
        self.state = state;
    }

    pub fn in_stock(&self) -> Decimal {
        self.in_stock
    }

    pub fn set_in_stock(&mut self, quantity: Decimal) {
        self.in_stock = quantity;
    }

    pub fn available_stock(&self) -> Decimal {
        self.available_stock
    }

    pub fn set_available_stock(&mut self, quantity: Decimal) {
        self.available_stock = quantity;
    }

    /// Ordered minus sold across the subject's units; may be negative.
    pub fn virtual_stock(&self) -> Decimal {
        self.virtual_stock
    }

    pub fn set_virtual_stock(&mut self, quantity: Decimal) {
        self.virtual_stock = quantity;
    }

    pub fn estimated_date_of_arrival(&self) -> Option<DateTime<Utc>> {
        self.estimated_date_of_arrival
    }

    pub fn set_estimated_date_of_arrival(&mut self, eta: Option<DateTime<Utc>>) {
        self.estimated_date_of_arrival = eta;
    }

    /// Bundle composition; empty for simple subjects.
    pub fn composition(&self) -> &[CompositionSlot] {
        &self.composition
    }

    pub fn set_composition(&mut self, composition: Vec<CompositionSlot>) {
        self.composition = composition;
    }

    pub fn is_compound(&self) -> bool {
        !self.composition.is_empty()
    }
}

impl Entity for StockSubject {
    type Id = SubjectId;

    fn id(&self) -> SubjectId {
        self.id
    }
}
