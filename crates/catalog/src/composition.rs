//! Bundle composition: slots of interchangeable components.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::subject::SubjectId;

/// A candidate component for a bundle slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentChoice {
    pub subject: SubjectId,
    /// Quantity of the component consumed per bundle.
    pub quantity: Decimal,
}

/// One slot of a compound subject, offering interchangeable choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSlot {
    choices: Vec<ComponentChoice>,
}

impl CompositionSlot {
    pub fn new(choices: Vec<ComponentChoice>) -> Self {
        Self { choices }
    }

    pub fn choices(&self) -> &[ComponentChoice] {
        &self.choices
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}
