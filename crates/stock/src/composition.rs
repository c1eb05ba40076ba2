//! Bundle component selection.

use std::cmp::Ordering;

use merx_catalog::{ComponentChoice, StockSubject, SubjectId};
use merx_core::DomainResult;

use crate::store::StockStore;

/// Picks the best-ranked component per bundle slot.
///
/// Candidates are ranked by stock mode, then stock state, then available
/// stock; among candidates without available stock, an earlier ETA wins,
/// and an ETA-less candidate beats an ETA-carrying one only with strictly
/// more virtual stock.
#[derive(Debug, Default)]
pub struct StockCompositionSorter;

impl StockCompositionSorter {
    pub fn new() -> Self {
        Self
    }

    /// Ranks `a` against `b`; `Less` means `a` is the better candidate.
    pub fn compare(a: &StockSubject, b: &StockSubject) -> Ordering {
        b.mode()
            .rank()
            .cmp(&a.mode().rank())
            .then(b.state().rank().cmp(&a.state().rank()))
            .then(b.available_stock().cmp(&a.available_stock()))
            .then_with(|| {
                match (a.estimated_date_of_arrival(), b.estimated_date_of_arrival()) {
                    (Some(a_eta), Some(b_eta)) => a_eta
                        .cmp(&b_eta)
                        .then(b.virtual_stock().cmp(&a.virtual_stock())),
                    (None, None) => b.virtual_stock().cmp(&a.virtual_stock()),
                    (None, Some(_)) => {
                        if a.virtual_stock() > b.virtual_stock() {
                            Ordering::Less
                        } else {
                            Ordering::Greater
                        }
                    }
                    (Some(_), None) => {
                        if b.virtual_stock() > a.virtual_stock() {
                            Ordering::Greater
                        } else {
                            Ordering::Less
                        }
                    }
                }
            })
    }

    /// Choose the best component for every slot of a compound subject,
    /// returned best-first.
    pub fn select(
        &self,
        store: &StockStore,
        subject: SubjectId,
    ) -> DomainResult<Vec<ComponentChoice>> {
        let record = store.subject(subject)?;
        let mut chosen: Vec<ComponentChoice> = Vec::new();
        for slot in record.composition() {
            let mut best: Option<(&StockSubject, ComponentChoice)> = None;
            for choice in slot.choices() {
                let candidate = store.subject(choice.subject)?;
                let better = match best {
                    None => true,
                    Some((current, _)) => Self::compare(candidate, current) == Ordering::Less,
                };
                if better {
                    best = Some((candidate, *choice));
                }
            }
            if let Some((_, choice)) = best {
                chosen.push(choice);
            }
        }
        chosen.sort_by(|x, y| {
            match (store.subject(x.subject), store.subject(y.subject)) {
                (Ok(a), Ok(b)) => Self::compare(a, b),
                _ => Ordering::Equal,
            }
        });
        Ok(chosen)
    }
}
