use crate::model::{Comparison, PriceEntry, PriceError};
use crate::normalizer::label_of;
use crate::utils::{format_amount, title_case};
use std::collections::HashSet;

/// Read-only price table. Built once, never mutated.
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    entries: Vec<PriceEntry>,
}

impl PriceCatalog {
    pub fn new(entries: Vec<PriceEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct labels containing `query`, compared case-insensitively as a
    /// literal substring. An empty query matches every label.
    ///
    /// Labels come back in the order they first appear in the table.
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.to_uppercase();
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for entry in &self.entries {
            let label = label_of(entry);
            if label.to_uppercase().contains(&needle) && seen.insert(label.clone()) {
                matches.push(label);
            }
        }

        matches
    }

    pub fn find(&self, label: &str) -> Option<&PriceEntry> {
        self.entries.iter().find(|e| label_of(e) == label)
    }

    /// Price per unit of mass for an exact label.
    pub fn unit_price(&self, label: &str) -> Result<f64, PriceError> {
        let entry = self.find(label).ok_or(PriceError::NotFound)?;
        let (Some(mass), Some(average_price)) = (entry.mass, entry.average_price) else {
            return Err(PriceError::Compute);
        };
        if mass == 0.0 {
            return Err(PriceError::Compute);
        }

        let price = average_price / mass;
        if price.is_finite() {
            Ok(price)
        } else {
            Err(PriceError::Compute)
        }
    }

    pub fn price_of(&self, label: &str) -> Result<String, PriceError> {
        self.unit_price(label).map(format_amount)
    }

    /// Both labels must exist, else `NotFound`. Zero prices or an
    /// overflowing ratio give `Compute`.
    pub fn compare(&self, label1: &str, label2: &str) -> Result<Comparison, PriceError> {
        if self.find(label1).is_none() || self.find(label2).is_none() {
            return Err(PriceError::NotFound);
        }

        let price1 = self.unit_price(label1)?;
        let price2 = self.unit_price(label2)?;
        if price1 == 0.0 || price2 == 0.0 {
            return Err(PriceError::Compute);
        }

        let ratio1 = price1 / price2;
        let ratio2 = price2 / price1;
        if !ratio1.is_finite() || !ratio2.is_finite() {
            return Err(PriceError::Compute);
        }

        Ok(Comparison {
            label1: title_case(label1),
            ratio1: format_amount(ratio1),
            label2: title_case(label2),
            ratio2: format_amount(ratio2),
            price1: format_amount(price1),
            price2: format_amount(price2),
        })
    }
}
