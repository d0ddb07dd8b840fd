//! Consumed-versus-purchased view over an allocation result.
//!
//! Over-consumption (a purchase whose allocated total exceeds its purchased
//! quantity) can only come from direct references. It is reported as-is,
//! never clamped, so data-quality problems stay visible.

use crate::allocation::PurchaseUsageMap;
use crate::normalize::normalize_quantity;
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use sitestock_types::PurchaseRecord;
use std::collections::BTreeMap;
use tracing::debug;

/// One purchase row with its consumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionLine {
    pub purchase_id: String,
    pub material_id: Option<String>,
    /// Normalized purchased quantity
    pub purchased: f64,
    /// Allocated total
    pub consumed: f64,
    /// Capacity left for the id after allocation, floored at zero
    pub remaining: f64,
    /// Allocated total exceeds the id's capacity
    pub over_consumed: bool,
}

/// Purchased and consumed totals for one material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MaterialTotals {
    pub purchased: f64,
    pub consumed: f64,
}

/// Per-purchase and per-material consumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsumptionReport {
    /// One line per purchase row, in input order
    pub lines: Vec<ConsumptionLine>,
    /// Totals keyed by material id, for purchases that name one
    pub materials: BTreeMap<String, MaterialTotals>,
}

impl ConsumptionReport {
    /// Joins purchase rows with their allocated totals.
    ///
    /// A purchase id repeated across rows contributes its consumption to the
    /// material totals once. Its capacity is the last row's quantity, the same
    /// value the allocator's ledger starts from, and every line for the id is
    /// measured against it.
    pub fn build(purchases: &[PurchaseRecord], usage: &PurchaseUsageMap) -> Self {
        let mut report = Self { lines: Vec::with_capacity(purchases.len()), ..Self::default() };
        let mut counted: AHashSet<&str> = AHashSet::with_capacity(purchases.len());
        let capacity: AHashMap<&str, f64> = purchases
            .iter()
            .map(|p| (p.id.as_str(), normalize_quantity(&p.quantity)))
            .collect();

        for purchase in purchases {
            let purchased = normalize_quantity(&purchase.quantity);
            let available = capacity.get(purchase.id.as_str()).copied().unwrap_or(purchased);
            let consumed = usage.consumed(&purchase.id);
            let over_consumed = consumed > available;

            if over_consumed {
                debug!(purchase_id = %purchase.id, available, consumed, "Purchase over-consumed");
            }

            if let Some(material_id) = purchase.material_id.as_deref() {
                let totals = report.materials.entry(material_id.to_string()).or_default();
                totals.purchased += purchased;
                if counted.insert(purchase.id.as_str()) {
                    totals.consumed += consumed;
                }
            }

            report.lines.push(ConsumptionLine {
                purchase_id: purchase.id.clone(),
                material_id: purchase.material_id.clone(),
                purchased,
                consumed,
                remaining: (available - consumed).max(0.0),
                over_consumed,
            });
        }

        report
    }

    /// Ids of over-consumed purchases, in input order.
    pub fn over_consumed(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter(|line| line.over_consumed).map(|line| line.purchase_id.as_str())
    }

    pub fn has_over_consumption(&self) -> bool {
        self.lines.iter().any(|line| line.over_consumed)
    }

    pub fn line(&self, purchase_id: &str) -> Option<&ConsumptionLine> {
        self.lines.iter().find(|line| line.purchase_id == purchase_id)
    }
}
