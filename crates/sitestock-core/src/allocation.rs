//! Attribution of usage rows to purchases.
//!
//! Each usage row is handled in input order:
//!
//! 1. Its quantity is normalized; rows that normalize to zero are skipped.
//! 2. If it names a purchase the capacity index knows about, the whole quantity
//!    goes to that purchase, even past its remaining capacity.
//! 3. Otherwise its material's purchases are drained oldest first, each up to
//!    its remaining capacity. Whatever is left once the queue runs out is
//!    dropped, as are rows with no material or a material with no purchases.

use crate::capacity::{CapacityIndex, CapacityLedger};
use crate::normalize::normalize_quantity;
use serde::{Deserialize, Serialize};
use sitestock_types::{PurchaseRecord, UsageRecord};
use std::collections::BTreeMap;
use tracing::{debug, instrument, trace};

/// Total allocated quantity per purchase id.
///
/// Only purchases that received a nonzero allocation have an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseUsageMap {
    totals: BTreeMap<String, f64>,
}

impl PurchaseUsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated total for a purchase, if it received any.
    pub fn get(&self, purchase_id: &str) -> Option<f64> {
        self.totals.get(purchase_id).copied()
    }

    /// Allocated total for a purchase, `0.0` when it received none.
    pub fn consumed(&self, purchase_id: &str) -> f64 {
        self.get(purchase_id).unwrap_or(0.0)
    }

    pub fn contains(&self, purchase_id: &str) -> bool {
        self.totals.contains_key(purchase_id)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Entries ordered by purchase id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(id, total)| (id.as_str(), *total))
    }

    /// Sum of all allocated quantities.
    pub fn total(&self) -> f64 {
        self.totals.values().fold(0.0, |acc, total| acc + total)
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.totals
    }

    fn add(&mut self, purchase_id: &str, amount: f64) {
        *self.totals.entry(purchase_id.to_string()).or_insert(0.0) += amount;
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PurchaseUsageMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self { totals: iter.into_iter().map(|(id, total)| (id.into(), total)).collect() }
    }
}

/// Counters describing what happened to each usage row during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStats {
    /// Usage rows seen
    pub events_seen: usize,
    /// Rows whose quantity normalized to zero
    pub events_skipped: usize,
    /// Rows attributed through their purchase reference
    pub direct_events: usize,
    /// Rows spread over a material's FIFO queue
    pub fallback_events: usize,
    /// Rows with no usable purchase, material or queue
    pub dropped_events: usize,
    /// Direct rows that asked for more than the purchase had left
    pub over_allocations: usize,
    /// Quantity never attributed to any purchase
    pub dropped_quantity: f64,
}

/// Result of `PurchaseUsageAllocator::allocate_with_stats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationOutcome {
    pub usage: PurchaseUsageMap,
    pub stats: AllocationStats,
}

/// Reconstructs per-purchase consumption from usage rows.
///
/// Stateless: each call builds its own ledger and queues from the rows it is
/// given and drops them on return.
#[derive(Debug, Default, Clone, Copy)]
pub struct PurchaseUsageAllocator;

impl PurchaseUsageAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Allocates `usage` against `purchases` (oldest first).
    pub fn allocate(
        &self,
        purchases: &[PurchaseRecord],
        usage: &[UsageRecord],
    ) -> PurchaseUsageMap {
        self.allocate_with_stats(purchases, usage).usage
    }

    /// Same allocation as `allocate`, with counters for each path taken.
    #[instrument(skip_all, fields(purchases = purchases.len(), usage_events = usage.len()))]
    pub fn allocate_with_stats(
        &self,
        purchases: &[PurchaseRecord],
        usage: &[UsageRecord],
    ) -> AllocationOutcome {
        let CapacityIndex { mut ledger, queues } = CapacityIndex::build(purchases);
        let mut result = PurchaseUsageMap::new();
        let mut stats = AllocationStats { events_seen: usage.len(), ..AllocationStats::default() };

        for (position, event) in usage.iter().enumerate() {
            let quantity = normalize_quantity(&event.quantity);
            if quantity == 0.0 {
                stats.events_skipped += 1;
                continue;
            }

            if let Some(purchase_id) =
                event.purchase_id.as_deref().filter(|id| ledger.contains(id))
            {
                if quantity > ledger.remaining(purchase_id) {
                    stats.over_allocations += 1;
                }
                allocate(&mut ledger, &mut result, purchase_id, quantity);
                stats.direct_events += 1;
                trace!(position, purchase_id, quantity, "direct allocation");
                continue;
            }

            let queue = event.material_id.as_deref().map(|m| queues.get(m)).unwrap_or_default();
            if queue.is_empty() {
                stats.dropped_events += 1;
                stats.dropped_quantity += quantity;
                trace!(position, quantity, "usage has no purchase or material queue, dropped");
                continue;
            }

            stats.fallback_events += 1;
            let mut outstanding = quantity;
            for &purchase_id in queue {
                if outstanding <= 0.0 {
                    break;
                }
                let available = ledger.remaining(purchase_id);
                if available <= 0.0 {
                    continue;
                }
                let take = available.min(outstanding);
                allocate(&mut ledger, &mut result, purchase_id, take);
                outstanding -= take;
                trace!(position, purchase_id, take, "fifo allocation");
            }

            if outstanding > 0.0 {
                stats.dropped_quantity += outstanding;
                trace!(position, outstanding, "material queue exhausted, remainder dropped");
            }
        }

        debug!(
            allocated_purchases = result.len(),
            direct = stats.direct_events,
            fallback = stats.fallback_events,
            skipped = stats.events_skipped,
            dropped = stats.dropped_events,
            dropped_quantity = stats.dropped_quantity,
            "Usage allocation complete"
        );

        AllocationOutcome { usage: result, stats }
    }
}

fn allocate(
    ledger: &mut CapacityLedger<'_>,
    usage: &mut PurchaseUsageMap,
    purchase_id: &str,
    amount: f64,
) {
    usage.add(purchase_id, amount);
    ledger.consume(purchase_id, amount);
}
