#![deny(warnings)]
//! Purchase usage allocation for the SiteStock reporting pipeline.
//!
//! Given the purchases of a tenant (oldest first) and the usage rows recorded
//! against them, this crate reconstructs how much of each purchase has been
//! consumed. Usage linked to a known purchase is attributed to it in full.
//! Usage carrying only a material reference is spread over that material's
//! purchases in FIFO order, never beyond their remaining capacity.
//!
//! Everything here is a pure, synchronous computation over borrowed rows. No
//! state survives between calls.

use sitestock_types::{PurchaseRecord, UsageRecord};

/// Usage attribution over the capacity ledger
pub mod allocation;
/// Capacity ledger and per-material FIFO queues
pub mod capacity;
/// Coercion of loosely-typed quantities
pub mod normalize;
/// Consumed-versus-purchased reporting
pub mod report;

pub use allocation::{AllocationOutcome, AllocationStats, PurchaseUsageAllocator, PurchaseUsageMap};
pub use capacity::{CapacityIndex, CapacityLedger, MaterialQueues};
pub use normalize::normalize_quantity;
pub use report::{ConsumptionLine, ConsumptionReport, MaterialTotals};

pub use sitestock_types::{AllocationRequest, Quantity};

/// Builds the purchase id to consumed quantity map for one set of rows.
///
/// `purchases` must be ordered oldest first. A missing usage collection should
/// be passed as an empty slice.
pub fn build_purchase_usage_map(
    purchases: &[PurchaseRecord],
    usage: &[UsageRecord],
) -> PurchaseUsageMap {
    PurchaseUsageAllocator::new().allocate(purchases, usage)
}
