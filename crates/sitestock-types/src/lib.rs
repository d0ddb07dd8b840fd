//! SiteStock Types
//!
//! This crate defines the row types shared by the SiteStock crates: purchase
//! rows, usage rows and the loosely-typed `Quantity` they both carry. Rows come
//! from a loosely-typed store, so every field other than the purchase id is
//! optional and quantities may arrive as numbers, strings or nulls.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_docs)]

mod quantity;
mod records;

pub use quantity::Quantity;
pub use records::{AllocationRequest, PurchaseRecord, UsageRecord, records_from_json};
