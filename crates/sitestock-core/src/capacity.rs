use crate::normalize::normalize_quantity;
use ahash::AHashMap;
use sitestock_types::PurchaseRecord;

/// Remaining allocatable quantity per purchase.
///
/// Initialised from the normalized purchase quantities and only ever
/// decremented. Entries never drop below zero.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger<'a> {
    remaining: AHashMap<&'a str, f64>,
}

impl CapacityLedger<'_> {
    /// Whether some purchase row declared this id.
    pub fn contains(&self, purchase_id: &str) -> bool {
        self.remaining.contains_key(purchase_id)
    }

    /// Remaining capacity, `0.0` for unknown ids.
    pub fn remaining(&self, purchase_id: &str) -> f64 {
        self.remaining.get(purchase_id).copied().unwrap_or(0.0)
    }

    /// Decreases the remaining capacity by `amount`, flooring at zero.
    pub fn consume(&mut self, purchase_id: &str, amount: f64) {
        if let Some(remaining) = self.remaining.get_mut(purchase_id) {
            *remaining = (*remaining - amount).max(0.0);
        }
    }

    /// Number of distinct purchase ids.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Whether no purchases were indexed.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Purchase ids per material, in purchase input order.
#[derive(Debug, Clone, Default)]
pub struct MaterialQueues<'a> {
    by_material: AHashMap<&'a str, Vec<&'a str>>,
}

impl<'a> MaterialQueues<'a> {
    /// The FIFO queue for a material; empty when the material has no purchases.
    pub fn get(&self, material_id: &str) -> &[&'a str] {
        self.by_material.get(material_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of materials with at least one queued purchase.
    pub fn len(&self) -> usize {
        self.by_material.len()
    }

    /// Whether no purchase declared a material.
    pub fn is_empty(&self) -> bool {
        self.by_material.is_empty()
    }
}

/// Both indexes built from one pass over the purchase rows.
///
/// Duplicate purchase ids are not merged: the last row's quantity wins in the
/// ledger, and the id is queued once per row that names a material.
#[derive(Debug, Clone, Default)]
pub struct CapacityIndex<'a> {
    /// Remaining capacity per purchase
    pub ledger: CapacityLedger<'a>,
    /// FIFO purchase queues per material
    pub queues: MaterialQueues<'a>,
}

impl<'a> CapacityIndex<'a> {
    /// Indexes `purchases`, which are assumed to be ordered oldest first.
    pub fn build(purchases: &'a [PurchaseRecord]) -> Self {
        let mut index = Self {
            ledger: CapacityLedger { remaining: AHashMap::with_capacity(purchases.len()) },
            queues: MaterialQueues::default(),
        };

        for purchase in purchases {
            let capacity = normalize_quantity(&purchase.quantity);
            index.ledger.remaining.insert(purchase.id.as_str(), capacity);

            if let Some(material_id) = purchase.material_id.as_deref() {
                index
                    .queues
                    .by_material
                    .entry(material_id)
                    .or_default()
                    .push(purchase.id.as_str());
            }
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_capacity_and_queues_in_input_order() {
        let purchases = vec![
            PurchaseRecord::new("A", Some("M1"), 5),
            PurchaseRecord::new("B", Some("M2"), "3"),
            PurchaseRecord::new("C", Some("M1"), 2.5),
        ];
        let index = CapacityIndex::build(&purchases);

        assert_eq!(index.ledger.len(), 3);
        assert_eq!(index.ledger.remaining("A"), 5.0);
        assert_eq!(index.ledger.remaining("B"), 3.0);
        assert_eq!(index.queues.get("M1"), &["A", "C"]);
        assert_eq!(index.queues.get("M2"), &["B"]);
        assert!(index.queues.get("M3").is_empty());
    }

    #[test]
    fn purchases_without_material_are_not_queued() {
        let purchases = vec![PurchaseRecord::new("legacy", None, 10)];
        let index = CapacityIndex::build(&purchases);

        assert!(index.ledger.contains("legacy"));
        assert!(index.queues.is_empty());
    }

    #[test]
    fn invalid_quantities_index_as_zero_capacity() {
        let purchases = vec![
            PurchaseRecord::new("neg", Some("M1"), -3),
            PurchaseRecord::new("text", Some("M1"), "n/a"),
        ];
        let index = CapacityIndex::build(&purchases);

        assert!(index.ledger.contains("neg"));
        assert_eq!(index.ledger.remaining("neg"), 0.0);
        assert_eq!(index.ledger.remaining("text"), 0.0);
    }

    #[test]
    fn duplicate_ids_keep_last_quantity() {
        let purchases = vec![
            PurchaseRecord::new("A", Some("M1"), 5),
            PurchaseRecord::new("A", Some("M1"), 9),
        ];
        let index = CapacityIndex::build(&purchases);

        assert_eq!(index.ledger.len(), 1);
        assert_eq!(index.ledger.remaining("A"), 9.0);
        assert_eq!(index.queues.get("M1"), &["A", "A"]);
    }

    #[test]
    fn consume_floors_at_zero() {
        let purchases = vec![PurchaseRecord::new("A", None, 4)];
        let mut index = CapacityIndex::build(&purchases);

        index.ledger.consume("A", 3.0);
        assert_eq!(index.ledger.remaining("A"), 1.0);
        index.ledger.consume("A", 10.0);
        assert_eq!(index.ledger.remaining("A"), 0.0);
        index.ledger.consume("missing", 1.0);
        assert!(!index.ledger.contains("missing"));
    }
}
