use serde_json::json;
use sitestock_core::{
    AllocationRequest, PurchaseUsageAllocator, PurchaseUsageMap, Quantity,
    build_purchase_usage_map,
};
use sitestock_types::{PurchaseRecord, UsageRecord};

fn expected(entries: &[(&str, f64)]) -> PurchaseUsageMap {
    entries.iter().map(|&(id, total)| (id, total)).collect()
}

fn two_purchases() -> Vec<PurchaseRecord> {
    vec![PurchaseRecord::new("A", Some("M1"), 5), PurchaseRecord::new("B", Some("M1"), 5)]
}

#[test]
fn direct_reference_receives_full_quantity() {
    let purchases = vec![PurchaseRecord::new("A", Some("M1"), 5)];
    let usage = vec![UsageRecord::for_purchase("A", 12)];

    assert_eq!(build_purchase_usage_map(&purchases, &usage), expected(&[("A", 12.0)]));
}

#[test]
fn direct_reference_ignores_material_queue() {
    let usage = vec![UsageRecord::new(Some("B"), Some("M1"), 3)];

    assert_eq!(build_purchase_usage_map(&two_purchases(), &usage), expected(&[("B", 3.0)]));
}

#[test]
fn fifo_fills_oldest_purchase_first() {
    let usage = vec![UsageRecord::for_material("M1", 7)];

    assert_eq!(
        build_purchase_usage_map(&two_purchases(), &usage),
        expected(&[("A", 5.0), ("B", 2.0)])
    );
}

#[test]
fn fifo_drops_quantity_beyond_capacity() {
    let purchases = vec![PurchaseRecord::new("A", Some("M1"), 5)];
    let usage = vec![UsageRecord::for_material("M1", 10)];

    assert_eq!(build_purchase_usage_map(&purchases, &usage), expected(&[("A", 5.0)]));
}

#[test]
fn invalid_usage_quantities_contribute_nothing() {
    let purchases = vec![PurchaseRecord::new("A", Some("M1"), 5)];
    let usage = vec![
        UsageRecord::for_material("M1", -3),
        UsageRecord::for_material("M1", "abc"),
        UsageRecord::for_material("M1", Quantity::Null),
        UsageRecord::for_purchase("A", -3),
        UsageRecord::for_purchase("A", ""),
    ];

    assert!(build_purchase_usage_map(&purchases, &usage).is_empty());
}

#[test]
fn missing_quantity_field_contributes_nothing() {
    let usage: Vec<UsageRecord> =
        serde_json::from_value(json!([{"purchaseId": "A", "materialId": "M1"}])).unwrap();
    let purchases = vec![PurchaseRecord::new("A", Some("M1"), 5)];

    assert!(build_purchase_usage_map(&purchases, &usage).is_empty());
}

#[test]
fn negative_purchase_quantity_has_no_fifo_capacity() {
    let purchases =
        vec![PurchaseRecord::new("A", Some("M1"), -3), PurchaseRecord::new("B", Some("M1"), 4)];
    let usage = vec![UsageRecord::for_material("M1", 2)];

    assert_eq!(build_purchase_usage_map(&purchases, &usage), expected(&[("B", 2.0)]));
}

#[test]
fn unlinked_usage_is_a_no_op() {
    let usage = vec![UsageRecord::new(None, None, 4), UsageRecord::for_material("M404", 4)];

    assert!(build_purchase_usage_map(&two_purchases(), &usage).is_empty());
}

#[test]
fn unknown_purchase_reference_falls_back_to_material() {
    let usage = vec![UsageRecord::new(Some("ghost"), Some("M1"), 6)];

    assert_eq!(
        build_purchase_usage_map(&two_purchases(), &usage),
        expected(&[("A", 5.0), ("B", 1.0)])
    );
}

#[test]
fn unknown_purchase_reference_without_material_is_dropped() {
    let usage = vec![UsageRecord::for_purchase("ghost", 6)];

    assert!(build_purchase_usage_map(&two_purchases(), &usage).is_empty());
}

#[test]
fn purchase_without_material_only_takes_direct_usage() {
    let purchases = vec![PurchaseRecord::new("legacy", None, 10)];
    let usage = vec![UsageRecord::for_material("M1", 3), UsageRecord::for_purchase("legacy", 2)];

    assert_eq!(build_purchase_usage_map(&purchases, &usage), expected(&[("legacy", 2.0)]));
}

#[test]
fn repeated_calls_produce_equal_results() {
    let usage = vec![UsageRecord::for_material("M1", 7), UsageRecord::for_purchase("B", 1)];
    let allocator = PurchaseUsageAllocator::new();

    let first = allocator.allocate(&two_purchases(), &usage);
    let second = allocator.allocate(&two_purchases(), &usage);
    assert_eq!(first, second);
}

#[test]
fn direct_then_fallback_scenario() {
    let purchases = vec![
        PurchaseRecord::new("P1", Some("M1"), 10),
        PurchaseRecord::new("P2", Some("M1"), 5),
    ];
    let usage = vec![UsageRecord::new(Some("P1"), None, 4), UsageRecord::new(None, Some("M1"), 8)];

    assert_eq!(
        build_purchase_usage_map(&purchases, &usage),
        expected(&[("P1", 10.0), ("P2", 2.0)])
    );
}

#[test]
fn direct_overdraw_leaves_no_fifo_capacity() {
    let usage = vec![UsageRecord::for_purchase("A", 9), UsageRecord::for_material("M1", 3)];

    // A is floored at zero after the overdraw, so FIFO moves straight to B.
    assert_eq!(
        build_purchase_usage_map(&two_purchases(), &usage),
        expected(&[("A", 9.0), ("B", 3.0)])
    );
}

#[test]
fn duplicate_purchase_id_uses_last_quantity() {
    let purchases =
        vec![PurchaseRecord::new("A", Some("M1"), 2), PurchaseRecord::new("A", Some("M1"), 6)];
    let usage = vec![UsageRecord::for_material("M1", 10)];

    assert_eq!(build_purchase_usage_map(&purchases, &usage), expected(&[("A", 6.0)]));
}

#[test]
fn reversed_purchase_order_changes_fifo_target_deterministically() {
    let mut purchases = vec![
        PurchaseRecord::new("old", Some("M1"), 4),
        PurchaseRecord::new("new", Some("M1"), 4),
    ];
    let usage = vec![UsageRecord::for_material("M1", 5)];

    let in_order = build_purchase_usage_map(&purchases, &usage);
    purchases.reverse();
    let reversed = build_purchase_usage_map(&purchases, &usage);

    assert_eq!(in_order, expected(&[("old", 4.0), ("new", 1.0)]));
    assert_eq!(reversed, expected(&[("new", 4.0), ("old", 1.0)]));
    assert_eq!(reversed, build_purchase_usage_map(&purchases, &usage));
}

#[test]
fn string_quantities_are_coerced() {
    let request: AllocationRequest = serde_json::from_value(json!({
        "purchases": [
            {"id": "P1", "materialId": "M1", "quantity": "10"},
            {"id": "P2", "materialId": "M1", "quantity": " 5 "}
        ],
        "usage": [
            {"purchaseId": null, "materialId": "M1", "quantity": "12.5"}
        ]
    }))
    .unwrap();

    assert_eq!(
        build_purchase_usage_map(&request.purchases, &request.usage),
        expected(&[("P1", 10.0), ("P2", 2.5)])
    );
}

#[test]
fn null_usage_collection_yields_empty_map() {
    let request: AllocationRequest = serde_json::from_value(json!({
        "purchases": [{"id": "P1", "materialId": "M1", "quantity": 10}],
        "usage": null
    }))
    .unwrap();

    assert!(build_purchase_usage_map(&request.purchases, &request.usage).is_empty());
    assert!(build_purchase_usage_map(&[], &[]).is_empty());
}

#[test]
fn result_serializes_as_plain_object() {
    let usage = vec![UsageRecord::for_material("M1", 7)];
    let map = build_purchase_usage_map(&two_purchases(), &usage);

    assert_eq!(serde_json::to_value(&map).unwrap(), json!({"A": 5.0, "B": 2.0}));
}
