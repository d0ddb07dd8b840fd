use crate::Quantity;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// One purchase of a material, as fetched from storage.
///
/// `quantity` is the most that can be allocated to this purchase through FIFO
/// fallback. Legacy rows may have no `material_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    /// Purchase identifier
    pub id: String,
    /// Material this purchase is for, if recorded
    #[serde(default)]
    pub material_id: Option<String>,
    /// Purchased quantity
    #[serde(default)]
    pub quantity: Quantity,
}

impl PurchaseRecord {
    /// Creates a purchase row.
    pub fn new(
        id: impl Into<String>,
        material_id: Option<&str>,
        quantity: impl Into<Quantity>,
    ) -> Self {
        Self {
            id: id.into(),
            material_id: material_id.map(str::to_string),
            quantity: quantity.into(),
        }
    }
}

/// One recorded consumption of material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Purchase this usage was explicitly linked to, if any
    #[serde(default)]
    pub purchase_id: Option<String>,
    /// Material consumed, if recorded
    #[serde(default)]
    pub material_id: Option<String>,
    /// Consumed quantity
    #[serde(default)]
    pub quantity: Quantity,
}

impl UsageRecord {
    /// Creates a usage row.
    pub fn new(
        purchase_id: Option<&str>,
        material_id: Option<&str>,
        quantity: impl Into<Quantity>,
    ) -> Self {
        Self {
            purchase_id: purchase_id.map(str::to_string),
            material_id: material_id.map(str::to_string),
            quantity: quantity.into(),
        }
    }

    /// A usage row linked directly to a purchase.
    pub fn for_purchase(purchase_id: &str, quantity: impl Into<Quantity>) -> Self {
        Self::new(Some(purchase_id), None, quantity)
    }

    /// A usage row carrying only a material reference.
    pub fn for_material(material_id: &str, quantity: impl Into<Quantity>) -> Self {
        Self::new(None, Some(material_id), quantity)
    }
}

/// Purchase and usage rows for one allocation pass.
///
/// Purchases must be ordered oldest first; FIFO fallback drains them in the
/// order given. A `null` or missing `usage` list deserializes as empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Purchase rows, oldest first
    #[serde(default, deserialize_with = "null_as_empty")]
    pub purchases: Vec<PurchaseRecord>,
    /// Usage rows, in allocation order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub usage: Vec<UsageRecord>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses a JSON array of rows. A bare `null` document yields no rows.
pub fn records_from_json<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    let rows: Option<Vec<T>> =
        serde_json::from_str(json).context("Input is not a JSON array of rows")?;
    Ok(rows.unwrap_or_default())
}
