//! Layout engine: turns drop events into placements.
//!
//! Every decision is stateless and evaluated against the placement snapshot the
//! caller supplies. The engine never mutates that snapshot; callers append the
//! returned placement with [`add_placed_item`] and remove placements with
//! [`remove_placed_item`], both of which return a new collection.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::geometry::contains_point;
use crate::model::{BentoBox, Item, NewPlacement, Partition, PlacedItem, create_placed_item};
use crate::placement::{PlacementRejection, check_rect};
use crate::types::{Point, Size};

/// Why a placement request failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("partition not found")]
    PartitionNotFound,
    #[error("drop point is outside every partition")]
    NoPartitionAtPoint,
    #[error("{0}")]
    Rejected(PlacementRejection),
}

/// Result of [`place`].
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed_item: Option<PlacedItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<PlacedItem, PlaceError>> for PlacementOutcome {
    fn from(result: Result<PlacedItem, PlaceError>) -> Self {
        match result {
            Ok(placed) => Self {
                success: true,
                placed_item: Some(placed),
                error: None,
            },
            Err(err) => Self {
                success: false,
                placed_item: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// A drop of an item onto the box, as reported by the input layer.
///
/// When `partition_id` is absent the partition under `position` is used.
#[derive(Clone, Debug, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "itemId": "ingredient-001", "position": { "x": 10.0, "y": 20.0 } }))]
pub struct DropEvent {
    pub item_id: String,
    #[serde(default)]
    pub partition_id: Option<String>,
    pub position: Point,
}

/// Returns the first partition (in box order) whose bounds contain `point`.
///
/// Containment is inclusive on every edge, so a point on the border shared by
/// two partitions resolves to the one listed first.
pub fn locate_partition(bento: &BentoBox, point: Point) -> Option<&Partition> {
    bento
        .partitions
        .iter()
        .find(|partition| contains_point(&partition.bounds, point))
}

/// Places an item into a partition of `bento`, reporting the outcome as a value.
pub fn place(
    bento: &BentoBox,
    item_id: &str,
    partition_id: &str,
    position: Point,
    size: Size,
    existing: &[PlacedItem],
) -> PlacementOutcome {
    try_place(bento, item_id, partition_id, position, size, existing).into()
}

/// Like [`place`], but returns a typed error.
pub fn try_place(
    bento: &BentoBox,
    item_id: &str,
    partition_id: &str,
    position: Point,
    size: Size,
    existing: &[PlacedItem],
) -> Result<PlacedItem, PlaceError> {
    let partition = bento
        .partition(partition_id)
        .ok_or(PlaceError::PartitionNotFound)?;

    let candidate = create_placed_item(NewPlacement {
        item_id: item_id.to_string(),
        partition_id: partition.id.clone(),
        position,
        size,
    });

    if let Err(rejection) = check_rect(partition, candidate.position, candidate.size, existing) {
        debug!(
            item_id,
            partition_id,
            x = position.x,
            y = position.y,
            reason = rejection.code(),
            "placement rejected"
        );
        return Err(PlaceError::Rejected(rejection));
    }

    Ok(candidate)
}

/// Applies a drop event for `item`, using the item's default footprint.
pub fn place_drop(
    bento: &BentoBox,
    item: &Item,
    drop: &DropEvent,
    existing: &[PlacedItem],
) -> Result<PlacedItem, PlaceError> {
    let partition_id = match &drop.partition_id {
        Some(id) => id.as_str(),
        None => {
            locate_partition(bento, drop.position)
                .ok_or(PlaceError::NoPartitionAtPoint)?
                .id
                .as_str()
        }
    };
    try_place(
        bento,
        &item.id,
        partition_id,
        drop.position,
        item.default_size,
        existing,
    )
}

/// Returns a new collection with `placed` appended.
pub fn add_placed_item(list: &[PlacedItem], placed: PlacedItem) -> Vec<PlacedItem> {
    let mut next = Vec::with_capacity(list.len() + 1);
    next.extend_from_slice(list);
    next.push(placed);
    next
}

/// Returns a new collection without the placement with the given id.
///
/// An unknown id yields a copy of the original collection.
pub fn remove_placed_item(list: &[PlacedItem], placed_id: &str) -> Vec<PlacedItem> {
    list.iter().filter(|p| p.id != placed_id).cloned().collect()
}

/// All placements that reference the given partition.
pub fn items_in_partition<'a>(list: &'a [PlacedItem], partition_id: &str) -> Vec<&'a PlacedItem> {
    list.iter().filter(|p| p.partition_id == partition_id).collect()
}
