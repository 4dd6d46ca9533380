//! Placement validation for items inside a partition.
//!
//! A placement is legal when the item's rectangle lies completely within the
//! partition bounds and does not overlap any item already placed in the same
//! partition. Items in other partitions are ignored, even if their rectangles
//! intersect in box space.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::geometry::{fits_within, overlaps};
use crate::model::{Item, Partition, PlacedItem};
use crate::types::{Point, Size};

/// Reasons why an item cannot be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementRejection {
    OutOfBounds,
    Overlap,
}

impl PlacementRejection {
    pub fn code(&self) -> &'static str {
        match self {
            PlacementRejection::OutOfBounds => "out_of_bounds",
            PlacementRejection::Overlap => "overlap",
        }
    }
}

impl fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementRejection::OutOfBounds => write!(f, "extends beyond partition bounds"),
            PlacementRejection::Overlap => write!(f, "overlaps with existing ingredient"),
        }
    }
}

/// Result of [`can_place`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementCheck {
    pub can_place: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PlacementCheck {
    fn from_result(result: Result<(), PlacementRejection>) -> Self {
        match result {
            Ok(()) => Self {
                can_place: true,
                reason: None,
            },
            Err(rejection) => Self {
                can_place: false,
                reason: Some(rejection.to_string()),
            },
        }
    }
}

/// Decides whether `item` may be placed at `position` inside `partition`.
///
/// The item occupies its default footprint. Bounds are checked before
/// overlaps, so an item that is both out of bounds and overlapping reports
/// the bounds violation.
///
/// # Examples
/// ```
/// use bento_designer::model::{create_item, create_partition, Category, ItemColor, NewItem, PartitionKind};
/// use bento_designer::placement::can_place;
/// use bento_designer::types::{Bounds, Point};
///
/// let item = create_item(NewItem::new("Sausage", Category::Other, ItemColor::Red));
/// let partition = create_partition(PartitionKind::Side, Bounds::new(0.0, 0.0, 150.0, 200.0));
///
/// let check = can_place(&item, &partition, Point::new(140.0, 10.0), &[]);
/// assert!(!check.can_place);
/// assert_eq!(check.reason.as_deref(), Some("extends beyond partition bounds"));
/// ```
pub fn can_place(
    item: &Item,
    partition: &Partition,
    position: Point,
    existing: &[PlacedItem],
) -> PlacementCheck {
    PlacementCheck::from_result(check_rect(partition, position, item.default_size, existing))
}

/// Checks a rectangle of arbitrary size against a partition and its occupants.
pub fn check_rect(
    partition: &Partition,
    position: Point,
    size: Size,
    existing: &[PlacedItem],
) -> Result<(), PlacementRejection> {
    if !fits_within(position, size, &partition.bounds) {
        return Err(PlacementRejection::OutOfBounds);
    }

    let collides = existing
        .iter()
        .filter(|placed| placed.partition_id == partition.id)
        .any(|placed| overlaps(position, size, placed.position, placed.size));
    if collides {
        return Err(PlacementRejection::Overlap);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Category, ItemColor, NewItem, NewPlacement, PartitionKind, create_item, create_partition,
        create_placed_item,
    };
    use crate::types::Bounds;

    fn item_40x30() -> Item {
        create_item(NewItem::new("Sausage", Category::Other, ItemColor::Red))
    }

    fn partition() -> Partition {
        create_partition(PartitionKind::Side, Bounds::new(0.0, 0.0, 150.0, 200.0))
    }

    fn placed_at(partition: &Partition, x: f64, y: f64) -> PlacedItem {
        create_placed_item(NewPlacement {
            item_id: "ingredient-017".to_string(),
            partition_id: partition.id.clone(),
            position: Point::new(x, y),
            size: Size::new(40.0, 30.0),
        })
    }

    #[test]
    fn rejects_out_of_bounds() {
        let check = can_place(&item_40x30(), &partition(), Point::new(140.0, 10.0), &[]);
        assert!(!check.can_place);
        assert!(check.reason.unwrap().contains("bounds"));
    }

    #[test]
    fn rejects_position_left_of_partition() {
        let right_half = create_partition(PartitionKind::Side, Bounds::new(150.0, 0.0, 150.0, 200.0));
        let check = can_place(&item_40x30(), &right_half, Point::new(120.0, 10.0), &[]);
        assert!(!check.can_place);
        assert_eq!(check.reason.as_deref(), Some("extends beyond partition bounds"));
    }

    #[test]
    fn rejects_overlap_and_accepts_disjoint() {
        let partition = partition();
        let existing = vec![placed_at(&partition, 50.0, 50.0)];

        let check = can_place(&item_40x30(), &partition, Point::new(55.0, 55.0), &existing);
        assert!(!check.can_place);
        assert_eq!(check.reason.as_deref(), Some("overlaps with existing ingredient"));

        let check = can_place(&item_40x30(), &partition, Point::new(100.0, 100.0), &existing);
        assert_eq!(
            check,
            PlacementCheck {
                can_place: true,
                reason: None
            }
        );
    }

    #[test]
    fn touching_neighbour_is_accepted() {
        let partition = partition();
        let existing = vec![placed_at(&partition, 50.0, 50.0)];
        let check = can_place(&item_40x30(), &partition, Point::new(90.0, 50.0), &existing);
        assert!(check.can_place);
    }

    #[test]
    fn other_partitions_do_not_collide() {
        let left = partition();
        let other = create_partition(PartitionKind::Rice, Bounds::new(0.0, 0.0, 150.0, 200.0));
        let existing = vec![placed_at(&other, 50.0, 50.0)];

        let check = can_place(&item_40x30(), &left, Point::new(55.0, 55.0), &existing);
        assert!(check.can_place);
    }

    #[test]
    fn bounds_are_reported_before_overlap() {
        let partition = partition();
        let existing = vec![placed_at(&partition, 100.0, 10.0)];
        let check = can_place(&item_40x30(), &partition, Point::new(120.0, 10.0), &existing);
        assert_eq!(check.reason.as_deref(), Some("extends beyond partition bounds"));
    }

    #[test]
    fn check_rect_uses_the_given_size() {
        let partition = partition();
        assert_eq!(
            check_rect(&partition, Point::new(0.0, 0.0), Size::new(150.0, 200.0), &[]),
            Ok(())
        );
        assert_eq!(
            check_rect(&partition, Point::new(0.0, 0.0), Size::new(151.0, 200.0), &[]),
            Err(PlacementRejection::OutOfBounds)
        );
        assert_eq!(PlacementRejection::Overlap.code(), "overlap");
    }
}
