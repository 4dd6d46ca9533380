//! Data models of the bento layout core.
//!
//! This module defines the records the rest of the crate works with:
//! - `Item`: an ingredient with nutrition, cost, timing and a default footprint
//! - `BentoBox`: the container with its outer dimensions and partitions
//! - `Partition`: a fixed sub-region of a box that items are placed into
//! - `PlacedItem`: an item instance placed at a position inside a partition
//!
//! Every record is created through a factory that assigns a fresh identifier
//! (see [`crate::ids`]). Records are plain values; collections of them are owned
//! by the caller and passed into the pure functions of the layout and suggestion
//! modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::ids;
use crate::types::{Bounds, Point, Size};
use crate::validation::{self, ValidationReport};

/// Error returned when parsing one of the closed string sets fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str, names: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: names.join(", "),
        }
    }
}

/// Food category of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Side,
    Vegetable,
    Fruit,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Main,
        Category::Side,
        Category::Vegetable,
        Category::Fruit,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Main => "main",
            Category::Side => "side",
            Category::Vegetable => "vegetable",
            Category::Fruit => "fruit",
            Category::Other => "other",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

/// Dominant color of an item, used for color diversity scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemColor {
    Red,
    Yellow,
    Green,
    White,
    Brown,
    Black,
}

impl ItemColor {
    pub const ALL: [ItemColor; 6] = [
        ItemColor::Red,
        ItemColor::Yellow,
        ItemColor::Green,
        ItemColor::White,
        ItemColor::Brown,
        ItemColor::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemColor::Red => "red",
            ItemColor::Yellow => "yellow",
            ItemColor::Green => "green",
            ItemColor::White => "white",
            ItemColor::Brown => "brown",
            ItemColor::Black => "black",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl fmt::Display for ItemColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season in which an item is at its best. `All` marks year-round items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
    All,
}

impl Season {
    pub const ALL: [Season; 5] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
        Season::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
            Season::All => "all",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }

    /// Season of a calendar month (1 = January).
    ///
    /// Mar–May is spring, Jun–Aug summer, Sep–Nov autumn, Dec–Feb winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|season| season.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("season", s, &Self::names()))
    }
}

/// Outline of a box. Informational only, geometry always uses rectangular bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BoxShape {
    Rectangle,
    Oval,
    Double,
}

impl BoxShape {
    pub const ALL: [BoxShape; 3] = [BoxShape::Rectangle, BoxShape::Oval, BoxShape::Double];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxShape::Rectangle => "rectangle",
            BoxShape::Oval => "oval",
            BoxShape::Double => "double",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

impl FromStr for BoxShape {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == normalized)
            .ok_or_else(|| ParseEnumError::new("box shape", s, &Self::names()))
    }
}

/// What a partition is meant to hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    Rice,
    Side,
}

impl PartitionKind {
    pub const ALL: [PartitionKind; 2] = [PartitionKind::Rice, PartitionKind::Side];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionKind::Rice => "rice",
            PartitionKind::Side => "side",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::as_str).collect()
    }
}

/// Nutrition triple of an item, each value in `[0, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Nutrition {
    pub vitamin: f64,
    pub protein: f64,
    pub fiber: f64,
}

impl Nutrition {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub const fn new(vitamin: f64, protein: f64, fiber: f64) -> Self {
        Self {
            vitamin,
            protein,
            fiber,
        }
    }

    /// Sum of all three nutrients.
    pub fn total(&self) -> f64 {
        self.vitamin + self.protein + self.fiber
    }
}

impl std::ops::Add for Nutrition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.vitamin + rhs.vitamin,
            self.protein + rhs.protein,
            self.fiber + rhs.fiber,
        )
    }
}

/// An ingredient that can be placed into a box.
///
/// Immutable once created. Use [`create_item`] to build one from partial input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub color: ItemColor,
    pub nutrition: Nutrition,
    /// Preparation time in minutes.
    pub cooking_time: f64,
    /// Cost in currency units.
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    pub is_frozen: bool,
    pub is_ready_to_eat: bool,
    pub default_size: Size,
    pub icon: String,
}

impl Item {
    pub const DEFAULT_ICON: &'static str = "circle";
    pub const DEFAULT_SIZE: Size = Size::new(40.0, 30.0);

    /// Checks all structural and range constraints of the item.
    pub fn validate(&self) -> ValidationReport {
        validation::validate_record(self, validation::validate_item)
    }
}

/// Input for [`create_item`].
///
/// Only `name`, `category` and `color` are required; everything else falls back
/// to a documented default (nutrition 0, cooking time 0, cost 0, season `all`,
/// not frozen, not ready to eat, footprint 40×30, icon `circle`).
#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "name": "Tamagoyaki",
        "category": "main",
        "color": "yellow",
        "nutrition": { "vitamin": 40.0, "protein": 60.0, "fiber": 5.0 },
        "cookingTime": 10.0,
        "cost": 100.0
    })
)]
pub struct NewItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub category: Category,
    pub color: ItemColor,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default)]
    pub cooking_time: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub is_frozen: Option<bool>,
    #[serde(default)]
    pub is_ready_to_eat: Option<bool>,
    #[serde(default)]
    pub default_size: Option<Size>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewItem {
    /// Starts an input with the three required fields.
    pub fn new(name: impl Into<String>, category: Category, color: ItemColor) -> Self {
        Self {
            id: None,
            name: name.into(),
            category,
            color,
            nutrition: None,
            cooking_time: None,
            cost: None,
            season: None,
            is_frozen: None,
            is_ready_to_eat: None,
            default_size: None,
            icon: None,
        }
    }
}

/// Builds an item, filling omitted fields with defaults.
///
/// An explicit non-empty `id` is kept, otherwise a new one is generated.
///
/// # Examples
/// ```
/// use bento_designer::model::{create_item, Category, ItemColor, NewItem, Season};
///
/// let item = create_item(NewItem::new("Rice ball", Category::Other, ItemColor::White));
/// assert_eq!(item.season, Some(Season::All));
/// assert_eq!(item.default_size.width, 40.0);
/// assert!(item.validate().is_valid);
/// ```
pub fn create_item(input: NewItem) -> Item {
    let id = match input.id {
        Some(id) if !id.is_empty() => id,
        _ => ids::generate(ids::ITEM_PREFIX),
    };

    Item {
        id,
        name: input.name,
        category: input.category,
        color: input.color,
        nutrition: input.nutrition.unwrap_or_default(),
        cooking_time: input.cooking_time.unwrap_or(0.0),
        cost: input.cost.unwrap_or(0.0),
        season: Some(input.season.unwrap_or(Season::All)),
        is_frozen: input.is_frozen.unwrap_or(false),
        is_ready_to_eat: input.is_ready_to_eat.unwrap_or(false),
        default_size: input.default_size.unwrap_or(Item::DEFAULT_SIZE),
        icon: input.icon.unwrap_or_else(|| Item::DEFAULT_ICON.to_string()),
    }
}

/// A fixed sub-region of a box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Partition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PartitionKind,
    pub bounds: Bounds,
}

impl Partition {
    /// Checks all structural and range constraints of the partition.
    pub fn validate(&self) -> ValidationReport {
        validation::validate_record(self, validation::validate_partition)
    }
}

/// Creates a partition with a fresh identifier.
pub fn create_partition(kind: PartitionKind, bounds: Bounds) -> Partition {
    Partition {
        id: ids::generate(ids::PARTITION_PREFIX),
        kind,
        bounds,
    }
}

/// The container being designed.
///
/// # Fields
/// * `id` - Unique identifier
/// * `shape` - Outline tag, serialized as `type`
/// * `dimensions` - Outer width and height
/// * `partitions` - Ordered list of partitions, owned by this box
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BentoBox {
    pub id: String,
    #[serde(rename = "type")]
    pub shape: BoxShape,
    pub dimensions: Size,
    pub partitions: Vec<Partition>,
}

impl BentoBox {
    /// Looks up a partition of this box by id.
    pub fn partition(&self, partition_id: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.id == partition_id)
    }

    /// Checks all structural and range constraints of the box and its partitions.
    pub fn validate(&self) -> ValidationReport {
        validation::validate_record(self, validation::validate_box)
    }
}

/// Creates a box with a fresh identifier.
///
/// When `partitions` is `None`, the box is split vertically in half into a
/// `rice` partition on the left and a `side` partition on the right.
///
/// # Examples
/// ```
/// use bento_designer::model::{create_box, BoxShape, PartitionKind};
/// use bento_designer::types::Size;
///
/// let bento = create_box(BoxShape::Rectangle, Size::new(300.0, 200.0), None);
/// assert_eq!(bento.partitions.len(), 2);
/// assert_eq!(bento.partitions[0].kind, PartitionKind::Rice);
/// assert_eq!(bento.partitions[1].bounds.x, 150.0);
/// ```
pub fn create_box(
    shape: BoxShape,
    dimensions: Size,
    partitions: Option<Vec<Partition>>,
) -> BentoBox {
    let partitions = partitions.unwrap_or_else(|| default_partitions(dimensions));
    BentoBox {
        id: ids::generate(ids::BOX_PREFIX),
        shape,
        dimensions,
        partitions,
    }
}

fn default_partitions(dimensions: Size) -> Vec<Partition> {
    let half_width = dimensions.width / 2.0;
    vec![
        create_partition(
            PartitionKind::Rice,
            Bounds::new(0.0, 0.0, half_width, dimensions.height),
        ),
        create_partition(
            PartitionKind::Side,
            Bounds::new(half_width, 0.0, half_width, dimensions.height),
        ),
    ]
}

/// A concrete instance of an item inside a partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: String,
    pub item_id: String,
    pub partition_id: String,
    pub position: Point,
    pub size: Size,
}

impl PlacedItem {
    /// Checks all structural and range constraints of the placement.
    pub fn validate(&self) -> ValidationReport {
        validation::validate_record(self, validation::validate_placed_item)
    }
}

/// Input for [`create_placed_item`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewPlacement {
    pub item_id: String,
    pub partition_id: String,
    pub position: Point,
    pub size: Size,
}

/// Creates a placed item with a fresh `placed-…` identifier.
pub fn create_placed_item(input: NewPlacement) -> PlacedItem {
    PlacedItem {
        id: ids::generate(ids::PLACED_PREFIX),
        item_id: input.item_id,
        partition_id: input.partition_id,
        position: input.position,
        size: input.size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn create_item_fills_defaults() {
        let item = create_item(NewItem::new("Pickles", Category::Other, ItemColor::Yellow));

        assert!(item.id.starts_with("ingredient-"));
        assert_eq!(item.nutrition, Nutrition::new(0.0, 0.0, 0.0));
        assert_eq!(item.cooking_time, 0.0);
        assert_eq!(item.cost, 0.0);
        assert_eq!(item.season, Some(Season::All));
        assert!(!item.is_frozen);
        assert!(!item.is_ready_to_eat);
        assert_eq!(item.default_size, Size::new(40.0, 30.0));
        assert_eq!(item.icon, "circle");
    }

    #[test]
    fn create_item_keeps_overrides() {
        let mut input = NewItem::new("Edamame", Category::Side, ItemColor::Green);
        input.id = Some("ingredient-013".to_string());
        input.season = Some(Season::Summer);
        input.is_frozen = Some(true);
        input.default_size = Some(Size::new(35.0, 20.0));

        let item = create_item(input);
        assert_eq!(item.id, "ingredient-013");
        assert_eq!(item.season, Some(Season::Summer));
        assert!(item.is_frozen);
        assert_eq!(item.default_size, Size::new(35.0, 20.0));
    }

    #[test]
    fn create_item_regenerates_empty_id() {
        let mut input = NewItem::new("Cheese", Category::Other, ItemColor::Yellow);
        input.id = Some(String::new());
        assert!(create_item(input).id.starts_with("ingredient-"));
    }

    #[test]
    fn new_item_deserializes_from_partial_json() {
        let input: NewItem = serde_json::from_str(
            r#"{"name": "Cherry tomato", "category": "side", "color": "red", "isReadyToEat": true}"#,
        )
        .expect("partial input should parse");
        let item = create_item(input);
        assert!(item.is_ready_to_eat);
        assert_eq!(item.icon, "circle");
    }

    #[test]
    fn default_box_is_split_in_half() {
        let bento = create_box(BoxShape::Rectangle, Size::new(300.0, 200.0), None);

        assert!(bento.id.starts_with("bento-"));
        assert_eq!(bento.partitions.len(), 2);
        let rice = &bento.partitions[0];
        let side = &bento.partitions[1];
        assert_eq!(rice.kind, PartitionKind::Rice);
        assert_eq!(rice.bounds, Bounds::new(0.0, 0.0, 150.0, 200.0));
        assert_eq!(side.kind, PartitionKind::Side);
        assert_eq!(side.bounds, Bounds::new(150.0, 0.0, 150.0, 200.0));
        assert_ne!(rice.id, side.id);
        assert!(bento.validate().is_valid);
    }

    #[test]
    fn explicit_partitions_are_kept() {
        let only = create_partition(PartitionKind::Side, Bounds::new(0.0, 0.0, 100.0, 100.0));
        let bento = create_box(
            BoxShape::Oval,
            Size::new(100.0, 100.0),
            Some(vec![only.clone()]),
        );
        assert_eq!(bento.partitions, vec![only.clone()]);
        assert_eq!(bento.partition(&only.id), Some(&only));
        assert_eq!(bento.partition("missing"), None);
    }

    #[test]
    fn records_serialize_with_wire_names() {
        let bento = create_box(BoxShape::Double, Size::new(200.0, 100.0), None);
        let value = serde_json::to_value(&bento).unwrap();
        assert_eq!(value["type"], "double");
        assert_eq!(value["partitions"][0]["type"], "rice");

        let placed = create_placed_item(NewPlacement {
            item_id: "ingredient-001".to_string(),
            partition_id: bento.partitions[0].id.clone(),
            position: Point::new(10.0, 10.0),
            size: Size::new(50.0, 30.0),
        });
        let value = serde_json::to_value(&placed).unwrap();
        assert_eq!(value["itemId"], "ingredient-001");
        assert_eq!(value["size"]["width"], 50.0);
    }

    #[test]
    fn factories_never_repeat_ids() {
        let mut seen = HashSet::new();
        for _ in 0..1_000 {
            let placed = create_placed_item(NewPlacement {
                item_id: "i".to_string(),
                partition_id: "p".to_string(),
                position: Point::new(0.0, 0.0),
                size: Size::new(1.0, 1.0),
            });
            assert!(seen.insert(placed.id));
            assert!(seen.insert(create_partition(PartitionKind::Rice, Bounds::new(0.0, 0.0, 1.0, 1.0)).id));
            assert!(seen.insert(create_box(BoxShape::Rectangle, Size::new(2.0, 2.0), Some(Vec::new())).id));
            assert!(seen.insert(create_item(NewItem::new("x", Category::Main, ItemColor::Red)).id));
        }
    }

    #[test]
    fn season_from_month_ranges() {
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
    }

    #[test]
    fn parse_closed_sets() {
        assert_eq!("Summer".parse::<Season>(), Ok(Season::Summer));
        assert_eq!("oval".parse::<BoxShape>(), Ok(BoxShape::Oval));
        let err = "square".parse::<BoxShape>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown box shape 'square', expected one of: rectangle, oval, double"
        );
    }

    #[test]
    fn nutrition_adds_up() {
        let total = Nutrition::new(20.0, 80.0, 10.0) + Nutrition::new(80.0, 15.0, 30.0);
        assert_eq!(total, Nutrition::new(100.0, 95.0, 40.0));
        assert_eq!(total.total(), 235.0);
    }
}
