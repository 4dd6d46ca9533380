//! Ingredient catalog.
//!
//! The catalog holds the built-in ingredients shipped with the service plus any
//! items the user added. It is an ordinary value: callers build one, query it and
//! hand it to the suggestion engine.

use std::collections::HashSet;

use crate::model::Category::{Fruit, Main, Other, Side};
use crate::model::ItemColor::{Black, Brown, Green, Red, White, Yellow};
use crate::model::{Category, Item, ItemColor, Nutrition, Season};
use crate::types::Size;
use crate::validation::ValidationReport;

/// Number of items in [`Catalog::builtin`].
pub const BUILTIN_COUNT: usize = 20;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

struct Spec {
    id: &'static str,
    name: &'static str,
    category: Category,
    color: ItemColor,
    nutrition: (f64, f64, f64),
    cooking_time: f64,
    cost: f64,
    size: (f64, f64),
    season: Season,
    frozen: bool,
    ready: bool,
}

#[allow(clippy::too_many_arguments)]
const fn spec(
    id: &'static str,
    name: &'static str,
    category: Category,
    color: ItemColor,
    nutrition: (f64, f64, f64),
    cooking_time: f64,
    cost: f64,
    size: (f64, f64),
) -> Spec {
    Spec {
        id,
        name,
        category,
        color,
        nutrition,
        cooking_time,
        cost,
        size,
        season: Season::All,
        frozen: false,
        ready: false,
    }
}

impl Spec {
    const fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    const fn ready(mut self) -> Self {
        self.ready = true;
        self
    }

    const fn season(mut self, season: Season) -> Self {
        self.season = season;
        self
    }

    fn build(&self) -> Item {
        let (vitamin, protein, fiber) = self.nutrition;
        Item {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category,
            color: self.color,
            nutrition: Nutrition::new(vitamin, protein, fiber),
            cooking_time: self.cooking_time,
            cost: self.cost,
            season: Some(self.season),
            is_frozen: self.frozen,
            is_ready_to_eat: self.ready,
            default_size: Size::new(self.size.0, self.size.1),
            icon: Item::DEFAULT_ICON.to_string(),
        }
    }
}

const BUILTIN: [Spec; BUILTIN_COUNT] = [
    // mains
    spec("ingredient-001", "Karaage", Main, Brown, (20.0, 80.0, 10.0), 15.0, 200.0, (50.0, 30.0)),
    spec("ingredient-002", "Tamagoyaki", Main, Yellow, (40.0, 60.0, 5.0), 10.0, 100.0, (45.0, 25.0)),
    spec("ingredient-003", "Hamburg steak", Main, Brown, (15.0, 85.0, 5.0), 20.0, 250.0, (55.0, 35.0)),
    spec("ingredient-004", "Grilled salmon", Main, Red, (30.0, 75.0, 0.0), 15.0, 300.0, (60.0, 25.0)),
    spec("ingredient-005", "Fried shrimp", Main, Red, (10.0, 70.0, 5.0), 8.0, 180.0, (40.0, 50.0)).frozen(),
    // sides
    spec("ingredient-006", "Broccoli", Side, Green, (90.0, 25.0, 60.0), 5.0, 80.0, (35.0, 35.0)),
    spec("ingredient-007", "Cherry tomato", Side, Red, (80.0, 15.0, 30.0), 0.0, 120.0, (25.0, 25.0)).ready(),
    spec("ingredient-008", "Kinpira gobo", Side, Brown, (40.0, 20.0, 80.0), 12.0, 90.0, (40.0, 20.0)),
    spec("ingredient-009", "Spinach ohitashi", Side, Green, (95.0, 30.0, 50.0), 8.0, 70.0, (40.0, 25.0)),
    spec("ingredient-010", "Glazed carrots", Side, Red, (85.0, 10.0, 40.0), 10.0, 60.0, (30.0, 40.0)),
    spec("ingredient-011", "Potato salad", Side, White, (50.0, 40.0, 30.0), 15.0, 100.0, (45.0, 30.0)),
    spec("ingredient-012", "Simmered hijiki", Side, Black, (60.0, 25.0, 90.0), 20.0, 80.0, (40.0, 25.0)),
    spec("ingredient-013", "Edamame", Side, Green, (70.0, 50.0, 60.0), 3.0, 90.0, (35.0, 20.0))
        .season(Season::Summer)
        .frozen(),
    // others
    spec("ingredient-014", "White rice", Other, White, (10.0, 20.0, 20.0), 0.0, 50.0, (80.0, 40.0)).ready(),
    spec("ingredient-015", "Onigiri", Other, White, (15.0, 25.0, 25.0), 2.0, 80.0, (50.0, 50.0)),
    spec("ingredient-016", "Cheese", Other, Yellow, (25.0, 65.0, 0.0), 0.0, 120.0, (30.0, 30.0)).ready(),
    spec("ingredient-017", "Sausage", Other, Red, (20.0, 55.0, 5.0), 5.0, 150.0, (35.0, 15.0)),
    spec("ingredient-018", "Umeboshi", Other, Red, (30.0, 5.0, 20.0), 0.0, 40.0, (20.0, 20.0)).ready(),
    spec("ingredient-019", "Takuan", Other, Yellow, (35.0, 10.0, 40.0), 0.0, 30.0, (25.0, 30.0)).ready(),
    spec("ingredient-020", "Strawberry", Fruit, Red, (100.0, 5.0, 30.0), 0.0, 200.0, (25.0, 30.0))
        .season(Season::Spring)
        .ready(),
];

impl Catalog {
    /// Creates a catalog from arbitrary items.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The built-in ingredient set.
    pub fn builtin() -> Self {
        Self::new(BUILTIN.iter().map(Spec::build).collect())
    }

    /// Returns a catalog with `extra` appended after the current items.
    pub fn with_items(&self, extra: impl IntoIterator<Item = Item>) -> Self {
        let mut items = self.items.clone();
        items.extend(extra);
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn by_category(&self, category: Category) -> Vec<&Item> {
        self.filter(|item| item.category == category)
    }

    pub fn by_color(&self, color: ItemColor) -> Vec<&Item> {
        self.filter(|item| item.color == color)
    }

    /// Items of the given season, including year-round items.
    pub fn by_season(&self, season: Season) -> Vec<&Item> {
        self.filter(|item| matches!(item.season, Some(s) if s == season || s == Season::All))
    }

    pub fn frozen(&self) -> Vec<&Item> {
        self.filter(|item| item.is_frozen)
    }

    pub fn ready_to_eat(&self) -> Vec<&Item> {
        self.filter(|item| item.is_ready_to_eat)
    }

    fn filter(&self, predicate: impl Fn(&Item) -> bool) -> Vec<&Item> {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    /// Checks the catalog for duplicate ids or names and invalid items.
    ///
    /// With `expected_count` set, a catalog of a different size is reported too.
    pub fn validate(&self, expected_count: Option<usize>) -> ValidationReport {
        let mut errors = Vec::new();

        let ids: HashSet<&str> = self.items.iter().map(|item| item.id.as_str()).collect();
        if ids.len() != self.items.len() {
            errors.push("Duplicate ingredient IDs found".to_string());
        }

        let names: HashSet<&str> = self.items.iter().map(|item| item.name.as_str()).collect();
        if names.len() != self.items.len() {
            errors.push("Duplicate ingredient names found".to_string());
        }

        for (idx, item) in self.items.iter().enumerate() {
            let report = item.validate();
            if !report.is_valid {
                errors.push(format!(
                    "Ingredient {} ({}) validation failed: {}",
                    idx + 1,
                    item.name,
                    report.errors.join(", ")
                ));
            }
        }

        if let Some(expected) = expected_count {
            if self.items.len() != expected {
                errors.push(format!(
                    "Expected {} ingredients, found {}",
                    expected,
                    self.items.len()
                ));
            }
        }

        ValidationReport::from_errors(errors)
    }
}
