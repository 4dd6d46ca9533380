//! Suggestion scoring for ingredients.
//!
//! Five independent criteria rank a list of items:
//! - speed: frozen and ready-to-eat items first, cooking time is a penalty
//! - nutrition: how close the nutrient totals get to the ideal of 100 each
//! - color: many distinct colors score high, repeated colors are penalized
//! - season: items of the current season first, year-round items second
//! - cost: cheaper items first
//!
//! Nutrition and color are defined over a set of items. When ranking single
//! items each one is evaluated as a singleton set.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::model::{Item, Nutrition, Season};

/// Bonus for frozen items in the speed score.
pub const FROZEN_BONUS: f64 = 50.0;
/// Bonus for ready-to-eat items in the speed score.
pub const READY_BONUS: f64 = 50.0;

/// Ideal total for each nutrient across a set.
pub const NUTRITION_IDEAL: f64 = 100.0;
const NUTRITION_HIGH: f64 = 150.0;
const NUTRITION_BALANCED: f64 = 100.0;
const NUTRITION_MODERATE: f64 = 50.0;

/// Points per distinct color.
pub const COLOR_VARIETY_BONUS: f64 = 20.0;
/// Penalty per repeated color.
pub const COLOR_DUPLICATE_PENALTY: f64 = 10.0;

pub const SEASON_MATCH_SCORE: f64 = 50.0;
pub const SEASON_ALL_YEAR_SCORE: f64 = 25.0;

/// Reference budget of the cost score.
pub const COST_BASELINE: f64 = 1000.0;

/// Failure of the string-keyed dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("Unsupported suggestion criterion: {0}")]
    UnsupportedCriterion(String),
}

/// A suggestion ranking strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Speed,
    Nutrition,
    Color,
    Season,
    Cost,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::Speed,
        Criterion::Nutrition,
        Criterion::Color,
        Criterion::Season,
        Criterion::Cost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Speed => "speed",
            Criterion::Nutrition => "nutrition",
            Criterion::Color => "color",
            Criterion::Season => "season",
            Criterion::Cost => "cost",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|criterion| criterion.as_str() == s)
            .ok_or_else(|| ScoringError::UnsupportedCriterion(s.to_string()))
    }
}

/// Extra inputs for scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SuggestionContext {
    /// Season to score against. Derived from today's date when `None`.
    pub season: Option<Season>,
}

impl SuggestionContext {
    pub fn with_season(season: Season) -> Self {
        Self {
            season: Some(season),
        }
    }

    fn resolved_season(&self) -> Season {
        self.season.unwrap_or_else(current_season)
    }
}

/// One ranked item.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Suggestion {
    pub item: Item,
    pub score: f64,
    pub reason: String,
}

/// Season of the given date.
pub fn season_on(date: NaiveDate) -> Season {
    Season::from_month(date.month())
}

/// Season of the local current date.
pub fn current_season() -> Season {
    season_on(Local::now().date_naive())
}

/// `(frozen ? 50 : 0) + (ready ? 50 : 0) - cooking time`
pub fn speed_score(item: &Item) -> f64 {
    let frozen = if item.is_frozen { FROZEN_BONUS } else { 0.0 };
    let ready = if item.is_ready_to_eat { READY_BONUS } else { 0.0 };
    frozen + ready - item.cooking_time
}

fn speed_reason(item: &Item) -> String {
    match (item.is_frozen, item.is_ready_to_eat) {
        (true, true) => "frozen + ready-to-eat",
        (false, true) => "ready-to-eat",
        (true, false) => "frozen",
        (false, false) => "needs cooking",
    }
    .to_string()
}

/// Nutrition balance of a set of items.
///
/// Each nutrient is summed over the set and scored as `100 - |total - 100|`;
/// the result is the average of the three nutrient scores. An empty set scores 0.
pub fn nutrition_balance(items: &[Item]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }

    let total = items
        .iter()
        .map(|item| item.nutrition)
        .fold(Nutrition::default(), |acc, n| acc + n);

    let nutrient_score = |value: f64| 100.0 - (value - NUTRITION_IDEAL).abs();
    (nutrient_score(total.vitamin) + nutrient_score(total.protein) + nutrient_score(total.fiber))
        / 3.0
}

fn nutrition_reason(item: &Item) -> String {
    let total = item.nutrition.total();
    if total >= NUTRITION_HIGH {
        "high nutrition"
    } else if total >= NUTRITION_BALANCED {
        "balanced nutrition"
    } else if total >= NUTRITION_MODERATE {
        "moderate nutrition"
    } else {
        "low nutrition"
    }
    .to_string()
}

/// Color diversity of a set of items.
///
/// `unique * 20 - (count - unique) * 10`. An empty set scores 0.
pub fn color_diversity(items: &[Item]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }

    let unique = items.iter().map(|item| item.color).collect::<HashSet<_>>().len();
    let duplicates = items.len() - unique;
    unique as f64 * COLOR_VARIETY_BONUS - duplicates as f64 * COLOR_DUPLICATE_PENALTY
}

fn color_reason(item: &Item) -> String {
    format!("adds {} to the box", item.color)
}

/// 50 for an in-season item, 25 for a year-round item, 0 otherwise.
pub fn season_score(item: &Item, current: Season) -> f64 {
    match item.season {
        Some(Season::All) => SEASON_ALL_YEAR_SCORE,
        Some(season) if season == current => SEASON_MATCH_SCORE,
        _ => 0.0,
    }
}

fn season_reason(item: &Item, current: Season) -> String {
    match item.season {
        Some(Season::All) => "available all year".to_string(),
        Some(season) if season == current => format!("in season ({current})"),
        Some(season) => format!("out of season ({season})"),
        None => "no season information".to_string(),
    }
}

/// `1000 - cost`, negative for items above the baseline.
pub fn cost_score(item: &Item) -> f64 {
    COST_BASELINE - item.cost
}

fn cost_reason(item: &Item) -> String {
    match item.cost {
        c if c <= 50.0 => "very cheap",
        c if c <= 100.0 => "cheap",
        c if c <= 200.0 => "standard",
        c if c <= 400.0 => "somewhat expensive",
        _ => "expensive",
    }
    .to_string()
}

fn evaluate(criterion: Criterion, item: &Item, season: Season) -> (f64, String) {
    match criterion {
        Criterion::Speed => (speed_score(item), speed_reason(item)),
        Criterion::Nutrition => (
            nutrition_balance(std::slice::from_ref(item)),
            nutrition_reason(item),
        ),
        Criterion::Color => (
            color_diversity(std::slice::from_ref(item)),
            color_reason(item),
        ),
        Criterion::Season => (season_score(item, season), season_reason(item, season)),
        Criterion::Cost => (cost_score(item), cost_reason(item)),
    }
}

/// Scores and ranks `items` by `criterion`, highest score first.
///
/// Items with equal scores keep their input order.
pub fn rank(
    criterion: Criterion,
    items: &[Item],
    context: Option<&SuggestionContext>,
) -> Vec<Suggestion> {
    if items.is_empty() {
        return Vec::new();
    }

    let season = match criterion {
        Criterion::Season => context.copied().unwrap_or_default().resolved_season(),
        // unused by the other criteria
        _ => Season::All,
    };

    let mut results: Vec<Suggestion> = items
        .iter()
        .map(|item| {
            let (score, reason) = evaluate(criterion, item, season);
            Suggestion {
                item: item.clone(),
                score,
                reason,
            }
        })
        .collect();

    // sort_by is stable, ties keep input order
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    debug!(
        criterion = criterion.as_str(),
        items = results.len(),
        "ranked suggestions"
    );
    results
}

/// Like [`rank`], truncated to the best `limit` entries. `0` keeps all.
pub fn rank_top(
    criterion: Criterion,
    items: &[Item],
    context: Option<&SuggestionContext>,
    limit: usize,
) -> Vec<Suggestion> {
    let mut ranked = rank(criterion, items, context);
    if limit > 0 {
        ranked.truncate(limit);
    }
    ranked
}

/// String-keyed dispatcher.
///
/// # Errors
/// [`ScoringError::UnsupportedCriterion`] for a name outside the five criteria.
/// An unknown name is a programming error and is never mapped to a default.
pub fn score(
    criterion: &str,
    items: &[Item],
    context: Option<&SuggestionContext>,
) -> Result<Vec<Suggestion>, ScoringError> {
    let criterion = criterion.parse::<Criterion>()?;
    Ok(rank(criterion, items, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ItemColor, NewItem, create_item};

    fn item(name: &str) -> NewItem {
        NewItem::new(name, Category::Side, ItemColor::Green)
    }

    fn speed_item(frozen: bool, ready: bool, cooking_time: f64) -> Item {
        let mut input = item("speed");
        input.is_frozen = Some(frozen);
        input.is_ready_to_eat = Some(ready);
        input.cooking_time = Some(cooking_time);
        create_item(input)
    }

    fn colored(color: ItemColor) -> Item {
        create_item(NewItem::new("colored", Category::Side, color))
    }

    fn with_nutrition(vitamin: f64, protein: f64, fiber: f64) -> Item {
        let mut input = item("nutrition");
        input.nutrition = Some(Nutrition::new(vitamin, protein, fiber));
        create_item(input)
    }

    fn with_cost(cost: f64) -> Item {
        let mut input = item("cost");
        input.cost = Some(cost);
        create_item(input)
    }

    fn with_season(season: Option<Season>) -> Item {
        let mut built = create_item(item("season"));
        built.season = season;
        built
    }

    #[test]
    fn speed_score_exact_values() {
        assert_eq!(speed_score(&speed_item(true, false, 5.0)), 45.0);
        assert_eq!(speed_score(&speed_item(false, true, 0.0)), 50.0);
        assert_eq!(speed_score(&speed_item(false, false, 15.0)), -15.0);
        assert_eq!(speed_score(&speed_item(true, true, 0.0)), 100.0);
    }

    #[test]
    fn speed_reasons() {
        assert_eq!(speed_reason(&speed_item(true, true, 0.0)), "frozen + ready-to-eat");
        assert_eq!(speed_reason(&speed_item(false, true, 0.0)), "ready-to-eat");
        assert_eq!(speed_reason(&speed_item(true, false, 0.0)), "frozen");
        assert_eq!(speed_reason(&speed_item(false, false, 0.0)), "needs cooking");
    }

    #[test]
    fn nutrition_balance_of_pair() {
        // totals: vitamin 100, protein 70, fiber 80
        let items = vec![with_nutrition(60.0, 30.0, 50.0), with_nutrition(40.0, 40.0, 30.0)];
        let score = nutrition_balance(&items);
        assert!((score - 83.333).abs() < 0.01, "score was {score}");
        assert_eq!(nutrition_balance(&[]), 0.0);
    }

    #[test]
    fn nutrition_reason_buckets() {
        assert_eq!(nutrition_reason(&with_nutrition(50.0, 50.0, 50.0)), "high nutrition");
        assert_eq!(nutrition_reason(&with_nutrition(50.0, 50.0, 0.0)), "balanced nutrition");
        assert_eq!(nutrition_reason(&with_nutrition(25.0, 25.0, 0.0)), "moderate nutrition");
        assert_eq!(nutrition_reason(&with_nutrition(10.0, 10.0, 0.0)), "low nutrition");
    }

    #[test]
    fn color_diversity_exact_values() {
        let distinct = vec![
            colored(ItemColor::Red),
            colored(ItemColor::Green),
            colored(ItemColor::Yellow),
            colored(ItemColor::White),
        ];
        assert_eq!(color_diversity(&distinct), 80.0);

        let doubled = vec![
            colored(ItemColor::Red),
            colored(ItemColor::Red),
            colored(ItemColor::Green),
            colored(ItemColor::Green),
        ];
        assert_eq!(color_diversity(&doubled), 20.0);
        assert_eq!(color_diversity(&[]), 0.0);
        assert_eq!(color_reason(&colored(ItemColor::Black)), "adds black to the box");
    }

    #[test]
    fn cost_score_exact_values() {
        assert_eq!(cost_score(&with_cost(200.0)), 800.0);
        assert_eq!(cost_score(&with_cost(1200.0)), -200.0);
    }

    #[test]
    fn cost_reason_buckets() {
        assert_eq!(cost_reason(&with_cost(50.0)), "very cheap");
        assert_eq!(cost_reason(&with_cost(100.0)), "cheap");
        assert_eq!(cost_reason(&with_cost(200.0)), "standard");
        assert_eq!(cost_reason(&with_cost(400.0)), "somewhat expensive");
        assert_eq!(cost_reason(&with_cost(401.0)), "expensive");
    }

    #[test]
    fn season_score_exact_values() {
        assert_eq!(season_score(&with_season(Some(Season::Summer)), Season::Summer), 50.0);
        assert_eq!(season_score(&with_season(Some(Season::All)), Season::Summer), 25.0);
        assert_eq!(season_score(&with_season(Some(Season::Winter)), Season::Summer), 0.0);
        assert_eq!(season_score(&with_season(None), Season::Summer), 0.0);

        // year-round items never count as an exact match
        assert_eq!(season_score(&with_season(Some(Season::All)), Season::All), 25.0);
        assert_eq!(season_score(&with_season(Some(Season::Spring)), Season::All), 0.0);
    }

    #[test]
    fn season_from_dates() {
        let date = |m| NaiveDate::from_ymd_opt(2024, m, 15).unwrap();
        assert_eq!(season_on(date(4)), Season::Spring);
        assert_eq!(season_on(date(7)), Season::Summer);
        assert_eq!(season_on(date(10)), Season::Autumn);
        assert_eq!(season_on(date(1)), Season::Winter);
        assert_eq!(season_on(date(12)), Season::Winter);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let mut a = speed_item(false, true, 0.0);
        a.name = "a".to_string();
        let mut b = speed_item(true, true, 0.0);
        b.name = "b".to_string();
        let mut c = speed_item(false, true, 0.0);
        c.name = "c".to_string();
        let mut d = speed_item(false, false, 20.0);
        d.name = "d".to_string();

        let ranked = rank(Criterion::Speed, &[a, b, c, d], None);
        let names: Vec<&str> = ranked.iter().map(|s| s.item.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
        assert_eq!(ranked[0].score, 100.0);
        assert_eq!(ranked[0].reason, "frozen + ready-to-eat");
    }

    #[test]
    fn season_ranking_uses_context() {
        let items = vec![
            with_season(Some(Season::All)),
            with_season(Some(Season::Spring)),
            with_season(None),
        ];
        let ctx = SuggestionContext::with_season(Season::Spring);
        let ranked = rank(Criterion::Season, &items, Some(&ctx));
        let scores: Vec<f64> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![50.0, 25.0, 0.0]);
        assert_eq!(ranked[0].reason, "in season (spring)");
        assert_eq!(ranked[1].reason, "available all year");
    }

    #[test]
    fn season_ranking_without_context_uses_today() {
        let today = current_season();
        let ranked = rank(Criterion::Season, &[with_season(Some(today))], None);
        assert_eq!(ranked[0].score, 50.0);
    }

    #[test]
    fn empty_input_yields_empty_output_for_every_criterion() {
        for criterion in Criterion::ALL {
            assert!(rank(criterion, &[], None).is_empty());
            assert!(score(criterion.as_str(), &[], None).unwrap().is_empty());
        }
    }

    #[test]
    fn unsupported_criterion_is_an_error() {
        let items = vec![with_cost(10.0)];
        assert_eq!(
            score("bogus", &items, None),
            Err(ScoringError::UnsupportedCriterion("bogus".to_string()))
        );
    }

    #[test]
    fn string_dispatch_matches_typed_ranking() {
        let items = vec![with_cost(300.0), with_cost(20.0), with_cost(120.0)];
        let ranked = score("cost", &items, None).unwrap();
        let scores: Vec<f64> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![980.0, 880.0, 700.0]);
        assert_eq!(ranked[0].reason, "very cheap");
    }

    #[test]
    fn rank_top_truncates() {
        let items = vec![with_cost(300.0), with_cost(20.0), with_cost(120.0)];
        assert_eq!(rank_top(Criterion::Cost, &items, None, 2).len(), 2);
        assert_eq!(rank_top(Criterion::Cost, &items, None, 0).len(), 3);
        assert_eq!(rank_top(Criterion::Cost, &items, None, 10).len(), 3);
    }
}
