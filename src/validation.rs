//! Structural and range validation of records.
//!
//! Validators work on raw JSON values so they can check records that come from
//! untrusted sources (stored blobs, HTTP payloads) before they are decoded into
//! typed models. They never fail: every violated constraint is collected into the
//! returned [`ValidationReport`].

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::model::{BoxShape, Category, ItemColor, Nutrition, PartitionKind, Season};

/// Outcome of a validation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Builds a report from the collected error messages.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Encodes a typed record and runs the given validator on it.
pub(crate) fn validate_record<T: Serialize>(
    record: &T,
    validator: fn(&Value) -> ValidationReport,
) -> ValidationReport {
    match serde_json::to_value(record) {
        Ok(value) => validator(&value),
        Err(err) => ValidationReport::from_errors(vec![format!(
            "record could not be encoded: {err}"
        )]),
    }
}

fn field<'a>(record: &'a Value, name: &str) -> Option<&'a Value> {
    record.as_object().and_then(|obj| obj.get(name))
}

fn non_empty_str<'a>(record: &'a Value, name: &str) -> Option<&'a str> {
    field(record, name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn object<'a>(record: &'a Value, name: &str) -> Option<&'a Map<String, Value>> {
    field(record, name).and_then(Value::as_object)
}

fn require_string(record: &Value, name: &str, errors: &mut Vec<String>) {
    if non_empty_str(record, name).is_none() {
        errors.push(format!("{name} is required"));
    }
}

fn check_enum(record: &Value, name: &str, allowed: &[&str], errors: &mut Vec<String>) {
    if let Some(value) = non_empty_str(record, name) {
        if !allowed.contains(&value) {
            errors.push(format!("{name} must be one of: {}", allowed.join(", ")));
        }
    }
}

fn number(obj: &Map<String, Value>, name: &str) -> Option<f64> {
    obj.get(name).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn check_positive(obj: &Map<String, Value>, prefix: &str, name: &str, errors: &mut Vec<String>) {
    match number(obj, name) {
        Some(v) if v > 0.0 => {}
        _ => errors.push(format!("{prefix}.{name} must be a positive number")),
    }
}

fn check_non_negative(
    obj: &Map<String, Value>,
    prefix: &str,
    name: &str,
    errors: &mut Vec<String>,
) {
    match number(obj, name) {
        Some(v) if v >= 0.0 => {}
        _ => errors.push(format!("{prefix}.{name} must be a non-negative number")),
    }
}

fn dimensions_errors(record: &Value, name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    match object(record, name) {
        None => errors.push(format!("{name} is required")),
        Some(dims) => {
            check_positive(dims, name, "width", &mut errors);
            check_positive(dims, name, "height", &mut errors);
        }
    }
    errors
}

fn bounds_errors(record: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    match object(record, "bounds") {
        None => errors.push("bounds is required".to_string()),
        Some(bounds) => {
            check_non_negative(bounds, "bounds", "x", &mut errors);
            check_non_negative(bounds, "bounds", "y", &mut errors);
            check_positive(bounds, "bounds", "width", &mut errors);
            check_positive(bounds, "bounds", "height", &mut errors);
        }
    }
    errors
}

/// Validates a box record, including each of its partitions.
///
/// Checks `id`, `type` (rectangle/oval/double), `dimensions` (both positive),
/// that `partitions` is an array of valid partitions, and that partition ids
/// are unique within the box.
pub fn validate_box(record: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    require_string(record, "id", &mut errors);
    require_string(record, "type", &mut errors);
    check_enum(record, "type", &BoxShape::names(), &mut errors);
    errors.extend(dimensions_errors(record, "dimensions"));

    match field(record, "partitions").and_then(Value::as_array) {
        None => errors.push("partitions must be an array".to_string()),
        Some(partitions) => {
            let mut seen: Vec<&str> = Vec::new();
            for (idx, partition) in partitions.iter().enumerate() {
                for err in validate_partition(partition).errors {
                    errors.push(format!("partitions[{idx}]: {err}"));
                }
                if let Some(id) = non_empty_str(partition, "id") {
                    if seen.contains(&id) {
                        errors.push(format!("partitions[{idx}]: duplicate partition id '{id}'"));
                    }
                    seen.push(id);
                }
            }
        }
    }

    ValidationReport::from_errors(errors)
}

/// Validates a partition record.
pub fn validate_partition(record: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    require_string(record, "id", &mut errors);
    require_string(record, "type", &mut errors);
    check_enum(record, "type", &PartitionKind::names(), &mut errors);
    errors.extend(bounds_errors(record));

    ValidationReport::from_errors(errors)
}

/// Validates a placed item record.
pub fn validate_placed_item(record: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    for name in ["id", "itemId", "partitionId"] {
        require_string(record, name, &mut errors);
    }

    match object(record, "position") {
        None => errors.push("position is required".to_string()),
        Some(position) => {
            for axis in ["x", "y"] {
                if number(position, axis).is_none() {
                    errors.push(format!("position.{axis} must be a number"));
                }
            }
        }
    }

    match object(record, "size") {
        None => errors.push("size is required".to_string()),
        Some(size) => {
            check_positive(size, "size", "width", &mut errors);
            check_positive(size, "size", "height", &mut errors);
        }
    }

    ValidationReport::from_errors(errors)
}

/// Validates an item record.
///
/// Reports missing or mistyped required fields, nutrition values outside
/// `[0, 100]`, negative cooking time or cost, values outside the closed sets
/// for category, color and season, and a non-positive default footprint.
pub fn validate_item(record: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    for name in ["id", "name", "category", "color", "icon"] {
        require_string(record, name, &mut errors);
    }
    for name in ["nutrition", "defaultSize"] {
        if object(record, name).is_none() {
            errors.push(format!("{name} is required"));
        }
    }
    for name in ["cookingTime", "cost"] {
        match field(record, name).and_then(Value::as_f64) {
            None => errors.push(format!("{name} is required")),
            Some(v) if v < 0.0 => errors.push(format!("{name} must be a non-negative number")),
            Some(_) => {}
        }
    }
    for name in ["isFrozen", "isReadyToEat"] {
        if !field(record, name).is_some_and(Value::is_boolean) {
            errors.push(format!("{name} is required"));
        }
    }

    if let Some(nutrition) = object(record, "nutrition") {
        for nutrient in ["vitamin", "protein", "fiber"] {
            match number(nutrition, nutrient) {
                Some(v) if (Nutrition::MIN..=Nutrition::MAX).contains(&v) => {}
                _ => errors.push(format!(
                    "nutrition.{nutrient} must be between {} and {}",
                    Nutrition::MIN,
                    Nutrition::MAX
                )),
            }
        }
    }

    check_enum(record, "category", &Category::names(), &mut errors);
    check_enum(record, "color", &ItemColor::names(), &mut errors);
    match field(record, "season") {
        None | Some(Value::Null) => {}
        Some(Value::String(season)) if Season::names().contains(&season.as_str()) => {}
        Some(_) => errors.push(format!(
            "season must be one of: {}",
            Season::names().join(", ")
        )),
    }

    if let Some(size) = object(record, "defaultSize") {
        check_positive(size, "defaultSize", "width", &mut errors);
        check_positive(size, "defaultSize", "height", &mut errors);
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_item() -> Value {
        json!({
            "id": "ingredient-001",
            "name": "Karaage",
            "category": "main",
            "color": "brown",
            "nutrition": { "vitamin": 20, "protein": 80, "fiber": 10 },
            "cookingTime": 15,
            "cost": 200,
            "season": "all",
            "isFrozen": false,
            "isReadyToEat": false,
            "defaultSize": { "width": 50, "height": 30 },
            "icon": "circle"
        })
    }

    #[test]
    fn valid_item_passes() {
        let report = validate_item(&valid_item());
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn item_reports_every_violation() {
        let mut item = valid_item();
        item["nutrition"]["vitamin"] = json!(101);
        item["nutrition"]["fiber"] = json!(-1);
        item["color"] = json!("purple");
        item["cost"] = json!(-5);
        item.as_object_mut().unwrap().remove("icon");

        let report = validate_item(&item);
        assert!(!report.is_valid);
        assert_eq!(
            report.errors,
            vec![
                "icon is required".to_string(),
                "cost must be a non-negative number".to_string(),
                "nutrition.vitamin must be between 0 and 100".to_string(),
                "nutrition.fiber must be between 0 and 100".to_string(),
                "color must be one of: red, yellow, green, white, brown, black".to_string(),
            ]
        );
    }

    #[test]
    fn item_without_season_is_valid_but_unknown_season_is_not() {
        let mut item = valid_item();
        item.as_object_mut().unwrap().remove("season");
        assert!(validate_item(&item).is_valid);

        item["season"] = json!("monsoon");
        let report = validate_item(&item);
        assert_eq!(
            report.errors,
            vec!["season must be one of: spring, summer, autumn, winter, all".to_string()]
        );
    }

    #[test]
    fn empty_record_lists_all_required_fields() {
        let report = validate_item(&json!({}));
        assert!(!report.is_valid);
        for name in [
            "id",
            "name",
            "category",
            "color",
            "icon",
            "nutrition",
            "defaultSize",
            "cookingTime",
            "cost",
            "isFrozen",
            "isReadyToEat",
        ] {
            let expected = format!("{name} is required");
            assert!(report.errors.contains(&expected), "missing '{expected}'");
        }
    }

    #[test]
    fn partition_bounds_are_checked() {
        let report = validate_partition(&json!({
            "id": "partition-1",
            "type": "dessert",
            "bounds": { "x": -1, "y": 0, "width": 0, "height": 10 }
        }));
        assert_eq!(
            report.errors,
            vec![
                "type must be one of: rice, side".to_string(),
                "bounds.x must be a non-negative number".to_string(),
                "bounds.width must be a positive number".to_string(),
            ]
        );

        let report = validate_partition(&json!({ "id": "p", "type": "rice" }));
        assert_eq!(report.errors, vec!["bounds is required".to_string()]);
    }

    #[test]
    fn box_validation_includes_partitions() {
        let report = validate_box(&json!({
            "id": "bento-1",
            "type": "square",
            "dimensions": { "width": 300, "height": -200 },
            "partitions": [
                { "id": "p1", "type": "rice", "bounds": { "x": 0, "y": 0, "width": 150, "height": 200 } },
                { "id": "p1", "type": "side" }
            ]
        }));
        assert_eq!(
            report.errors,
            vec![
                "type must be one of: rectangle, oval, double".to_string(),
                "dimensions.height must be a positive number".to_string(),
                "partitions[1]: bounds is required".to_string(),
                "partitions[1]: duplicate partition id 'p1'".to_string(),
            ]
        );

        let report = validate_box(&json!({ "type": "oval", "dimensions": { "width": 1, "height": 1 } }));
        assert_eq!(
            report.errors,
            vec![
                "id is required".to_string(),
                "partitions must be an array".to_string()
            ]
        );
    }

    #[test]
    fn placed_item_validation() {
        let report = validate_placed_item(&json!({
            "id": "placed-1",
            "itemId": "",
            "partitionId": "partition-1",
            "position": { "x": "10", "y": 5 },
            "size": { "width": 40, "height": 0 }
        }));
        assert_eq!(
            report.errors,
            vec![
                "itemId is required".to_string(),
                "position.x must be a number".to_string(),
                "size.height must be a positive number".to_string(),
            ]
        );
    }

    #[test]
    fn validators_are_idempotent() {
        let mut item = valid_item();
        item["nutrition"]["protein"] = json!(250);
        let first = validate_item(&item);
        let second = validate_item(&item);
        assert_eq!(first, second);

        let partition = json!({ "type": "rice" });
        assert_eq!(validate_partition(&partition), validate_partition(&partition));
    }

    #[test]
    fn non_finite_typed_values_are_rejected() {
        let report = validate_record(
            &crate::types::Bounds::new(0.0, 0.0, f64::NAN, 1.0),
            |bounds| {
                let wrapped = json!({ "id": "p", "type": "rice", "bounds": bounds });
                validate_partition(&wrapped)
            },
        );
        assert_eq!(
            report.errors,
            vec!["bounds.width must be a positive number".to_string()]
        );
    }
}
