//! Identifier generation for boxes, partitions, items and placements.
//!
//! Generated identifiers have the shape `<prefix>-<unix millis>-<9 base36 chars>`.
//! The random suffix is taken from a v4 UUID, which gives ~46 bits of entropy per
//! id and keeps ids unique for the lifetime of a session without shared state.

use chrono::Utc;
use uuid::Uuid;

pub const BOX_PREFIX: &str = "bento";
pub const PARTITION_PREFIX: &str = "partition";
pub const PLACED_PREFIX: &str = "placed";
pub const ITEM_PREFIX: &str = "ingredient";

/// Length of the random suffix.
pub const RANDOM_SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a fresh identifier with the given prefix.
///
/// # Examples
/// ```
/// use bento_designer::ids::{generate, PLACED_PREFIX};
///
/// let id = generate(PLACED_PREFIX);
/// assert!(id.starts_with("placed-"));
/// ```
pub fn generate(prefix: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    format!("{prefix}-{timestamp}-{}", random_suffix())
}

fn random_suffix() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(RANDOM_SUFFIX_LEN);
    for _ in 0..RANDOM_SUFFIX_LEN {
        suffix.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    suffix
}
