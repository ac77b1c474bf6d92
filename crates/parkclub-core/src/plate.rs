//! Plate extraction from recognised text.
//!
//! Text recognition hands back whatever it read on the photo: the plate
//! itself, the province banner, stickers. We keep the first token that looks
//! like a plate.

use crate::constants::PLATE_PATTERN;
use crate::types::Plate;
use regex::Regex;
use std::sync::OnceLock;

fn plate_regex() -> &'static Regex {
    static PLATE_RE: OnceLock<Regex> = OnceLock::new();
    PLATE_RE.get_or_init(|| Regex::new(PLATE_PATTERN).expect("plate pattern is a valid regex"))
}

/// Pick the first plate-shaped token out of recognised text.
///
/// Matching is case-sensitive and digits are ASCII only, so `abc-1234` is
/// not a plate. Returns `None` when nothing in the text looks like a plate.
///
/// # Examples
///
/// ```
/// use parkclub_core::extract_plate;
///
/// let plate = extract_plate("ECUADOR\nPBX-1234\nGUAYAS").unwrap();
/// assert_eq!(plate.as_str(), "PBX-1234");
/// assert!(extract_plate("no plate here").is_none());
/// ```
#[must_use]
pub fn extract_plate(text: &str) -> Option<Plate> {
    plate_regex()
        .find_iter(text)
        .find_map(|found| Plate::new(found.as_str()).ok())
}
