//! Canonical `city_state_key` construction.
//!
//! Every parser goes through [`build_city_state_key`], so two records naming
//! the same city/state (modulo case and whitespace) always land on the same
//! join key.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::Cell;

static CITY_STATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?),\s*([A-Z]{2})$").expect("city/state pattern"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Split a `"CITY NAME, ST"` string into upper-cased `(city, state)`.
///
/// The state must be two upper-case letters at the end of the trimmed input.
/// Anything else yields `None`; a malformed location is absent data, not an error.
pub fn parse_city_state(location: &str) -> Option<(String, String)> {
    let caps = CITY_STATE.captures(location.trim())?;
    let city = caps[1].trim().to_uppercase();
    let state = caps[2].trim().to_uppercase();
    if city.is_empty() {
        return None;
    }
    Some((city, state))
}

/// [`parse_city_state`] over a cell. Only text cells can hold a location.
pub fn parse_city_state_cell(cell: &Cell) -> Option<(String, String)> {
    cell.as_text().and_then(parse_city_state)
}

/// Trim, collapse internal whitespace runs to one space, upcase.
pub fn normalize_part(part: &str) -> String {
    WHITESPACE.replace_all(part.trim(), " ").to_uppercase()
}

/// `"{CITY}_{ST}"`, or `None` when either half is missing.
pub fn build_city_state_key(city: Option<&str>, state: Option<&str>) -> Option<String> {
    let (city, state) = (city?, state?);
    Some(format!("{}_{}", normalize_part(city), normalize_part(state)))
}
