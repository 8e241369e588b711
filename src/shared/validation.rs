use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating key fields (category keys, etc.)
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "fire", "flood", "road-accident"
    /// - Invalid: "-fire", "fire-", "road--accident", "Fire", "road_accident"
    pub static ref CODE_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for validating display colors in `#RRGGBB` form
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}
