//! Google Maps search links

/// Fixed map-search endpoint; the query is appended verbatim
pub const MAPS_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Build a map-search URL for `place_name` in `destination`.
///
/// Spaces become `+`; nothing else is escaped.
#[must_use]
pub fn build(place_name: &str, destination: &str) -> String {
    let query = format!("{place_name} {destination}").replace(' ', "+");
    format!("{MAPS_SEARCH_BASE}{query}")
}
