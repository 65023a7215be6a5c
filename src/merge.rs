//! Merging draft text with resolved places
//!
//! Every place name that occurs verbatim in the draft is turned into a
//! markdown link, then a categorized link index is appended. The index is
//! written unconditionally, so a document always carries a map link for every
//! place even when the draft mentions none of them.
//!
//! Substitution is plain substring replacement in hotels → restaurants →
//! attractions order over the progressively rewritten text. When one name is
//! a substring of another, whichever is processed first wins and may break
//! the later link. Names are not matched on word boundaries either, so
//! `"Louvre"` also rewrites the inside of `"Louvre Rivoli"`.

use std::fmt::Write;

use tracing::debug;

use crate::models::{Category, MergedDocument, Place};

/// Prefix of the link index heading
pub const INDEX_HEADING: &str = "## Map Links for";

/// Merge `text` with the three place sets into one document
#[must_use]
pub fn merge(
    text: &str,
    hotels: &[Place],
    restaurants: &[Place],
    attractions: &[Place],
    destination: &str,
) -> String {
    let sections = [
        (Category::Hotels, hotels),
        (Category::Restaurants, restaurants),
        (Category::Attractions, attractions),
    ];

    let mut merged = text.to_string();
    let mut linked = 0usize;
    for place in sections.iter().flat_map(|(_, places)| places.iter()) {
        // an empty pattern would match between every character
        if !place.name.is_empty() && merged.contains(place.name.as_str()) {
            merged = merged.replace(
                place.name.as_str(),
                &format!("[{}]({})", place.name, place.maps_url),
            );
            linked += 1;
        }
    }
    debug!("Linked {} place names inline", linked);

    let _ = write!(merged, "\n\n{INDEX_HEADING} {destination}\n");
    for (category, places) in sections {
        let _ = write!(merged, "\n### {}\n", category.heading());
        for place in places {
            let _ = writeln!(merged, "- {place}");
        }
    }
    merged
}

/// Merge a numbered draft into a [`MergedDocument`]
#[must_use]
pub fn merge_document(
    draft_index: usize,
    text: &str,
    hotels: &[Place],
    restaurants: &[Place],
    attractions: &[Place],
    destination: &str,
) -> MergedDocument {
    MergedDocument {
        draft_index,
        text: merge(text, hotels, restaurants, attractions, destination),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps;

    fn place(name: &str, url: &str) -> Place {
        Place {
            name: name.to_string(),
            address: "A".to_string(),
            rating: "4.5".to_string(),
            maps_url: url.to_string(),
            synthetic: false,
        }
    }

    fn index_lines(doc: &str) -> usize {
        let index = doc.rsplit(INDEX_HEADING).next().unwrap();
        index.lines().filter(|l| l.starts_with("- ")).count()
    }

    #[test]
    fn test_inline_link_and_index() {
        let attractions = vec![place("Eiffel Tower", "U")];
        let doc = merge("Visit Eiffel Tower today.", &[], &[], &attractions, "Paris");

        assert!(doc.starts_with("Visit [Eiffel Tower](U) today."));
        assert!(doc.contains("## Map Links for Paris"));
        let attractions_section = doc.split("### Attractions\n").nth(1).unwrap();
        assert_eq!(attractions_section, "- Eiffel Tower (U) — A (4.5)\n");
    }

    #[test]
    fn test_every_occurrence_is_linked() {
        let hotels = vec![place("Ritz", "R")];
        let doc = merge("Ritz first. Then back to the Ritz.", &hotels, &[], &[], "Paris");
        assert!(doc.starts_with("[Ritz](R) first. Then back to the [Ritz](R)."));
    }

    #[test]
    fn test_empty_text_still_gets_full_index() {
        let hotels: Vec<Place> = (0..5).map(|i| Place::synthetic("hotels", i, "Rome")).collect();
        let restaurants: Vec<Place> =
            (0..6).map(|i| Place::synthetic("restaurants", i, "Rome")).collect();
        let attractions: Vec<Place> = (0..8)
            .map(|i| Place::synthetic("tourist attractions", i, "Rome"))
            .collect();

        let doc = merge("", &hotels, &restaurants, &attractions, "Rome");
        assert_eq!(index_lines(&doc), 19);
        assert!(doc.contains("### Hotels\n"));
        assert!(doc.contains("### Restaurants\n"));
        assert!(doc.contains("### Attractions\n"));
        assert!(doc.contains(&maps::build("hotels", "Rome")));
    }

    #[test]
    fn test_empty_sets_keep_headings() {
        let doc = merge("Nothing to link.", &[], &[], &[], "Nowhere");
        assert_eq!(
            doc,
            "Nothing to link.\n\n## Map Links for Nowhere\n\n### Hotels\n\n### Restaurants\n\n### Attractions\n"
        );
    }

    #[test]
    fn test_merge_is_deterministic() {
        let hotels = vec![place("Hotel A", "HA")];
        let restaurants = vec![place("Bistro", "B")];
        let first = merge("Hotel A then Bistro", &hotels, &restaurants, &[], "Nice");
        let second = merge("Hotel A then Bistro", &hotels, &restaurants, &[], "Nice");
        assert_eq!(first, second);
    }

    #[test]
    fn test_substring_collision_earlier_place_wins() {
        // Hotel "Louvre" is processed before attraction "Louvre Museum" and
        // rewrites its text first, so the longer name no longer matches.
        let hotels = vec![place("Louvre", "H")];
        let attractions = vec![place("Louvre Museum", "M")];
        let doc = merge("See the Louvre Museum.", &hotels, &[], &attractions, "Paris");
        assert!(doc.starts_with("See the [Louvre](H) Museum."));
        assert!(!doc.contains("[Louvre Museum](M)"));
    }

    #[test]
    fn test_remerge_appends_second_index() {
        let attractions = vec![place("Eiffel Tower", "U")];
        let once = merge("Visit Eiffel Tower.", &[], &[], &attractions, "Paris");
        let twice = merge(&once, &[], &[], &attractions, "Paris");

        assert_eq!(twice.matches(INDEX_HEADING).count(), 2);
        // The last index is fresh and complete
        assert_eq!(index_lines(&twice), 1);
        assert!(twice.ends_with("### Attractions\n- Eiffel Tower (U) — A (4.5)\n"));
        // Already linked names are wrapped again
        assert!(twice.starts_with("Visit [[Eiffel Tower](U)](U)."));
    }

    #[test]
    fn test_merge_document_keeps_index() {
        let doc = merge_document(2, "text", &[], &[], &[], "Oslo");
        assert_eq!(doc.draft_index, 2);
        assert!(doc.text.contains("## Map Links for Oslo"));
    }
}
