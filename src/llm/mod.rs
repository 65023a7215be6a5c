//! Itinerary text generation
//!
//! Defines the [`TextGenerator`] collaborator and the prompt sent to it. The
//! Perplexity implementation lives in [`perplexity`].

use std::fmt::Write;

use async_trait::async_trait;

use crate::models::{Place, TripRequest};

pub mod perplexity;

pub use perplexity::PerplexityClient;

/// A language model that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> crate::Result<String>;
}

/// Build the prompt for draft `draft_index` of `request.draft_count`.
///
/// Only resolved places are offered to the model; placeholders carry no real
/// name worth repeating.
#[must_use]
pub fn build_prompt(
    request: &TripRequest,
    hotels: &[Place],
    restaurants: &[Place],
    attractions: &[Place],
    draft_index: usize,
) -> String {
    let budget = if request.budget.trim().is_empty() {
        "a flexible budget".to_string()
    } else {
        format!("a budget of {}", request.budget.trim())
    };

    let mut prompt = format!(
        "Create a detailed travel itinerary for {} people visiting {} from {} to {} ({} days) with {}.\n\
         Write in a {} tone. {}\n\
         Include:\n\
         - Day-wise breakdown with times\n\
         - Top attractions with short descriptions\n\
         - Suggested restaurants nearby (breakfast, lunch, dinner)\n\
         - Hotel recommendations\n",
        request.members,
        request.destination.trim(),
        request.dates.start,
        request.dates.end,
        request.dates.days(),
        budget,
        request.tone,
        request.length.instruction(),
    );

    let sections = [
        ("Hotels", hotels),
        ("Restaurants", restaurants),
        ("Attractions", attractions),
    ];
    let mut listed = false;
    for (title, places) in sections {
        let names: Vec<&str> = places
            .iter()
            .filter(|p| !p.is_synthetic())
            .map(|p| p.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        if !listed {
            prompt.push_str(
                "When you recommend one of these places, write its name exactly as listed:\n",
            );
            listed = true;
        }
        let _ = writeln!(prompt, "{title}: {}", names.join("; "));
    }

    if request.draft_count > 1 {
        let _ = writeln!(
            prompt,
            "Draft {draft_index} of {}: make this version distinct from the others.",
            request.draft_count
        );
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::tests::paris_request;

    fn resolved(name: &str) -> Place {
        Place {
            name: name.to_string(),
            address: "somewhere".to_string(),
            rating: "4.2".to_string(),
            maps_url: crate::maps::build(name, "Paris"),
            synthetic: false,
        }
    }

    #[test]
    fn test_prompt_mentions_request() {
        let prompt = build_prompt(&paris_request(), &[], &[], &[], 1);
        assert!(prompt.contains("for 2 people visiting Paris from 2026-11-02 to 2026-11-05 (4 days)"));
        assert!(prompt.contains("a budget of 2,000 EUR"));
        assert!(prompt.contains("friendly tone"));
        assert!(!prompt.contains("Draft"));
        assert!(!prompt.contains("exactly as listed"));
    }

    #[test]
    fn test_prompt_lists_only_resolved_places() {
        let hotels = vec![resolved("Le Bristol"), Place::synthetic("hotels", 1, "Paris")];
        let prompt = build_prompt(&paris_request(), &hotels, &[], &[], 1);
        assert!(prompt.contains("Hotels: Le Bristol\n"));
        assert!(!prompt.contains("hotels 2"));
        assert!(!prompt.contains("Restaurants:"));
    }

    #[test]
    fn test_prompt_lists_found_place_without_details() {
        let mut bare = resolved("Chez Janou");
        bare.address = "Not available".to_string();
        bare.rating = "N/A".to_string();
        let prompt = build_prompt(&paris_request(), &[], &[bare], &[], 1);
        assert!(prompt.contains("Restaurants: Chez Janou\n"));
    }

    #[test]
    fn test_drafts_differ_only_by_index_line() {
        let mut request = paris_request();
        request.draft_count = 3;
        let first = build_prompt(&request, &[], &[], &[], 1);
        let second = build_prompt(&request, &[], &[], &[], 2);

        assert_ne!(first, second);
        assert!(second.ends_with("Draft 2 of 3: make this version distinct from the others.\n"));
        let strip = |p: &str| p.lines().filter(|l| !l.starts_with("Draft ")).collect::<Vec<_>>().join("\n");
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(first, build_prompt(&request, &[], &[], &[], 1));
    }
}
