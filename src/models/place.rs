//! Place model for hotels, restaurants and attractions

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::maps;

/// Address shown when the provider result carries none
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";
/// Address of a synthetic placeholder
pub const SYNTHETIC_ADDRESS: &str = "Not available";
/// Rating shown when unknown
pub const RATING_NOT_AVAILABLE: &str = "N/A";

/// A resolved or synthesized point of interest
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub rating: String,
    pub maps_url: String,
    /// Placeholder manufactured because search came up short
    #[serde(default)]
    pub synthetic: bool,
}

/// Ordered places of one category, always exactly the requested length
pub type PlaceSet = Vec<Place>;

impl Place {
    /// Placeholder for slot `index` (0-based) of `category` when search came up short
    #[must_use]
    pub fn synthetic(category: &str, index: usize, destination: &str) -> Self {
        Self {
            name: format!("{category} {}", index + 1),
            address: SYNTHETIC_ADDRESS.to_string(),
            rating: RATING_NOT_AVAILABLE.to_string(),
            maps_url: maps::build(category, destination),
            synthetic: true,
        }
    }

    /// Whether this place was manufactured instead of found
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) — {} ({})",
            self.name, self.maps_url, self.address, self.rating
        )
    }
}

/// Place categories searched for every trip
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hotels,
    Restaurants,
    Attractions,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Hotels, Category::Restaurants, Category::Attractions];

    /// Term sent to the place search, also used for placeholder names
    #[must_use]
    pub fn search_term(self) -> &'static str {
        match self {
            Category::Hotels => "hotels",
            Category::Restaurants => "restaurants",
            Category::Attractions => "tourist attractions",
        }
    }

    /// Heading used in the link index
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Category::Hotels => "Hotels",
            Category::Restaurants => "Restaurants",
            Category::Attractions => "Attractions",
        }
    }

    #[must_use]
    pub fn default_top_n(self) -> usize {
        match self {
            Category::Hotels => 5,
            Category::Restaurants => 6,
            Category::Attractions => 8,
        }
    }
}
