//! Drafts, merged documents and the plan returned to callers

use serde::{Deserialize, Serialize};

use super::place::PlaceSet;

/// One generated (or uploaded) itinerary body
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Draft {
    /// 1-based position in the batch
    pub index: usize,
    pub text: String,
}

/// Draft text with inline map links plus the trailing link index
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MergedDocument {
    pub draft_index: usize,
    pub text: String,
}

/// Result of one planning cycle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Plan {
    pub documents: Vec<MergedDocument>,
    pub hotels: PlaceSet,
    pub restaurants: PlaceSet,
    pub attractions: PlaceSet,
}
