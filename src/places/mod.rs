//! Place resolution
//!
//! Looks up hotels, restaurants and attractions through a [`PlaceSearch`]
//! collaborator and tops the result up with synthetic placeholders so every
//! category always yields exactly the requested number of places, each with
//! a usable map link.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::maps;
use crate::models::place::{ADDRESS_NOT_AVAILABLE, RATING_NOT_AVAILABLE};
use crate::models::{Category, Place, PlaceSet};

pub mod google;

pub use google::GooglePlacesClient;

/// Default bound on a single place search
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(8);

/// One raw search hit as returned by the provider
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PlaceCandidate {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
}

/// Text search over a place provider
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Run a free-text query such as `"hotels in Paris"`
    async fn search(&self, query: &str) -> crate::Result<Vec<PlaceCandidate>>;
}

/// Resolves place categories, never failing and never coming up short
#[derive(Clone)]
pub struct PlaceResolver {
    search: Option<Arc<dyn PlaceSearch>>,
    timeout: Duration,
}

impl PlaceResolver {
    /// Create a resolver; `None` means no search is configured and every
    /// entry will be synthetic
    pub fn new(search: Option<Arc<dyn PlaceSearch>>) -> Self {
        Self {
            search,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve one of the standard categories
    pub async fn resolve_category(
        &self,
        destination: &str,
        category: Category,
        top_n: usize,
    ) -> PlaceSet {
        self.resolve(destination, category.search_term(), top_n).await
    }

    /// Resolve exactly `top_n` places of `category` in `destination`
    #[instrument(skip(self))]
    pub async fn resolve(&self, destination: &str, category: &str, top_n: usize) -> PlaceSet {
        let query = format!("{category} in {destination}");

        let candidates = match &self.search {
            None => {
                debug!("No place search configured, synthesizing '{}'", query);
                Vec::new()
            }
            Some(search) => match tokio::time::timeout(self.timeout, search.search(&query)).await {
                Ok(Ok(candidates)) => candidates,
                Ok(Err(e)) => {
                    warn!("Place search for '{}' failed: {}", query, e);
                    Vec::new()
                }
                Err(_) => {
                    warn!(
                        "Place search for '{}' timed out after {:.1}s",
                        query,
                        self.timeout.as_secs_f64()
                    );
                    Vec::new()
                }
            },
        };

        let places = fill_places(candidates, destination, category, top_n);
        info!(
            "Resolved {} {} ({} synthetic)",
            places.len(),
            category,
            places.iter().filter(|p| p.is_synthetic()).count()
        );
        places
    }
}

/// Map provider hits to places and pad with placeholders up to `top_n`
#[must_use]
pub fn fill_places(
    candidates: Vec<PlaceCandidate>,
    destination: &str,
    category: &str,
    top_n: usize,
) -> PlaceSet {
    let mut places: PlaceSet = candidates
        .into_iter()
        .filter_map(|candidate| {
            let name = candidate.name.filter(|n| !n.trim().is_empty())?;
            Some(Place {
                maps_url: maps::build(&name, destination),
                address: candidate
                    .formatted_address
                    .unwrap_or_else(|| ADDRESS_NOT_AVAILABLE.to_string()),
                rating: candidate
                    .rating
                    .map_or_else(|| RATING_NOT_AVAILABLE.to_string(), |r| r.to_string()),
                name,
                synthetic: false,
            })
        })
        .take(top_n)
        .collect();

    let resolved = places.len();
    places.extend((resolved..top_n).map(|index| Place::synthetic(category, index, destination)));
    places
}
