//! Plan orchestration
//!
//! One planning cycle resolves the three place categories once, generates
//! every draft against the same place sets, and merges each draft into a
//! document with inline and indexed map links.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::PlannerError;
use crate::config::PlannerConfig;
use crate::llm::{self, PerplexityClient, TextGenerator};
use crate::merge;
use crate::models::{Category, Draft, MergedDocument, Place, Plan, TripRequest};
use crate::places::{GooglePlacesClient, PlaceResolver, PlaceSearch};

/// Draft text used when no language model is configured
pub const GENERATION_DISABLED: &str =
    "Itinerary generation is disabled: no language-model API key is configured.";

/// How many places of each category a plan carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceCounts {
    pub hotels: usize,
    pub restaurants: usize,
    pub attractions: usize,
}

impl Default for PlaceCounts {
    fn default() -> Self {
        Self {
            hotels: Category::Hotels.default_top_n(),
            restaurants: Category::Restaurants.default_top_n(),
            attractions: Category::Attractions.default_top_n(),
        }
    }
}

/// Runs the resolve, generate and merge cycle for a trip
pub struct Planner {
    generator: Option<Arc<dyn TextGenerator>>,
    resolver: PlaceResolver,
    counts: PlaceCounts,
}

impl Planner {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        resolver: PlaceResolver,
        counts: PlaceCounts,
    ) -> Self {
        Self {
            generator,
            resolver,
            counts,
        }
    }

    /// Build collaborators from configuration. Missing credentials disable
    /// the matching collaborator instead of failing.
    pub fn from_config(config: &PlannerConfig) -> crate::Result<Self> {
        let generator: Option<Arc<dyn TextGenerator>> =
            match PerplexityClient::from_config(&config.llm) {
                Ok(client) => Some(Arc::new(client)),
                Err(PlannerError::NotConfigured { message, .. }) => {
                    warn!("Itinerary generation disabled: {}", message);
                    None
                }
                Err(e) => return Err(e),
            };

        let search: Option<Arc<dyn PlaceSearch>> =
            match GooglePlacesClient::from_config(&config.places) {
                Ok(client) => Some(Arc::new(client)),
                Err(PlannerError::NotConfigured { message, .. }) => {
                    warn!("Place search disabled, using placeholders: {}", message);
                    None
                }
                Err(e) => return Err(e),
            };

        let resolver = PlaceResolver::new(search).with_timeout(Duration::from_secs(u64::from(
            config.places.timeout_seconds,
        )));

        Ok(Self::new(
            generator,
            resolver,
            PlaceCounts {
                hotels: config.places.hotels,
                restaurants: config.places.restaurants,
                attractions: config.places.attractions,
            },
        ))
    }

    /// Whether drafts will come from a language model
    #[must_use]
    pub fn generation_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Plan a trip. Fails only when the request is invalid; collaborator
    /// failures degrade into placeholder places or error text in a draft.
    #[instrument(skip(self, request), fields(destination = %request.destination, drafts = request.draft_count))]
    pub async fn run(&self, request: &TripRequest) -> crate::Result<Plan> {
        request.validate()?;
        let start_time = Instant::now();

        let (hotels, restaurants, attractions) = self.resolve_places(request).await;
        let drafts = self
            .generate_drafts(request, &hotels, &restaurants, &attractions)
            .await;

        let plan = assemble(request, drafts, hotels, restaurants, attractions);
        info!(
            "Planned {} documents for {} in {:.3}s",
            plan.documents.len(),
            request.destination,
            start_time.elapsed().as_secs_f64()
        );
        Ok(plan)
    }

    /// Merge an existing itinerary as draft 1 without calling the model
    #[instrument(skip(self, request, text), fields(destination = %request.destination))]
    pub async fn plan_from_text(&self, request: &TripRequest, text: &str) -> crate::Result<Plan> {
        request.validate()?;
        let (hotels, restaurants, attractions) = self.resolve_places(request).await;
        let drafts = vec![Draft {
            index: 1,
            text: text.to_string(),
        }];
        Ok(assemble(request, drafts, hotels, restaurants, attractions))
    }

    async fn resolve_places(&self, request: &TripRequest) -> (Vec<Place>, Vec<Place>, Vec<Place>) {
        let destination = request.destination.trim();
        tokio::join!(
            self.resolver
                .resolve_category(destination, Category::Hotels, self.counts.hotels),
            self.resolver
                .resolve_category(destination, Category::Restaurants, self.counts.restaurants),
            self.resolver
                .resolve_category(destination, Category::Attractions, self.counts.attractions),
        )
    }

    async fn generate_drafts(
        &self,
        request: &TripRequest,
        hotels: &[Place],
        restaurants: &[Place],
        attractions: &[Place],
    ) -> Vec<Draft> {
        let Some(generator) = &self.generator else {
            warn!("No language model configured, returning a single notice draft");
            return vec![Draft {
                index: 1,
                text: GENERATION_DISABLED.to_string(),
            }];
        };

        let calls = (1..=request.draft_count).map(|index| {
            let prompt = llm::build_prompt(request, hotels, restaurants, attractions, index);
            let generator = Arc::clone(generator);
            async move {
                let text = match generator.generate(&prompt).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Draft {} failed: {}", index, e);
                        format!("Itinerary generation failed: {e}")
                    }
                };
                Draft { index, text }
            }
        });

        join_all(calls).await
    }
}

fn assemble(
    request: &TripRequest,
    drafts: Vec<Draft>,
    hotels: Vec<Place>,
    restaurants: Vec<Place>,
    attractions: Vec<Place>,
) -> Plan {
    let destination = request.destination.trim();
    let documents: Vec<MergedDocument> = drafts
        .iter()
        .map(|draft| {
            merge::merge_document(
                draft.index,
                &draft.text,
                &hotels,
                &restaurants,
                &attractions,
                destination,
            )
        })
        .collect();

    Plan {
        documents,
        hotels,
        restaurants,
        attractions,
    }
}
