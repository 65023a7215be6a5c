//! `travelplanner` - AI travel itineraries with guaranteed map links
//!
//! This library resolves hotels, restaurants and attractions for a
//! destination, merges them as map links into language-model drafts, and
//! delivers the result in size-limited message chunks.

pub mod api;
pub mod chunk;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;
pub mod extract;
pub mod llm;
pub mod logging;
pub mod maps;
pub mod merge;
pub mod models;
pub mod pipeline;
pub mod places;
pub mod web;

// Re-export core types for public API
pub use config::PlannerConfig;
pub use delivery::{DeliveryReport, MessageSender};
pub use error::PlannerError;
pub use export::{ExportFormat, Exporter};
pub use llm::TextGenerator;
pub use models::{Category, DateRange, Draft, Length, MergedDocument, Place, Plan, Tone, TripRequest};
pub use pipeline::{PlaceCounts, Planner};
pub use places::{PlaceCandidate, PlaceResolver, PlaceSearch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
