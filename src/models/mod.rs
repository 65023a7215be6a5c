//! Data models for the travel planner
//!
//! This module contains the core domain models organized by concern:
//! - Place: resolved or synthetic points of interest and their categories
//! - Trip: the request collected by the hosting application
//! - Document: drafts, merged documents and the resulting plan

pub mod document;
pub mod place;
pub mod trip;

// Re-export all public types for convenient access
pub use document::{Draft, MergedDocument, Plan};
pub use place::{Category, Place, PlaceSet};
pub use trip::{DateRange, Length, Tone, TripRequest};
