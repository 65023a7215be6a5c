//! Trip request model supplied by the hosting application

use std::fmt::Display;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::PlannerError;

/// Upper bound on drafts generated per request
pub const MAX_DRAFTS: usize = 5;

/// Inclusive travel dates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of travel days, counting both ends
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Writing style requested for the itinerary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Adventurous,
    Luxury,
}

impl Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Adventurous => "adventurous",
            Tone::Luxury => "luxury",
        };
        f.write_str(s)
    }
}

/// Level of detail requested for the itinerary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl Length {
    /// Instruction appended to the prompt
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Length::Brief => "Keep it brief: a few bullet points per day.",
            Length::Standard => "Use a moderate level of detail for each day.",
            Length::Detailed => "Be thorough: include timings, transport tips and costs for each day.",
        }
    }
}

/// Everything needed to plan one trip
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TripRequest {
    pub destination: String,
    pub dates: DateRange,
    #[serde(default = "default_members")]
    pub members: u32,
    #[serde(default)]
    pub budget: String,
    #[serde(default = "default_draft_count")]
    pub draft_count: usize,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub length: Length,
}

fn default_members() -> u32 {
    1
}

fn default_draft_count() -> usize {
    1
}

impl TripRequest {
    /// Check the request before any collaborator is called
    pub fn validate(&self) -> crate::Result<()> {
        if self.destination.trim().is_empty() {
            return Err(PlannerError::validation("Destination cannot be empty"));
        }
        if self.dates.end < self.dates.start {
            return Err(PlannerError::validation(format!(
                "End date {} is before start date {}",
                self.dates.end, self.dates.start
            )));
        }
        if self.members == 0 {
            return Err(PlannerError::validation("At least one traveler is required"));
        }
        if self.draft_count == 0 || self.draft_count > MAX_DRAFTS {
            return Err(PlannerError::validation(format!(
                "Draft count must be between 1 and {MAX_DRAFTS}, got: {}",
                self.draft_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) fn paris_request() -> TripRequest {
        TripRequest {
            destination: "Paris".to_string(),
            dates: DateRange {
                start: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
            },
            members: 2,
            budget: "2,000 EUR".to_string(),
            draft_count: 1,
            tone: Tone::Friendly,
            length: Length::Standard,
        }
    }

    #[test]
    fn test_valid_request() {
        let request = paris_request();
        assert!(request.validate().is_ok());
        assert_eq!(request.dates.days(), 4);
    }

    #[rstest]
    #[case::empty_destination(|r: &mut TripRequest| r.destination = "  ".to_string(), "Destination")]
    #[case::reversed_dates(|r: &mut TripRequest| std::mem::swap(&mut r.dates.start, &mut r.dates.end), "before start")]
    #[case::no_members(|r: &mut TripRequest| r.members = 0, "traveler")]
    #[case::no_drafts(|r: &mut TripRequest| r.draft_count = 0, "Draft count")]
    #[case::too_many_drafts(|r: &mut TripRequest| r.draft_count = 6, "Draft count")]
    fn test_invalid_request(#[case] mutate: fn(&mut TripRequest), #[case] expected: &str) {
        let mut request = paris_request();
        mutate(&mut request);
        let err = request.validate().unwrap_err();
        assert!(matches!(err, PlannerError::Validation { .. }));
        assert!(err.to_string().contains(expected), "{err}");
    }

    #[test]
    fn test_request_defaults_from_json() {
        let json = r#"{"destination":"Rome","dates":{"start":"2026-05-01","end":"2026-05-03"}}"#;
        let request: TripRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.members, 1);
        assert_eq!(request.draft_count, 1);
        assert_eq!(request.tone, Tone::Friendly);
        assert_eq!(request.length, Length::Standard);
        assert!(request.budget.is_empty());
    }
}
