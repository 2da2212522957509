use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Inclusive age bounds, in whole years, used to derive a birthdate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct AgeRange {
    pub min_age: u32,
    pub max_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("min_age ({min_age}) must not exceed max_age ({max_age})")]
pub struct InvalidAgeRange {
    pub min_age: u32,
    pub max_age: u32,
}

impl AgeRange {
    pub fn new(min_age: u32, max_age: u32) -> Result<Self, InvalidAgeRange> {
        if min_age > max_age {
            return Err(InvalidAgeRange { min_age, max_age });
        }
        Ok(Self { min_age, max_age })
    }

    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

/// Flattened view of one matching condition joined to its patient.
///
/// A patient with several matching conditions produces several summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct PatientSummary {
    pub patient_id: String,
    pub source_url: String,
    pub full_name: String,
    pub age: u32,
    pub postal_code: Option<String>,
    pub medical_record_number: Option<String>,
    pub email: Option<String>,
    pub condition_display_name: String,
}

/// Search parameters accepted by the cohort search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CohortSearchRequest {
    pub min_age: u32,
    pub max_age: u32,
    pub condition: String,
}

impl CohortSearchRequest {
    pub fn age_range(&self) -> Result<AgeRange, InvalidAgeRange> {
        AgeRange::new(self.min_age, self.max_age)
    }
}
