//! Parses cohort criteria written in plain language, e.g.
//! `Patients aged between 50 and 70 with Osteoporosis. TERMINATE`.

use regex::Regex;
use shared_types::{AgeRange, InvalidAgeRange};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortCriteria {
    pub ages: AgeRange,
    pub condition: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("No 'aged X to Y with <condition>' clause found in: {0}")]
    NoMatch(String),

    #[error(transparent)]
    InvalidAgeRange(#[from] InvalidAgeRange),
}

fn criteria_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\baged\s+(?:between\s+)?(\d{1,3})\s*(?:to|and|-|–)\s*(\d{1,3})(?:\s+years?(?:\s+old)?)?\s*,?\s+with\s+([^.\n]+)",
        )
        .expect("criteria regex is valid")
    })
}

pub fn parse_criteria(text: &str) -> Result<CohortCriteria, CriteriaError> {
    let caps = criteria_pattern()
        .captures(text)
        .ok_or_else(|| CriteriaError::NoMatch(text.trim().to_string()))?;

    let min_age: u32 = caps[1]
        .parse()
        .map_err(|_| CriteriaError::NoMatch(text.trim().to_string()))?;
    let max_age: u32 = caps[2]
        .parse()
        .map_err(|_| CriteriaError::NoMatch(text.trim().to_string()))?;

    let condition = clean_condition(&caps[3]);
    if condition.is_empty() {
        return Err(CriteriaError::NoMatch(text.trim().to_string()));
    }

    Ok(CohortCriteria {
        ages: AgeRange::new(min_age, max_age)?,
        condition,
    })
}

/// Drops the termination marker, trailing punctuation and a generic
/// trailing "disease" so the text works as a substring search.
fn clean_condition(raw: &str) -> String {
    let mut condition = raw.replace("TERMINATE", "");
    condition = condition
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == ',' || c == ';' || c == '!')
        .trim()
        .to_string();

    for suffix in [" diseases", " disease"] {
        if condition.len() > suffix.len() && condition.to_lowercase().ends_with(suffix) {
            condition.truncate(condition.len() - suffix.len());
            break;
        }
    }

    condition.trim().to_string()
}
