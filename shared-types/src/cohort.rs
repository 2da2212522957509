use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PatientSummary;

/// Result of a cohort search.
///
/// `NoRecordsInWindow` means the condition service returned nothing at all
/// for the birthdate window; `Found` with an empty list means records came
/// back but none matched the condition text or survived profile filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CohortOutcome {
    Found { patients: Vec<PatientSummary> },
    NoRecordsInWindow,
}

impl CohortOutcome {
    pub fn patients(&self) -> &[PatientSummary] {
        match self {
            CohortOutcome::Found { patients } => patients,
            CohortOutcome::NoRecordsInWindow => &[],
        }
    }

    pub fn into_patients(self) -> Vec<PatientSummary> {
        match self {
            CohortOutcome::Found { patients } => patients,
            CohortOutcome::NoRecordsInWindow => Vec::new(),
        }
    }

    pub fn is_no_records(&self) -> bool {
        matches!(self, CohortOutcome::NoRecordsInWindow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_tagging() {
        let json = serde_json::to_string(&CohortOutcome::NoRecordsInWindow).unwrap();
        assert_eq!(json, r#"{"outcome":"no_records_in_window"}"#);

        let json = serde_json::to_string(&CohortOutcome::Found { patients: vec![] }).unwrap();
        assert_eq!(json, r#"{"outcome":"found","patients":[]}"#);
    }

    #[test]
    fn test_empty_found_is_not_no_records() {
        let found = CohortOutcome::Found { patients: vec![] };
        assert!(!found.is_no_records());
        assert!(found.patients().is_empty());
        assert!(CohortOutcome::NoRecordsInWindow.is_no_records());
    }
}
