use anyhow::Result;
use cohort_finder::PatientCohortFinder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shared_types::CohortOutcome;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::llm::Tool;

pub const FIND_PATIENTS_TOOL: &str = "get_patients_between_ages_and_condition";

/// Text handed to the model when the birthdate window holds no conditions
pub const NO_PATIENTS_MESSAGE: &str = "No patients match the given criteria";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindPatientsParams {
    /// The minimum age to filter patients by. Only patients older than or equal to this age are returned.
    pub min_age: u32,
    /// The maximum age to filter patients by. Only patients younger than or equal to this age are returned.
    pub max_age: u32,
    /// The health condition to filter patients by, matched as a case-insensitive substring of the condition name.
    pub condition: String,
}

/// Result of running a tool: the text for the model and whether it counts
/// as a failed call.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

pub struct HospitalToolExecutor {
    finder: Arc<PatientCohortFinder>,
    last_cohort: Mutex<Option<CohortOutcome>>,
}

impl HospitalToolExecutor {
    pub fn new(finder: Arc<PatientCohortFinder>) -> Self {
        Self {
            finder,
            last_cohort: Mutex::new(None),
        }
    }

    pub fn find_patients_tool() -> Tool {
        Tool::from_type::<FindPatientsParams>()
            .name(FIND_PATIENTS_TOOL)
            .description(
                "Fetches patients from the FHIR R4 server whose age is within the given range \
                 and who have a condition whose name contains the given text. Returns each \
                 patient's full name, age, postal code, MRN, email address, condition and \
                 source URL.",
            )
            .build()
    }

    /// Runs the cohort search.
    ///
    /// Bad arguments come back as an error message for the model to correct;
    /// server failures abort the calling agent.
    pub async fn find_patients(&self, params: FindPatientsParams) -> Result<ToolOutput> {
        tracing::info!(
            "Tool {}: ages {}..={} condition '{}'",
            FIND_PATIENTS_TOOL,
            params.min_age,
            params.max_age,
            params.condition
        );

        let outcome = match self
            .finder
            .find(params.min_age, params.max_age, &params.condition)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) if e.is_invalid_input() => {
                return Ok(ToolOutput {
                    content: format!("Error: {}", e),
                    is_error: true,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let content = match &outcome {
            CohortOutcome::NoRecordsInWindow => NO_PATIENTS_MESSAGE.to_string(),
            CohortOutcome::Found { patients } => serde_json::to_string(patients)?,
        };

        *self.last_cohort_slot() = Some(outcome);

        Ok(ToolOutput {
            content,
            is_error: false,
        })
    }

    /// Outcome of the most recent successful search
    pub fn last_cohort(&self) -> Option<CohortOutcome> {
        self.last_cohort_slot().clone()
    }

    /// Holds whole outcomes only, so a poisoned lock is recovered and logged.
    fn last_cohort_slot(&self) -> MutexGuard<'_, Option<CohortOutcome>> {
        self.last_cohort.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Last cohort lock was poisoned; recovering stored outcome");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{complete_patient, condition_entry, fake_finder, FakeFhir};
    use serde_json::json;

    #[tokio::test]
    async fn test_find_patients_returns_json_and_remembers_outcome() {
        let executor = HospitalToolExecutor::new(fake_finder(FakeFhir::new(
            json!({"entry": [condition_entry("p1", "Hyperglycemia (disorder)")]}),
            vec![("p1", complete_patient("Grace", "Okafor"))],
        )));

        let output = executor
            .find_patients(FindPatientsParams {
                min_age: 0,
                max_age: 120,
                condition: "hyperglycemia".to_string(),
            })
            .await
            .unwrap();

        assert!(!output.is_error);
        let patients: serde_json::Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(patients[0]["full_name"], "Grace Okafor");
        assert_eq!(executor.last_cohort().unwrap().patients().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_window_reports_no_patients_message() {
        let executor =
            HospitalToolExecutor::new(fake_finder(FakeFhir::new(json!({}), vec![])));

        let output = executor
            .find_patients(FindPatientsParams {
                min_age: 100,
                max_age: 105,
                condition: "Hyperglycemia".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.content, NO_PATIENTS_MESSAGE);
        assert_eq!(executor.last_cohort(), Some(CohortOutcome::NoRecordsInWindow));
    }

    #[tokio::test]
    async fn test_inverted_range_is_reported_to_model() {
        let executor =
            HospitalToolExecutor::new(fake_finder(FakeFhir::new(json!({}), vec![])));

        let output = executor
            .find_patients(FindPatientsParams {
                min_age: 80,
                max_age: 60,
                condition: "Osteoporosis".to_string(),
            })
            .await
            .unwrap();

        assert!(output.is_error);
        assert!(output.content.starts_with("Error:"));
        assert!(executor.last_cohort().is_none());
    }

    #[tokio::test]
    async fn test_poisoned_lock_still_records_outcome() {
        let executor = Arc::new(HospitalToolExecutor::new(fake_finder(FakeFhir::new(
            json!({}),
            vec![],
        ))));

        let poisoner = executor.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.last_cohort.lock().unwrap();
            panic!("poison the last cohort lock");
        })
        .join();
        assert!(executor.last_cohort.is_poisoned());

        executor
            .find_patients(FindPatientsParams {
                min_age: 100,
                max_age: 105,
                condition: "Hyperglycemia".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(executor.last_cohort(), Some(CohortOutcome::NoRecordsInWindow));
    }

    #[test]
    fn test_tool_schema_names_all_parameters() {
        let tool = HospitalToolExecutor::find_patients_tool();
        let properties = &tool.parameters["properties"];
        assert!(properties.get("min_age").is_some());
        assert!(properties.get("max_age").is_some());
        assert!(properties.get("condition").is_some());
    }
}
