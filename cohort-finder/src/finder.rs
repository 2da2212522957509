use chrono::NaiveDate;
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use shared_types::{AgeRange, CohortOutcome, PatientSummary};
use std::sync::Arc;

use crate::error::CohortError;
use crate::fhir::{Condition, Patient};
use crate::service::FhirService;
use crate::summary::{self, SummaryInput};
use crate::window::BirthdateWindow;

/// Knobs that used to differ between copies of the cohort query.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FinderOptions {
    /// Drop patients without a `telecom` field
    pub require_contact: bool,
    /// Drop patients without a `maritalStatus` field
    pub require_marital_status: bool,
    /// Used as `email` when a patient has no email contact
    pub email_placeholder: Option<String>,
    /// Patient reads in flight at once; results keep condition order regardless
    pub patient_fetch_concurrency: usize,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            require_contact: true,
            require_marital_status: true,
            email_placeholder: None,
            patient_fetch_concurrency: 1,
        }
    }
}

/// A condition that passed the text filter, with its resolved subject id
struct MatchedCondition {
    patient_id: String,
    condition: Condition,
}

pub struct PatientCohortFinder {
    service: Arc<dyn FhirService>,
    options: FinderOptions,
}

impl PatientCohortFinder {
    pub fn new(service: Arc<dyn FhirService>, options: FinderOptions) -> Self {
        Self { service, options }
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Patients aged `min_age..=max_age` today with a condition whose display
    /// contains `condition` (case-insensitive).
    pub async fn find(
        &self,
        min_age: u32,
        max_age: u32,
        condition: &str,
    ) -> Result<CohortOutcome, CohortError> {
        let today = chrono::Local::now().date_naive();
        self.find_on(AgeRange::new(min_age, max_age)?, condition, today)
            .await
    }

    /// Same as [`find`](Self::find) with an explicit evaluation date.
    pub async fn find_on(
        &self,
        ages: AgeRange,
        condition: &str,
        today: NaiveDate,
    ) -> Result<CohortOutcome, CohortError> {
        if condition.trim().is_empty() {
            return Err(CohortError::EmptyCondition);
        }
        let needle = condition.to_lowercase();

        let window = BirthdateWindow::for_ages(ages, today);
        tracing::info!(
            "Searching conditions for subjects born after {} and on or before {}",
            window.born_after,
            window.born_on_or_before
        );

        let conditions = self.service.search_conditions(&window).await?;
        if conditions.is_empty() {
            return Ok(CohortOutcome::NoRecordsInWindow);
        }

        let total = conditions.len();
        let matched = conditions
            .into_iter()
            .filter(|record| matches_condition(record, &needle))
            .filter_map(resolve_subject)
            .collect::<Vec<_>>();

        tracing::info!(
            "{} of {} condition records match '{}'",
            matched.len(),
            total,
            condition
        );

        let service = &self.service;
        let resolved: Vec<(MatchedCondition, Patient)> = futures::stream::iter(matched)
            .map(|matched| async move {
                let patient = service.read_patient(&matched.patient_id).await?;
                Ok::<_, CohortError>((matched, patient))
            })
            .buffered(self.options.patient_fetch_concurrency.max(1))
            .try_collect()
            .await?;

        let patients: Vec<PatientSummary> = resolved
            .iter()
            .filter_map(|(matched, patient)| self.summarize(matched, patient, today))
            .collect();

        Ok(CohortOutcome::Found { patients })
    }

    fn summarize(
        &self,
        matched: &MatchedCondition,
        patient: &Patient,
        today: NaiveDate,
    ) -> Option<PatientSummary> {
        if self.options.require_contact && patient.telecom.is_none() {
            tracing::debug!("Skipping patient {}: no contact data", matched.patient_id);
            return None;
        }
        if self.options.require_marital_status && patient.marital_status.is_none() {
            tracing::debug!(
                "Skipping patient {}: no marital status",
                matched.patient_id
            );
            return None;
        }

        match summary::summarize(SummaryInput {
            patient_id: &matched.patient_id,
            source_url: self.service.patient_url(&matched.patient_id),
            patient,
            condition: &matched.condition,
            today,
            email_placeholder: self.options.email_placeholder.as_deref(),
        }) {
            Ok(summary) => Some(summary),
            Err(gap) => {
                tracing::warn!(
                    "Skipping patient {}: incomplete profile ({:?})",
                    matched.patient_id,
                    gap
                );
                None
            }
        }
    }
}

/// Pairs a matching condition with its patient id. Subjects that are not
/// patients (`Group/…`, `Device/…`) or are missing are skipped.
fn resolve_subject(condition: Condition) -> Option<MatchedCondition> {
    let patient_id = condition
        .subject
        .as_ref()
        .and_then(|subject| subject.patient_id())
        .map(str::to_string);

    match patient_id {
        Some(patient_id) => Some(MatchedCondition {
            patient_id,
            condition,
        }),
        None => {
            tracing::warn!(
                "Skipping condition {}: subject is not a patient reference ({:?})",
                condition.id.as_deref().unwrap_or("<no id>"),
                condition.subject.as_ref().and_then(|s| s.reference.as_deref())
            );
            None
        }
    }
}

/// True when any coding display contains `needle`, which must already be
/// lowercase. Uncoded records never match.
fn matches_condition(condition: &Condition, needle: &str) -> bool {
    condition.codings().iter().any(|coding| {
        coding
            .display
            .as_deref()
            .is_some_and(|display| display.to_lowercase().contains(needle))
    })
}
