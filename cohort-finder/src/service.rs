use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CohortError;
use crate::fhir::{Bundle, Condition, Patient};
use crate::window::BirthdateWindow;

/// Read access to the two FHIR endpoints the cohort search depends on.
#[async_trait]
pub trait FhirService: Send + Sync {
    /// Conditions whose subject was born inside `window`, in server order
    async fn search_conditions(&self, window: &BirthdateWindow)
        -> Result<Vec<Condition>, CohortError>;

    async fn read_patient(&self, patient_id: &str) -> Result<Patient, CohortError>;

    /// Human-followable URL for a patient, used as the summary's source
    fn patient_url(&self, patient_id: &str) -> String;
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FhirConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// `_count` sent with the condition search; server default when unset
    pub page_size: Option<u32>,
    /// Bundle pages to read per search; 1 reads only the first page
    pub max_pages: u32,
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hapi.fhir.org/baseR4".to_string(),
            timeout_secs: 120,
            page_size: None,
            max_pages: 1,
        }
    }
}

pub struct HttpFhirService {
    client: reqwest::Client,
    base_url: String,
    page_size: Option<u32>,
    max_pages: u32,
}

impl HttpFhirService {
    pub fn new(config: FhirConfig) -> Result<Self, CohortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CohortError::unavailable(&config.base_url, e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            max_pages: config.max_pages.max(1),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CohortError> {
        let request = request
            .header(reqwest::header::ACCEPT, "application/fhir+json")
            .build()
            .map_err(|e| CohortError::unavailable(&self.base_url, e))?;
        let endpoint = request.url().to_string();

        tracing::debug!("GET {}", endpoint);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| CohortError::unavailable(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CohortError::unavailable(
                &endpoint,
                format!("HTTP status {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CohortError::unavailable(&endpoint, e))?;

        serde_json::from_slice(&body).map_err(|e| CohortError::malformed(&endpoint, e))
    }
}

#[async_trait]
impl FhirService for HttpFhirService {
    async fn search_conditions(
        &self,
        window: &BirthdateWindow,
    ) -> Result<Vec<Condition>, CohortError> {
        let mut query = window.condition_search_params();
        if let Some(page_size) = self.page_size {
            query.push(("_count", page_size.to_string()));
        }

        let first = self
            .client
            .get(format!("{}/Condition", self.base_url))
            .query(&query);
        let mut bundle: Bundle<Condition> = self.get_json(first).await?;
        check_resource_type(bundle.resource_type.as_deref(), "Bundle", &self.base_url)?;

        let mut conditions = Vec::new();
        let mut pages = 1;
        loop {
            let next = bundle.next_link().map(str::to_string);
            conditions.extend(bundle.into_resources());

            match next {
                Some(url) if pages < self.max_pages => {
                    pages += 1;
                    bundle = self.get_json(self.client.get(url)).await?;
                }
                _ => break,
            }
        }

        tracing::info!(
            "Condition search returned {} records across {} page(s)",
            conditions.len(),
            pages
        );
        Ok(conditions)
    }

    async fn read_patient(&self, patient_id: &str) -> Result<Patient, CohortError> {
        let url = format!("{}/Patient/{}", self.base_url, patient_id);
        let patient: Patient = self.get_json(self.client.get(&url)).await?;
        check_resource_type(patient.resource_type.as_deref(), "Patient", &url)?;
        Ok(patient)
    }

    fn patient_url(&self, patient_id: &str) -> String {
        format!("{}/Patient/{}", self.base_url, patient_id)
    }
}

/// An `OperationOutcome` served with a 200 is still not the resource we asked for
fn check_resource_type(
    actual: Option<&str>,
    expected: &str,
    endpoint: &str,
) -> Result<(), CohortError> {
    match actual {
        Some(found) if found != expected => Err(CohortError::malformed(
            endpoint,
            format!("expected {} resource, got {}", expected, found),
        )),
        _ => Ok(()),
    }
}
