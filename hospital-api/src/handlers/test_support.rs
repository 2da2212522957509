use async_trait::async_trait;
use cohort_finder::fhir::{Bundle, Condition, Patient};
use cohort_finder::{BirthdateWindow, CohortError, FhirService, FinderOptions, PatientCohortFinder};
use hospital_agents::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmConfig, LlmError};
use hospital_agents::storage::SqliteAgentStorage;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::AppState;

pub struct FakeFhir {
    conditions: Vec<Condition>,
    patients: HashMap<String, Patient>,
}

impl FakeFhir {
    pub fn new(conditions: Value, patients: Vec<(&str, Value)>) -> Self {
        let bundle: Bundle<Condition> = serde_json::from_value(conditions).unwrap();
        Self {
            conditions: bundle.into_resources().collect(),
            patients: patients
                .into_iter()
                .map(|(id, value)| (id.to_string(), serde_json::from_value(value).unwrap()))
                .collect(),
        }
    }
}

#[async_trait]
impl FhirService for FakeFhir {
    async fn search_conditions(&self, _: &BirthdateWindow) -> Result<Vec<Condition>, CohortError> {
        Ok(self.conditions.clone())
    }

    async fn read_patient(&self, patient_id: &str) -> Result<Patient, CohortError> {
        self.patients
            .get(patient_id)
            .cloned()
            .ok_or_else(|| CohortError::unavailable("Patient", "HTTP status 404 Not Found"))
    }

    fn patient_url(&self, patient_id: &str) -> String {
        format!("https://fhir.test/Patient/{}", patient_id)
    }
}

pub struct ScriptedLlm {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedLlm {
    pub fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let content = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyResponse)?;
        Ok(CompletionResponse {
            content,
            ..CompletionResponse::default()
        })
    }
}

pub fn condition_entry(subject: &str, display: &str) -> Value {
    json!({
        "resource": {
            "resourceType": "Condition",
            "code": {"coding": [{"display": display}]},
            "subject": {"reference": format!("Patient/{}", subject)}
        }
    })
}

pub fn complete_patient() -> Value {
    json!({
        "resourceType": "Patient",
        "name": [{"family": "Silva", "given": ["Ana"]}],
        "birthDate": "1980-01-01",
        "telecom": [{"system": "email", "value": "ana@example.org"}],
        "maritalStatus": {"text": "Married"},
        "address": [{"postalCode": "SW1A 1AA"}]
    })
}

pub fn app_state(fake: FakeFhir) -> AppState {
    build_state(fake, None)
}

pub fn app_state_with_llm(fake: FakeFhir, llm: Arc<dyn LlmClient>) -> AppState {
    build_state(fake, Some(llm))
}

fn build_state(fake: FakeFhir, llm_client: Option<Arc<dyn LlmClient>>) -> AppState {
    let connection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
    let storage = SqliteAgentStorage::with_migrations(connection.clone()).unwrap();
    AppState {
        connection,
        storage: Arc::new(storage),
        finder: Arc::new(PatientCohortFinder::new(Arc::new(fake), FinderOptions::default())),
        llm_client,
        llm_config: LlmConfig::default(),
    }
}
